//! Typed attribute values for table items
//!
//! A table row is a map from attribute name to a typed scalar. Values keep
//! the platform's type distinctions (string, long, double, boolean, blob,
//! null) so rows round-trip through JSON without losing their types.

use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::{Error, Result};

/// A single typed attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Blob(Vec<u8>),
    Null,
}

/// A decoded table row: attribute name to typed value
pub type Item = BTreeMap<String, FieldValue>;

impl FieldValue {
    /// Platform type name, as used in table schemas
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Str(_) => "string",
            FieldValue::Int(_) => "long",
            FieldValue::Float(_) => "double",
            FieldValue::Bool(_) => "boolean",
            FieldValue::Blob(_) => "blob",
            FieldValue::Null => "null",
        }
    }

    /// String content, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to a plain JSON value. Blobs become base64 strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Str(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(n) => serde_json::Value::from(*n),
            FieldValue::Float(f) => serde_json::Value::from(*f),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Blob(b) => serde_json::Value::String(BASE64.encode(b)),
            FieldValue::Null => serde_json::Value::Null,
        }
    }

    /// Build a value from plain JSON. Nested arrays and objects are
    /// rejected since table attributes are scalar.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(s) => Ok(FieldValue::Str(s.clone())),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(FieldValue::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(FieldValue::Float(f))
                } else {
                    Err(Error::General(format!("Unsupported number: {n}")))
                }
            }
            serde_json::Value::Bool(b) => Ok(FieldValue::Bool(*b)),
            serde_json::Value::Null => Ok(FieldValue::Null),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(Error::General(
                "Nested values are not supported in table attributes".into(),
            )),
        }
    }
}

/// Convert a row to a plain JSON object
pub fn item_to_json(item: &Item) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = item
        .iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect();
    serde_json::Value::Object(map)
}

/// Build a row from a plain JSON object
pub fn item_from_json(value: &serde_json::Value) -> Result<Item> {
    let map = value
        .as_object()
        .ok_or_else(|| Error::General("Item must be a JSON object".into()))?;
    let mut item = Item::new();
    for (name, value) in map {
        item.insert(name.clone(), FieldValue::from_json(value)?);
    }
    Ok(item)
}

/// Validate that a decoded row carries the key attribute the caller
/// requires. `row` is the row's position within its cursor chain and is
/// reported back in the error.
pub fn require_key_field(item: &Item, field: &str, row: usize) -> Result<()> {
    match item.get(field) {
        Some(value) if !matches!(value, FieldValue::Null) => Ok(()),
        _ => Err(Error::MissingKeyField {
            field: field.to_string(),
            row,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(FieldValue::Str("a".into()).type_name(), "string");
        assert_eq!(FieldValue::Int(1).type_name(), "long");
        assert_eq!(FieldValue::Float(1.5).type_name(), "double");
        assert_eq!(FieldValue::Bool(true).type_name(), "boolean");
        assert_eq!(FieldValue::Blob(vec![1]).type_name(), "blob");
        assert_eq!(FieldValue::Null.type_name(), "null");
    }

    #[test]
    fn test_to_json_blob_is_base64() {
        let value = FieldValue::Blob(b"hello".to_vec());
        assert_eq!(value.to_json(), serde_json::json!("aGVsbG8="));
    }

    #[test]
    fn test_from_json_numbers() {
        let int = FieldValue::from_json(&serde_json::json!(42)).unwrap();
        assert_eq!(int, FieldValue::Int(42));

        let float = FieldValue::from_json(&serde_json::json!(2.5)).unwrap();
        assert_eq!(float, FieldValue::Float(2.5));
    }

    #[test]
    fn test_from_json_rejects_nested() {
        assert!(FieldValue::from_json(&serde_json::json!([1, 2])).is_err());
        assert!(FieldValue::from_json(&serde_json::json!({"a": 1})).is_err());
    }

    #[test]
    fn test_item_round_trip() {
        let json = serde_json::json!({
            "__name": "row-1",
            "count": 3,
            "ratio": 0.5,
            "active": true,
            "note": serde_json::Value::Null,
        });
        let item = item_from_json(&json).unwrap();
        assert_eq!(item.get("__name"), Some(&FieldValue::Str("row-1".into())));
        assert_eq!(item.get("count"), Some(&FieldValue::Int(3)));
        assert_eq!(item_to_json(&item), json);
    }

    #[test]
    fn test_item_from_json_rejects_non_object() {
        assert!(item_from_json(&serde_json::json!([1, 2])).is_err());
        assert!(item_from_json(&serde_json::json!("text")).is_err());
    }

    #[test]
    fn test_require_key_field() {
        let mut item = Item::new();
        item.insert("__name".into(), FieldValue::Str("a".into()));
        assert!(require_key_field(&item, "__name", 0).is_ok());

        let err = require_key_field(&item, "id", 4).unwrap_err();
        match err {
            Error::MissingKeyField { field, row } => {
                assert_eq!(field, "id");
                assert_eq!(row, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_require_key_field_null_counts_as_missing() {
        let mut item = Item::new();
        item.insert("__name".into(), FieldValue::Null);
        assert!(require_key_field(&item, "__name", 0).is_err());
    }
}
