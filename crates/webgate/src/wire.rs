//! Gateway JSON payloads
//!
//! Request and response bodies for the gateway's function calls, plus the
//! typed attribute encoding. Attributes travel as single-key objects tagging
//! the value with its type, for example `{"S": "text"}` or `{"N": "42"}`;
//! blobs are base64 strings.

use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use gs_core::error::{Error, Result};
use gs_core::traits::RecordData;
use gs_core::value::{FieldValue, Item};

/// A typed attribute value on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) enum WireValue {
    #[serde(rename = "S")]
    Str(String),
    #[serde(rename = "N")]
    Num(String),
    #[serde(rename = "B")]
    Blob(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
}

/// A row as the gateway sends it
pub(crate) type WireItem = BTreeMap<String, WireValue>;

pub(crate) fn encode_value(value: &FieldValue) -> WireValue {
    match value {
        FieldValue::Str(s) => WireValue::Str(s.clone()),
        FieldValue::Int(n) => WireValue::Num(n.to_string()),
        // Debug keeps the decimal point on integral doubles
        FieldValue::Float(f) => WireValue::Num(format!("{f:?}")),
        FieldValue::Bool(b) => WireValue::Bool(*b),
        FieldValue::Blob(b) => WireValue::Blob(BASE64.encode(b)),
        FieldValue::Null => WireValue::Null(true),
    }
}

pub(crate) fn decode_value(value: &WireValue) -> Result<FieldValue> {
    match value {
        WireValue::Str(s) => Ok(FieldValue::Str(s.clone())),
        WireValue::Num(n) => {
            if let Ok(int) = n.parse::<i64>() {
                Ok(FieldValue::Int(int))
            } else {
                n.parse::<f64>()
                    .map(FieldValue::Float)
                    .map_err(|_| Error::Server(format!("Invalid numeric attribute: {n}")))
            }
        }
        WireValue::Blob(b) => decode_blob(b).map(FieldValue::Blob),
        WireValue::Bool(b) => Ok(FieldValue::Bool(*b)),
        WireValue::Null(_) => Ok(FieldValue::Null),
    }
}

pub(crate) fn encode_item(item: &Item) -> WireItem {
    item.iter()
        .map(|(name, value)| (name.clone(), encode_value(value)))
        .collect()
}

pub(crate) fn decode_item(item: &WireItem) -> Result<Item> {
    let mut decoded = Item::new();
    for (name, value) in item {
        decoded.insert(name.clone(), decode_value(value)?);
    }
    Ok(decoded)
}

pub(crate) fn decode_blob(encoded: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(encoded)
        .map_err(|e| Error::Server(format!("Invalid base64 payload: {e}")))
}

pub(crate) fn encode_record(record: &RecordData) -> WirePutRecord {
    WirePutRecord {
        data: BASE64.encode(&record.data),
        client_info: record.client_info.as_deref().map(|b| BASE64.encode(b)),
        partition_key: record.partition_key.clone(),
        shard_id: record.shard,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetItemRequest {
    pub attributes_to_get: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetItemResponse {
    pub item: WireItem,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PutItemRequest {
    pub item: WireItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct UpdateItemRequest {
    pub update_expression: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetItemsRequest {
    pub attributes_to_get: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    pub limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_segment: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetItemsResponse {
    #[serde(default)]
    pub items: Vec<WireItem>,
    #[serde(default)]
    pub next_marker: Option<String>,
    #[serde(default)]
    pub last_item_included: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CreateStreamRequest {
    pub shard_count: u32,
    pub retention_period_hours: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SeekShardRequest {
    #[serde(rename = "Type")]
    pub seek_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_sequence_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_sec: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_n_sec: Option<i64>,
}

impl SeekShardRequest {
    pub(crate) fn of_type(seek_type: &str) -> Self {
        Self {
            seek_type: seek_type.to_string(),
            starting_sequence_number: None,
            timestamp_sec: None,
            timestamp_n_sec: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SeekShardResponse {
    pub location: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetRecordsRequest {
    pub location: String,
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetRecordsResponse {
    pub next_location: String,
    #[serde(default)]
    pub records_behind_latest: Option<u64>,
    #[serde(default)]
    pub records: Vec<WireRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireRecord {
    #[serde(default)]
    pub arrival_time_sec: Option<i64>,
    #[serde(default)]
    pub arrival_time_n_sec: Option<i64>,
    pub sequence_number: u64,
    #[serde(default)]
    pub client_info: Option<String>,
    #[serde(default)]
    pub partition_key: Option<String>,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PutRecordsRequest {
    pub records: Vec<WirePutRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WirePutRecord {
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard_id: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PutRecordsResponse {
    #[serde(default)]
    pub failed_record_count: u64,
    #[serde(default)]
    pub records: Vec<WirePutResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WirePutResult {
    #[serde(default)]
    pub sequence_number: Option<u64>,
    #[serde(default)]
    pub shard_id: Option<u32>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ListContainersResponse {
    #[serde(default)]
    pub containers: Vec<WireContainer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireContainer {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub creation_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ListObjectsResponse {
    #[serde(default)]
    pub common_prefixes: Vec<String>,
    #[serde(default)]
    pub contents: Vec<WireObject>,
    #[serde(default)]
    pub next_marker: Option<String>,
    #[serde(default)]
    pub is_truncated: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireObject {
    pub key: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub last_modified: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_value_shape() {
        let json = serde_json::to_value(WireValue::Str("text".into())).unwrap();
        assert_eq!(json, serde_json::json!({"S": "text"}));

        let json = serde_json::to_value(WireValue::Num("42".into())).unwrap();
        assert_eq!(json, serde_json::json!({"N": "42"}));

        let json = serde_json::to_value(WireValue::Null(true)).unwrap();
        assert_eq!(json, serde_json::json!({"NULL": true}));
    }

    #[test]
    fn test_encode_decode_item() {
        let mut item = Item::new();
        item.insert("__name".into(), FieldValue::Str("row-1".into()));
        item.insert("count".into(), FieldValue::Int(7));
        item.insert("ratio".into(), FieldValue::Float(2.0));
        item.insert("raw".into(), FieldValue::Blob(vec![0, 1, 2]));
        item.insert("gone".into(), FieldValue::Null);

        let wire = encode_item(&item);
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["count"], serde_json::json!({"N": "7"}));
        // integral doubles keep their decimal point
        assert_eq!(json["ratio"], serde_json::json!({"N": "2.0"}));
        assert_eq!(json["raw"], serde_json::json!({"B": "AAEC"}));

        let decoded = decode_item(&wire).unwrap();
        assert_eq!(decoded, item);
    }

    #[test]
    fn test_decode_rejects_bad_number() {
        let value = WireValue::Num("not-a-number".into());
        assert!(decode_value(&value).is_err());
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        let value = WireValue::Blob("%%not-base64%%".into());
        assert!(decode_value(&value).is_err());
    }

    #[test]
    fn test_get_items_response_parse() {
        let raw = r#"{
            "Items": [
                {"__name": {"S": "a"}, "age": {"N": "30"}},
                {"__name": {"S": "b"}, "age": {"N": "29.5"}}
            ],
            "NextMarker": "opaque-marker",
            "LastItemIncluded": "FALSE"
        }"#;
        let response: GetItemsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.items.len(), 2);
        assert_eq!(response.next_marker.as_deref(), Some("opaque-marker"));
        assert_eq!(response.last_item_included.as_deref(), Some("FALSE"));

        let first = decode_item(&response.items[0]).unwrap();
        assert_eq!(first.get("age"), Some(&FieldValue::Int(30)));
        let second = decode_item(&response.items[1]).unwrap();
        assert_eq!(second.get("age"), Some(&FieldValue::Float(29.5)));
    }

    #[test]
    fn test_get_items_request_skips_absent_fields() {
        let request = GetItemsRequest {
            attributes_to_get: "*".into(),
            filter_expression: None,
            marker: None,
            limit: 256,
            segment: None,
            total_segment: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"AttributesToGet": "*", "Limit": 256})
        );
    }

    #[test]
    fn test_seek_request_names() {
        let request = SeekShardRequest {
            starting_sequence_number: Some(17),
            ..SeekShardRequest::of_type("SEQUENCE")
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Type": "SEQUENCE", "StartingSequenceNumber": 17})
        );
    }

    #[test]
    fn test_records_response_parse() {
        let raw = r#"{
            "NextLocation": "loc-2",
            "RecordsBehindLatest": 0,
            "Records": [
                {"SequenceNumber": 5, "Data": "aGVsbG8=", "PartitionKey": "pk"}
            ]
        }"#;
        let response: GetRecordsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.next_location, "loc-2");
        assert_eq!(response.records_behind_latest, Some(0));
        assert_eq!(response.records[0].sequence_number, 5);
        assert_eq!(decode_blob(&response.records[0].data).unwrap(), b"hello");
    }
}
