//! Table schema inference
//!
//! Derives a column schema from a sample of table rows. The schema is the
//! JSON document query engines read from the `.#schema` object at the table
//! root.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::value::{FieldValue, Item, require_key_field};

/// Default key attribute carried by every table item
pub const DEFAULT_KEY_FIELD: &str = "__name";

/// Name of the schema object at the table root
pub const SCHEMA_OBJECT: &str = ".#schema";

/// One column in a table schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub nullable: bool,
}

/// A table schema document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    #[serde(rename = "hashingBucketNum")]
    pub hashing_bucket_num: u32,
    pub key: String,
    pub fields: Vec<SchemaField>,
}

struct ColumnState {
    field_type: Option<&'static str>,
    nullable: bool,
    seen: usize,
}

/// Infer a schema from sampled rows.
///
/// Column types widen when rows disagree: long and double merge to double,
/// any other mix falls back to string. A column is nullable when it is null
/// or absent in at least one sampled row. Every row must carry the key
/// attribute.
pub fn infer_schema(rows: &[Item], key: &str) -> Result<TableSchema> {
    let mut columns: BTreeMap<String, ColumnState> = BTreeMap::new();

    for (row_index, row) in rows.iter().enumerate() {
        require_key_field(row, key, row_index)?;
        for (name, value) in row {
            let state = columns.entry(name.clone()).or_insert(ColumnState {
                field_type: None,
                nullable: false,
                seen: 0,
            });
            state.seen += 1;
            match value {
                FieldValue::Null => state.nullable = true,
                other => {
                    state.field_type = Some(match state.field_type {
                        None => other.type_name(),
                        Some(existing) => merge_types(existing, other.type_name()),
                    });
                }
            }
        }
    }

    let fields = columns
        .into_iter()
        .map(|(name, state)| SchemaField {
            name,
            field_type: state.field_type.unwrap_or("string").to_string(),
            nullable: state.nullable || state.seen < rows.len(),
        })
        .collect();

    Ok(TableSchema {
        hashing_bucket_num: 0,
        key: key.to_string(),
        fields,
    })
}

fn merge_types(a: &'static str, b: &'static str) -> &'static str {
    if a == b {
        a
    } else if matches!((a, b), ("long", "double") | ("double", "long")) {
        "double"
    } else {
        "string"
    }
}
