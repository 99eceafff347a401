//! gs-core: Core library for the gs GridStore CLI client
//!
//! This crate provides the core functionality for the gs CLI, including:
//! - Configuration management
//! - Alias management
//! - Path parsing and resolution
//! - Typed attribute values and schema inference
//! - GridStore trait for gateway operations
//! - The parallel table scan engine
//!
//! This crate is independent of any wire protocol; the web gateway adapter
//! implements the GridStore trait, and the scan engine can run against any
//! page fetcher.

pub mod alias;
pub mod config;
pub mod error;
pub mod path;
pub mod scan;
pub mod schema;
pub mod traits;
pub mod value;

pub use alias::{Alias, AliasManager, TimeoutConfig};
pub use config::{Config, ConfigManager};
pub use error::{DeleteFailure, Error, Result};
pub use path::{RemotePath, parse_remote_path};
pub use scan::{
    DeleteReport, ItemCursor, ItemsPage, PageFetcher, PageRequest, ScanQuery, ScanSegment,
    delete_matching,
};
pub use schema::{DEFAULT_KEY_FIELD, SCHEMA_OBJECT, SchemaField, TableSchema, infer_schema};
pub use traits::{
    ContainerEntry, GridStore, ListOptions, ObjectEntry, ObjectListing, PutRecordsReceipt,
    RecordBatch, RecordData, RecordResult, SeekTarget, StreamRecord,
};
pub use value::{FieldValue, Item, item_from_json, item_to_json, require_key_field};
