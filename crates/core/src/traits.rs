//! GridStore trait definition
//!
//! This trait defines the interface to a GridStore cluster: object access,
//! NoSQL table calls and stream calls. It decouples the CLI and the scan
//! engine from the web gateway HTTP implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::path::RemotePath;
use crate::scan::fetch::{ItemsPage, PageFetcher, PageRequest};
use crate::value::Item;

/// One data container on the cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerEntry {
    /// Numeric container id
    pub id: u64,

    /// Container name
    pub name: String,

    /// Creation timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<jiff::Timestamp>,
}

/// One object or prefix from a container listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Object key or prefix
    pub key: String,

    /// Size in bytes (None for prefixes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,

    /// Human-readable size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_human: Option<String>,

    /// Last modified timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<jiff::Timestamp>,

    /// Whether this is a directory/prefix
    pub is_dir: bool,
}

impl ObjectEntry {
    /// Create a new ObjectEntry for an object
    pub fn object(key: impl Into<String>, size: i64) -> Self {
        Self {
            key: key.into(),
            size_bytes: Some(size),
            size_human: Some(humansize::format_size(size as u64, humansize::BINARY)),
            last_modified: None,
            is_dir: false,
        }
    }

    /// Create a new ObjectEntry for a directory/prefix
    pub fn prefix(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size_bytes: None,
            size_human: None,
            last_modified: None,
            is_dir: true,
        }
    }
}

/// Result of a list operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectListing {
    /// Listed objects and prefixes
    pub entries: Vec<ObjectEntry>,

    /// Whether the result is truncated (more entries available)
    pub truncated: bool,

    /// Marker to resume a truncated listing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_marker: Option<String>,
}

/// Options for list operations
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Maximum number of keys to return per request
    pub max_keys: Option<u32>,

    /// Marker to resume a previous listing
    pub marker: Option<String>,

    /// Whether to list recursively (no delimiter grouping)
    pub recursive: bool,
}

/// Where to position a shard cursor before reading records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekTarget {
    /// Oldest retained record
    Earliest,
    /// Next record to arrive
    Latest,
    /// A specific sequence number
    Sequence(u64),
    /// First record at or after this time
    Time(jiff::Timestamp),
}

/// One consumed stream record
#[derive(Debug, Clone)]
pub struct StreamRecord {
    /// Sequence number within the shard
    pub sequence: u64,

    /// Partition key the producer attached, if any
    pub partition_key: Option<String>,

    /// Opaque producer metadata, if any
    pub client_info: Option<Vec<u8>>,

    /// When the record arrived at the platform
    pub arrival_time: Option<jiff::Timestamp>,

    /// Record payload
    pub data: Vec<u8>,
}

/// One batch of consumed records plus the cursor to continue from
#[derive(Debug, Clone)]
pub struct RecordBatch {
    /// Consumed records, oldest first
    pub records: Vec<StreamRecord>,

    /// Opaque location for the next read
    pub next_location: String,

    /// How many records remain after this batch, when reported
    pub records_behind_latest: Option<u64>,
}

/// One record to produce onto a stream
#[derive(Debug, Clone, Default)]
pub struct RecordData {
    /// Record payload
    pub data: Vec<u8>,

    /// Partition key controlling shard assignment
    pub partition_key: Option<String>,

    /// Opaque producer metadata
    pub client_info: Option<Vec<u8>>,

    /// Explicit shard override
    pub shard: Option<u32>,
}

impl RecordData {
    /// Create a record carrying only a payload
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }
}

/// Per-record outcome of a produce call
#[derive(Debug, Clone)]
pub struct RecordResult {
    /// Assigned sequence number on success
    pub sequence: Option<u64>,

    /// Shard the record landed on
    pub shard: Option<u32>,

    /// Platform error code on failure
    pub error_code: Option<i64>,

    /// Platform error message on failure
    pub error_message: Option<String>,
}

/// Outcome of a produce call
#[derive(Debug, Clone)]
pub struct PutRecordsReceipt {
    /// Number of records the platform failed to store
    pub failed: u64,

    /// Per-record outcomes, in submission order
    pub results: Vec<RecordResult>,
}

/// Trait for GridStore cluster operations
///
/// This trait is implemented by the web gateway adapter and can be mocked
/// for testing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GridStore: Send + Sync {
    /// List data containers
    async fn list_containers(&self) -> Result<Vec<ContainerEntry>>;

    /// List objects in a container or under a prefix
    async fn list_objects(&self, path: &RemotePath, options: ListOptions)
    -> Result<ObjectListing>;

    /// Get object content as bytes
    async fn get_object(&self, path: &RemotePath) -> Result<Vec<u8>>;

    /// Store an object
    async fn put_object(&self, path: &RemotePath, data: Vec<u8>) -> Result<()>;

    /// Delete an object
    async fn delete_object(&self, path: &RemotePath) -> Result<()>;

    /// Read a single table item
    async fn get_item(&self, path: &RemotePath, attributes: &[String]) -> Result<Item>;

    /// Write a single table item, optionally guarded by a condition
    async fn put_item<'a>(
        &self,
        path: &RemotePath,
        item: &Item,
        condition: Option<&'a str>,
    ) -> Result<()>;

    /// Update a table item with an expression, optionally guarded by a condition
    async fn update_item<'a>(
        &self,
        path: &RemotePath,
        expression: &str,
        condition: Option<&'a str>,
    ) -> Result<()>;

    /// Fetch one page of a table scan
    async fn get_items(&self, request: &PageRequest) -> Result<ItemsPage>;

    /// Delete a single table item
    async fn delete_item(&self, path: &RemotePath) -> Result<()>;

    /// Create a stream with the given shard count and retention
    async fn create_stream(
        &self,
        path: &RemotePath,
        shards: u32,
        retention_hours: u32,
    ) -> Result<()>;

    /// Resolve a shard seek target to an opaque read location
    async fn seek_shard(&self, path: &RemotePath, target: SeekTarget) -> Result<String>;

    /// Consume records from a shard starting at a location
    async fn get_records(
        &self,
        path: &RemotePath,
        location: &str,
        max_records: usize,
    ) -> Result<RecordBatch>;

    /// Produce records onto a stream
    async fn put_records(
        &self,
        path: &RemotePath,
        records: &[RecordData],
    ) -> Result<PutRecordsReceipt>;
}

/// Any GridStore implementation can serve scan pages directly.
#[async_trait]
impl<T: GridStore + ?Sized> PageFetcher for T {
    async fn fetch_page(&self, request: &PageRequest) -> Result<ItemsPage> {
        self.get_items(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_entry() {
        let entry = ObjectEntry::object("test.txt", 1024);
        assert_eq!(entry.key, "test.txt");
        assert_eq!(entry.size_bytes, Some(1024));
        assert!(!entry.is_dir);
    }

    #[test]
    fn test_prefix_entry() {
        let entry = ObjectEntry::prefix("path/to/dir/");
        assert_eq!(entry.key, "path/to/dir/");
        assert!(entry.is_dir);
        assert!(entry.size_bytes.is_none());
    }

    #[test]
    fn test_record_data_new() {
        let record = RecordData::new(b"payload".to_vec());
        assert_eq!(record.data, b"payload");
        assert!(record.partition_key.is_none());
        assert!(record.shard.is_none());
    }
}
