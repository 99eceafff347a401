//! Parallel table scan engine
//!
//! Builds cursor-driven, optionally segmented scans on top of the paged
//! GetItems call: page fetching, worker fan-out, row decoding and the
//! consumer-facing cursor, plus scan-and-delete built on the same engine.

pub mod cursor;
pub mod delete;
pub mod fetch;

pub use cursor::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_POLL_INTERVAL, ItemCursor, ScanQuery};
pub use delete::{DeleteReport, delete_matching};
pub use fetch::{DEFAULT_PAGE_SIZE, ItemsPage, PageFetcher, PageRequest, ScanSegment};
