//! Paged fetch primitive for table scans
//!
//! A scan advances through a table one page at a time. Each page carries an
//! opaque continuation marker and a done flag; the engine feeds markers back
//! verbatim and never inspects them.

use async_trait::async_trait;

use crate::error::Result;
use crate::path::RemotePath;
use crate::value::Item;

/// Default page size for table scans
pub const DEFAULT_PAGE_SIZE: usize = 256;

/// A server-side partition of a parallel scan
///
/// The pair is attached to page requests and passed through to the backend
/// untouched. Within one scan, `total` is constant and `index` ranges over
/// `0..total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSegment {
    pub index: usize,
    pub total: usize,
}

/// One page request within a cursor chain
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// Table path
    pub path: RemotePath,

    /// Attributes to project; `["*"]` selects all
    pub attributes: Vec<String>,

    /// Server-side filter expression
    pub filter: Option<String>,

    /// Continuation marker from the previous page, None for the first page
    pub marker: Option<String>,

    /// Maximum rows per page
    pub limit: usize,

    /// Partition this chain scans, None for an unpartitioned scan
    pub segment: Option<ScanSegment>,
}

impl PageRequest {
    /// First-page request projecting all attributes
    pub fn new(path: RemotePath) -> Self {
        Self {
            path,
            attributes: vec!["*".to_string()],
            filter: None,
            marker: None,
            limit: DEFAULT_PAGE_SIZE,
            segment: None,
        }
    }
}

/// One page of scan results
#[derive(Debug, Clone, Default)]
pub struct ItemsPage {
    /// Decoded rows in server order
    pub items: Vec<Item>,

    /// Marker for the next page, echoed back verbatim
    pub next_marker: Option<String>,

    /// True when this page ends the chain
    pub last: bool,
}

/// One paged fetch against a table
///
/// Implemented for every [`crate::traits::GridStore`]; mockable so the scan
/// engine can be tested without a gateway.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<ItemsPage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        let path = RemotePath::new("mygrid", "projects", "table");
        let request = PageRequest::new(path);
        assert_eq!(request.attributes, vec!["*".to_string()]);
        assert_eq!(request.limit, DEFAULT_PAGE_SIZE);
        assert!(request.marker.is_none());
        assert!(request.segment.is_none());
    }
}
