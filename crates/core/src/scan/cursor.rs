//! Parallel scan cursor
//!
//! A scan fans a table out across worker tasks. Each worker advances its own
//! cursor chain sequentially (marker in, marker out) and publishes decoded
//! rows into one bounded channel. The consumer sees a merged stream with no
//! cross-worker ordering.
//!
//! The first error any worker hits is recorded once and ends the scan: the
//! consumer's iterator goes terminal, rows still buffered are dropped, and
//! the remaining workers stop at their next cancellation point (between page
//! fetches).

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::path::RemotePath;
use crate::value::{Item, require_key_field};

use super::fetch::{DEFAULT_PAGE_SIZE, ItemsPage, PageFetcher, PageRequest, ScanSegment};

/// Default bound for the row handoff channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Default interval for re-checking the error slot while parked on an
/// empty channel
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A parallel table scan request
///
/// `workers` chooses how many segments the table is fanned out across; one
/// worker scans an unpartitioned table. At most `channel_capacity` rows sit
/// queued between producers and the consumer, plus one in-hand row per
/// worker.
#[derive(Debug, Clone)]
pub struct ScanQuery {
    /// Table path
    pub path: RemotePath,

    /// Attributes to project; `["*"]` selects all
    pub attributes: Vec<String>,

    /// Server-side filter expression
    pub filter: Option<String>,

    /// Number of parallel scan workers
    pub workers: usize,

    /// Rows requested per page
    pub page_size: usize,

    /// Bound on rows queued between workers and the consumer
    pub channel_capacity: usize,

    /// How often the consumer re-checks for worker errors while parked
    pub poll_interval: Duration,

    /// Key attribute every row must carry, validated during decode
    pub required_key: Option<String>,
}

impl ScanQuery {
    /// Scan of a whole table with default settings
    pub fn new(path: RemotePath) -> Self {
        Self {
            path,
            attributes: vec!["*".to_string()],
            filter: None,
            workers: 1,
            page_size: DEFAULT_PAGE_SIZE,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            required_key: None,
        }
    }

    /// Launch the scan and return a cursor over the merged row stream.
    ///
    /// Workers are spawned onto the current Tokio runtime.
    pub fn start<F>(&self, fetcher: Arc<F>) -> ItemCursor
    where
        F: PageFetcher + ?Sized + 'static,
    {
        let workers = self.workers.max(1);
        let shared = Arc::new(ScanShared::new());
        let (tx, rx) = mpsc::channel(self.channel_capacity.max(1));

        tracing::debug!("starting scan of {} with {workers} workers", self.path);

        for index in 0..workers {
            let request = PageRequest {
                path: self.path.clone(),
                attributes: self.attributes.clone(),
                filter: self.filter.clone(),
                marker: None,
                limit: self.page_size,
                segment: (workers > 1).then_some(ScanSegment {
                    index,
                    total: workers,
                }),
            };
            tokio::spawn(run_worker(
                Arc::clone(&fetcher),
                Arc::clone(&shared),
                tx.clone(),
                request,
                self.required_key.clone(),
            ));
        }
        // the channel closes once the last worker drops its sender
        drop(tx);

        ItemCursor {
            rx,
            shared,
            poll_interval: self.poll_interval,
            current: None,
            error: None,
            finished: false,
        }
    }
}

/// State shared between scan workers and the consumer
#[derive(Debug)]
struct ScanShared {
    /// Set once `error` holds the scan's first error
    failed: AtomicBool,

    /// Tells workers to stop at their next cancellation point
    stop: AtomicBool,

    /// First error reported by any worker
    error: Mutex<Option<Error>>,
}

impl ScanShared {
    fn new() -> Self {
        Self {
            failed: AtomicBool::new(false),
            stop: AtomicBool::new(false),
            error: Mutex::new(None),
        }
    }

    /// Record the first error and signal all workers to stop.
    ///
    /// The slot is written before the failed flag so a consumer that sees
    /// the flag always finds the error.
    fn record_error(&self, err: Error) {
        {
            let mut slot = self
                .error
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if slot.is_none() {
                *slot = Some(err);
            }
        }
        self.failed.store(true, Ordering::SeqCst);
        self.stop.store(true, Ordering::SeqCst);
    }
}

/// One worker: advance a single cursor chain until it ends, the scan is
/// stopped, or an error occurs.
async fn run_worker<F>(
    fetcher: Arc<F>,
    shared: Arc<ScanShared>,
    tx: mpsc::Sender<Item>,
    mut request: PageRequest,
    required_key: Option<String>,
) where
    F: PageFetcher + ?Sized,
{
    let mut row_index = 0usize;
    loop {
        if shared.stop.load(Ordering::SeqCst) {
            return;
        }

        let page: ItemsPage = match fetcher.fetch_page(&request).await {
            Ok(page) => page,
            Err(err) => {
                tracing::debug!("scan worker stopping: {err}");
                shared.record_error(err);
                return;
            }
        };

        for item in page.items {
            if let Some(field) = &required_key {
                if let Err(err) = require_key_field(&item, field, row_index) {
                    shared.record_error(err);
                    return;
                }
            }
            row_index += 1;
            if tx.send(item).await.is_err() {
                // consumer abandoned the scan
                return;
            }
        }

        if page.last {
            return;
        }
        match page.next_marker {
            Some(marker) => request.marker = Some(marker),
            // no marker to continue with; treat as end of chain
            None => return,
        }
    }
}

/// Cursor over the merged row stream of a scan
///
/// Call [`next`](ItemCursor::next) to advance; it returns false once the
/// scan is exhausted or an error surfaced. The terminal state is sticky:
/// further calls keep returning false and [`err`](ItemCursor::err) keeps
/// returning the same error.
pub struct ItemCursor {
    rx: mpsc::Receiver<Item>,
    shared: Arc<ScanShared>,
    poll_interval: Duration,
    current: Option<Item>,
    error: Option<Error>,
    finished: bool,
}

impl ItemCursor {
    /// Advance to the next row. Returns false when the scan is done.
    pub async fn next(&mut self) -> bool {
        if self.finished {
            return false;
        }
        loop {
            if self.shared.failed.load(Ordering::SeqCst) {
                // buffered rows are dropped once an error is visible
                self.finish_with_error();
                return false;
            }
            match tokio::time::timeout(self.poll_interval, self.rx.recv()).await {
                Ok(Some(item)) => {
                    self.current = Some(item);
                    return true;
                }
                Ok(None) => {
                    // all workers finished; one may have failed right at the end
                    if self.shared.failed.load(Ordering::SeqCst) {
                        self.finish_with_error();
                    } else {
                        self.current = None;
                        self.finished = true;
                    }
                    return false;
                }
                // parked too long; re-check the error slot
                Err(_) => {}
            }
        }
    }

    /// The row the last successful [`next`](ItemCursor::next) advanced to
    pub fn current(&self) -> Option<&Item> {
        self.current.as_ref()
    }

    /// Take ownership of the current row
    pub fn take_current(&mut self) -> Option<Item> {
        self.current.take()
    }

    /// The error that ended the scan, if any
    pub fn err(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Drain the cursor into a vector, stopping after `limit` rows when
    /// given. Stopping early releases the workers.
    pub async fn collect(mut self, limit: Option<usize>) -> Result<Vec<Item>> {
        let mut rows = Vec::new();
        if limit == Some(0) {
            return Ok(rows);
        }
        while self.next().await {
            if let Some(item) = self.take_current() {
                rows.push(item);
            }
            if let Some(max) = limit {
                if rows.len() >= max {
                    return Ok(rows);
                }
            }
        }
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(rows),
        }
    }

    fn finish_with_error(&mut self) {
        if self.error.is_none() {
            let mut slot = self
                .shared
                .error
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            self.error = slot.take();
        }
        self.current = None;
        self.finished = true;
        self.shared.stop.store(true, Ordering::SeqCst);
        self.rx.close();
    }
}

impl Drop for ItemCursor {
    fn drop(&mut self) {
        // workers notice at their next cancellation point
        self.shared.stop.store(true, Ordering::SeqCst);
    }
}
