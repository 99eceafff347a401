//! Filtered item deletion
//!
//! Deletes every table item matching a scan query. Matching keys are
//! materialized first, then removed one by one; per-key failures are
//! collected rather than aborting the pass.

use std::sync::Arc;

use crate::error::{DeleteFailure, Error, Result};
use crate::traits::GridStore;
use crate::value::FieldValue;

use super::cursor::ScanQuery;

/// Outcome of a filtered delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteReport {
    /// Rows the scan matched
    pub matched: usize,

    /// Items actually removed
    pub deleted: usize,
}

/// Delete every item the query matches.
///
/// The scan projects only the key attribute; rows missing it end the scan
/// with an error before anything is deleted. When some deletes fail the
/// result is [`Error::PartialDelete`] naming each failed key and its cause.
pub async fn delete_matching<S>(
    store: Arc<S>,
    query: &ScanQuery,
    key_field: &str,
) -> Result<DeleteReport>
where
    S: GridStore + ?Sized + 'static,
{
    let mut scan = query.clone();
    scan.attributes = vec![key_field.to_string()];
    scan.required_key = Some(key_field.to_string());

    let rows = scan.start(Arc::clone(&store)).collect(None).await?;
    let matched = rows.len();

    let keys: Vec<String> = rows
        .iter()
        .filter_map(|item| item.get(key_field))
        .filter_map(FieldValue::as_str)
        .map(String::from)
        .collect();

    let mut deleted = 0usize;
    let mut failures = Vec::new();

    for key in keys {
        let path = query.path.join(&key);
        match store.delete_item(&path).await {
            Ok(()) => deleted += 1,
            Err(error) => {
                tracing::warn!("failed to delete {path}: {error}");
                failures.push(DeleteFailure { key, error });
            }
        }
    }

    if failures.is_empty() {
        Ok(DeleteReport { matched, deleted })
    } else {
        Err(Error::PartialDelete { failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::RemotePath;
    use crate::scan::fetch::ItemsPage;
    use crate::traits::MockGridStore;
    use crate::value::Item;

    fn table_path() -> RemotePath {
        RemotePath::new("mygrid", "projects", "mytable")
    }

    fn keyed(name: &str) -> Item {
        let mut item = Item::new();
        item.insert("__name".to_string(), FieldValue::Str(name.to_string()));
        item
    }

    fn single_page(names: &[String]) -> ItemsPage {
        ItemsPage {
            items: names.iter().map(|n| keyed(n)).collect(),
            next_marker: None,
            last: true,
        }
    }

    #[tokio::test]
    async fn test_delete_matching_removes_every_key() {
        let mut store = MockGridStore::new();
        let names: Vec<String> = (0..4).map(|n| format!("k{n}")).collect();
        let page = single_page(&names);
        store
            .expect_get_items()
            .times(1)
            .returning(move |_| Ok(page.clone()));
        store.expect_delete_item().times(4).returning(|_| Ok(()));

        let query = ScanQuery::new(table_path());
        let report = delete_matching(Arc::new(store), &query, "__name")
            .await
            .unwrap();
        assert_eq!(report.matched, 4);
        assert_eq!(report.deleted, 4);
    }

    #[tokio::test]
    async fn test_partial_failures_are_enumerated() {
        let mut store = MockGridStore::new();
        let names: Vec<String> = (0..10).map(|n| format!("k{n}")).collect();
        let page = single_page(&names);
        store
            .expect_get_items()
            .times(1)
            .returning(move |_| Ok(page.clone()));
        store.expect_delete_item().times(10).returning(|path| {
            if path.file_name() == "k3" || path.file_name() == "k7" {
                Err(Error::Server("still referenced".into()))
            } else {
                Ok(())
            }
        });

        let query = ScanQuery::new(table_path());
        let err = delete_matching(Arc::new(store), &query, "__name")
            .await
            .unwrap_err();
        match err {
            Error::PartialDelete { failures } => {
                assert_eq!(failures.len(), 2);
                let keys: Vec<&str> = failures.iter().map(|f| f.key.as_str()).collect();
                assert_eq!(keys, vec!["k3", "k7"]);
                assert!(matches!(failures[0].error, Error::Server(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_match_deletes_nothing() {
        let mut store = MockGridStore::new();
        store.expect_get_items().times(1).returning(|_| {
            Ok(ItemsPage {
                items: Vec::new(),
                next_marker: None,
                last: true,
            })
        });
        // no delete_item expectation: any call would fail the test

        let query = ScanQuery::new(table_path());
        let report = delete_matching(Arc::new(store), &query, "__name")
            .await
            .unwrap();
        assert_eq!(report.matched, 0);
        assert_eq!(report.deleted, 0);
    }

    #[tokio::test]
    async fn test_scan_error_aborts_before_any_delete() {
        let mut store = MockGridStore::new();
        store
            .expect_get_items()
            .times(1)
            .returning(|_| Err(Error::Transport("gateway unreachable".into())));

        let query = ScanQuery::new(table_path());
        let err = delete_matching(Arc::new(store), &query, "__name")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
