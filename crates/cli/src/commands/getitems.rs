//! getitems command - Scan a table and print matching items
//!
//! Fans the scan out across parallel workers, each covering one segment of
//! the table, and prints the merged row stream. Row order across workers
//! is not defined.

use std::sync::Arc;

use clap::Args;
use gs_core::{AliasManager, ScanQuery, item_to_json, parse_remote_path};
use gs_webgate::GatewayClient;

use crate::commands::getitem::parse_attributes;
use crate::exit_code::{ExitCode, exit_code_for};
use crate::output::{Formatter, OutputConfig};

/// Scan a table and print matching items
#[derive(Args, Debug)]
pub struct GetitemsArgs {
    /// Remote table path (alias/container/table)
    pub path: String,

    /// Comma-separated attributes to fetch, or * for all
    #[arg(short, long, default_value = "*")]
    pub attributes: String,

    /// Server-side filter expression (e.g. "age > 30")
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Maximum rows to print (0 means unlimited)
    #[arg(short, long, default_value = "50")]
    pub max_rows: usize,

    /// Number of parallel scan workers (defaults to the alias setting)
    #[arg(short, long)]
    pub workers: Option<u32>,

    /// Rows requested per page
    #[arg(long, default_value = "256")]
    pub page_size: usize,
}

/// Execute the getitems command
pub async fn execute(args: GetitemsArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match parse_remote_path(&args.path) {
        Ok(p) => p,
        Err(e) => {
            formatter.error(&format!("Invalid path: {e}"));
            return ExitCode::UsageError;
        }
    };

    if path.key.is_empty() {
        formatter.error("Table path must include a table name (alias/container/table)");
        return ExitCode::UsageError;
    }

    let alias_manager = match AliasManager::new() {
        Ok(am) => am,
        Err(e) => {
            formatter.error(&format!("Failed to load aliases: {e}"));
            return ExitCode::GeneralError;
        }
    };

    let alias = match alias_manager.get(&path.alias) {
        Ok(a) => a,
        Err(_) => {
            formatter.error(&format!("Alias '{}' not found", path.alias));
            return ExitCode::NotFound;
        }
    };

    let client = match GatewayClient::new(&alias) {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to create gateway client: {e}"));
            return ExitCode::GeneralError;
        }
    };

    let mut query = ScanQuery::new(path.clone());
    query.attributes = parse_attributes(&args.attributes);
    query.filter = args.filter.clone();
    query.workers = args.workers.unwrap_or_else(|| alias.scan_workers()).max(1) as usize;
    query.page_size = args.page_size.max(1);

    let cursor = query.start(Arc::new(client));

    match cursor.collect(row_limit(args.max_rows)).await {
        Ok(items) => {
            if formatter.is_json() {
                let rows: Vec<serde_json::Value> = items.iter().map(item_to_json).collect();
                formatter.json(&rows);
            } else {
                // one compact JSON object per line, so output can be piped
                for item in &items {
                    match serde_json::to_string(&item_to_json(item)) {
                        Ok(line) => formatter.println(&line),
                        Err(e) => {
                            formatter.error(&format!("Failed to render row: {e}"));
                            return ExitCode::GeneralError;
                        }
                    }
                }
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Scan of {path} failed: {e}"));
            exit_code_for(&e)
        }
    }
}

/// Translate the max-rows flag into a collect limit
fn row_limit(max_rows: usize) -> Option<usize> {
    if max_rows == 0 { None } else { Some(max_rows) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_limit() {
        assert_eq!(row_limit(0), None);
        assert_eq!(row_limit(50), Some(50));
    }
}
