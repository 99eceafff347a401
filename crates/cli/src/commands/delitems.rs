//! delitems command - Delete every table item matching a filter
//!
//! Scans the table for matching keys, then deletes them one by one.
//! Without --force the command asks for confirmation; per-key failures
//! are enumerated instead of aborting the pass.

use std::io::Write;
use std::sync::Arc;

use clap::Args;
use gs_core::{AliasManager, DEFAULT_KEY_FIELD, Error, ScanQuery, delete_matching, parse_remote_path};
use gs_webgate::GatewayClient;
use serde::Serialize;

use crate::exit_code::{ExitCode, exit_code_for};
use crate::output::{Formatter, OutputConfig};

/// Delete every table item matching a filter
#[derive(Args, Debug)]
pub struct DelitemsArgs {
    /// Remote table path (alias/container/table)
    pub path: String,

    /// Server-side filter expression; omit to delete all items
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Delete without asking for confirmation
    #[arg(long)]
    pub force: bool,

    /// Number of parallel scan workers (defaults to the alias setting)
    #[arg(short, long)]
    pub workers: Option<u32>,
}

/// Output structure for delitems results (JSON format)
#[derive(Debug, Serialize)]
struct DelitemsOutput {
    status: String,
    target: String,
    matched: usize,
    deleted: usize,
}

/// Execute the delitems command
pub async fn execute(args: DelitemsArgs, output_config: OutputConfig) -> ExitCode {
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

    if !args.force {
        // JSON and quiet modes cannot prompt
        if formatter.is_json() || formatter.is_quiet() {
            formatter.error("Deleting items requires --force in non-interactive mode");
            return ExitCode::UsageError;
        }

        let what = match &args.filter {
            Some(filter) => format!("items matching '{filter}' in {path}"),
            None => format!("ALL items in {path}"),
        };
        if !confirm(&format!("Delete {what}?")) {
            formatter.warning("Aborted");
            return ExitCode::Success;
        }
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
    query.filter = args.filter.clone();
    query.workers = args.workers.unwrap_or_else(|| alias.scan_workers()).max(1) as usize;

    match delete_matching(Arc::new(client), &query, DEFAULT_KEY_FIELD).await {
        Ok(report) => {
            if formatter.is_json() {
                formatter.json(&DelitemsOutput {
                    status: "success".to_string(),
                    target: path.to_full_path(),
                    matched: report.matched,
                    deleted: report.deleted,
                });
            } else {
                formatter.success(&format!(
                    "Deleted {} of {} matched items from {path}",
                    report.deleted, report.matched
                ));
            }
            ExitCode::Success
        }
        Err(Error::PartialDelete { failures }) => {
            formatter.error(&format!("{} items could not be deleted:", failures.len()));
            for failure in &failures {
                formatter.error(&format!("  {}: {}", failure.key, failure.error));
            }
            ExitCode::GeneralError
        }
        Err(e) => {
            formatter.error(&format!("Failed to delete items from {path}: {e}"));
            exit_code_for(&e)
        }
    }
}

/// Ask for confirmation on stderr, reading the answer from stdin
fn confirm(prompt: &str) -> bool {
    eprint!("{prompt} [y/N]: ");
    let _ = std::io::stderr().flush();

    let mut line = String::new();
    if std::io::stdin().read_line(&mut line).is_err() {
        return false;
    }
    is_affirmative(&line)
}

fn is_affirmative(input: &str) -> bool {
    matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative("Y"));
        assert!(is_affirmative("yes\n"));
        assert!(is_affirmative("  YES  "));
    }

    #[test]
    fn test_is_not_affirmative() {
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("no"));
        assert!(!is_affirmative("yep"));
    }
}
