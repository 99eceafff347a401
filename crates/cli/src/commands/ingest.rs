//! ingest command - Bulk load newline-delimited input
//!
//! Reads lines from a file or stdin and loads them through a generator:
//! json2kv parses each line as a JSON object and writes it as a table
//! item keyed by the key field, line2stream produces each line as a
//! stream record. Table ingestion fans out across parallel workers.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use clap::Args;
use gs_core::{
    AliasManager, FieldValue, GridStore as _, Item, RecordData, RemotePath, item_from_json,
    parse_remote_path,
};
use gs_webgate::GatewayClient;
use serde::Serialize;

use crate::exit_code::{ExitCode, exit_code_for};
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Records per put_records call in line2stream mode
const STREAM_BATCH_SIZE: usize = 100;

/// Bulk load newline-delimited input
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Remote table or stream path (alias/container/target)
    pub path: String,

    /// Read input from this file instead of stdin
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Number of parallel ingest workers (defaults to the alias setting)
    #[arg(short, long)]
    pub workers: Option<u32>,

    /// Input generator: json2kv (table items) or line2stream (stream records)
    #[arg(short, long, default_value = "json2kv")]
    pub generator: String,

    /// Attribute that keys each table item (json2kv only)
    #[arg(short, long, default_value = "__name")]
    pub key_field: String,
}

/// Output structure for ingest results (JSON format)
#[derive(Debug, Serialize)]
struct IngestOutput {
    status: String,
    target: String,
    generator: String,
    total: u64,
    succeeded: u64,
    failed: u64,
}

/// Execute the ingest command
pub async fn execute(args: IngestArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config.clone());

    if let Err(e) = validate_generator(&args.generator) {
        formatter.error(&e);
        return ExitCode::UsageError;
    }

    let path = match parse_remote_path(&args.path) {
        Ok(p) => p,
        Err(e) => {
            formatter.error(&format!("Invalid path: {e}"));
            return ExitCode::UsageError;
        }
    };

    if path.key.is_empty() {
        formatter.error("Ingest path must include a table or stream name");
        return ExitCode::UsageError;
    }

    let lines = match read_lines(args.file.as_deref()) {
        Ok(l) => l,
        Err(e) => {
            formatter.error(&format!("Failed to read input: {e}"));
            return ExitCode::GeneralError;
        }
    };

    if lines.is_empty() {
        formatter.warning("No input lines to ingest");
        return ExitCode::Success;
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
        Ok(c) => Arc::new(c),
        Err(e) => {
            formatter.error(&format!("Failed to create gateway client: {e}"));
            return ExitCode::GeneralError;
        }
    };

    let total = lines.len() as u64;
    let progress = Arc::new(ProgressBar::new(&output_config, total));

    let outcome = match args.generator.as_str() {
        "json2kv" => {
            let workers = args.workers.unwrap_or(alias.workers).max(1) as usize;
            ingest_items(client, path.clone(), lines, &args.key_field, workers, &progress).await
        }
        _ => ingest_records(client, &path, lines, &progress).await,
    };

    progress.finish_and_clear();

    let (succeeded, failed) = match outcome {
        Ok(counts) => counts,
        Err(e) => {
            formatter.error(&format!("Ingest into {path} failed: {e}"));
            return exit_code_for(&e);
        }
    };

    if formatter.is_json() {
        formatter.json(&IngestOutput {
            status: if failed == 0 { "success" } else { "partial" }.to_string(),
            target: path.to_full_path(),
            generator: args.generator.clone(),
            total,
            succeeded,
            failed,
        });
    } else if failed == 0 {
        formatter.success(&format!("Ingested {succeeded} of {total} lines into {path}"));
    } else {
        formatter.error(&format!(
            "Ingested {succeeded} of {total} lines into {path}, {failed} failed"
        ));
    }

    if failed == 0 {
        ExitCode::Success
    } else {
        ExitCode::GeneralError
    }
}

/// Fan table item writes out across worker tasks fed from one queue
async fn ingest_items(
    client: Arc<GatewayClient>,
    path: RemotePath,
    lines: Vec<String>,
    key_field: &str,
    workers: usize,
    progress: &Arc<ProgressBar>,
) -> gs_core::Result<(u64, u64)> {
    let (tx, rx) = tokio::sync::mpsc::channel::<String>(1024);
    let rx = Arc::new(tokio::sync::Mutex::new(rx));

    let feeder = tokio::spawn(async move {
        for line in lines {
            if tx.send(line).await.is_err() {
                break;
            }
        }
    });

    let succeeded = Arc::new(AtomicU64::new(0));
    let failed = Arc::new(AtomicU64::new(0));

    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let client = Arc::clone(&client);
        let rx = Arc::clone(&rx);
        let path = path.clone();
        let key_field = key_field.to_string();
        let succeeded = Arc::clone(&succeeded);
        let failed = Arc::clone(&failed);
        let progress = Arc::clone(progress);

        handles.push(tokio::spawn(async move {
            loop {
                // hold the lock only while receiving, not during the write
                let line = { rx.lock().await.recv().await };
                let Some(line) = line else { break };

                match build_item(&line, &key_field) {
                    Ok((key, item)) => {
                        let item_path = path.join(&key);
                        match client.put_item(&item_path, &item, None).await {
                            Ok(()) => {
                                succeeded.fetch_add(1, Ordering::Relaxed);
                            }
                            Err(e) => {
                                failed.fetch_add(1, Ordering::Relaxed);
                                tracing::warn!("failed to write {item_path}: {e}");
                            }
                        }
                    }
                    Err(e) => {
                        failed.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!("skipping line: {e}");
                    }
                }
                progress.inc(1);
            }
        }));
    }

    let _ = feeder.await;
    futures::future::join_all(handles).await;

    Ok((
        succeeded.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
    ))
}

/// Produce lines as stream records in fixed-size batches
async fn ingest_records(
    client: Arc<GatewayClient>,
    path: &RemotePath,
    lines: Vec<String>,
    progress: &Arc<ProgressBar>,
) -> gs_core::Result<(u64, u64)> {
    let mut succeeded = 0u64;
    let mut failed = 0u64;

    for chunk in lines.chunks(STREAM_BATCH_SIZE) {
        let records: Vec<RecordData> = chunk
            .iter()
            .map(|line| RecordData::new(line.clone().into_bytes()))
            .collect();

        let receipt = client.put_records(path, &records).await?;
        failed += receipt.failed;
        succeeded += records.len() as u64 - receipt.failed;
        progress.inc(records.len() as u64);
    }

    Ok((succeeded, failed))
}

/// Parse one input line into a keyed table item
fn build_item(line: &str, key_field: &str) -> Result<(String, Item), String> {
    let value: serde_json::Value =
        serde_json::from_str(line).map_err(|e| format!("invalid JSON: {e}"))?;
    let item = item_from_json(&value).map_err(|e| e.to_string())?;
    let key = record_key(&item, key_field)
        .ok_or_else(|| format!("no usable '{key_field}' attribute"))?;
    Ok((key, item))
}

/// Key attribute as an item key string. Only strings and integers key rows.
fn record_key(item: &Item, field: &str) -> Option<String> {
    match item.get(field)? {
        FieldValue::Str(s) => Some(s.clone()),
        FieldValue::Int(n) => Some(n.to_string()),
        _ => None,
    }
}

fn validate_generator(generator: &str) -> Result<(), String> {
    match generator {
        "json2kv" | "line2stream" => Ok(()),
        other => Err(format!(
            "Unknown generator: {other} (expected json2kv or line2stream)"
        )),
    }
}

/// Read non-empty input lines from a file or stdin
fn read_lines(file: Option<&std::path::Path>) -> std::io::Result<Vec<String>> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().lock().read_to_string(&mut buffer)?;
            buffer
        }
    };
    Ok(raw
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_generator() {
        assert!(validate_generator("json2kv").is_ok());
        assert!(validate_generator("line2stream").is_ok());
        assert!(validate_generator("csv2kv").is_err());
    }

    #[test]
    fn test_build_item_keys_by_field() {
        let (key, item) = build_item(r#"{"__name": "row-7", "count": 3}"#, "__name").unwrap();
        assert_eq!(key, "row-7");
        assert_eq!(item.get("count"), Some(&FieldValue::Int(3)));
    }

    #[test]
    fn test_build_item_integer_key() {
        let (key, _) = build_item(r#"{"id": 42, "v": "x"}"#, "id").unwrap();
        assert_eq!(key, "42");
    }

    #[test]
    fn test_build_item_missing_key() {
        assert!(build_item(r#"{"count": 3}"#, "__name").is_err());
    }

    #[test]
    fn test_build_item_rejects_bad_json() {
        assert!(build_item("not json", "__name").is_err());
    }

    #[test]
    fn test_record_key_rejects_non_scalar_keys() {
        let mut item = Item::new();
        item.insert("k".into(), FieldValue::Bool(true));
        assert!(record_key(&item, "k").is_none());
        assert!(record_key(&item, "missing").is_none());
    }
}
