//! putrecord command - Produce a single record onto a stream
//!
//! Reads the payload from a file or stdin and appends it to the stream.
//! The partition key, when given, pins records to a shard.

use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use gs_core::{AliasManager, GridStore as _, RecordData, parse_remote_path};
use gs_webgate::GatewayClient;
use serde::Serialize;

use crate::exit_code::{ExitCode, exit_code_for};
use crate::output::{Formatter, OutputConfig};

/// Produce a single record onto a stream
#[derive(Args, Debug)]
pub struct PutrecordArgs {
    /// Remote stream path (alias/container/stream)
    pub path: String,

    /// Read the payload from this file instead of stdin
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Partition key controlling shard assignment
    #[arg(short = 'k', long)]
    pub partition_key: Option<String>,
}

/// Output structure for putrecord results (JSON format)
#[derive(Debug, Serialize)]
struct PutrecordOutput {
    status: String,
    target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sequence: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shard: Option<u32>,
}

/// Execute the putrecord command
pub async fn execute(args: PutrecordArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match parse_remote_path(&args.path) {
        Ok(p) => p,
        Err(e) => {
            formatter.error(&format!("Invalid path: {e}"));
            return ExitCode::UsageError;
        }
    };

    if path.key.is_empty() {
        formatter.error("Stream path must include a stream name (alias/container/stream)");
        return ExitCode::UsageError;
    }

    let data = match read_payload(args.file.as_deref()) {
        Ok(d) => d,
        Err(e) => {
            formatter.error(&format!("Failed to read input: {e}"));
            return ExitCode::GeneralError;
        }
    };

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

    let record = RecordData {
        data,
        partition_key: args.partition_key.clone(),
        ..Default::default()
    };

    match client.put_records(&path, &[record]).await {
        Ok(receipt) => {
            if receipt.failed > 0 {
                let reason = receipt
                    .results
                    .iter()
                    .find_map(|r| r.error_message.as_deref())
                    .unwrap_or("unknown error");
                formatter.error(&format!("Record rejected by {path}: {reason}"));
                return ExitCode::GeneralError;
            }

            let result = receipt.results.first();
            let sequence = result.and_then(|r| r.sequence);
            let shard = result.and_then(|r| r.shard);

            if formatter.is_json() {
                formatter.json(&PutrecordOutput {
                    status: "success".to_string(),
                    target: path.to_full_path(),
                    sequence,
                    shard,
                });
            } else {
                match (sequence, shard) {
                    (Some(sequence), Some(shard)) => formatter.success(&format!(
                        "Record stored on shard {shard} with sequence {sequence}"
                    )),
                    _ => formatter.success("Record stored"),
                }
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to put record to {path}: {e}"));
            exit_code_for(&e)
        }
    }
}

fn read_payload(file: Option<&std::path::Path>) -> std::io::Result<Vec<u8>> {
    match file {
        Some(path) => std::fs::read(path),
        None => {
            let mut data = Vec::new();
            std::io::stdin().lock().read_to_end(&mut data)?;
            Ok(data)
        }
    }
}
