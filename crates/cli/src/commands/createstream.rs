//! createstream command - Create a stream
//!
//! Creates a stream with a fixed shard count and retention period. Shards
//! live under the stream path and are addressed by shard id.

use clap::Args;
use gs_core::{AliasManager, GridStore as _, parse_remote_path};
use gs_webgate::GatewayClient;
use serde::Serialize;

use crate::exit_code::{ExitCode, exit_code_for};
use crate::output::{Formatter, OutputConfig};

/// Create a stream
#[derive(Args, Debug)]
pub struct CreatestreamArgs {
    /// Remote stream path (alias/container/stream)
    pub path: String,

    /// Number of shards
    #[arg(short = 'n', long, default_value = "1")]
    pub shards: u32,

    /// Retention period in hours
    #[arg(short, long, default_value = "24")]
    pub retention_hours: u32,
}

/// Output structure for createstream results (JSON format)
#[derive(Debug, Serialize)]
struct CreatestreamOutput {
    status: String,
    target: String,
    shards: u32,
    retention_hours: u32,
}

/// Execute the createstream command
pub async fn execute(args: CreatestreamArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let mut path = match parse_remote_path(&args.path) {
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

    // Streams are directories; shards live underneath
    if !path.key.ends_with('/') {
        path.key.push('/');
        path.is_dir = true;
    }

    if args.shards == 0 {
        formatter.error("Shard count must be at least 1");
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

    match client
        .create_stream(&path, args.shards, args.retention_hours)
        .await
    {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&CreatestreamOutput {
                    status: "success".to_string(),
                    target: path.to_full_path(),
                    shards: args.shards,
                    retention_hours: args.retention_hours,
                });
            } else {
                formatter.success(&format!(
                    "Created stream {path} with {} shards, {}h retention",
                    args.shards, args.retention_hours
                ));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to create stream {path}: {e}"));
            exit_code_for(&e)
        }
    }
}
