//! put command - Upload an object from a file or stdin
//!
//! Reads the payload from a local file when -f is given, otherwise from
//! stdin, and stores it at the remote path.

use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use gs_core::{AliasManager, GridStore as _, parse_remote_path};
use gs_webgate::GatewayClient;
use serde::Serialize;

use crate::exit_code::{ExitCode, exit_code_for};
use crate::output::{Formatter, OutputConfig};

/// Upload an object from a file or stdin
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Remote object path (alias/container/key)
    pub path: String,

    /// Read the payload from this file instead of stdin
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Output structure for put results (JSON format)
#[derive(Debug, Serialize)]
struct PutOutput {
    status: String,
    target: String,
    size_bytes: usize,
    size_human: String,
}

/// Execute the put command
pub async fn execute(args: PutArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match parse_remote_path(&args.path) {
        Ok(p) => p,
        Err(e) => {
            formatter.error(&format!("Invalid path: {e}"));
            return ExitCode::UsageError;
        }
    };

    if path.key.is_empty() {
        formatter.error("Object path must include a key (alias/container/key)");
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

    let size = data.len();
    match client.put_object(&path, data).await {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&PutOutput {
                    status: "success".to_string(),
                    target: path.to_full_path(),
                    size_bytes: size,
                    size_human: humansize::format_size(size as u64, humansize::BINARY),
                });
            } else {
                formatter.success(&format!(
                    "Uploaded {} to {path}",
                    humansize::format_size(size as u64, humansize::BINARY)
                ));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to put {path}: {e}"));
            exit_code_for(&e)
        }
    }
}

/// Read the payload from a file or from stdin
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
