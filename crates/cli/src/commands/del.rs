//! del command - Delete a single object
//!
//! Removes one object from a container. For bulk table deletes see
//! delitems.

use clap::Args;
use gs_core::{AliasManager, GridStore as _, parse_remote_path};
use gs_webgate::GatewayClient;
use serde::Serialize;

use crate::exit_code::{ExitCode, exit_code_for};
use crate::output::{Formatter, OutputConfig};

/// Delete a single object
#[derive(Args, Debug)]
pub struct DelArgs {
    /// Remote object path (alias/container/key)
    pub path: String,
}

/// Output structure for del results (JSON format)
#[derive(Debug, Serialize)]
struct DelOutput {
    status: String,
    target: String,
}

/// Execute the del command
pub async fn execute(args: DelArgs, output_config: OutputConfig) -> ExitCode {
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

    match client.delete_object(&path).await {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&DelOutput {
                    status: "success".to_string(),
                    target: path.to_full_path(),
                });
            } else {
                formatter.success(&format!("Removed: {path}"));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to delete {path}: {e}"));
            exit_code_for(&e)
        }
    }
}
