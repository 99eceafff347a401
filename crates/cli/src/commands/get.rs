//! get command - Retrieve an object and write it to stdout
//!
//! Retrieves the object's content as-is, so output can be piped into
//! files or other tools.

use std::io::Write;

use clap::Args;
use gs_core::{AliasManager, GridStore as _, parse_remote_path};
use gs_webgate::GatewayClient;

use crate::exit_code::{ExitCode, exit_code_for};
use crate::output::{Formatter, OutputConfig};

/// Retrieve an object and write it to stdout
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Remote object path (alias/container/key)
    pub path: String,
}

/// Execute the get command
pub async fn execute(args: GetArgs, output_config: OutputConfig) -> ExitCode {
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

    match client.get_object(&path).await {
        Ok(data) => {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = stdout.write_all(&data).and_then(|()| stdout.flush()) {
                formatter.error(&format!("Failed to write output: {e}"));
                return ExitCode::GeneralError;
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to get {path}: {e}"));
            exit_code_for(&e)
        }
    }
}
