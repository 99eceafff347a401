//! getitem command - Read a single table item
//!
//! Reads one item by key and prints it as JSON. Use -a to limit which
//! attributes come back.

use clap::Args;
use gs_core::{AliasManager, GridStore as _, item_to_json, parse_remote_path};
use gs_webgate::GatewayClient;

use crate::exit_code::{ExitCode, exit_code_for};
use crate::output::{Formatter, OutputConfig};

/// Read a single table item
#[derive(Args, Debug)]
pub struct GetitemArgs {
    /// Remote item path (alias/container/table/key)
    pub path: String,

    /// Comma-separated attributes to fetch, or * for all
    #[arg(short, long, default_value = "*")]
    pub attributes: String,
}

/// Execute the getitem command
pub async fn execute(args: GetitemArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match parse_remote_path(&args.path) {
        Ok(p) => p,
        Err(e) => {
            formatter.error(&format!("Invalid path: {e}"));
            return ExitCode::UsageError;
        }
    };

    if path.key.is_empty() {
        formatter.error("Item path must include a table and key (alias/container/table/key)");
        return ExitCode::UsageError;
    }

    let attributes = parse_attributes(&args.attributes);

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

    match client.get_item(&path, &attributes).await {
        Ok(item) => {
            let json = item_to_json(&item);
            match serde_json::to_string_pretty(&json) {
                Ok(text) => formatter.println(&text),
                Err(e) => {
                    formatter.error(&format!("Failed to render item: {e}"));
                    return ExitCode::GeneralError;
                }
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to get item {path}: {e}"));
            exit_code_for(&e)
        }
    }
}

/// Split a comma-separated attribute list
pub(crate) fn parse_attributes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
