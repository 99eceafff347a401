//! putitem command - Write a single table item
//!
//! Reads an item as a JSON object from a file or stdin and writes it at
//! the given key. An optional condition expression guards the write.

use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use gs_core::{AliasManager, GridStore as _, Item, item_from_json, parse_remote_path};
use gs_webgate::GatewayClient;
use serde::Serialize;

use crate::exit_code::{ExitCode, exit_code_for};
use crate::output::{Formatter, OutputConfig};

/// Write a single table item
#[derive(Args, Debug)]
pub struct PutitemArgs {
    /// Remote item path (alias/container/table/key)
    pub path: String,

    /// Read the item JSON from this file instead of stdin
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Condition expression that must hold for the write to apply
    #[arg(short = 'n', long)]
    pub condition: Option<String>,
}

/// Output structure for putitem results (JSON format)
#[derive(Debug, Serialize)]
struct PutitemOutput {
    status: String,
    target: String,
    attributes: usize,
}

/// Execute the putitem command
pub async fn execute(args: PutitemArgs, output_config: OutputConfig) -> ExitCode {
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

    let data = match read_input(args.file.as_deref()) {
        Ok(d) => d,
        Err(e) => {
            formatter.error(&format!("Failed to read input: {e}"));
            return ExitCode::GeneralError;
        }
    };

    let item = match parse_item(&data) {
        Ok(i) => i,
        Err(e) => {
            formatter.error(&format!("Invalid item: {e}"));
            return ExitCode::UsageError;
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

    let attributes = item.len();
    match client
        .put_item(&path, &item, args.condition.as_deref())
        .await
    {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&PutitemOutput {
                    status: "success".to_string(),
                    target: path.to_full_path(),
                    attributes,
                });
            } else {
                formatter.success(&format!("Wrote item: {path}"));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to put item {path}: {e}"));
            exit_code_for(&e)
        }
    }
}

/// Parse the input bytes as a JSON object item
fn parse_item(data: &[u8]) -> gs_core::Result<Item> {
    let value: serde_json::Value = serde_json::from_slice(data)?;
    item_from_json(&value)
}

fn read_input(file: Option<&std::path::Path>) -> std::io::Result<Vec<u8>> {
    match file {
        Some(path) => std::fs::read(path),
        None => {
            let mut data = Vec::new();
            std::io::stdin().lock().read_to_end(&mut data)?;
            Ok(data)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gs_core::FieldValue;

    #[test]
    fn test_parse_item_object() {
        let item = parse_item(br#"{"name": "bob", "age": 42}"#).unwrap();
        assert_eq!(item.get("name"), Some(&FieldValue::Str("bob".to_string())));
        assert_eq!(item.get("age"), Some(&FieldValue::Int(42)));
    }

    #[test]
    fn test_parse_item_rejects_array() {
        assert!(parse_item(b"[1, 2, 3]").is_err());
    }

    #[test]
    fn test_parse_item_rejects_garbage() {
        assert!(parse_item(b"not json").is_err());
    }
}
