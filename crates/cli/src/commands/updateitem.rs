//! updateitem command - Update a table item with an expression
//!
//! Applies an update expression (e.g. "age=age+1; city='berlin'") to one
//! item. An optional condition expression guards the update.

use clap::Args;
use gs_core::{AliasManager, GridStore as _, parse_remote_path};
use gs_webgate::GatewayClient;
use serde::Serialize;

use crate::exit_code::{ExitCode, exit_code_for};
use crate::output::{Formatter, OutputConfig};

/// Update a table item with an expression
#[derive(Args, Debug)]
pub struct UpdateitemArgs {
    /// Remote item path (alias/container/table/key)
    pub path: String,

    /// Update expression to apply
    #[arg(short, long)]
    pub expression: String,

    /// Condition expression that must hold for the update to apply
    #[arg(short = 'n', long)]
    pub condition: Option<String>,
}

/// Output structure for updateitem results (JSON format)
#[derive(Debug, Serialize)]
struct UpdateitemOutput {
    status: String,
    target: String,
}

/// Execute the updateitem command
pub async fn execute(args: UpdateitemArgs, output_config: OutputConfig) -> ExitCode {
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

    if args.expression.trim().is_empty() {
        formatter.error("Update expression cannot be empty");
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
        .update_item(&path, &args.expression, args.condition.as_deref())
        .await
    {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&UpdateitemOutput {
                    status: "success".to_string(),
                    target: path.to_full_path(),
                });
            } else {
                formatter.success(&format!("Updated item: {path}"));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to update item {path}: {e}"));
            exit_code_for(&e)
        }
    }
}
