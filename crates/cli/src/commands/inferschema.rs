//! inferschema command - Infer a table schema from sampled rows
//!
//! Samples rows from a table, derives per-column types, and writes the
//! resulting schema document to the table root unless --dry-run is given.

use std::sync::Arc;

use clap::Args;
use gs_core::{
    AliasManager, DEFAULT_KEY_FIELD, GridStore as _, SCHEMA_OBJECT, ScanQuery, TableSchema,
    infer_schema, parse_remote_path,
};
use gs_webgate::GatewayClient;
use serde::Serialize;

use crate::exit_code::{ExitCode, exit_code_for};
use crate::output::{Formatter, OutputConfig};

/// Infer a table schema from sampled rows
#[derive(Args, Debug)]
pub struct InferschemaArgs {
    /// Remote table path (alias/container/table)
    pub path: String,

    /// Key attribute the schema is built around
    #[arg(short, long, default_value = DEFAULT_KEY_FIELD)]
    pub key_field: String,

    /// Maximum rows to sample (0 means the whole table)
    #[arg(short, long, default_value = "50")]
    pub max_rows: usize,

    /// Number of parallel scan workers (defaults to the alias setting)
    #[arg(short, long)]
    pub workers: Option<u32>,

    /// Print the schema without writing it to the table
    #[arg(long)]
    pub dry_run: bool,
}

/// Output structure for inferschema results (JSON format)
#[derive(Debug, Serialize)]
struct InferschemaOutput {
    schema: TableSchema,
    written: bool,
    target: String,
}

/// Execute the inferschema command
pub async fn execute(args: InferschemaArgs, output_config: OutputConfig) -> ExitCode {
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

    let client = Arc::new(client);

    let mut query = ScanQuery::new(path.clone());
    query.workers = args.workers.unwrap_or_else(|| alias.scan_workers()).max(1) as usize;

    let limit = if args.max_rows == 0 {
        None
    } else {
        Some(args.max_rows)
    };

    let rows = match query.start(Arc::clone(&client)).collect(limit).await {
        Ok(rows) => rows,
        Err(e) => {
            formatter.error(&format!("Scan of {path} failed: {e}"));
            return exit_code_for(&e);
        }
    };

    if rows.is_empty() {
        formatter.error(&format!("No rows sampled from {path}; cannot infer a schema"));
        return ExitCode::GeneralError;
    }

    let schema = match infer_schema(&rows, &args.key_field) {
        Ok(s) => s,
        Err(e) => {
            formatter.error(&format!("Failed to infer schema: {e}"));
            return exit_code_for(&e);
        }
    };

    let schema_path = path.join(SCHEMA_OBJECT);

    let document = match serde_json::to_vec_pretty(&schema) {
        Ok(d) => d,
        Err(e) => {
            formatter.error(&format!("Failed to serialize schema: {e}"));
            return ExitCode::GeneralError;
        }
    };

    if !args.dry_run {
        if let Err(e) = client.put_object(&schema_path, document.clone()).await {
            formatter.error(&format!("Failed to write {schema_path}: {e}"));
            return exit_code_for(&e);
        }
    }

    if formatter.is_json() {
        formatter.json(&InferschemaOutput {
            schema,
            written: !args.dry_run,
            target: schema_path.to_full_path(),
        });
    } else {
        formatter.println(&String::from_utf8_lossy(&document));
        if args.dry_run {
            formatter.warning("Dry run: schema not written");
        } else {
            formatter.success(&format!("Schema written to {schema_path}"));
        }
    }

    ExitCode::Success
}
