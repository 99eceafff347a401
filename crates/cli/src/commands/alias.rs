//! Alias management commands
//!
//! Aliases are named references to GridStore web gateway endpoints,
//! including connection details, credentials and worker defaults.

use clap::Subcommand;
use serde::Serialize;

use crate::exit_code::ExitCode;
use gs_core::{Alias, AliasManager};

/// Alias subcommands for managing gateway connections
#[derive(Subcommand, Debug)]
pub enum AliasCommands {
    /// Add or update an alias
    Set(SetArgs),

    /// List all configured aliases
    List(ListArgs),

    /// Remove an alias
    Remove(RemoveArgs),
}

/// Arguments for the `alias set` command
#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Alias name (e.g., "mygrid")
    pub name: String,

    /// Web gateway URL (e.g., "http://localhost:8081")
    pub endpoint: String,

    /// Username for basic authentication
    #[arg(short, long)]
    pub username: Option<String>,

    /// Password for basic authentication
    #[arg(short, long)]
    pub password: Option<String>,

    /// Session access key, sent instead of basic auth
    #[arg(long)]
    pub access_key: Option<String>,

    /// Allow insecure TLS connections
    #[arg(long, default_value = "false")]
    pub insecure: bool,

    /// Default worker count for ingestion
    #[arg(short, long, default_value = "8")]
    pub workers: u32,

    /// Worker count for parallel scans (defaults to workers, capped at 8)
    #[arg(long)]
    pub query_workers: Option<u32>,
}

/// Arguments for the `alias list` command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show full details including worker settings
    #[arg(short, long)]
    pub long: bool,
}

/// Arguments for the `alias remove` command
#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Name of the alias to remove
    pub name: String,
}

/// JSON output for alias list
#[derive(Serialize)]
struct AliasListOutput {
    aliases: Vec<AliasInfo>,
}

/// Alias information for JSON output (without credentials)
#[derive(Serialize)]
struct AliasInfo {
    name: String,
    endpoint: String,
    workers: u32,
    query_workers: u32,
}

impl From<&Alias> for AliasInfo {
    fn from(alias: &Alias) -> Self {
        Self {
            name: alias.name.clone(),
            endpoint: alias.endpoint.clone(),
            workers: alias.workers,
            query_workers: alias.scan_workers(),
        }
    }
}

/// JSON output for alias set/remove operations
#[derive(Serialize)]
struct AliasOperationOutput {
    success: bool,
    alias: String,
    message: String,
}

/// Execute an alias subcommand
pub async fn execute(cmd: AliasCommands, json_output: bool) -> ExitCode {
    let alias_manager = match AliasManager::new() {
        Ok(am) => am,
        Err(e) => {
            if json_output {
                eprintln!("{}", serde_json::json!({"error": e.to_string()}));
            } else {
                eprintln!("Error: {e}");
            }
            return ExitCode::GeneralError;
        }
    };

    match cmd {
        AliasCommands::Set(args) => execute_set(args, &alias_manager, json_output).await,
        AliasCommands::List(args) => execute_list(args, &alias_manager, json_output).await,
        AliasCommands::Remove(args) => execute_remove(args, &alias_manager, json_output).await,
    }
}

async fn execute_set(args: SetArgs, manager: &AliasManager, json_output: bool) -> ExitCode {
    if args.access_key.is_some() && args.username.is_some() {
        let msg = "Use either --username/--password or --access-key, not both";
        if json_output {
            eprintln!("{}", serde_json::json!({"error": msg}));
        } else {
            eprintln!("Error: {msg}");
        }
        return ExitCode::UsageError;
    }

    let mut alias = Alias::new(&args.name, &args.endpoint);
    alias.username = args.username;
    alias.password = args.password;
    alias.access_key = args.access_key;
    alias.insecure = args.insecure;
    alias.workers = args.workers;
    alias.query_workers = args.query_workers;

    if let Err(e) = alias.validate() {
        if json_output {
            eprintln!("{}", serde_json::json!({"error": e.to_string()}));
        } else {
            eprintln!("Error: {e}");
        }
        return ExitCode::UsageError;
    }

    match manager.set(alias) {
        Ok(()) => {
            if json_output {
                let output = AliasOperationOutput {
                    success: true,
                    alias: args.name.clone(),
                    message: format!("Alias '{}' configured successfully", args.name),
                };
                println!("{}", serde_json::to_string_pretty(&output).unwrap());
            } else {
                println!("Alias '{}' configured successfully.", args.name);
            }
            ExitCode::Success
        }
        Err(e) => {
            if json_output {
                eprintln!("{}", serde_json::json!({"error": e.to_string()}));
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::GeneralError
        }
    }
}

async fn execute_list(args: ListArgs, manager: &AliasManager, json_output: bool) -> ExitCode {
    match manager.list() {
        Ok(aliases) => {
            if json_output {
                let output = AliasListOutput {
                    aliases: aliases.iter().map(AliasInfo::from).collect(),
                };
                println!("{}", serde_json::to_string_pretty(&output).unwrap());
            } else if aliases.is_empty() {
                println!("No aliases configured.");
            } else if args.long {
                // Long format with details
                for alias in &aliases {
                    println!(
                        "{:<12} {} (workers: {}, query workers: {})",
                        alias.name,
                        alias.endpoint,
                        alias.workers,
                        alias.scan_workers()
                    );
                }
            } else {
                // Short format
                for alias in &aliases {
                    println!("{:<12} {}", alias.name, alias.endpoint);
                }
            }
            ExitCode::Success
        }
        Err(e) => {
            if json_output {
                eprintln!("{}", serde_json::json!({"error": e.to_string()}));
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::GeneralError
        }
    }
}

async fn execute_remove(args: RemoveArgs, manager: &AliasManager, json_output: bool) -> ExitCode {
    match manager.remove(&args.name) {
        Ok(()) => {
            if json_output {
                let output = AliasOperationOutput {
                    success: true,
                    alias: args.name.clone(),
                    message: format!("Alias '{}' removed successfully", args.name),
                };
                println!("{}", serde_json::to_string_pretty(&output).unwrap());
            } else {
                println!("Alias '{}' removed successfully.", args.name);
            }
            ExitCode::Success
        }
        Err(gs_core::Error::AliasNotFound(_)) => {
            if json_output {
                eprintln!(
                    "{}",
                    serde_json::json!({"error": format!("Alias '{}' not found", args.name)})
                );
            } else {
                eprintln!("Error: Alias '{}' not found.", args.name);
            }
            ExitCode::NotFound
        }
        Err(e) => {
            if json_output {
                eprintln!("{}", serde_json::json!({"error": e.to_string()}));
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::GeneralError
        }
    }
}
