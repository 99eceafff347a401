//! ls command - List containers and directory contents
//!
//! Lists containers when given an alias only, or lists objects and prefixes
//! when given a container path.

use clap::Args;
use gs_core::{AliasManager, ContainerEntry, GridStore as _, ListOptions, ObjectEntry, RemotePath};
use gs_webgate::GatewayClient;
use serde::Serialize;

use crate::exit_code::{ExitCode, exit_code_for};
use crate::output::{Formatter, OutputConfig};

/// List containers or directory contents
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Remote path (alias, or alias/container[/prefix])
    pub path: String,

    /// List recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Summarize output (show totals)
    #[arg(long)]
    pub summarize: bool,
}

/// Output structure for container listings (JSON format)
#[derive(Debug, Serialize)]
struct LsContainersOutput {
    containers: Vec<ContainerEntry>,
}

/// Output structure for object listings (JSON format)
#[derive(Debug, Serialize)]
struct LsOutput {
    entries: Vec<ObjectEntry>,
    truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Summary>,
}

#[derive(Debug, Serialize)]
struct Summary {
    total_objects: usize,
    total_size_bytes: i64,
    total_size_human: String,
}

/// Execute the ls command
pub async fn execute(args: LsArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (alias_name, container, prefix) = match parse_ls_path(&args.path) {
        Ok(parsed) => parsed,
        Err(e) => {
            formatter.error(&e);
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

    let alias = match alias_manager.get(&alias_name) {
        Ok(a) => a,
        Err(_) => {
            formatter.error(&format!("Alias '{alias_name}' not found"));
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

    // No container means list the cluster's containers
    let Some(container) = container else {
        return list_containers(&client, &formatter, args.summarize).await;
    };

    let path = RemotePath::new(&alias_name, &container, prefix.unwrap_or_default());
    list_objects(&client, &path, &args, &formatter).await
}

async fn list_containers(client: &GatewayClient, formatter: &Formatter, summarize: bool) -> ExitCode {
    match client.list_containers().await {
        Ok(containers) => {
            if formatter.is_json() {
                formatter.json(&LsContainersOutput { containers });
            } else {
                for container in &containers {
                    let date = container
                        .created
                        .map(|d| d.strftime("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_else(|| "                   ".to_string());
                    formatter.println(&format!("[{date}] {}/", container.name));
                }
                if summarize {
                    formatter.println(&format!("\nTotal: {} containers", containers.len()));
                }
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to list containers: {e}"));
            exit_code_for(&e)
        }
    }
}

async fn list_objects(
    client: &GatewayClient,
    path: &RemotePath,
    args: &LsArgs,
    formatter: &Formatter,
) -> ExitCode {
    let mut all_entries = Vec::new();
    let mut marker: Option<String> = None;
    let mut is_truncated;

    // Paginate through all results
    loop {
        let options = ListOptions {
            recursive: args.recursive,
            max_keys: Some(1000),
            marker: marker.clone(),
        };

        match client.list_objects(path, options).await {
            Ok(listing) => {
                all_entries.extend(listing.entries);
                is_truncated = listing.truncated;
                marker = listing.next_marker;

                if !is_truncated || marker.is_none() {
                    break;
                }
            }
            Err(e) => {
                formatter.error(&format!("Failed to list {path}: {e}"));
                return exit_code_for(&e);
            }
        }
    }

    let total_objects = all_entries.iter().filter(|e| !e.is_dir).count();
    let total_size: i64 = all_entries.iter().filter_map(|e| e.size_bytes).sum();

    if formatter.is_json() {
        let output = LsOutput {
            entries: all_entries,
            truncated: is_truncated,
            summary: args.summarize.then(|| Summary {
                total_objects,
                total_size_bytes: total_size,
                total_size_human: humansize::format_size(total_size as u64, humansize::BINARY),
            }),
        };
        formatter.json(&output);
    } else {
        for entry in &all_entries {
            let date = entry
                .last_modified
                .map(|d| d.strftime("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "                   ".to_string());

            if entry.is_dir {
                formatter.println(&format!("[{date}]     0 B {}", entry.key));
            } else {
                let size = entry.size_human.clone().unwrap_or_else(|| "0 B".to_string());
                formatter.println(&format!("[{date}] {size:>7} {}", entry.key));
            }
        }

        if args.summarize {
            formatter.println(&format!(
                "\nTotal: {} objects, {}",
                total_objects,
                humansize::format_size(total_size as u64, humansize::BINARY)
            ));
        }
    }

    ExitCode::Success
}

/// Parse ls path into (alias, container, prefix)
fn parse_ls_path(path: &str) -> Result<(String, Option<String>, Option<String>), String> {
    let path = path.trim_end_matches('/');

    if path.is_empty() {
        return Err("Path cannot be empty".to_string());
    }

    let parts: Vec<&str> = path.splitn(3, '/').collect();

    match parts.len() {
        1 => Ok((parts[0].to_string(), None, None)),
        2 => Ok((parts[0].to_string(), Some(parts[1].to_string()), None)),
        3 => Ok((
            parts[0].to_string(),
            Some(parts[1].to_string()),
            Some(format!("{}/", parts[2])),
        )),
        _ => Err(format!("Invalid path format: {path}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ls_path_alias_only() {
        let (alias, container, prefix) = parse_ls_path("mygrid").unwrap();
        assert_eq!(alias, "mygrid");
        assert!(container.is_none());
        assert!(prefix.is_none());
    }

    #[test]
    fn test_parse_ls_path_alias_container() {
        let (alias, container, prefix) = parse_ls_path("mygrid/projects").unwrap();
        assert_eq!(alias, "mygrid");
        assert_eq!(container, Some("projects".to_string()));
        assert!(prefix.is_none());
    }

    #[test]
    fn test_parse_ls_path_with_prefix() {
        let (alias, container, prefix) = parse_ls_path("mygrid/projects/path/to").unwrap();
        assert_eq!(alias, "mygrid");
        assert_eq!(container, Some("projects".to_string()));
        assert_eq!(prefix, Some("path/to/".to_string()));
    }

    #[test]
    fn test_parse_ls_path_trailing_slash() {
        let (alias, container, prefix) = parse_ls_path("mygrid/projects/").unwrap();
        assert_eq!(alias, "mygrid");
        assert_eq!(container, Some("projects".to_string()));
        assert!(prefix.is_none());
    }

    #[test]
    fn test_parse_ls_path_empty() {
        assert!(parse_ls_path("").is_err());
    }
}
