//! getdir command - Download a directory of objects to the local filesystem
//!
//! Lists the remote prefix, then downloads each object into the target
//! directory, recreating the key hierarchy as local subdirectories.

use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};

use clap::Args;
use gs_core::{AliasManager, GridStore as _, ListOptions, ObjectEntry, parse_remote_path};
use gs_webgate::GatewayClient;
use serde::Serialize;

use crate::exit_code::{ExitCode, exit_code_for};
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Download a directory of objects to the local filesystem
#[derive(Args, Debug)]
pub struct GetdirArgs {
    /// Remote directory path (alias/container[/prefix])
    pub path: String,

    /// Local target directory
    #[arg(short, long, default_value = ".")]
    pub target_dir: PathBuf,

    /// Only download objects whose name matches this suffix (e.g. .parquet)
    #[arg(short, long)]
    pub suffix: Option<String>,

    /// Download recursively
    #[arg(short, long)]
    pub recursive: bool,
}

/// Output structure for getdir results (JSON format)
#[derive(Debug, Serialize)]
struct GetdirOutput {
    status: String,
    source: String,
    target: String,
    downloaded: usize,
    total_bytes: u64,
}

/// Execute the getdir command
pub async fn execute(args: GetdirArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config.clone());

    let mut path = match parse_remote_path(&args.path) {
        Ok(p) => p,
        Err(e) => {
            formatter.error(&format!("Invalid path: {e}"));
            return ExitCode::UsageError;
        }
    };

    // Directory semantics regardless of how the user typed the path
    if !path.key.is_empty() && !path.key.ends_with('/') {
        path.key.push('/');
        path.is_dir = true;
    }

    let suffix_pattern = match args.suffix.as_deref().map(suffix_pattern).transpose() {
        Ok(p) => p,
        Err(e) => {
            formatter.error(&format!("Invalid suffix: {e}"));
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

    // Collect the full object list up front so the progress bar has a total
    let mut objects: Vec<ObjectEntry> = Vec::new();
    let mut marker: Option<String> = None;

    loop {
        let options = ListOptions {
            recursive: args.recursive,
            max_keys: Some(1000),
            marker: marker.clone(),
        };

        match client.list_objects(&path, options).await {
            Ok(listing) => {
                objects.extend(listing.entries.into_iter().filter(|e| !e.is_dir));
                marker = listing.next_marker;
                if !listing.truncated || marker.is_none() {
                    break;
                }
            }
            Err(e) => {
                formatter.error(&format!("Failed to list {path}: {e}"));
                return exit_code_for(&e);
            }
        }
    }

    if let Some(pattern) = &suffix_pattern {
        objects.retain(|e| pattern.matches(file_name(&e.key)));
    }

    if objects.is_empty() {
        formatter.warning(&format!("No objects found under {path}"));
        return ExitCode::Success;
    }

    let progress = ProgressBar::new(&output_config, objects.len() as u64);
    let mut total_bytes: u64 = 0;

    for entry in &objects {
        let relative = relative_key(&entry.key, &path.key);
        let local = args
            .target_dir
            .join(relative.replace('/', MAIN_SEPARATOR_STR));

        if let Some(parent) = local.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                formatter.error(&format!("Failed to create {}: {e}", parent.display()));
                return ExitCode::GeneralError;
            }
        }

        let object_path = path.join(relative);
        match client.get_object(&object_path).await {
            Ok(data) => {
                total_bytes += data.len() as u64;
                if let Err(e) = std::fs::write(&local, data) {
                    formatter.error(&format!("Failed to write {}: {e}", local.display()));
                    return ExitCode::GeneralError;
                }
            }
            Err(e) => {
                formatter.error(&format!("Failed to get {object_path}: {e}"));
                return exit_code_for(&e);
            }
        }

        progress.inc(1);
    }

    progress.finish_and_clear();

    if formatter.is_json() {
        formatter.json(&GetdirOutput {
            status: "success".to_string(),
            source: path.to_full_path(),
            target: args.target_dir.display().to_string(),
            downloaded: objects.len(),
            total_bytes,
        });
    } else {
        formatter.success(&format!(
            "Downloaded {} objects ({}) to {}",
            objects.len(),
            humansize::format_size(total_bytes, humansize::BINARY),
            args.target_dir.display()
        ));
    }

    ExitCode::Success
}

/// Build a glob pattern matching file names ending with the given suffix
fn suffix_pattern(suffix: &str) -> Result<glob::Pattern, glob::PatternError> {
    glob::Pattern::new(&format!("*{suffix}"))
}

/// Strip the listing prefix from an object key
fn relative_key<'a>(key: &'a str, prefix: &str) -> &'a str {
    key.strip_prefix(prefix).unwrap_or(key)
}

fn file_name(key: &str) -> &str {
    match key.rfind('/') {
        Some(pos) => &key[pos + 1..],
        None => key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_key() {
        assert_eq!(relative_key("data/a/b.txt", "data/"), "a/b.txt");
        assert_eq!(relative_key("b.txt", ""), "b.txt");
        assert_eq!(relative_key("other/b.txt", "data/"), "other/b.txt");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("a/b/c.parquet"), "c.parquet");
        assert_eq!(file_name("plain.txt"), "plain.txt");
    }

    #[test]
    fn test_suffix_pattern() {
        let pattern = suffix_pattern(".parquet").unwrap();
        assert!(pattern.matches("part-0001.parquet"));
        assert!(!pattern.matches("part-0001.csv"));
    }
}
