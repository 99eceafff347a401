//! CLI command definitions and execution
//!
//! This module contains all CLI commands and their implementations.
//! Commands are grouped by the surface they touch: objects, table items,
//! and stream shards.

use clap::{Parser, Subcommand};

use crate::exit_code::ExitCode;
use crate::output::OutputConfig;

mod alias;
mod createstream;
mod del;
mod delitems;
mod get;
mod getdir;
mod getitem;
mod getitems;
mod getrecords;
mod inferschema;
mod ingest;
mod ls;
mod put;
mod putitem;
mod putrecord;
mod updateitem;

/// gs - GridStore CLI Client
///
/// A command-line interface for GridStore key-value, object and stream
/// storage, accessed through a web gateway endpoint.
#[derive(Parser, Debug)]
#[command(name = "gs")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress bar
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage gateway endpoint aliases
    #[command(subcommand)]
    Alias(alias::AliasCommands),

    /// List containers or directory contents
    Ls(ls::LsArgs),

    /// Retrieve an object's content
    Get(get::GetArgs),

    /// Download a directory of objects
    Getdir(getdir::GetdirArgs),

    /// Upload an object from a file or stdin
    Put(put::PutArgs),

    /// Delete an object
    Del(del::DelArgs),

    /// Retrieve a single table item
    Getitem(getitem::GetitemArgs),

    /// Query table items with filter and projection
    Getitems(getitems::GetitemsArgs),

    /// Write a table item
    Putitem(putitem::PutitemArgs),

    /// Update a table item with an expression
    Updateitem(updateitem::UpdateitemArgs),

    /// Delete all table items matching a filter
    Delitems(delitems::DelitemsArgs),

    /// Infer a table schema from sampled items
    Inferschema(inferschema::InferschemaArgs),

    /// Create a stream
    Createstream(createstream::CreatestreamArgs),

    /// Read records from a stream shard
    Getrecords(getrecords::GetrecordsArgs),

    /// Write a single record to a stream
    Putrecord(putrecord::PutrecordArgs),

    /// Bulk-load records into a table or stream
    Ingest(ingest::IngestArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Alias(cmd) => alias::execute(cmd, cli.json).await,
        Commands::Ls(args) => ls::execute(args, output_config).await,
        Commands::Get(args) => get::execute(args, output_config).await,
        Commands::Getdir(args) => getdir::execute(args, output_config).await,
        Commands::Put(args) => put::execute(args, output_config).await,
        Commands::Del(args) => del::execute(args, output_config).await,
        Commands::Getitem(args) => getitem::execute(args, output_config).await,
        Commands::Getitems(args) => getitems::execute(args, output_config).await,
        Commands::Putitem(args) => putitem::execute(args, output_config).await,
        Commands::Updateitem(args) => updateitem::execute(args, output_config).await,
        Commands::Delitems(args) => delitems::execute(args, output_config).await,
        Commands::Inferschema(args) => inferschema::execute(args, output_config).await,
        Commands::Createstream(args) => createstream::execute(args, output_config).await,
        Commands::Getrecords(args) => getrecords::execute(args, output_config).await,
        Commands::Putrecord(args) => putrecord::execute(args, output_config).await,
        Commands::Ingest(args) => ingest::execute(args, output_config).await,
    }
}
