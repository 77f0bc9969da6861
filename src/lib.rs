//! DupFinder - content-based duplicate file finder
//!
//! Files are compared by size first and by XXH64 content digest only when
//! sizes collide. Two modes are provided:
//!
//! - **Indexed**: digests of known files live in an SQLite index
//!   ([`index::SqliteIndex`]); new directories are checked against it with
//!   [`duplicates::IndexMatcher`].
//! - **Stateless**: one directory is compared with itself
//!   ([`duplicates::DuplicateFinder`]); the first file found in every content
//!   group survives.

pub mod actions;
pub mod cli;
pub mod commands;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod index;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, Commands, OutputFormat};
use crate::commands::{CheckOptions, CreateOptions, IndexOptions, TreeOptions};
use crate::config::Config;
use crate::error::ExitCode;
use crate::progress::{Progress, ProgressCallback};

/// Run the parsed command line and return the process exit code.
///
/// # Errors
///
/// Any failure of the command, or of writing its report to stdout.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = Config::load();
    let quiet = cli.quiet || cli.output == OutputFormat::Json;
    let progress: Option<Arc<dyn ProgressCallback>> = if quiet {
        None
    } else {
        Some(Arc::new(Progress::new(false)))
    };

    let report = match cli.command {
        Commands::CreateDb(args) => commands::create_index(&CreateOptions {
            index_path: config.resolve_index_path(args.db.use_db.as_deref()),
        })?,
        Commands::IndexDir(args) => commands::index_directory(&IndexOptions {
            index_path: config.resolve_index_path(args.db.use_db.as_deref()),
            dir: args.dir,
            walker: args.walk.to_walker_config(),
            progress,
        })?,
        Commands::CheckDir(args) => commands::check_directory(&CheckOptions {
            index_path: config.resolve_index_path(args.db.use_db.as_deref()),
            dir: args.dir,
            walker: args.walk.to_walker_config(),
            delete_duplicates: args.delete_dup_files,
            add_new_files: args.add_new_files_to_index,
            progress,
        })?,
        Commands::FindDupsInDir(args) => commands::find_duplicates(&TreeOptions {
            dir: args.dir,
            walker: args.walk.to_walker_config(),
            delete_duplicates: args.delete_dup_files,
            progress,
        })?,
    };

    if !cli.quiet || cli.output == OutputFormat::Json {
        let stdout = std::io::stdout();
        report
            .write_to(&mut stdout.lock(), cli.output)
            .context("Failed to write report")?;
    }

    Ok(report.exit_code())
}
