//! Command-line interface definitions for dupfinder.
//!
//! Global options (verbosity, output format) apply to every subcommand.
//!
//! # Example
//!
//! ```bash
//! # Create an index and fill it from a directory
//! dupfinder create-db -d ~/photos.db
//! dupfinder index-dir -d ~/photos.db ~/Pictures
//!
//! # Report files under ~/Downloads that are already indexed, then delete them
//! dupfinder check-dir -d ~/photos.db --delete-dup-files ~/Downloads
//!
//! # Find duplicates inside one directory without an index
//! dupfinder find-dups-in-dir --output json ~/Downloads
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::scanner::WalkerConfig;

/// Content-based duplicate file finder.
///
/// Files are compared by size first and by XXH64 content digest only when
/// sizes collide. Digests of known files can be kept in an SQLite index.
#[derive(Debug, Parser)]
#[command(name = "dupfinder")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub output: OutputFormat,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new, empty index
    #[command(alias = "create_db")]
    CreateDb(CreateDbArgs),
    /// Hash every file in a directory and add it to the index
    #[command(alias = "index_dir")]
    IndexDir(IndexDirArgs),
    /// Report files in a directory that are already in the index
    #[command(alias = "check_dir")]
    CheckDir(CheckDirArgs),
    /// Find duplicates within one directory, without an index
    #[command(alias = "find_dups_in_dir")]
    FindDupsInDir(FindDupsArgs),
}

/// Index location, shared by the index subcommands.
#[derive(Debug, Clone, Default, Args)]
pub struct DbArgs {
    /// Path to the index database (default: ~/DupFinder.db)
    #[arg(
        short = 'd',
        long = "use-db",
        alias = "use_db",
        value_name = "PATH",
        env = "DUPFINDER_DB"
    )]
    pub use_db: Option<PathBuf>,
}

/// Traversal options, shared by the subcommands that walk a directory.
#[derive(Debug, Clone, Default, Args)]
pub struct WalkArgs {
    /// Follow symbolic links during traversal
    ///
    /// A file reachable through several links is listed once.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Skip zero-length files
    #[arg(long)]
    pub skip_empty: bool,
}

impl WalkArgs {
    /// Convert to the walker's configuration.
    #[must_use]
    pub fn to_walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(self.follow_symlinks, self.skip_hidden, self.skip_empty)
    }
}

/// Arguments for `create-db`.
#[derive(Debug, Args)]
pub struct CreateDbArgs {
    #[command(flatten)]
    pub db: DbArgs,
}

/// Arguments for `index-dir`.
#[derive(Debug, Args)]
pub struct IndexDirArgs {
    #[command(flatten)]
    pub db: DbArgs,

    #[command(flatten)]
    pub walk: WalkArgs,

    /// Directory to index
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,
}

/// Arguments for `check-dir`.
#[derive(Debug, Args)]
pub struct CheckDirArgs {
    #[command(flatten)]
    pub db: DbArgs,

    #[command(flatten)]
    pub walk: WalkArgs,

    /// Permanently delete the files that are already indexed
    #[arg(long)]
    pub delete_dup_files: bool,

    /// Hash the files that are not indexed yet and add them
    #[arg(short = 'a', long)]
    pub add_new_files_to_index: bool,

    /// Directory to check
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,
}

/// Arguments for `find-dups-in-dir`.
#[derive(Debug, Args)]
pub struct FindDupsArgs {
    #[command(flatten)]
    pub walk: WalkArgs,

    /// Permanently delete every duplicate, keeping the first copy found
    #[arg(long)]
    pub delete_dup_files: bool,

    /// Directory to search
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,
}

/// Report format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
