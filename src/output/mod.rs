//! Report formatters for command results.
//!
//! Every command produces a [`Report`], which is rendered as human-readable
//! text ([`text`]) or as JSON for scripting ([`json`]).
//!
//! # Example
//!
//! ```no_run
//! use dupfinder::duplicates::find_duplicates_in_tree;
//! use dupfinder::output::{Report, TreeReport};
//! use dupfinder::cli::OutputFormat;
//! use std::path::Path;
//!
//! let outcome = find_duplicates_in_tree(Path::new("."), false).unwrap();
//! let report = Report::Tree(TreeReport::new(Path::new("."), outcome));
//! report.write_to(&mut std::io::stdout(), OutputFormat::Json).unwrap();
//! ```

pub mod json;
pub mod text;

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::duplicates::{MatchResult, ScanSummary, TreeOutcome};
use crate::error::ExitCode;

pub use json::{JsonOutput, JsonOutputError};
pub use text::TextOutput;

/// Result of one command, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Report {
    /// `create-db` made a new index.
    Created {
        /// Location of the new index
        index: PathBuf,
    },
    /// `index-dir` stored the files of a directory.
    Indexed(IndexReport),
    /// `check-dir` compared a directory with the index.
    Checked(CheckReport),
    /// `find-dups-in-dir` compared a directory with itself.
    Tree(TreeReport),
    /// The index was in the wrong state for the command.
    NothingDone {
        /// Why nothing was done
        reason: String,
    },
}

impl Report {
    /// Exit code this report maps to.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Created { .. } | Self::Indexed(_) => ExitCode::Success,
            Self::Checked(r) if r.duplicate_files.is_empty() => ExitCode::NoDuplicates,
            Self::Tree(r) if r.duplicates.is_empty() => ExitCode::NoDuplicates,
            Self::Checked(_) | Self::Tree(_) => ExitCode::Success,
            Self::NothingDone { .. } => ExitCode::NothingDone,
        }
    }

    /// Render the report in `format`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or serialization fails.
    pub fn write_to<W: Write>(
        &self,
        writer: &mut W,
        format: OutputFormat,
    ) -> Result<(), JsonOutputError> {
        match format {
            OutputFormat::Text => TextOutput::new(self).write_to(writer)?,
            OutputFormat::Json => JsonOutput::new(self).write_to(writer, true)?,
        }
        Ok(())
    }
}

/// Outcome of `index-dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    /// Index written to
    pub index: PathBuf,
    /// Directory indexed
    pub dir: PathBuf,
    /// Records written
    pub indexed: usize,
    /// Files that disappeared before they could be hashed
    pub skipped: Vec<PathBuf>,
}

/// Outcome of `check-dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Index compared against
    pub index: PathBuf,
    /// Directory checked
    pub dir: PathBuf,
    /// Files with no indexed copy
    pub new_files: Vec<PathBuf>,
    /// Files already indexed
    pub duplicate_files: Vec<PathBuf>,
    /// Duplicates removed from disk
    pub deleted: usize,
    /// New files written to the index
    pub added: usize,
    /// Run statistics
    pub summary: ScanSummary,
}

impl CheckReport {
    /// Build a report from a match result. `deleted` and `added` start at 0.
    #[must_use]
    pub fn new(index: &Path, dir: &Path, result: &MatchResult) -> Self {
        Self {
            index: index.to_path_buf(),
            dir: dir.to_path_buf(),
            new_files: result.new_files.iter().map(|r| r.filepath.clone()).collect(),
            duplicate_files: result
                .duplicate_files
                .iter()
                .map(|r| r.filepath.clone())
                .collect(),
            deleted: 0,
            added: 0,
            summary: result.summary.clone(),
        }
    }
}

/// Outcome of `find-dups-in-dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeReport {
    /// Directory searched
    pub dir: PathBuf,
    /// First file of each content group, and unique files
    pub survivors: Vec<PathBuf>,
    /// Later copies, in the order they were found
    pub duplicates: Vec<PathBuf>,
    /// Duplicates removed from disk
    pub deleted: usize,
    /// Run statistics
    pub summary: ScanSummary,
}

impl TreeReport {
    #[must_use]
    pub fn new(dir: &Path, outcome: TreeOutcome) -> Self {
        Self {
            dir: dir.to_path_buf(),
            survivors: outcome.survivors,
            duplicates: outcome.duplicates,
            deleted: outcome.deleted,
            summary: outcome.summary,
        }
    }
}
