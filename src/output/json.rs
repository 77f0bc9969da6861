//! JSON report formatter.
//!
//! Provides machine-readable output for scripting.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "report": {
//!     "command": "tree",
//!     "dir": "/data",
//!     "survivors": ["/data/a.txt"],
//!     "duplicates": ["/data/b.txt"],
//!     "deleted": 0,
//!     "summary": {
//!       "total_files": 2,
//!       "hashed_files": 2,
//!       "duplicate_files": 1,
//!       "reclaimable_bytes": 4
//!     }
//!   },
//!   "exit_code": 0,
//!   "exit_code_name": "DF000"
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use super::Report;

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    /// The command's report
    pub report: &'a Report,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DF000")
    pub exit_code_name: &'static str,
}

impl<'a> JsonOutput<'a> {
    /// Wrap a report together with its exit code.
    #[must_use]
    pub fn new(report: &'a Report) -> Self {
        let exit_code = report.exit_code();
        Self {
            report,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix(),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if a path is not valid UTF-8.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if a path is not valid UTF-8.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur while writing a report.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error while writing report: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicates::ScanSummary;
    use crate::output::{CheckReport, IndexReport};
    use std::path::PathBuf;

    #[test]
    fn test_nothing_done_schema() {
        let report = Report::NothingDone {
            reason: "Index not found: /x.db".to_string(),
        };
        let json = JsonOutput::new(&report).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["report"]["command"], "nothing_done");
        assert_eq!(value["report"]["reason"], "Index not found: /x.db");
        assert_eq!(value["exit_code"], 3);
        assert_eq!(value["exit_code_name"], "DF003");
    }

    #[test]
    fn test_indexed_schema() {
        let report = Report::Indexed(IndexReport {
            index: PathBuf::from("/i.db"),
            dir: PathBuf::from("/data"),
            indexed: 3,
            skipped: vec![PathBuf::from("/data/gone")],
        });
        let value: serde_json::Value =
            serde_json::from_str(&JsonOutput::new(&report).to_json().unwrap()).unwrap();

        assert_eq!(value["report"]["command"], "indexed");
        assert_eq!(value["report"]["indexed"], 3);
        assert_eq!(value["report"]["skipped"][0], "/data/gone");
        assert_eq!(value["exit_code"], 0);
    }

    #[test]
    fn test_checked_without_duplicates_exit_code() {
        let report = Report::Checked(CheckReport {
            index: PathBuf::from("/i.db"),
            dir: PathBuf::from("/data"),
            new_files: vec![PathBuf::from("/data/new")],
            duplicate_files: vec![],
            deleted: 0,
            added: 1,
            summary: ScanSummary::default(),
        });
        let value: serde_json::Value =
            serde_json::from_str(&JsonOutput::new(&report).to_json().unwrap()).unwrap();

        assert_eq!(value["report"]["command"], "checked");
        assert_eq!(value["report"]["summary"]["total_files"], 0);
        assert_eq!(value["exit_code_name"], "DF002");
    }

    #[test]
    fn test_pretty_has_newlines() {
        let report = Report::Created {
            index: PathBuf::from("/i.db"),
        };
        let mut buffer = Vec::new();
        JsonOutput::new(&report).write_to(&mut buffer, true).unwrap();
        let out = String::from_utf8(buffer).unwrap();
        assert!(out.contains('\n'));
        assert!(out.ends_with("}\n"));
    }
}
