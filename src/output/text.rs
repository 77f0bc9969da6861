//! Plain text report formatter.

use std::io::{self, Write};
use std::path::PathBuf;

use super::{CheckReport, IndexReport, Report, TreeReport};
use crate::duplicates::ScanSummary;

/// Human-readable rendering of a [`Report`].
#[derive(Debug, Clone, Copy)]
pub struct TextOutput<'a> {
    report: &'a Report,
}

impl<'a> TextOutput<'a> {
    #[must_use]
    pub fn new(report: &'a Report) -> Self {
        Self { report }
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        match self.report {
            Report::Created { index } => {
                writeln!(writer, "Created index {}", index.display())
            }
            Report::Indexed(r) => write_indexed(writer, r),
            Report::Checked(r) => write_checked(writer, r),
            Report::Tree(r) => write_tree(writer, r),
            Report::NothingDone { reason } => writeln!(writer, "Nothing done: {}", reason),
        }
    }
}

fn write_indexed<W: Write>(w: &mut W, r: &IndexReport) -> io::Result<()> {
    writeln!(
        w,
        "{} files indexed from {} into {}",
        r.indexed,
        r.dir.display(),
        r.index.display()
    )?;
    if !r.skipped.is_empty() {
        writeln!(w, "{} files vanished before hashing:", r.skipped.len())?;
        write_paths(w, &r.skipped)?;
    }
    Ok(())
}

fn write_checked<W: Write>(w: &mut W, r: &CheckReport) -> io::Result<()> {
    write_paths(w, &r.duplicate_files)?;
    writeln!(w, "{} duplicated files found", r.duplicate_files.len())?;
    writeln!(w, "{} new files found", r.new_files.len())?;
    if r.deleted > 0 {
        writeln!(w, "{} duplicated files deleted", r.deleted)?;
    }
    if r.added > 0 {
        writeln!(w, "{} new files added to {}", r.added, r.index.display())?;
    }
    write_summary(w, &r.summary)
}

fn write_tree<W: Write>(w: &mut W, r: &TreeReport) -> io::Result<()> {
    write_paths(w, &r.duplicates)?;
    writeln!(
        w,
        "{} duplicated files found in {} ({} unique)",
        r.duplicates.len(),
        r.dir.display(),
        r.survivors.len()
    )?;
    if r.deleted > 0 {
        writeln!(w, "{} duplicated files deleted", r.deleted)?;
    }
    write_summary(w, &r.summary)
}

fn write_paths<W: Write>(w: &mut W, paths: &[PathBuf]) -> io::Result<()> {
    for path in paths {
        writeln!(w, "  {}", path.display())?;
    }
    Ok(())
}

fn write_summary<W: Write>(w: &mut W, summary: &ScanSummary) -> io::Result<()> {
    writeln!(
        w,
        "{} files scanned, {} hashed, {} reclaimable",
        summary.total_files,
        summary.hashed_files,
        summary.reclaimable_display()
    )
}
