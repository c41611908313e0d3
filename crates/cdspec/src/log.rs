//! Plain-text extraction log — one diagnostic line per event.
//!
//! The log is an explicit object handed to every extraction step. It is
//! truncated when opened, so each run regenerates it from scratch. Every line
//! is also mirrored to `tracing`.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::types::ExtractResult;

/// A single anomaly or notable event seen during extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// An input directory is absent; that phase is skipped.
    DirectoryMissing { dir: PathBuf },
    /// The checklist does not follow the expected two-row layout.
    DeviantFormat { file: String },
    /// The primary reader failed; a fallback will be tried.
    ReadFailed { file: String, error: String },
    /// The fallback reader parsed the file but fields are still missing.
    StillMissing { file: String },
    /// The fallback reader parsed the file and found both fields.
    Recovered { file: String },
    /// No reader could parse the file.
    Unreadable { file: String, error: String },
    MissingDistrict { file: String },
    MissingUrl { file: String },
    /// Two files map to the same student identifier.
    DuplicateStudent { student: String, file: String },
    /// An HTML file could not be read.
    HtmlReadFailed { path: PathBuf, error: String },
    /// An HTML file was read but contained no URL.
    NoHtmlUrl { file: String },
    /// Part 1 had no URL, so the Part 2 URL became primary.
    PromotedPart2 { student: String },
    UrlMismatch {
        student: String,
        part1: String,
        part2: String,
    },
    /// A student appeared only in Part 2.
    NewStudent { student: String },
}

impl Diagnostic {
    fn emit_tracing(&self, line: &str) {
        match self {
            Diagnostic::DirectoryMissing { .. } | Diagnostic::Unreadable { .. } => {
                tracing::error!("{line}")
            }
            Diagnostic::Recovered { .. }
            | Diagnostic::PromotedPart2 { .. }
            | Diagnostic::NewStudent { .. } => tracing::info!("{line}"),
            _ => tracing::warn!("{line}"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DirectoryMissing { dir } => {
                write!(f, "CRITICAL: Directory not found: {}", dir.display())
            }
            Diagnostic::DeviantFormat { file } => {
                write!(f, "DEVIANT FORMAT: {file} - trying fuzzy search.")
            }
            Diagnostic::ReadFailed { file, error } => write!(
                f,
                "CSV FAIL: {file} ({error}). Attempting with spreadsheet reader..."
            ),
            Diagnostic::StillMissing { file } => write!(
                f,
                "FALLBACK FAIL: {file} - Still missing data after coercion."
            ),
            Diagnostic::Recovered { file } => write!(
                f,
                "RECOVERED: {file} - Extracted data using spreadsheet reader/fuzzy search."
            ),
            Diagnostic::Unreadable { file, error } => {
                write!(f, "FATAL: Could not process {file}. Error: {error}")
            }
            Diagnostic::MissingDistrict { file } => {
                write!(f, "MISSING DATA: {file} - No Community District found.")
            }
            Diagnostic::MissingUrl { file } => {
                write!(f, "MISSING DATA: {file} - No StoryMap URL found.")
            }
            Diagnostic::DuplicateStudent { student, file } => write!(
                f,
                "DUPLICATE STUDENT: {student} - {file} shares an identifier with an earlier file."
            ),
            Diagnostic::HtmlReadFailed { path, error } => {
                write!(f, "HTML FAIL: {} - {error}", path.display())
            }
            Diagnostic::NoHtmlUrl { file } => {
                write!(f, "PART 2 FAIL: Could not extract URL from {file}")
            }
            Diagnostic::PromotedPart2 { student } => {
                write!(f, "UPDATED: {student} - Using Part 2 URL (Part 1 missing).")
            }
            Diagnostic::UrlMismatch {
                student,
                part1,
                part2,
            } => write!(
                f,
                "URL MISMATCH: {student} - Part 1: {part1} vs Part 2: {part2}"
            ),
            Diagnostic::NewStudent { student } => {
                write!(f, "NEW STUDENT: {student} found in Part 2.")
            }
        }
    }
}

/// Line-oriented extraction log.
pub struct ExtractionLog {
    file: Option<File>,
    path: Option<PathBuf>,
    entries: Vec<Diagnostic>,
}

impl ExtractionLog {
    /// Open the log file, truncating whatever a previous run left behind.
    pub fn open(path: &Path) -> ExtractResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            file: Some(file),
            path: Some(path.to_path_buf()),
            entries: Vec::new(),
        })
    }

    /// A log that only keeps entries in memory.
    pub fn in_memory() -> Self {
        Self {
            file: None,
            path: None,
            entries: Vec::new(),
        }
    }

    /// Record a diagnostic.
    pub fn record(&mut self, diagnostic: Diagnostic) -> ExtractResult<()> {
        let line = diagnostic.to_string();
        diagnostic.emit_tracing(&line);
        if let Some(file) = self.file.as_mut() {
            writeln!(file, "{line}")?;
        }
        self.entries.push(diagnostic);
        Ok(())
    }

    /// All diagnostics recorded so far, in order.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Rendered lines, in order.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Flush buffered output to disk.
    pub fn flush(&mut self) -> ExtractResult<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}
