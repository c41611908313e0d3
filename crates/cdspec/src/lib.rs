//! cdspec — reconcile community-district StoryMap submissions into one dataset.
//!
//! Part 1 submissions are per-student checklists (CSV or spreadsheet), Part 2
//! submissions are per-student HTML redirect pages. The extractor reads both,
//! merges them by student identifier and writes a single JSON array; the
//! archive planner turns that array into screenshot work.

pub mod archive;
pub mod extractor;
pub mod fields;
pub mod html;
pub mod log;
pub mod merge;
pub mod storage;
pub mod table;
pub mod types;

pub use archive::{plan_targets, ArchiveSummary, ShotLabel, ShotOutcome, ShotTarget};
pub use extractor::{run_extraction, ExtractPaths, ExtractionSummary};
pub use fields::{extract_fields, matches_strict_layout, FieldExtraction};
pub use html::extract_url_from_html;
pub use log::{Diagnostic, ExtractionLog};
pub use merge::RecordSet;
pub use storage::{read_records, write_records};
pub use types::*;
