//! Core data types for reconciled student records.

use serde::{Deserialize, Serialize};

/// One reconciled submission, keyed by `student`.
///
/// Field order is the serialization order, so repeated runs over the same
/// inputs produce identical JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub student: String,
    #[serde(default)]
    pub community_district: Option<String>,
    /// Primary URL. Part 1 wins; Part 2 only fills it when Part 1 had none.
    #[serde(default)]
    pub storymap_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storymap_url_2: Option<String>,
    #[serde(default)]
    pub needs_review: bool,
    #[serde(default)]
    pub url_mismatch: bool,
    #[serde(default)]
    pub part_1_completed: bool,
    #[serde(default)]
    pub part_2_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_2_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl StudentRecord {
    /// Create a record from Part 1 checklist data.
    pub fn from_part1(
        student: &str,
        community_district: Option<String>,
        storymap_url: Option<String>,
        needs_review: bool,
    ) -> Self {
        Self {
            student: student.to_string(),
            community_district,
            storymap_url,
            needs_review,
            part_1_completed: true,
            ..Self::default()
        }
    }

    /// Create a record for a student who only submitted Part 2.
    pub fn from_part2_only(student: &str, url: &str) -> Self {
        Self {
            student: student.to_string(),
            community_district: None,
            storymap_url: Some(url.to_string()),
            storymap_url_2: Some(url.to_string()),
            needs_review: true,
            url_mismatch: false,
            part_1_completed: false,
            part_2_completed: true,
            part_2_error: None,
            note: Some(PART2_ONLY_NOTE.to_string()),
        }
    }
}

/// Note attached to records created solely from a Part 2 file.
pub const PART2_ONLY_NOTE: &str = "Found only in Part 2";

/// Error recorded on a Part 1 record whose Part 2 page had no URL.
pub const PART2_NO_URL_ERROR: &str = "No URL found in HTML";

/// Derive the student identifier from a submission file name.
///
/// Everything before the first `_`; a name without `_` is used whole.
pub fn student_id_from_file_name(file_name: &str) -> &str {
    file_name.split('_').next().unwrap_or(file_name)
}

/// Normalize a URL for comparison: trimmed, trailing slashes removed, lowercased.
pub fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_lowercase()
}

/// Treat `None` and blank strings alike.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Errors that can occur while reading submissions or writing results.
#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid UTF-8 text: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Detected spreadsheet file signature")]
    BinarySignature,

    #[error("Workbook has no worksheets")]
    EmptyWorkbook,
}

/// Convenience result type.
pub type ExtractResult<T> = Result<T, ExtractError>;
