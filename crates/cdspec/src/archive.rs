//! Screenshot work planning for the StoryMap archive.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::{non_empty, StudentRecord};

pub const DEFAULT_ARCHIVE_INPUT: &str = "processing/student_data_both_parts_verified.json";
pub const DEFAULT_ARCHIVE_ROOT: &str = "processing/storymaps_archive";

/// Which submission a screenshot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShotLabel {
    Part1,
    Part2,
}

impl ShotLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShotLabel::Part1 => "part1",
            ShotLabel::Part2 => "part2",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.png", self.as_str())
    }
}

impl fmt::Display for ShotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One URL to capture and where the image goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShotTarget {
    pub student: String,
    pub label: ShotLabel,
    pub url: String,
    pub path: PathBuf,
}

impl ShotTarget {
    /// Already captured by an earlier run.
    pub fn is_done(&self) -> bool {
        self.path.exists()
    }
}

/// Directory holding one student's screenshots.
pub fn student_dir(archive_root: &Path, student: &str) -> PathBuf {
    archive_root.join(student)
}

/// Ordered worklist for one record: the primary URL, then the Part 2 URL
/// only when the two parts disagree.
pub fn plan_targets(record: &StudentRecord, archive_root: &Path) -> Vec<ShotTarget> {
    if record.student.is_empty() {
        return Vec::new();
    }
    let dir = student_dir(archive_root, &record.student);

    let mut urls = Vec::new();
    if let Some(url) = non_empty(record.storymap_url.as_deref()) {
        urls.push((ShotLabel::Part1, url));
    }
    if record.url_mismatch {
        if let Some(url) = non_empty(record.storymap_url_2.as_deref()) {
            urls.push((ShotLabel::Part2, url));
        }
    }

    urls.into_iter()
        .map(|(label, url)| ShotTarget {
            student: record.student.clone(),
            label,
            url: url.to_string(),
            path: dir.join(label.file_name()),
        })
        .collect()
}

/// Final state of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShotOutcome {
    /// Image already existed; nothing was loaded.
    Skipped,
    Saved,
    Failed(String),
}

/// Counters for a whole archive run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArchiveSummary {
    pub students: usize,
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ArchiveSummary {
    pub fn count(&mut self, outcome: &ShotOutcome) {
        match outcome {
            ShotOutcome::Skipped => self.skipped += 1,
            ShotOutcome::Saved => self.saved += 1,
            ShotOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Number of page loads attempted.
    pub fn navigations(&self) -> usize {
        self.saved + self.failed
    }
}
