//! Merge policy for Part 1 and Part 2 results.

use std::collections::HashMap;

use crate::log::{Diagnostic, ExtractionLog};
use crate::types::{
    non_empty, normalize_url, ExtractResult, StudentRecord, PART2_NO_URL_ERROR,
};

/// Records keyed by student, kept in first-seen order.
#[derive(Debug, Default, Clone)]
pub struct RecordSet {
    records: Vec<StudentRecord>,
    index: HashMap<String, usize>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, student: &str) -> Option<&StudentRecord> {
        self.index.get(student).map(|&i| &self.records[i])
    }

    fn get_mut(&mut self, student: &str) -> Option<&mut StudentRecord> {
        self.index.get(student).map(|&i| &mut self.records[i])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StudentRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<StudentRecord> {
        self.records
    }

    fn push(&mut self, record: StudentRecord) {
        self.index
            .insert(record.student.clone(), self.records.len());
        self.records.push(record);
    }

    /// Add a Part 1 record. A second file for the same student is flagged,
    /// not merged: the earlier record is kept and marked for review.
    pub fn insert_part1(
        &mut self,
        record: StudentRecord,
        file: &str,
        log: &mut ExtractionLog,
    ) -> ExtractResult<()> {
        if let Some(existing) = self.get_mut(&record.student) {
            existing.needs_review = true;
            existing.note = Some(format!("Duplicate identifier: {file} was not merged"));
            log.record(Diagnostic::DuplicateStudent {
                student: record.student,
                file: file.to_string(),
            })?;
            return Ok(());
        }
        self.push(record);
        Ok(())
    }

    /// Merge a URL extracted from a Part 2 page.
    pub fn apply_part2_url(
        &mut self,
        student: &str,
        url: &str,
        file: &str,
        log: &mut ExtractionLog,
    ) -> ExtractResult<()> {
        let Some(record) = self.get_mut(student) else {
            self.push(StudentRecord::from_part2_only(student, url));
            return log.record(Diagnostic::NewStudent {
                student: student.to_string(),
            });
        };

        if record.part_2_completed {
            record.needs_review = true;
            return log.record(Diagnostic::DuplicateStudent {
                student: student.to_string(),
                file: file.to_string(),
            });
        }

        record.storymap_url_2 = Some(url.to_string());
        record.part_2_completed = true;

        let part1 = non_empty(record.storymap_url.as_deref()).map(str::to_string);
        match part1 {
            None => {
                record.storymap_url = Some(url.to_string());
                log.record(Diagnostic::PromotedPart2 {
                    student: student.to_string(),
                })
            }
            Some(part1) if normalize_url(&part1) != normalize_url(url) => {
                record.url_mismatch = true;
                log.record(Diagnostic::UrlMismatch {
                    student: student.to_string(),
                    part1,
                    part2: url.to_string(),
                })
            }
            Some(_) => Ok(()),
        }
    }

    /// A Part 2 page yielded no URL. Never creates a record.
    pub fn apply_part2_failure(
        &mut self,
        student: &str,
        file: &str,
        log: &mut ExtractionLog,
    ) -> ExtractResult<()> {
        log.record(Diagnostic::NoHtmlUrl {
            file: file.to_string(),
        })?;
        if let Some(record) = self.get_mut(student) {
            record.needs_review = true;
            record.part_2_error = Some(PART2_NO_URL_ERROR.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part1(student: &str, url: Option<&str>) -> StudentRecord {
        StudentRecord::from_part1(student, Some("7".into()), url.map(String::from), false)
    }

    #[test]
    fn test_matching_urls_are_not_a_mismatch() {
        let mut set = RecordSet::new();
        let mut log = ExtractionLog::in_memory();
        set.insert_part1(part1("ann", Some("https://arcg.is/ABC/")), "ann_1.csv", &mut log)
            .unwrap();
        set.apply_part2_url("ann", " HTTPS://ARCG.IS/abc", "ann_2.html", &mut log)
            .unwrap();

        let r = set.get("ann").unwrap();
        assert!(!r.url_mismatch);
        assert!(r.part_2_completed);
        assert_eq!(r.storymap_url.as_deref(), Some("https://arcg.is/ABC/"));
        assert_eq!(r.storymap_url_2.as_deref(), Some(" HTTPS://ARCG.IS/abc"));
        assert!(log.entries().is_empty());
    }

    #[test]
    fn test_mismatch_keeps_part1_primary() {
        let mut set = RecordSet::new();
        let mut log = ExtractionLog::in_memory();
        set.insert_part1(part1("ben", Some("https://arcg.is/ONE")), "ben_1.csv", &mut log)
            .unwrap();
        set.apply_part2_url("ben", "https://arcg.is/TWO", "ben_2.html", &mut log)
            .unwrap();

        let r = set.get("ben").unwrap();
        assert!(r.url_mismatch);
        assert_eq!(r.storymap_url.as_deref(), Some("https://arcg.is/ONE"));
        assert!(log.lines()[0].starts_with("URL MISMATCH: ben"));
    }

    #[test]
    fn test_part2_fills_missing_part1_url() {
        let mut set = RecordSet::new();
        let mut log = ExtractionLog::in_memory();
        set.insert_part1(part1("cat", Some("  ")), "cat_1.csv", &mut log)
            .unwrap();
        set.apply_part2_url("cat", "https://arcg.is/CAT", "cat_2.html", &mut log)
            .unwrap();

        let r = set.get("cat").unwrap();
        assert!(!r.url_mismatch);
        assert_eq!(r.storymap_url.as_deref(), Some("https://arcg.is/CAT"));
        assert_eq!(
            log.entries(),
            &[Diagnostic::PromotedPart2 {
                student: "cat".into()
            }]
        );
    }

    #[test]
    fn test_part2_only_creates_record() {
        let mut set = RecordSet::new();
        let mut log = ExtractionLog::in_memory();
        set.apply_part2_url("dan", "https://arcg.is/D", "dan_2.html", &mut log)
            .unwrap();

        let r = set.get("dan").unwrap();
        assert!(!r.part_1_completed);
        assert!(r.needs_review);
        assert_eq!(r.note.as_deref(), Some("Found only in Part 2"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_part2_failure_flags_existing_only() {
        let mut set = RecordSet::new();
        let mut log = ExtractionLog::in_memory();
        set.insert_part1(part1("eli", Some("https://arcg.is/E")), "eli_1.csv", &mut log)
            .unwrap();
        set.apply_part2_failure("eli", "eli_2.html", &mut log).unwrap();
        set.apply_part2_failure("fay", "fay_2.html", &mut log).unwrap();

        let r = set.get("eli").unwrap();
        assert!(r.needs_review);
        assert_eq!(r.part_2_error.as_deref(), Some("No URL found in HTML"));
        assert!(!r.part_2_completed);
        assert!(set.get("fay").is_none());
        assert_eq!(log.entries().len(), 2);
    }

    #[test]
    fn test_duplicate_identifiers_are_flagged() {
        let mut set = RecordSet::new();
        let mut log = ExtractionLog::in_memory();
        set.insert_part1(part1("gus", Some("https://arcg.is/G1")), "gus_a.csv", &mut log)
            .unwrap();
        set.insert_part1(part1("gus", Some("https://arcg.is/G2")), "gus_b.csv", &mut log)
            .unwrap();
        set.apply_part2_url("gus", "https://arcg.is/G1", "gus_a.html", &mut log)
            .unwrap();
        set.apply_part2_url("gus", "https://arcg.is/G3", "gus_b.html", &mut log)
            .unwrap();

        assert_eq!(set.len(), 1);
        let r = set.get("gus").unwrap();
        assert!(r.needs_review);
        assert!(!r.url_mismatch);
        assert_eq!(r.storymap_url.as_deref(), Some("https://arcg.is/G1"));
        assert_eq!(r.storymap_url_2.as_deref(), Some("https://arcg.is/G1"));
        assert!(r.note.as_deref().unwrap().contains("gus_b.csv"));
        let dupes = log
            .entries()
            .iter()
            .filter(|d| matches!(d, Diagnostic::DuplicateStudent { .. }))
            .count();
        assert_eq!(dupes, 2);
    }

    #[test]
    fn test_first_seen_order() {
        let mut set = RecordSet::new();
        let mut log = ExtractionLog::in_memory();
        set.insert_part1(part1("zed", None), "zed_1.csv", &mut log).unwrap();
        set.insert_part1(part1("amy", None), "amy_1.csv", &mut log).unwrap();
        set.apply_part2_url("bo", "https://arcg.is/B", "bo_2.html", &mut log)
            .unwrap();
        let names: Vec<_> = set.iter().map(|r| r.student.as_str()).collect();
        assert_eq!(names, vec!["zed", "amy", "bo"]);
    }
}
