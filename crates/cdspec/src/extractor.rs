//! Batch driver: walk both submission directories and build the record set.

use std::path::{Path, PathBuf};

use crate::fields::{extract_fields, matches_strict_layout, FieldExtraction};
use crate::html::extract_url_from_html;
use crate::log::{Diagnostic, ExtractionLog};
use crate::merge::RecordSet;
use crate::storage::write_records;
use crate::table::{strategies, FileSniff};
use crate::types::{student_id_from_file_name, ExtractResult, StudentRecord};

pub const DEFAULT_PART1_DIR: &str = "lecture_checklists/cdspec_1";
pub const DEFAULT_PART2_DIR: &str = "lecture_checklists/cdspec_2";
pub const DEFAULT_OUTPUT_FILE: &str = "processing/student_data.json";
pub const DEFAULT_LOG_FILE: &str = "processing/extraction_errors.log";

/// Where the extractor reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractPaths {
    pub part1_dir: PathBuf,
    pub part2_dir: PathBuf,
    pub output_file: PathBuf,
    pub log_file: PathBuf,
}

impl Default for ExtractPaths {
    fn default() -> Self {
        Self {
            part1_dir: PathBuf::from(DEFAULT_PART1_DIR),
            part2_dir: PathBuf::from(DEFAULT_PART2_DIR),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

/// Totals reported after a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub records: usize,
    pub needs_review: usize,
    pub url_mismatches: usize,
    pub part2_only: usize,
    pub diagnostics: usize,
}

impl ExtractionSummary {
    fn from_records(records: &[StudentRecord], log: &ExtractionLog) -> Self {
        Self {
            records: records.len(),
            needs_review: records.iter().filter(|r| r.needs_review).count(),
            url_mismatches: records.iter().filter(|r| r.url_mismatch).count(),
            part2_only: records.iter().filter(|r| !r.part_1_completed).count(),
            diagnostics: log.entries().len(),
        }
    }
}

/// Run both phases and write the JSON output.
pub fn run_extraction(
    paths: &ExtractPaths,
    log: &mut ExtractionLog,
) -> ExtractResult<(Vec<StudentRecord>, ExtractionSummary)> {
    let mut records = RecordSet::new();
    extract_part1_dir(&paths.part1_dir, &mut records, log)?;
    extract_part2_dir(&paths.part2_dir, &mut records, log)?;

    let records = records.into_records();
    write_records(&paths.output_file, &records)?;
    log.flush()?;

    let summary = ExtractionSummary::from_records(&records, log);
    tracing::info!(
        "Processed {} student records. Output saved to {}",
        summary.records,
        paths.output_file.display()
    );
    Ok((records, summary))
}

/// Sorted, visible file names in a directory, or `None` if it is missing.
fn list_files(dir: &Path, log: &mut ExtractionLog) -> ExtractResult<Option<Vec<String>>> {
    if !dir.is_dir() {
        log.record(Diagnostic::DirectoryMissing {
            dir: dir.to_path_buf(),
        })?;
        return Ok(None);
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let Ok(name) = entry.file_name().into_string() else {
            tracing::warn!("skipping non UTF-8 file name in {}", dir.display());
            continue;
        };
        if name.starts_with('.') || !entry.path().is_file() {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(Some(names))
}

/// Phase 1: one checklist per student.
pub fn extract_part1_dir(
    dir: &Path,
    records: &mut RecordSet,
    log: &mut ExtractionLog,
) -> ExtractResult<()> {
    let Some(files) = list_files(dir, log)? else {
        return Ok(());
    };

    for file_name in files {
        let record = extract_part1_file(&dir.join(&file_name), &file_name, log)?;
        records.insert_part1(record, &file_name, log)?;
    }
    Ok(())
}

/// Read one checklist through the strategy list and build its record.
pub fn extract_part1_file(
    path: &Path,
    file_name: &str,
    log: &mut ExtractionLog,
) -> ExtractResult<StudentRecord> {
    let student = student_id_from_file_name(file_name);
    let sniff = FileSniff::of(path);
    let mut needs_review = false;
    let mut fields = FieldExtraction::default();

    for (attempt, strategy) in strategies().into_iter().enumerate() {
        let primary = attempt == 0;
        match strategy.read(path, &sniff) {
            Ok(rows) => {
                if primary && !matches_strict_layout(&rows) {
                    log.record(Diagnostic::DeviantFormat {
                        file: file_name.to_string(),
                    })?;
                    needs_review = true;
                }

                fields = extract_fields(&rows);
                if fields.issues {
                    needs_review = true;
                }
                if !primary {
                    let diagnostic = if fields.issues {
                        Diagnostic::StillMissing {
                            file: file_name.to_string(),
                        }
                    } else {
                        Diagnostic::Recovered {
                            file: file_name.to_string(),
                        }
                    };
                    log.record(diagnostic)?;
                }
                break;
            }
            Err(e) if primary => {
                tracing::debug!("{} failed on {file_name}: {e}", strategy.name());
                log.record(Diagnostic::ReadFailed {
                    file: file_name.to_string(),
                    error: e.to_string(),
                })?;
                needs_review = true;
            }
            Err(e) => {
                log.record(Diagnostic::Unreadable {
                    file: file_name.to_string(),
                    error: e.to_string(),
                })?;
                needs_review = true;
            }
        }
    }

    if fields.community_district.is_none() {
        log.record(Diagnostic::MissingDistrict {
            file: file_name.to_string(),
        })?;
        needs_review = true;
    }
    if fields.storymap_url.is_none() {
        log.record(Diagnostic::MissingUrl {
            file: file_name.to_string(),
        })?;
        needs_review = true;
    }

    Ok(StudentRecord::from_part1(
        student,
        fields.community_district,
        fields.storymap_url,
        needs_review,
    ))
}

/// Phase 2: one HTML redirect page per student.
pub fn extract_part2_dir(
    dir: &Path,
    records: &mut RecordSet,
    log: &mut ExtractionLog,
) -> ExtractResult<()> {
    let Some(files) = list_files(dir, log)? else {
        return Ok(());
    };

    for file_name in files.iter().filter(|f| f.ends_with(".html")) {
        let student = student_id_from_file_name(file_name);
        match extract_url_from_html(&dir.join(file_name), log)? {
            Some(url) => records.apply_part2_url(student, &url, file_name, log)?,
            None => records.apply_part2_failure(student, file_name, log)?,
        }
    }
    Ok(())
}
