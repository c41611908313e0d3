//! Fuzzy field extraction from Part 1 checklist rows.

/// Only the top of a checklist carries the fields we need.
pub const SCAN_ROWS: usize = 10;

const DISTRICT_KEY: &str = "community district";
const URL_KEY: &str = "storymap url";

/// Fields pulled from a checklist table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldExtraction {
    pub community_district: Option<String>,
    pub storymap_url: Option<String>,
    /// Set when either field is missing after the scan.
    pub issues: bool,
}

/// Scan the first [`SCAN_ROWS`] rows for the district and URL.
///
/// Within a row, the first cell containing the key wins: the value is the
/// next cell if non-empty, otherwise whatever follows a `:` in the same cell.
/// Rows keep being scanned until each field is found.
pub fn extract_fields<S: AsRef<str>>(rows: &[Vec<S>]) -> FieldExtraction {
    let mut community_district = None;
    let mut storymap_url = None;

    for row in rows.iter().take(SCAN_ROWS) {
        if row.is_empty() {
            continue;
        }
        let cells: Vec<&str> = row.iter().map(|c| c.as_ref().trim()).collect();

        if community_district.is_none() {
            community_district = value_for_key(&cells, DISTRICT_KEY);
        }
        if storymap_url.is_none() {
            storymap_url = value_for_key(&cells, URL_KEY);
        }
    }

    let issues = community_district.is_none() || storymap_url.is_none();
    FieldExtraction {
        community_district,
        storymap_url,
        issues,
    }
}

fn value_for_key(cells: &[&str], key: &str) -> Option<String> {
    let i = cells.iter().position(|c| c.to_lowercase().contains(key))?;

    if let Some(next) = cells.get(i + 1).filter(|c| !c.is_empty()) {
        return Some(next.to_string());
    }

    cells[i]
        .split_once(':')
        .map(|(_, rest)| rest.trim())
        .filter(|rest| !rest.is_empty())
        .map(String::from)
}

/// The expected layout: "Community District" in A1 and "StoryMap URL" in A2.
pub fn matches_strict_layout<S: AsRef<str>>(rows: &[Vec<S>]) -> bool {
    let first_cell = |i: usize| {
        rows.get(i)
            .and_then(|r| r.first())
            .map(|c| c.as_ref())
            .unwrap_or("")
    };
    rows.len() >= 2
        && first_cell(0).contains("Community District")
        && first_cell(1).contains("StoryMap URL")
}
