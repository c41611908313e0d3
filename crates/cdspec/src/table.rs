//! Row-oriented readers for Part 1 checklist files.
//!
//! Files arrive as CSV exports, CSVs in odd encodings, or real spreadsheets
//! renamed to `.csv`. Each reader is a [`ReadStrategy`]; the extractor walks
//! [`strategies`] in order and keeps the first table that parses.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::types::{ExtractError, ExtractResult};

/// A table as rows of raw cell text.
pub type Rows = Vec<Vec<String>>;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const ZIP_MAGIC: &[u8] = b"PK";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

/// Extensions handled by the spreadsheet reader regardless of content.
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// What the first bytes of a file say about its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    /// Zip container (xlsx, xlsm, ods).
    Zip,
    /// Legacy OLE compound document (xls).
    Ole,
    Text,
}

/// Cheap facts about a file, gathered once before any strategy runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSniff {
    pub signature: Signature,
    pub spreadsheet_extension: bool,
}

impl FileSniff {
    /// Inspect a file. Unreadable files sniff as plain text and fail later.
    pub fn of(path: &Path) -> Self {
        let mut header = [0u8; 4];
        let read = File::open(path)
            .and_then(|mut f| f.read(&mut header))
            .unwrap_or(0);
        let header = &header[..read];

        let signature = if header.starts_with(ZIP_MAGIC) {
            Signature::Zip
        } else if header.starts_with(OLE_MAGIC) {
            Signature::Ole
        } else {
            Signature::Text
        };

        let spreadsheet_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| SPREADSHEET_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false);

        Self {
            signature,
            spreadsheet_extension,
        }
    }

    pub fn is_binary(&self) -> bool {
        self.signature != Signature::Text
    }
}

/// One way of turning a file into rows.
pub trait ReadStrategy {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;
    /// Read the whole file as rows, or explain why this strategy cannot.
    fn read(&self, path: &Path, sniff: &FileSniff) -> ExtractResult<Rows>;
}

/// Strict UTF-8 CSV. Refuses anything that looks like a spreadsheet binary.
pub struct PlainCsv;

/// Spreadsheet reader for binaries, lenient CSV reader for everything else.
pub struct Tabular;

/// The ordered strategy list: primary first, fallback second.
pub fn strategies() -> [&'static dyn ReadStrategy; 2] {
    [&PlainCsv, &Tabular]
}

impl ReadStrategy for PlainCsv {
    fn name(&self) -> &'static str {
        "plain-csv"
    }

    fn read(&self, path: &Path, sniff: &FileSniff) -> ExtractResult<Rows> {
        if sniff.is_binary() {
            return Err(ExtractError::BinarySignature);
        }

        let bytes = std::fs::read(path)?;
        let text = std::str::from_utf8(strip_bom(&bytes))?;

        let mut reader = csv_reader(text.as_bytes());
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(String::from).collect());
        }
        Ok(rows)
    }
}

impl ReadStrategy for Tabular {
    fn name(&self) -> &'static str {
        "tabular"
    }

    fn read(&self, path: &Path, sniff: &FileSniff) -> ExtractResult<Rows> {
        if sniff.is_binary() || sniff.spreadsheet_extension {
            read_first_worksheet(path)
        } else {
            read_lenient_csv(path)
        }
    }
}

fn csv_reader(data: &[u8]) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data)
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// Lossy decode, malformed records skipped.
fn read_lenient_csv(path: &Path) -> ExtractResult<Rows> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(strip_bom(&bytes));

    let mut reader = csv_reader(text.as_bytes());
    let rows = reader
        .records()
        .filter_map(|record| match record {
            Ok(record) => Some(record.iter().map(String::from).collect()),
            Err(e) => {
                tracing::debug!("skipping malformed row in {}: {e}", path.display());
                None
            }
        })
        .collect();
    Ok(rows)
}

/// Read the first worksheet, keeping sheet coordinates (leading blank rows
/// and columns are preserved as empty cells).
fn read_first_worksheet(path: &Path) -> ExtractResult<Rows> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ExtractError::EmptyWorkbook)??;

    let (first_row, first_col) = range.start().unwrap_or((0, 0));
    let mut rows: Rows = vec![Vec::new(); first_row as usize];
    for row in range.rows() {
        let mut cells = vec![String::new(); first_col as usize];
        cells.extend(row.iter().map(render_cell));
        rows.push(cells);
    }
    Ok(rows)
}

/// Render a spreadsheet cell the way it would appear in a CSV export.
pub fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", *f as i64)
        }
        other => other.to_string(),
    }
}
