//! JSON reader/writer for the consolidated record array.

use std::io::Write;
use std::path::Path;

use crate::types::{ExtractResult, StudentRecord};

/// Write records as a pretty-printed JSON array.
pub fn write_records(path: &Path, records: &[StudentRecord]) -> ExtractResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = std::fs::File::create(path)?;
    write_records_to(records, &mut file)
}

/// Write records to any writer.
pub fn write_records_to<W: Write>(records: &[StudentRecord], writer: &mut W) -> ExtractResult<()> {
    serde_json::to_writer_pretty(&mut *writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Read a record array, e.g. a manually reviewed copy of the extractor output.
pub fn read_records(path: &Path) -> ExtractResult<Vec<StudentRecord>> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}
