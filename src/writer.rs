//! Output persistence.
//!
//! Reports are written to a temporary file beside the destination and moved
//! into place only once complete, so readers see either the previous file or
//! the new one, never a truncated mix.

use csv::WriterBuilder;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::constants::{
    DATE_OF_BIRTH_COLUMN, LEVEL_COLUMN, LEVEL_NUMBER_COLUMN, OVERALL_NUMBER_COLUMN,
};
use crate::error::{FamilyTreeError, Result};
use crate::ranker::Ranking;
use crate::types::FamilyTable;

/// Atomically replaces `path` with `bytes`, creating parent directories.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    // On failure the returned error still owns the temp file, which is removed on drop
    tmp.persist(path).map_err(|e| FamilyTreeError::Io(e.error))?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// The input rows in ranked order with Level, Level Number and Overall Number
/// appended. Dates of birth are normalised to `YYYY-MM-DD` (blank when
/// unparseable); every other cell is copied verbatim.
pub fn augmented_csv(table: &FamilyTable, ranking: &Ranking<'_>) -> Result<Vec<u8>> {
    let date_index = table.column_index(DATE_OF_BIRTH_COLUMN);
    let width = table.headers.len();

    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    let mut header: Vec<&str> = table.headers.iter().collect();
    header.extend([LEVEL_COLUMN, LEVEL_NUMBER_COLUMN, OVERALL_NUMBER_COLUMN]);
    writer.write_record(&header)?;

    for member in ranking.members() {
        let record = member.record;
        let source = record.source_row();
        let mut row: Vec<String> = (0..width)
            .map(|i| {
                if Some(i) == date_index {
                    record
                        .date_of_birth
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_default()
                } else {
                    source.get(i).unwrap_or_default().to_string()
                }
            })
            .collect();
        row.push(member.level.to_string());
        row.push(member.level_number.to_string());
        row.push(member.overall_number.to_string());
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|e| FamilyTreeError::Io(e.into_error()))
}
