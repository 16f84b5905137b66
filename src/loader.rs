//! Reads the family CSV into an immutable [`FamilyTable`].

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use metrics::counter;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use crate::constants::{
    required_columns, ALIVE_COLUMN, DATE_OF_BIRTH_COLUMN, EMAIL_COLUMN, HIERARCHY_LEVEL_COLUMN,
    NAME_COLUMN, PARENT_COLUMN,
};
use crate::error::{FamilyTreeError, Result};
use crate::types::{AliveStatus, FamilyTable, PersonRecord, Variant};

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parses a date of birth. Returns `None` for blank or unrecognised values.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Column positions resolved from the header row
struct Columns {
    name: usize,
    parent: Option<usize>,
    date_of_birth: usize,
    email: Option<usize>,
    alive: Option<usize>,
    hierarchy_level: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord, variant: Variant) -> Result<Self> {
        let find = |column: &str| headers.iter().position(|h| h == column);
        let require = |column: &str| {
            find(column).ok_or_else(|| FamilyTreeError::MissingColumn {
                column: column.to_string(),
                found: headers.iter().collect::<Vec<_>>().join(", "),
            })
        };

        for column in required_columns(variant) {
            require(*column)?;
        }

        Ok(Self {
            name: require(NAME_COLUMN)?,
            parent: find(PARENT_COLUMN),
            date_of_birth: require(DATE_OF_BIRTH_COLUMN)?,
            email: find(EMAIL_COLUMN),
            alive: find(ALIVE_COLUMN),
            hierarchy_level: find(HIERARCHY_LEVEL_COLUMN),
        })
    }
}

fn cell(record: &StringRecord, index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Loads the family table from a CSV file on disk.
#[instrument(skip_all, fields(path = %path.display(), variant = %variant))]
pub fn load_from_path(path: &Path, variant: Variant) -> Result<FamilyTable> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(FamilyTreeError::InputNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(e.into()),
    };
    let table = load_from_bytes(&bytes, variant)?;
    info!(
        "Loaded {} records from {} (sha256 {})",
        table.len(),
        path.display(),
        table.digest
    );
    Ok(table)
}

/// Loads the family table from in-memory CSV bytes.
pub fn load_from_bytes(bytes: &[u8], variant: Variant) -> Result<FamilyTable> {
    let digest = hex::encode(Sha256::digest(bytes));

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let columns = Columns::resolve(&headers, variant)?;

    let mut records = Vec::new();
    let mut warnings = Vec::new();
    let mut first_seen: HashMap<String, usize> = HashMap::new();

    for (i, result) in reader.records().enumerate() {
        let source = result?;
        let row = i + 1;

        if source.iter().all(|field| field.is_empty()) {
            debug!("Skipping blank row {}", row);
            continue;
        }

        let name = cell(&source, Some(columns.name)).ok_or_else(|| {
            FamilyTreeError::MissingField {
                row,
                field: NAME_COLUMN.to_string(),
            }
        })?;
        if let Some(&first_row) = first_seen.get(&name) {
            return Err(FamilyTreeError::DuplicateName {
                row,
                first_row,
                name,
            });
        }
        first_seen.insert(name.clone(), row);

        let raw_date = cell(&source, Some(columns.date_of_birth));
        let date_of_birth = raw_date.as_deref().and_then(parse_date);
        if let (Some(raw), None) = (raw_date.as_deref(), date_of_birth) {
            warn!("Row {}: unparseable date of birth '{}' for {}", row, raw, name);
            counter!("family_unparseable_dates_total").increment(1);
            warnings.push(format!(
                "Row {}: unparseable date of birth '{}' for {}",
                row, raw, name
            ));
        }

        let alive = match cell(&source, columns.alive) {
            Some(raw) => {
                let status = AliveStatus::parse(&raw);
                if status.is_none() {
                    warn!("Row {}: unrecognised alive status '{}' for {}", row, raw, name);
                    warnings.push(format!(
                        "Row {}: unrecognised alive status '{}' for {}",
                        row, raw, name
                    ));
                }
                status
            }
            None => None,
        };

        let parent = cell(&source, columns.parent);
        let email = cell(&source, columns.email);
        let hierarchy_level = cell(&source, columns.hierarchy_level);

        let mut record = PersonRecord::new(name, parent, date_of_birth, row, source);
        record.email = email;
        record.alive = alive;
        record.hierarchy_level = hierarchy_level;
        records.push(record);
    }

    counter!("family_records_loaded_total").increment(records.len() as u64);

    Ok(FamilyTable {
        headers,
        records,
        digest,
        warnings,
    })
}
