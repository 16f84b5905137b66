use chrono::NaiveDate;
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which report a run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Parent/child graph with levels derived from the Parent column
    Tree,
    /// Grouped listing with levels read from the Hierarchy Level column
    Listing,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Tree => write!(f, "tree"),
            Variant::Listing => write!(f, "listing"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AliveStatus {
    Alive,
    Deceased,
}

impl AliveStatus {
    /// Reads a yes/no style flag. Unrecognised text yields `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "yes" | "y" | "true" | "1" | "alive" => Some(AliveStatus::Alive),
            "no" | "n" | "false" | "0" | "deceased" | "dead" => Some(AliveStatus::Deceased),
            _ => None,
        }
    }
}

/// One family member as read from the input. Never modified after loading;
/// computed values live in [`crate::ranker::Ranking`].
#[derive(Debug, Clone)]
pub struct PersonRecord {
    pub name: String,
    pub parent: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub email: Option<String>,
    pub alive: Option<AliveStatus>,
    pub hierarchy_level: Option<String>,
    /// 1-based data row in the source file
    pub row: usize,
    source: StringRecord,
}

impl PersonRecord {
    pub(crate) fn new(
        name: String,
        parent: Option<String>,
        date_of_birth: Option<NaiveDate>,
        row: usize,
        source: StringRecord,
    ) -> Self {
        Self {
            name,
            parent,
            date_of_birth,
            email: None,
            alive: None,
            hierarchy_level: None,
            row,
            source,
        }
    }

    pub fn is_deceased(&self) -> bool {
        self.alive == Some(AliveStatus::Deceased)
    }

    /// The untouched cells of the input row, in header order
    pub fn source_row(&self) -> &StringRecord {
        &self.source
    }
}

/// Everything loaded from one input file
#[derive(Debug, Clone)]
pub struct FamilyTable {
    pub headers: StringRecord,
    pub records: Vec<PersonRecord>,
    /// Hex SHA-256 of the input bytes
    pub digest: String,
    /// Non-fatal problems found while loading
    pub warnings: Vec<String>,
}

impl FamilyTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alive_status_parse() {
        assert_eq!(AliveStatus::parse("Yes"), Some(AliveStatus::Alive));
        assert_eq!(AliveStatus::parse(" no "), Some(AliveStatus::Deceased));
        assert_eq!(AliveStatus::parse("deceased"), Some(AliveStatus::Deceased));
        assert_eq!(AliveStatus::parse("maybe"), None);
        assert_eq!(AliveStatus::parse(""), None);
    }
}
