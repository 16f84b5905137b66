use std::collections::HashMap;
use tracing::debug;

use super::LevelAssignment;
use crate::constants::HIERARCHY_LEVEL_COLUMN;
use crate::error::{FamilyTreeError, Result};
use crate::types::FamilyTable;

/// Levels read from free-text Hierarchy Level labels
#[derive(Debug, Clone)]
pub struct LabelResolution {
    pub levels: LevelAssignment,
    /// Distinct labels in first-appearance order; a record's level ordinal
    /// indexes into this list
    pub labels: Vec<String>,
}

impl LabelResolution {
    pub fn label(&self, ordinal: u32) -> &str {
        &self.labels[ordinal as usize]
    }
}

/// Takes each record's level from its Hierarchy Level label. Labels are not
/// validated or reordered: they rank in the order they first appear.
pub fn resolve_labels(table: &FamilyTable) -> Result<LabelResolution> {
    let mut labels: Vec<String> = Vec::new();
    let mut ordinals: HashMap<String, u32> = HashMap::new();
    let mut levels = Vec::with_capacity(table.len());

    for record in &table.records {
        let label = record
            .hierarchy_level
            .as_deref()
            .ok_or_else(|| FamilyTreeError::MissingField {
                row: record.row,
                field: HIERARCHY_LEVEL_COLUMN.to_string(),
            })?;

        let ordinal = match ordinals.get(label) {
            Some(&ordinal) => ordinal,
            None => {
                let ordinal = labels.len() as u32;
                labels.push(label.to_string());
                ordinals.insert(label.to_string(), ordinal);
                ordinal
            }
        };
        levels.push(ordinal);
    }

    debug!("Found hierarchy labels: {:?}", labels);

    Ok(LabelResolution {
        levels: LevelAssignment::new(levels),
        labels,
    })
}
