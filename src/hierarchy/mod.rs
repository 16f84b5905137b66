//! Level assignment for family records.
//!
//! Both resolvers produce a [`LevelAssignment`]: one level ordinal per record,
//! parallel to `FamilyTable::records`. The tree resolver derives it from parent
//! links; the flat resolver reads it from the Hierarchy Level labels.

pub mod flat;
pub mod tree;

pub use flat::{resolve_labels, LabelResolution};
pub use tree::{resolve_tree, DanglingParentPolicy, TreeResolution};

/// Level ordinal per record, indexed like `FamilyTable::records`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelAssignment {
    levels: Vec<u32>,
}

impl LevelAssignment {
    pub fn new(levels: Vec<u32>) -> Self {
        Self { levels }
    }

    pub fn level_of(&self, record_index: usize) -> u32 {
        self.levels[record_index]
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Number of distinct levels in use
    pub fn level_count(&self) -> usize {
        self.levels.iter().max().map(|&max| max as usize + 1).unwrap_or(0)
    }
}
