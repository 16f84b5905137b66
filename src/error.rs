use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FamilyTreeError {
    #[error("Input file not found: {}", .path.display())]
    InputNotFound { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column '{column}' (found: {found})")]
    MissingColumn { column: String, found: String },

    #[error("Row {row}: missing required field '{field}'")]
    MissingField { row: usize, field: String },

    #[error("Row {row}: duplicate name '{name}' (first seen on row {first_row})")]
    DuplicateName {
        row: usize,
        first_row: usize,
        name: String,
    },

    #[error("Unknown parent reference: {}", format_dangling(.0))]
    DanglingParent(Vec<(String, String)>),

    #[error("Parent links form a cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template rendering failed: {0}")]
    Template(#[from] askama::Error),
}

fn format_dangling(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(name, parent)| format!("'{}' names parent '{}'", name, parent))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, FamilyTreeError>;
