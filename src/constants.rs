/// Column names as they appear in the family CSV header
pub const NAME_COLUMN: &str = "Name";
pub const PARENT_COLUMN: &str = "Parent";
pub const DATE_OF_BIRTH_COLUMN: &str = "Date of Birth";
pub const EMAIL_COLUMN: &str = "Email";
pub const ALIVE_COLUMN: &str = "Alive";
pub const HIERARCHY_LEVEL_COLUMN: &str = "Hierarchy Level";

// Computed columns appended to the augmented CSV
pub const LEVEL_COLUMN: &str = "Level";
pub const LEVEL_NUMBER_COLUMN: &str = "Level Number";
pub const OVERALL_NUMBER_COLUMN: &str = "Overall Number";

// Default file locations, relative to the working directory
pub const DEFAULT_INPUT_PATH: &str = "input.csv";
pub const DEFAULT_HTML_FILE: &str = "family_tree.html";
pub const DEFAULT_CSV_FILE: &str = "family_data_with_numbers.csv";
pub const DEFAULT_CONFIG_PATH: &str = "family_tree.toml";

/// Graph widget loaded by the tree page
pub const VIS_NETWORK_JS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/vis-network/9.1.2/dist/vis-network.min.js";

/// Marker appended to deceased members in the listing
pub const DECEASED_MARKER: &str = "†";

/// Columns the given variant cannot run without
pub fn required_columns(variant: crate::types::Variant) -> &'static [&'static str] {
    match variant {
        crate::types::Variant::Tree => &[NAME_COLUMN, PARENT_COLUMN, DATE_OF_BIRTH_COLUMN],
        crate::types::Variant::Listing => {
            &[NAME_COLUMN, HIERARCHY_LEVEL_COLUMN, DATE_OF_BIRTH_COLUMN]
        }
    }
}
