use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_CONFIG_PATH, DEFAULT_CSV_FILE, DEFAULT_HTML_FILE, DEFAULT_INPUT_PATH};
use crate::error::{FamilyTreeError, Result};
use crate::hierarchy::DanglingParentPolicy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub tree: TreeConfig,
    pub listing: ListingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub path: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_INPUT_PATH),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub html_file: String,
    pub csv_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            html_file: DEFAULT_HTML_FILE.to_string(),
            csv_file: DEFAULT_CSV_FILE.to_string(),
        }
    }
}

impl OutputConfig {
    pub fn html_path(&self) -> PathBuf {
        self.dir.join(&self.html_file)
    }

    pub fn csv_path(&self) -> PathBuf {
        self.dir.join(&self.csv_file)
    }
}

/// Settings for the parent/child graph page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub dangling_parents: DanglingParentPolicy,
    pub height: String,
    pub width: String,
    pub background: String,
    pub font_color: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            dangling_parents: DanglingParentPolicy::Error,
            height: "750px".to_string(),
            width: "100%".to_string(),
            background: "#ffffff".to_string(),
            font_color: "black".to_string(),
        }
    }
}

/// How the listing's search box compares a query with member names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Case-insensitive containment
    Substring,
    /// Trimmed, case-insensitive equality
    #[default]
    Exact,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Substring => "substring",
            MatchMode::Exact => "exact",
        }
    }
}

/// Settings for the grouped listing page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub title: String,
    pub match_mode: MatchMode,
    pub show_timestamp: bool,
    /// IANA timezone name used for the generation timestamp
    pub timezone: String,
    pub show_numbers: bool,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            title: "Family Tree".to_string(),
            match_mode: MatchMode::Exact,
            show_timestamp: true,
            timezone: "UTC".to_string(),
            show_numbers: true,
        }
    }
}

impl ListingConfig {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone.parse::<Tz>().map_err(|e| {
            FamilyTreeError::Config(format!("unknown timezone '{}': {}", self.timezone, e))
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for daily-rotated JSON logs; console only when unset
    pub dir: Option<PathBuf>,
    /// Fallback filter when RUST_LOG is not set
    pub filter: Option<String>,
}

impl Config {
    /// Loads configuration from `path`, which must exist. Without a path the
    /// default `family_tree.toml` is used if present, otherwise built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            FamilyTreeError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Rejects settings that would only fail later, mid-run
    pub fn validate(&self) -> Result<()> {
        if self.output.html_file.trim().is_empty() {
            return Err(FamilyTreeError::Config("output.html_file is empty".to_string()));
        }
        if self.output.csv_file.trim().is_empty() {
            return Err(FamilyTreeError::Config("output.csv_file is empty".to_string()));
        }
        if self.output.html_file == self.output.csv_file {
            return Err(FamilyTreeError::Config(
                "output.html_file and output.csv_file must differ".to_string(),
            ));
        }
        self.listing.tz()?;
        Ok(())
    }
}
