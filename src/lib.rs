pub mod config;
pub mod constants;
pub mod error;
pub mod hierarchy;
pub mod loader;
pub mod logging;
pub mod pipeline;
pub mod ranker;
pub mod render;
pub mod types;
pub mod writer;

pub use config::Config;
pub use error::{FamilyTreeError, Result};
pub use pipeline::{Pipeline, PipelineResult};
pub use types::{FamilyTable, PersonRecord, Variant};
