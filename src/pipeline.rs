use chrono::Utc;
use metrics::{counter, histogram};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::Result;
use crate::hierarchy::{resolve_labels, resolve_tree};
use crate::loader;
use crate::ranker::rank;
use crate::render::{GraphDocument, ListingDocument};
use crate::types::Variant;
use crate::writer::{augmented_csv, write_atomic};

/// Result of a complete pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub variant: Variant,
    pub total_records: usize,
    pub level_count: usize,
    pub warnings: Vec<String>,
    /// Hex SHA-256 of the input file
    pub input_digest: String,
    pub output_files: Vec<PathBuf>,
}

/// A rendered artifact waiting to be written
struct Artifact {
    path: PathBuf,
    bytes: Vec<u8>,
}

pub struct Pipeline;

impl Pipeline {
    /// Tree report: levels from parent links, a graph page and the augmented CSV.
    #[instrument(skip(config), fields(input = %config.input.path.display()))]
    pub fn run_tree(config: &Config) -> Result<PipelineResult> {
        let started = std::time::Instant::now();
        counter!("family_pipeline_runs_total", "variant" => "tree").increment(1);

        // Step 1: Load
        let table = loader::load_from_path(&config.input.path, Variant::Tree)?;

        // Step 2: Resolve levels
        let resolution = resolve_tree(&table, config.tree.dangling_parents)?;
        info!(
            "Resolved {} records into {} levels",
            table.len(),
            resolution.levels.level_count()
        );

        // Step 3: Rank
        let ranking = rank(&table, &resolution.levels);

        // Step 4: Render everything before touching the output directory
        let graph = GraphDocument::build(&ranking);
        info!(
            "Graph has {} nodes and {} edges",
            graph.nodes().len(),
            graph.edges().len()
        );
        let artifacts = vec![
            Artifact {
                path: config.output.html_path(),
                bytes: graph.render(&config.tree, &table.digest)?.into_bytes(),
            },
            Artifact {
                path: config.output.csv_path(),
                bytes: augmented_csv(&table, &ranking)?,
            },
        ];

        // Step 5: Persist
        let output_files = Self::write_all(artifacts)?;

        let mut warnings = table.warnings.clone();
        warnings.extend(resolution.warnings.iter().cloned());
        Self::finish(Variant::Tree, started, &warnings);

        Ok(PipelineResult {
            variant: Variant::Tree,
            total_records: table.len(),
            level_count: resolution.levels.level_count(),
            warnings,
            input_digest: table.digest.clone(),
            output_files,
        })
    }

    /// Listing report: levels from Hierarchy Level labels, one grouped page.
    #[instrument(skip(config), fields(input = %config.input.path.display()))]
    pub fn run_listing(config: &Config) -> Result<PipelineResult> {
        let started = std::time::Instant::now();
        counter!("family_pipeline_runs_total", "variant" => "listing").increment(1);

        let table = loader::load_from_path(&config.input.path, Variant::Listing)?;

        let labels = resolve_labels(&table)?;
        info!("Found {} hierarchy levels: {:?}", labels.labels.len(), labels.labels);

        let ranking = rank(&table, &labels.levels);

        let document = ListingDocument::build(&ranking, &labels, &config.listing, Utc::now())?;
        let artifacts = vec![Artifact {
            path: config.output.html_path(),
            bytes: document.render(&table.digest)?.into_bytes(),
        }];

        let output_files = Self::write_all(artifacts)?;

        let warnings = table.warnings.clone();
        Self::finish(Variant::Listing, started, &warnings);

        Ok(PipelineResult {
            variant: Variant::Listing,
            total_records: table.len(),
            level_count: labels.labels.len(),
            warnings,
            input_digest: table.digest.clone(),
            output_files,
        })
    }

    pub fn run(variant: Variant, config: &Config) -> Result<PipelineResult> {
        match variant {
            Variant::Tree => Self::run_tree(config),
            Variant::Listing => Self::run_listing(config),
        }
    }

    fn write_all(artifacts: Vec<Artifact>) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            write_atomic(&artifact.path, &artifact.bytes)?;
            info!("💾 Saved {}", artifact.path.display());
            written.push(artifact.path);
        }
        Ok(written)
    }

    fn finish(variant: Variant, started: std::time::Instant, warnings: &[String]) {
        let secs = started.elapsed().as_secs_f64();
        histogram!("family_pipeline_duration_seconds", "variant" => variant.to_string()).record(secs);
        if !warnings.is_empty() {
            warn!("{} data-quality warnings during {} run", warnings.len(), variant);
        }
        info!("✅ {} run finished in {:.3}s", variant, secs);
    }
}
