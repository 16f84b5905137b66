use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use family_tree::config::{Config, MatchMode};
use family_tree::hierarchy::DanglingParentPolicy;
use family_tree::logging;
use family_tree::{Pipeline, PipelineResult, Variant};

#[derive(Parser)]
#[command(name = "family_tree")]
#[command(about = "Builds browsable HTML family reports from a CSV of family members")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonArgs {
    /// Input CSV file (default: input.csv)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Directory the reports are written to (default: current directory)
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// TOML configuration file (default: family_tree.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw the parent/child graph and write the numbered CSV
    Tree {
        #[command(flatten)]
        common: CommonArgs,
        /// How to handle a Parent that names nobody in the file
        #[arg(long, value_enum)]
        dangling_parents: Option<DanglingParentPolicy>,
    },
    /// Write the grouped, searchable listing by Hierarchy Level
    #[command(alias = "listing")]
    List {
        #[command(flatten)]
        common: CommonArgs,
        /// How the search box matches names
        #[arg(long, value_enum)]
        match_mode: Option<MatchMode>,
        /// IANA timezone for the generation timestamp, e.g. America/New_York
        #[arg(long)]
        timezone: Option<String>,
        /// Leave out the generation timestamp
        #[arg(long)]
        no_timestamp: bool,
        /// Leave out the family member numbers
        #[arg(long)]
        no_numbers: bool,
    },
}

fn load_config(common: &CommonArgs) -> anyhow::Result<Config> {
    let mut config =
        Config::load(common.config.as_deref()).context("Could not load configuration")?;
    if let Some(input) = &common.input {
        config.input.path = input.clone();
    }
    if let Some(dir) = &common.output_dir {
        config.output.dir = dir.clone();
    }
    Ok(config)
}

fn build_config(command: &Commands) -> anyhow::Result<(Variant, Config)> {
    let (variant, config) = match command {
        Commands::Tree {
            common,
            dangling_parents,
        } => {
            let mut config = load_config(common)?;
            if let Some(policy) = dangling_parents {
                config.tree.dangling_parents = *policy;
            }
            (Variant::Tree, config)
        }
        Commands::List {
            common,
            match_mode,
            timezone,
            no_timestamp,
            no_numbers,
        } => {
            let mut config = load_config(common)?;
            if let Some(mode) = match_mode {
                config.listing.match_mode = *mode;
            }
            if let Some(tz) = timezone {
                config.listing.timezone = tz.clone();
            }
            if *no_timestamp {
                config.listing.show_timestamp = false;
            }
            if *no_numbers {
                config.listing.show_numbers = false;
            }
            (Variant::Listing, config)
        }
    };
    config.validate().context("Invalid configuration")?;
    Ok((variant, config))
}

fn print_summary(result: &PipelineResult) {
    println!("\n📊 Family {} report:", result.variant);
    println!("   Members: {}", result.total_records);
    println!("   Levels: {}", result.level_count);
    println!("   Input sha256: {}", result.input_digest);
    if !result.warnings.is_empty() {
        println!("\n⚠️  Data-quality warnings:");
        for warning in &result.warnings {
            println!("   - {}", warning);
        }
    }
    for path in &result.output_files {
        println!("💾 Saved {}", path.display());
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (variant, config) = match build_config(&cli.command) {
        Ok(built) => built,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let _guard = logging::init_logging(&config.logging);

    match Pipeline::run(variant, &config) {
        Ok(result) => {
            print_summary(&result);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Family {} run failed: {}", variant, e);
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}
