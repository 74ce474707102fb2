//! mesh-export - mesh export and patch tool
//!
//! Runs the external format producer, validates meshpoint names and
//! rewrites meshpoint and material names in `.mesh` files.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use mesh_export::{
    EditFile, ExportConfig, ExternalProducer, MaterialMode, PatchOptions, export_with_producer,
    inspect, patch_file,
};

#[derive(Parser)]
#[command(name = "mesh-export")]
#[command(about = "Mesh export and patch tool")]
#[command(version)]
struct Cli {
    /// Path to mesh-export.toml (default: ./mesh-export.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the contents of a .mesh file
    Inspect {
        /// Input .mesh file
        input: PathBuf,

        /// Dump the whole document as JSON
        #[arg(long)]
        json: bool,

        /// Convert coordinates to authoring-tool space (JSON only)
        #[arg(long, requires = "json")]
        tool_space: bool,
    },

    /// Check meshpoint names against the naming grammar
    Validate {
        /// Input .mesh file
        input: PathBuf,
    },

    /// Rewrite meshpoint and material names
    Patch {
        /// Input .mesh file
        input: PathBuf,

        /// Output file (default: overwrite input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// TOML file with replacement meshpoint and material names
        #[arg(long)]
        edits: Option<PathBuf>,

        /// Leave the material table as it is
        #[arg(long, conflicts_with = "edits")]
        keep_materials: bool,
    },

    /// Run the format producer and patch its output
    Export {
        /// Input geometry file
        input: PathBuf,

        /// Output directory
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = ExportConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect {
            input,
            json,
            tool_space,
        } => {
            let data =
                std::fs::read(&input).with_context(|| format!("Failed to read {:?}", input))?;
            let decoded = mesh_codec::decode(&data)
                .with_context(|| format!("Failed to decode {:?}", input))?;
            if json {
                println!("{}", inspect::render_json(&decoded.document, tool_space)?);
            } else {
                let rules = config.naming_rules()?;
                print!("{}", inspect::render_summary(&decoded, &rules));
            }
        }

        Commands::Validate { input } => {
            let data =
                std::fs::read(&input).with_context(|| format!("Failed to read {:?}", input))?;
            let decoded = mesh_codec::decode(&data)
                .with_context(|| format!("Failed to decode {:?}", input))?;
            let rules = config.naming_rules()?;
            let invalid = rules.validate_all(&decoded.document.meshpoints);
            if !invalid.is_empty() {
                for name in &invalid {
                    tracing::error!("Invalid meshpoint name {}", name);
                }
                bail!("{} invalid meshpoint name(s) in {:?}", invalid.len(), input);
            }
            tracing::info!(
                "{:?}: {} meshpoints valid",
                input,
                decoded.document.meshpoints.len()
            );
        }

        Commands::Patch {
            input,
            output,
            edits,
            keep_materials,
        } => {
            let output = output.unwrap_or_else(|| input.clone());
            let options = match edits {
                Some(path) => {
                    let edits = EditFile::load(&path)?;
                    PatchOptions {
                        meshpoints: edits.live_meshpoints(),
                        materials: match edits.materials {
                            Some(names) => MaterialMode::Rename(names),
                            None => MaterialMode::Keep,
                        },
                    }
                }
                None => PatchOptions {
                    meshpoints: None,
                    materials: if keep_materials || !config.materials.sort {
                        MaterialMode::Keep
                    } else {
                        MaterialMode::SortUsed
                    },
                },
            };
            let rules = config.naming_rules()?;
            let report = patch_file(&input, &output, &rules, &options)?;
            tracing::info!(
                "{} meshpoints, materials: {}",
                report.meshpoints,
                report.materials.join(", ")
            );
        }

        Commands::Export { input, out_dir } => {
            let producer = ExternalProducer::from_config(&config.producer);
            let report = export_with_producer(&producer, &input, &out_dir, &config)?;
            tracing::info!(
                "Exported {:?} ({} descriptors written)",
                report.mesh_path,
                report.descriptors.len()
            );
        }
    }

    Ok(())
}
