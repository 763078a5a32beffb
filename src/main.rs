use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use clinigraph::{
    config::ExtractionConfig,
    extraction::{plan_extraction, ExtractionRequest},
    graph_catalog::{sort_order_from_columns, GraphSnapshot},
};

/// clinigraph - inspect domain extraction against a graph snapshot
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a domain and print the classes, relationships and filters that would be extracted
    Plan {
        /// Graph snapshot file (YAML or JSON)
        #[arg(long)]
        snapshot: PathBuf,

        /// Extraction standard tag
        #[arg(long)]
        standard: String,

        /// Domain table to reconstruct
        #[arg(long)]
        domain: String,

        /// Restrict the study class to this study
        #[arg(long)]
        study: Option<String>,

        /// Apply the class restrictions of this user role
        #[arg(long)]
        role: Option<String>,

        /// Extraction configuration file (defaults to CLINIGRAPH_* environment variables)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Keep classes that were never created during reshaping
        #[arg(long)]
        no_check_refactored: bool,
    },

    /// Print the sort order derived from the declared column order of a domain
    SortOrder {
        /// Graph snapshot file (YAML or JSON)
        #[arg(long)]
        snapshot: PathBuf,

        /// Extraction standard tag
        #[arg(long)]
        standard: String,

        /// Domain table
        #[arg(long)]
        domain: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    // Defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Plan {
            snapshot,
            standard,
            domain,
            study,
            role,
            config,
            no_check_refactored,
        } => {
            let mut config = match config {
                Some(path) => ExtractionConfig::from_yaml_file(&path)
                    .with_context(|| format!("loading configuration {}", path.display()))?,
                None => ExtractionConfig::from_env().context("reading CLINIGRAPH_* environment")?,
            };
            if no_check_refactored {
                config.check_for_refactored = false;
            }

            let graph = GraphSnapshot::from_file(&snapshot)?;
            let mut request = ExtractionRequest::new(standard.as_str(), domain.as_str());
            if let Some(study) = study {
                request = request.with_study(study);
            }
            if let Some(role) = role {
                request = request.with_role(role);
            }

            let plan = plan_extraction(&graph, &config, &request)
                .await?
                .with_context(|| {
                    format!("no table '{}' configured for standard '{}'", domain, standard)
                })?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::SortOrder {
            snapshot,
            standard,
            domain,
        } => {
            let graph = GraphSnapshot::from_file(&snapshot)?;
            let table = graph.table(&standard, &domain).with_context(|| {
                format!("no table '{}' configured for standard '{}'", domain, standard)
            })?;
            let keys = sort_order_from_columns(&table.columns);
            println!("{}", serde_json::to_string_pretty(&keys)?);
        }
    }

    Ok(())
}
