//! Schema Docs CLI
//!
//! Generates documentation for a JSON Schema set, or prints its flattened
//! property paths.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use schema_docs::{flatten_entry, generate, load, DocsConfig, OutputFormat};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-docs")]
#[command(about = "Generate documentation from interlinked JSON Schema documents")]
#[command(version)]
struct Cli {
    /// Config file (defaults to schema-docs.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the schema set
    #[arg(short, long, global = true)]
    schema_dir: Option<PathBuf>,

    /// Entry document, relative to the schema directory
    #[arg(short, long, global = true)]
    entry: Option<String>,

    /// Output directory
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate documentation pages
    Generate {
        /// Output format: markdown, html or both
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Keep existing files in the output directory
        #[arg(long)]
        no_clean: bool,
    },

    /// Print the flattened path map as JSON
    Paths {
        /// Print only the path keys, one per line
        #[arg(long)]
        keys_only: bool,
    },

    /// Show the effective configuration
    Config {
        /// Write the configuration to this file instead of printing it
        #[arg(long)]
        init: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = DocsConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    if let Some(dir) = cli.schema_dir {
        config.input.schema_dir = dir;
    }
    if let Some(entry) = cli.entry {
        config.input.entry = entry;
    }
    if let Some(output) = cli.output {
        config.output.dir = output;
    }
    tracing::debug!(
        entry = %config.entry_path().display(),
        output = %config.output.dir.display(),
        "configuration resolved"
    );

    match cli.command {
        Commands::Generate { format, no_clean } => {
            if let Some(format) = format {
                config.output.format = format;
            }
            if no_clean {
                config.output.clean = false;
            }

            let report = generate(&config)?;

            println!("📚 Documented {} paths from {} schemas", report.paths, report.documents);
            println!("   bundle {}", report.bundle_hash);
            println!("✅ Wrote {} files to {}", report.written.len(), config.output.dir.display());
            if !report.diagnostics.is_empty() {
                println!();
                print!("{}", report.diagnostics);
            }
        }

        Commands::Paths { keys_only } => {
            let loaded = load(&config)?;
            let flattened = flatten_entry(&config, &loaded)?;

            if keys_only {
                for (path, _) in flattened.sorted() {
                    println!("{}", path);
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&flattened.to_annotated_json())?);
            }

            if !flattened.diagnostics.is_empty() {
                eprint!("{}", flattened.diagnostics);
            }
        }

        Commands::Config { init } => match init {
            Some(path) => {
                config.save(&path)?;
                println!("✅ Wrote configuration to {}", path.display());
            }
            None => print!("{}", config.to_toml()?),
        },
    }

    Ok(())
}
