//! End-to-end generation: load, flatten, render, write.

use chrono::Utc;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::DocsConfig;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::flatten::{Flattened, TreeFlattener};
use crate::loader::{load_from_directory, LoadConfig, LoadedSchemas};
use crate::reference::normalize_document_key;
use crate::output::{prepare_output_dir, write_pages};
use crate::render::render;

/// Summary of a generation run
#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub documents: usize,
    pub paths: usize,
    pub bundle_hash: String,
    pub written: Vec<PathBuf>,
    /// Loader and flatten diagnostics combined
    pub diagnostics: Diagnostics,
}

/// Load the schema set named by the configuration
pub fn load(config: &DocsConfig) -> Result<LoadedSchemas> {
    let load_config = LoadConfig {
        base_url: config.input.base_url.clone(),
        key_by_id: config.input.key_by_id,
        ..LoadConfig::default()
    };
    load_from_directory(&config.input.schema_dir, &load_config)
}

/// Flatten the configured entry document of a loaded schema set
pub fn flatten_entry<'a>(config: &DocsConfig, loaded: &'a LoadedSchemas) -> Result<Flattened<'a>> {
    let entry = normalize_document_key(&config.input.entry, loaded.registry.base_url());
    TreeFlattener::new(&loaded.registry)
        .with_options(config.flatten_options())
        .flatten_document(&entry)
}

/// Run the whole pipeline
pub fn generate(config: &DocsConfig) -> Result<GenerateReport> {
    let loaded = load(config)?;
    let flattened = flatten_entry(config, &loaded)?;

    let mut diagnostics = loaded.diagnostics();
    diagnostics.merge(flattened.diagnostics.clone());
    for item in diagnostics.warnings() {
        warn!("{}", item);
    }

    let files = render(&flattened, &config.output, Utc::now());
    prepare_output_dir(&config.output.dir, config.output.clean)?;
    let written = write_pages(&config.output.dir, &files)?;

    info!(
        paths = flattened.len(),
        files = written.len(),
        output = %config.output.dir.display(),
        "documentation generated"
    );

    Ok(GenerateReport {
        documents: loaded.registry.len(),
        paths: flattened.len(),
        bundle_hash: loaded.bundle_hash.clone(),
        written,
        diagnostics,
    })
}
