//! Schema Loading
//!
//! Loads a schema set from a directory into a [`SchemaRegistry`], computes a
//! bundle hash, and builds the document-level `$ref` graph so cross-document
//! cycles can be reported before flattening.

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::diagnostics::Diagnostics;
use crate::error::{DocsError, Result};
use crate::reference::{normalize_document_key, Reference};
use crate::registry::SchemaRegistry;

/// Configuration for schema loading
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Skip schemas matching these path prefixes
    pub skip_prefixes: Vec<String>,
    /// URL prefix stripped from `$id`s and absolute references
    pub base_url: Option<String>,
    /// Key documents by their `$id` instead of their file path
    pub key_by_id: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            skip_prefixes: vec![
                "target/".to_string(),
                ".git/".to_string(),
                "node_modules/".to_string(),
            ],
            base_url: None,
            key_by_id: false,
        }
    }
}

/// A loaded schema set
#[derive(Debug, Clone)]
pub struct LoadedSchemas {
    pub registry: SchemaRegistry,
    /// SHA-256 over every loaded file, in key order
    pub bundle_hash: String,
    /// Groups of documents that reference each other (size > 1, or self-edges)
    pub document_cycles: Vec<Vec<String>>,
}

impl LoadedSchemas {
    /// Build from an already populated registry (hash and cycles computed here)
    pub fn from_registry(registry: SchemaRegistry) -> Self {
        let mut hasher = Sha256::new();
        for (key, document) in registry.iter() {
            hasher.update(key.as_bytes());
            hasher.update(document.to_string().as_bytes());
        }
        let bundle_hash = format!("{:x}", hasher.finalize());
        let document_cycles = document_cycles(&registry);

        Self {
            registry,
            bundle_hash,
            document_cycles,
        }
    }

    /// Cross-document cycles as diagnostics
    pub fn diagnostics(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        for group in &self.document_cycles {
            diagnostics.document_cycle(group);
        }
        diagnostics
    }
}

/// Load every `*.json` file below `schema_dir`.
///
/// Keys are paths relative to `schema_dir` with `/` separators, which is the
/// same string space relative `$ref`s resolve into. With `key_by_id` set, a
/// document carrying `$id` is keyed by it instead.
pub fn load_from_directory(schema_dir: &Path, config: &LoadConfig) -> Result<LoadedSchemas> {
    let mut registry = match &config.base_url {
        Some(base) => SchemaRegistry::with_base_url(base.clone()),
        None => SchemaRegistry::new(),
    };

    for entry in WalkDir::new(schema_dir).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().map(|e| e != "json").unwrap_or(true) {
            continue;
        }

        let relative = path.strip_prefix(schema_dir).unwrap_or(path);
        let relative_str = relative.to_string_lossy().replace('\\', "/");

        if config.skip_prefixes.iter().any(|p| relative_str.starts_with(p)) {
            continue;
        }

        let content = fs::read_to_string(path)?;
        let json: Value = serde_json::from_str(&content).map_err(|source| DocsError::InvalidSchema {
            path: path.display().to_string(),
            source,
        })?;

        let key = if config.key_by_id {
            register_by_id(&mut registry, &relative_str, json)
        } else {
            registry.insert(&relative_str, json)
        };
        debug!(key = %key, "loaded schema");
    }

    let loaded = LoadedSchemas::from_registry(registry);
    info!(
        documents = loaded.registry.len(),
        bundle = %&loaded.bundle_hash[..12],
        "schema set loaded"
    );
    for group in &loaded.document_cycles {
        warn!(documents = ?group, "documents reference each other");
    }

    Ok(loaded)
}

/// Register documents by their `$id` (or the given fallback source) instead of
/// by file path, the way schema bundles published under a URL are keyed.
pub fn register_by_id(registry: &mut SchemaRegistry, fallback_source: &str, document: Value) -> String {
    let source = document
        .get("$id")
        .or_else(|| document.get("id"))
        .and_then(Value::as_str)
        .map(|id| normalize_document_key(id, registry.base_url()))
        .filter(|key| !key.is_empty())
        .unwrap_or_else(|| fallback_source.to_string());
    registry.insert(&source, document)
}

/// Strongly connected groups of the document reference graph
fn document_cycles(registry: &SchemaRegistry) -> Vec<Vec<String>> {
    let mut graph: DiGraph<String, ()> = DiGraph::with_capacity(registry.len(), registry.len() * 2);
    let mut node_indices: HashMap<&str, NodeIndex> = HashMap::with_capacity(registry.len());

    for key in registry.keys() {
        node_indices.insert(key, graph.add_node(key.to_string()));
    }

    for (key, document) in registry.iter() {
        let mut refs = Vec::new();
        collect_refs(document, &mut refs);

        for raw in refs {
            let Ok(reference) = Reference::parse(raw) else {
                continue;
            };
            if reference.document().is_none() {
                continue;
            }
            let target = reference.target_document(key, registry.base_url());
            if let (Some(&from), Some(&to)) = (node_indices.get(key), node_indices.get(target.as_str())) {
                graph.update_edge(from, to, ());
            }
        }
    }

    let mut cycles: Vec<Vec<String>> = kosaraju_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || scc.iter().any(|&idx| graph.contains_edge(idx, idx)))
        .map(|scc| {
            let mut members: Vec<String> = scc
                .into_iter()
                .filter_map(|idx| graph.node_weight(idx).cloned())
                .collect();
            members.sort();
            members
        })
        .collect();
    cycles.sort();
    cycles
}

/// Collect every `$ref` string in a document
fn collect_refs<'v>(json: &'v Value, refs: &mut Vec<&'v str>) {
    match json {
        Value::Object(obj) => {
            if let Some(ref_val) = obj.get("$ref").and_then(Value::as_str) {
                refs.push(ref_val);
            }
            for (key, value) in obj {
                if key != "$ref" {
                    collect_refs(value, refs);
                }
            }
        }
        Value::Array(arr) => {
            for item in arr {
                collect_refs(item, refs);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(dir: &Path, rel: &str, value: &Value) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "signalk.json", &json!({ "properties": {} }));
        write(dir.path(), "groups/navigation.json", &json!({ "properties": {} }));
        write(dir.path(), "node_modules/skip.json", &json!({}));
        fs::write(dir.path().join("README.md"), "not a schema").unwrap();

        let loaded = load_from_directory(dir.path(), &LoadConfig::default()).unwrap();
        assert_eq!(
            loaded.registry.keys().collect::<Vec<_>>(),
            vec!["groups/navigation.json", "signalk.json"]
        );
        assert_eq!(loaded.bundle_hash.len(), 64);
        assert!(loaded.document_cycles.is_empty());
    }

    #[test]
    fn test_invalid_json_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        match load_from_directory(dir.path(), &LoadConfig::default()) {
            Err(DocsError::InvalidSchema { path, .. }) => assert!(path.ends_with("broken.json")),
            other => panic!("Expected InvalidSchema, got {:?}", other),
        }
    }

    #[test]
    fn test_document_cycles() {
        let registry: SchemaRegistry = vec![
            ("a.json".to_string(), json!({ "properties": { "b": { "$ref": "groups/b.json#" } } })),
            ("groups/b.json".to_string(), json!({ "items": [{ "$ref": "../a.json#/properties" }] })),
            ("c.json".to_string(), json!({ "properties": { "a": { "$ref": "a.json#" } } })),
            ("self.json".to_string(), json!({ "properties": { "s": { "$ref": "self.json#" } } })),
        ]
        .into_iter()
        .collect();

        let loaded = LoadedSchemas::from_registry(registry);
        assert_eq!(
            loaded.document_cycles,
            vec![
                vec!["a.json".to_string(), "groups/b.json".to_string()],
                vec!["self.json".to_string()],
            ]
        );
        assert_eq!(loaded.diagnostics().len(), 2);
    }

    #[test]
    fn test_bundle_hash_is_stable() {
        let build = || {
            let registry: SchemaRegistry = vec![("a.json".to_string(), json!({ "type": "string" }))]
                .into_iter()
                .collect();
            LoadedSchemas::from_registry(registry).bundle_hash
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_load_keyed_by_id() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "v1/navigation.json",
            &json!({ "$id": "https://signalk.org/specification/schemas/groups/navigation.json#" }),
        );
        write(dir.path(), "signalk.json", &json!({ "properties": {} }));

        let config = LoadConfig {
            base_url: Some("https://signalk.org/specification/schemas/".to_string()),
            key_by_id: true,
            ..LoadConfig::default()
        };
        let loaded = load_from_directory(dir.path(), &config).unwrap();
        assert_eq!(
            loaded.registry.keys().collect::<Vec<_>>(),
            vec!["groups/navigation.json", "signalk.json"]
        );

        // Without the switch the file path wins
        let by_path = load_from_directory(dir.path(), &LoadConfig::default()).unwrap();
        assert!(by_path.registry.contains("v1/navigation.json"));
    }

    #[test]
    fn test_register_by_id() {
        let mut registry = SchemaRegistry::with_base_url("https://signalk.org/specification/schemas/");
        let key = register_by_id(
            &mut registry,
            "fallback.json",
            json!({ "$id": "https://signalk.org/specification/schemas/groups/nav.json#" }),
        );
        assert_eq!(key, "groups/nav.json");

        let fallback = register_by_id(&mut registry, "other.json", json!({ "type": "object" }));
        assert_eq!(fallback, "other.json");
    }
}
