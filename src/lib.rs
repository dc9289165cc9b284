//! Schema Docs
//!
//! Generates reference documentation from a set of interlinked JSON Schema
//! documents.
//!
//! ## Pipeline
//!
//! ```text
//! schema dir ──load──▶ SchemaRegistry ──flatten──▶ FlatPath → node ──render──▶ pages
//!                          ▲                │
//!                          └── $ref lookup ─┘
//! ```
//!
//! The core ([`SchemaRegistry`], [`ReferenceResolver`], [`PathSegment`],
//! [`TreeFlattener`]) is pure: it takes already parsed documents and returns
//! an insertion-ordered map from flat property path to the resolved schema
//! node. `$ref`s are followed across documents, `patternProperties` keys
//! collapse into one placeholder segment, and reference cycles are truncated
//! instead of recursing forever.
//!
//! ```
//! use schema_docs::{FlatPath, SchemaRegistry, TreeFlattener};
//! use serde_json::json;
//!
//! let mut registry = SchemaRegistry::new();
//! registry.insert("root.json", json!({
//!     "properties": {
//!         "a": { "type": "string" },
//!         "b": { "$ref": "defs.json#/widgets/w1" }
//!     }
//! }));
//! registry.insert("defs.json", json!({ "widgets": { "w1": { "type": "number" } } }));
//!
//! let root = registry.get("root.json").unwrap();
//! let flat = TreeFlattener::new(&registry)
//!     .flatten(root, "root.json", &FlatPath::parse("/"))
//!     .unwrap();
//! assert_eq!(flat.get("/b"), Some(&json!({ "type": "number" })));
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod flatten;
pub mod generate;
pub mod loader;
pub mod output;
pub mod reference;
pub mod registry;
pub mod render;
pub mod resolver;
pub mod segment;

pub use config::{DocsConfig, OutputFormat};
pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};
pub use error::{DocsError, Result};
pub use flatten::{FlatMap, FlattenOptions, Flattened, TreeFlattener};
pub use generate::{flatten_entry, generate, load, GenerateReport};
pub use loader::{load_from_directory, LoadConfig, LoadedSchemas};
pub use reference::{normalize_document_key, Reference};
pub use registry::SchemaRegistry;
pub use resolver::{ReferenceResolver, ResolutionFailure, Resolved, TargetKey};
pub use segment::{FlatPath, PathSegment, PLACEHOLDER_TOKEN};
