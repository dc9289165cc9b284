//! Reference Resolution
//!
//! Turns a parsed [`Reference`] into the schema node it designates. Pointer
//! walks are permissive: a segment that is missing stops the walk and the
//! deepest node reached is returned, with the unwalked remainder reported.

use serde_json::Value;
use thiserror::Error;

use crate::reference::Reference;
use crate::registry::SchemaRegistry;

/// Why a reference could not be resolved at all
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionFailure {
    #[error("unknown document '{document}'")]
    UnknownDocument { document: String },

    #[error("malformed reference '{reference}'")]
    MalformedReference { reference: String },
}

/// Identity of a resolved node: target document plus the pointer actually walked
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetKey {
    pub document: String,
    pub pointer: Vec<String>,
}

impl std::fmt::Display for TargetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#/{}", self.document, self.pointer.join("/"))
    }
}

/// A successfully resolved reference
#[derive(Debug, Clone)]
pub struct Resolved<'a> {
    pub node: &'a Value,
    pub target: TargetKey,
    /// Pointer segments that could not be walked (empty on a full match)
    pub unresolved: Vec<String>,
}

impl Resolved<'_> {
    pub fn is_partial(&self) -> bool {
        !self.unresolved.is_empty()
    }
}

/// Resolves references against a [`SchemaRegistry`]
#[derive(Debug, Clone, Copy)]
pub struct ReferenceResolver<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a SchemaRegistry {
        self.registry
    }

    /// Parse and resolve a raw `$ref` string
    pub fn resolve_str(&self, raw: &str, current_document: &str) -> Result<Resolved<'a>, ResolutionFailure> {
        let reference = Reference::parse(raw)?;
        self.resolve(&reference, current_document)
    }

    /// Resolve a reference appearing in `current_document`
    pub fn resolve(&self, reference: &Reference, current_document: &str) -> Result<Resolved<'a>, ResolutionFailure> {
        let document = reference.target_document(current_document, self.registry.base_url());

        let Some(mut cursor) = self.registry.get(&document) else {
            return Err(ResolutionFailure::UnknownDocument { document });
        };

        let pointer = reference.pointer();
        let mut walked = Vec::with_capacity(pointer.len());
        let mut unresolved = Vec::new();

        for (idx, segment) in pointer.iter().enumerate() {
            match cursor.as_object().and_then(|obj| obj.get(segment)) {
                Some(next) => {
                    cursor = next;
                    walked.push(segment.clone());
                }
                None => {
                    unresolved = pointer[idx..].to_vec();
                    break;
                }
            }
        }

        Ok(Resolved {
            node: cursor,
            target: TargetKey {
                document,
                pointer: walked,
            },
            unresolved,
        })
    }
}
