//! Tree Flattening
//!
//! Walks a root schema node and produces one flat path per declared property,
//! following `$ref` pointers transparently. Members of a referenced node are
//! flattened under the *referencing* path, and a `$ref` sitting next to
//! `properties` on the same node is merged into that node's namespace.
//!
//! Recursion is bounded two ways: the `(document, pointer)` targets being
//! expanded on the active call path are tracked, and re-entering one records
//! the node as a leaf; independently, a depth budget truncates runaway nesting.
//! Both emit diagnostics instead of failing the run.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::diagnostics::Diagnostics;
use crate::error::{DocsError, Result};
use crate::reference::Reference;
use crate::registry::SchemaRegistry;
use crate::resolver::{ReferenceResolver, ResolutionFailure, Resolved, TargetKey};
use crate::segment::{FlatPath, PathSegment};

/// Flat path → resolved node, in traversal order
pub type FlatMap<'a> = IndexMap<FlatPath, &'a Value>;

const REF: &str = "$ref";

/// Tuning for a flatten run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Maximum nesting below the starting prefix before subtrees are cut
    pub max_depth: usize,
    /// Documents whose references are recorded verbatim and never expanded
    pub opaque_documents: Vec<String>,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            opaque_documents: Vec::new(),
        }
    }
}

/// Result of a flatten run
#[derive(Debug, Clone, Default)]
pub struct Flattened<'a> {
    pub paths: FlatMap<'a>,
    pub diagnostics: Diagnostics,
}

impl<'a> Flattened<'a> {
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Look up a node by its joined path string
    pub fn get(&self, path: &str) -> Option<&'a Value> {
        self.paths.get(&FlatPath::parse(path)).copied()
    }

    /// Entries sorted by path, for presentation
    pub fn sorted(&self) -> Vec<(&FlatPath, &'a Value)> {
        let mut entries: Vec<_> = self.paths.iter().map(|(p, v)| (p, *v)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// The flat map as a JSON object, each object node annotated with `_path`
    pub fn to_annotated_json(&self) -> Value {
        let mut out = Map::with_capacity(self.paths.len());
        for (path, node) in &self.paths {
            let key = path.to_string();
            let mut node = (*node).clone();
            if let Value::Object(obj) = &mut node {
                obj.insert("_path".to_string(), Value::String(key.clone()));
            }
            out.insert(key, node);
        }
        Value::Object(out)
    }
}

// =============================================================================
// Member kinds
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum MemberKind {
    Properties,
    PatternProperties,
}

const MEMBER_KINDS: [MemberKind; 2] = [MemberKind::Properties, MemberKind::PatternProperties];

impl MemberKind {
    fn keyword(self) -> &'static str {
        match self {
            Self::Properties => "properties",
            Self::PatternProperties => "patternProperties",
        }
    }

    fn segment(self, key: &str) -> PathSegment {
        match self {
            Self::Properties => PathSegment::from_key(key),
            Self::PatternProperties => PathSegment::pattern(),
        }
    }
}

/// Does this node declare nested properties of either kind?
pub fn exposes_members(node: &Value) -> bool {
    MEMBER_KINDS
        .iter()
        .any(|kind| node.get(kind.keyword()).is_some_and(Value::is_object))
}

// =============================================================================
// Flattener
// =============================================================================

/// Flattens schema trees held in a [`SchemaRegistry`]
pub struct TreeFlattener<'a> {
    resolver: ReferenceResolver<'a>,
    options: FlattenOptions,
}

impl<'a> TreeFlattener<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self {
            resolver: ReferenceResolver::new(registry),
            options: FlattenOptions::default(),
        }
    }

    pub fn with_options(mut self, options: FlattenOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &FlattenOptions {
        &self.options
    }

    /// Flatten a whole registered document from the root path
    pub fn flatten_document(&self, document: &str) -> Result<Flattened<'a>> {
        let root = self
            .resolver
            .registry()
            .get(document)
            .ok_or_else(|| DocsError::EntryNotFound(document.to_string()))?;

        let mut walk = Walk::new(self);
        walk.active.push(TargetKey {
            document: document.to_string(),
            pointer: Vec::new(),
        });
        walk.walk(root, document, &FlatPath::root(), 0)?;
        Ok(walk.finish())
    }

    /// Flatten `root` (found in `root_document`) under `prefix`
    pub fn flatten(&self, root: &'a Value, root_document: &str, prefix: &FlatPath) -> Result<Flattened<'a>> {
        let mut walk = Walk::new(self);
        walk.walk(root, root_document, prefix, 0)?;
        Ok(walk.finish())
    }
}

/// Outcome of following a `$ref`
enum Followed<'a> {
    /// Target lives in an opaque document
    Opaque,
    Target(Resolved<'a>),
}

/// Accumulator for a single traversal
struct Walk<'f, 'a> {
    flattener: &'f TreeFlattener<'a>,
    paths: FlatMap<'a>,
    diagnostics: Diagnostics,
    /// Targets being expanded on the active call path
    active: Vec<TargetKey>,
}

impl<'f, 'a> Walk<'f, 'a> {
    fn new(flattener: &'f TreeFlattener<'a>) -> Self {
        Self {
            flattener,
            paths: IndexMap::new(),
            diagnostics: Diagnostics::new(),
            active: Vec::new(),
        }
    }

    fn finish(self) -> Flattened<'a> {
        debug!(
            paths = self.paths.len(),
            diagnostics = self.diagnostics.len(),
            "flatten complete"
        );
        Flattened {
            paths: self.paths,
            diagnostics: self.diagnostics,
        }
    }

    fn within_depth(&mut self, prefix: &FlatPath, depth: usize) -> bool {
        let max_depth = self.flattener.options.max_depth;
        if depth > max_depth {
            self.diagnostics.depth_limit(prefix.to_string(), max_depth);
            return false;
        }
        true
    }

    /// Expand a node's own members, then merge its `$ref` target at the same prefix
    fn walk(&mut self, node: &'a Value, document: &str, prefix: &FlatPath, depth: usize) -> Result<()> {
        if !self.within_depth(prefix, depth) {
            return Ok(());
        }

        self.expand_members(node, document, prefix, depth)?;

        if let Some(raw) = node.get(REF) {
            if let Followed::Target(resolved) = self.follow(raw, document, prefix)? {
                if exposes_members(resolved.node) {
                    trace!(path = %prefix, target = %resolved.target, "merging $ref target");
                    self.descend(resolved, &reference_text(raw), prefix, depth)?;
                }
            }
        }

        Ok(())
    }

    fn expand_members(&mut self, node: &'a Value, document: &str, prefix: &FlatPath, depth: usize) -> Result<()> {
        for kind in MEMBER_KINDS {
            let Some(members) = node.get(kind.keyword()).and_then(Value::as_object) else {
                continue;
            };

            for (key, child) in members {
                let path = prefix.child(kind.segment(key));

                let Some(raw) = child.get(REF) else {
                    self.record(&path, key, child);
                    if exposes_members(child) {
                        self.walk(child, document, &path, depth + 1)?;
                    }
                    continue;
                };

                match self.follow(raw, document, &path)? {
                    Followed::Opaque => self.record(&path, key, child),
                    Followed::Target(resolved) => {
                        self.record(&path, key, resolved.node);
                        if exposes_members(child) && self.within_depth(&path, depth + 1) {
                            self.expand_members(child, document, &path, depth + 1)?;
                        }
                        if exposes_members(resolved.node) {
                            self.descend(resolved, &reference_text(raw), &path, depth)?;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Walk a resolved target unless it is already being expanded
    fn descend(&mut self, resolved: Resolved<'a>, reference: &str, prefix: &FlatPath, depth: usize) -> Result<()> {
        if self.active.contains(&resolved.target) {
            self.diagnostics
                .cycle_truncated(prefix.to_string(), reference, &resolved.target.to_string());
            return Ok(());
        }

        let document = resolved.target.document.clone();
        self.active.push(resolved.target);
        let result = self.walk(resolved.node, &document, prefix, depth + 1);
        self.active.pop();
        result
    }

    /// Resolve a `$ref` value, following chains of pure reference nodes
    fn follow(&mut self, raw: &Value, document: &str, location: &FlatPath) -> Result<Followed<'a>> {
        let Some(reference) = self.parse(raw, document, location)? else {
            return Ok(Followed::Opaque);
        };
        let mut resolved = self.resolve(&reference, document, location)?;

        let mut seen = vec![resolved.target.clone()];
        while let Some(next_raw) = resolved.node.get(REF) {
            if exposes_members(resolved.node) {
                break;
            }
            let Some(next) = self.parse(next_raw, &resolved.target.document, location)? else {
                break;
            };
            let next_resolved = self.resolve(&next, &resolved.target.document, location)?;
            if seen.contains(&next_resolved.target) {
                self.diagnostics.cycle_truncated(
                    location.to_string(),
                    next.raw(),
                    &next_resolved.target.to_string(),
                );
                break;
            }
            seen.push(next_resolved.target.clone());
            resolved = next_resolved;
        }

        Ok(Followed::Target(resolved))
    }

    /// Parse a `$ref` value; `None` if it points into an opaque document
    fn parse(&mut self, raw: &Value, document: &str, location: &FlatPath) -> Result<Option<Reference>> {
        let text = reference_text(raw);
        let Some(raw_str) = raw.as_str() else {
            return Err(DocsError::reference(
                location,
                &text,
                ResolutionFailure::MalformedReference { reference: text.clone() },
            ));
        };
        let reference = Reference::parse(raw_str).map_err(|e| DocsError::reference(location, &text, e))?;

        let opaque = &self.flattener.options.opaque_documents;
        if !opaque.is_empty() {
            let base_url = self.flattener.resolver.registry().base_url();
            let target = reference.target_document(document, base_url);
            if opaque.iter().any(|o| *o == target) {
                self.diagnostics.opaque_reference(location.to_string(), &text);
                return Ok(None);
            }
        }

        Ok(Some(reference))
    }

    fn resolve(&mut self, reference: &Reference, document: &str, location: &FlatPath) -> Result<Resolved<'a>> {
        let resolved = self
            .flattener
            .resolver
            .resolve(reference, document)
            .map_err(|e| DocsError::reference(location, reference.raw(), e))?;

        if resolved.is_partial() {
            self.diagnostics
                .partial_pointer(location.to_string(), reference.raw(), &resolved.unresolved);
        }

        Ok(resolved)
    }

    /// Record a path, last write wins on collision
    fn record(&mut self, path: &FlatPath, key: &str, node: &'a Value) {
        if let Some(previous) = self.paths.insert(path.clone(), node) {
            // Same node reached twice (e.g. two patterns sharing one $ref) is not a collision
            if !std::ptr::eq(previous, node) {
                self.diagnostics.path_collision(path.to_string(), key);
            }
        }
    }
}

fn reference_text(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
