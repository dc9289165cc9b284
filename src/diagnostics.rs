//! Diagnostics
//!
//! Collects the non-fatal conditions met while resolving and flattening.
//! Fatal conditions are [`crate::DocsError`]s; everything here lets the
//! traversal continue.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// Pointer segment missing, deepest node reached was used
    PartialPointer,
    /// Reference re-entered a target already being expanded
    CycleTruncated,
    /// Depth budget exhausted, subtree recorded as a leaf
    DepthLimit,
    /// Two declarations normalized to the same flat path (last write wins)
    PathCollision,
    /// Reference into an opaque document recorded without expansion
    OpaqueReference,
    /// Documents reference each other in a cycle
    DocumentCycle,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PartialPointer => "W001",
            Self::CycleTruncated => "W002",
            Self::DepthLimit => "W003",
            Self::PathCollision => "W004",
            Self::OpaqueReference => "I001",
            Self::DocumentCycle => "I002",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::PartialPointer
            | Self::CycleTruncated
            | Self::DepthLimit
            | Self::PathCollision => Severity::Warning,

            Self::OpaqueReference | Self::DocumentCycle => Severity::Info,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticItem {
    /// Flat path (or document key) where the condition was met
    pub location: String,
    pub code: DiagnosticCode,
    pub message: String,
    /// Additional context (reference strings, target keys)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl DiagnosticItem {
    pub fn new(location: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.code,
            self.code.severity(),
            self.message,
            self.location
        )?;

        for ctx in &self.context {
            write!(f, "\n  - {}", ctx)?;
        }

        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Collection of diagnostics from a flatten run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: DiagnosticItem) {
        self.items.push(item);
    }

    pub fn partial_pointer(&mut self, location: impl Into<String>, reference: &str, unresolved: &[String]) {
        self.push(
            DiagnosticItem::new(
                location,
                DiagnosticCode::PartialPointer,
                format!("$ref '{}' stopped before segment '{}'", reference, unresolved.join("/")),
            )
            .with_context("using the deepest node reached"),
        );
    }

    pub fn cycle_truncated(&mut self, location: impl Into<String>, reference: &str, target: &str) {
        self.push(
            DiagnosticItem::new(
                location,
                DiagnosticCode::CycleTruncated,
                format!("$ref '{}' re-enters '{}', expansion stopped", reference, target),
            ),
        );
    }

    pub fn depth_limit(&mut self, location: impl Into<String>, max_depth: usize) {
        self.push(DiagnosticItem::new(
            location,
            DiagnosticCode::DepthLimit,
            format!("Nesting exceeds max depth {}, subtree not expanded", max_depth),
        ));
    }

    pub fn path_collision(&mut self, location: impl Into<String>, key: &str) {
        self.push(
            DiagnosticItem::new(
                location,
                DiagnosticCode::PathCollision,
                format!("Key '{}' normalizes to an existing path, previous entry replaced", key),
            ),
        );
    }

    pub fn opaque_reference(&mut self, location: impl Into<String>, reference: &str) {
        self.push(DiagnosticItem::new(
            location,
            DiagnosticCode::OpaqueReference,
            format!("$ref '{}' points into an opaque document, recorded as-is", reference),
        ));
    }

    pub fn document_cycle(&mut self, documents: &[String]) {
        self.push(
            DiagnosticItem::new(
                documents.first().cloned().unwrap_or_default(),
                DiagnosticCode::DocumentCycle,
                format!("{} documents reference each other", documents.len()),
            )
            .with_context(format!("Cycle: {}", documents.join(" <-> "))),
        );
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Warning)
    }

    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(move |i| i.code == code)
    }

    pub fn all(&self) -> &[DiagnosticItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    /// Format all diagnostics for display
    pub fn format_all(&self) -> String {
        let mut output = String::new();

        for item in &self.items {
            output.push_str(&format!("{}\n", item));
        }

        if !self.is_empty() {
            output.push_str(&format!(
                "\n{} warning(s), {} note(s)\n",
                self.warning_count(),
                self.len() - self.warning_count()
            ));
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_all())
    }
}

impl IntoIterator for Diagnostics {
    type Item = DiagnosticItem;
    type IntoIter = std::vec::IntoIter<DiagnosticItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a DiagnosticItem;
    type IntoIter = std::slice::Iter<'a, DiagnosticItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
