//! Path Segments
//!
//! Flat property paths are kept as ordered segment lists and only joined into
//! strings for presentation. Pattern-matched keys collapse into a single
//! placeholder segment so every `patternProperties` entry under one parent
//! shares one path.

use serde::{Serialize, Serializer};
use std::fmt;

/// String form of the placeholder segment inside a flat path key.
///
/// `*` is itself a pattern metacharacter, so no literal key can produce it.
pub const PLACEHOLDER_TOKEN: &str = "*";

/// Characters that mark a property key as a pattern rather than a name.
const PATTERN_CHARS: [char; 3] = ['^', '$', '*'];

/// Returns true if a key looks like a regular expression (anchors or wildcard).
pub fn is_pattern_like(key: &str) -> bool {
    key.contains(PATTERN_CHARS)
}

// =============================================================================
// Path Segment
// =============================================================================

/// One step in a flat property path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// A fixed property name
    Literal(String),
    /// Any key matched through `patternProperties`, or a pattern-like literal
    Placeholder,
}

impl PathSegment {
    /// Normalize a key declared under `properties`
    pub fn from_key(key: &str) -> Self {
        if is_pattern_like(key) {
            Self::Placeholder
        } else {
            Self::Literal(key.to_string())
        }
    }

    /// Normalize a key declared under `patternProperties` (always a placeholder)
    pub fn pattern() -> Self {
        Self::Placeholder
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(name) => name,
            Self::Placeholder => PLACEHOLDER_TOKEN,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Flat Path
// =============================================================================

/// Full path from the schema root to a property
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlatPath {
    segments: Vec<PathSegment>,
}

impl FlatPath {
    /// The root path (`/`)
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a joined path string.
    ///
    /// Empty segments (leading, trailing or doubled `/`) are dropped, and each
    /// segment goes through the same pattern check as a declared key.
    pub fn parse(path: &str) -> Self {
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(PathSegment::from_key)
            .collect();
        Self { segments }
    }

    /// Extend this path by one segment
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn has_placeholder(&self) -> bool {
        self.segments.iter().any(PathSegment::is_placeholder)
    }
}

impl fmt::Display for FlatPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl From<&str> for FlatPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl Serialize for FlatPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_like_keys() {
        assert!(is_pattern_like("^[a-zA-Z0-9]+$"));
        assert!(is_pattern_like("(^urn:mrn:imo:mmsi:[2-7][0-9]{8}$)"));
        assert!(is_pattern_like("*"));
        assert!(!is_pattern_like("navigation"));
        assert!(!is_pattern_like("speed.over.ground"));
    }

    #[test]
    fn test_from_key() {
        assert_eq!(PathSegment::from_key("vessels"), PathSegment::Literal("vessels".into()));
        assert_eq!(PathSegment::from_key("^urn:.*$"), PathSegment::Placeholder);
        assert_eq!(PathSegment::pattern(), PathSegment::Placeholder);
    }

    #[test]
    fn test_display() {
        let path = FlatPath::root()
            .child(PathSegment::from_key("vessels"))
            .child(PathSegment::pattern())
            .child(PathSegment::from_key("name"));
        assert_eq!(path.to_string(), "/vessels/*/name");
        assert_eq!(path.depth(), 3);
        assert!(path.has_placeholder());
        assert_eq!(FlatPath::root().to_string(), "/");
        assert!(!FlatPath::parse("/vessels/self").has_placeholder());
    }

    #[test]
    fn test_parse_matches_segment_route() {
        // The joined-string check and the per-segment route must agree
        let built = FlatPath::root()
            .child(PathSegment::from_key("vessels"))
            .child(PathSegment::pattern());
        assert_eq!(FlatPath::parse("/vessels/^urn:mrn:.*$"), built);
        assert_eq!(FlatPath::parse("/vessels/*/"), built);
        assert_eq!(FlatPath::parse("vessels//*"), built);
    }

    #[test]
    fn test_placeholder_differs_from_literal() {
        let literal = PathSegment::Literal("RegExp".to_string());
        assert_ne!(literal, PathSegment::Placeholder);
    }
}
