//! `$ref` Parsing
//!
//! A raw `$ref` string is split once into a document part and an in-document
//! pointer. Document keys share one string space with the registry keys
//! produced by the loader, so every normalization rule lives here.

use std::fmt;

use crate::resolver::ResolutionFailure;

/// A parsed `$ref` value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    raw: String,
    /// Target document as written (cut after `.json`), `None` = current document
    document: Option<String>,
    /// Unescaped pointer segments, empty = whole document
    pointer: Vec<String>,
}

impl Reference {
    /// Parse a raw `$ref` string.
    ///
    /// Only an empty (or all-whitespace) string is rejected; `#` alone is the
    /// current document, and pointers without a leading `/` are accepted.
    pub fn parse(raw: &str) -> Result<Self, ResolutionFailure> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ResolutionFailure::MalformedReference {
                reference: raw.to_string(),
            });
        }

        let (document_part, pointer_part) = trimmed.split_once('#').unwrap_or((trimmed, ""));

        let document = match document_part {
            "" => None,
            part => Some(cut_after_json(part).to_string()),
        };

        let pointer_part = pointer_part.strip_prefix('/').unwrap_or(pointer_part);
        let pointer = if pointer_part.is_empty() {
            Vec::new()
        } else {
            pointer_part.split('/').map(unescape_segment).collect()
        };

        Ok(Self {
            raw: raw.to_string(),
            document,
            pointer,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The document part as written, if the reference leaves the current document
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    pub fn pointer(&self) -> &[String] {
        &self.pointer
    }

    /// Registry key of the target document, relative to the referencing document
    pub fn target_document(&self, current_document: &str, base_url: Option<&str>) -> String {
        match &self.document {
            None => current_document.to_string(),
            Some(doc) if doc.contains("://") => normalize_document_key(doc, base_url),
            Some(doc) => join_relative(current_document, doc),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Normalize a document source (file path or `$id` URL) into a registry key.
///
/// The fragment marker is dropped, a matching `base_url` prefix is stripped,
/// and any other URL keeps only its final path segment.
pub fn normalize_document_key(source: &str, base_url: Option<&str>) -> String {
    let source = source.split('#').next().unwrap_or_default();
    let source = source.replace('\\', "/");

    let key = match base_url.and_then(|base| source.strip_prefix(base)) {
        Some(rest) => rest,
        None if source.contains("://") => source.rsplit('/').next().unwrap_or_default(),
        None => source.as_str(),
    };

    let key = key.trim_start_matches('/');
    key.strip_prefix("./").unwrap_or(key).to_string()
}

/// Cut everything after the first `.json` (keeps `.json` itself)
fn cut_after_json(document: &str) -> &str {
    match document.find(".json") {
        Some(idx) => &document[..idx + ".json".len()],
        None => document,
    }
}

/// JSON Pointer unescaping (`~1` before `~0`)
fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Join a relative document path against the directory of the current document.
///
/// `..` above the registry root is dropped, so `../definitions.json` from a
/// top-level document resolves to `definitions.json`.
fn join_relative(current_document: &str, document: &str) -> String {
    let mut parts: Vec<&str> = if document.starts_with('/') {
        Vec::new()
    } else {
        current_document
            .rsplit_once('/')
            .map(|(dir, _)| dir.split('/').filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    };

    for part in document.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cross_document() {
        let r = Reference::parse("defs.json#/widgets/w1").unwrap();
        assert_eq!(r.document(), Some("defs.json"));
        assert_eq!(r.pointer(), &["widgets".to_string(), "w1".to_string()]);
        assert_eq!(r.raw(), "defs.json#/widgets/w1");
    }

    #[test]
    fn test_parse_local_and_whole_document() {
        let local = Reference::parse("#/definitions/units").unwrap();
        assert_eq!(local.document(), None);
        assert_eq!(local.pointer().len(), 2);

        let whole = Reference::parse("groups/navigation.json#").unwrap();
        assert_eq!(whole.document(), Some("groups/navigation.json"));
        assert!(whole.pointer().is_empty());

        let bare = Reference::parse("#").unwrap();
        assert_eq!(bare.document(), None);
        assert!(bare.pointer().is_empty());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(
            Reference::parse(""),
            Err(ResolutionFailure::MalformedReference { .. })
        ));
        assert!(matches!(
            Reference::parse("   "),
            Err(ResolutionFailure::MalformedReference { .. })
        ));
    }

    #[test]
    fn test_parse_cuts_after_json() {
        let r = Reference::parse("defs.json/extra#/a").unwrap();
        assert_eq!(r.document(), Some("defs.json"));
    }

    #[test]
    fn test_pointer_unescape() {
        let r = Reference::parse("#/paths/~1vessels~1self/a~0b").unwrap();
        assert_eq!(r.pointer(), &["/vessels/self".to_string(), "a~b".to_string()]);
    }

    #[test]
    fn test_target_document_relative() {
        let r = Reference::parse("../definitions.json#/definitions/units").unwrap();
        assert_eq!(r.target_document("groups/navigation.json", None), "definitions.json");
        assert_eq!(r.target_document("signalk.json", None), "definitions.json");

        let sibling = Reference::parse("design.json#").unwrap();
        assert_eq!(sibling.target_document("groups/navigation.json", None), "groups/design.json");

        let local = Reference::parse("#/definitions/x").unwrap();
        assert_eq!(local.target_document("groups/navigation.json", None), "groups/navigation.json");
    }

    #[test]
    fn test_target_document_url() {
        let base = "https://signalk.org/specification/schemas/";
        let r = Reference::parse("https://signalk.org/specification/schemas/groups/nav.json#/a").unwrap();
        assert_eq!(r.target_document("signalk.json", Some(base)), "groups/nav.json");
        assert_eq!(r.target_document("signalk.json", None), "nav.json");
    }

    #[test]
    fn test_normalize_document_key() {
        let base = "https://signalk.org/specification/schemas/";
        assert_eq!(
            normalize_document_key("https://signalk.org/specification/schemas/signalk.json#", Some(base)),
            "signalk.json"
        );
        assert_eq!(normalize_document_key("http://example.com/a/b/defs.json#", None), "defs.json");
        assert_eq!(normalize_document_key("./groups/design.json", None), "groups/design.json");
        assert_eq!(normalize_document_key("groups\\design.json", None), "groups/design.json");
    }
}
