//! Schema Registry
//!
//! In-memory map from normalized document key to parsed schema document.
//! Populated once by the loader (or by tests) and read-only afterwards.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::reference::normalize_document_key;

/// Parsed schema documents indexed by document key
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    documents: BTreeMap<String, Value>,
    /// URL prefix stripped from `$id`-style keys and absolute references
    base_url: Option<String>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry that strips `base_url` from absolute document sources
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            documents: BTreeMap::new(),
            base_url: Some(base_url.into()),
        }
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Insert a document under its normalized key, returning the key used.
    ///
    /// A document already registered under the same key is replaced.
    pub fn insert(&mut self, source: &str, document: Value) -> String {
        let key = normalize_document_key(source, self.base_url());
        self.documents.insert(key.clone(), document);
        key
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.documents.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.documents.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Document keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.documents.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for SchemaRegistry {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut registry = Self::new();
        for (source, document) in iter {
            registry.insert(&source, document);
        }
        registry
    }
}
