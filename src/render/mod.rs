//! Documentation Rendering
//!
//! Projects a flattened schema into documentation pages. Each flat path gets
//! one page; an index page links them all in sorted order.

pub mod html;
pub mod markdown;

pub use html::HtmlRenderer;
pub use markdown::MarkdownRenderer;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::config::OutputConfig;
use crate::flatten::Flattened;
use crate::segment::{is_pattern_like, FlatPath, PathSegment};

pub const NO_TITLE: &str = "No title";
pub const NO_TYPE: &str = "No type";
pub const NO_DESCRIPTION: &str = "No description";

/// Stem used for the placeholder segment in file names
const PLACEHOLDER_STEM: &str = "RegExp";

/// Stem of the index page, never handed to a path page
pub const INDEX_STEM: &str = "index";

/// Everything a renderer needs about one flat path
#[derive(Debug, Clone, PartialEq)]
pub struct DocPage {
    pub path: FlatPath,
    /// Path with placeholder segments replaced by the configured label
    pub display_path: String,
    pub title: String,
    pub schema_type: String,
    pub description: String,
    /// Pretty-printed example, if the node carries one
    pub example: Option<String>,
    /// Unexpanded reference (opaque documents)
    pub reference: Option<String>,
    /// File name without extension
    pub file_stem: String,
}

impl DocPage {
    pub fn from_entry(path: &FlatPath, node: &Value, placeholder_label: &str) -> Self {
        let title = node
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(NO_TITLE)
            .to_string();

        let schema_type = match node.get("type") {
            Some(Value::String(t)) => t.clone(),
            Some(Value::Array(types)) => types
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" | "),
            _ => NO_TYPE.to_string(),
        };

        let description = node
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or(NO_DESCRIPTION)
            .to_string();

        let example = node
            .get("example")
            .or_else(|| node.get("examples").and_then(|e| e.as_array()?.first()))
            .map(|e| serde_json::to_string_pretty(e).unwrap_or_else(|_| e.to_string()));

        let reference = node.get("$ref").and_then(Value::as_str).map(String::from);

        Self {
            path: path.clone(),
            display_path: display_path(path, placeholder_label),
            title,
            schema_type,
            description,
            example,
            reference,
            file_stem: file_stem(path),
        }
    }
}

/// Render a path for humans, pattern segments shown as `label`
pub fn display_path(path: &FlatPath, label: &str) -> String {
    if path.is_root() {
        return "/".to_string();
    }
    path.segments()
        .iter()
        .map(|segment| match segment {
            PathSegment::Literal(name) if !is_pattern_like(name) => format!("/{}", name),
            _ => format!("/{}", label),
        })
        .collect()
}

fn unsafe_file_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]").unwrap())
}

/// File name stem for a path: segments joined with `.`
pub fn file_stem(path: &FlatPath) -> String {
    if path.is_root() {
        return "root".to_string();
    }
    let joined = path
        .segments()
        .iter()
        .map(|segment| match segment {
            PathSegment::Placeholder => PLACEHOLDER_STEM,
            PathSegment::Literal(name) => name.as_str(),
        })
        .collect::<Vec<_>>()
        .join(".");
    unsafe_file_chars().replace_all(&joined, "_").into_owned()
}

/// Build pages in sorted path order, with file stems made unique
pub fn pages(flattened: &Flattened<'_>, placeholder_label: &str) -> Vec<DocPage> {
    let mut issued: HashSet<String> = HashSet::from([INDEX_STEM.to_string()]);

    flattened
        .sorted()
        .into_iter()
        .map(|(path, node)| {
            let mut page = DocPage::from_entry(path, node, placeholder_label);
            page.file_stem = unique_stem(&page.file_stem, &mut issued);
            page
        })
        .collect()
}

/// First of `stem`, `stem-2`, `stem-3`, ... not issued yet
fn unique_stem(stem: &str, issued: &mut HashSet<String>) -> String {
    let mut candidate = stem.to_string();
    let mut n = 1;
    while issued.contains(&candidate) {
        n += 1;
        candidate = format!("{}-{}", stem, n);
    }
    issued.insert(candidate.clone());
    candidate
}

/// A rendered file, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub relative_path: PathBuf,
    pub contents: String,
}

/// Turns pages into one output format
pub trait PageRenderer {
    /// File extension without the dot
    fn extension(&self) -> &'static str;

    fn render_page(&self, page: &DocPage) -> String;

    fn render_index(&self, pages: &[DocPage], generated_at: DateTime<Utc>) -> String;

    fn file_name(&self, stem: &str) -> PathBuf {
        PathBuf::from(format!("{}.{}", stem, self.extension()))
    }

    fn render_all(&self, pages: &[DocPage], generated_at: DateTime<Utc>) -> Vec<RenderedFile> {
        let mut files: Vec<RenderedFile> = pages
            .iter()
            .map(|page| RenderedFile {
                relative_path: self.file_name(&page.file_stem),
                contents: self.render_page(page),
            })
            .collect();
        files.push(RenderedFile {
            relative_path: self.file_name(INDEX_STEM),
            contents: self.render_index(pages, generated_at),
        });
        files
    }
}

/// Render every enabled format for a flattened schema
pub fn render(flattened: &Flattened<'_>, config: &OutputConfig, generated_at: DateTime<Utc>) -> Vec<RenderedFile> {
    let pages = pages(flattened, &config.placeholder_label);

    let mut renderers: Vec<Box<dyn PageRenderer>> = Vec::new();
    if config.format.markdown() {
        renderers.push(Box::new(MarkdownRenderer));
    }
    if config.format.html() {
        renderers.push(Box::new(HtmlRenderer));
    }

    renderers
        .iter()
        .flat_map(|renderer| renderer.render_all(&pages, generated_at))
        .collect()
}
