//! Configuration management for the documentation generator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (schema-docs.toml)
//! - Environment variables (SCHEMA_DOCS__*)
//!
//! ## Example config file (schema-docs.toml):
//! ```toml
//! [input]
//! schema_dir = "./schema"
//! entry = "signalk.json"
//! base_url = "https://signalk.org/specification/schemas/"
//! key_by_id = false
//!
//! [output]
//! dir = "./build"
//! format = "both"
//! clean = true
//! placeholder_label = "<RegExp>"
//!
//! [flatten]
//! max_depth = 64
//! opaque_documents = ["definitions.json"]
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::flatten::FlattenOptions;

/// Main configuration for a documentation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocsConfig {
    /// Where schemas are read from
    #[serde(default)]
    pub input: InputConfig,

    /// Where and how documentation is written
    #[serde(default)]
    pub output: OutputConfig,

    /// Traversal settings
    #[serde(default)]
    pub flatten: FlattenConfig,
}

/// Schema input configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory holding the schema set
    #[serde(default = "default_schema_dir")]
    pub schema_dir: PathBuf,

    /// Root document key, relative to `schema_dir`
    #[serde(default = "default_entry")]
    pub entry: String,

    /// URL prefix stripped from `$id`s and absolute `$ref`s
    #[serde(default)]
    pub base_url: Option<String>,

    /// Key documents by `$id` (minus `base_url`) rather than file path
    #[serde(default)]
    pub key_by_id: bool,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    #[serde(default)]
    pub format: OutputFormat,

    /// Remove the output directory before writing
    #[serde(default = "default_true")]
    pub clean: bool,

    /// Text shown for pattern-matched path segments
    #[serde(default = "default_placeholder_label")]
    pub placeholder_label: String,
}

/// Rendered page format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Html,
    Both,
}

impl OutputFormat {
    pub fn markdown(&self) -> bool {
        matches!(self, Self::Markdown | Self::Both)
    }

    pub fn html(&self) -> bool {
        matches!(self, Self::Html | Self::Both)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            "both" => Ok(Self::Both),
            other => Err(format!("unknown output format '{}' (expected markdown, html or both)", other)),
        }
    }
}

/// Flatten configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlattenConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Documents referenced verbatim instead of expanded
    #[serde(default)]
    pub opaque_documents: Vec<String>,
}

// Default value functions
fn default_schema_dir() -> PathBuf {
    PathBuf::from("./schema")
}

fn default_entry() -> String {
    "signalk.json".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./build")
}

fn default_true() -> bool {
    true
}

fn default_placeholder_label() -> String {
    "<RegExp>".to_string()
}

fn default_max_depth() -> usize {
    FlattenOptions::default().max_depth
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            schema_dir: default_schema_dir(),
            entry: default_entry(),
            base_url: None,
            key_by_id: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            format: OutputFormat::default(),
            clean: true,
            placeholder_label: default_placeholder_label(),
        }
    }
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            opaque_documents: Vec::new(),
        }
    }
}

impl From<&FlattenConfig> for FlattenOptions {
    fn from(config: &FlattenConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            opaque_documents: config.opaque_documents.clone(),
        }
    }
}

/// SCHEMA_DOCS__OUTPUT__DIR=... style overrides.
///
/// `SCHEMA_DOCS__FLATTEN__OPAQUE_DOCUMENTS` takes a comma separated list.
fn environment() -> Environment {
    Environment::with_prefix("SCHEMA_DOCS")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("flatten.opaque_documents")
}

impl DocsConfig {
    /// Load configuration from the default locations, plus an explicit file
    /// when given
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "schema-docs.toml",
            ".schema-docs.toml",
            "config/schema-docs.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "schema-docs") {
            let xdg_config = config_dir.config_dir().join("schema-docs.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(environment());

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Path of the entry document on disk
    pub fn entry_path(&self) -> PathBuf {
        self.input.schema_dir.join(&self.input.entry)
    }

    pub fn flatten_options(&self) -> FlattenOptions {
        FlattenOptions::from(&self.flatten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DocsConfig::default();
        assert_eq!(config.input.entry, "signalk.json");
        assert_eq!(config.output.dir, PathBuf::from("./build"));
        assert!(config.output.clean);
        assert_eq!(config.flatten.max_depth, 64);
        assert_eq!(config.entry_path(), PathBuf::from("./schema/signalk.json"));
    }

    #[test]
    fn test_serialize_config() {
        let config = DocsConfig::default();
        let toml_str = config.to_toml().unwrap();
        assert!(toml_str.contains("[input]"));
        assert!(toml_str.contains("[output]"));
        assert!(toml_str.contains("format = \"markdown\""));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.toml");
        std::fs::write(
            &path,
            "[input]\nentry = \"root.json\"\n\n[output]\nformat = \"both\"\n\n[flatten]\nopaque_documents = [\"definitions.json\"]\n",
        )
        .unwrap();

        let config = DocsConfig::load_from(Some(&path)).unwrap();
        assert_eq!(config.input.entry, "root.json");
        assert_eq!(config.output.format, OutputFormat::Both);
        assert_eq!(config.flatten_options().opaque_documents, vec!["definitions.json".to_string()]);
        // untouched sections keep defaults
        assert_eq!(config.output.placeholder_label, "<RegExp>");
    }

    #[test]
    fn test_environment_overrides() {
        let from_env = |vars: &[(&str, &str)]| -> DocsConfig {
            let env = environment().source(Some(
                vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            ));
            Config::builder()
                .add_source(env)
                .build()
                .unwrap()
                .try_deserialize()
                .unwrap()
        };

        let single = from_env(&[("SCHEMA_DOCS__FLATTEN__OPAQUE_DOCUMENTS", "definitions.json")]);
        assert_eq!(single.flatten.opaque_documents, vec!["definitions.json".to_string()]);

        let several = from_env(&[
            ("SCHEMA_DOCS__FLATTEN__OPAQUE_DOCUMENTS", "definitions.json,groups/units.json"),
            ("SCHEMA_DOCS__FLATTEN__MAX_DEPTH", "8"),
            ("SCHEMA_DOCS__INPUT__ENTRY", "root.json"),
        ]);
        assert_eq!(
            several.flatten.opaque_documents,
            vec!["definitions.json".to_string(), "groups/units.json".to_string()]
        );
        assert_eq!(several.flatten.max_depth, 8);
        assert_eq!(several.input.entry, "root.json");
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("HTML".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        assert!("pdf".parse::<OutputFormat>().is_err());
        assert!(OutputFormat::Both.markdown() && OutputFormat::Both.html());
    }
}
