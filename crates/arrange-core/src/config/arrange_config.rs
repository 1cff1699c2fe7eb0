//! Configuration structure for arrange
//!
//! Two sections:
//! - `rules`: rule id to enabled flag
//! - `files`: include/exclude globs for file discovery
//!
//! ## Example Configuration (.arrange.toml)
//!
//! ```toml
//! [rules]
//! sort-class-members = true
//! remove-unused-usings = false
//!
//! [files]
//! include = ["src/**/*.cs"]
//! exclude = ["**/Generated/**"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use glob::{MatchOptions, Pattern};

use crate::error::ArrangeError;
use crate::result::Result;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ArrangeConfig {
    /// Rule switches; rules not listed use their default
    pub rules: RulesConfiguration,

    /// File discovery patterns
    pub files: FilesConfiguration,
}

/// Supported on-disk formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Some(Self::Toml),
            Some("json") => Some(Self::Json),
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            _ => None,
        }
    }

    /// File name `config init` writes for this format
    pub fn default_file_name(self) -> &'static str {
        match self {
            Self::Toml => ".arrange.toml",
            Self::Json => ".arrange.json",
            Self::Yaml => "arrange.yaml",
        }
    }
}

impl ArrangeConfig {
    /// Load configuration from file, dispatching on the extension
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| ArrangeError::io_error(path, e))?;
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            ArrangeError::config_error(format!(
                "Unsupported config file extension for '{}' (expected .toml, .json, .yaml or .yml)",
                path.display()
            ))
        })?;
        Self::parse(&content, format)
    }

    /// Parse configuration text in the given format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let config = match format {
            ConfigFormat::Toml => {
                toml::from_str(content).map_err(|e| ArrangeError::config_error(e.to_string()))?
            }
            ConfigFormat::Json => serde_json::from_str(content)
                .map_err(|e| ArrangeError::config_error(e.to_string()))?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| ArrangeError::config_error(e.to_string()))?,
        };
        Ok(config)
    }

    /// Serialize in the given format
    pub fn render(&self, format: ConfigFormat) -> Result<String> {
        match format {
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ArrangeError::config_error(e.to_string()))
            }
            ConfigFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| ArrangeError::config_error(e.to_string())),
            ConfigFormat::Yaml => {
                serde_yaml::to_string(self).map_err(|e| ArrangeError::config_error(e.to_string()))
            }
        }
    }
}

/// Rule id to enabled flag
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct RulesConfiguration(pub BTreeMap<String, bool>);

impl RulesConfiguration {
    /// Whether `rule_id` is enabled, falling back to the rule's default
    pub fn is_enabled(&self, rule_id: &str, default_enabled: bool) -> bool {
        self.0.get(rule_id).copied().unwrap_or(default_enabled)
    }

    pub fn set(&mut self, rule_id: impl Into<String>, enabled: bool) {
        self.0.insert(rule_id.into(), enabled);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(id, enabled)| (id.as_str(), *enabled))
    }
}

/// File discovery patterns
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct FilesConfiguration {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for FilesConfiguration {
    fn default() -> Self {
        Self {
            include: vec!["**/*.cs".to_string()],
            exclude: vec![
                "**/bin/**".to_string(),
                "**/obj/**".to_string(),
                "**/*.g.cs".to_string(),
                "**/*.Designer.cs".to_string(),
            ],
        }
    }
}

impl FilesConfiguration {
    /// Compile the patterns into a matcher
    pub fn matcher(&self) -> Result<FileMatcher> {
        Ok(FileMatcher {
            include: compile_patterns(&self.include)?,
            exclude: compile_patterns(&self.exclude)?,
        })
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p)
                .map_err(|e| ArrangeError::config_error(format!("Invalid glob pattern '{p}': {e}")))
        })
        .collect()
}

/// Compiled include/exclude globs
#[derive(Debug, Clone)]
pub struct FileMatcher {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

impl FileMatcher {
    /// Match a path relative to the discovery root
    pub fn is_match(&self, relative: &Path) -> bool {
        let normalized = relative.to_string_lossy().replace('\\', "/");
        let included = self
            .include
            .iter()
            .any(|p| p.matches_with(&normalized, MATCH_OPTIONS));
        included
            && !self
                .exclude
                .iter()
                .any(|p| p.matches_with(&normalized, MATCH_OPTIONS))
    }
}
