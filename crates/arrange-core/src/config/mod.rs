//! Configuration system for arrange
//!
//! - TOML, JSON and YAML configuration files
//! - Auto-discovery by traversing up directories
//! - Rule switches and file discovery globs
//!
//! ## Configuration Discovery
//!
//! When no explicit config path is provided, the first of `.arrange.toml`,
//! `.arrange.json`, `arrange.yaml` or `arrange.yml` found in the current
//! directory or one of its parents is used. Without a config file every rule
//! runs with its default setting.

mod arrange_config;
mod loader;

pub use arrange_config::{
    ArrangeConfig, ConfigFormat, FileMatcher, FilesConfiguration, RulesConfiguration,
};
pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
