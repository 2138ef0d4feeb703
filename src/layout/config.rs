//! Configuration for VFL parsing and the constraint tree

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read layout config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse layout config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Configuration options for VFL parsing
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Gap used by a bare `-` connection
    pub spacing: f64,

    /// Accept extended syntax: `~` equal spacing, `*`/`/` multipliers and
    /// `+`/`-` offsets inside predicates
    pub extended: bool,

    /// Named constants usable in predicates and priorities
    pub metrics: HashMap<String, f64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            spacing: 8.0,
            extended: true,
            metrics: HashMap::new(),
        }
    }
}

/// TOML structure for deserializing configs
#[derive(Deserialize)]
struct TomlConfig {
    spacing: Option<f64>,
    extended: Option<bool>,
    #[serde(default)]
    metrics: HashMap<String, f64>,
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the standard spacing
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Enable or disable extended syntax
    pub fn with_extended(mut self, extended: bool) -> Self {
        self.extended = extended;
        self
    }

    /// Define a metric
    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    /// Look up a metric by name
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    /// Load a configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a configuration from a TOML string.
    ///
    /// Keys missing from the file keep their default values.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let defaults = Self::default();
        Ok(Self {
            spacing: parsed.spacing.unwrap_or(defaults.spacing),
            extended: parsed.extended.unwrap_or(defaults.extended),
            metrics: parsed.metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LayoutConfig::default();
        assert_eq!(config.spacing, 8.0);
        assert!(config.extended);
        assert!(config.metrics.is_empty());
    }

    #[test]
    fn test_builder_pattern() {
        let config = LayoutConfig::new()
            .with_spacing(12.0)
            .with_extended(false)
            .with_metric("gutter", 20.0);

        assert_eq!(config.spacing, 12.0);
        assert!(!config.extended);
        assert_eq!(config.metric("gutter"), Some(20.0));
        assert_eq!(config.metric("margin"), None);
    }

    #[test]
    fn test_from_toml() {
        let config = LayoutConfig::from_toml_str(
            r#"
spacing = 4

[metrics]
gutter = 16
sidebar = 240.5
"#,
        )
        .unwrap();
        assert_eq!(config.spacing, 4.0);
        assert!(config.extended);
        assert_eq!(config.metric("gutter"), Some(16.0));
        assert_eq!(config.metric("sidebar"), Some(240.5));
    }

    #[test]
    fn test_from_toml_rejects_bad_types() {
        let result = LayoutConfig::from_toml_str("spacing = \"wide\"");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
