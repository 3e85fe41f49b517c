//! Discovery configuration.
//!
//! The config is a small JSON document: which suffix marks a feature file,
//! which directories act as resolution roots, which namespaces are in or out,
//! and which marker turns a code unit into a feature suite.
use crate::namespace::{NamespaceFilter, NamespaceRule};
use crate::resolver::DEFAULT_FEATURE_EXTENSION;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_SUITE_MARKER: &str = "feature_suite";

fn default_schema_version() -> u32 {
    CONFIG_SCHEMA_VERSION
}

fn default_extension() -> String {
    DEFAULT_FEATURE_EXTENSION.to_string()
}

fn default_suite_marker() -> String {
    DEFAULT_SUITE_MARKER.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DiscoveryConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default = "default_extension")]
    pub feature_extension: String,
    #[serde(default)]
    pub resolution_roots: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_namespaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_namespaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_namespace_patterns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_namespace_patterns: Vec<String>,
    #[serde(default = "default_suite_marker")]
    pub suite_marker: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        default_config()
    }
}

impl DiscoveryConfig {
    /// Compose the configured namespace rules into one predicate.
    pub fn namespace_filter(&self) -> Result<NamespaceFilter> {
        let mut rules = Vec::new();
        rules.extend(self.include_namespaces.iter().map(|name| NamespaceRule::include(name)));
        rules.extend(self.exclude_namespaces.iter().map(|name| NamespaceRule::exclude(name)));
        for pattern in &self.include_namespace_patterns {
            rules.push(NamespaceRule::include_pattern(pattern)?);
        }
        for pattern in &self.exclude_namespace_patterns {
            rules.push(NamespaceRule::exclude_pattern(pattern)?);
        }
        Ok(NamespaceFilter::compose(rules))
    }
}

/// Defaults: `.feature` files, no roots, no namespace rules.
pub fn default_config() -> DiscoveryConfig {
    DiscoveryConfig {
        schema_version: CONFIG_SCHEMA_VERSION,
        feature_extension: default_extension(),
        resolution_roots: Vec::new(),
        include_namespaces: Vec::new(),
        exclude_namespaces: Vec::new(),
        include_namespace_patterns: Vec::new(),
        exclude_namespace_patterns: Vec::new(),
        suite_marker: default_suite_marker(),
    }
}

/// Render a pretty JSON config stub.
pub fn config_stub() -> String {
    let config = default_config();
    serde_json::to_string_pretty(&config).expect("serialize config stub")
}

/// Load and validate a discovery config from a JSON file.
pub fn load_config(path: &Path) -> Result<DiscoveryConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: DiscoveryConfig =
        serde_json::from_slice(&bytes).context("parse discovery config JSON")?;
    validate_config(&config)?;
    Ok(config)
}

/// Persist a config as pretty JSON, creating parent directories.
pub fn write_config(path: &Path, config: &DiscoveryConfig) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(config).context("serialize discovery config")?;
    fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Reject configs the resolver cannot use.
pub fn validate_config(config: &DiscoveryConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported discovery config schema_version {}",
            config.schema_version
        ));
    }
    let extension = config.feature_extension.as_str();
    if !extension.starts_with('.') || extension.len() < 2 || extension.contains('/') {
        return Err(anyhow!(
            "feature_extension must look like \".feature\" (got {extension:?})"
        ));
    }
    if config.suite_marker.trim().is_empty() {
        return Err(anyhow!("suite_marker must be non-empty"));
    }
    for name in config
        .include_namespaces
        .iter()
        .chain(config.exclude_namespaces.iter())
    {
        if name.trim().is_empty() || name.contains('/') {
            return Err(anyhow!(
                "namespace rules must be dotted names (got {name:?})"
            ));
        }
    }
    config
        .namespace_filter()
        .context("compile namespace patterns")?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
