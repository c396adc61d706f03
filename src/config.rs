//! Project configuration loaded from TOML
//!
//! A config names where partial files live, how their names are derived,
//! any inline partials, and render settings:
//!
//! ```toml
//! root = "templates"
//! patterns = ["partials/**/*.hbs"]
//! naming = "base"
//!
//! [inline]
//! footer = "-- {{site}}"
//!
//! [render]
//! escape_html = true
//! max_depth = 32
//! strict = false
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::partial::{DiskFs, Naming, PartialError, PartialRegistry};
use crate::renderer::RenderConfig;

/// Errors that can occur when loading a config or applying it to a registry
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to register partials: {0}")]
    Partial(#[from] PartialError),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StacheConfig {
    /// Directory partial patterns are matched against
    pub root: PathBuf,
    /// Glob patterns selecting partial files under `root`
    pub patterns: Vec<String>,
    /// How file paths become partial names
    pub naming: Naming,
    /// Partials given directly as source
    pub inline: BTreeMap<String, String>,
    pub render: RenderConfig,
}

impl Default for StacheConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            patterns: Vec::new(),
            naming: Naming::default(),
            inline: BTreeMap::new(),
            render: RenderConfig::default(),
        }
    }
}

impl StacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from a TOML file
    ///
    /// A relative `root` is resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_str(&content)?;
        if config.root.is_relative() {
            if let Some(dir) = path.parent() {
                config.root = dir.join(&config.root);
            }
        }
        Ok(config)
    }

    /// Load config from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    pub fn with_naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_inline(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.inline.insert(name.into(), source.into());
        self
    }

    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    /// Create a registry using this config's naming and load it
    pub fn build_registry(&self) -> Result<PartialRegistry, ConfigError> {
        let mut registry = PartialRegistry::new();
        registry.set_namer(self.naming);
        self.load_into(&registry)?;
        Ok(registry)
    }

    /// Register inline partials, then every file matching `patterns`
    ///
    /// Files are named with this config's naming, regardless of the
    /// registry's own namer.
    pub fn load_into(&self, registry: &PartialRegistry) -> Result<(), ConfigError> {
        registry.register_partials(&self.inline)?;
        if !self.patterns.is_empty() {
            let fs = DiskFs::new(&self.root);
            registry.register_partial_fs_with_namer(&fs, &self.naming, &self.patterns)?;
        }
        tracing::debug!(
            root = %self.root.display(),
            partials = registry.len(),
            "loaded partials from config"
        );
        Ok(())
    }
}
