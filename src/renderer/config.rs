//! Configuration for template rendering

use serde::Deserialize;

/// Configuration options for rendering
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Whether `{{value}}` escapes HTML special characters
    pub escape_html: bool,

    /// Maximum depth of nested partial calls
    pub max_depth: usize,

    /// Whether a variable without a value is an error
    pub strict: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            escape_html: true,
            max_depth: 32,
            strict: false,
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether escaped variables are HTML-escaped
    pub fn with_escape_html(mut self, escape: bool) -> Self {
        self.escape_html = escape;
        self
    }

    /// Set the maximum partial nesting depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set whether missing variables are errors
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
