//! Stache - a partial registry with lazy compilation for text templates
//!
//! Partials are named template fragments registered once and called from
//! other templates with `{{> name}}`. The registry is safe to share between
//! threads and compiles each partial only when it is first used.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use stache::{render_with_registry, PartialRegistry, RenderConfig};
//!
//! let registry = PartialRegistry::new();
//! registry.register_partial("greeting", "Hello {{name}}").unwrap();
//!
//! let out = render_with_registry(
//!     "{{> greeting}}!",
//!     &json!({"name": "World"}),
//!     &registry,
//!     &RenderConfig::default(),
//! )
//! .unwrap();
//! assert_eq!(out, "Hello World!");
//! ```

pub mod config;
pub mod error;
pub mod parser;
pub mod partial;
pub mod renderer;
pub mod template;

pub use config::{ConfigError, StacheConfig};
pub use error::ParseError;
pub use parser::parse;
pub use partial::{
    DiskFs, FileSystem, MemoryFs, Namer, Naming, Partial, PartialError, PartialRegistry,
};
pub use renderer::{render_with, PartialLookup, RenderConfig, RenderError};
pub use template::{CompileError, Compiler, DefaultCompiler, Template};

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when rendering template source
#[derive(Debug, Error)]
pub enum StacheError {
    /// Error during parsing
    #[error("parse errors: {}", template::format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// Error during rendering
    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

impl From<Vec<ParseError>> for StacheError {
    fn from(errors: Vec<ParseError>) -> Self {
        StacheError::Parse(errors)
    }
}

/// Render template source against the process-wide registry
///
/// # Example
///
/// ```rust
/// use serde_json::json;
///
/// let out = stache::render("{{a}} and {{b}}", &json!({"a": 1, "b": "two"})).unwrap();
/// assert_eq!(out, "1 and two");
/// ```
pub fn render(source: &str, data: &Value) -> Result<String, StacheError> {
    render_with_registry(
        source,
        data,
        PartialRegistry::global(),
        &RenderConfig::default(),
    )
}

/// Render template source, resolving partials through `partials`
pub fn render_with_registry<L>(
    source: &str,
    data: &Value,
    partials: &L,
    config: &RenderConfig,
) -> Result<String, StacheError>
where
    L: PartialLookup + ?Sized,
{
    let template = parse(source)?;
    Ok(render_with(&template, data, partials, config)?)
}
