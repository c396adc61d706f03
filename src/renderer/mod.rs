//! Renderer for compiled templates
//!
//! Walks a [`Template`](crate::Template) against JSON data, resolving
//! `{{> name}}` calls through a [`PartialLookup`].

pub mod config;
mod output;

use std::sync::Arc;

use thiserror::Error;

use crate::partial::{Partial, PartialRegistry};
use crate::template::CompileError;

pub use config::RenderConfig;
pub use output::render_with;

/// Errors that can occur while rendering
#[derive(Debug, Error)]
pub enum RenderError {
    /// Template calls a partial nobody registered
    #[error("partial not found: {name}")]
    MissingPartial { name: String },

    /// A called partial failed to compile
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Partials nested deeper than the configured limit
    #[error("partial {name} exceeds maximum nesting depth of {max_depth}")]
    DepthExceeded { name: String, max_depth: usize },

    /// Variable has no value (strict mode only)
    #[error("missing value for {path}")]
    MissingVariable { path: String },
}

/// Source of partials during rendering
pub trait PartialLookup {
    fn find_partial(&self, name: &str) -> Option<Arc<Partial>>;
}

impl PartialLookup for PartialRegistry {
    fn find_partial(&self, name: &str) -> Option<Arc<Partial>> {
        PartialRegistry::find_partial(self, name)
    }
}
