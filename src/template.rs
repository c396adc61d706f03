//! Compiled templates and the compiler seam

use serde_json::Value;
use thiserror::Error;

use crate::parser::{Node, Spanned};
use crate::renderer::{render_with, RenderConfig, RenderError};
use crate::ParseError;

/// The executable form of template source
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    nodes: Vec<Spanned<Node>>,
}

impl Template {
    pub fn new(nodes: Vec<Spanned<Node>>) -> Self {
        Self { nodes }
    }

    /// Parse template source
    pub fn parse(source: &str) -> Result<Self, Vec<ParseError>> {
        crate::parser::parse(source)
    }

    pub fn nodes(&self) -> &[Spanned<Node>] {
        &self.nodes
    }

    /// Names of partials this template calls, in order of appearance
    pub fn partial_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter_map(|n| match &n.node {
            Node::Partial { name, .. } => Some(name.node.as_str()),
            _ => None,
        })
    }

    /// Render against the process-wide registry with default settings
    pub fn render(&self, data: &Value) -> Result<String, RenderError> {
        render_with(
            self,
            data,
            crate::partial::PartialRegistry::global(),
            &RenderConfig::default(),
        )
    }
}

/// Turns template source into a [`Template`]
///
/// Implementations must be pure: the same source always yields an
/// equivalent template.
pub trait Compiler: Send + Sync {
    fn compile(&self, source: &str) -> Result<Template, Vec<ParseError>>;
}

impl<F> Compiler for F
where
    F: Fn(&str) -> Result<Template, Vec<ParseError>> + Send + Sync,
{
    fn compile(&self, source: &str) -> Result<Template, Vec<ParseError>> {
        self(source)
    }
}

/// Compiler backed by this crate's parser
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCompiler;

impl Compiler for DefaultCompiler {
    fn compile(&self, source: &str) -> Result<Template, Vec<ParseError>> {
        crate::parser::parse(source)
    }
}

/// A partial's source failed to compile
#[derive(Debug, Clone, Error)]
pub enum CompileError {
    #[error("partial {name} failed to compile: {}", format_parse_errors(.errors))]
    Parse {
        name: String,
        errors: Vec<ParseError>,
    },
}

impl CompileError {
    pub fn errors(&self) -> &[ParseError] {
        match self {
            CompileError::Parse { errors, .. } => errors,
        }
    }
}

pub(crate) fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
