//! Syntax tree for template source

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Valid identifier (alphanumeric, underscore and dash, starts with letter/_)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dotted lookup path into the render context
///
/// An empty path refers to the current context (`this`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path {
    pub segments: Vec<Identifier>,
}

impl Path {
    pub fn new(segments: Vec<Identifier>) -> Self {
        Self { segments }
    }

    /// The current context
    pub fn this() -> Self {
        Self::default()
    }

    pub fn is_this(&self) -> bool {
        self.segments.is_empty()
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_this() {
            return write!(f, "this");
        }
        let joined = self
            .segments
            .iter()
            .map(Identifier::as_str)
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{}", joined)
    }
}

/// A single piece of a template
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text copied to the output
    Text(String),
    /// `{{path}}` (escaped) or `{{{path}}}` (raw)
    Variable { path: Path, escaped: bool },
    /// `{{> name}}` or `{{> name path}}`
    Partial {
        name: Spanned<Identifier>,
        context: Option<Path>,
    },
    /// `{{! ... }}` or `{{!-- ... --}}`
    Comment(String),
}
