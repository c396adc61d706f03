//! Naming strategies: file path -> partial name

use serde::Deserialize;

/// Derives the name a file is registered under
pub trait Namer: Send + Sync {
    fn name(&self, path: &str) -> String;
}

impl<F> Namer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn name(&self, path: &str) -> String {
        self(path)
    }
}

/// Base name with the final extension stripped
///
/// `templates/b/c.tmpl` => `c`, `a.b.tmpl` => `a.b`
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseNameNamer;

impl Namer for BaseNameNamer {
    fn name(&self, path: &str) -> String {
        strip_extension(base_name(path)).to_string()
    }
}

/// Whole path with the final extension stripped
///
/// Keeps directories, so `a/x.hbs` and `b/x.hbs` don't collide.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelativePathNamer;

impl Namer for RelativePathNamer {
    fn name(&self, path: &str) -> String {
        let base = base_name(path);
        let stem = strip_extension(base);
        let dir_len = path.trim_end_matches('/').len() - base.len();
        format!("{}{}", &path[..dir_len], stem)
    }
}

/// Base name including its extension
#[derive(Debug, Clone, Copy, Default)]
pub struct FileNameNamer;

impl Namer for FileNameNamer {
    fn name(&self, path: &str) -> String {
        base_name(path).to_string()
    }
}

/// Built-in strategy selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Naming {
    /// [`BaseNameNamer`]
    #[default]
    Base,
    /// [`RelativePathNamer`]
    Path,
    /// [`FileNameNamer`]
    File,
}

impl Namer for Naming {
    fn name(&self, path: &str) -> String {
        match self {
            Naming::Base => BaseNameNamer.name(path),
            Naming::Path => RelativePathNamer.name(path),
            Naming::File => FileNameNamer.name(path),
        }
    }
}

/// Last `/`-separated segment, ignoring trailing separators
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Everything before the final `.`; unchanged when there is none
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name,
    }
}
