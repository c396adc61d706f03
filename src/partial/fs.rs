//! Filesystem abstraction used to discover and read partial files
//!
//! Paths are always `/`-separated and relative to the filesystem root.
//! Glob patterns follow shell conventions: `*` and `?` stay within one path
//! segment, `**` crosses segments.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use ignore::WalkBuilder;
use thiserror::Error;

/// Errors that can occur while expanding glob patterns
#[derive(Debug, Error)]
pub enum FsError {
    /// Malformed glob pattern
    #[error("invalid glob pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// Pattern is valid but selects nothing
    #[error("pattern matches no files: {pattern}")]
    NoMatch { pattern: String },

    /// Error while walking a directory tree
    #[error("error walking {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: ignore::Error,
    },
}

/// Read-only view of a tree of files
pub trait FileSystem {
    /// Full contents of the file at `path`
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>>;

    /// Paths matching `pattern`, sorted
    fn glob(&self, pattern: &str) -> Result<Vec<String>, FsError>;
}

/// Expand every pattern, in order, into one list of paths
///
/// A pattern that matches nothing is an error; duplicates across patterns
/// are kept.
pub fn glob_files<F, I>(fs: &F, patterns: I) -> Result<Vec<String>, FsError>
where
    F: FileSystem + ?Sized,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut paths = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let matched = fs.glob(pattern)?;
        if matched.is_empty() {
            return Err(FsError::NoMatch {
                pattern: pattern.to_string(),
            });
        }
        paths.extend(matched);
    }
    Ok(paths)
}

fn compile_glob(pattern: &str) -> Result<GlobMatcher, FsError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| FsError::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// In-memory filesystem, for embedded bundles and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, builder style
    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileSystem for MemoryFs {
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("file does not exist: {}", path))
        })
    }

    fn glob(&self, pattern: &str) -> Result<Vec<String>, FsError> {
        let matcher = compile_glob(pattern)?;
        Ok(self
            .files
            .keys()
            .filter(|path| matcher.is_match(path.as_str()))
            .cloned()
            .collect())
    }
}

/// Filesystem rooted at a directory on disk
#[derive(Debug, Clone)]
pub struct DiskFs {
    root: PathBuf,
}

impl DiskFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileSystem for DiskFs {
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.root.join(path))
    }

    fn glob(&self, pattern: &str) -> Result<Vec<String>, FsError> {
        let matcher = compile_glob(pattern)?;
        let mut matches = Vec::new();

        for entry in WalkBuilder::new(&self.root).standard_filters(false).build() {
            let entry = entry.map_err(|source| FsError::Walk {
                root: self.root.clone(),
                source,
            })?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if matcher.is_match(relative.as_str()) {
                matches.push(relative);
            }
        }

        matches.sort();
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryFs {
        MemoryFs::new()
            .with_file("templates/a.tmpl", "A")
            .with_file("templates/b/c.tmpl", "C")
            .with_file("templates/b/notes.txt", "skip")
    }

    #[test]
    fn test_memory_read() {
        let fs = sample();
        assert_eq!(fs.read_file("templates/a.tmpl").unwrap(), b"A");
        let err = fs.read_file("missing.tmpl").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_star_stays_in_segment() {
        let fs = sample();
        assert_eq!(fs.glob("templates/*.tmpl").unwrap(), vec!["templates/a.tmpl"]);
    }

    #[test]
    fn test_double_star_crosses_segments() {
        let fs = sample();
        assert_eq!(
            fs.glob("templates/**/*.tmpl").unwrap(),
            vec!["templates/a.tmpl", "templates/b/c.tmpl"]
        );
    }

    #[test]
    fn test_glob_files_keeps_pattern_order() {
        let fs = sample();
        let paths = glob_files(&fs, ["templates/b/*.tmpl", "templates/*.tmpl"]).unwrap();
        assert_eq!(paths, vec!["templates/b/c.tmpl", "templates/a.tmpl"]);
    }

    #[test]
    fn test_glob_files_no_match() {
        let fs = sample();
        let err = glob_files(&fs, ["templates/*.tmpl", "*.hbs"]).unwrap_err();
        assert!(matches!(err, FsError::NoMatch { ref pattern } if pattern == "*.hbs"));
    }

    #[test]
    fn test_invalid_pattern() {
        let fs = sample();
        let err = fs.glob("templates/[a.tmpl").unwrap_err();
        assert!(matches!(err, FsError::Pattern { .. }));
    }
}
