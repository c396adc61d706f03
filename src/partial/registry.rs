//! Partial registry for storing and resolving named partials

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;
use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};
use parking_lot::RwLock;
use thiserror::Error;

use super::fs::{glob_files, FileSystem, FsError};
use super::naming::{BaseNameNamer, Namer};
use crate::template::{CompileError, Compiler, DefaultCompiler, Template};

/// Errors that can occur during partial registration
#[derive(Debug, Error)]
pub enum PartialError {
    /// Name already taken. Double registration is a caller bug.
    #[error("partial already registered: {name}")]
    Duplicate { name: String },

    /// Error reading a partial file
    #[error("error reading partial file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Error expanding glob patterns
    #[error(transparent)]
    Glob(#[from] FsError),
}

/// A named template fragment
///
/// Source is compiled on the first call to [`Partial::template`]; the result
/// is shared by every later caller.
pub struct Partial {
    name: String,
    source: String,
    compiled: OnceCell<Arc<Template>>,
    /// `None` for partials registered pre-compiled
    compiler: Option<Arc<dyn Compiler>>,
}

impl Partial {
    fn from_source(name: String, source: String, compiler: Arc<dyn Compiler>) -> Self {
        Self {
            name,
            source,
            compiled: OnceCell::new(),
            compiler: Some(compiler),
        }
    }

    fn from_template(name: String, template: Arc<Template>) -> Self {
        Self {
            name,
            source: String::new(),
            compiled: OnceCell::with_value(template),
            compiler: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw source; empty for partials registered pre-compiled
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.get().is_some()
    }

    /// The compiled template, compiling on first use
    ///
    /// Concurrent first callers block until one compile finishes, so a
    /// successful compile happens at most once. Failures are not cached: the
    /// next call compiles again.
    pub fn template(&self) -> Result<Arc<Template>, CompileError> {
        self.compiled
            .get_or_try_init(|| {
                tracing::debug!(partial = %self.name, "compiling partial");
                // Pre-compiled partials start with a filled cell and never get here
                let compiler = self.compiler.as_deref().unwrap_or(&DefaultCompiler);
                compiler
                    .compile(&self.source)
                    .map(Arc::new)
                    .map_err(|errors| {
                        tracing::warn!(
                            partial = %self.name,
                            errors = errors.len(),
                            "partial failed to compile"
                        );
                        CompileError::Parse {
                            name: self.name.clone(),
                            errors,
                        }
                    })
            })
            .cloned()
    }
}

impl fmt::Debug for Partial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partial")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("compiled", &self.is_compiled())
            .finish()
    }
}

static GLOBAL: Lazy<PartialRegistry> = Lazy::new(PartialRegistry::new);

/// Thread-safe map from partial name to [`Partial`]
///
/// Lookups share a read lock; every mutation takes the write lock.
pub struct PartialRegistry {
    partials: RwLock<HashMap<String, Arc<Partial>>>,
    compiler: Arc<dyn Compiler>,
    namer: Arc<dyn Namer>,
}

impl Default for PartialRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PartialRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialRegistry")
            .field("partials", &self.names())
            .finish_non_exhaustive()
    }
}

impl PartialRegistry {
    /// Create a new empty registry using the default compiler and namer
    pub fn new() -> Self {
        Self {
            partials: RwLock::new(HashMap::new()),
            compiler: Arc::new(DefaultCompiler),
            namer: Arc::new(BaseNameNamer),
        }
    }

    /// Process-wide registry, created empty on first access
    pub fn global() -> &'static PartialRegistry {
        &GLOBAL
    }

    /// Use `compiler` for partials registered from now on
    pub fn with_compiler(mut self, compiler: impl Compiler + 'static) -> Self {
        self.compiler = Arc::new(compiler);
        self
    }

    /// Use `namer` for [`register_partial_fs`](Self::register_partial_fs)
    pub fn with_namer(mut self, namer: impl Namer + 'static) -> Self {
        self.namer = Arc::new(namer);
        self
    }

    /// Replace the naming strategy
    ///
    /// Requires exclusive access, so it cannot race a filesystem scan.
    pub fn set_namer(&mut self, namer: impl Namer + 'static) {
        self.namer = Arc::new(namer);
    }

    pub fn namer(&self) -> &dyn Namer {
        self.namer.as_ref()
    }

    fn insert(&self, partial: Partial) -> Result<(), PartialError> {
        let mut partials = self.partials.write();
        match partials.entry(partial.name.clone()) {
            Entry::Occupied(slot) => Err(PartialError::Duplicate {
                name: slot.key().clone(),
            }),
            Entry::Vacant(slot) => {
                tracing::debug!(partial = %slot.key(), "registered partial");
                slot.insert(Arc::new(partial));
                Ok(())
            }
        }
    }

    /// Register a partial from source; compilation is deferred to first use
    pub fn register_partial(
        &self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<(), PartialError> {
        self.insert(Partial::from_source(
            name.into(),
            source.into(),
            self.compiler.clone(),
        ))
    }

    /// Register several partials
    ///
    /// Stops at the first duplicate. Entries registered before it stay
    /// registered.
    pub fn register_partials<I, K, V>(&self, entries: I) -> Result<(), PartialError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, source) in entries {
            self.register_partial(name, source)?;
        }
        Ok(())
    }

    /// Register several partials, all or nothing
    ///
    /// Fails without registering anything if any name is already taken or
    /// appears twice in `entries`.
    pub fn register_partials_atomic<I, K, V>(&self, entries: I) -> Result<(), PartialError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let batch: Vec<Partial> = entries
            .into_iter()
            .map(|(name, source)| {
                Partial::from_source(name.into(), source.into(), self.compiler.clone())
            })
            .collect();

        let mut partials = self.partials.write();
        let mut seen = HashSet::new();
        for partial in &batch {
            if partials.contains_key(&partial.name) || !seen.insert(partial.name.as_str()) {
                return Err(PartialError::Duplicate {
                    name: partial.name.clone(),
                });
            }
        }

        tracing::debug!(count = batch.len(), "registered partial batch");
        for partial in batch {
            partials.insert(partial.name.clone(), Arc::new(partial));
        }
        Ok(())
    }

    /// Register an already compiled template as a partial
    pub fn register_partial_template(
        &self,
        name: impl Into<String>,
        template: impl Into<Arc<Template>>,
    ) -> Result<(), PartialError> {
        self.insert(Partial::from_template(name.into(), template.into()))
    }

    /// Read `path` from `fs` and register its contents under `name`
    pub fn register_partial_with<F>(
        &self,
        fs: &F,
        path: &str,
        name: impl Into<String>,
    ) -> Result<(), PartialError>
    where
        F: FileSystem + ?Sized,
    {
        let read_error = |source| PartialError::Read {
            path: path.to_string(),
            source,
        };
        let bytes = fs.read_file(path).map_err(read_error)?;
        let source = String::from_utf8(bytes)
            .map_err(|e| read_error(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        self.register_partial(name, source)
    }

    /// Register every file matching `patterns`, named by the registry's namer
    pub fn register_partial_fs<F, I>(&self, fs: &F, patterns: I) -> Result<(), PartialError>
    where
        F: FileSystem + ?Sized,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.register_partial_fs_with_namer(fs, self.namer.as_ref(), patterns)
    }

    /// Register every file matching `patterns`, named by `namer`
    ///
    /// All patterns are expanded before anything is registered. Registration
    /// then stops at the first error; files registered before it stay
    /// registered.
    pub fn register_partial_fs_with_namer<F, N, I>(
        &self,
        fs: &F,
        namer: &N,
        patterns: I,
    ) -> Result<(), PartialError>
    where
        F: FileSystem + ?Sized,
        N: Namer + ?Sized,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let paths = glob_files(fs, patterns)?;
        tracing::debug!(files = paths.len(), "registering partials from filesystem");

        for path in &paths {
            let name = namer.name(path);
            self.register_partial_with(fs, path, name)?;
        }
        Ok(())
    }

    /// Remove a partial; does nothing if it is not registered
    ///
    /// Callers already holding the partial keep their reference.
    pub fn remove_partial(&self, name: &str) {
        if self.partials.write().remove(name).is_some() {
            tracing::debug!(partial = %name, "removed partial");
        }
    }

    /// Remove every partial in one step
    pub fn remove_all_partials(&self) {
        let previous = std::mem::take(&mut *self.partials.write());
        tracing::debug!(count = previous.len(), "removed all partials");
    }

    /// Look up a partial by name
    pub fn find_partial(&self, name: &str) -> Option<Arc<Partial>> {
        tracing::trace!(partial = %name, "looking up partial");
        self.partials.read().get(name).cloned()
    }

    /// Check if a partial exists
    pub fn contains(&self, name: &str) -> bool {
        self.partials.read().contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.partials.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.partials.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.partials.read().is_empty()
    }
}
