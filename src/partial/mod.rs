//! Named partials: registration, lookup and lazy compilation
//!
//! Partials are reusable template fragments that any template can call by
//! name with `{{> name}}`. They are registered once, from source text, from
//! an already compiled [`Template`](crate::Template), or by scanning a
//! [`FileSystem`] with glob patterns. Source is only compiled when a partial
//! is first resolved.
//!
//! # Example
//!
//! ```rust
//! use stache::partial::{MemoryFs, PartialRegistry};
//!
//! let fs = MemoryFs::new()
//!     .with_file("templates/header.hbs", "<h1>{{title}}</h1>")
//!     .with_file("templates/nav/links.hbs", "<nav></nav>");
//!
//! let registry = PartialRegistry::new();
//! registry.register_partial_fs(&fs, ["templates/**/*.hbs"]).unwrap();
//!
//! assert!(registry.contains("header"));
//! assert!(registry.contains("links"));
//! ```

mod fs;
mod naming;
mod registry;

pub use fs::{glob_files, DiskFs, FileSystem, FsError, MemoryFs};
pub use naming::{
    base_name, strip_extension, BaseNameNamer, FileNameNamer, Namer, Naming, RelativePathNamer,
};
pub use registry::{Partial, PartialError, PartialRegistry};
