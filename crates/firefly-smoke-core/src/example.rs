// crates/firefly-smoke-core/src/example.rs
// ============================================================================
// Module: Example Discovery
// Description: Enumerates example application directories of an SDK checkout.
// Purpose: Provide the deterministic list of examples the harness exercises.
// Dependencies: thiserror, std
// ============================================================================

//! ## Overview
//! Every immediate subdirectory of `<sdk_root>/_examples` is one independently
//! buildable example. [`ExampleCatalog::discover`] enumerates them once; the
//! resulting catalog is immutable for the rest of the run.
//!
//! Invariants:
//! - Examples are sorted by directory name.
//! - Plain files and dot-prefixed entries are never examples.
//! - An empty catalog is an error, never a silently passing suite.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Name of the examples directory under the SDK root.
pub const DEFAULT_EXAMPLES_DIR: &str = "_examples";

/// Name of the example exercised by the triangle check.
pub const TRIANGLE_EXAMPLE: &str = "triangle";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while discovering or selecting examples.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The examples root could not be read.
    #[error("examples root {path} is not readable: {message}")]
    Unreadable {
        /// Examples root path.
        path: PathBuf,
        /// Underlying I/O error text.
        message: String,
    },
    /// The examples root exists but holds no example directories.
    #[error("examples root {0} contains no example directories")]
    Empty(PathBuf),
    /// A requested example does not exist in the catalog.
    #[error("unknown example `{0}`")]
    UnknownExample(String),
    /// An example directory name is not valid UTF-8.
    #[error("example directory name is not valid UTF-8: {0}")]
    NonUtf8Name(PathBuf),
}

// ============================================================================
// SECTION: Example
// ============================================================================

/// One buildable example application directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Example {
    /// Directory name, used as the example's display name.
    name: String,
    /// Absolute or root-relative directory path.
    path: PathBuf,
}

impl Example {
    /// Wraps an explicit example directory.
    ///
    /// The name is the final path component, or the whole path when it has none.
    #[must_use]
    pub fn from_dir(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        Self {
            name,
            path,
        }
    }

    /// Returns the example's directory name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the example's directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Sorted, immutable set of examples found under one examples root.
#[derive(Debug, Clone)]
pub struct ExampleCatalog {
    /// Directory the examples were discovered in.
    root: PathBuf,
    /// Examples sorted by name.
    examples: Vec<Example>,
}

impl ExampleCatalog {
    /// Discovers examples under `<sdk_root>/_examples`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] when the root is unreadable or empty.
    pub fn discover(sdk_root: &Path) -> Result<Self, DiscoveryError> {
        Self::discover_in(sdk_root, DEFAULT_EXAMPLES_DIR)
    }

    /// Discovers examples under `<sdk_root>/<examples_dir>`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] when the root is unreadable or empty.
    pub fn discover_in(sdk_root: &Path, examples_dir: &str) -> Result<Self, DiscoveryError> {
        let root = sdk_root.join(examples_dir);
        let unreadable = |err: std::io::Error| DiscoveryError::Unreadable {
            path: root.clone(),
            message: err.to_string(),
        };
        let mut examples = Vec::new();
        for entry in fs::read_dir(&root).map_err(unreadable)? {
            let entry = entry.map_err(unreadable)?;
            let path = entry.path();
            // Symlinked example directories count; dangling links do not.
            let is_dir = match fs::metadata(&path) {
                Ok(meta) => meta.is_dir(),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => false,
                Err(err) => return Err(unreadable(err)),
            };
            if !is_dir {
                continue;
            }
            let name =
                entry.file_name().into_string().map_err(|_| DiscoveryError::NonUtf8Name(path.clone()))?;
            if name.starts_with('.') {
                continue;
            }
            examples.push(Example {
                name,
                path,
            });
        }
        if examples.is_empty() {
            return Err(DiscoveryError::Empty(root));
        }
        examples.sort();
        tracing::debug!(root = %root.display(), count = examples.len(), "discovered examples");
        Ok(Self {
            root,
            examples,
        })
    }

    /// Returns the examples root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns all examples in name order.
    #[must_use]
    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    /// Returns the number of examples.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.examples.len()
    }

    /// Returns true when the catalog holds no examples.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Looks up one example by directory name.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::UnknownExample`] when no example has that name.
    pub fn get(&self, name: &str) -> Result<&Example, DiscoveryError> {
        self.examples
            .binary_search_by(|example| example.name.as_str().cmp(name))
            .map(|index| &self.examples[index])
            .map_err(|_| DiscoveryError::UnknownExample(name.to_string()))
    }

    /// Selects examples by name, preserving catalog order and dropping duplicates.
    ///
    /// An empty selection returns every example.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::UnknownExample`] for the first unknown name.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Example>, DiscoveryError> {
        if names.is_empty() {
            return Ok(self.examples.clone());
        }
        for name in names {
            self.get(name.as_ref())?;
        }
        Ok(self
            .examples
            .iter()
            .filter(|example| names.iter().any(|name| name.as_ref() == example.name))
            .cloned()
            .collect())
    }
}
