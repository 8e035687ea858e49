// crates/firefly-smoke-core/src/manifest.rs
// ============================================================================
// Module: Example Manifests
// Description: Reads `firefly.toml` ids and resolves the app launched per example.
// Purpose: Decide which built artifact a smoke check starts.
// Dependencies: serde, toml, thiserror
// ============================================================================

//! ## Overview
//! An example may carry a `firefly.toml` naming the author and app ids its
//! build produces. [`AppIdSource`] decides whether the harness trusts that
//! manifest or launches a fixed id for every example.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::app_id::AppId;
use crate::app_id::AppIdError;
use crate::example::Example;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Manifest filename inside an example directory.
pub const MANIFEST_FILE: &str = "firefly.toml";

/// Maximum manifest size in bytes.
const MAX_MANIFEST_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while reading an example manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest exists but could not be read.
    #[error("manifest io error: {0}")]
    Io(String),
    /// The manifest is not valid TOML or misses required keys.
    #[error("manifest parse error: {0}")]
    Parse(String),
    /// The manifest is oversized or not UTF-8.
    #[error("invalid manifest: {0}")]
    Invalid(String),
    /// The manifest ids do not form a valid app id.
    #[error(transparent)]
    AppId(#[from] AppIdError),
}

// ============================================================================
// SECTION: Manifest
// ============================================================================

/// Subset of `firefly.toml` the harness needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExampleManifest {
    /// Author namespace.
    pub author_id: String,
    /// Application name.
    pub app_id: String,
}

impl ExampleManifest {
    /// Reads the manifest of an example directory, if it has one.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] when the file exists but is unreadable or invalid.
    pub fn read(example_dir: &Path) -> Result<Option<Self>, ManifestError> {
        let path = example_dir.join(MANIFEST_FILE);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(ManifestError::Io(err.to_string())),
        };
        if bytes.len() > MAX_MANIFEST_BYTES {
            return Err(ManifestError::Invalid("manifest exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ManifestError::Invalid("manifest must be utf-8".to_string()))?;
        let manifest = toml::from_str(content).map_err(|err| ManifestError::Parse(err.to_string()))?;
        Ok(Some(manifest))
    }

    /// Returns the validated app id named by this manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::AppId`] when the ids are malformed.
    pub fn app_id(&self) -> Result<AppId, ManifestError> {
        Ok(AppId::new(&self.author_id, &self.app_id)?)
    }
}

// ============================================================================
// SECTION: App Id Source
// ============================================================================

/// Strategy for choosing the app id launched after an example builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AppIdSource {
    /// Launch the same id after every build.
    Fixed {
        /// Id to launch.
        id: AppId,
    },
    /// Launch the id named by the example's manifest, or `fallback` without one.
    Manifest {
        /// Id used when the example has no manifest.
        fallback: AppId,
    },
}

impl Default for AppIdSource {
    fn default() -> Self {
        Self::Manifest {
            fallback: AppId::default_demo(),
        }
    }
}

impl AppIdSource {
    /// Resolves the id to launch for `example`.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] when a present manifest cannot be used.
    pub fn resolve(&self, example: &Example) -> Result<AppId, ManifestError> {
        match self {
            Self::Fixed {
                id,
            } => Ok(id.clone()),
            Self::Manifest {
                fallback,
            } => match ExampleManifest::read(example.path())? {
                Some(manifest) => manifest.app_id(),
                None => Ok(fallback.clone()),
            },
        }
    }
}
