// crates/firefly-smoke-core/src/work_area.rs
// ============================================================================
// Module: Isolated Work Areas
// Description: Fresh per-check scratch directories used as the build VFS root.
// Purpose: Guarantee no state leaks between smoke checks.
// Dependencies: tempfile, thiserror
// ============================================================================

//! ## Overview
//! A [`WorkArea`] is created for exactly one smoke check. Its `vfs/` directory
//! is empty at creation and becomes the virtual filesystem root handed to the
//! build; `logs/` receives collaborator output. The whole area is removed when
//! the value drops unless it was created with `keep` set.
//!
//! Invariants:
//! - Two work areas never share a directory.
//! - `vfs/` is empty when the area is handed out.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use tempfile::TempDir;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix of every work area directory.
const WORK_AREA_PREFIX: &str = "firefly-smoke-";
/// Subdirectory used as the build VFS root.
const VFS_DIR: &str = "vfs";
/// Subdirectory for collaborator logs.
const LOGS_DIR: &str = "logs";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while preparing a work area.
#[derive(Debug, Error)]
pub enum WorkAreaError {
    /// Creating a directory failed.
    #[error("work area setup failed at {path}: {message}")]
    Create {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error text.
        message: String,
    },
}

// ============================================================================
// SECTION: Options
// ============================================================================

/// Where work areas are created and whether they outlive their check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkAreaOptions {
    /// Parent directory; the system temp dir when `None`.
    pub parent: Option<PathBuf>,
    /// Keep the directory on disk after the check finishes.
    pub keep: bool,
}

// ============================================================================
// SECTION: Work Area
// ============================================================================

/// Fresh scratch directory owned by one smoke check.
#[derive(Debug)]
pub struct WorkArea {
    /// Owning temp directory handle.
    dir: TempDir,
    /// Build VFS root inside `dir`.
    vfs: PathBuf,
    /// Log directory inside `dir`.
    logs: PathBuf,
    /// Whether the directory survives drop.
    kept: bool,
}

impl WorkArea {
    /// Creates a work area in the system temp directory.
    ///
    /// # Errors
    ///
    /// Returns [`WorkAreaError`] when the directories cannot be created.
    pub fn new(label: &str) -> Result<Self, WorkAreaError> {
        Self::create(label, &WorkAreaOptions::default())
    }

    /// Creates a work area according to `options`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkAreaError`] when the directories cannot be created.
    pub fn create(label: &str, options: &WorkAreaOptions) -> Result<Self, WorkAreaError> {
        let prefix = format!("{WORK_AREA_PREFIX}{}-", sanitize_label(label));
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix).keep(options.keep);
        let dir = match &options.parent {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|err| WorkAreaError::Create {
                    path: parent.clone(),
                    message: err.to_string(),
                })?;
                builder.tempdir_in(parent)
            }
            None => builder.tempdir(),
        }
        .map_err(|err| WorkAreaError::Create {
            path: options.parent.clone().unwrap_or_else(std::env::temp_dir),
            message: err.to_string(),
        })?;
        let vfs = dir.path().join(VFS_DIR);
        let logs = dir.path().join(LOGS_DIR);
        for path in [&vfs, &logs] {
            fs::create_dir(path).map_err(|err| WorkAreaError::Create {
                path: path.clone(),
                message: err.to_string(),
            })?;
        }
        Ok(Self {
            dir,
            vfs,
            logs,
            kept: options.keep,
        })
    }

    /// Returns the area's root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Returns the build VFS root.
    #[must_use]
    pub fn vfs(&self) -> &Path {
        &self.vfs
    }

    /// Returns the log directory.
    #[must_use]
    pub fn logs(&self) -> &Path {
        &self.logs
    }

    /// Returns true when the area survives drop.
    #[must_use]
    pub const fn is_kept(&self) -> bool {
        self.kept
    }
}

/// Keeps only filename-safe characters of a label.
fn sanitize_label(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .take(48)
        .collect();
    if cleaned.is_empty() { "case".to_string() } else { cleaned }
}
