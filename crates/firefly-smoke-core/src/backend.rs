// crates/firefly-smoke-core/src/backend.rs
// ============================================================================
// Module: Smoke Backend Interfaces
// Description: Build client, application, and backend traits for the harness.
// Purpose: Keep the build pipeline and app runtime behind explicit seams.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The harness never knows how an example is compiled or how an app runs. It
//! sees exactly three operations: [`BuildClient::build`],
//! [`Application::start`], and [`Application::update`], plus the
//! [`SmokeBackend`] factory that binds them to a work area.
//!
//! Implementations must fail closed: any fatal condition is returned as an
//! error and never swallowed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

use crate::app_id::AppId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// VFS directory holding installed ROMs.
pub const ROMS_DIR: &str = "roms";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Build client errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The build tool could not be started.
    #[error("build tool could not be started: {0}")]
    Spawn(String),
    /// The build ran and reported failure.
    #[error("build failed ({status}): {detail}")]
    Failed {
        /// Exit status description.
        status: String,
        /// Tail of the tool's diagnostics.
        detail: String,
    },
    /// The client was asked to build twice.
    #[error("build client already used for {0}")]
    AlreadyBuilt(PathBuf),
    /// Any other build backend failure.
    #[error("build backend error: {0}")]
    Backend(String),
}

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// No artifact for the requested app exists in the VFS.
    #[error("no built artifact for {id} at {path}")]
    ArtifactMissing {
        /// Requested app id.
        id: AppId,
        /// ROM directory that was expected.
        path: PathBuf,
    },
    /// The runtime could not be started.
    #[error("runtime could not be started: {0}")]
    Spawn(String),
    /// The app reported a fatal error.
    #[error("app failed: {0}")]
    Fatal(String),
    /// The runtime broke the driver protocol.
    #[error("runtime protocol error: {0}")]
    Protocol(String),
    /// The runtime exited while a request was pending.
    #[error("runtime exited unexpectedly: {0}")]
    Exited(String),
    /// A lifecycle call arrived out of order.
    #[error("lifecycle violation: {0}")]
    Lifecycle(&'static str),
}

// ============================================================================
// SECTION: Traits
// ============================================================================

/// Handle bound to one work area that performs a single build.
pub trait BuildClient {
    /// Builds the example at `example_dir` into the bound VFS.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] when the build fails for any reason.
    fn build(&mut self, example_dir: &Path) -> Result<(), BuildError>;
}

/// Running instance of a built application.
pub trait Application {
    /// Performs one-time initialization.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] on a fatal initialization error.
    fn start(&mut self) -> Result<(), AppError>;

    /// Advances application state by one tick.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] on a fatal runtime error.
    fn update(&mut self) -> Result<(), AppError>;
}

/// Factory binding build clients and applications to a work area.
pub trait SmokeBackend {
    /// Creates a build client whose artifacts land in `vfs`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] when the client cannot be prepared.
    fn build_client(&self, vfs: &Path, logs: &Path) -> Result<Box<dyn BuildClient>, BuildError>;

    /// Constructs the application `id` from artifacts in `vfs`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ArtifactMissing`] when `vfs` holds no artifact for `id`.
    fn launch(&self, vfs: &Path, logs: &Path, id: &AppId) -> Result<Box<dyn Application>, AppError>;
}

// ============================================================================
// SECTION: Artifact Layout
// ============================================================================

/// Returns the ROM directory a build of `id` installs into.
#[must_use]
pub fn rom_dir(vfs: &Path, id: &AppId) -> PathBuf {
    vfs.join(ROMS_DIR).join(id.author()).join(id.app())
}

/// Fails with [`AppError::ArtifactMissing`] unless `vfs` holds a ROM for `id`.
///
/// # Errors
///
/// Returns [`AppError::ArtifactMissing`] when the ROM directory is absent.
pub fn require_artifact(vfs: &Path, id: &AppId) -> Result<PathBuf, AppError> {
    let path = rom_dir(vfs, id);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(AppError::ArtifactMissing {
            id: id.clone(),
            path,
        })
    }
}
