// crates/firefly-smoke-core/src/process/build.rs
// ============================================================================
// Module: Command Build Client
// Description: Build client that shells out to an external build tool.
// Purpose: Compile one example into a work area VFS through a CLI.
// Dependencies: crate::{backend, process::command}, tracing, std::process
// ============================================================================

//! ## Overview
//! [`CommandBuildClient`] runs the configured build template once, with
//! `{vfs}` bound to its work area and `{root}` bound to the example. Tool
//! output is captured into the work area's log directory; a non-zero exit is
//! reported with the tail of stderr.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;
use std::path::PathBuf;
use std::process::Stdio;

use crate::backend::BuildClient;
use crate::backend::BuildError;
use crate::process::command::CommandTemplate;
use crate::process::command::TemplateBindings;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Bytes of stderr quoted in a build failure.
pub const STDERR_TAIL_BYTES: u64 = 4 * 1024;
/// Build stdout log filename.
pub const BUILD_STDOUT_LOG: &str = "build.stdout.log";
/// Build stderr log filename.
pub const BUILD_STDERR_LOG: &str = "build.stderr.log";

// ============================================================================
// SECTION: Build Client
// ============================================================================

/// Build client bound to one VFS that runs an external command.
#[derive(Debug)]
pub struct CommandBuildClient {
    /// Build command template.
    template: CommandTemplate,
    /// Bound VFS root.
    vfs: PathBuf,
    /// Log directory for tool output.
    logs: PathBuf,
    /// Example built by this client, once used.
    built: Option<PathBuf>,
}

impl CommandBuildClient {
    /// Binds `template` to a VFS and log directory.
    #[must_use]
    pub fn new(template: CommandTemplate, vfs: &Path, logs: &Path) -> Self {
        Self {
            template,
            vfs: vfs.to_path_buf(),
            logs: logs.to_path_buf(),
            built: None,
        }
    }

    /// Returns the bound VFS root.
    #[must_use]
    pub fn vfs(&self) -> &Path {
        &self.vfs
    }
}

impl BuildClient for CommandBuildClient {
    fn build(&mut self, example_dir: &Path) -> Result<(), BuildError> {
        if let Some(previous) = &self.built {
            return Err(BuildError::AlreadyBuilt(previous.clone()));
        }
        self.built = Some(example_dir.to_path_buf());
        let bindings = TemplateBindings {
            vfs: Some(&self.vfs),
            root: Some(example_dir),
            id: None,
        };
        let mut command =
            self.template.command(&bindings).map_err(|err| BuildError::Backend(err.to_string()))?;
        let stdout_path = self.logs.join(BUILD_STDOUT_LOG);
        let stderr_path = self.logs.join(BUILD_STDERR_LOG);
        let stdout = File::create(&stdout_path)
            .map_err(|err| BuildError::Backend(format!("build stdout log: {err}")))?;
        let stderr = File::create(&stderr_path)
            .map_err(|err| BuildError::Backend(format!("build stderr log: {err}")))?;
        command.stdin(Stdio::null()).stdout(stdout).stderr(stderr);
        tracing::debug!(
            program = %self.template.program,
            example = %example_dir.display(),
            vfs = %self.vfs.display(),
            "running build"
        );
        let status = command
            .status()
            .map_err(|err| BuildError::Spawn(format!("{}: {err}", self.template.program)))?;
        if status.success() {
            return Ok(());
        }
        Err(BuildError::Failed {
            status: status.to_string(),
            detail: read_tail(&stderr_path, STDERR_TAIL_BYTES),
        })
    }
}

/// Reads up to `limit` trailing bytes of a log file as lossy UTF-8.
fn read_tail(path: &Path, limit: u64) -> String {
    let Ok(mut file) = File::open(path) else {
        return String::new();
    };
    let len = file.metadata().map(|meta| meta.len()).unwrap_or(0);
    if len > limit && file.seek(SeekFrom::Start(len - limit)).is_err() {
        return String::new();
    }
    let mut bytes = Vec::new();
    if file.read_to_end(&mut bytes).is_err() {
        return String::new();
    }
    String::from_utf8_lossy(&bytes).trim().to_string()
}
