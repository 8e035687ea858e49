// system-tests/src/stub.rs
// ============================================================================
// Module: Stub SDK Tools
// Description: Shared behaviour of the stub build tool and stub runtime.
// Purpose: Stand in for the SDK toolchain with scriptable failure modes.
// Dependencies: clap, firefly-smoke-core, thiserror
// ============================================================================

//! ## Overview
//! The stub build tool "compiles" an example by checking it has Go sources and
//! writing an artifact into `roms/<author>/<app>/` of the VFS. The artifact
//! carries the example's [`StubBehavior`], read from an optional `behavior`
//! file in the example directory. The stub runtime loads that artifact and
//! answers driver requests accordingly.
//!
//! Fixture files understood in an example directory:
//! - `FAIL_BUILD`: the build fails and prints the file content to stderr.
//! - `behavior`: one directive per line (`fail_start`, `fail_update=N`,
//!   `exit_update=N`); `#` starts a comment.
//! - `firefly.toml`: the manifest naming the app id.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::fs;
use std::io::BufRead;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use firefly_smoke_core::AppId;
use firefly_smoke_core::ExampleManifest;
use firefly_smoke_core::process::protocol::DriverMethod;
use firefly_smoke_core::process::protocol::DriverRequest;
use firefly_smoke_core::process::protocol::DriverResponse;
use firefly_smoke_core::process::protocol::read_message;
use firefly_smoke_core::process::protocol::write_message;
use firefly_smoke_core::rom_dir;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Example file that makes the stub build fail.
pub const FAIL_BUILD_FILE: &str = "FAIL_BUILD";
/// Example file holding runtime directives.
pub const BEHAVIOR_FILE: &str = "behavior";
/// Artifact written into the ROM directory.
pub const ARTIFACT_FILE: &str = "_bin";
/// Source extension the stub build requires.
pub const SOURCE_EXTENSION: &str = "go";
/// Exit code used when the build fails.
pub const BUILD_FAILURE_CODE: u8 = 2;
/// Exit code used when the runtime crashes on purpose.
pub const CRASH_CODE: u8 = 3;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Stub tool failures.
#[derive(Debug, Error)]
pub enum StubError {
    /// Command line was not understood.
    #[error("usage: {0}")]
    Usage(String),
    /// The example does not build.
    #[error("{0}")]
    Build(String),
    /// A behavior file or artifact is malformed.
    #[error("invalid behavior: {0}")]
    Behavior(String),
    /// Filesystem access failed.
    #[error("io error: {0}")]
    Io(String),
    /// The driver stream broke.
    #[error("protocol error: {0}")]
    Protocol(String),
}

// ============================================================================
// SECTION: Behavior
// ============================================================================

/// Failure modes scripted into a stub app.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StubBehavior {
    /// `start` answers with an error.
    pub fail_start: bool,
    /// The Nth `update` answers with an error.
    pub fail_update: Option<u32>,
    /// The runtime exits without answering the Nth `update`.
    pub exit_update: Option<u32>,
}

impl StubBehavior {
    /// Parses behavior directives.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::Behavior`] for unknown directives or bad counts.
    pub fn parse(text: &str) -> Result<Self, StubError> {
        let mut behavior = Self::default();
        for raw in text.lines() {
            let line = raw.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            match line.split_once('=').map(|(key, value)| (key.trim(), value)) {
                None if line == "fail_start" => behavior.fail_start = true,
                Some(("fail_update", value)) => behavior.fail_update = Some(parse_tick(value)?),
                Some(("exit_update", value)) => behavior.exit_update = Some(parse_tick(value)?),
                _ => return Err(StubError::Behavior(format!("unknown directive `{line}`"))),
            }
        }
        Ok(behavior)
    }

    /// Renders the directives back into file form.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.fail_start {
            out.push_str("fail_start\n");
        }
        if let Some(tick) = self.fail_update {
            out.push_str(&format!("fail_update={tick}\n"));
        }
        if let Some(tick) = self.exit_update {
            out.push_str(&format!("exit_update={tick}\n"));
        }
        out
    }
}

/// Parses a one-based tick number.
fn parse_tick(value: &str) -> Result<u32, StubError> {
    match value.trim().parse::<u32>() {
        Ok(tick) if tick > 0 => Ok(tick),
        _ => Err(StubError::Behavior(format!("tick must be a positive integer, got `{value}`"))),
    }
}

// ============================================================================
// SECTION: Build
// ============================================================================

/// Builds `root` into `vfs` and returns the installed app id.
///
/// # Errors
///
/// Returns [`StubError::Build`] when the example is marked broken or has no
/// sources, and other variants when its files are malformed.
pub fn build_example(vfs: &Path, root: &Path) -> Result<AppId, StubError> {
    match fs::read_to_string(root.join(FAIL_BUILD_FILE)) {
        Ok(message) => return Err(StubError::Build(message.trim().to_string())),
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => return Err(StubError::Io(err.to_string())),
    }
    if !has_sources(root)? {
        return Err(StubError::Build(format!("no .{SOURCE_EXTENSION} sources in {}", root.display())));
    }
    let behavior = match fs::read_to_string(root.join(BEHAVIOR_FILE)) {
        Ok(text) => StubBehavior::parse(&text)?,
        Err(err) if err.kind() == ErrorKind::NotFound => StubBehavior::default(),
        Err(err) => return Err(StubError::Io(err.to_string())),
    };
    let id = match ExampleManifest::read(root).map_err(|err| StubError::Build(err.to_string()))? {
        Some(manifest) => manifest.app_id().map_err(|err| StubError::Build(err.to_string()))?,
        None => AppId::default_demo(),
    };
    let rom = rom_dir(vfs, &id);
    fs::create_dir_all(&rom).map_err(|err| StubError::Io(err.to_string()))?;
    fs::write(rom.join(ARTIFACT_FILE), behavior.render()).map_err(|err| StubError::Io(err.to_string()))?;
    Ok(id)
}

/// Returns true when `root` directly contains a source file.
fn has_sources(root: &Path) -> Result<bool, StubError> {
    let entries = fs::read_dir(root).map_err(|err| StubError::Io(err.to_string()))?;
    for entry in entries {
        let path = entry.map_err(|err| StubError::Io(err.to_string()))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
            return Ok(true);
        }
    }
    Ok(false)
}

// ============================================================================
// SECTION: Runtime
// ============================================================================

/// How a served session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeExit {
    /// `shutdown` was acknowledged.
    Shutdown,
    /// The request stream closed.
    Eof,
    /// A scripted crash stopped the session without a response.
    Crash,
}

/// Loads the behavior installed for `id` in `vfs`.
///
/// # Errors
///
/// Returns [`StubError::Io`] when the artifact is missing.
pub fn load_artifact(vfs: &Path, id: &AppId) -> Result<StubBehavior, StubError> {
    let path = rom_dir(vfs, id).join(ARTIFACT_FILE);
    let text = fs::read_to_string(&path)
        .map_err(|err| StubError::Io(format!("{}: {err}", path.display())))?;
    StubBehavior::parse(&text)
}

/// Answers driver requests from `reader` on `writer` until the session ends.
///
/// # Errors
///
/// Returns [`StubError::Protocol`] when a request cannot be read or a response
/// cannot be written.
pub fn serve<R: BufRead, W: Write>(
    behavior: StubBehavior,
    reader: &mut R,
    writer: &mut W,
) -> Result<ServeExit, StubError> {
    let mut updates = 0_u32;
    loop {
        let request: Option<DriverRequest> =
            read_message(reader).map_err(|err| StubError::Protocol(err.to_string()))?;
        let Some(request) = request else {
            return Ok(ServeExit::Eof);
        };
        let response = match request.method {
            DriverMethod::Start if behavior.fail_start => {
                DriverResponse::error(request.id, "panic in start")
            }
            DriverMethod::Start => DriverResponse::ok(request.id),
            DriverMethod::Update => {
                updates = updates.saturating_add(1);
                if behavior.exit_update == Some(updates) {
                    return Ok(ServeExit::Crash);
                }
                if behavior.fail_update == Some(updates) {
                    DriverResponse::error(request.id, format!("panic in update {updates}"))
                } else {
                    DriverResponse::ok(request.id)
                }
            }
            DriverMethod::Shutdown => {
                write_message(writer, &DriverResponse::ok(request.id))
                    .map_err(|err| StubError::Protocol(err.to_string()))?;
                return Ok(ServeExit::Shutdown);
            }
        };
        write_message(writer, &response).map_err(|err| StubError::Protocol(err.to_string()))?;
    }
}

// ============================================================================
// SECTION: Arguments
// ============================================================================

/// Command line of the stub build tool: `--vfs <vfs> build <root>`.
#[derive(Parser, Debug)]
#[command(name = "firefly_stub_build", disable_help_subcommand = true)]
pub struct BuildArgs {
    /// VFS the artifact is installed into.
    #[arg(long, value_name = "DIR")]
    pub vfs: PathBuf,
    /// Build action.
    #[command(subcommand)]
    pub command: BuildCommand,
}

/// Stub build tool actions.
#[derive(Subcommand, Debug)]
pub enum BuildCommand {
    /// Builds the example rooted at `root`.
    Build {
        /// Example directory.
        root: PathBuf,
    },
}

/// Command line of the stub runtime: `--vfs <vfs> --id <author.app>`.
#[derive(Parser, Debug)]
#[command(name = "firefly_stub_runtime")]
pub struct RuntimeArgs {
    /// VFS holding installed artifacts.
    #[arg(long, value_name = "DIR")]
    pub vfs: PathBuf,
    /// App to serve.
    #[arg(long, value_name = "AUTHOR.APP")]
    pub id: AppId,
}

/// Parses a stub command line, mapping clap errors to [`StubError::Usage`].
///
/// # Errors
///
/// Returns [`StubError::Usage`] when `args` do not match `T`.
pub fn parse_args<T, I, S>(args: I) -> Result<T, StubError>
where
    T: Parser,
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    T::try_parse_from(args).map_err(|err| StubError::Usage(err.to_string().trim_end().to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
