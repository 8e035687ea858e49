// crates/firefly-smoke-core/src/process/runtime.rs
// ============================================================================
// Module: Stdio Runtime Driver
// Description: Runs a built app in an external runtime driven over stdio.
// Purpose: Implement the application lifecycle against an opaque runtime.
// Dependencies: crate::{backend, process::{command, protocol}}, tracing
// ============================================================================

//! ## Overview
//! [`StdioApplication`] spawns the configured runtime for one app id after
//! checking the VFS holds its ROM, then maps `start`/`update` onto protocol
//! requests. Dropping the handle asks the runtime to shut down and reaps it.
//!
//! Invariants:
//! - `update` is rejected until `start` succeeded.
//! - After any failure the handle refuses further calls.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process::Child;
use std::process::ChildStdin;
use std::process::ChildStdout;
use std::process::Stdio;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use crate::app_id::AppId;
use crate::backend::AppError;
use crate::backend::Application;
use crate::backend::require_artifact;
use crate::process::command::CommandTemplate;
use crate::process::command::TemplateBindings;
use crate::process::protocol::DriverMethod;
use crate::process::protocol::DriverRequest;
use crate::process::protocol::DriverResponse;
use crate::process::protocol::read_message;
use crate::process::protocol::write_message;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Time a runtime gets to exit after `shutdown` before it is killed.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);
/// Poll interval while waiting for the runtime to exit.
const SHUTDOWN_POLL: Duration = Duration::from_millis(10);

// ============================================================================
// SECTION: Lifecycle State
// ============================================================================

/// Where the handle is in the app lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifecycleState {
    /// Spawned, `start` not yet called.
    Launched,
    /// `start` succeeded.
    Running,
    /// A call failed; the runtime is unusable.
    Failed,
}

// ============================================================================
// SECTION: Application
// ============================================================================

/// App running inside an external runtime process.
#[derive(Debug)]
pub struct StdioApplication {
    /// App id the runtime was launched with.
    id: AppId,
    /// Runtime process.
    child: Child,
    /// Request stream; `None` once closed.
    stdin: Option<ChildStdin>,
    /// Response stream.
    stdout: BufReader<ChildStdout>,
    /// Next request id.
    next_id: u64,
    /// Lifecycle state.
    state: LifecycleState,
}

impl StdioApplication {
    /// Spawns the runtime for `id` after checking its artifact exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ArtifactMissing`] without spawning when no ROM is
    /// installed, or [`AppError::Spawn`] when the runtime cannot start.
    pub fn launch(
        template: &CommandTemplate,
        vfs: &Path,
        logs: &Path,
        id: &AppId,
    ) -> Result<Self, AppError> {
        require_artifact(vfs, id)?;
        let bindings = TemplateBindings {
            vfs: Some(vfs),
            root: None,
            id: Some(id),
        };
        let mut command = template.command(&bindings).map_err(|err| AppError::Spawn(err.to_string()))?;
        let stderr_path = logs.join(format!("runtime.{id}.stderr.log"));
        let stderr = File::create(&stderr_path)
            .map_err(|err| AppError::Spawn(format!("runtime stderr log: {err}")))?;
        command.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(stderr);
        let mut child =
            command.spawn().map_err(|err| AppError::Spawn(format!("{}: {err}", template.program)))?;
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(AppError::Spawn("runtime stdio pipes unavailable".to_string()));
        };
        tracing::debug!(app_id = %id, program = %template.program, "runtime launched");
        Ok(Self {
            id: id.clone(),
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
            next_id: 1,
            state: LifecycleState::Launched,
        })
    }

    /// Returns the launched app id.
    #[must_use]
    pub const fn id(&self) -> &AppId {
        &self.id
    }

    /// Sends one request and waits for its response.
    fn call(&mut self, method: DriverMethod) -> Result<(), AppError> {
        let result = self.exchange(method);
        if result.is_err() {
            self.state = LifecycleState::Failed;
        }
        result
    }

    /// Performs the request/response exchange without state bookkeeping.
    fn exchange(&mut self, method: DriverMethod) -> Result<(), AppError> {
        let id = self.next_id;
        self.next_id += 1;
        let stdin = self.stdin.as_mut().ok_or(AppError::Lifecycle("runtime input already closed"))?;
        write_message(
            stdin,
            &DriverRequest {
                id,
                method,
            },
        )
        .map_err(|err| self.exited_or(err.to_string()))?;
        let response: DriverResponse = read_message(&mut self.stdout)
            .map_err(|err| AppError::Protocol(err.to_string()))?
            .ok_or_else(|| self.exited_or(format!("no response to {}", method.as_str())))?;
        if response.id != id {
            return Err(AppError::Protocol(format!(
                "response id {} does not match request id {id}",
                response.id
            )));
        }
        if let Some(message) = response.error {
            return Err(AppError::Fatal(message));
        }
        if !response.ok {
            return Err(AppError::Protocol(format!(
                "response to {} is neither ok nor error",
                method.as_str()
            )));
        }
        Ok(())
    }

    /// Describes a broken stream, including the exit status when available.
    fn exited_or(&mut self, context: String) -> AppError {
        match self.child.try_wait() {
            Ok(Some(status)) => AppError::Exited(format!("{context} ({status})")),
            _ => AppError::Exited(context),
        }
    }

    /// Rejects calls after a failure.
    const fn ensure_usable(&self) -> Result<(), AppError> {
        if matches!(self.state, LifecycleState::Failed) {
            return Err(AppError::Lifecycle("runtime is unusable after a failure"));
        }
        Ok(())
    }
}

impl Application for StdioApplication {
    fn start(&mut self) -> Result<(), AppError> {
        self.ensure_usable()?;
        if self.state == LifecycleState::Running {
            return Err(AppError::Lifecycle("start called twice"));
        }
        self.call(DriverMethod::Start)?;
        self.state = LifecycleState::Running;
        Ok(())
    }

    fn update(&mut self) -> Result<(), AppError> {
        self.ensure_usable()?;
        if self.state != LifecycleState::Running {
            return Err(AppError::Lifecycle("update called before start"));
        }
        self.call(DriverMethod::Update)
    }
}

impl Drop for StdioApplication {
    fn drop(&mut self) {
        if let Some(mut stdin) = self.stdin.take() {
            if self.state != LifecycleState::Failed {
                let _ = write_message(
                    &mut stdin,
                    &DriverRequest {
                        id: self.next_id,
                        method: DriverMethod::Shutdown,
                    },
                );
            }
            drop(stdin);
        }
        let deadline = Instant::now() + SHUTDOWN_GRACE;
        while Instant::now() < deadline {
            match self.child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) => thread::sleep(SHUTDOWN_POLL),
                Err(_) => break,
            }
        }
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
