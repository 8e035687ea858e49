// crates/firefly-smoke-core/src/process/mod.rs
// ============================================================================
// Module: Process Backend
// Description: Smoke backend backed by external build and runtime commands.
// Purpose: Connect the harness to real SDK tooling through subprocesses.
// Dependencies: crate::backend, std::process
// ============================================================================

//! ## Overview
//! [`ProcessBackend`] pairs a build [`CommandTemplate`] with a runtime
//! [`CommandTemplate`]. Build clients run the build tool once per work area;
//! applications are driven through the stdio protocol in [`protocol`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod build;
pub mod command;
pub mod protocol;
pub mod runtime;


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use crate::app_id::AppId;
use crate::backend::AppError;
use crate::backend::Application;
use crate::backend::BuildClient;
use crate::backend::BuildError;
use crate::backend::SmokeBackend;

pub use build::CommandBuildClient;
pub use command::BUILD_PLACEHOLDERS;
pub use command::CommandTemplate;
pub use command::Placeholder;
pub use command::RUNTIME_PLACEHOLDERS;
pub use command::TemplateBindings;
pub use command::TemplateError;
pub use runtime::StdioApplication;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default build tool.
pub const DEFAULT_BUILD_PROGRAM: &str = "firefly_cli";
/// Default build arguments.
pub const DEFAULT_BUILD_ARGS: &[&str] = &["--vfs", "{vfs}", "build", "{root}"];
/// Default runtime driver.
pub const DEFAULT_RUNTIME_PROGRAM: &str = "firefly-test-runtime";
/// Default runtime arguments.
pub const DEFAULT_RUNTIME_ARGS: &[&str] = &["--vfs", "{vfs}", "--id", "{id}"];

/// Returns the default build command template.
#[must_use]
pub fn default_build_template() -> CommandTemplate {
    CommandTemplate::new(DEFAULT_BUILD_PROGRAM, DEFAULT_BUILD_ARGS)
}

/// Returns the default runtime command template.
#[must_use]
pub fn default_runtime_template() -> CommandTemplate {
    CommandTemplate::new(DEFAULT_RUNTIME_PROGRAM, DEFAULT_RUNTIME_ARGS)
}

// ============================================================================
// SECTION: Backend
// ============================================================================

/// Backend running external build and runtime tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessBackend {
    /// Build command template.
    build: CommandTemplate,
    /// Runtime command template.
    runtime: CommandTemplate,
}

impl ProcessBackend {
    /// Creates a backend after validating both templates.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] when a template uses a placeholder it cannot bind.
    pub fn new(build: CommandTemplate, runtime: CommandTemplate) -> Result<Self, TemplateError> {
        build.validate(BUILD_PLACEHOLDERS)?;
        runtime.validate(RUNTIME_PLACEHOLDERS)?;
        Ok(Self {
            build,
            runtime,
        })
    }

    /// Returns the build template.
    #[must_use]
    pub const fn build_template(&self) -> &CommandTemplate {
        &self.build
    }

    /// Returns the runtime template.
    #[must_use]
    pub const fn runtime_template(&self) -> &CommandTemplate {
        &self.runtime
    }
}

impl Default for ProcessBackend {
    fn default() -> Self {
        Self {
            build: default_build_template(),
            runtime: default_runtime_template(),
        }
    }
}

impl SmokeBackend for ProcessBackend {
    fn build_client(&self, vfs: &Path, logs: &Path) -> Result<Box<dyn BuildClient>, BuildError> {
        Ok(Box::new(CommandBuildClient::new(self.build.clone(), vfs, logs)))
    }

    fn launch(&self, vfs: &Path, logs: &Path, id: &AppId) -> Result<Box<dyn Application>, AppError> {
        Ok(Box::new(StdioApplication::launch(&self.runtime, vfs, logs, id)?))
    }
}
