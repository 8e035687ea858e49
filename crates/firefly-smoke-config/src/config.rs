// crates/firefly-smoke-config/src/config.rs
// ============================================================================
// Module: Firefly Smoke Configuration
// Description: Configuration loading and validation for firefly-smoke.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: firefly-smoke-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits,
//! then environment overrides are applied and the result is validated. When
//! no path is given and the default file is absent, built-in defaults apply.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::ErrorKind;
use std::num::NonZeroU32;
use std::path::Path;
use std::path::PathBuf;

use firefly_smoke_core::AppId;
use firefly_smoke_core::AppIdSource;
use firefly_smoke_core::DEFAULT_EXAMPLES_DIR;
use firefly_smoke_core::DiscoveryError;
use firefly_smoke_core::ExampleCatalog;
use firefly_smoke_core::HarnessOptions;
use firefly_smoke_core::ProcessBackend;
use firefly_smoke_core::TRIANGLE_EXAMPLE;
use firefly_smoke_core::WorkAreaOptions;
use firefly_smoke_core::process::CommandTemplate;
use firefly_smoke_core::process::default_build_template;
use firefly_smoke_core::process::default_runtime_template;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::env::EnvOverrides;
use crate::env::SmokeEnv;
use crate::env::read_env_strict;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "firefly-smoke.toml";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum update ticks per check.
pub const MAX_UPDATES: u32 = 10_000;
/// Maximum command arguments per template.
pub(crate) const MAX_TEMPLATE_ARGS: usize = 64;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Top-level `firefly-smoke.toml` model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmokeConfig {
    /// SDK checkout location.
    #[serde(default)]
    pub sdk: SdkConfig,
    /// Build tool invocation.
    #[serde(default = "default_build_template")]
    pub build: CommandTemplate,
    /// Runtime driver invocation.
    #[serde(default = "default_runtime_template")]
    pub runtime: CommandTemplate,
    /// Run behaviour.
    #[serde(default)]
    pub run: RunConfig,
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            sdk: SdkConfig::default(),
            build: default_build_template(),
            runtime: default_runtime_template(),
            run: RunConfig::default(),
        }
    }
}

/// `[sdk]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SdkConfig {
    /// SDK root; the current directory when unset.
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// Examples directory name under the root.
    #[serde(default = "default_examples_dir")]
    pub examples_dir: String,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            root: None,
            examples_dir: default_examples_dir(),
        }
    }
}

/// How the launched app id is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppIdSourceKind {
    /// Always launch `run.app_id`.
    Fixed,
    /// Launch the id in the example's `firefly.toml`, falling back to `run.app_id`.
    #[default]
    Manifest,
}

/// `[run]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Fixed id, or manifest fallback id.
    #[serde(default = "AppId::default_demo")]
    pub app_id: AppId,
    /// App id strategy.
    #[serde(default)]
    pub app_id_source: AppIdSourceKind,
    /// Update ticks per generic check.
    #[serde(default = "default_updates")]
    pub updates: u32,
    /// Update ticks for the triangle check.
    #[serde(default = "default_triangle_updates")]
    pub triangle_updates: u32,
    /// Example exercised by the triangle check.
    #[serde(default = "default_triangle_example")]
    pub triangle_example: String,
    /// Keep work areas on disk after each check.
    #[serde(default)]
    pub keep_work_areas: bool,
    /// Parent directory for work areas; the system temp dir when unset.
    #[serde(default)]
    pub work_root: Option<PathBuf>,
    /// Directory receiving `summary.json` and `summary.md`.
    #[serde(default)]
    pub report_dir: Option<PathBuf>,
    /// JSONL event log path.
    #[serde(default)]
    pub event_log: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            app_id: AppId::default_demo(),
            app_id_source: AppIdSourceKind::default(),
            updates: default_updates(),
            triangle_updates: default_triangle_updates(),
            triangle_example: default_triangle_example(),
            keep_work_areas: false,
            work_root: None,
            report_dir: None,
            event_log: None,
        }
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl SmokeConfig {
    /// Loads configuration from disk, applies environment overrides, and validates.
    ///
    /// The path is `path`, else `FIREFLY_SMOKE_CONFIG`, else
    /// `./firefly-smoke.toml`. Only the last may be absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, overriding, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, &EnvOverrides::load()?)
    }

    /// Loads configuration like [`SmokeConfig::load`] with explicit overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with(path: Option<&Path>, overrides: &EnvOverrides) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        validate_path(&resolved)?;
        let mut config = match fs::read(&resolved) {
            Ok(bytes) => Self::from_bytes(&bytes)?,
            Err(err) if err.kind() == ErrorKind::NotFound && !explicit => Self::default(),
            Err(err) => return Err(ConfigError::Io(format!("{}: {err}", resolved.display()))),
        };
        overrides.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration bytes without applying overrides or validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for oversized, non-UTF-8, or malformed input.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sdk.validate()?;
        self.run.validate()?;
        validate_template("build", &self.build)?;
        validate_template("runtime", &self.runtime)?;
        ProcessBackend::new(self.build.clone(), self.runtime.clone())
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Derived Settings
// ============================================================================

impl SmokeConfig {
    /// Returns the SDK root directory.
    #[must_use]
    pub fn sdk_root(&self) -> PathBuf {
        self.sdk.root.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Returns the examples root directory.
    #[must_use]
    pub fn examples_root(&self) -> PathBuf {
        self.sdk_root().join(&self.sdk.examples_dir)
    }

    /// Discovers the configured examples.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] when the examples root is unreadable or empty.
    pub fn discover_examples(&self) -> Result<ExampleCatalog, DiscoveryError> {
        ExampleCatalog::discover_in(&self.sdk_root(), &self.sdk.examples_dir)
    }

    /// Returns the configured app id strategy.
    #[must_use]
    pub fn app_id_source(&self) -> AppIdSource {
        match self.run.app_id_source {
            AppIdSourceKind::Fixed => AppIdSource::Fixed {
                id: self.run.app_id.clone(),
            },
            AppIdSourceKind::Manifest => AppIdSource::Manifest {
                fallback: self.run.app_id.clone(),
            },
        }
    }

    /// Returns harness options for this configuration.
    #[must_use]
    pub fn harness_options(&self) -> HarnessOptions {
        HarnessOptions {
            app_ids: self.app_id_source(),
            work_areas: WorkAreaOptions {
                parent: self.run.work_root.clone(),
                keep: self.run.keep_work_areas,
            },
        }
    }

    /// Builds the process backend for this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a template is invalid.
    pub fn process_backend(&self) -> Result<ProcessBackend, ConfigError> {
        ProcessBackend::new(self.build.clone(), self.runtime.clone())
            .map_err(|err| ConfigError::Invalid(err.to_string()))
    }

    /// Returns the generic update count.
    #[must_use]
    pub fn updates(&self) -> NonZeroU32 {
        NonZeroU32::new(self.run.updates).unwrap_or(NonZeroU32::MIN)
    }

    /// Returns the triangle update count.
    #[must_use]
    pub fn triangle_updates(&self) -> NonZeroU32 {
        NonZeroU32::new(self.run.triangle_updates).unwrap_or(NonZeroU32::MIN)
    }
}

// ============================================================================
// SECTION: Section Validation
// ============================================================================

impl SdkConfig {
    /// Validates the SDK section.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(root) = &self.root {
            validate_path_string("sdk.root", &root.to_string_lossy())?;
        }
        validate_dir_name("sdk.examples_dir", &self.examples_dir)
    }
}

impl RunConfig {
    /// Validates the run section.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_updates("run.updates", self.updates)?;
        validate_updates("run.triangle_updates", self.triangle_updates)?;
        validate_dir_name("run.triangle_example", &self.triangle_example)?;
        for (field, path) in [
            ("run.work_root", &self.work_root),
            ("run.report_dir", &self.report_dir),
            ("run.event_log", &self.event_log),
        ] {
            if let Some(path) = path {
                validate_path_string(field, &path.to_string_lossy())?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path, reporting whether it was named explicitly.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Some(env_path) = read_env_strict(SmokeEnv::Config.as_str())? {
        if env_path.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "{} must not be empty",
                SmokeEnv::Config.as_str()
            )));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates config path length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a single directory name with no separators.
fn validate_dir_name(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if value.len() > MAX_PATH_COMPONENT_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    if value.contains(['/', '\\']) || value == "." || value == ".." {
        return Err(ConfigError::Invalid(format!("{field} must be a single directory name")));
    }
    Ok(())
}

/// Validates an update count.
fn validate_updates(field: &str, value: u32) -> Result<(), ConfigError> {
    if value == 0 || value > MAX_UPDATES {
        return Err(ConfigError::Invalid(format!("{field} must be between 1 and {MAX_UPDATES}")));
    }
    Ok(())
}

/// Validates template size limits.
fn validate_template(field: &str, template: &CommandTemplate) -> Result<(), ConfigError> {
    if template.args.len() > MAX_TEMPLATE_ARGS {
        return Err(ConfigError::Invalid(format!(
            "{field}.args exceeds {MAX_TEMPLATE_ARGS} entries"
        )));
    }
    if template.program.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field}.program exceeds max length")));
    }
    Ok(())
}

/// Default examples directory name.
fn default_examples_dir() -> String {
    DEFAULT_EXAMPLES_DIR.to_string()
}

/// Default generic update count.
const fn default_updates() -> u32 {
    1
}

/// Default triangle update count.
const fn default_triangle_updates() -> u32 {
    2
}

/// Default triangle example name.
fn default_triangle_example() -> String {
    TRIANGLE_EXAMPLE.to_string()
}
