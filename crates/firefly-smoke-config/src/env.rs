// crates/firefly-smoke-config/src/env.rs
// ============================================================================
// Module: Environment Overrides
// Description: Environment-backed overrides for firefly-smoke configuration.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Set-but-empty values and invalid UTF-8 fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::path::PathBuf;

use crate::config::ConfigError;
use crate::config::SmokeConfig;

// ============================================================================
// SECTION: Environment Keys
// ============================================================================

/// Environment keys read by firefly-smoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmokeEnv {
    /// Config file path override.
    Config,
    /// SDK root override.
    SdkRoot,
    /// Report directory override.
    ReportDir,
    /// Keep work areas after each check (`true`/`false` or `1`/`0`).
    KeepWorkAreas,
    /// Update ticks per generic check (positive integer).
    Updates,
    /// Tracing filter directives for the CLI.
    Log,
}

impl SmokeEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "FIREFLY_SMOKE_CONFIG",
            Self::SdkRoot => "FIREFLY_SMOKE_SDK_ROOT",
            Self::ReportDir => "FIREFLY_SMOKE_REPORT_DIR",
            Self::KeepWorkAreas => "FIREFLY_SMOKE_KEEP_WORK_AREAS",
            Self::Updates => "FIREFLY_SMOKE_UPDATES",
            Self::Log => "FIREFLY_SMOKE_LOG",
        }
    }
}

// ============================================================================
// SECTION: Overrides
// ============================================================================

/// Values taken from the environment, applied over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    /// SDK root override.
    pub sdk_root: Option<PathBuf>,
    /// Report directory override.
    pub report_dir: Option<PathBuf>,
    /// Work area retention override.
    pub keep_work_areas: Option<bool>,
    /// Generic update count override.
    pub updates: Option<u32>,
}

impl EnvOverrides {
    /// Reads overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is not UTF-8, is empty,
    /// or fails to parse.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var_os(name))
    }

    /// Reads overrides through `lookup`, which maps a variable name to its raw value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is not UTF-8, is empty,
    /// or fails to parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let read = |key: SmokeEnv| read_nonempty(key.as_str(), lookup(key.as_str()));
        let sdk_root = read(SmokeEnv::SdkRoot)?.map(PathBuf::from);
        let report_dir = read(SmokeEnv::ReportDir)?.map(PathBuf::from);
        let keep_work_areas = read(SmokeEnv::KeepWorkAreas)?
            .map(|value| parse_bool(SmokeEnv::KeepWorkAreas.as_str(), &value))
            .transpose()?;
        let updates = read(SmokeEnv::Updates)?
            .map(|value| parse_positive(SmokeEnv::Updates.as_str(), &value))
            .transpose()?;
        Ok(Self {
            sdk_root,
            report_dir,
            keep_work_areas,
            updates,
        })
    }

    /// Returns true when no override is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.sdk_root.is_none()
            && self.report_dir.is_none()
            && self.keep_work_areas.is_none()
            && self.updates.is_none()
    }

    /// Applies the overrides to `config`.
    pub fn apply(&self, config: &mut SmokeConfig) {
        if let Some(root) = &self.sdk_root {
            config.sdk.root = Some(root.clone());
        }
        if let Some(dir) = &self.report_dir {
            config.run.report_dir = Some(dir.clone());
        }
        if let Some(keep) = self.keep_work_areas {
            config.run.keep_work_areas = keep;
        }
        if let Some(updates) = self.updates {
            config.run.updates = updates;
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, ConfigError> {
    strict_utf8(name, std::env::var_os(name))
}

/// Converts a raw value to UTF-8.
fn strict_utf8(name: &str, raw: Option<OsString>) -> Result<Option<String>, ConfigError> {
    raw.map_or(Ok(None), |raw| {
        raw.into_string()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("{name} must be valid UTF-8")))
    })
}

/// Converts a raw value to UTF-8 and rejects empty values.
fn read_nonempty(name: &str, raw: Option<OsString>) -> Result<Option<String>, ConfigError> {
    match strict_utf8(name, raw)? {
        Some(value) if value.trim().is_empty() => {
            Err(ConfigError::Invalid(format!("{name} must not be empty")))
        }
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a boolean literal.
fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(ConfigError::Invalid(format!("{name} must be 1, 0, true, or false")))
}

/// Parses a positive integer.
fn parse_positive(name: &str, value: &str) -> Result<u32, ConfigError> {
    let parsed: u32 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{name} must be a positive integer")))?;
    if parsed == 0 {
        return Err(ConfigError::Invalid(format!("{name} must be greater than zero")));
    }
    Ok(parsed)
}
