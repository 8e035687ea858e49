// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system tests.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::num::NonZeroU32;
use std::path::PathBuf;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Optional artifact root override.
    RunRoot,
    /// Real SDK checkout for the live example suite.
    SdkRoot,
    /// Keep work areas after each case (`true`/`false` or `1`/`0`).
    KeepWorkAreas,
    /// Update ticks per live example (positive integer).
    Updates,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "FIREFLY_SMOKE_SYSTEM_TEST_RUN_ROOT",
            Self::SdkRoot => "FIREFLY_SMOKE_SYSTEM_TEST_SDK_ROOT",
            Self::KeepWorkAreas => "FIREFLY_SMOKE_SYSTEM_TEST_KEEP_WORK_AREAS",
            Self::Updates => "FIREFLY_SMOKE_SYSTEM_TEST_UPDATES",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Optional artifact root override.
    pub run_root: Option<PathBuf>,
    /// Real SDK checkout; the live suite skips without it.
    pub sdk_root: Option<PathBuf>,
    /// Keep work areas after each case.
    pub keep_work_areas: bool,
    /// Update ticks per live example.
    pub updates: Option<NonZeroU32>,
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or fails validation (for example, an invalid count or boolean value).
    pub fn load() -> Result<Self, String> {
        let run_root = read_env_nonempty(SystemTestEnv::RunRoot.as_str())?.map(PathBuf::from);
        let sdk_root = read_env_nonempty(SystemTestEnv::SdkRoot.as_str())?.map(PathBuf::from);
        let keep_work_areas = parse_bool_env(
            SystemTestEnv::KeepWorkAreas.as_str(),
            read_env_nonempty(SystemTestEnv::KeepWorkAreas.as_str())?,
        )?;
        let updates = read_env_nonempty(SystemTestEnv::Updates.as_str())?
            .map(|value| parse_updates(SystemTestEnv::Updates.as_str(), &value))
            .transpose()?;
        Ok(Self {
            run_root,
            sdk_root,
            keep_work_areas,
            updates,
        })
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
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive update count.
fn parse_updates(name: &str, raw: &str) -> Result<NonZeroU32, String> {
    let count: u32 = raw.trim().parse().map_err(|_| format!("{name} must be a positive integer"))?;
    NonZeroU32::new(count).ok_or_else(|| format!("{name} must be greater than zero"))
}

/// Parses a boolean environment variable, defaulting to false when unset.
///
/// # Errors
///
/// Returns an error when the value is not a recognized boolean literal.
fn parse_bool_env(name: &str, raw: Option<String>) -> Result<bool, String> {
    let Some(value) = raw else {
        return Ok(false);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(format!("{name} must be 1, 0, true, or false"))
}
