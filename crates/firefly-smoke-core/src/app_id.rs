// crates/firefly-smoke-core/src/app_id.rs
// ============================================================================
// Module: Application Identifiers
// Description: Namespaced application identifiers (`author.app`).
// Purpose: Give built artifacts a validated, stable logical name.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! An [`AppId`] names one built application as `<author_id>.<app_id>`, for
//! example `demo.go-triangle`. Both parts are validated on construction so a
//! malformed name can never reach a runtime or a filesystem path.
//!
//! Invariants:
//! - Each part is 1 to [`MAX_ID_PART_LEN`] bytes of `[a-z0-9-]`.
//! - No part starts or ends with `-`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of an author or app id part, in bytes.
pub const MAX_ID_PART_LEN: usize = 16;

/// Application id used by the SDK's smoke tests when no manifest names one.
pub const DEFAULT_APP_ID: &str = "demo.go-triangle";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while parsing an [`AppId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppIdError {
    /// The value has no `.` separating author and app.
    #[error("app id `{0}` must have the form <author_id>.<app_id>")]
    MissingSeparator(String),
    /// One of the parts violates the id grammar.
    #[error("invalid {part} `{value}`: {reason}")]
    InvalidPart {
        /// Which part failed (`author_id` or `app_id`).
        part: &'static str,
        /// Offending value.
        value: String,
        /// Human-readable reason.
        reason: &'static str,
    },
}

// ============================================================================
// SECTION: AppId
// ============================================================================

/// Validated `<author_id>.<app_id>` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AppId {
    /// Author namespace.
    author: String,
    /// Application name within the author namespace.
    app: String,
}

impl AppId {
    /// Builds an id from separate author and app parts.
    ///
    /// # Errors
    ///
    /// Returns [`AppIdError::InvalidPart`] when either part is malformed.
    pub fn new(author: &str, app: &str) -> Result<Self, AppIdError> {
        validate_part("author_id", author)?;
        validate_part("app_id", app)?;
        Ok(Self {
            author: author.to_string(),
            app: app.to_string(),
        })
    }

    /// Returns the id used when nothing more specific is known.
    #[must_use]
    pub fn default_demo() -> Self {
        Self {
            author: "demo".to_string(),
            app: "go-triangle".to_string(),
        }
    }

    /// Returns the author namespace.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Returns the application name.
    #[must_use]
    pub fn app(&self) -> &str {
        &self.app
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.author, self.app)
    }
}

impl FromStr for AppId {
    type Err = AppIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (author, app) =
            value.split_once('.').ok_or_else(|| AppIdError::MissingSeparator(value.to_string()))?;
        Self::new(author, app)
    }
}

impl Serialize for AppId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AppId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Checks one id part against the grammar.
fn validate_part(part: &'static str, value: &str) -> Result<(), AppIdError> {
    let fail = |reason| AppIdError::InvalidPart {
        part,
        value: value.to_string(),
        reason,
    };
    if value.is_empty() {
        return Err(fail("must not be empty"));
    }
    if value.len() > MAX_ID_PART_LEN {
        return Err(fail("must be at most 16 bytes"));
    }
    if !value.bytes().all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-')
    {
        return Err(fail("may contain only a-z, 0-9, and -"));
    }
    if value.starts_with('-') || value.ends_with('-') {
        return Err(fail("must not start or end with -"));
    }
    Ok(())
}
