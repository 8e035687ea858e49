// crates/firefly-smoke-core/src/process/protocol.rs
// ============================================================================
// Module: Runtime Driver Protocol
// Description: Newline-delimited JSON messages between harness and runtime.
// Purpose: Drive an out-of-process app through start/update/shutdown.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The harness writes one [`DriverRequest`] per line to the runtime's stdin
//! and reads exactly one [`DriverResponse`] per line from its stdout. A
//! response echoes the request id and carries either `"ok": true` or an
//! `"error"` message.
//!
//! Invariants:
//! - Lines are at most [`MAX_MESSAGE_BYTES`] bytes.
//! - Request ids start at 1 and increase by one per request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::BufRead;
use std::io::Read;
use std::io::Write;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum size of one protocol line, newline excluded.
pub const MAX_MESSAGE_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: Messages
// ============================================================================

/// Lifecycle operation requested from the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverMethod {
    /// One-time initialization.
    Start,
    /// Advance one tick.
    Update,
    /// Tear down and exit.
    Shutdown,
}

impl DriverMethod {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Update => "update",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Request line sent to the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverRequest {
    /// Request id.
    pub id: u64,
    /// Requested operation.
    pub method: DriverMethod,
}

/// Response line read from the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverResponse {
    /// Echoed request id.
    pub id: u64,
    /// True when the operation succeeded.
    #[serde(default)]
    pub ok: bool,
    /// Fatal error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DriverResponse {
    /// Builds a success response.
    #[must_use]
    pub const fn ok(id: u64) -> Self {
        Self {
            id,
            ok: true,
            error: None,
        }
    }

    /// Builds an error response.
    #[must_use]
    pub fn error(id: u64, message: impl Into<String>) -> Self {
        Self {
            id,
            ok: false,
            error: Some(message.into()),
        }
    }
}

// ============================================================================
// SECTION: Framing
// ============================================================================

/// Framing errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Reading or writing the stream failed.
    #[error("protocol io error: {0}")]
    Io(String),
    /// A line exceeded [`MAX_MESSAGE_BYTES`].
    #[error("protocol line exceeds {MAX_MESSAGE_BYTES} bytes")]
    Oversized,
    /// A line was not valid JSON for the expected message.
    #[error("malformed protocol line: {0}")]
    Malformed(String),
}

/// Writes one message as a JSON line and flushes.
///
/// # Errors
///
/// Returns [`ProtocolError::Io`] when serialization or the write fails.
pub fn write_message<W: Write, T: Serialize>(writer: &mut W, message: &T) -> Result<(), ProtocolError> {
    let mut line = serde_json::to_vec(message).map_err(|err| ProtocolError::Io(err.to_string()))?;
    line.push(b'\n');
    writer.write_all(&line).map_err(|err| ProtocolError::Io(err.to_string()))?;
    writer.flush().map_err(|err| ProtocolError::Io(err.to_string()))
}

/// Reads one JSON line; returns `None` at end of stream.
///
/// # Errors
///
/// Returns [`ProtocolError`] for I/O failures, oversized or malformed lines.
pub fn read_message<R: BufRead, T: DeserializeOwned>(reader: &mut R) -> Result<Option<T>, ProtocolError> {
    let mut line = String::new();
    let limit = u64::try_from(MAX_MESSAGE_BYTES + 2).unwrap_or(u64::MAX);
    let read = reader
        .by_ref()
        .take(limit)
        .read_line(&mut line)
        .map_err(|err| ProtocolError::Io(err.to_string()))?;
    if read == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\n', '\r']);
    if trimmed.len() > MAX_MESSAGE_BYTES {
        return Err(ProtocolError::Oversized);
    }
    serde_json::from_str(trimmed).map(Some).map_err(|err| ProtocolError::Malformed(err.to_string()))
}
