// crates/firefly-smoke-core/src/events.rs
// ============================================================================
// Module: Smoke Event Log
// Description: Structured lifecycle events emitted by the harness.
// Purpose: Record every check's progress as machine-readable JSON lines.
// Dependencies: serde, serde_json, thiserror, std
// ============================================================================

//! ## Overview
//! The harness reports each lifecycle step to a [`SmokeEventSink`].
//! [`JsonlEventSink`] writes one JSON record per line with a monotonic `seq`;
//! [`NoopEventSink`] discards events; [`MemoryEventSink`] keeps them for
//! inspection. Sink failures never change a check's verdict.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Events
// ============================================================================

/// One harness lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SmokeEvent {
    /// A check began for an example.
    CaseStarted {
        /// Example name.
        example: String,
        /// Work area root.
        work_area: String,
    },
    /// The example's build completed.
    BuildCompleted {
        /// Example name.
        example: String,
        /// Build duration in milliseconds.
        duration_ms: u64,
    },
    /// The application was constructed.
    AppLaunched {
        /// Example name.
        example: String,
        /// Launched app id.
        app_id: String,
    },
    /// The application's start call returned.
    AppStarted {
        /// Example name.
        example: String,
        /// Launched app id.
        app_id: String,
    },
    /// One update tick returned.
    UpdateCompleted {
        /// Example name.
        example: String,
        /// One-based tick number.
        tick: u32,
    },
    /// The check passed.
    CasePassed {
        /// Example name.
        example: String,
        /// Total check duration in milliseconds.
        duration_ms: u64,
    },
    /// The check failed.
    CaseFailed {
        /// Example name.
        example: String,
        /// Failing stage label.
        stage: String,
        /// Error message.
        message: String,
    },
}

// ============================================================================
// SECTION: Sink Trait
// ============================================================================

/// Event sink errors.
#[derive(Debug, Error)]
pub enum EventSinkError {
    /// The sink could not persist the event.
    #[error("event write failed: {0}")]
    WriteFailed(String),
}

/// Receives harness lifecycle events.
pub trait SmokeEventSink: Send + Sync {
    /// Records one event.
    ///
    /// # Errors
    ///
    /// Returns [`EventSinkError`] when the event cannot be persisted.
    fn record(&self, event: &SmokeEvent) -> Result<(), EventSinkError>;
}

// ============================================================================
// SECTION: Implementations
// ============================================================================

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventSink;

impl SmokeEventSink for NoopEventSink {
    fn record(&self, _event: &SmokeEvent) -> Result<(), EventSinkError> {
        Ok(())
    }
}

/// Serialized line written by [`JsonlEventSink`].
#[derive(Serialize)]
struct EventRecord<'a> {
    /// Monotonic sequence number starting at 1.
    seq: u64,
    /// Event payload.
    #[serde(flatten)]
    event: &'a SmokeEvent,
}

/// Sink writing one JSON object per line.
pub struct JsonlEventSink<W: Write + Send> {
    /// Output writer.
    writer: Mutex<W>,
    /// Last issued sequence number.
    seq: AtomicU64,
}

impl<W: Write + Send> JsonlEventSink<W> {
    /// Creates a sink over `writer`.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            seq: AtomicU64::new(0),
        }
    }
}

impl<W: Write + Send> SmokeEventSink for JsonlEventSink<W> {
    fn record(&self, event: &SmokeEvent) -> Result<(), EventSinkError> {
        let mut guard = self
            .writer
            .lock()
            .map_err(|_| EventSinkError::WriteFailed("event writer mutex poisoned".to_string()))?;
        let record = EventRecord {
            seq: self.seq.fetch_add(1, Ordering::Relaxed) + 1,
            event,
        };
        serde_json::to_writer(&mut *guard, &record)
            .map_err(|err| EventSinkError::WriteFailed(err.to_string()))?;
        guard.write_all(b"\n").map_err(|err| EventSinkError::WriteFailed(err.to_string()))?;
        guard.flush().map_err(|err| EventSinkError::WriteFailed(err.to_string()))?;
        drop(guard);
        Ok(())
    }
}

/// Sink that keeps events in memory.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<SmokeEvent>>,
}

impl MemoryEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<SmokeEvent> {
        self.events.lock().map_or_else(|_| Vec::new(), |events| events.clone())
    }
}

impl SmokeEventSink for MemoryEventSink {
    fn record(&self, event: &SmokeEvent) -> Result<(), EventSinkError> {
        self.events
            .lock()
            .map_err(|_| EventSinkError::WriteFailed("event buffer mutex poisoned".to_string()))?
            .push(event.clone());
        Ok(())
    }
}
