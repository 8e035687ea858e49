// crates/firefly-smoke-core/src/lib.rs
// ============================================================================
// Module: Firefly Smoke Core Library
// Description: Public API surface for the SDK example smoke harness.
// Purpose: Expose discovery, harness, backend interfaces, and reporting.
// Dependencies: crate::{app_id, backend, events, example, harness, manifest, process, report, work_area}
// ============================================================================

//! ## Overview
//! Firefly Smoke builds every example application of an SDK checkout into an
//! isolated work area, launches the resulting app, and drives it through
//! `start` and a few `update` ticks. The build pipeline and the app runtime
//! are opaque collaborators reached through [`SmokeBackend`];
//! [`process::ProcessBackend`] connects them to external tools.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod app_id;
pub mod backend;
pub mod events;
pub mod example;
pub mod harness;
pub mod manifest;
pub mod process;
pub mod report;
pub mod work_area;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use app_id::AppId;
pub use app_id::AppIdError;
pub use app_id::DEFAULT_APP_ID;
pub use backend::AppError;
pub use backend::Application;
pub use backend::BuildClient;
pub use backend::BuildError;
pub use backend::SmokeBackend;
pub use backend::rom_dir;
pub use events::JsonlEventSink;
pub use events::MemoryEventSink;
pub use events::NoopEventSink;
pub use events::SmokeEvent;
pub use events::SmokeEventSink;
pub use example::DEFAULT_EXAMPLES_DIR;
pub use example::DiscoveryError;
pub use example::Example;
pub use example::ExampleCatalog;
pub use example::TRIANGLE_EXAMPLE;
pub use harness::BuildReceipt;
pub use harness::CheckError;
pub use harness::CheckStage;
pub use harness::CheckSummary;
pub use harness::GENERIC_UPDATES;
pub use harness::HarnessOptions;
pub use harness::SmokeHarness;
pub use harness::TRIANGLE_UPDATES;
pub use manifest::AppIdSource;
pub use manifest::ExampleManifest;
pub use manifest::ManifestError;
pub use process::ProcessBackend;
pub use report::CaseOutcome;
pub use report::CaseStatus;
pub use report::ReportError;
pub use report::ReportWriter;
pub use report::SuiteReport;
pub use work_area::WorkArea;
pub use work_area::WorkAreaError;
pub use work_area::WorkAreaOptions;
