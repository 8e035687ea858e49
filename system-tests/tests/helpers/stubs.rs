// system-tests/tests/helpers/stubs.rs
// ============================================================================
// Module: Stub Harness
// Description: Harness construction over the stub SDK tools.
// Purpose: Point the process backend at the stub binaries and fixture SDKs.
// Dependencies: firefly-smoke-config, firefly-smoke-core
// ============================================================================

use std::num::NonZeroU32;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use firefly_smoke_config::SmokeConfig;
use firefly_smoke_core::MemoryEventSink;
use firefly_smoke_core::ProcessBackend;
use firefly_smoke_core::SmokeHarness;
use firefly_smoke_core::process::CommandTemplate;
use firefly_smoke_core::process::DEFAULT_BUILD_ARGS;
use firefly_smoke_core::process::DEFAULT_RUNTIME_ARGS;

use super::artifacts::TestReporter;

/// Fixture SDK whose examples all pass.
pub const SDK_FIXTURE: &str = "sdk";
/// Fixture SDK mixing a passing triangle with broken examples.
pub const FAULTY_FIXTURE: &str = "faulty";

/// Returns the path of a fixture SDK tree.
pub fn fixture_sdk(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

/// Returns the stub build tool path.
pub fn stub_build_bin() -> &'static str {
    env!("CARGO_BIN_EXE_firefly_stub_build")
}

/// Returns the stub runtime path.
pub fn stub_runtime_bin() -> &'static str {
    env!("CARGO_BIN_EXE_firefly_stub_runtime")
}

/// Returns a validated config running the stub tools against `sdk_root`.
pub fn stub_config(sdk_root: &Path, reporter: &TestReporter) -> Result<SmokeConfig, String> {
    let mut config = SmokeConfig::default();
    config.sdk.root = Some(sdk_root.to_path_buf());
    config.build = CommandTemplate::new(stub_build_bin(), DEFAULT_BUILD_ARGS);
    config.runtime = CommandTemplate::new(stub_runtime_bin(), DEFAULT_RUNTIME_ARGS);
    config.run.work_root = Some(reporter.artifacts().work_root().map_err(|err| err.to_string())?);
    config.run.keep_work_areas = reporter.config().keep_work_areas;
    config.validate().map_err(|err| err.to_string())?;
    Ok(config)
}

/// Harness over the process backend with an in-memory event log.
pub struct StubHarness {
    /// Configured harness.
    pub harness: SmokeHarness<ProcessBackend>,
    /// Events recorded by the harness.
    pub events: Arc<MemoryEventSink>,
}

impl StubHarness {
    /// Builds a harness from `config`.
    pub fn new(config: &SmokeConfig) -> Result<Self, String> {
        let events = Arc::new(MemoryEventSink::new());
        let backend = config.process_backend().map_err(|err| err.to_string())?;
        let harness = SmokeHarness::new(backend)
            .with_options(config.harness_options())
            .with_events(events.clone());
        Ok(Self {
            harness,
            events,
        })
    }

    /// Counts recorded events with the given tag.
    pub fn count_events(&self, tag: &str) -> usize {
        self.events
            .events()
            .iter()
            .filter_map(|event| serde_json::to_value(event).ok())
            .filter(|value| value["event"] == tag)
            .count()
    }
}

/// Returns `count` as an update budget.
pub fn ticks(count: u32) -> NonZeroU32 {
    NonZeroU32::new(count).unwrap_or(NonZeroU32::MIN)
}
