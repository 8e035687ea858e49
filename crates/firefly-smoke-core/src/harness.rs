// crates/firefly-smoke-core/src/harness.rs
// ============================================================================
// Module: Smoke Harness
// Description: Build-then-run checks for SDK example applications.
// Purpose: Prove each example builds and survives start plus a few updates.
// Dependencies: crate::{backend, events, example, manifest, report, work_area}, tracing
// ============================================================================

//! ## Overview
//! [`SmokeHarness`] drives one check per example: bind a build client to a
//! fresh [`WorkArea`], build the example, launch the resolved app, call
//! `start`, then call `update` a fixed number of times. Any collaborator error
//! ends the check and is returned as a [`CheckError`] naming the stage.
//!
//! Invariants:
//! - An application is only launched from a [`BuildReceipt`], which only a
//!   successful build produces.
//! - Every suite case gets its own work area; areas are never reused.
//! - Errors are propagated, never retried or downgraded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;

use crate::app_id::AppId;
use crate::backend::AppError;
use crate::backend::Application;
use crate::backend::BuildError;
use crate::backend::SmokeBackend;
use crate::events::NoopEventSink;
use crate::events::SmokeEvent;
use crate::events::SmokeEventSink;
use crate::example::DiscoveryError;
use crate::example::Example;
use crate::example::ExampleCatalog;
use crate::example::TRIANGLE_EXAMPLE;
use crate::manifest::AppIdSource;
use crate::manifest::ManifestError;
use crate::report::CaseOutcome;
use crate::report::SuiteReport;
use crate::work_area::WorkArea;
use crate::work_area::WorkAreaError;
use crate::work_area::WorkAreaOptions;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Update ticks performed by the per-example check.
pub const GENERIC_UPDATES: NonZeroU32 = NonZeroU32::MIN;

/// Update ticks performed by the triangle check.
pub const TRIANGLE_UPDATES: NonZeroU32 = NonZeroU32::MIN.saturating_add(1);

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Lifecycle stage at which a check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStage {
    /// Selecting the example.
    Discovery,
    /// Preparing the work area.
    WorkArea,
    /// Resolving the app id.
    Resolve,
    /// Building the example.
    Build,
    /// Constructing the application.
    Launch,
    /// Starting the application.
    Start,
    /// Updating the application.
    Update,
}

impl CheckStage {
    /// Returns a stable label for the stage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::WorkArea => "work_area",
            Self::Resolve => "resolve",
            Self::Build => "build",
            Self::Launch => "launch",
            Self::Start => "start",
            Self::Update => "update",
        }
    }
}

/// Failure of one smoke check.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The requested example does not exist.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    /// The work area could not be prepared.
    #[error(transparent)]
    WorkArea(#[from] WorkAreaError),
    /// The example's app id could not be resolved.
    #[error("{example}: cannot resolve app id: {source}")]
    Resolve {
        /// Example name.
        example: String,
        /// Manifest failure.
        #[source]
        source: ManifestError,
    },
    /// The build failed.
    #[error("{example}: build failed: {source}")]
    Build {
        /// Example name.
        example: String,
        /// Build failure.
        #[source]
        source: BuildError,
    },
    /// The application could not be constructed.
    #[error("{app_id}: launch failed: {source}")]
    Launch {
        /// App id being launched.
        app_id: AppId,
        /// Application failure.
        #[source]
        source: AppError,
    },
    /// The application's start call failed.
    #[error("{app_id}: start failed: {source}")]
    Start {
        /// App id being started.
        app_id: AppId,
        /// Application failure.
        #[source]
        source: AppError,
    },
    /// An update tick failed.
    #[error("{app_id}: update {tick} failed: {source}")]
    Update {
        /// App id being updated.
        app_id: AppId,
        /// One-based tick number that failed.
        tick: u32,
        /// Application failure.
        #[source]
        source: AppError,
    },
}

impl CheckError {
    /// Returns the stage the check failed at.
    #[must_use]
    pub const fn stage(&self) -> CheckStage {
        match self {
            Self::Discovery(_) => CheckStage::Discovery,
            Self::WorkArea(_) => CheckStage::WorkArea,
            Self::Resolve {
                ..
            } => CheckStage::Resolve,
            Self::Build {
                ..
            } => CheckStage::Build,
            Self::Launch {
                ..
            } => CheckStage::Launch,
            Self::Start {
                ..
            } => CheckStage::Start,
            Self::Update {
                ..
            } => CheckStage::Update,
        }
    }

    /// Returns the failing tick for update failures.
    #[must_use]
    pub const fn tick(&self) -> Option<u32> {
        match self {
            Self::Update {
                tick, ..
            } => Some(*tick),
            _ => None,
        }
    }

    /// Returns the app id once it was known.
    #[must_use]
    pub const fn app_id(&self) -> Option<&AppId> {
        match self {
            Self::Launch {
                app_id, ..
            }
            | Self::Start {
                app_id, ..
            }
            | Self::Update {
                app_id, ..
            } => Some(app_id),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// Proof that an example built into a specific work area.
///
/// # Invariants
/// - Only [`SmokeHarness::build`] constructs receipts.
#[derive(Debug)]
pub struct BuildReceipt<'a> {
    /// Area the build wrote into.
    area: &'a WorkArea,
    /// Name of the built example.
    example: String,
}

impl BuildReceipt<'_> {
    /// Returns the work area holding the build artifacts.
    #[must_use]
    pub const fn area(&self) -> &WorkArea {
        self.area
    }

    /// Returns the built example's name.
    #[must_use]
    pub fn example(&self) -> &str {
        &self.example
    }
}

/// Summary of a passing check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSummary {
    /// Example name.
    pub example: String,
    /// App id that was launched.
    pub app_id: AppId,
    /// Update ticks completed.
    pub updates: u32,
    /// Wall-clock duration of the check.
    pub duration: Duration,
}

// ============================================================================
// SECTION: Options
// ============================================================================

/// Harness behaviour knobs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarnessOptions {
    /// How the launched app id is chosen.
    pub app_ids: AppIdSource,
    /// Where suite work areas live and whether they are kept.
    pub work_areas: WorkAreaOptions,
}

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Build-and-run smoke harness over a [`SmokeBackend`].
pub struct SmokeHarness<B> {
    /// Build and runtime collaborators.
    backend: B,
    /// Behaviour knobs.
    options: HarnessOptions,
    /// Lifecycle event sink.
    events: Arc<dyn SmokeEventSink>,
}

impl<B: SmokeBackend> SmokeHarness<B> {
    /// Creates a harness with default options and no event log.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            options: HarnessOptions::default(),
            events: Arc::new(NoopEventSink),
        }
    }

    /// Replaces the harness options.
    #[must_use]
    pub fn with_options(mut self, options: HarnessOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn SmokeEventSink>) -> Self {
        self.events = events;
        self
    }

    /// Returns the backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the harness options.
    pub const fn options(&self) -> &HarnessOptions {
        &self.options
    }

    /// Creates a fresh work area for `example` using the configured options.
    ///
    /// # Errors
    ///
    /// Returns [`WorkAreaError`] when the directories cannot be created.
    pub fn new_work_area(&self, example: &Example) -> Result<WorkArea, WorkAreaError> {
        WorkArea::create(example.name(), &self.options.work_areas)
    }

    /// Builds `example` into `area` with a freshly bound build client.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Build`] when the client cannot be bound or the build fails.
    pub fn build<'a>(
        &self,
        example: &Example,
        area: &'a WorkArea,
    ) -> Result<BuildReceipt<'a>, CheckError> {
        let build_err = |source| CheckError::Build {
            example: example.name().to_string(),
            source,
        };
        let started = Instant::now();
        let mut client = self.backend.build_client(area.vfs(), area.logs()).map_err(build_err)?;
        client.build(example.path()).map_err(build_err)?;
        let elapsed = started.elapsed();
        tracing::debug!(example = example.name(), elapsed_ms = millis(elapsed), "build completed");
        self.emit(&SmokeEvent::BuildCompleted {
            example: example.name().to_string(),
            duration_ms: millis(elapsed),
        });
        Ok(BuildReceipt {
            area,
            example: example.name().to_string(),
        })
    }

    /// Constructs application `app_id` from a completed build.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Launch`] when the backend cannot construct the app.
    pub fn launch(
        &self,
        receipt: &BuildReceipt<'_>,
        app_id: &AppId,
    ) -> Result<Box<dyn Application>, CheckError> {
        let area = receipt.area();
        let app = self.backend.launch(area.vfs(), area.logs(), app_id).map_err(|source| {
            CheckError::Launch {
                app_id: app_id.clone(),
                source,
            }
        })?;
        self.emit(&SmokeEvent::AppLaunched {
            example: receipt.example.clone(),
            app_id: app_id.to_string(),
        });
        Ok(app)
    }

    /// Builds `example` in `area`, then starts its app and runs `updates` ticks.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError`] naming the first stage that failed.
    pub fn check_example(
        &self,
        example: &Example,
        area: &WorkArea,
        updates: NonZeroU32,
    ) -> Result<CheckSummary, CheckError> {
        let span = tracing::info_span!("smoke_check", example = example.name());
        let _entered = span.enter();
        let started = Instant::now();
        self.emit(&SmokeEvent::CaseStarted {
            example: example.name().to_string(),
            work_area: area.root().display().to_string(),
        });
        let result = self.drive(example, area, updates);
        match &result {
            Ok(summary) => {
                tracing::info!(app_id = %summary.app_id, updates = summary.updates, "check passed");
                self.emit(&SmokeEvent::CasePassed {
                    example: example.name().to_string(),
                    duration_ms: millis(started.elapsed()),
                });
            }
            Err(err) => {
                tracing::warn!(stage = err.stage().as_str(), error = %err, "check failed");
                self.emit(&SmokeEvent::CaseFailed {
                    example: example.name().to_string(),
                    stage: err.stage().as_str().to_string(),
                    message: err.to_string(),
                });
            }
        }
        result.map(|summary| CheckSummary {
            duration: started.elapsed(),
            ..summary
        })
    }

    /// Builds one example and runs a single update tick.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError`] naming the first stage that failed.
    pub fn run_generic_example_check(
        &self,
        example: &Example,
        area: &WorkArea,
    ) -> Result<CheckSummary, CheckError> {
        self.check_example(example, area, GENERIC_UPDATES)
    }

    /// Builds the `triangle` example and runs two update ticks.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Discovery`] when the catalog has no triangle
    /// example, otherwise the first stage that failed.
    pub fn run_triangle_example_check(
        &self,
        catalog: &ExampleCatalog,
        area: &WorkArea,
    ) -> Result<CheckSummary, CheckError> {
        let example = catalog.get(TRIANGLE_EXAMPLE)?;
        self.check_example(example, area, TRIANGLE_UPDATES)
    }

    /// Runs one check per example, each in a fresh work area.
    ///
    /// Failures are recorded and the suite continues with the next example.
    #[must_use]
    pub fn run_suite(&self, examples: &[Example], updates: NonZeroU32) -> SuiteReport {
        let started = Instant::now();
        let mut cases = Vec::with_capacity(examples.len());
        for example in examples {
            let case_started = Instant::now();
            let outcome = match self.new_work_area(example) {
                Ok(area) => {
                    let result = self.check_example(example, &area, updates);
                    let kept = area.is_kept().then(|| area.root().display().to_string());
                    CaseOutcome::from_result(example.name(), &result, updates, kept)
                }
                Err(err) => {
                    let err = CheckError::from(err);
                    self.emit(&SmokeEvent::CaseFailed {
                        example: example.name().to_string(),
                        stage: err.stage().as_str().to_string(),
                        message: err.to_string(),
                    });
                    CaseOutcome::from_result(example.name(), &Err(err), updates, None)
                }
            };
            cases.push(outcome.with_duration(case_started.elapsed()));
        }
        let report = SuiteReport::new(cases, started.elapsed());
        tracing::info!(
            passed = report.passed(),
            failed = report.failed(),
            total = report.cases().len(),
            "suite finished"
        );
        report
    }

    /// Runs the lifecycle steps of one check.
    fn drive(
        &self,
        example: &Example,
        area: &WorkArea,
        updates: NonZeroU32,
    ) -> Result<CheckSummary, CheckError> {
        let app_id = self.options.app_ids.resolve(example).map_err(|source| CheckError::Resolve {
            example: example.name().to_string(),
            source,
        })?;
        let receipt = self.build(example, area)?;
        let mut app = self.launch(&receipt, &app_id)?;
        app.start().map_err(|source| CheckError::Start {
            app_id: app_id.clone(),
            source,
        })?;
        self.emit(&SmokeEvent::AppStarted {
            example: example.name().to_string(),
            app_id: app_id.to_string(),
        });
        for tick in 1..=updates.get() {
            app.update().map_err(|source| CheckError::Update {
                app_id: app_id.clone(),
                tick,
                source,
            })?;
            self.emit(&SmokeEvent::UpdateCompleted {
                example: example.name().to_string(),
                tick,
            });
        }
        drop(app);
        Ok(CheckSummary {
            example: example.name().to_string(),
            app_id,
            updates: updates.get(),
            duration: Duration::ZERO,
        })
    }

    /// Forwards an event to the sink, logging sink failures.
    fn emit(&self, event: &SmokeEvent) {
        if let Err(err) = self.events.record(event) {
            tracing::warn!(error = %err, "event sink rejected event");
        }
    }
}

/// Converts a duration to whole milliseconds, saturating.
pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
