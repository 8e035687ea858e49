// system-tests/tests/suites/faults.rs
// ============================================================================
// Module: Failure Mode Tests
// Description: Runs the suite over examples that break at each stage.
// Purpose: Ensure failures are attributed to the right stage and isolated.
// Dependencies: system-tests helpers, firefly-smoke-core
// ============================================================================

//! Failure attribution system tests over the faulty fixture SDK.

use std::fs;

use firefly_smoke_core::CaseOutcome;
use firefly_smoke_core::CheckStage;
use firefly_smoke_core::SuiteReport;
use helpers::artifacts::TestReporter;
use helpers::stubs::FAULTY_FIXTURE;
use helpers::stubs::StubHarness;
use helpers::stubs::fixture_sdk;
use helpers::stubs::stub_config;
use helpers::stubs::ticks;

use crate::helpers;

fn case<'a>(report: &'a SuiteReport, name: &str) -> Result<&'a CaseOutcome, String> {
    report
        .cases()
        .iter()
        .find(|case| case.example == name)
        .ok_or_else(|| format!("case {name} missing"))
}

fn expect_failure(
    report: &SuiteReport,
    name: &str,
    stage: CheckStage,
    needle: &str,
) -> Result<(), String> {
    let outcome = case(report, name)?;
    if outcome.passed() || outcome.stage != Some(stage) {
        return Err(format!("{name} should fail at {}: {outcome:?}", stage.as_str()));
    }
    let message = outcome.message.as_deref().unwrap_or_default();
    if !message.contains(needle) {
        return Err(format!("{name} message {message:?} lacks {needle:?}"));
    }
    Ok(())
}

#[test]
fn faulty_suite_attributes_each_stage() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("faulty_suite_attributes_each_stage")?;
    let config = stub_config(&fixture_sdk(FAULTY_FIXTURE), &reporter)?;
    let catalog = config.discover_examples()?;
    let stub = StubHarness::new(&config)?;

    let report = stub.harness.run_suite(catalog.examples(), ticks(3));

    let names: Vec<&str> = report.cases().iter().map(|case| case.example.as_str()).collect();
    if names != ["broken_build", "crash", "no_sources", "panic_start", "panic_update", "triangle"] {
        return Err(format!("suite stopped early or reordered: {names:?}").into());
    }
    expect_failure(&report, "broken_build", CheckStage::Build, "undefined: firefly.Bot")?;
    expect_failure(&report, "no_sources", CheckStage::Build, "no .go sources")?;
    expect_failure(&report, "panic_start", CheckStage::Start, "panic in start")?;
    expect_failure(&report, "panic_update", CheckStage::Update, "panic in update 2")?;
    expect_failure(&report, "crash", CheckStage::Update, "runtime exited unexpectedly")?;
    if !case(&report, "triangle")?.passed() {
        return Err("triangle should pass despite earlier failures".into());
    }
    if report.is_success() || report.passed() != 1 || report.failed() != 5 {
        return Err("suite verdict must reflect the failures".into());
    }
    let artifacts = reporter.artifacts().write_report(&report)?;
    reporter.finish("pass", vec!["five failures attributed".to_string()], artifacts)?;
    Ok(())
}

#[test]
fn update_failures_record_the_failing_tick() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("update_failures_record_the_failing_tick")?;
    let config = stub_config(&fixture_sdk(FAULTY_FIXTURE), &reporter)?;
    let catalog = config.discover_examples()?;
    let stub = StubHarness::new(&config)?;
    let selected = catalog.select(&["panic_update", "crash"])?;

    let report = stub.harness.run_suite(&selected, ticks(3));

    let panic_update = case(&report, "panic_update")?;
    if panic_update.tick != Some(2) || panic_update.updates_completed != 1 {
        return Err(format!("unexpected panic_update outcome {panic_update:?}").into());
    }
    let crash = case(&report, "crash")?;
    if crash.tick != Some(1) || crash.updates_completed != 0 {
        return Err(format!("unexpected crash outcome {crash:?}").into());
    }
    reporter.finish("pass", vec!["failing ticks recorded".to_string()], Vec::new())?;
    Ok(())
}

#[test]
fn build_failures_never_launch() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("build_failures_never_launch")?;
    let mut config = stub_config(&fixture_sdk(FAULTY_FIXTURE), &reporter)?;
    config.run.keep_work_areas = true;
    let catalog = config.discover_examples()?;
    let stub = StubHarness::new(&config)?;
    let selected = catalog.select(&["broken_build"])?;

    let report = stub.harness.run_suite(&selected, ticks(1));

    if stub.count_events("app_launched") != 0 {
        return Err("a failed build must not launch".into());
    }
    let outcome = case(&report, "broken_build")?;
    let root = outcome.work_area.clone().ok_or("kept work area missing")?;
    let stderr = fs::read_to_string(std::path::Path::new(&root).join("logs").join("build.stderr.log"))?;
    if !stderr.contains("undefined: firefly.Bot") {
        return Err(format!("build stderr not captured: {stderr:?}").into());
    }
    if std::path::Path::new(&root).join("vfs").join("roms").exists() {
        return Err("failed build left artifacts behind".into());
    }
    reporter.finish("pass", vec![format!("work area kept at {root}")], Vec::new())?;
    Ok(())
}
