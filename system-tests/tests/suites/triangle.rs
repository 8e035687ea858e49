// system-tests/tests/suites/triangle.rs
// ============================================================================
// Module: Triangle Check Tests
// Description: Runs the dedicated triangle check against stub tools.
// Purpose: Ensure the triangle check performs two updates in a fresh area.
// Dependencies: system-tests helpers, firefly-smoke-core, tempfile
// ============================================================================

//! Triangle check system tests.

use std::fs;

use firefly_smoke_core::CheckError;
use firefly_smoke_core::ExampleCatalog;
use firefly_smoke_core::SmokeEvent;
use firefly_smoke_core::TRIANGLE_EXAMPLE;
use helpers::artifacts::TestReporter;
use helpers::stubs::SDK_FIXTURE;
use helpers::stubs::StubHarness;
use helpers::stubs::fixture_sdk;
use helpers::stubs::stub_config;

use crate::helpers;

#[test]
fn triangle_check_runs_two_updates() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("triangle_check_runs_two_updates")?;
    let config = stub_config(&fixture_sdk(SDK_FIXTURE), &reporter)?;
    let catalog = config.discover_examples()?;
    let stub = StubHarness::new(&config)?;
    let example = catalog.get(TRIANGLE_EXAMPLE)?;
    let area = stub.harness.new_work_area(example)?;

    let summary = stub.harness.run_triangle_example_check(&catalog, &area)?;

    if summary.updates != 2 || summary.app_id.to_string() != "demo.go-triangle" {
        return Err(format!("unexpected summary {summary:?}").into());
    }
    let ticks: Vec<u32> = stub
        .events
        .events()
        .iter()
        .filter_map(|event| match event {
            SmokeEvent::UpdateCompleted {
                tick, ..
            } => Some(*tick),
            _ => None,
        })
        .collect();
    if ticks != [1, 2] {
        return Err(format!("unexpected update ticks {ticks:?}").into());
    }
    let logs: Vec<_> = fs::read_dir(area.logs())?.filter_map(Result::ok).map(|e| e.file_name()).collect();
    reporter.finish("pass", vec![format!("logs: {logs:?}")], Vec::new())?;
    Ok(())
}

#[test]
fn triangle_check_requires_triangle_example() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("triangle_check_requires_triangle_example")?;
    let sdk = tempfile::tempdir()?;
    let other = sdk.path().join("_examples").join("sprite");
    fs::create_dir_all(&other)?;
    fs::write(other.join("main.go"), "package main\n")?;
    let config = stub_config(sdk.path(), &reporter)?;
    let catalog = ExampleCatalog::discover(sdk.path())?;
    let stub = StubHarness::new(&config)?;
    let example = catalog.get("sprite")?;
    let area = stub.harness.new_work_area(example)?;

    match stub.harness.run_triangle_example_check(&catalog, &area) {
        Err(CheckError::Discovery(err)) if err.to_string().contains("triangle") => {}
        other => return Err(format!("expected discovery failure, got {other:?}").into()),
    }
    if stub.count_events("build_completed") != 0 {
        return Err("nothing should build without a triangle example".into());
    }
    reporter.finish("pass", vec!["missing triangle rejected".to_string()], Vec::new())?;
    Ok(())
}

#[test]
fn triangle_example_name_is_configurable() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("triangle_example_name_is_configurable")?;
    let mut config = stub_config(&fixture_sdk(SDK_FIXTURE), &reporter)?;
    config.run.triangle_example = "text".to_string();
    config.run.triangle_updates = 4;
    let catalog = config.discover_examples()?;
    let stub = StubHarness::new(&config)?;
    let example = catalog.get(&config.run.triangle_example)?;

    let report = stub.harness.run_suite(std::slice::from_ref(example), config.triangle_updates());

    let case = report.cases().first().ok_or("no case recorded")?;
    if !case.passed() || case.example != "text" || case.updates_completed != 4 {
        return Err(format!("unexpected case {case:?}").into());
    }
    let artifacts = reporter.artifacts().write_report(&report)?;
    reporter.finish("pass", vec!["configured triangle example ran".to_string()], artifacts)?;
    Ok(())
}
