// system-tests/tests/suites/examples.rs
// ============================================================================
// Module: Example Suite Tests
// Description: Runs the generic check over every fixture SDK example.
// Purpose: Exercise discovery, build, launch, and reporting end to end.
// Dependencies: system-tests helpers, firefly-smoke-core
// ============================================================================

//! Generic example checks against the stub SDK toolchain.

use std::fs;

use firefly_smoke_config::AppIdSourceKind;
use firefly_smoke_core::AppId;
use firefly_smoke_core::CheckStage;
use firefly_smoke_core::rom_dir;
use helpers::artifacts::TestReporter;
use helpers::stubs::SDK_FIXTURE;
use helpers::stubs::StubHarness;
use helpers::stubs::fixture_sdk;
use helpers::stubs::stub_config;
use helpers::stubs::ticks;

use crate::helpers;

#[test]
fn every_fixture_example_passes() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("every_fixture_example_passes")?;
    let config = stub_config(&fixture_sdk(SDK_FIXTURE), &reporter)?;
    let catalog = config.discover_examples()?;
    let stub = StubHarness::new(&config)?;

    let report = stub.harness.run_suite(catalog.examples(), config.updates());

    let names: Vec<&str> = report.cases().iter().map(|case| case.example.as_str()).collect();
    if names != ["sprite", "text", "triangle"] {
        return Err(format!("unexpected case order {names:?}").into());
    }
    if !report.is_success() || report.passed() != 3 {
        return Err(format!("expected all cases to pass: {:?}", report.cases()).into());
    }
    if stub.count_events("update_completed") != 3 {
        return Err("expected one update per example".into());
    }
    let artifacts = reporter.artifacts().write_report(&report)?;
    reporter.finish("pass", vec!["three fixture examples passed".to_string()], artifacts)?;
    Ok(())
}

#[test]
fn manifest_ids_select_the_launched_app() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("manifest_ids_select_the_launched_app")?;
    let config = stub_config(&fixture_sdk(SDK_FIXTURE), &reporter)?;
    let catalog = config.discover_examples()?;
    let stub = StubHarness::new(&config)?;

    let report = stub.harness.run_suite(catalog.examples(), ticks(1));

    for case in report.cases() {
        let expected = if case.example == "sprite" { "demo.go-sprite" } else { "demo.go-triangle" };
        if case.app_id.as_deref() != Some(expected) {
            return Err(format!("{} launched {:?}, expected {expected}", case.example, case.app_id).into());
        }
    }
    reporter.finish("pass", vec!["manifest ids honoured".to_string()], Vec::new())?;
    Ok(())
}

#[test]
fn fixed_app_id_misses_examples_with_other_ids() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("fixed_app_id_misses_examples_with_other_ids")?;
    let mut config = stub_config(&fixture_sdk(SDK_FIXTURE), &reporter)?;
    config.run.app_id_source = AppIdSourceKind::Fixed;
    config.run.app_id = AppId::default_demo();
    let catalog = config.discover_examples()?;
    let stub = StubHarness::new(&config)?;

    let report = stub.harness.run_suite(catalog.examples(), ticks(1));

    let sprite = report
        .cases()
        .iter()
        .find(|case| case.example == "sprite")
        .ok_or("sprite case missing")?;
    if sprite.stage != Some(CheckStage::Launch) {
        return Err(format!("sprite should fail at launch: {sprite:?}").into());
    }
    if !sprite.message.as_deref().unwrap_or_default().contains("no built artifact") {
        return Err(format!("unexpected sprite message {:?}", sprite.message).into());
    }
    if report.passed() != 2 || report.failed() != 1 {
        return Err(format!("expected 2 passes and 1 failure: {:?}", report.cases()).into());
    }
    let artifacts = reporter.artifacts().write_report(&report)?;
    reporter.finish("pass", vec!["fixed id launch miss detected".to_string()], artifacts)?;
    Ok(())
}

#[test]
fn kept_work_areas_are_isolated() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("kept_work_areas_are_isolated")?;
    let mut config = stub_config(&fixture_sdk(SDK_FIXTURE), &reporter)?;
    config.run.keep_work_areas = true;
    let catalog = config.discover_examples()?;
    let stub = StubHarness::new(&config)?;

    let report = stub.harness.run_suite(catalog.examples(), ticks(1));

    let mut roots = Vec::new();
    for case in report.cases() {
        let root = case.work_area.clone().ok_or("kept work area path missing")?;
        let vfs = std::path::Path::new(&root).join("vfs");
        let installed: Vec<_> = fs::read_dir(vfs.join("roms").join("demo"))?
            .filter_map(Result::ok)
            .map(|entry| entry.file_name())
            .collect();
        if installed.len() != 1 {
            return Err(format!("{} work area holds {installed:?}", case.example).into());
        }
        let id: AppId = case.app_id.as_deref().ok_or("app id missing")?.parse()?;
        if !rom_dir(&vfs, &id).is_dir() {
            return Err(format!("{} artifact missing from its own work area", case.example).into());
        }
        roots.push(root);
    }
    roots.sort();
    roots.dedup();
    if roots.len() != 3 {
        return Err("work areas were shared between examples".into());
    }
    reporter.finish("pass", roots, Vec::new())?;
    Ok(())
}

#[test]
fn dropped_work_areas_leave_no_residue() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("dropped_work_areas_leave_no_residue")?;
    let mut config = stub_config(&fixture_sdk(SDK_FIXTURE), &reporter)?;
    config.run.keep_work_areas = false;
    let work_root = config.run.work_root.clone().ok_or("work root unset")?;
    let catalog = config.discover_examples()?;
    let stub = StubHarness::new(&config)?;

    let report = stub.harness.run_suite(catalog.examples(), ticks(1));

    if !report.is_success() {
        return Err(format!("suite failed: {:?}", report.cases()).into());
    }
    if fs::read_dir(&work_root)?.next().is_some() {
        return Err(format!("work areas left behind in {}", work_root.display()).into());
    }
    reporter.finish("pass", vec!["work root empty after suite".to_string()], Vec::new())?;
    Ok(())
}
