// system-tests/tests/suites/sdk_examples.rs
// ============================================================================
// Module: Live SDK Example Tests
// Description: Runs the smoke suite against a real SDK checkout.
// Purpose: Ensure shipped examples build and run with the real toolchain.
// Dependencies: system-tests helpers, firefly-smoke-config, firefly-smoke-core
// ============================================================================

//! Live SDK checks. These skip unless an SDK checkout is configured and its
//! build and runtime tools are installed.

use firefly_smoke_config::SmokeConfig;
use firefly_smoke_core::SmokeHarness;
use firefly_smoke_core::TRIANGLE_EXAMPLE;
use helpers::artifacts::TestReporter;
use helpers::tool_probe;

use crate::helpers;

/// Loads the default tool configuration pointed at `sdk_root`.
fn live_config(reporter: &TestReporter) -> Result<Option<SmokeConfig>, Box<dyn std::error::Error>> {
    let Some(sdk_root) = reporter.config().sdk_root.clone() else {
        return Ok(None);
    };
    let mut config = SmokeConfig::default();
    config.sdk.root = Some(sdk_root);
    config.run.work_root = Some(reporter.artifacts().work_root()?);
    config.run.keep_work_areas = reporter.config().keep_work_areas;
    if let Some(updates) = reporter.config().updates {
        config.run.updates = updates.get();
    }
    config.validate()?;
    Ok(Some(config))
}

/// Returns a skip reason when a required tool is missing.
fn missing_tool(config: &SmokeConfig) -> Option<String> {
    [&config.build.program, &config.runtime.program]
        .into_iter()
        .find_map(|program| tool_probe::probe(program).err().map(|reason| format!("{program}: {reason}")))
}

#[test]
fn live_sdk_examples_pass() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("live_sdk_examples_pass")?;
    let Some(config) = live_config(&reporter)? else {
        reporter.skip("FIREFLY_SMOKE_SYSTEM_TEST_SDK_ROOT is not set".to_string())?;
        return Ok(());
    };
    if let Some(reason) = missing_tool(&config) {
        reporter.skip(reason)?;
        return Ok(());
    }
    let catalog = config.discover_examples()?;
    let harness = SmokeHarness::new(config.process_backend()?).with_options(config.harness_options());

    let report = harness.run_suite(catalog.examples(), config.updates());

    let artifacts = reporter.artifacts().write_report(&report)?;
    if !report.is_success() {
        let failures: Vec<String> = report
            .failures()
            .map(|case| format!("{}: {}", case.example, case.message.as_deref().unwrap_or_default()))
            .collect();
        reporter.finish("fail", failures.clone(), artifacts)?;
        return Err(format!("live SDK examples failed: {failures:?}").into());
    }
    reporter.finish("pass", vec![format!("{} examples passed", report.passed())], artifacts)?;
    Ok(())
}

#[test]
fn live_sdk_triangle_passes() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("live_sdk_triangle_passes")?;
    let Some(config) = live_config(&reporter)? else {
        reporter.skip("FIREFLY_SMOKE_SYSTEM_TEST_SDK_ROOT is not set".to_string())?;
        return Ok(());
    };
    if let Some(reason) = missing_tool(&config) {
        reporter.skip(reason)?;
        return Ok(());
    }
    let catalog = config.discover_examples()?;
    let harness = SmokeHarness::new(config.process_backend()?).with_options(config.harness_options());
    let example = catalog.get(TRIANGLE_EXAMPLE)?;
    let area = harness.new_work_area(example)?;

    let summary = harness.run_triangle_example_check(&catalog, &area)?;

    reporter.finish(
        "pass",
        vec![format!("{} ran {} updates", summary.app_id, summary.updates)],
        Vec::new(),
    )?;
    Ok(())
}
