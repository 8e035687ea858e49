// crates/firefly-smoke-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and `config example`.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `firefly-smoke.toml`. Every key is shown with its
//! default so the output doubles as a reference.

/// Returns a canonical example `firefly-smoke.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[sdk]
# SDK checkout; defaults to the current directory.
root = "."
examples_dir = "_examples"

[build]
# {vfs} is the work area VFS, {root} the example directory.
program = "firefly_cli"
args = ["--vfs", "{vfs}", "build", "{root}"]

[runtime]
# {vfs} is the work area VFS, {id} the app id being launched.
program = "firefly-test-runtime"
args = ["--vfs", "{vfs}", "--id", "{id}"]

[run]
app_id = "demo.go-triangle"
# "manifest" reads firefly.toml and falls back to app_id; "fixed" always uses app_id.
app_id_source = "manifest"
updates = 1
triangle_updates = 2
triangle_example = "triangle"
keep_work_areas = false
# work_root = "target/firefly-smoke/work"
# report_dir = "target/firefly-smoke/report"
# event_log = "target/firefly-smoke/events.jsonl"
"#,
    )
}
