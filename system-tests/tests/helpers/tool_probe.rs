// system-tests/tests/helpers/tool_probe.rs
// ============================================================================
// Module: Tool Probe
// Description: Detects SDK tools installed on the host.
// Purpose: Let live-SDK suites skip cleanly when the toolchain is absent.
// Dependencies: stdlib
// ============================================================================

#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Test helper types keep documentation concise."
)]

use std::path::PathBuf;

pub struct ToolCheck {
    pub path: PathBuf,
    pub notes: Vec<String>,
}

/// Resolves an SDK tool by running it with `--version`.
pub fn probe(program: &str) -> Result<ToolCheck, String> {
    resolve_tool(&[program], &["--version"])
}

fn resolve_tool(candidates: &[&str], args: &[&str]) -> Result<ToolCheck, String> {
    let mut notes = Vec::new();
    for candidate in candidates {
        match std::process::Command::new(candidate).args(args).output() {
            Ok(output) if output.status.success() => {
                return Ok(ToolCheck {
                    path: PathBuf::from(candidate),
                    notes,
                });
            }
            Ok(output) => {
                let message =
                    format!("{candidate} returned {}", output.status.code().unwrap_or(-1));
                notes.push(message);
            }
            Err(err) => {
                notes.push(format!("{candidate} unavailable: {err}"));
            }
        }
    }
    Err(format!("tool not available ({})", notes.join("; ")))
}
