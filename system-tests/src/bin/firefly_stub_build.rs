// system-tests/src/bin/firefly_stub_build.rs
// ============================================================================
// Module: Firefly Stub Build Tool
// Description: Stand-in for the SDK build command used by system-tests.
// Purpose: Install scripted artifacts into a work area VFS.
// Dependencies: clap, system-tests
// ============================================================================

//! Stub build tool: `firefly_stub_build --vfs <vfs> build <root>`.

use std::io::Write;
use std::process::ExitCode;

use system_tests::stub::BUILD_FAILURE_CODE;
use system_tests::stub::BuildArgs;
use system_tests::stub::BuildCommand;
use system_tests::stub::StubError;
use system_tests::stub::build_example;
use system_tests::stub::parse_args;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = writeln!(std::io::stderr(), "firefly_stub_build: {err}");
            match err {
                StubError::Build(_) => ExitCode::from(BUILD_FAILURE_CODE),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

/// Parses arguments and builds the example.
fn run() -> Result<(), StubError> {
    let args: BuildArgs = parse_args(std::env::args_os())?;
    let BuildCommand::Build {
        root,
    } = args.command;
    let id = build_example(&args.vfs, &root)?;
    let _ = writeln!(std::io::stdout(), "built {id}");
    Ok(())
}
