// system-tests/src/bin/firefly_stub_runtime.rs
// ============================================================================
// Module: Firefly Stub Runtime
// Description: Stand-in for the SDK app runtime used by system-tests.
// Purpose: Serve driver requests with scripted start/update failures.
// Dependencies: clap, system-tests
// ============================================================================

//! Stub runtime: `firefly_stub_runtime --vfs <vfs> --id <author.app>`.

use std::io::Write;
use std::process::ExitCode;

use system_tests::stub::CRASH_CODE;
use system_tests::stub::RuntimeArgs;
use system_tests::stub::ServeExit;
use system_tests::stub::StubError;
use system_tests::stub::load_artifact;
use system_tests::stub::parse_args;
use system_tests::stub::serve;

fn main() -> ExitCode {
    match run() {
        Ok(ServeExit::Crash) => {
            let _ = writeln!(std::io::stderr(), "firefly_stub_runtime: scripted crash");
            ExitCode::from(CRASH_CODE)
        }
        Ok(ServeExit::Shutdown | ServeExit::Eof) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = writeln!(std::io::stderr(), "firefly_stub_runtime: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Loads the artifact for the requested app and serves stdin.
fn run() -> Result<ServeExit, StubError> {
    let args: RuntimeArgs = parse_args(std::env::args_os())?;
    let behavior = load_artifact(&args.vfs, &args.id)?;
    let stdin = std::io::stdin();
    let mut reader = stdin.lock();
    let mut writer = std::io::stdout().lock();
    serve(behavior, &mut reader, &mut writer)
}
