// crates/firefly-smoke-cli/src/main.rs
// ============================================================================
// Module: Firefly Smoke CLI Entry Point
// Description: Command dispatcher for SDK example smoke runs.
// Purpose: Build and run SDK examples from the command line with CI-friendly output.
// Dependencies: clap, firefly-smoke-config, firefly-smoke-core, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! `firefly-smoke` loads `firefly-smoke.toml`, discovers the SDK examples, and
//! runs the build-then-run smoke check over them. Per-case verdicts go to
//! stdout; diagnostics go to stderr through `tracing`. The exit code is
//! non-zero when any case fails.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::io::Write;
use std::num::NonZeroU32;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use firefly_smoke_config::AppIdSourceKind;
use firefly_smoke_config::SmokeConfig;
use firefly_smoke_config::SmokeEnv;
use firefly_smoke_config::config_toml_example;
use firefly_smoke_core::AppId;
use firefly_smoke_core::CaseOutcome;
use firefly_smoke_core::Example;
use firefly_smoke_core::JsonlEventSink;
use firefly_smoke_core::ReportWriter;
use firefly_smoke_core::SmokeHarness;
use firefly_smoke_core::SuiteReport;
use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "firefly-smoke", version, disable_help_subcommand = true)]
struct Cli {
    /// Config file path (defaults to firefly-smoke.toml or `FIREFLY_SMOKE_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// SDK root override (takes precedence over config and environment).
    #[arg(long, value_name = "DIR", global = true)]
    sdk_root: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List discovered examples.
    List(ListCommand),
    /// Build and run every example (or a selection).
    Run(RunCommand),
    /// Build the triangle example and run it for two updates.
    Triangle(TriangleCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Output format for `list`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ListFormat {
    /// One example name per line.
    #[default]
    Text,
    /// JSON array of names and paths.
    Json,
}

/// Arguments for `list`.
#[derive(Args, Debug)]
struct ListCommand {
    /// Output format.
    #[arg(long, value_enum, default_value_t = ListFormat::Text)]
    format: ListFormat,
}

/// Harness options shared by `run` and `triangle`.
#[derive(Args, Debug, Default)]
struct HarnessArgs {
    /// App id launched after each build, or the manifest fallback.
    #[arg(long, value_name = "AUTHOR.APP")]
    app_id: Option<AppId>,
    /// Launch the app id for every example, ignoring `firefly.toml`.
    #[arg(long, action = ArgAction::SetTrue)]
    fixed_app_id: bool,
    /// Keep work areas on disk after each check.
    #[arg(long, action = ArgAction::SetTrue)]
    keep_work_areas: bool,
    /// Directory for `summary.json` and `summary.md`.
    #[arg(long, value_name = "DIR")]
    report_dir: Option<PathBuf>,
    /// JSONL lifecycle event log path.
    #[arg(long, value_name = "PATH")]
    events: Option<PathBuf>,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Example to run; repeat to select several. Runs all when omitted.
    #[arg(long = "example", value_name = "NAME")]
    examples: Vec<String>,
    /// Update ticks per example.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    updates: Option<u32>,
    /// Shared harness options.
    #[command(flatten)]
    harness: HarnessArgs,
}

/// Arguments for `triangle`.
#[derive(Args, Debug)]
struct TriangleCommand {
    /// Shared harness options.
    #[command(flatten)]
    harness: HarnessArgs,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the configuration and environment overrides.
    Validate,
    /// Print a canonical example configuration.
    Example,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Installs the stderr tracing subscriber.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(SmokeEnv::Log.as_str()).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::List(command) => {
            let config = load_config(cli.config.as_deref(), cli.sdk_root.as_deref())?;
            command_list(&config, command.format)
        }
        Commands::Run(command) => {
            let mut config = load_config(cli.config.as_deref(), cli.sdk_root.as_deref())?;
            apply_run_args(&mut config, &command)?;
            command_run(&config, &command.examples)
        }
        Commands::Triangle(command) => {
            let mut config = load_config(cli.config.as_deref(), cli.sdk_root.as_deref())?;
            apply_harness_args(&mut config, &command.harness)?;
            command_triangle(&config)
        }
        Commands::Config {
            command: ConfigCommand::Validate,
        } => command_config_validate(cli.config.as_deref(), cli.sdk_root.as_deref()),
        Commands::Config {
            command: ConfigCommand::Example,
        } => command_config_example(),
    }
}

// ============================================================================
// SECTION: Config Resolution
// ============================================================================

/// Loads configuration and applies the global SDK root override.
fn load_config(path: Option<&Path>, sdk_root: Option<&Path>) -> CliResult<SmokeConfig> {
    let mut config = SmokeConfig::load(path)
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    if let Some(root) = sdk_root {
        config.sdk.root = Some(root.to_path_buf());
        config.validate().map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    }
    Ok(config)
}

/// Applies shared harness flags to `config`.
fn apply_harness_args(config: &mut SmokeConfig, args: &HarnessArgs) -> CliResult<()> {
    if let Some(id) = &args.app_id {
        config.run.app_id = id.clone();
    }
    if args.fixed_app_id {
        config.run.app_id_source = AppIdSourceKind::Fixed;
    }
    if args.keep_work_areas {
        config.run.keep_work_areas = true;
    }
    if let Some(dir) = &args.report_dir {
        config.run.report_dir = Some(dir.clone());
    }
    if let Some(path) = &args.events {
        config.run.event_log = Some(path.clone());
    }
    config.validate().map_err(|err| CliError::new(err.to_string()))
}

/// Applies `run` flags to `config`.
fn apply_run_args(config: &mut SmokeConfig, command: &RunCommand) -> CliResult<()> {
    if let Some(updates) = command.updates {
        config.run.updates = updates;
    }
    apply_harness_args(config, &command.harness)
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// JSON entry printed by `list --format json`.
#[derive(Debug, Serialize)]
struct ListedExample {
    /// Example name.
    name: String,
    /// Example directory.
    path: String,
}

/// Executes `list`.
fn command_list(config: &SmokeConfig, format: ListFormat) -> CliResult<ExitCode> {
    let catalog = config.discover_examples().map_err(|err| CliError::new(err.to_string()))?;
    match format {
        ListFormat::Text => {
            for example in catalog.examples() {
                write_stdout_line(example.name()).map_err(|err| output_error("stdout", &err))?;
            }
        }
        ListFormat::Json => {
            let listed: Vec<ListedExample> = catalog
                .examples()
                .iter()
                .map(|example| ListedExample {
                    name: example.name().to_string(),
                    path: example.path().display().to_string(),
                })
                .collect();
            let json = serde_json::to_string(&listed)
                .map_err(|err| CliError::new(format!("failed to render examples: {err}")))?;
            write_stdout_line(&json).map_err(|err| output_error("stdout", &err))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes `run`.
fn command_run(config: &SmokeConfig, names: &[String]) -> CliResult<ExitCode> {
    let catalog = config.discover_examples().map_err(|err| CliError::new(err.to_string()))?;
    let examples = catalog.select(names).map_err(|err| CliError::new(err.to_string()))?;
    run_cases(config, &examples, config.updates())
}

/// Executes `triangle`.
fn command_triangle(config: &SmokeConfig) -> CliResult<ExitCode> {
    let catalog = config.discover_examples().map_err(|err| CliError::new(err.to_string()))?;
    let example = catalog
        .get(&config.run.triangle_example)
        .map_err(|err| CliError::new(err.to_string()))?
        .clone();
    run_cases(config, &[example], config.triangle_updates())
}

/// Runs a suite, prints verdicts, and writes the configured artifacts.
fn run_cases(
    config: &SmokeConfig,
    examples: &[Example],
    updates: NonZeroU32,
) -> CliResult<ExitCode> {
    let backend = config.process_backend().map_err(|err| CliError::new(err.to_string()))?;
    let mut harness = SmokeHarness::new(backend).with_options(config.harness_options());
    if let Some(path) = &config.run.event_log {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                CliError::new(format!("failed to create {}: {err}", parent.display()))
            })?;
        }
        let file = File::create(path)
            .map_err(|err| CliError::new(format!("failed to open {}: {err}", path.display())))?;
        harness = harness.with_events(Arc::new(JsonlEventSink::new(file)));
    }
    tracing::info!(
        examples = examples.len(),
        updates = updates.get(),
        sdk_root = %config.sdk_root().display(),
        "starting smoke run"
    );
    let report = harness.run_suite(examples, updates);
    for case in report.cases() {
        write_stdout_line(&render_case_line(case)).map_err(|err| output_error("stdout", &err))?;
    }
    if let Some(dir) = &config.run.report_dir {
        ReportWriter::new(dir)
            .write(&report)
            .map_err(|err| CliError::new(format!("failed to write report: {err}")))?;
    }
    write_stdout_line(&render_totals(&report)).map_err(|err| output_error("stdout", &err))?;
    if report.is_success() { Ok(ExitCode::SUCCESS) } else { Ok(ExitCode::FAILURE) }
}

/// Executes `config validate`.
fn command_config_validate(path: Option<&Path>, sdk_root: Option<&Path>) -> CliResult<ExitCode> {
    let _config = load_config(path, sdk_root)?;
    write_stdout_line("config ok").map_err(|err| output_error("stdout", &err))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `config example`.
fn command_config_example() -> CliResult<ExitCode> {
    let mut stdout = std::io::stdout();
    stdout
        .write_all(config_toml_example().as_bytes())
        .map_err(|err| output_error("stdout", &err))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders one case verdict line.
fn render_case_line(case: &CaseOutcome) -> String {
    let app_id = case.app_id.as_deref().map(|id| format!(" ({id})")).unwrap_or_default();
    match &case.message {
        None => format!("PASS {}{app_id} [{} ms]", case.example, case.duration_ms),
        Some(message) => format!("FAIL {}{app_id}: {message}", case.example),
    }
}

/// Renders the suite totals line.
fn render_totals(report: &SuiteReport) -> String {
    let total = report.cases().len();
    if total == 0 {
        return "no examples ran".to_string();
    }
    format!("{} passed, {} failed, {total} total", report.passed(), report.failed())
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure.
fn output_error(stream: &str, error: &std::io::Error) -> CliError {
    CliError::new(format!("failed to write {stream}: {error}"))
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
