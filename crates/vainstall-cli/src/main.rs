//! vainstall - video analytics stack installer
//!
//! Usage:
//!   vainstall                # install every component
//!   vainstall -b BXT         # install with Broxton firmware
//!   vainstall -nomsdk        # skip the Media SDK prerequisites
//!   vainstall -cvsdk         # install the legacy CV SDK
//!   vainstall --dry-run -all # print the commands without running them

mod terminal;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vainstall_core::config::{ConfigStore, ProvisionConfig};
use vainstall_core::context::ProvisionContext;
use vainstall_core::libcheck;
use vainstall_core::mode::{self, InstallMode, Invocation, ParseError};
use vainstall_core::plan::{Plan, build_plan};
use vainstall_core::privilege;
use vainstall_core::report::{ProvisionReport, StepOutcome};
use vainstall_core::runner::{CommandRunner, DryRunRunner, ShellRunner};
use vainstall_core::sequencer::Sequencer;
use vainstall_core::types::{FailurePolicy, LogLevel};

use crate::terminal::Console;

const PROGRAM: &str = "vainstall";

/// Exit code for rejected command lines.
const USAGE_EXIT: u8 = 2;

#[derive(Parser)]
#[command(name = PROGRAM)]
#[command(about = "Install the GPU video analytics stack", long_about = None)]
#[command(disable_help_flag = true)]
struct Cli {
    /// Config file (defaults to ~/.config/vainstall/vainstall.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory to clone and build in (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    workdir: Option<PathBuf>,

    /// Print the commands instead of running them
    #[arg(long)]
    dry_run: bool,

    /// Stop at the first failed step
    #[arg(long)]
    fail_fast: bool,

    /// Console verbosity (error, success, info)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    /// Summary format
    #[arg(long, default_value = "table")]
    format: OutputFormat,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Installer flag: -all, -b <target>, -nomsdk, -cvsdk or -h
    #[arg(
        value_name = "FLAG",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    legacy: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable summary
    #[default]
    Table,
    /// Machine-readable JSON report
    Json,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mode = match Invocation::parse(&cli.legacy) {
        Ok(Invocation::Help) => {
            print!("{}", mode::usage(PROGRAM));
            return Ok(ExitCode::SUCCESS);
        }
        Ok(Invocation::Run(mode)) => mode,
        Err(err) => {
            report_invalid_invocation(&err);
            return Ok(ExitCode::from(USAGE_EXIT));
        }
    };

    run(cli, mode)
}

fn report_invalid_invocation(err: &ParseError) {
    if let ParseError::NotSupported { args } = err {
        tracing::debug!(?args, "Rejected installer flags");
    }
    eprintln!("{}", err);
    eprint!("{}", mode::usage(PROGRAM));
}

/// Config from `--config` (which must exist) or the default location, with
/// command-line overrides applied.
fn load_config(cli: &Cli) -> Result<ProvisionConfig> {
    let mut config = match &cli.config {
        Some(path) => ConfigStore::from_path(path.clone()).load_required()?,
        None => ConfigStore::from_default_location()?.load()?,
    };
    if cli.fail_fast {
        config.on_failure = FailurePolicy::Abort;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    Ok(config)
}

fn run(cli: Cli, mode: InstallMode) -> Result<ExitCode> {
    if !cli.dry_run
        && let Err(err) = privilege::ensure_privileged()
    {
        tracing::debug!(?err, "Privilege check failed");
        eprintln!("{}", err);
        return Ok(ExitCode::FAILURE);
    }

    let config = load_config(&cli)?;
    let ctx = ProvisionContext::from_environment(config, cli.workdir.clone())?;
    let mut console = Console::new(ctx.config().log_level);
    if matches!(cli.format, OutputFormat::Json) {
        console = console.on_stderr();
    }

    console.info(&format!("Working directory: {}", ctx.work_dir().display()));
    match &mode {
        InstallMode::BuildTarget(target) => {
            console.info(&format!("BUILD_TARGET={}", target));
        }
        InstallMode::NoMsdk => {
            console.info("Skip prerequisites installation for MediaSDK interop tutorials");
        }
        InstallMode::LegacyCvsdk => console.info("Install legacy CVSDK package"),
        InstallMode::All => {}
    }

    let plan = build_plan(&mode, &ctx)?;
    let policy = ctx.config().on_failure;

    let mut report = match (cli.dry_run, cli.format) {
        (true, OutputFormat::Json) => {
            execute(DryRunRunner::new(std::io::stderr()), policy, &plan, &mut console)
        }
        (true, OutputFormat::Table) => {
            execute(DryRunRunner::new(std::io::stdout()), policy, &plan, &mut console)
        }
        (false, _) => execute(ShellRunner::new(), policy, &plan, &mut console),
    };

    if !cli.dry_run {
        report.missing_libraries = libcheck::missing_libraries(&mode, &ctx);
    }

    print_report(&cli, &console, &report)?;

    if report.aborted {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn execute<R: CommandRunner>(
    runner: R,
    policy: FailurePolicy,
    plan: &Plan,
    console: &mut Console,
) -> ProvisionReport {
    Sequencer::new(runner, policy).run(plan, console)
}

fn print_report(cli: &Cli, console: &Console, report: &ProvisionReport) -> Result<()> {
    match cli.format {
        OutputFormat::Table => {
            for lib in &report.missing_libraries {
                console.warning(&format!("{} not found on the library search path", lib));
            }
            for step in report.failures() {
                if let StepOutcome::Failed { exit_code, .. } = &step.outcome {
                    console.error(&format!("{} (exit {:?})", step.label, exit_code));
                }
            }
            println!("{}", "*".repeat(72));
            println!(
                "   {} succeeded, {} skipped, {} failed{}",
                report.succeeded_count(),
                report.skipped_count(),
                report.failed_count(),
                if report.aborted { " (aborted)" } else { "" }
            );
            if report.failed_count() == 0 {
                println!(
                    "   Environment Setup is done, start to compile video analytics example !!!"
                );
            }
            println!("{}", "*".repeat(72));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
    }
    Ok(())
}
