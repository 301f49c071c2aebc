//! Command dispatch: maps each subcommand to harness operations and output

use std::io;
use std::path::PathBuf;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::HarnessService;
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::Settings;
use crate::domain::{drive_folder_id, StepReport};
use crate::exitcode;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Report a clap parse failure and return the exit code to use.
///
/// Help and version requests succeed; an unrecognized subcommand is named
/// explicitly; every other parse error is a usage failure.
pub fn report_parse_error(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            let _ = err.print();
            exitcode::OK
        }
        ErrorKind::InvalidSubcommand => {
            let name = match err.get(ContextKind::InvalidSubcommand) {
                Some(ContextValue::String(name)) => name.clone(),
                _ => String::from("?"),
            };
            output::error(&format!("unknown command: {name}"));
            eprintln!("Run 'report-harness help' for usage.");
            exitcode::FAILURE
        }
        _ => {
            let _ = err.print();
            exitcode::FAILURE
        }
    }
}

/// Execute the parsed command line.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    if let Some(shell) = cli.completions {
        print_completions(shell);
        return Ok(());
    }

    let Some(command) = &cli.command else {
        Cli::command()
            .print_help()
            .map_err(|e| InfraError::io("print help", e))?;
        return Ok(());
    };

    let project_dir = resolve_project_dir(cli.project_dir.as_ref())?;
    let settings = Settings::load(Some(project_dir.as_path()))?;
    debug!("settings: {:?}", settings);

    let container = ServiceContainer::new(settings, project_dir);
    let service = container.harness_service();
    service.ensure_manifest()?;

    match command {
        Commands::Check => cmd_check(&service),
        Commands::Unit => cmd_unit(&service),
        Commands::Integration => cmd_integration(&service),
        Commands::Validate { url } => cmd_validate(&service, url.as_deref()),
        Commands::Quick => cmd_quick(&service),
    }
}

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn resolve_project_dir(dir: Option<&PathBuf>) -> CliResult<PathBuf> {
    match dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| InfraError::io("get current directory", e).into()),
    }
}

/// Print the outcome of a single step; failures echo the child's diagnostics.
fn finish_step(report: &StepReport, ok_msg: &str, fail_msg: &str) -> CliResult<()> {
    if report.success {
        output::success(ok_msg);
        Ok(())
    } else {
        output::passthrough(&report.stdout);
        output::passthrough_err(&report.stderr);
        Err(CliError::StepFailed(fail_msg.to_string()))
    }
}

#[instrument(skip(service))]
fn cmd_check(service: &HarnessService) -> CliResult<()> {
    output::header("Checking compilation...");
    let report = service.check()?;
    finish_step(&report, "Compilation succeeded", "compilation failed")
}

#[instrument(skip(service))]
fn cmd_unit(service: &HarnessService) -> CliResult<()> {
    output::header("Running library tests...");
    let report = service.unit_tests()?;
    if report.success {
        output::passthrough(&report.stdout);
    }
    finish_step(&report, "Library tests passed", "library tests failed")
}

#[instrument(skip(service))]
fn cmd_integration(service: &HarnessService) -> CliResult<()> {
    output::header(&format!(
        "Compiling integration tests ({})...",
        service.settings().integration_target
    ));
    let report = service.integration_compile()?;
    finish_step(
        &report,
        "Integration tests compiled (not run)",
        "integration tests failed to compile",
    )
}

#[instrument(skip(service))]
fn cmd_validate(service: &HarnessService, url: Option<&str>) -> CliResult<()> {
    let url = url
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| {
            CliError::Usage("missing url: usage: report-harness validate <url>".into())
        })?;

    output::header(&format!("Validating deliverable: {url}"));
    if let Some(folder_id) = drive_folder_id(url).map_err(ApplicationError::from)? {
        output::detail(&format!("folder id (from url): {folder_id}"));
    }

    let outcome = service.validate(url)?;
    if !outcome.cleaned_up {
        output::warning(&format!(
            "could not remove scratch probe {}",
            outcome.scratch_file.display()
        ));
    }

    let report = &outcome.report;
    if report.success {
        output::passthrough(&report.stdout);
    }
    finish_step(
        report,
        "Validation probe ran",
        "validation probe failed to build or run",
    )
}

#[instrument(skip(service))]
fn cmd_quick(service: &HarnessService) -> CliResult<()> {
    output::header("Running quick smoke sequence...");
    output::detail(&format!(
        "sample deliverable url: {} (use 'validate <url>' to check it)",
        service.settings().sample_url
    ));

    let smoke = service.quick()?;
    for report in &smoke.reports {
        if report.success {
            output::success_detail(report.step.label());
        } else {
            output::failure(report.step.label());
        }
    }
    for warning in &smoke.warnings {
        output::warning(warning);
    }

    match &smoke.fatal {
        None => {
            output::success("Smoke sequence passed");
            Ok(())
        }
        Some(step) => {
            if let Some(last) = smoke.reports.last() {
                output::passthrough(&last.stdout);
                output::passthrough_err(&last.stderr);
            }
            Err(CliError::StepFailed(format!("{step} failed")))
        }
    }
}
