//! Domain entities: harness steps, step reports and the smoke plan

use std::fmt;
use std::path::PathBuf;

/// A single build-tool invocation the harness knows how to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Compile check of the whole crate (`cargo check`).
    Check,
    /// Library unit tests (`cargo test --lib`).
    UnitTests,
    /// Compile-only pass of the integration suite; the tests are never run.
    IntegrationCompile { target: String },
    /// Build and run the throwaway validation probe.
    ValidateProbe { target: String },
}

impl Step {
    /// Human-readable label used in progress and summary lines.
    pub fn label(&self) -> &'static str {
        match self {
            Step::Check => "compile check",
            Step::UnitTests => "library tests",
            Step::IntegrationCompile { .. } => "integration test compile",
            Step::ValidateProbe { .. } => "validation probe",
        }
    }

    /// Arguments passed to the build tool for this step.
    pub fn cargo_args(&self) -> Vec<String> {
        match self {
            Step::Check => vec!["check".into()],
            Step::UnitTests => vec!["test".into(), "--lib".into()],
            Step::IntegrationCompile { target } => vec![
                "test".into(),
                "--test".into(),
                target.clone(),
                "--no-run".into(),
            ],
            Step::ValidateProbe { target } => vec![
                "test".into(),
                "--test".into(),
                target.clone(),
                "--".into(),
                "--nocapture".into(),
            ],
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of running one step to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: Step,
    pub success: bool,
    /// Exit code of the child; `None` when it was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// How a failing step affects the smoke sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Failure stops the sequence and fails the run.
    Fatal,
    /// Failure is reported as a warning and the sequence continues.
    Tolerated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeStep {
    pub step: Step,
    pub severity: Severity,
}

/// The fixed, ordered smoke sequence run by `quick`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokePlan {
    pub steps: Vec<SmokeStep>,
}

impl SmokePlan {
    /// Compile check, then library tests (tolerated), then integration compile.
    pub fn standard(integration_target: &str) -> Self {
        Self {
            steps: vec![
                SmokeStep {
                    step: Step::Check,
                    severity: Severity::Fatal,
                },
                SmokeStep {
                    step: Step::UnitTests,
                    severity: Severity::Tolerated,
                },
                SmokeStep {
                    step: Step::IntegrationCompile {
                        target: integration_target.to_string(),
                    },
                    severity: Severity::Fatal,
                },
            ],
        }
    }
}

/// Outcome of a smoke run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmokeReport {
    /// Reports of the steps that actually ran, in order.
    pub reports: Vec<StepReport>,
    /// One entry per tolerated failure.
    pub warnings: Vec<String>,
    /// The fatal step that stopped the run, if any.
    pub fatal: Option<Step>,
}

impl SmokeReport {
    pub fn is_success(&self) -> bool {
        self.fatal.is_none()
    }
}

/// Outcome of `validate`: the probe run plus what happened to its scratch file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub report: StepReport,
    pub scratch_file: PathBuf,
    pub cleaned_up: bool,
}

/// Expand `~`, `$VAR` and `${VAR}`; leaves the input untouched on failure.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
