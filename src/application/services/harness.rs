//! Harness service: runs build-tool steps against a project
//!
//! Every step is a single blocking invocation of the build tool in the
//! project directory. Steps report success or failure as data; only a
//! failure to start the build tool at all is an error.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{
    render_probe, scratch_target_name, DomainError, Severity, SmokePlan, SmokeReport, Step,
    StepReport, ValidationOutcome,
};
use crate::infrastructure::traits::{CommandRunner, FileSystem};

/// Orchestrates compile checks, test runs and validation probes.
pub struct HarnessService {
    fs: Arc<dyn FileSystem>,
    cmd: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
    project_dir: PathBuf,
}

impl HarnessService {
    /// Create a new harness service for `project_dir`.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        settings: Arc<Settings>,
        project_dir: PathBuf,
    ) -> Self {
        Self {
            fs,
            cmd,
            settings,
            project_dir,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.project_dir.join(&self.settings.manifest)
    }

    /// Fail unless the build manifest exists in the project directory.
    pub fn ensure_manifest(&self) -> ApplicationResult<()> {
        let manifest = self.manifest_path();
        debug!("ensure_manifest: {}", manifest.display());
        if self.fs.is_file(&manifest) {
            Ok(())
        } else {
            Err(ApplicationError::ManifestMissing {
                manifest: self.settings.manifest.clone(),
                dir: self.project_dir.clone(),
            })
        }
    }

    /// Run one step to completion and capture its outcome.
    pub fn run_step(&self, step: &Step) -> ApplicationResult<StepReport> {
        let args = step.cargo_args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        info!("run_step: {} ({} {})", step, self.settings.cargo, args.join(" "));

        let output = self
            .cmd
            .run(&self.settings.cargo, &args, &self.project_dir)
            .with_spawn_context(&self.settings.cargo, &args)?;

        let report = StepReport {
            step: step.clone(),
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(
            "run_step: {} success={} exit_code={:?}",
            step, report.success, report.exit_code
        );
        Ok(report)
    }

    /// Compile check of the project.
    pub fn check(&self) -> ApplicationResult<StepReport> {
        self.run_step(&Step::Check)
    }

    /// Library unit tests.
    pub fn unit_tests(&self) -> ApplicationResult<StepReport> {
        self.run_step(&Step::UnitTests)
    }

    /// Compile the integration suite without running it.
    pub fn integration_compile(&self) -> ApplicationResult<StepReport> {
        self.run_step(&self.integration_step())
    }

    fn integration_step(&self) -> Step {
        Step::IntegrationCompile {
            target: self.settings.integration_target.clone(),
        }
    }

    /// Generate a throwaway probe calling the validator with `url`, run it,
    /// and remove it again.
    ///
    /// A rejected deliverable is still a successful run; the probe prints the
    /// validator's error instead of failing.
    ///
    /// # Errors
    /// * `MissingUrl` if `url` is blank; nothing is written or spawned
    /// * invalid validator path or scratch prefix in the settings
    /// * the scratch file cannot be written, or the build tool cannot start
    pub fn validate(&self, url: &str) -> ApplicationResult<ValidationOutcome> {
        if url.trim().is_empty() {
            return Err(DomainError::MissingUrl.into());
        }

        let validator = &self.settings.validator;
        let source = render_probe(&validator.path, validator.is_async, url)?;
        let target = scratch_target_name(&validator.scratch_prefix, std::process::id())?;

        let tests_dir = self.project_dir.join("tests");
        let created_dir = !self.fs.exists(&tests_dir);
        if created_dir {
            self.fs
                .create_dir_all(&tests_dir)
                .with_path_context("create tests directory", &tests_dir)?;
        }

        let scratch_file = tests_dir.join(format!("{target}.rs"));
        let guard = ScratchGuard {
            fs: self.fs.clone(),
            file: scratch_file.clone(),
            dir: created_dir.then(|| tests_dir.clone()),
            armed: true,
        };
        self.fs
            .write(&scratch_file, source.as_str())
            .with_path_context("write validation probe", &scratch_file)?;
        debug!("validate: probe written to {}", scratch_file.display());

        let report = self.run_step(&Step::ValidateProbe { target })?;
        let cleaned_up = guard.finish();

        Ok(ValidationOutcome {
            report,
            scratch_file,
            cleaned_up,
        })
    }

    /// Run the smoke sequence, stopping at the first fatal failure.
    pub fn quick(&self) -> ApplicationResult<SmokeReport> {
        let plan = SmokePlan::standard(&self.settings.integration_target);
        let mut result = SmokeReport::default();

        for smoke_step in plan.steps {
            let report = self.run_step(&smoke_step.step)?;
            let failed = !report.success;
            result.reports.push(report);

            if !failed {
                continue;
            }
            match smoke_step.severity {
                Severity::Tolerated => {
                    warn!("quick: {} failed, continuing", smoke_step.step);
                    result
                        .warnings
                        .push(format!("{} failed (tolerated)", smoke_step.step));
                }
                Severity::Fatal => {
                    result.fatal = Some(smoke_step.step);
                    break;
                }
            }
        }

        Ok(result)
    }
}

/// Removes the scratch probe (and a `tests/` directory created for it)
/// when dropped.
struct ScratchGuard {
    fs: Arc<dyn FileSystem>,
    file: PathBuf,
    dir: Option<PathBuf>,
    armed: bool,
}

impl ScratchGuard {
    /// Clean up now and report whether the scratch file is gone.
    fn finish(mut self) -> bool {
        self.armed = false;
        self.cleanup()
    }

    fn cleanup(&self) -> bool {
        let removed = match self.fs.remove_file(&self.file) {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                warn!("cannot remove {}: {}", self.file.display(), e);
                false
            }
        };
        if let Some(dir) = &self.dir {
            if let Err(e) = self.fs.remove_dir(dir) {
                debug!("keeping {}: {}", dir.display(), e);
            }
        }
        removed
    }
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        if self.armed {
            self.cleanup();
        }
    }
}
