//! End-to-end tests of the command line contract: exit codes and messages
//!
//! Every run gets an isolated XDG config home so a developer's global config
//! cannot leak in. Build-tool behaviour is simulated with small shell scripts
//! passed through `REPORT_HARNESS_CARGO`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use rstest::rstest;
use tempfile::TempDir;

fn harness(dir: &Path, args: &[&str], cargo: Option<&Path>) -> Output {
    let config_home = TempDir::new().unwrap();
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_report-harness"));
    cmd.args(args)
        .current_dir(dir)
        .env("XDG_CONFIG_HOME", config_home.path())
        .env("NO_COLOR", "1")
        .env_remove("REPORT_HARNESS_CARGO");
    if let Some(cargo) = cargo {
        cmd.env("REPORT_HARNESS_CARGO", cargo);
    }
    cmd.output().expect("run report-harness")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).to_string()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).to_string()
}

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("Cargo.toml"),
        "[package]\nname = \"deliverables\"\n",
    )
    .unwrap();
    temp
}

/// Cargo that must never be reached.
fn unreachable_cargo(dir: &Path) -> PathBuf {
    dir.join("no-such-cargo-binary")
}

// ============================================================
// help / unknown command
// ============================================================

#[rstest]
#[case::no_args(&[])]
#[case::help(&["help"])]
#[case::long_flag(&["--help"])]
#[case::short_flag(&["-h"])]
fn given_help_request_when_run_then_exit_zero_without_manifest(#[case] args: &[&str]) {
    let temp = TempDir::new().unwrap();

    let out = harness(temp.path(), args, Some(&unreachable_cargo(temp.path())));

    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    for command in ["check", "unit", "integration", "validate", "quick"] {
        assert!(text.contains(command), "usage should list {command}");
    }
}

#[rstest]
#[case("deploy")]
#[case("test")]
#[case("validatee")]
fn given_unknown_command_when_run_then_exit_one(#[case] command: &str) {
    let temp = project();

    let out = harness(temp.path(), &[command], None);

    assert_eq!(out.status.code(), Some(1));
    assert!(
        stderr(&out).contains(&format!("unknown command: {command}")),
        "stderr: {}",
        stderr(&out)
    );
}

#[test]
fn given_extra_argument_when_check_then_usage_error_exit_one() {
    let temp = project();

    let out = harness(temp.path(), &["check", "extra"], None);

    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn given_completions_flag_when_run_then_prints_script() {
    let temp = TempDir::new().unwrap();

    let out = harness(temp.path(), &["--completions", "bash"], None);

    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).contains("report-harness"));
}

// ============================================================
// preconditions
// ============================================================

#[rstest]
#[case(&["check"])]
#[case(&["unit"])]
#[case(&["integration"])]
#[case(&["validate", "https://drive.google.com/drive/folders/abc"])]
#[case(&["quick"])]
fn given_no_manifest_when_run_then_exit_one_before_dispatch(#[case] args: &[&str]) {
    let temp = TempDir::new().unwrap();

    let out = harness(temp.path(), args, Some(&unreachable_cargo(temp.path())));

    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("Cargo.toml not found"), "stderr: {err}");
    assert!(!err.contains("build tool failed to start"));
    assert!(!temp.path().join("tests").exists());
}

#[rstest]
#[case(&["validate"])]
#[case(&["validate", ""])]
#[case(&["validate", "  "])]
fn given_no_url_when_validate_then_exit_one_without_invocation(#[case] args: &[&str]) {
    let temp = project();

    let out = harness(temp.path(), args, Some(&unreachable_cargo(temp.path())));

    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("missing url"), "stderr: {err}");
    assert!(!err.contains("build tool failed to start"));
    assert!(!temp.path().join("tests").exists());
}

#[test]
fn given_project_dir_flag_when_run_elsewhere_then_uses_that_project() {
    let project = project();
    let elsewhere = TempDir::new().unwrap();
    let dir = project.path().to_string_lossy().to_string();

    let out = harness(
        elsewhere.path(),
        &["-C", &dir, "validate"],
        Some(&unreachable_cargo(elsewhere.path())),
    );

    assert!(stderr(&out).contains("missing url"), "manifest should be found");
}

#[test]
fn given_missing_build_tool_when_check_then_exit_one() {
    let temp = project();

    let out = harness(temp.path(), &["check"], Some(&unreachable_cargo(temp.path())));

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("build tool failed to start"));
}

// ============================================================
// build-tool driven commands (simulated cargo)
// ============================================================

#[cfg(unix)]
mod simulated {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Write an executable fake cargo whose body decides the exit status from "$*".
    fn fake_cargo(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-cargo");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[test]
    fn given_compiling_project_when_check_then_exit_zero() {
        let temp = project();
        let tools = TempDir::new().unwrap();
        let cargo = fake_cargo(tools.path(), "[ \"$1\" = check ] || exit 3\nexit 0");

        let out = harness(temp.path(), &["check"], Some(&cargo));

        assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
        assert!(stdout(&out).contains("Compilation succeeded"));
    }

    #[test]
    fn given_compile_error_when_check_then_exit_one_with_diagnostics() {
        let temp = project();
        let tools = TempDir::new().unwrap();
        let cargo = fake_cargo(
            tools.path(),
            "echo 'error[E0425]: cannot find value `x`' >&2\nexit 101",
        );

        let out = harness(temp.path(), &["check"], Some(&cargo));

        assert_eq!(out.status.code(), Some(1));
        let err = stderr(&out);
        assert!(err.contains("E0425"), "diagnostics forwarded: {err}");
        assert!(err.contains("compilation failed"));
    }

    #[test]
    fn given_failing_tests_when_unit_then_exit_one() {
        let temp = project();
        let tools = TempDir::new().unwrap();
        let cargo = fake_cargo(tools.path(), "echo 'test result: FAILED'\nexit 101");

        let out = harness(temp.path(), &["unit"], Some(&cargo));

        assert_eq!(out.status.code(), Some(1));
        assert!(stdout(&out).contains("test result: FAILED"));
    }

    #[test]
    fn given_integration_compiles_when_integration_then_exit_zero() {
        let temp = project();
        let tools = TempDir::new().unwrap();
        let cargo = fake_cargo(
            tools.path(),
            "case \"$*\" in *--no-run*) exit 0;; esac\nexit 9",
        );

        let out = harness(temp.path(), &["integration"], Some(&cargo));

        assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    }

    #[test]
    fn given_only_unit_tests_fail_when_quick_then_exit_zero_with_warning() {
        let temp = project();
        let tools = TempDir::new().unwrap();
        let cargo = fake_cargo(
            tools.path(),
            "case \"$*\" in *--lib*) exit 101;; esac\nexit 0",
        );

        let out = harness(temp.path(), &["quick"], Some(&cargo));

        assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
        assert!(stderr(&out).contains("Warning"));
        assert!(stdout(&out).contains("Smoke sequence passed"));
        assert!(stdout(&out).contains("drive.google.com"));
    }

    #[rstest]
    #[case::unit_tests_pass("exit 0")]
    #[case::unit_tests_fail("exit 101")]
    fn given_integration_compile_fails_when_quick_then_exit_one(#[case] lib_exit: &str) {
        let temp = project();
        let tools = TempDir::new().unwrap();
        let cargo = fake_cargo(
            tools.path(),
            &format!("case \"$*\" in *--no-run*) exit 101;; *--lib*) {lib_exit};; esac\nexit 0"),
        );

        let out = harness(temp.path(), &["quick"], Some(&cargo));

        assert_eq!(out.status.code(), Some(1));
        assert!(stderr(&out).contains("integration test compile failed"));
    }

    #[test]
    fn given_url_when_validate_then_prints_probe_output_and_removes_probe() {
        let temp = project();
        let tools = TempDir::new().unwrap();
        let cargo = fake_cargo(
            tools.path(),
            "echo 'folder id: 1AbC'\necho 'files to download: 0'\nexit 0",
        );

        let out = harness(
            temp.path(),
            &["validate", "https://drive.google.com/drive/folders/1AbC"],
            Some(&cargo),
        );

        assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
        let text = stdout(&out);
        assert!(text.contains("folder id (from url): 1AbC"));
        assert!(text.contains("files to download: 0"));
        assert!(!temp.path().join("tests").exists());
    }

    #[test]
    fn given_generated_test_fails_to_compile_when_validate_then_exit_one_and_diagnostics_shown() {
        let temp = project();
        fs::create_dir_all(temp.path().join("tests")).unwrap();
        let tools = TempDir::new().unwrap();
        let cargo = fake_cargo(
            tools.path(),
            "echo 'error[E0433]: failed to resolve' >&2\nexit 101",
        );

        let out = harness(temp.path(), &["validate", "https://x"], Some(&cargo));

        assert_eq!(out.status.code(), Some(1));
        assert!(stderr(&out).contains("validation probe failed"));
        assert!(
            stderr(&out).contains("error[E0433]: failed to resolve"),
            "compiler diagnostics reach stderr: {}",
            stderr(&out)
        );
        let leftovers = fs::read_dir(temp.path().join("tests")).unwrap().count();
        assert_eq!(leftovers, 0);
    }
}
