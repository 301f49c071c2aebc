//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use clap_complete::Shell;

/// Test harness for report_checker projects: compile, test and validate deliverables
#[derive(Parser, Debug)]
#[command(name = "report-harness")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Examples:\n  \
    report-harness check\n  \
    report-harness validate https://drive.google.com/drive/folders/<id>\n  \
    report-harness quick")]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Check that the project compiles
    Check,

    /// Run library unit tests
    Unit,

    /// Compile the integration test suite (tests are not run)
    Integration,

    /// Run the deliverable validator once against a URL
    Validate {
        /// Google Drive folder URL of the deliverable
        #[arg(value_hint = ValueHint::Url)]
        url: Option<String>,
    },

    /// Smoke sequence: compile check, library tests, integration compile
    Quick,
}
