//! report-harness: test harness for projects built on `report_checker`
//!
//! Layers, innermost first:
//! - [`domain`]: steps, reports, smoke plan, probe rendering
//! - [`application`]: the [`HarnessService`](application::services::HarnessService)
//! - [`infrastructure`]: process and filesystem boundaries
//! - [`cli`]: argument parsing, dispatch and terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
