//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent invalid inputs to the harness.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("missing url: usage: validate <url>")]
    MissingUrl,

    #[error("invalid validator path: {0} (expected e.g. report_checker::validate_deliverable)")]
    InvalidValidatorPath(String),

    #[error("invalid url pattern: {0}")]
    InvalidPattern(String),

    #[error("invalid scratch prefix: {0} (only letters, digits and '_' allowed)")]
    InvalidScratchPrefix(String),
}
