//! Error conversion helpers for I/O and process spawning
//!
//! Provides extension traits for cleaner error handling with context.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};
use crate::infrastructure::InfraError;

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// fs.write(&probe, source)
    ///     .with_path_context("write probe", &probe)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;

    /// Report a failure to spawn `program` as a build tool error.
    fn with_spawn_context(self, program: &str, args: &[&str]) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }

    fn with_spawn_context(self, program: &str, args: &[&str]) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("run {} {}", program, args.join(" ")),
            source: Box::new(InfraError::BuildTool {
                message: format!("{program}: {e}"),
            }),
        })
    }
}
