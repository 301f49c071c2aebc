//! Service container for dependency injection
//!
//! Wires up the harness service with its dependencies.

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::services::HarnessService;
use crate::config::Settings;
use crate::infrastructure::traits::{CommandRunner, FileSystem, RealCommandRunner, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Command runner abstraction
    pub cmd: Arc<dyn CommandRunner>,

    /// Project root the harness operates on
    pub project_dir: PathBuf,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings, project_dir: PathBuf) -> Self {
        Self::with_deps(
            settings,
            project_dir,
            Arc::new(RealFileSystem),
            Arc::new(RealCommandRunner),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        project_dir: PathBuf,
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            cmd,
            project_dir,
        }
    }

    /// Build the harness service for the configured project.
    pub fn harness_service(&self) -> HarnessService {
        HarnessService::new(
            self.fs.clone(),
            self.cmd.clone(),
            self.settings.clone(),
            self.project_dir.clone(),
        )
    }
}
