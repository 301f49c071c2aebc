//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/report-harness/report-harness.toml`
//! 3. Project config: `<project_dir>/.report-harness.toml`
//! 4. Environment variables: `REPORT_HARNESS_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::expand_env_vars;

/// Where the deliverable validator lives and how to call it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Fully qualified path of the validation function
    pub path: String,
    /// Generate a `#[tokio::test]` probe and `.await` the call
    pub is_async: bool,
    /// File stem prefix of the scratch probe under `tests/`
    pub scratch_prefix: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            path: "report_checker::validate_deliverable".into(),
            is_async: false,
            scratch_prefix: "adhoc_validate".into(),
        }
    }
}

/// Raw validator config for intermediate parsing (`None` = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawValidatorConfig {
    pub path: Option<String>,
    pub is_async: Option<bool>,
    pub scratch_prefix: Option<String>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub cargo: Option<String>,
    pub manifest: Option<String>,
    pub integration_target: Option<String>,
    pub sample_url: Option<String>,
    #[serde(default)]
    pub validator: RawValidatorConfig,
}

impl ValidatorConfig {
    /// Merge overlay config onto self (base): overlay wins if `Some`.
    pub fn merge(&self, overlay: &RawValidatorConfig) -> Self {
        Self {
            path: overlay.path.clone().unwrap_or_else(|| self.path.clone()),
            is_async: overlay.is_async.unwrap_or(self.is_async),
            scratch_prefix: overlay
                .scratch_prefix
                .clone()
                .unwrap_or_else(|| self.scratch_prefix.clone()),
        }
    }
}

/// Unified configuration for report-harness.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Build tool executable (default: cargo)
    pub cargo: String,
    /// Manifest that must exist in the project root (default: Cargo.toml)
    pub manifest: String,
    /// Integration test target compiled by `integration` and `quick`
    pub integration_target: String,
    /// Sample deliverable URL shown by `quick`
    pub sample_url: String,
    /// Validation probe settings
    pub validator: ValidatorConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cargo: "cargo".into(),
            manifest: "Cargo.toml".into(),
            integration_target: "integration_tests".into(),
            sample_url: "https://drive.google.com/drive/folders/1AbCdEfGhIjKlMnOpQrStUvWxYz".into(),
            validator: ValidatorConfig::default(),
        }
    }
}

/// Get the XDG config directory for report-harness.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "report-harness").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("report-harness.toml"))
}

/// Get the path to the project config file.
pub fn project_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".report-harness.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in the build tool path.
    fn expand_paths(&mut self) {
        self.cargo = expand_env_vars(&self.cargo);
    }

    /// Merge overlay config onto self (base): scalars in the overlay win.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            cargo: overlay.cargo.clone().unwrap_or_else(|| self.cargo.clone()),
            manifest: overlay
                .manifest
                .clone()
                .unwrap_or_else(|| self.manifest.clone()),
            integration_target: overlay
                .integration_target
                .clone()
                .unwrap_or_else(|| self.integration_target.clone()),
            sample_url: overlay
                .sample_url
                .clone()
                .unwrap_or_else(|| self.sample_url.clone()),
            validator: self.validator.merge(&overlay.validator),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory for the project-local config
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/report-harness/report-harness.toml`
    /// 3. Project config: `<project_dir>/.report-harness.toml`
    /// 4. Environment variables: `REPORT_HARNESS_*` prefix
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(project) = project_dir {
            let local_path = project_config_path(project);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply REPORT_HARNESS_* environment variables as explicit overrides.
    ///
    /// Top-level keys use a single `_` after the prefix (`REPORT_HARNESS_CARGO`),
    /// nested keys use `__` (`REPORT_HARNESS_VALIDATOR__IS_ASYNC`).
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("REPORT_HARNESS")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("cargo") {
            settings.cargo = val;
        }
        if let Ok(val) = config.get_string("manifest") {
            settings.manifest = val;
        }
        if let Ok(val) = config.get_string("integration_target") {
            settings.integration_target = val;
        }
        if let Ok(val) = config.get_string("sample_url") {
            settings.sample_url = val;
        }
        if let Ok(val) = config.get_string("validator.path") {
            settings.validator.path = val;
        }
        if let Ok(val) = config.get_bool("validator.is_async") {
            settings.validator.is_async = val;
        }
        if let Ok(val) = config.get_string("validator.scratch_prefix") {
            settings.validator.scratch_prefix = val;
        }

        Ok(settings)
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
