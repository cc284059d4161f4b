//! Settings for the developer shell, stored as TOML.
//!
//! The pipeline core takes no configuration; these settings only tell the
//! shell where the fitted artifacts live and how to present results.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs;
use crate::artifacts::{ArtifactPaths, MODEL_FILE_NAME, SCALER_FILE_NAME};
use crate::pipeline::export::DEFAULT_EXPORT_FILE_NAME;

/// Default filename used to store the settings.
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Rows shown in the result preview.
pub const DEFAULT_PREVIEW_ROWS: usize = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No suitable config directory found")]
    NoConfigDir,
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
}

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => ConfigError::CreateDir { path, source },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictorSettings {
    /// Classifier JSON. Relative paths resolve against the models directory.
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    /// Scaler JSON. Relative paths resolve against the models directory.
    #[serde(default)]
    pub scaler_path: Option<PathBuf>,
    #[serde(default = "default_export_file_name")]
    pub export_file_name: String,
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

fn default_export_file_name() -> String {
    DEFAULT_EXPORT_FILE_NAME.to_string()
}

fn default_preview_rows() -> usize {
    DEFAULT_PREVIEW_ROWS
}

impl Default for PredictorSettings {
    fn default() -> Self {
        Self {
            model_path: None,
            scaler_path: None,
            export_file_name: default_export_file_name(),
            preview_rows: default_preview_rows(),
        }
    }
}

impl PredictorSettings {
    /// Resolve artifact locations against `models_dir`.
    pub fn artifact_paths_in(&self, models_dir: &Path) -> ArtifactPaths {
        let resolve = |configured: &Option<PathBuf>, default_name: &str| match configured {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => models_dir.join(path),
            None => models_dir.join(default_name),
        };
        ArtifactPaths {
            model: resolve(&self.model_path, MODEL_FILE_NAME),
            scaler: resolve(&self.scaler_path, SCALER_FILE_NAME),
        }
    }

    /// Resolve artifact locations against the application models directory.
    pub fn artifact_paths(&self) -> Result<ArtifactPaths, ConfigError> {
        let models_dir = app_dirs::models_dir().map_err(map_app_dir_error)?;
        Ok(self.artifact_paths_in(&models_dir))
    }
}

/// Resolve the settings file path, ensuring the parent directory exists.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load settings from disk, returning defaults if the file is missing.
pub fn load_or_default() -> Result<PredictorSettings, ConfigError> {
    load_settings_from(&config_path()?)
}

pub fn load_settings_from(path: &Path) -> Result<PredictorSettings, ConfigError> {
    if !path.exists() {
        return Ok(PredictorSettings::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_settings_to_path(settings: &PredictorSettings, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let text = toml::to_string_pretty(settings).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, text).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
