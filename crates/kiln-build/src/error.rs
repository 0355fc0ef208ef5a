/// Build system error types
use kiln_config::{ConfigError, ToolchainMissing};
use std::path::PathBuf;
use thiserror::Error;

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Toolchain(#[from] ToolchainMissing),

    #[error("Target not found: {target}")]
    TargetNotFound { target: String },

    #[error("Invalid unit name '{name}': {reason}")]
    InvalidUnitName { name: String, reason: String },

    #[error("{path} not found; run `kiln generate` first")]
    PresetsNotFound { path: PathBuf },

    #[error("Invalid preset document {path}: {error}")]
    InvalidPresets {
        path: PathBuf,
        error: serde_json::Error,
    },

    #[error("No configure presets defined in {path}")]
    NoPresets { path: PathBuf },

    #[error("Preset '{name}' not found (available: {available})")]
    PresetNotFound { name: String, available: String },

    #[error("{step} failed ({status})")]
    CommandFailed { step: String, status: String },

    #[error("Executable not found at {path}")]
    ExecutableNotFound { path: PathBuf },

    #[error("Failed to serialize presets: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error at {path}: {error}")]
    IoError {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            error,
        }
    }

    /// Create a target not found error
    pub fn target_not_found(target: impl Into<String>) -> Self {
        Self::TargetNotFound {
            target: target.into(),
        }
    }

    /// Create a failed subprocess error
    pub fn command_failed(step: impl Into<String>, status: impl ToString) -> Self {
        Self::CommandFailed {
            step: step.into(),
            status: status.to_string(),
        }
    }

    /// Whether this error comes from an invalid project description
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
