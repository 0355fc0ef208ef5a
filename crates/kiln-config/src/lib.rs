//! Kiln Configuration System
//!
//! Provides configuration management for kiln projects including:
//! - The project descriptor (kiln.toml)
//! - Global user configuration (~/.kiln/config.toml)
//! - Toolchain discovery (CMake, Ninja, vcpkg, Emscripten)
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Built-in defaults (toolchains under ~/.kiln)
//! 2. Global config (~/.kiln/config.toml)
//! 3. Project descriptor (./kiln.toml)
//! 4. Environment variables (KILN_*)
//!
//! # Example
//!
//! ```no_run
//! use kiln_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("building {}", config.project.name);
//! ```

pub mod global;
pub mod loader;
pub mod project;
pub mod toolchain;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
///
/// Every variant is fatal: the run stops before any generated file is written.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Project descriptor not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Missing required field '{field}' in {file}")]
    MissingField { field: String, file: PathBuf },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Target '{0}' is declared more than once")]
    DuplicateTarget(String),

    #[error("Target '{target}' lists dependency '{dependency}' more than once")]
    DuplicateDependency { target: String, dependency: String },

    #[error("Target '{0}' cannot depend on itself")]
    SelfDependency(String),

    #[error("Project declares no targets")]
    NoTargets,

    #[error(
        "Project name '{expected}' must match the last declared target, found '{found}'"
    )]
    RootMismatch { expected: String, found: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use global::GlobalConfig;
pub use loader::{Config, ConfigLoader};
pub use project::{
    validate_identifier, Compiler, Dependency, Language, ProjectDescriptor, TargetDescriptor,
    TargetKind, TargetList, PROJECT_FILE_NAME,
};
pub use toolchain::{Tool, ToolchainMissing, Toolchains};
