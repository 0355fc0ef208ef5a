//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::global::GlobalConfig;
use crate::project::{read_descriptor, ProjectDescriptor, ProjectFile, PROJECT_FILE_NAME};
use crate::toolchain::Toolchains;
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.kiln/config.toml) - lowest priority
/// 2. Project descriptor (./kiln.toml) - overrides global
/// 3. Environment variables (KILN_*) - overrides project
/// 4. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone)]
pub struct Config {
    /// Validated project descriptor
    pub project: ProjectDescriptor,

    /// Global configuration
    pub global: GlobalConfig,

    /// Project root directory (where kiln.toml was found)
    pub project_root: PathBuf,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use a specific global config file instead of ~/.kiln/config.toml
    pub fn with_global_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find kiln.toml, then loads and merges
    /// global config if it exists.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let config_path = Self::find_project_file(start_dir)
            .ok_or_else(|| ConfigError::NotFound(start_dir.join(PROJECT_FILE_NAME)))?;
        self.load_from_file(&config_path)
    }

    /// Load configuration from a specific project descriptor file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let content = read_descriptor(config_path)?;
        let file = ProjectFile::parse(&content, config_path)?;
        let file = self.apply_env_overrides(file);
        let project = file.into_descriptor(config_path)?;

        let global = self.load_global_config()?;

        let project_root = match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        debug!(root = %project_root.display(), project = %project.name, "loaded project descriptor");

        Ok(Config {
            project,
            global,
            project_root,
        })
    }

    /// Find the project descriptor by walking up the directory tree
    pub fn find_project_file(start_dir: &Path) -> Option<PathBuf> {
        let mut current = Some(start_dir);
        while let Some(dir) = current {
            let candidate = dir.join(PROJECT_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            current = dir.parent();
        }
        None
    }

    /// Load global configuration from ~/.kiln/config.toml
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load_global_config(&mut self) -> ConfigResult<GlobalConfig> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => {
                let path = GlobalConfig::global_config_path()?;
                self.global_config_path = Some(path.clone());
                path
            }
        };

        if !path.exists() {
            return Ok(GlobalConfig::default());
        }

        GlobalConfig::load_from_file(&path)
    }

    /// Apply environment variable overrides to the raw descriptor
    ///
    /// KILN_PLATFORM replaces `project.platform`, KILN_COMPILER replaces
    /// `project.compiler`. Overrides are applied before validation so an
    /// invalid override is reported like an invalid descriptor value.
    fn apply_env_overrides(&self, mut file: ProjectFile) -> ProjectFile {
        let platform = env_value("KILN_PLATFORM");
        let compiler = env_value("KILN_COMPILER");
        if platform.is_none() && compiler.is_none() {
            return file;
        }

        let project = file.project.get_or_insert_with(Default::default);
        if let Some(platform) = platform {
            debug!(platform = %platform, "platform overridden from environment");
            project.platform = Some(platform);
        }
        if let Some(compiler) = compiler {
            debug!(compiler = %compiler, "compiler overridden from environment");
            project.compiler = Some(compiler);
        }
        file
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn env_value(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Get the project root directory
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Resolve toolchain locations (environment > global config > defaults)
    pub fn toolchains(&self) -> ConfigResult<Toolchains> {
        Toolchains::resolve(&self.global)
    }
}
