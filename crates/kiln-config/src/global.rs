//! Global Configuration (~/.kiln/config.toml)
//!
//! Handles user-level configuration: where the external toolchains live.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Global user configuration from ~/.kiln/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Toolchain installation roots
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolchains: Option<ToolchainsConfig>,

    /// Android cross-compilation settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android: Option<AndroidConfig>,
}

/// Toolchain root directories
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ToolchainsConfig {
    /// vcpkg checkout (contains `vcpkg`, `scripts/`, `versions/`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcpkg: Option<PathBuf>,

    /// Emscripten SDK root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emsdk: Option<PathBuf>,

    /// CMake distribution root (contains `bin/`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmake: Option<PathBuf>,

    /// Directory containing the ninja executable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ninja: Option<PathBuf>,
}

/// Android NDK settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct AndroidConfig {
    /// Path to `android.toolchain.cmake` inside the NDK
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolchain_file: Option<String>,
}

impl GlobalConfig {
    /// Load global configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the global configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(toolchains) = &self.toolchains {
            for (field, path) in [
                ("toolchains.vcpkg", &toolchains.vcpkg),
                ("toolchains.emsdk", &toolchains.emsdk),
                ("toolchains.cmake", &toolchains.cmake),
                ("toolchains.ninja", &toolchains.ninja),
            ] {
                if matches!(path, Some(p) if p.as_os_str().is_empty()) {
                    return Err(ConfigError::InvalidValue {
                        field: field.to_string(),
                        reason: "path cannot be empty".to_string(),
                    });
                }
            }
        }

        if let Some(android) = &self.android {
            if let Some(file) = &android.toolchain_file {
                if !file.ends_with(".cmake") {
                    return Err(ConfigError::InvalidValue {
                        field: "android.toolchain_file".to_string(),
                        reason: format!("expected a .cmake toolchain file, got '{}'", file),
                    });
                }
            }
        }

        Ok(())
    }

    /// Kiln home directory: `$KILN_HOME` or `~/.kiln`
    pub fn kiln_home() -> ConfigResult<PathBuf> {
        if let Some(home) = env::var_os("KILN_HOME").filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(home));
        }
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".kiln"))
    }

    /// Get the global config file path (~/.kiln/config.toml)
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        Ok(Self::kiln_home()?.join("config.toml"))
    }

    /// Merge another global config into this one
    /// Other config takes precedence for non-None values
    pub fn merge(&mut self, other: &GlobalConfig) {
        if other.toolchains.is_some() {
            self.toolchains = other.toolchains.clone();
        }
        if other.android.is_some() {
            self.android = other.android.clone();
        }
    }

    pub(crate) fn toolchain(&self, select: fn(&ToolchainsConfig) -> &Option<PathBuf>) -> Option<PathBuf> {
        self.toolchains.as_ref().and_then(|t| select(t).clone())
    }

    pub(crate) fn android_toolchain_file(&self) -> Option<&str> {
        self.android
            .as_ref()
            .and_then(|a| a.toolchain_file.as_deref())
    }
}
