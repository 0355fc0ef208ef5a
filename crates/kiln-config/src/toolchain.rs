//! Toolchain discovery
//!
//! External tools are looked up on `PATH` first and then in the local
//! installation under the kiln home. Lookup happens lazily: only the command
//! that needs a tool asks for it.

use crate::global::GlobalConfig;
use crate::ConfigResult;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// NDK toolchain used when none is configured
pub const DEFAULT_ANDROID_TOOLCHAIN: &str =
    "C:/AndroidSDK/ndk/26.3.11579264/build/cmake/android.toolchain.cmake";

/// An external executable kiln drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Cmake,
    Ninja,
    Vcpkg,
    Emcc,
    Node,
}

impl Tool {
    /// Base executable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cmake => "cmake",
            Self::Ninja => "ninja",
            Self::Vcpkg => "vcpkg",
            Self::Emcc => "emcc",
            Self::Node => "node",
        }
    }

    fn file_name(&self) -> String {
        if cfg!(windows) {
            match self {
                Self::Emcc => "emcc.bat".to_string(),
                other => format!("{}.exe", other.name()),
            }
        } else {
            self.name().to_string()
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A required tool is neither on `PATH` nor in the local installation
#[derive(Debug, Error)]
#[error(
    "{tool} not found on PATH{}; install it or point KILN_HOME at a toolchain directory",
    searched_suffix(.searched)
)]
pub struct ToolchainMissing {
    pub tool: Tool,
    pub searched: Option<PathBuf>,
}

fn searched_suffix(searched: &Option<PathBuf>) -> String {
    match searched {
        Some(path) => format!(" or at {}", path.display()),
        None => String::new(),
    }
}

/// Resolved toolchain locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchains {
    /// Kiln home (default install location)
    pub home: PathBuf,
    pub vcpkg_root: PathBuf,
    pub emsdk_root: PathBuf,
    pub cmake_root: PathBuf,
    pub ninja_root: PathBuf,
    /// NDK `android.toolchain.cmake`, forward slashes
    pub android_toolchain_file: String,
}

impl Toolchains {
    /// Default layout under `home`
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            vcpkg_root: home.join("vcpkg"),
            emsdk_root: home.join("emsdk"),
            cmake_root: home.join("cmake"),
            ninja_root: home.join("ninja"),
            android_toolchain_file: DEFAULT_ANDROID_TOOLCHAIN.to_string(),
            home,
        }
    }

    /// Resolve locations: environment > global config > default under home
    pub fn resolve(global: &GlobalConfig) -> ConfigResult<Self> {
        let mut toolchains = Self::with_home(GlobalConfig::kiln_home()?);

        if let Some(path) = env_path("KILN_VCPKG_ROOT").or_else(|| global.toolchain(|t| &t.vcpkg)) {
            toolchains.vcpkg_root = path;
        }
        if let Some(path) = env_path("KILN_EMSDK_ROOT").or_else(|| global.toolchain(|t| &t.emsdk)) {
            toolchains.emsdk_root = path;
        }
        if let Some(path) = global.toolchain(|t| &t.cmake) {
            toolchains.cmake_root = path;
        }
        if let Some(path) = global.toolchain(|t| &t.ninja) {
            toolchains.ninja_root = path;
        }
        if let Some(file) = env::var("KILN_ANDROID_TOOLCHAIN")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| global.android_toolchain_file().map(str::to_string))
        {
            toolchains.android_toolchain_file = file.replace('\\', "/");
        }

        Ok(toolchains)
    }

    /// vcpkg's CMake integration script
    pub fn vcpkg_toolchain_file(&self) -> PathBuf {
        self.vcpkg_root
            .join("scripts")
            .join("buildsystems")
            .join("vcpkg.cmake")
    }

    /// Emscripten's CMake platform module
    pub fn emscripten_toolchain_file(&self) -> PathBuf {
        self.emsdk_root
            .join("upstream")
            .join("emscripten")
            .join("cmake")
            .join("Modules")
            .join("Platform")
            .join("Emscripten.cmake")
    }

    /// NDK root: the toolchain file path with `/build/cmake/...` removed
    pub fn android_ndk_root(&self) -> &str {
        match self.android_toolchain_file.find("/build/cmake") {
            Some(idx) => &self.android_toolchain_file[..idx],
            None => &self.android_toolchain_file,
        }
    }

    /// Where a locally installed copy of `tool` would live
    pub fn local_executable(&self, tool: Tool) -> Option<PathBuf> {
        let file = tool.file_name();
        match tool {
            Tool::Cmake => Some(self.cmake_root.join("bin").join(file)),
            Tool::Ninja => Some(self.ninja_root.join(file)),
            Tool::Vcpkg => Some(self.vcpkg_root.join(file)),
            Tool::Emcc => Some(self.emsdk_root.join("upstream").join("emscripten").join(file)),
            Tool::Node => None,
        }
    }

    /// Find `tool` on `PATH`, then in the local installation
    pub fn locate(&self, tool: Tool) -> Result<PathBuf, ToolchainMissing> {
        if let Ok(path) = which::which(tool.name()) {
            debug!(tool = %tool, path = %path.display(), "found on PATH");
            return Ok(path);
        }

        let local = self.local_executable(tool);
        match local {
            Some(path) if path.is_file() => {
                debug!(tool = %tool, path = %path.display(), "found local installation");
                Ok(path)
            }
            _ => Err(ToolchainMissing {
                tool,
                searched: local,
            }),
        }
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// Render a path for embedding in CMake/JSON documents
pub fn forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let toolchains = Toolchains::with_home("/home/dev/.kiln");
        assert_eq!(toolchains.vcpkg_root, PathBuf::from("/home/dev/.kiln/vcpkg"));
        assert_eq!(
            forward_slashes(&toolchains.vcpkg_toolchain_file()),
            "/home/dev/.kiln/vcpkg/scripts/buildsystems/vcpkg.cmake"
        );
        assert_eq!(
            forward_slashes(&toolchains.emscripten_toolchain_file()),
            "/home/dev/.kiln/emsdk/upstream/emscripten/cmake/Modules/Platform/Emscripten.cmake"
        );
    }

    #[test]
    fn test_android_ndk_root_strips_build_suffix() {
        let toolchains = Toolchains::with_home("/k");
        assert_eq!(toolchains.android_ndk_root(), "C:/AndroidSDK/ndk/26.3.11579264");

        let mut custom = Toolchains::with_home("/k");
        custom.android_toolchain_file = "/opt/ndk/toolchain.cmake".to_string();
        assert_eq!(custom.android_ndk_root(), "/opt/ndk/toolchain.cmake");
    }

    #[test]
    fn test_forward_slashes() {
        assert_eq!(forward_slashes(Path::new(r"C:\Users\dev\.kiln")), "C:/Users/dev/.kiln");
    }

    #[test]
    fn test_locate_local_installation() {
        let temp = tempfile::TempDir::new().unwrap();
        let toolchains = Toolchains::with_home(temp.path());
        let ninja = toolchains.local_executable(Tool::Ninja).unwrap();
        std::fs::create_dir_all(ninja.parent().unwrap()).unwrap();
        std::fs::write(&ninja, "").unwrap();

        // PATH may also provide ninja; either way the lookup succeeds.
        assert!(toolchains.locate(Tool::Ninja).is_ok());
    }

    #[test]
    fn test_missing_tool_reports_search_location() {
        let temp = tempfile::TempDir::new().unwrap();
        let toolchains = Toolchains::with_home(temp.path());
        if which::which("vcpkg").is_ok() {
            return;
        }

        let err = toolchains.locate(Tool::Vcpkg).unwrap_err();
        assert_eq!(err.tool, Tool::Vcpkg);
        let message = err.to_string();
        assert!(message.starts_with("vcpkg not found on PATH or at"));
        assert!(message.contains("KILN_HOME"));
    }

    #[test]
    fn test_node_has_no_local_installation() {
        assert!(Toolchains::with_home("/k").local_executable(Tool::Node).is_none());
    }
}
