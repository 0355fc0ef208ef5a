//! CMakePresets.json synthesis and reading
//!
//! One configure preset per build type for the project's triplet. Cache
//! variables depend on the platform class of the triplet:
//!
//! - mobile (`arm*` + `android`): Android system name, NDK path, STL type
//! - web (`wasm` or `emscripten`): emcc compilers, Emscripten chain-loaded
//!   behind the vcpkg toolchain
//! - native: the project's compiler pair

use crate::error::{BuildError, BuildResult};
use indexmap::IndexMap;
use kiln_config::toolchain::forward_slashes;
use kiln_config::{Compiler, Toolchains};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// File name of the preset document at the project root
pub const PRESETS_FILE_NAME: &str = "CMakePresets.json";

/// Preset schema version
pub const PRESETS_VERSION: u32 = 3;

/// Build types, one preset each, in emission order
pub const BUILD_TYPES: [&str; 4] = ["Debug", "Release", "RelWithDebInfo", "MinSizeRel"];

const BINARY_DIR: &str = "${sourceDir}/out/build/${presetName}";
const INSTALL_DIR: &str = "${sourceDir}/out/install/${presetName}";

/// Platform class of a vcpkg triplet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformClass {
    Mobile,
    Web,
    Native,
}

impl PlatformClass {
    pub fn classify(triplet: &str) -> Self {
        if triplet.starts_with("arm") && triplet.contains("android") {
            Self::Mobile
        } else if triplet.contains("wasm") || triplet.contains("emscripten") {
            Self::Web
        } else {
            Self::Native
        }
    }
}

impl fmt::Display for PlatformClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mobile => write!(f, "mobile"),
            Self::Web => write!(f, "web"),
            Self::Native => write!(f, "native"),
        }
    }
}

/// `CMakePresets.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetDocument {
    pub version: u32,
    #[serde(default)]
    pub configure_presets: Vec<ConfigurePreset>,
}

/// One `configurePresets` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurePreset {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(default = "default_binary_dir")]
    pub binary_dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<Architecture>,
    #[serde(default)]
    pub cache_variables: IndexMap<String, String>,
}

fn default_binary_dir() -> String {
    BINARY_DIR.to_string()
}

/// `architecture` hint for multi-arch generators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Architecture {
    pub value: String,
    pub strategy: String,
}

impl ConfigurePreset {
    /// Build directory with `${sourceDir}` and `${presetName}` expanded
    pub fn binary_dir_in(&self, source_dir: &Path) -> PathBuf {
        let expanded = self
            .binary_dir
            .replace("${sourceDir}", &forward_slashes(source_dir))
            .replace("${presetName}", &self.name);
        PathBuf::from(expanded)
    }

    /// Name shown to the user
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

impl PresetDocument {
    /// Serialize as pretty JSON with a trailing newline
    pub fn to_json_string(&self) -> BuildResult<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Read a preset document written earlier
    pub fn load(path: &Path) -> BuildResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BuildError::PresetsNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                BuildError::io(path, e)
            }
        })?;
        serde_json::from_str(&content).map_err(|error| BuildError::InvalidPresets {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Preset named `name`, or the first preset when `name` is `None`
    pub fn select(&self, name: Option<&str>, path: &Path) -> BuildResult<&ConfigurePreset> {
        let first = self
            .configure_presets
            .first()
            .ok_or_else(|| BuildError::NoPresets {
                path: path.to_path_buf(),
            })?;

        match name {
            None => Ok(first),
            Some(name) => self
                .configure_presets
                .iter()
                .find(|p| p.name == name)
                .ok_or_else(|| BuildError::PresetNotFound {
                    name: name.to_string(),
                    available: self
                        .configure_presets
                        .iter()
                        .map(|p| p.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                }),
        }
    }
}

/// Builds preset documents from resolved toolchain locations
#[derive(Debug, Clone)]
pub struct PresetSynthesizer<'a> {
    toolchains: &'a Toolchains,
    windows_host: bool,
}

impl<'a> PresetSynthesizer<'a> {
    pub fn new(toolchains: &'a Toolchains) -> Self {
        Self {
            toolchains,
            windows_host: cfg!(windows),
        }
    }

    /// Override host detection (emcc is a .bat wrapper on Windows)
    pub fn with_windows_host(mut self, windows_host: bool) -> Self {
        self.windows_host = windows_host;
        self
    }

    /// Presets for `triplet` built with `compiler`
    pub fn synthesize(&self, compiler: Compiler, triplet: &str) -> PresetDocument {
        let class = PlatformClass::classify(triplet);
        let cache = self.cache_variables(compiler, triplet, class);

        let architecture = match class {
            PlatformClass::Mobile => None,
            PlatformClass::Web | PlatformClass::Native => Some(Architecture {
                value: if triplet.contains("x64") || triplet.contains("arm64") {
                    "x64".to_string()
                } else {
                    "x86".to_string()
                },
                strategy: "external".to_string(),
            }),
        };

        let configure_presets = BUILD_TYPES
            .iter()
            .map(|build_type| {
                let mut cache_variables = cache.clone();
                cache_variables.insert("CMAKE_BUILD_TYPE".to_string(), build_type.to_string());
                ConfigurePreset {
                    name: format!("{}-{}", triplet, build_type.to_lowercase()),
                    display_name: Some(format!("{} {}", triplet, build_type)),
                    generator: Some("Ninja".to_string()),
                    binary_dir: BINARY_DIR.to_string(),
                    install_dir: Some(INSTALL_DIR.to_string()),
                    architecture: architecture.clone(),
                    cache_variables,
                }
            })
            .collect();

        PresetDocument {
            version: PRESETS_VERSION,
            configure_presets,
        }
    }

    fn cache_variables(
        &self,
        compiler: Compiler,
        triplet: &str,
        class: PlatformClass,
    ) -> IndexMap<String, String> {
        let mut cache = IndexMap::new();
        let mut set = |key: &str, value: String| {
            cache.insert(key.to_string(), value);
        };

        set("CMAKE_PRESET_NAME", "${presetName}".to_string());
        set(
            "CMAKE_TOOLCHAIN_FILE",
            forward_slashes(&self.toolchains.vcpkg_toolchain_file()),
        );

        match class {
            PlatformClass::Mobile => {
                set("CMAKE_SYSTEM_NAME", "Android".to_string());
                set(
                    "CMAKE_ANDROID_NDK",
                    self.toolchains.android_ndk_root().to_string(),
                );
                set("CMAKE_ANDROID_STL_TYPE", "c++_shared".to_string());
                set("VCPKG_TARGET_TRIPLET", triplet.to_string());
            }
            PlatformClass::Web => {
                let (cc, cxx) = self.compiler_pair(Compiler::Emcc);
                set("VCPKG_TARGET_TRIPLET", triplet.to_string());
                set("CMAKE_C_COMPILER", cc);
                set("CMAKE_CXX_COMPILER", cxx);
                set(
                    "VCPKG_CHAINLOAD_TOOLCHAIN_FILE",
                    forward_slashes(&self.toolchains.emscripten_toolchain_file()),
                );
            }
            PlatformClass::Native => {
                let (cc, cxx) = self.compiler_pair(compiler);
                set("CMAKE_C_COMPILER", cc);
                set("CMAKE_CXX_COMPILER", cxx);
            }
        }

        cache
    }

    fn compiler_pair(&self, compiler: Compiler) -> (String, String) {
        let (cc, cxx) = compiler.executables();
        if compiler == Compiler::Emcc && self.windows_host {
            (format!("{}.bat", cc), format!("{}.bat", cxx))
        } else {
            (cc.to_string(), cxx.to_string())
        }
    }
}
