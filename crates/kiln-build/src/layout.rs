//! On-disk layout of a generated project
//!
//! ```text
//! <root>/
//!   kiln.toml
//!   CMakePresets.json
//!   .clang-format
//!   CMakeCommons.cmake
//!   CMakeLists.txt
//!   src/<target>/CMakeLists.txt
//!   src/<target>/include/<target>/
//!   src/<target>/src/
//!   out/                (build trees, one per preset)
//! ```

use crate::commons::CLANG_FORMAT_FILE_NAME;
use crate::document::COMMONS_FILE_NAME;
use crate::error::{BuildError, BuildResult};
use crate::presets::PRESETS_FILE_NAME;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of writing one generated file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Written,
    Unchanged,
}

/// Paths of a project rooted at an explicit directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn presets_file(&self) -> PathBuf {
        self.root.join(PRESETS_FILE_NAME)
    }

    pub fn clang_format_file(&self) -> PathBuf {
        self.root.join(CLANG_FORMAT_FILE_NAME)
    }

    pub fn commons_file(&self) -> PathBuf {
        self.root.join(COMMONS_FILE_NAME)
    }

    pub fn aggregator_file(&self) -> PathBuf {
        self.root.join("CMakeLists.txt")
    }

    /// Build trees of all presets
    pub fn out_dir(&self) -> PathBuf {
        self.root.join("out")
    }

    pub fn target_dir(&self, target: &str) -> PathBuf {
        self.root.join("src").join(target)
    }

    pub fn target_cmake_file(&self, target: &str) -> PathBuf {
        self.target_dir(target).join("CMakeLists.txt")
    }

    /// Public headers, included as `<target>/<header>`
    pub fn target_include_dir(&self, target: &str) -> PathBuf {
        self.target_dir(target).join("include").join(target)
    }

    pub fn target_source_dir(&self, target: &str) -> PathBuf {
        self.target_dir(target).join("src")
    }

    /// Create the include and source directories of `target`
    pub fn create_target_dirs(&self, target: &str) -> BuildResult<()> {
        for dir in [self.target_include_dir(target), self.target_source_dir(target)] {
            fs::create_dir_all(&dir).map_err(|e| BuildError::io(&dir, e))?;
        }
        Ok(())
    }

    /// Path relative to the root, for display
    pub fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

/// Replace `path` with `content` unless it already holds exactly those bytes
pub fn write_if_changed(path: &Path, content: &str) -> BuildResult<FileStatus> {
    if let Ok(existing) = fs::read(path) {
        if existing == content.as_bytes() {
            return Ok(FileStatus::Unchanged);
        }
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| BuildError::io(path, e))?;
    Ok(FileStatus::Written)
}
