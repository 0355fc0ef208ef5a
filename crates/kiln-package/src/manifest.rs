//! Temporary vcpkg manifest for version-pinned installs

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Baseline used when the vcpkg checkout revision cannot be read
pub const PLACEHOLDER_BASELINE: &str = "0000000000000000000000000000000000000000";

/// File name vcpkg looks for in manifest mode
pub const MANIFEST_FILE_NAME: &str = "vcpkg.json";

/// Minimal `vcpkg.json` pinning a single package
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VcpkgManifest {
    pub dependencies: Vec<String>,
    pub overrides: Vec<VersionOverride>,
    #[serde(rename = "builtin-baseline")]
    pub builtin_baseline: String,
}

/// Entry of the manifest `overrides` array
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionOverride {
    pub name: String,
    pub version: String,
}

impl VcpkgManifest {
    /// Pin `package` to exactly `version`
    pub fn pinned(
        package: impl Into<String>,
        version: impl Into<String>,
        baseline: impl Into<String>,
    ) -> Self {
        let package = package.into();
        Self {
            dependencies: vec![package.clone()],
            overrides: vec![VersionOverride {
                name: package,
                version: version.into(),
            }],
            builtin_baseline: baseline.into(),
        }
    }

    /// Serialize into `dir/vcpkg.json`
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(MANIFEST_FILE_NAME);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

/// Revision of the vcpkg checkout, used as `builtin-baseline`
///
/// Falls back to [`PLACEHOLDER_BASELINE`] when git is unavailable or the
/// directory is not a checkout.
pub fn read_baseline(vcpkg_root: &Path) -> String {
    let output = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(vcpkg_root)
        .output();

    match output {
        Ok(out) if out.status.success() => {
            let sha = String::from_utf8_lossy(&out.stdout).trim().to_string();
            if sha.is_empty() {
                PLACEHOLDER_BASELINE.to_string()
            } else {
                sha
            }
        }
        Ok(out) => {
            debug!(status = %out.status, "git rev-parse failed, using placeholder baseline");
            PLACEHOLDER_BASELINE.to_string()
        }
        Err(e) => {
            debug!(error = %e, "git unavailable, using placeholder baseline");
            PLACEHOLDER_BASELINE.to_string()
        }
    }
}
