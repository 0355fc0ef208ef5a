//! Kiln Package Resolution
//!
//! Materializes external dependencies through vcpkg and turns its usage
//! hints into CMake fragments, plus a read-only index over vcpkg's local
//! version database.

pub mod fragment;
pub mod manifest;
pub mod resolver;
pub mod versions;

pub use fragment::ResolvedFragment;
pub use manifest::{VcpkgManifest, VersionOverride, PLACEHOLDER_BASELINE};
pub use resolver::{PackageRequest, PackageResolver, VcpkgResolver};
pub use versions::{summarize_versions, VersionIndex};

use kiln_config::ToolchainMissing;

/// Package resolution errors
///
/// All of these are recoverable at generation time: the caller degrades the
/// affected dependency to an empty fragment and reports a warning.
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error(transparent)]
    Toolchain(#[from] ToolchainMissing),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to write manifest: {0}")]
    ManifestError(#[from] serde_json::Error),

    #[error("vcpkg install of '{package}' for {triplet} failed ({status})")]
    InstallFailed {
        package: String,
        triplet: String,
        status: String,
    },

    #[error("Invalid version file {path}: {reason}")]
    InvalidVersionFile { path: String, reason: String },
}

pub type Result<T> = std::result::Result<T, PackageError>;
