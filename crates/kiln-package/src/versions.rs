//! Read-only view of vcpkg's local version database
//!
//! vcpkg keeps one JSON file per port under
//! `versions/<first letter>-/<port>.json`, listing every published version
//! newest first.

use crate::{PackageError, Result};
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Majors shown before the summary is cut off
const MAX_GROUPS: usize = 5;

/// Groups up to this size are listed in full
const FULL_GROUP_LEN: usize = 3;

#[derive(Debug, Deserialize)]
struct VersionFile {
    #[serde(default)]
    versions: Vec<VersionEntry>,
}

#[derive(Debug, Deserialize)]
struct VersionEntry {
    version: Option<String>,
    #[serde(rename = "version-string")]
    version_string: Option<String>,
    #[serde(rename = "version-semver")]
    version_semver: Option<String>,
    #[serde(rename = "version-date")]
    version_date: Option<String>,
}

impl VersionEntry {
    fn into_version(self) -> String {
        self.version
            .or(self.version_string)
            .or(self.version_semver)
            .or(self.version_date)
            .unwrap_or_else(|| ".".to_string())
    }
}

/// Version database of a vcpkg checkout
#[derive(Debug, Clone)]
pub struct VersionIndex {
    versions_dir: PathBuf,
}

impl VersionIndex {
    pub fn new(vcpkg_root: &Path) -> Self {
        Self {
            versions_dir: vcpkg_root.join("versions"),
        }
    }

    /// Whether the checkout has a version database at all
    pub fn exists(&self) -> bool {
        self.versions_dir.is_dir()
    }

    pub fn versions_dir(&self) -> &Path {
        &self.versions_dir
    }

    /// Location of the version file for `package`
    pub fn version_file(&self, package: &str) -> Option<PathBuf> {
        let first = package.chars().next()?.to_lowercase().next()?;
        Some(
            self.versions_dir
                .join(format!("{}-", first))
                .join(format!("{}.json", package)),
        )
    }

    /// Published versions of `package`, newest first; `None` if the port is unknown
    pub fn versions(&self, package: &str) -> Result<Option<Vec<String>>> {
        let Some(path) = self.version_file(package) else {
            return Ok(None);
        };
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let file: VersionFile =
            serde_json::from_str(&content).map_err(|e| PackageError::InvalidVersionFile {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        Ok(Some(
            file.versions
                .into_iter()
                .map(VersionEntry::into_version)
                .collect(),
        ))
    }
}

/// One-line summary of `versions`, grouped by major component
///
/// Majors are listed highest first. A group of at most three versions is
/// shown in full, a larger one as `first, second, ... last`. After five
/// groups the rest is elided with ` | ...`.
pub fn summarize_versions(versions: &[String]) -> String {
    let mut groups: BTreeMap<MajorKey<'_>, Vec<&str>> = BTreeMap::new();
    for version in versions {
        let major = version.split('.').next().unwrap_or(".");
        groups.entry(MajorKey(major)).or_default().push(version);
    }

    let total = groups.len();
    let mut parts: Vec<String> = groups
        .into_iter()
        .rev()
        .take(MAX_GROUPS)
        .map(|(_, group)| {
            if group.len() <= FULL_GROUP_LEN {
                group.join(", ")
            } else {
                format!("{}, {}, ... {}", group[0], group[1], group[group.len() - 1])
            }
        })
        .collect();

    if total > MAX_GROUPS {
        parts.push("...".to_string());
    }
    parts.join(" | ")
}

/// Major component ordered numerically when both sides are numbers
#[derive(Debug, PartialEq, Eq)]
struct MajorKey<'a>(&'a str);

impl Ord for MajorKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.parse::<u64>(), other.0.parse::<u64>()) {
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(other.0)),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => self.0.cmp(other.0),
        }
    }
}

impl PartialOrd for MajorKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
