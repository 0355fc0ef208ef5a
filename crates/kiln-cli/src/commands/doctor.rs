//! Doctor command - show the versions vcpkg can pin for each package

use super::{load_project, warning};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use kiln_config::{ConfigLoader, Toolchains};
use kiln_package::{summarize_versions, VersionIndex};
use serde_json::json;
use std::path::PathBuf;

/// Doctor command arguments
#[derive(Debug, Clone)]
pub struct DoctorArgs {
    /// Packages to check (defaults to the project's external dependencies)
    pub packages: Vec<String>,
    /// Directory to start the project search from
    pub dir: PathBuf,
    pub json: bool,
}

/// Run the doctor command
pub fn run(args: DoctorArgs) -> Result<()> {
    let (packages, toolchains) = if args.packages.is_empty() {
        let config = load_project(&args.dir)?;
        let toolchains = config.toolchains()?;
        let packages = config
            .project
            .external_packages()
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        (packages, toolchains)
    } else {
        let global = ConfigLoader::new()
            .load_global_config()
            .context("Failed to load global configuration")?;
        (args.packages.clone(), Toolchains::resolve(&global)?)
    };

    let index = VersionIndex::new(&toolchains.vcpkg_root);
    if !index.exists() {
        bail!(
            "vcpkg version database not found at {}; set KILN_VCPKG_ROOT or [toolchains] vcpkg",
            index.versions_dir().display()
        );
    }

    if packages.is_empty() {
        if args.json {
            println!("{{}}");
        } else {
            println!("No external packages to check");
        }
        return Ok(());
    }

    let mut report = serde_json::Map::new();
    for package in &packages {
        let versions = index
            .versions(package)
            .with_context(|| format!("Failed to read versions of '{}'", package))?;

        if args.json {
            let entry = match &versions {
                Some(v) => json!({ "versions": v, "summary": summarize_versions(v) }),
                None => json!({ "versions": null }),
            };
            report.insert(package.clone(), entry);
            continue;
        }

        match versions {
            Some(v) if !v.is_empty() => {
                println!("{}: {}", package.bold(), summarize_versions(&v));
            }
            Some(_) => println!("{}: {}", package.bold(), "no published versions".dimmed()),
            None => warning(format!("'{}' is not a known vcpkg port", package)),
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
