//! Generate command - write CMake configuration for the current project

use super::{load_project, status, warning};
use anyhow::{Context, Result};
use kiln_build::{FileStatus, GenerationReport, Generator};
use kiln_package::VcpkgResolver;
use std::path::PathBuf;

/// Generate command arguments
#[derive(Debug, Clone)]
pub struct GenerateArgs {
    /// Directory to start the project search from
    pub dir: PathBuf,
    /// Print the report as JSON
    pub json: bool,
    /// Suppress per-file lines and vcpkg output
    pub quiet: bool,
}

/// Run the generate command
///
/// Package resolution failures are reported but do not fail the command.
pub fn run(args: GenerateArgs) -> Result<()> {
    let config = load_project(&args.dir)?;
    let toolchains = config
        .toolchains()
        .context("Failed to resolve toolchain locations")?;

    let resolver = VcpkgResolver::new(toolchains.clone()).with_echo(!args.quiet && !args.json);
    let report = Generator::new(&config.project_root, &config.project, &toolchains, &resolver)
        .generate()
        .context("Generation failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, args.quiet);
    }
    Ok(())
}

fn print_report(report: &GenerationReport, quiet: bool) {
    if !quiet {
        for file in &report.files {
            match file.status {
                FileStatus::Written => status("Wrote", file.path.display()),
                FileStatus::Unchanged => status("Unchanged", file.path.display()),
            }
        }
    }

    for w in &report.warnings {
        let package = match &w.version {
            Some(version) => format!("{}@{}", w.package, version),
            None => w.package.clone(),
        };
        warning(format!(
            "target '{}': package '{}' was not resolved: {}",
            w.target, package, w.message
        ));
    }

    status(
        "Generated",
        format!(
            "{} for {} ({} targets, {} written, {} unchanged) in {:.2}s",
            report.project,
            report.platform,
            report.targets.len(),
            report.written(),
            report.unchanged(),
            report.duration.as_secs_f64()
        ),
    );
}
