//! Build command - configure, build and optionally run through CMake presets

use super::{load_project, status, warning};
use anyhow::{Context, Result};
use kiln_build::BuildDriver;
use std::path::PathBuf;
use std::process::ExitCode;

/// Build command arguments
#[derive(Debug, Clone, Default)]
pub struct BuildArgs {
    /// Preset name (defaults to the first preset)
    pub preset: Option<String>,
    /// List presets and exit
    pub list: bool,
    /// Remove all build trees first
    pub clean: bool,
    /// Run the root executable after building
    pub run: bool,
    /// Arguments passed to the executable
    pub args: Vec<String>,
    /// Directory to start the project search from
    pub dir: PathBuf,
    pub quiet: bool,
}

/// Run the build command; the exit code is the program's when `--run` is given
pub fn run(args: BuildArgs) -> Result<ExitCode> {
    let config = load_project(&args.dir)?;
    let toolchains = config
        .toolchains()
        .context("Failed to resolve toolchain locations")?;
    let driver = BuildDriver::new(&config.project_root, &toolchains);

    let presets = driver.load_presets()?;
    let presets_file = driver.layout().presets_file();

    if args.list {
        for preset in &presets.configure_presets {
            println!("{:<32} {}", preset.name, preset.label());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let preset = presets.select(args.preset.as_deref(), &presets_file)?;

    if args.clean && driver.clean()? && !args.quiet {
        status("Cleaned", driver.layout().out_dir().display());
    }

    if !args.quiet {
        status("Building", format!("{} [{}]", config.project.name, preset.label()));
    }
    let stats = driver.build(preset)?;
    if !args.quiet {
        status(
            "Finished",
            format!(
                "{} in {:.2}s (configure {:.2}s, build {:.2}s)",
                preset.name,
                stats.total().as_secs_f64(),
                stats.configure_time.as_secs_f64(),
                stats.build_time.as_secs_f64()
            ),
        );
    }

    if !args.run {
        return Ok(ExitCode::SUCCESS);
    }

    if !args.quiet {
        status(
            "Running",
            driver.executable_path(preset, &config.project).display(),
        );
    }
    let exit = driver.run(preset, &config.project, &args.args)?;
    if exit.success() {
        return Ok(ExitCode::SUCCESS);
    }

    warning(format!("{} exited with {}", config.project.name, exit));
    let code = exit
        .code()
        .and_then(|c| u8::try_from(c).ok())
        .filter(|c| *c != 0)
        .unwrap_or(1);
    Ok(ExitCode::from(code))
}
