//! Configure, build and run through CMake presets
//!
//! Output of the external tools goes straight to the terminal.

use crate::error::{BuildError, BuildResult};
use crate::layout::ProjectLayout;
use crate::presets::{ConfigurePreset, PresetDocument};
use crate::targets::{is_wasm, CmakeTarget};
use kiln_config::{ProjectDescriptor, Tool, Toolchains};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Timing of a configure + build run
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    pub configure_time: Duration,
    pub build_time: Duration,
}

impl BuildStats {
    pub fn total(&self) -> Duration {
        self.configure_time + self.build_time
    }
}

/// Drives cmake for a generated project
pub struct BuildDriver<'a> {
    layout: ProjectLayout,
    toolchains: &'a Toolchains,
}

impl<'a> BuildDriver<'a> {
    pub fn new(root: impl Into<PathBuf>, toolchains: &'a Toolchains) -> Self {
        Self {
            layout: ProjectLayout::new(root),
            toolchains,
        }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Read the generated preset document
    pub fn load_presets(&self) -> BuildResult<PresetDocument> {
        PresetDocument::load(&self.layout.presets_file())
    }

    /// Build directory of `preset`
    pub fn binary_dir(&self, preset: &ConfigurePreset) -> PathBuf {
        preset.binary_dir_in(self.layout.root())
    }

    /// Remove every build tree; returns false when there was nothing to remove
    pub fn clean(&self) -> BuildResult<bool> {
        let out = self.layout.out_dir();
        if !out.exists() {
            return Ok(false);
        }
        info!(dir = %out.display(), "removing build trees");
        std::fs::remove_dir_all(&out).map_err(|e| BuildError::io(&out, e))?;
        Ok(true)
    }

    /// `cmake --preset <name> -DCMAKE_MAKE_PROGRAM=<ninja>` then `cmake --build <dir>`
    pub fn build(&self, preset: &ConfigurePreset) -> BuildResult<BuildStats> {
        let cmake = self.toolchains.locate(Tool::Cmake)?;
        let ninja = self.toolchains.locate(Tool::Ninja)?;
        let mut stats = BuildStats::default();

        let start = Instant::now();
        let mut make_program = OsString::from("-DCMAKE_MAKE_PROGRAM=");
        make_program.push(ninja.as_os_str());
        let mut configure = Command::new(&cmake);
        configure
            .arg("--preset")
            .arg(&preset.name)
            .arg(make_program)
            .current_dir(self.layout.root());
        self.run_step("configure", configure)?;
        stats.configure_time = start.elapsed();

        let start = Instant::now();
        let mut build = Command::new(&cmake);
        build
            .arg("--build")
            .arg(self.binary_dir(preset))
            .current_dir(self.layout.root());
        self.run_step("build", build)?;
        stats.build_time = start.elapsed();

        Ok(stats)
    }

    /// Built executable of the root target
    pub fn executable_path(&self, preset: &ConfigurePreset, project: &ProjectDescriptor) -> PathBuf {
        let root = project.targets.root();
        let file = CmakeTarget::new(&root.name, root.kind).executable_file_name(&project.platform);
        self.binary_dir(preset).join("src").join(&root.name).join(file)
    }

    /// Run the root target's executable with `args`; wasm builds run under node
    pub fn run(
        &self,
        preset: &ConfigurePreset,
        project: &ProjectDescriptor,
        args: &[String],
    ) -> BuildResult<ExitStatus> {
        let executable = self.executable_path(preset, project);
        if !executable.is_file() {
            return Err(BuildError::ExecutableNotFound { path: executable });
        }

        let mut command = if is_wasm(&project.platform) {
            let node = self.toolchains.locate(Tool::Node)?;
            let mut command = Command::new(node);
            command.arg(&executable);
            command
        } else {
            Command::new(&executable)
        };
        command.args(args).current_dir(self.layout.root());

        info!(executable = %executable.display(), "running");
        command.status().map_err(|e| BuildError::io(&executable, e))
    }

    fn run_step(&self, step: &str, mut command: Command) -> BuildResult<()> {
        debug!(step, command = ?command, "running");
        let program = PathBuf::from(command.get_program());
        let status = command
            .status()
            .map_err(|e| BuildError::io(program.as_path(), e))?;
        if !status.success() {
            return Err(BuildError::command_failed(step, status));
        }
        Ok(())
    }
}
