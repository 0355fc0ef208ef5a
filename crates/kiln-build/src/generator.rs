//! Project generation pipeline
//!
//! Validates the build order, then writes presets, the format style, every
//! target document in build order, the shared options and the aggregator.
//! Configuration errors stop the run before the first write; package
//! resolution failures only produce warnings.

use crate::aggregator::emit_aggregator;
use crate::build_order::BuildOrder;
use crate::commons::{commons_document, CLANG_FORMAT};
use crate::error::BuildResult;
use crate::layout::{write_if_changed, FileStatus, ProjectLayout};
use crate::presets::{PlatformClass, PresetSynthesizer};
use crate::target_config::{ResolutionWarning, TargetEmitter};
use kiln_config::{ProjectDescriptor, Toolchains};
use kiln_package::PackageResolver;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A file produced by generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    /// Path relative to the project root
    pub path: PathBuf,
    pub status: FileStatus,
}

/// Summary of one generation run
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub project: String,
    pub platform: String,
    pub platform_class: PlatformClass,
    /// Targets in build order
    pub targets: Vec<String>,
    pub files: Vec<GeneratedFile>,
    pub warnings: Vec<ResolutionWarning>,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

fn serialize_millis<S: serde::Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(duration.as_millis() as u64)
}

impl GenerationReport {
    pub fn written(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.status == FileStatus::Written)
            .count()
    }

    pub fn unchanged(&self) -> usize {
        self.files.len() - self.written()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Generates CMake configuration for a project
pub struct Generator<'a, R: PackageResolver + ?Sized> {
    layout: ProjectLayout,
    project: &'a ProjectDescriptor,
    toolchains: &'a Toolchains,
    resolver: &'a R,
    windows_host: bool,
}

impl<'a, R: PackageResolver + ?Sized> Generator<'a, R> {
    /// Create a generator writing below `root`
    pub fn new(
        root: impl Into<PathBuf>,
        project: &'a ProjectDescriptor,
        toolchains: &'a Toolchains,
        resolver: &'a R,
    ) -> Self {
        Self {
            layout: ProjectLayout::new(root),
            project,
            toolchains,
            resolver,
            windows_host: cfg!(windows),
        }
    }

    /// Override host detection for preset compiler names
    pub fn with_windows_host(mut self, windows_host: bool) -> Self {
        self.windows_host = windows_host;
        self
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Run the full pipeline
    pub fn generate(&self) -> BuildResult<GenerationReport> {
        let start = Instant::now();
        let order = BuildOrder::new(self.project)?;

        info!(
            project = %self.project.name,
            platform = %self.project.platform,
            targets = self.project.targets.len(),
            "generating project files"
        );

        let mut files = Vec::new();
        let mut warnings = Vec::new();

        let presets = PresetSynthesizer::new(self.toolchains)
            .with_windows_host(self.windows_host)
            .synthesize(self.project.compiler, &self.project.platform);
        self.write(&self.layout.presets_file(), &presets.to_json_string()?, &mut files)?;
        self.write(&self.layout.clang_format_file(), CLANG_FORMAT, &mut files)?;

        let emitter = TargetEmitter::new(order, self.resolver);
        for target in order.targets() {
            self.layout.create_target_dirs(&target.name)?;
            let document = emitter.emit(target, order.is_root(&target.name))?;
            self.write(
                &self.layout.target_cmake_file(&target.name),
                &document.text,
                &mut files,
            )?;
            warnings.extend(document.warnings);
        }

        self.write(&self.layout.commons_file(), &commons_document(), &mut files)?;
        self.write(&self.layout.aggregator_file(), &emit_aggregator(&order), &mut files)?;

        let report = GenerationReport {
            project: self.project.name.clone(),
            platform: self.project.platform.clone(),
            platform_class: PlatformClass::classify(&self.project.platform),
            targets: order.names().into_iter().map(String::from).collect(),
            files,
            warnings,
            duration: start.elapsed(),
        };

        info!(
            written = report.written(),
            unchanged = report.unchanged(),
            warnings = report.warnings.len(),
            "generation finished in {:.2}s",
            report.duration.as_secs_f64()
        );
        Ok(report)
    }

    fn write(&self, path: &Path, content: &str, files: &mut Vec<GeneratedFile>) -> BuildResult<()> {
        let status = write_if_changed(path, content)?;
        let relative = self.layout.relative(path).to_path_buf();
        debug!(path = %relative.display(), status = ?status, "generated file");
        files.push(GeneratedFile {
            path: relative,
            status,
        });
        Ok(())
    }
}
