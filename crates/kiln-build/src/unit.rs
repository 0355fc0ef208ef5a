//! Header/source pair scaffolding for a target

use crate::error::{BuildError, BuildResult};
use crate::layout::ProjectLayout;
use kiln_config::{Language, ProjectDescriptor};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// A created (or already present) unit file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitFile {
    pub path: PathBuf,
    /// False when the file existed and was left untouched
    pub created: bool,
}

/// Creates header/source pairs inside target directories
pub struct UnitScaffolder<'a> {
    layout: ProjectLayout,
    project: &'a ProjectDescriptor,
}

impl<'a> UnitScaffolder<'a> {
    pub fn new(root: impl Into<PathBuf>, project: &'a ProjectDescriptor) -> Self {
        Self {
            layout: ProjectLayout::new(root),
            project,
        }
    }

    /// Create `<unit>.hpp`/`<unit>.cpp` (or `.h`/`.c`) in `target`.
    /// Existing files are never overwritten.
    pub fn create(&self, target: &str, unit: &str) -> BuildResult<[UnitFile; 2]> {
        if !self.project.targets.contains(target) {
            return Err(BuildError::target_not_found(target));
        }
        validate_unit_name(unit)?;

        let (header_ext, source_ext) = match self.project.language {
            Language::Cxx => ("hpp", "cpp"),
            Language::C => ("h", "c"),
        };

        let header = self
            .layout
            .target_include_dir(target)
            .join(format!("{}.{}", unit, header_ext));
        let source = self
            .layout
            .target_source_dir(target)
            .join(format!("{}.{}", unit, source_ext));

        self.layout.create_target_dirs(target)?;
        let header = self.write_new(header, &header_text(self.project.language, target, unit))?;
        let source = self.write_new(
            source,
            &format!("#include <{}/{}.{}>\n", target, unit, header_ext),
        )?;
        Ok([header, source])
    }

    fn write_new(&self, path: PathBuf, content: &str) -> BuildResult<UnitFile> {
        let relative = self.layout.relative(&path).to_path_buf();
        if path.exists() {
            warn!(path = %relative.display(), "file already exists, skipping");
            return Ok(UnitFile {
                path: relative,
                created: false,
            });
        }
        fs::write(&path, content).map_err(|e| BuildError::io(&path, e))?;
        info!(path = %relative.display(), "created");
        Ok(UnitFile {
            path: relative,
            created: true,
        })
    }
}

fn validate_unit_name(unit: &str) -> BuildResult<()> {
    let reason = if unit.trim().is_empty() {
        Some("name cannot be empty")
    } else if unit.contains(['/', '\\']) {
        Some("name cannot contain path separators")
    } else if unit == "." || unit == ".." {
        Some("name cannot be a relative directory")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(BuildError::InvalidUnitName {
            name: unit.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

fn header_text(language: Language, target: &str, unit: &str) -> String {
    let (suffix, body) = match language {
        Language::Cxx => ("HPP", format!("namespace {} {{\n\n}}\n", target)),
        Language::C => ("H", String::new()),
    };
    let guard = format!("_{}_{}_", unit.to_uppercase(), suffix);

    let mut text = format!("#ifndef {}\n#define {}\n\n", guard, guard);
    if !body.is_empty() {
        text.push_str(&body);
        text.push('\n');
    }
    text.push_str(&format!("#endif // {}\n", guard));
    text
}
