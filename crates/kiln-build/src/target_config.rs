//! Per-target CMakeLists.txt emission
//!
//! Statement order: minimum version, shared options include, source glob,
//! target declaration, precompiled standard headers (C++ only), one fragment
//! per external dependency, one link statement for internal dependencies and,
//! for the root target, a post-build copy of the compile database.

use crate::build_order::BuildOrder;
use crate::document::{CMakeDocument, COMMONS_FILE_NAME, MINIMUM_VERSION};
use crate::error::BuildResult;
use crate::targets::CmakeTarget;
use kiln_config::{ConfigError, Language, TargetDescriptor};
use kiln_package::{PackageRequest, PackageResolver};
use serde::Serialize;
use tracing::{debug, warn};

/// An external dependency that could not be resolved
///
/// The target's document is still emitted, without this dependency's directives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionWarning {
    pub target: String,
    pub package: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub message: String,
}

/// Emitted document for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDocument {
    pub target: String,
    pub text: String,
    /// External dependencies whose directives were included
    pub resolved: Vec<String>,
    pub warnings: Vec<ResolutionWarning>,
}

/// Emits target documents, resolving external packages through `R`
pub struct TargetEmitter<'a, R: PackageResolver + ?Sized> {
    order: BuildOrder<'a>,
    resolver: &'a R,
}

impl<'a, R: PackageResolver + ?Sized> TargetEmitter<'a, R> {
    pub fn new(order: BuildOrder<'a>, resolver: &'a R) -> Self {
        Self { order, resolver }
    }

    /// Emit the document for `target`
    ///
    /// Resolution failures are collected as warnings; only a root target whose
    /// name differs from the project name is an error.
    pub fn emit(&self, target: &'a TargetDescriptor, is_root: bool) -> BuildResult<TargetDocument> {
        let project = self.order.project();
        if is_root && target.name != project.name {
            return Err(ConfigError::RootMismatch {
                expected: project.name.clone(),
                found: target.name.clone(),
            }
            .into());
        }

        let cmake = CmakeTarget::new(&target.name, target.kind);
        let mut doc = CMakeDocument::new();
        doc.line(MINIMUM_VERSION)
            .line(format!("include(\"../../{}\")", COMMONS_FILE_NAME))
            .line(cmake.source_glob())
            .blank()
            .line(cmake.declaration());

        if project.language == Language::Cxx {
            doc.blank()
                .line(format!("kiln_precompile_std_headers({})", target.name));
        }

        let mut resolved = Vec::new();
        let mut warnings = Vec::new();
        for dep in self.order.external_dependencies(target) {
            let request = PackageRequest::new(&dep.name, &target.name, &project.platform)
                .with_version(dep.version.clone());

            match self.resolver.resolve(&request) {
                Ok(fragment) => {
                    debug!(package = %dep.name, "fragment appended");
                    doc.raw(fragment.to_cmake());
                    resolved.push(dep.name.clone());
                }
                Err(e) => {
                    warn!(
                        package = %dep.name,
                        consumer = %target.name,
                        "could not resolve package, continuing without it: {}",
                        e
                    );
                    warnings.push(ResolutionWarning {
                        target: target.name.clone(),
                        package: dep.name.clone(),
                        version: dep.version.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let internal = self.order.internal_dependencies(target);
        if !internal.is_empty() {
            doc.line(format!(
                "target_link_libraries({} {})",
                target.name,
                internal.join(" ")
            ));
        }

        if is_root {
            doc.raw(export_compile_commands(&target.name));
        }

        Ok(TargetDocument {
            target: target.name.clone(),
            text: doc.into_string(),
            resolved,
            warnings,
        })
    }
}

/// Post-build step copying the active preset's compile database to the root
fn export_compile_commands(target: &str) -> String {
    format!(
        "add_custom_command(\n    \
         TARGET {} POST_BUILD\n    \
         COMMAND ${{CMAKE_COMMAND}} -E copy\n            \
         \"${{CMAKE_SOURCE_DIR}}/out/build/${{CMAKE_PRESET_NAME}}/compile_commands.json\"\n            \
         \"${{CMAKE_SOURCE_DIR}}/compile_commands.json\"\n\
         )\n",
        target
    )
}
