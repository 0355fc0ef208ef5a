//! Build order of a project's targets
//!
//! The declared order of `[[target]]` entries is the build order: nothing is
//! reordered or inferred from dependency lists. The last target is the root
//! and must carry the project's name.

use crate::error::BuildResult;
use kiln_config::{ConfigError, Dependency, ProjectDescriptor, TargetDescriptor};
use tracing::warn;

/// A dependency on a target declared after the dependent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardReference {
    pub target: String,
    pub dependency: String,
}

/// Validated build order over a project's targets
#[derive(Debug, Clone, Copy)]
pub struct BuildOrder<'a> {
    project: &'a ProjectDescriptor,
}

impl<'a> BuildOrder<'a> {
    /// Validate the root target against the project name
    pub fn new(project: &'a ProjectDescriptor) -> BuildResult<Self> {
        let root = project.targets.root();
        if root.name != project.name {
            return Err(ConfigError::RootMismatch {
                expected: project.name.clone(),
                found: root.name.clone(),
            }
            .into());
        }

        let order = Self { project };
        for reference in order.forward_references() {
            warn!(
                dependent = %reference.target,
                dependency = %reference.dependency,
                "target links against a target declared after it; move '{}' above '{}'",
                reference.dependency,
                reference.target
            );
        }
        Ok(order)
    }

    pub fn project(&self) -> &'a ProjectDescriptor {
        self.project
    }

    /// Target names in build order
    pub fn names(&self) -> Vec<&'a str> {
        self.project.targets.names()
    }

    /// Targets in build order
    pub fn targets(&self) -> impl Iterator<Item = &'a TargetDescriptor> {
        self.project.targets.iter()
    }

    /// The root (last) target
    pub fn root(&self) -> &'a TargetDescriptor {
        self.project.targets.root()
    }

    pub fn is_root(&self, name: &str) -> bool {
        self.root().name == name
    }

    /// Dependencies naming declared targets, in declared order
    pub fn internal_dependencies(&self, target: &'a TargetDescriptor) -> Vec<&'a str> {
        target
            .dependencies
            .iter()
            .filter(|dep| self.project.targets.contains(&dep.name))
            .map(|dep| dep.name.as_str())
            .collect()
    }

    /// Dependencies resolved through the package manager, in declared order
    pub fn external_dependencies(&self, target: &'a TargetDescriptor) -> Vec<&'a Dependency> {
        target
            .dependencies
            .iter()
            .filter(|dep| !self.project.targets.contains(&dep.name))
            .collect()
    }

    /// Internal dependencies that point forward in build order
    pub fn forward_references(&self) -> Vec<ForwardReference> {
        let targets = &self.project.targets;
        let mut references = Vec::new();
        for (index, target) in targets.iter().enumerate() {
            for dep in self.internal_dependencies(target) {
                if targets.position(dep).map_or(false, |pos| pos > index) {
                    references.push(ForwardReference {
                        target: target.name.clone(),
                        dependency: dep.to_string(),
                    });
                }
            }
        }
        references
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use kiln_config::{Compiler, Language, TargetKind, TargetList};

    fn project(name: &str, targets: Vec<TargetDescriptor>) -> ProjectDescriptor {
        ProjectDescriptor::new(
            name,
            Language::Cxx,
            "20",
            Compiler::Clang,
            "x64-linux",
            TargetList::new(targets).unwrap(),
        )
    }

    fn game() -> ProjectDescriptor {
        project(
            "game",
            vec![
                TargetDescriptor::new("core", TargetKind::StaticLibrary)
                    .with_dependency(Dependency::new("fmt")),
                TargetDescriptor::new("engine", TargetKind::DynamicLibrary)
                    .with_dependency(Dependency::new("core"))
                    .with_dependency(Dependency::new("sdl2")),
                TargetDescriptor::new("game", TargetKind::Binary)
                    .with_dependency(Dependency::new("engine"))
                    .with_dependency(Dependency::new("lua").with_version("5.4.7"))
                    .with_dependency(Dependency::new("core")),
            ],
        )
    }

    #[test]
    fn test_order_is_declaration_order() {
        let project = game();
        let order = BuildOrder::new(&project).unwrap();
        assert_eq!(order.names(), vec!["core", "engine", "game"]);
        assert_eq!(order.root().name, "game");
        assert!(order.is_root("game"));
        assert!(!order.is_root("core"));
    }

    #[test]
    fn test_root_mismatch_is_config_error() {
        let project = project(
            "app",
            vec![
                TargetDescriptor::new("app", TargetKind::Binary),
                TargetDescriptor::new("tool", TargetKind::Binary),
            ],
        );

        let err = BuildOrder::new(&project).unwrap_err();
        assert!(err.is_config());
        assert!(matches!(
            err,
            BuildError::Config(ConfigError::RootMismatch { ref expected, ref found })
                if expected == "app" && found == "tool"
        ));
    }

    #[test]
    fn test_dependency_split_keeps_declared_order() {
        let project = game();
        let order = BuildOrder::new(&project).unwrap();
        let root = order.root();

        assert_eq!(order.internal_dependencies(root), vec!["engine", "core"]);
        let external: Vec<_> = order
            .external_dependencies(root)
            .iter()
            .map(|d| (d.name.as_str(), d.version.as_deref()))
            .collect();
        assert_eq!(external, vec![("lua", Some("5.4.7"))]);
    }

    #[test]
    fn test_forward_reference_is_reported_not_rejected() {
        let project = project(
            "app",
            vec![
                TargetDescriptor::new("util", TargetKind::StaticLibrary)
                    .with_dependency(Dependency::new("base")),
                TargetDescriptor::new("base", TargetKind::StaticLibrary),
                TargetDescriptor::new("app", TargetKind::Binary)
                    .with_dependency(Dependency::new("util")),
            ],
        );

        let order = BuildOrder::new(&project).unwrap();
        assert_eq!(
            order.forward_references(),
            vec![ForwardReference {
                target: "util".to_string(),
                dependency: "base".to_string(),
            }]
        );
        assert_eq!(order.names(), vec!["util", "base", "app"]);
    }
}
