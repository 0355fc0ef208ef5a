//! Project Descriptor (kiln.toml)
//!
//! The descriptor is a static TOML document. It is parsed into a raw
//! [`ProjectFile`] and then validated into an immutable [`ProjectDescriptor`].
//! Target order in the file is the build order: every target must be listed
//! after the targets it links against, and the last target is the root.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name of the project descriptor
pub const PROJECT_FILE_NAME: &str = "kiln.toml";

/// Raw descriptor document as written by the user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
    /// Project-wide settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectSection>,

    /// Targets in build order
    #[serde(default, rename = "target")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<TargetSection>,
}

/// `[project]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    /// Project name (must equal the last target's name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// "C" or "C++"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Language standard, passed through verbatim ("17", "20", "11", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard: Option<String>,

    /// "clang", "gcc" or "emcc"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,

    /// vcpkg triplet, e.g. "x64-windows", "wasm32-emscripten", "arm64-android"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

/// `[[target]]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct TargetSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// "binary", "static-library" or "dynamic-library"
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencyEntry>,
}

/// Dependency entry: either a bare name or a table with an optional version
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DependencyEntry {
    /// `"zlib"`
    Name(String),
    /// `{ name = "zlib", version = "1.3" }`
    Detailed(DetailedDependency),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DetailedDependency {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl DependencyEntry {
    fn into_dependency(self) -> Dependency {
        match self {
            DependencyEntry::Name(name) => Dependency::new(name),
            DependencyEntry::Detailed(d) => Dependency {
                name: d.name,
                version: d.version.filter(|v| !v.trim().is_empty()),
            },
        }
    }
}

impl ProjectFile {
    /// Parse a descriptor from TOML text; `origin` is used for error messages
    pub fn parse(content: &str, origin: &Path) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::TomlParseError {
            file: origin.to_path_buf(),
            error: e,
        })
    }

    /// Validate and convert into a [`ProjectDescriptor`]
    pub fn into_descriptor(self, origin: &Path) -> ConfigResult<ProjectDescriptor> {
        let project = self.project.ok_or_else(|| missing("project", origin))?;

        let name = require(project.name, "project.name", origin)?;
        validate_identifier("project.name", &name)?;

        let language: Language = require(project.language, "project.language", origin)?.parse()?;
        let standard = require(project.standard, "project.standard", origin)?;
        let compiler: Compiler = require(project.compiler, "project.compiler", origin)?.parse()?;
        let platform = require(project.platform, "project.platform", origin)?;
        if platform.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "project.platform".to_string(),
                reason: "platform triplet cannot be empty".to_string(),
            });
        }

        let mut targets = Vec::with_capacity(self.targets.len());
        for (index, section) in self.targets.into_iter().enumerate() {
            let field = format!("target[{}]", index);
            let target_name = require(section.name, &format!("{}.name", field), origin)?;
            let kind = require(section.kind, &format!("{}.type", field), origin)?
                .parse::<TargetKind>()
                .map_err(|e| match e {
                    ConfigError::InvalidValue { reason, .. } => ConfigError::InvalidValue {
                        field: format!("target '{}' type", target_name),
                        reason,
                    },
                    other => other,
                })?;

            let dependencies = section
                .dependencies
                .into_iter()
                .map(DependencyEntry::into_dependency)
                .collect();

            targets.push(TargetDescriptor {
                name: target_name,
                kind,
                dependencies,
            });
        }

        Ok(ProjectDescriptor {
            name,
            language,
            standard,
            compiler,
            platform,
            targets: TargetList::new(targets)?,
        })
    }
}

fn missing(field: &str, origin: &Path) -> ConfigError {
    ConfigError::MissingField {
        field: field.to_string(),
        file: origin.to_path_buf(),
    }
}

fn require(value: Option<String>, field: &str, origin: &Path) -> ConfigResult<String> {
    value.ok_or_else(|| missing(field, origin))
}

/// Check that `name` is usable as a directory under `src/` and as a CMake
/// target: `[A-Za-z_][A-Za-z0-9_]*`
pub fn validate_identifier(field: &str, name: &str) -> ConfigResult<()> {
    let reason = match name.chars().next() {
        None => "name cannot be empty",
        Some(first) if !(first.is_ascii_alphabetic() || first == '_') => {
            "name must start with a letter or underscore"
        }
        Some(_) if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') => {
            "name can only contain letters, numbers and underscores"
        }
        Some(_) => return Ok(()),
    };
    Err(ConfigError::InvalidValue {
        field: field.to_string(),
        reason: format!("{}; got '{}'", reason, name),
    })
}

/// Source language of the project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C++")]
    Cxx,
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" => Ok(Self::C),
            "c++" | "cpp" | "cxx" => Ok(Self::Cxx),
            other => Err(ConfigError::InvalidValue {
                field: "project.language".to_string(),
                reason: format!("expected \"C\" or \"C++\", got '{}'", other),
            }),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::C => write!(f, "C"),
            Self::Cxx => write!(f, "C++"),
        }
    }
}

/// Compiler family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compiler {
    Clang,
    Gcc,
    /// Emscripten (web)
    Emcc,
}

impl Compiler {
    /// (C compiler, C++ compiler) executable names
    pub fn executables(&self) -> (&'static str, &'static str) {
        match self {
            Self::Clang => ("clang", "clang++"),
            Self::Gcc => ("gcc", "g++"),
            Self::Emcc => ("emcc", "em++"),
        }
    }
}

impl FromStr for Compiler {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clang" => Ok(Self::Clang),
            "gcc" => Ok(Self::Gcc),
            "emcc" | "emcc-web" | "emscripten" => Ok(Self::Emcc),
            other => Err(ConfigError::InvalidValue {
                field: "project.compiler".to_string(),
                reason: format!("expected one of clang, gcc, emcc; got '{}'", other),
            }),
        }
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clang => write!(f, "clang"),
            Self::Gcc => write!(f, "gcc"),
            Self::Emcc => write!(f, "emcc"),
        }
    }
}

/// Kind of build target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    /// Executable program
    Binary,
    /// Archive linked into dependents
    StaticLibrary,
    /// Shared object / DLL
    DynamicLibrary,
}

impl FromStr for TargetKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "binary" => Ok(Self::Binary),
            "static-library" => Ok(Self::StaticLibrary),
            "dynamic-library" => Ok(Self::DynamicLibrary),
            other => Err(ConfigError::InvalidValue {
                field: "type".to_string(),
                reason: format!(
                    "expected binary, static-library or dynamic-library; got '{}'",
                    other
                ),
            }),
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => write!(f, "binary"),
            Self::StaticLibrary => write!(f, "static-library"),
            Self::DynamicLibrary => write!(f, "dynamic-library"),
        }
    }
}

/// A declared dependency of a target
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    /// Pinned package version; only meaningful for external packages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Dependency {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// A declared build target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    pub name: String,
    pub kind: TargetKind,
    /// Dependencies in declared order
    pub dependencies: Vec<Dependency>,
}

impl TargetDescriptor {
    /// Create a new target descriptor
    pub fn new(name: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            name: name.into(),
            kind,
            dependencies: Vec::new(),
        }
    }

    /// Append a dependency
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }
}

/// Ordered, name-unique list of targets. Declaration order is build order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TargetList {
    targets: Vec<TargetDescriptor>,
}

impl TargetList {
    /// Validate and wrap targets in declaration order
    pub fn new(targets: Vec<TargetDescriptor>) -> ConfigResult<Self> {
        if targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }

        let mut seen = HashSet::new();
        for target in &targets {
            validate_identifier("target.name", &target.name)?;
            if !seen.insert(target.name.as_str()) {
                return Err(ConfigError::DuplicateTarget(target.name.clone()));
            }

            let mut deps = HashSet::new();
            for dep in &target.dependencies {
                if dep.name.trim().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: format!("target '{}' dependency", target.name),
                        reason: "name cannot be empty".to_string(),
                    });
                }
                if dep.name == target.name {
                    return Err(ConfigError::SelfDependency(target.name.clone()));
                }
                if !deps.insert(dep.name.as_str()) {
                    return Err(ConfigError::DuplicateDependency {
                        target: target.name.clone(),
                        dependency: dep.name.clone(),
                    });
                }
            }
        }

        Ok(Self { targets })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TargetDescriptor> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Look up a target by name
    pub fn get(&self, name: &str) -> Option<&TargetDescriptor> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Whether `name` is a declared target
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Index of `name` in build order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.targets.iter().position(|t| t.name == name)
    }

    /// The last declared target
    pub fn root(&self) -> &TargetDescriptor {
        // Construction rejects empty lists.
        &self.targets[self.targets.len() - 1]
    }

    /// Target names in build order
    pub fn names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.name.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a TargetList {
    type Item = &'a TargetDescriptor;
    type IntoIter = std::slice::Iter<'a, TargetDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}

/// Validated, read-only project description
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDescriptor {
    pub name: String,
    pub language: Language,
    pub standard: String,
    pub compiler: Compiler,
    pub platform: String,
    pub targets: TargetList,
}

impl ProjectDescriptor {
    /// Build a descriptor directly (used by tooling and tests)
    pub fn new(
        name: impl Into<String>,
        language: Language,
        standard: impl Into<String>,
        compiler: Compiler,
        platform: impl Into<String>,
        targets: TargetList,
    ) -> Self {
        Self {
            name: name.into(),
            language,
            standard: standard.into(),
            compiler,
            platform: platform.into(),
            targets,
        }
    }

    /// Parse and validate a descriptor from TOML text
    pub fn from_toml_str(content: &str, origin: &Path) -> ConfigResult<Self> {
        ProjectFile::parse(content, origin)?.into_descriptor(origin)
    }

    /// Load and validate a descriptor file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = read_descriptor(path)?;
        Self::from_toml_str(&content, path)
    }

    /// Dependencies that do not name a declared target, deduplicated, in
    /// first-seen order across targets
    pub fn external_packages(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut packages = Vec::new();
        for target in &self.targets {
            for dep in &target.dependencies {
                if !self.targets.contains(&dep.name) && seen.insert(dep.name.as_str()) {
                    packages.push(dep.name.as_str());
                }
            }
        }
        packages
    }
}

/// Read a descriptor file, mapping a missing file to [`ConfigError::NotFound`]
pub(crate) fn read_descriptor(path: &Path) -> ConfigResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound(PathBuf::from(path))
        } else {
            ConfigError::IoError(e)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parse(content: &str) -> ConfigResult<ProjectDescriptor> {
        ProjectDescriptor::from_toml_str(content, Path::new("kiln.toml"))
    }

    const MINIMAL: &str = r#"
[project]
name = "app"
language = "C++"
standard = "20"
compiler = "clang"
platform = "x64-windows"

[[target]]
name = "app"
type = "binary"
"#;

    #[test]
    fn test_parse_minimal_descriptor() {
        let descriptor = parse(MINIMAL).unwrap();
        assert_eq!(descriptor.name, "app");
        assert_eq!(descriptor.language, Language::Cxx);
        assert_eq!(descriptor.standard, "20");
        assert_eq!(descriptor.compiler, Compiler::Clang);
        assert_eq!(descriptor.platform, "x64-windows");
        assert_eq!(descriptor.targets.names(), vec!["app"]);
    }

    #[test]
    fn test_parse_preserves_target_and_dependency_order() {
        let descriptor = parse(
            r#"
[project]
name = "game"
language = "C++"
standard = "17"
compiler = "gcc"
platform = "x64-linux"

[[target]]
name = "engine"
type = "static-library"
dependencies = ["glm", { name = "lua", version = "5.4.7" }]

[[target]]
name = "editor"
type = "dynamic-library"
dependencies = ["engine"]

[[target]]
name = "game"
type = "binary"
dependencies = ["engine", "editor", { name = "sol2" }]
"#,
        )
        .unwrap();

        assert_eq!(descriptor.targets.names(), vec!["engine", "editor", "game"]);
        let engine = descriptor.targets.get("engine").unwrap();
        assert_eq!(
            engine.dependencies,
            vec![Dependency::new("glm"), Dependency::new("lua").with_version("5.4.7")]
        );
        assert_eq!(descriptor.targets.root().name, "game");
        assert_eq!(descriptor.external_packages(), vec!["glm", "lua", "sol2"]);
    }

    #[test]
    fn test_missing_project_section() {
        let err = parse("[[target]]\nname = \"a\"\ntype = \"binary\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { ref field, .. } if field == "project"));
    }

    #[rstest]
    #[case("name")]
    #[case("language")]
    #[case("standard")]
    #[case("compiler")]
    #[case("platform")]
    fn test_missing_project_binding(#[case] field: &str) {
        let content: String = MINIMAL
            .lines()
            .filter(|line| !line.starts_with(&format!("{} =", field)))
            .collect::<Vec<_>>()
            .join("\n");
        let err = parse(&content).unwrap_err();
        match err {
            ConfigError::MissingField { field: f, .. } => assert_eq!(f, format!("project.{}", field)),
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let content = MINIMAL.replace("platform = \"x64-windows\"", "platform = \"x64-windows\"\nflavour = \"spicy\"");
        assert!(matches!(parse(&content), Err(ConfigError::TomlParseError { .. })));
    }

    #[test]
    fn test_unknown_target_type() {
        let content = MINIMAL.replace("type = \"binary\"", "type = \"header-only-library\"");
        let err = parse(&content).unwrap_err();
        assert!(err.to_string().contains("header-only-library"));
        assert!(err.to_string().contains("target 'app' type"));
    }

    #[test]
    fn test_unknown_compiler_is_rejected() {
        let content = MINIMAL.replace("compiler = \"clang\"", "compiler = \"msvc\"");
        assert!(matches!(
            parse(&content),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "project.compiler"
        ));
    }

    #[test]
    fn test_duplicate_target_rejected() {
        let content = format!("{}\n[[target]]\nname = \"app\"\ntype = \"binary\"\n", MINIMAL);
        assert!(matches!(parse(&content), Err(ConfigError::DuplicateTarget(ref n)) if n == "app"));
    }

    #[test]
    fn test_self_dependency_rejected() {
        let content = MINIMAL.replace("type = \"binary\"", "type = \"binary\"\ndependencies = [\"app\"]");
        assert!(matches!(parse(&content), Err(ConfigError::SelfDependency(_))));
    }

    #[test]
    fn test_duplicate_dependency_rejected() {
        let content =
            MINIMAL.replace("type = \"binary\"", "type = \"binary\"\ndependencies = [\"fmt\", \"fmt\"]");
        assert!(matches!(parse(&content), Err(ConfigError::DuplicateDependency { .. })));
    }

    #[rstest]
    #[case("../x")]
    #[case("a b")]
    #[case("2d")]
    #[case("core(x)")]
    #[case("")]
    fn test_target_name_must_be_identifier(#[case] name: &str) {
        let err = TargetList::new(vec![TargetDescriptor::new(name, TargetKind::Binary)]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "target.name"));
    }

    #[test]
    fn test_target_name_with_path_in_descriptor() {
        let content = MINIMAL.replace(
            "[[target]]",
            "[[target]]\nname = \"../../escaped\"\ntype = \"static-library\"\n\n[[target]]",
        );
        let err = parse(&content).unwrap_err();
        assert!(err.to_string().contains("../../escaped"));
    }

    #[rstest]
    #[case("a b")]
    #[case("../x")]
    fn test_project_name_must_be_identifier(#[case] name: &str) {
        let content = MINIMAL.replacen("name = \"app\"", &format!("name = \"{}\"", name), 1);
        assert!(matches!(
            parse(&content),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "project.name"
        ));
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("name", "game").is_ok());
        assert!(validate_identifier("name", "_tool2").is_ok());
        assert!(validate_identifier("name", "my-app").is_err());
    }

    #[test]
    fn test_no_targets_rejected() {
        let content: String = MINIMAL.split("[[target]]").next().unwrap().to_string();
        assert!(matches!(parse(&content), Err(ConfigError::NoTargets)));
    }

    #[test]
    fn test_empty_version_is_treated_as_unpinned() {
        let content = MINIMAL.replace(
            "type = \"binary\"",
            "type = \"binary\"\ndependencies = [{ name = \"zlib\", version = \"\" }]",
        );
        let descriptor = parse(&content).unwrap();
        assert_eq!(descriptor.targets.root().dependencies[0].version, None);
    }

    #[rstest]
    #[case("C", Language::C)]
    #[case("C++", Language::Cxx)]
    #[case("cpp", Language::Cxx)]
    fn test_language_parse(#[case] input: &str, #[case] expected: Language) {
        assert_eq!(input.parse::<Language>().unwrap(), expected);
    }

    #[test]
    fn test_compiler_executables() {
        assert_eq!(Compiler::Clang.executables(), ("clang", "clang++"));
        assert_eq!(Compiler::Gcc.executables(), ("gcc", "g++"));
        assert_eq!(Compiler::Emcc.executables(), ("emcc", "em++"));
    }

    #[test]
    fn test_target_kind_display_roundtrip() {
        for kind in [TargetKind::Binary, TargetKind::StaticLibrary, TargetKind::DynamicLibrary] {
            assert_eq!(kind.to_string().parse::<TargetKind>().unwrap(), kind);
        }
    }
}
