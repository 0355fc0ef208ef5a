//! Project initialization command (kiln init)

use super::status;
use anyhow::{bail, Context, Result};
use kiln_config::{validate_identifier, Language, PROJECT_FILE_NAME};
use std::fs;
use std::path::PathBuf;

/// Arguments for the init command
#[derive(Debug, Clone)]
pub struct InitArgs {
    /// Project name (defaults to directory name)
    pub name: Option<String>,
    /// Write into `path` instead of `path/<name>`
    pub here: bool,
    /// Directory the command runs in
    pub path: PathBuf,
    pub language: Language,
    /// vcpkg triplet (defaults to the host's)
    pub platform: Option<String>,
}

impl Default for InitArgs {
    fn default() -> Self {
        Self {
            name: None,
            here: false,
            path: PathBuf::from("."),
            language: Language::Cxx,
            platform: None,
        }
    }
}

/// Run the init command
pub fn run(args: InitArgs) -> Result<()> {
    let base = args
        .path
        .canonicalize()
        .unwrap_or_else(|_| args.path.clone());

    let (name, dir) = match (&args.name, args.here) {
        (Some(name), false) => (name.clone(), base.join(name)),
        (Some(name), true) => (name.clone(), base.clone()),
        (None, _) => {
            let dir_name = base
                .file_name()
                .and_then(|n| n.to_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| "app".to_string());
            (dir_name, base.clone())
        }
    };
    validate_project_name(&name)?;

    let descriptor = dir.join(PROJECT_FILE_NAME);
    if descriptor.exists() {
        bail!(
            "Project already initialized: {} exists at {}",
            PROJECT_FILE_NAME,
            descriptor.display()
        );
    }

    let platform = args.platform.unwrap_or_else(|| host_triplet().to_string());
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    fs::write(&descriptor, descriptor_template(&name, args.language, &platform))
        .with_context(|| format!("Failed to write {}", descriptor.display()))?;

    status("Created", format!("project '{}' ({})", name, descriptor.display()));
    println!("\nTo get started:");
    if dir != base {
        println!("  cd {}", dir.display());
    }
    println!("  kiln generate");
    println!("  kiln build --run");
    Ok(())
}

/// Descriptor for a single binary target named after the project
pub fn descriptor_template(name: &str, language: Language, platform: &str) -> String {
    let standard = match language {
        Language::Cxx => "20",
        Language::C => "17",
    };
    format!(
        r#"[project]
name = "{name}"             # must equal the last [[target]] name
language = "{language}"
standard = "{standard}"
compiler = "clang"          # "clang" | "gcc" | "emcc"
platform = "{platform}"     # vcpkg triplet

# Targets are built in the order listed here. List libraries before the
# targets that link them; the last target is the root of the project.
#
# [[target]]
# name = "core"
# type = "static-library"   # "binary" | "static-library" | "dynamic-library"
# dependencies = ["fmt", {{ name = "zlib", version = "1.3" }}]

[[target]]
name = "{name}"
type = "binary"
dependencies = []
"#
    )
}

/// Default vcpkg triplet for the machine running kiln
pub fn host_triplet() -> &'static str {
    match (std::env::consts::ARCH, std::env::consts::OS) {
        ("aarch64", "macos") => "arm64-osx",
        ("aarch64", "windows") => "arm64-windows",
        ("aarch64", _) => "arm64-linux",
        ("x86", "windows") => "x86-windows",
        (_, "windows") => "x64-windows",
        (_, "macos") => "x64-osx",
        _ => "x64-linux",
    }
}

/// Project names become CMake targets, directories and C++ namespaces
fn validate_project_name(name: &str) -> Result<()> {
    validate_identifier("project name", name)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_config::ProjectDescriptor;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn test_validate_project_name() {
        assert!(validate_project_name("game").is_ok());
        assert!(validate_project_name("_tool2").is_ok());
        assert!(validate_project_name("").is_err());
        assert!(validate_project_name("2d").is_err());
        assert!(validate_project_name("my-app").is_err());
        assert!(validate_project_name("has space").is_err());
    }

    #[test]
    fn test_template_is_a_valid_descriptor() {
        for language in [Language::Cxx, Language::C] {
            let text = descriptor_template("demo", language, "x64-linux");
            let project =
                ProjectDescriptor::from_toml_str(&text, Path::new(PROJECT_FILE_NAME)).unwrap();
            assert_eq!(project.name, "demo");
            assert_eq!(project.language, language);
            assert_eq!(project.targets.names(), vec!["demo"]);
        }
    }

    #[test]
    fn test_init_creates_named_directory() {
        let temp = TempDir::new().unwrap();
        run(InitArgs {
            name: Some("demo".to_string()),
            path: temp.path().to_path_buf(),
            platform: Some("x64-linux".to_string()),
            ..Default::default()
        })
        .unwrap();

        let text = fs::read_to_string(temp.path().join("demo").join(PROJECT_FILE_NAME)).unwrap();
        assert!(text.contains("platform = \"x64-linux\""));
    }

    #[test]
    fn test_init_refuses_existing_descriptor() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(PROJECT_FILE_NAME), "# mine\n").unwrap();

        let result = run(InitArgs {
            name: Some("demo".to_string()),
            here: true,
            path: temp.path().to_path_buf(),
            ..Default::default()
        });
        assert!(result.is_err());
        assert_eq!(
            fs::read_to_string(temp.path().join(PROJECT_FILE_NAME)).unwrap(),
            "# mine\n"
        );
    }
}
