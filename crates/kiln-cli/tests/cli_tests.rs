//! End-to-end tests for the kiln binary
//!
//! Every command runs in a scratch directory with an isolated KILN_HOME so
//! no user configuration or toolchain leaks into the results.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ============================================================================
// Helper functions
// ============================================================================

fn kiln_cmd(home: &Path) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("kiln");
    cmd.env("KILN_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("KILN_PLATFORM")
        .env_remove("KILN_COMPILER")
        .env_remove("KILN_VCPKG_ROOT")
        .env_remove("KILN_EMSDK_ROOT")
        .env_remove("KILN_JSON")
        .env_remove("KILN_LOG")
        .env_remove("RUST_LOG");
    cmd
}

const APP: &str = r#"
[project]
name = "app"
language = "C++"
standard = "20"
compiler = "clang"
platform = "x64-linux"

[[target]]
name = "core"
type = "static-library"

[[target]]
name = "app"
type = "binary"
dependencies = ["core"]
"#;

fn project(descriptor: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("kiln.toml"), descriptor).unwrap();
    temp
}

fn home(temp: &TempDir) -> std::path::PathBuf {
    temp.path().join(".kiln-home")
}

// ============================================================================
// kiln init
// ============================================================================

#[test]
fn test_init_creates_descriptor() {
    let temp = TempDir::new().unwrap();

    kiln_cmd(&home(&temp))
        .current_dir(temp.path())
        .args(["init", "game", "--platform", "x64-linux"])
        .assert()
        .success()
        .stdout(predicate::str::contains("project 'game'"));

    let text = fs::read_to_string(temp.path().join("game/kiln.toml")).unwrap();
    assert!(text.contains("name = \"game\""));
    assert!(text.contains("platform = \"x64-linux\""));

    kiln_cmd(&home(&temp))
        .current_dir(temp.path())
        .args(["init", "game"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn test_init_then_generate() {
    let temp = TempDir::new().unwrap();
    kiln_cmd(&home(&temp))
        .current_dir(temp.path())
        .args(["init", "hello", "--lang", "c"])
        .assert()
        .success();

    kiln_cmd(&home(&temp))
        .current_dir(temp.path().join("hello"))
        .arg("generate")
        .assert()
        .success();

    let aggregator = fs::read_to_string(temp.path().join("hello/CMakeLists.txt")).unwrap();
    assert!(aggregator.contains("set(CMAKE_C_STANDARD 17)"));
}

// ============================================================================
// kiln generate
// ============================================================================

#[test]
fn test_generate_writes_project_files() {
    let temp = project(APP);

    kiln_cmd(&home(&temp))
        .current_dir(temp.path())
        .arg("generate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated"))
        .stdout(predicate::str::contains("CMakePresets.json"));

    for file in [
        "CMakePresets.json",
        ".clang-format",
        "CMakeCommons.cmake",
        "CMakeLists.txt",
        "src/core/CMakeLists.txt",
        "src/app/CMakeLists.txt",
    ] {
        assert!(temp.path().join(file).is_file(), "missing {}", file);
    }
    let app = fs::read_to_string(temp.path().join("src/app/CMakeLists.txt")).unwrap();
    assert!(app.contains("target_link_libraries(app core)"));
}

#[test]
fn test_generate_twice_reports_unchanged() {
    let temp = project(APP);
    kiln_cmd(&home(&temp))
        .current_dir(temp.path())
        .arg("gen")
        .assert()
        .success();

    let output = kiln_cmd(&home(&temp))
        .current_dir(temp.path())
        .args(["gen", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["project"], "app");
    assert_eq!(report["targets"], serde_json::json!(["core", "app"]));
    let files = report["files"].as_array().unwrap();
    assert_eq!(files.len(), 6);
    assert!(files.iter().all(|f| f["status"] == "unchanged"));
}

#[test]
fn test_generate_from_subdirectory() {
    let temp = project(APP);
    let nested = temp.path().join("docs/notes");
    fs::create_dir_all(&nested).unwrap();

    kiln_cmd(&home(&temp))
        .current_dir(&nested)
        .arg("generate")
        .assert()
        .success();

    assert!(temp.path().join("CMakeLists.txt").is_file());
    assert!(!nested.join("CMakeLists.txt").exists());
}

#[test]
fn test_generate_rejects_root_mismatch() {
    let temp = project(&APP.replace("name = \"app\"\nlanguage", "name = \"other\"\nlanguage"));

    kiln_cmd(&home(&temp))
        .current_dir(temp.path())
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("must match the last declared target"));

    assert!(!temp.path().join("CMakePresets.json").exists());
    assert!(!temp.path().join("src").exists());
}

#[test]
fn test_generate_without_descriptor() {
    let temp = TempDir::new().unwrap();

    kiln_cmd(&home(&temp))
        .current_dir(temp.path())
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("kiln.toml"));
}

#[test]
fn test_generate_platform_override() {
    let temp = project(APP);

    let output = kiln_cmd(&home(&temp))
        .current_dir(temp.path())
        .env("KILN_PLATFORM", "wasm32-emscripten")
        .args(["generate", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["platform"], "wasm32-emscripten");
    assert_eq!(report["platform_class"], "web");

    let presets = fs::read_to_string(temp.path().join("CMakePresets.json")).unwrap();
    assert!(presets.contains("\"wasm32-emscripten-debug\""));
}

#[test]
fn test_unresolved_package_is_a_warning() {
    let temp = project(&APP.replace("dependencies = [\"core\"]", "dependencies = [\"core\", \"fmt\"]"));

    // No vcpkg anywhere: resolution fails, generation still succeeds.
    kiln_cmd(&home(&temp))
        .current_dir(temp.path())
        .env("PATH", "")
        .arg("generate")
        .assert()
        .success()
        .stderr(predicate::str::contains("package 'fmt' was not resolved"));

    let app = fs::read_to_string(temp.path().join("src/app/CMakeLists.txt")).unwrap();
    assert!(app.contains("target_link_libraries(app core)"));
    assert!(!app.contains("fmt"));
}

// ============================================================================
// kiln build
// ============================================================================

#[test]
fn test_build_requires_generate() {
    let temp = project(APP);

    kiln_cmd(&home(&temp))
        .current_dir(temp.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("run `kiln generate` first"));
}

#[test]
fn test_build_list_presets() {
    let temp = project(APP);
    kiln_cmd(&home(&temp))
        .current_dir(temp.path())
        .arg("generate")
        .assert()
        .success();

    kiln_cmd(&home(&temp))
        .current_dir(temp.path())
        .args(["build", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("x64-linux-debug"))
        .stdout(predicate::str::contains("x64-linux-minsizerel"));
}

#[test]
fn test_build_unknown_preset() {
    let temp = project(APP);
    kiln_cmd(&home(&temp))
        .current_dir(temp.path())
        .arg("generate")
        .assert()
        .success();

    kiln_cmd(&home(&temp))
        .current_dir(temp.path())
        .args(["build", "--preset", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Preset 'nope' not found"));
}

// ============================================================================
// kiln unit
// ============================================================================

#[test]
fn test_unit_creates_pair() {
    let temp = project(APP);

    kiln_cmd(&home(&temp))
        .current_dir(temp.path())
        .args(["unit", "core", "math"])
        .assert()
        .success();

    let header = fs::read_to_string(temp.path().join("src/core/include/core/math.hpp")).unwrap();
    assert!(header.starts_with("#ifndef _MATH_HPP_\n"));
    assert!(header.contains("namespace core {"));
    assert_eq!(
        fs::read_to_string(temp.path().join("src/core/src/math.cpp")).unwrap(),
        "#include <core/math.hpp>\n"
    );
}

#[test]
fn test_unit_unknown_target() {
    let temp = project(APP);

    kiln_cmd(&home(&temp))
        .current_dir(temp.path())
        .args(["unit", "physics", "body"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Target not found: physics"));
}

// ============================================================================
// kiln doctor
// ============================================================================

fn fake_vcpkg(temp: &TempDir) -> std::path::PathBuf {
    let root = temp.path().join("vcpkg");
    let dir = root.join("versions").join("z-");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("zlib.json"),
        r#"{
  "versions": [
    { "version": "1.3.1", "port-version": 0 },
    { "version": "1.3", "port-version": 1 },
    { "version": "1.2.13", "port-version": 0 },
    { "version": "1.2.12", "port-version": 0 },
    { "version-string": "1.2.11", "port-version": 9 }
  ]
}"#,
    )
    .unwrap();
    root
}

#[test]
fn test_doctor_lists_versions() {
    let temp = TempDir::new().unwrap();
    let vcpkg = fake_vcpkg(&temp);

    kiln_cmd(&home(&temp))
        .current_dir(temp.path())
        .env("KILN_VCPKG_ROOT", &vcpkg)
        .args(["doctor", "zlib", "nosuchport"])
        .assert()
        .success()
        .stdout(predicate::str::contains("zlib: 1.3.1, 1.3, ... 1.2.11"))
        .stderr(predicate::str::contains("'nosuchport' is not a known vcpkg port"));
}

#[test]
fn test_doctor_uses_project_packages() {
    let temp = project(&APP.replace(
        "dependencies = [\"core\"]",
        "dependencies = [\"core\", { name = \"zlib\", version = \"1.3\" }]",
    ));
    let vcpkg = fake_vcpkg(&temp);

    let output = kiln_cmd(&home(&temp))
        .current_dir(temp.path())
        .env("KILN_VCPKG_ROOT", &vcpkg)
        .args(["doctor", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["zlib"]["versions"][0], "1.3.1");
    assert!(report.get("core").is_none());
}

#[test]
fn test_doctor_without_version_database() {
    let temp = TempDir::new().unwrap();

    kiln_cmd(&home(&temp))
        .current_dir(temp.path())
        .args(["doctor", "zlib"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("version database not found"));
}

// ============================================================================
// kiln completions / help
// ============================================================================

#[test]
fn test_completions_bash() {
    let temp = TempDir::new().unwrap();
    kiln_cmd(&home(&temp))
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kiln"));
}

#[test]
fn test_help_lists_commands() {
    let temp = TempDir::new().unwrap();
    kiln_cmd(&home(&temp))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("doctor"));
}
