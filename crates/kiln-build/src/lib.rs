//! Kiln build system infrastructure
//!
//! Turns a validated project descriptor into CMake configuration:
//! - Build order and dependency classification
//! - Per-target CMakeLists.txt documents with resolved package fragments
//! - The top-level aggregator and shared CMakeCommons.cmake
//! - CMakePresets.json for every build type
//! - Configure/build/run through the generated presets
//! - Header/source unit scaffolding

pub mod aggregator;
pub mod build_order;
pub mod commons;
pub mod document;
pub mod driver;
pub mod error;
pub mod generator;
pub mod layout;
pub mod presets;
pub mod target_config;
pub mod targets;
pub mod unit;

// Re-export main types
pub use aggregator::emit_aggregator;
pub use build_order::{BuildOrder, ForwardReference};
pub use commons::{commons_document, CLANG_FORMAT};
pub use driver::{BuildDriver, BuildStats};
pub use error::{BuildError, BuildResult};
pub use generator::{GeneratedFile, GenerationReport, Generator};
pub use layout::{write_if_changed, FileStatus, ProjectLayout};
pub use presets::{ConfigurePreset, PlatformClass, PresetDocument, PresetSynthesizer};
pub use target_config::{ResolutionWarning, TargetDocument, TargetEmitter};
pub use targets::CmakeTarget;
pub use unit::{UnitFile, UnitScaffolder};
