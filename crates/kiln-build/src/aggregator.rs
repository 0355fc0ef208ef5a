//! Root CMakeLists.txt emission
//!
//! Subdirectories are added in build order; CMake resolves target names at
//! `add_subdirectory` time, so a library must be added before its users.

use crate::build_order::BuildOrder;
use crate::document::{quoted, CMakeDocument, COMMONS_FILE_NAME, MINIMUM_VERSION};
use kiln_config::Language;

/// Emit the aggregator document for `order`
pub fn emit_aggregator(order: &BuildOrder<'_>) -> String {
    let project = order.project();
    let mut doc = CMakeDocument::new();

    doc.line(MINIMUM_VERSION)
        .line(format!("project({})", project.name))
        .line(format!("include({})", quoted(COMMONS_FILE_NAME)))
        .line("kiln_project_defaults()");

    let lang = match project.language {
        Language::Cxx => "CXX",
        Language::C => "C",
    };
    doc.line(format!("set(CMAKE_{}_STANDARD {})", lang, project.standard))
        .line(format!("set(CMAKE_{}_STANDARD_REQUIRED ON)", lang));

    for name in order.names() {
        doc.blank()
            .line(format!("include_directories({})", quoted(&format!("src/{}/include", name))))
            .line(format!("add_subdirectory({})", quoted(&format!("src/{}", name))));
    }

    doc.into_string()
}
