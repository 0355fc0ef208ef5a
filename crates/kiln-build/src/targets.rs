/// CMake declarations for build targets
use kiln_config::TargetKind;

/// Source and header extensions picked up by a target's source glob
pub const SOURCE_EXTENSIONS: [&str; 4] = ["cpp", "hpp", "c", "h"];

/// A target as CMake sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmakeTarget<'a> {
    pub name: &'a str,
    pub kind: TargetKind,
}

impl<'a> CmakeTarget<'a> {
    pub fn new(name: &'a str, kind: TargetKind) -> Self {
        Self { name, kind }
    }

    /// Variable holding the globbed source list
    pub fn sources_var(&self) -> String {
        format!("{}_SRC", self.name)
    }

    /// `file(GLOB_RECURSE ...)` collecting every source below the target directory
    pub fn source_glob(&self) -> String {
        let patterns: Vec<String> = SOURCE_EXTENSIONS
            .iter()
            .map(|ext| format!("\"${{CMAKE_CURRENT_SOURCE_DIR}}/*.{}\"", ext))
            .collect();
        format!(
            "file(GLOB_RECURSE {} CONFIGURE_DEPENDS {})",
            self.sources_var(),
            patterns.join(" ")
        )
    }

    /// `add_executable` / `add_library` statement
    pub fn declaration(&self) -> String {
        let sources = format!("${{{}}}", self.sources_var());
        match library_type(self.kind) {
            Some(ty) => format!("add_library({} {} {})", self.name, ty, sources),
            None => format!("add_executable({} {})", self.name, sources),
        }
    }

    /// File name of the built executable for `triplet`
    pub fn executable_file_name(&self, triplet: &str) -> String {
        if is_wasm(triplet) {
            format!("{}.js", self.name)
        } else if triplet.contains("windows") {
            format!("{}.exe", self.name)
        } else {
            self.name.to_string()
        }
    }
}

/// CMake library type keyword, `None` for executables
pub fn library_type(kind: TargetKind) -> Option<&'static str> {
    match kind {
        TargetKind::Binary => None,
        TargetKind::StaticLibrary => Some("STATIC"),
        TargetKind::DynamicLibrary => Some("SHARED"),
    }
}

/// Whether the triplet builds WebAssembly run through node
pub fn is_wasm(triplet: &str) -> bool {
    triplet.contains("wasm")
}
