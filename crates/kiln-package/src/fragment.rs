//! CMake fragments scraped from vcpkg usage hints
//!
//! After an install vcpkg prints how to consume the package, e.g.
//!
//! ```text
//! zlib provides CMake targets:
//!
//!     find_package(ZLIB REQUIRED)
//!     target_link_libraries(main PRIVATE ZLIB::ZLIB)
//! ```
//!
//! Only the `find_*` and `target_*` statements are kept, and the placeholder
//! target `main` is renamed to the consuming target. This depends on vcpkg's
//! text format; there is no machine-readable usage output to ask for instead.

use std::fmt;

/// Placeholder target name used in vcpkg usage hints
pub const PLACEHOLDER_TARGET: &str = "main";

const DIRECTIVE_PREFIXES: [&str; 2] = ["find_", "target_"];

/// Build directives contributed by one external dependency of one target
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedFragment {
    lines: Vec<String>,
}

impl ResolvedFragment {
    /// Fragment with no directives
    pub fn empty() -> Self {
        Self::default()
    }

    /// Filter resolver output down to build directives for `consumer`
    pub fn extract(output: &str, consumer: &str) -> Self {
        let lines = output
            .lines()
            .map(str::trim)
            .filter(|line| DIRECTIVE_PREFIXES.iter().any(|p| line.starts_with(p)))
            .map(|line| rename_placeholder(line, consumer))
            .collect();
        Self { lines }
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Text spliced into a target document: blank-line padded on both sides
    pub fn to_cmake(&self) -> String {
        format!("\n{}\n\n", self.lines.join("\n"))
    }
}

impl fmt::Display for ResolvedFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cmake())
    }
}

/// Replace `main` when it is the first argument of the statement
fn rename_placeholder(line: &str, consumer: &str) -> String {
    let Some(open) = line.find('(') else {
        return line.to_string();
    };
    let args = &line[open + 1..];
    let leading = args.len() - args.trim_start().len();
    let first = &args[leading..];

    let rest = first
        .strip_prefix(PLACEHOLDER_TARGET)
        .filter(|rest| rest.starts_with(|c: char| c.is_whitespace() || c == ')'));

    match rest {
        Some(rest) => format!("{}{}{}", &line[..open + 1 + leading], consumer, rest),
        None => line.to_string(),
    }
}
