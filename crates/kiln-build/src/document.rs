//! Line-oriented CMake document assembly

use std::fmt;

/// First statement of every generated CMakeLists.txt
pub const MINIMUM_VERSION: &str = "cmake_minimum_required(VERSION 3.28)";

/// File name of the shared options document at the project root
pub const COMMONS_FILE_NAME: &str = "CMakeCommons.cmake";

/// A CMake document assembled statement by statement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CMakeDocument {
    text: String,
}

impl CMakeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one statement followed by a newline
    pub fn line(&mut self, statement: impl AsRef<str>) -> &mut Self {
        self.text.push_str(statement.as_ref());
        self.text.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.text.push('\n');
        self
    }

    /// Append pre-formatted text verbatim
    pub fn raw(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.text.push_str(text.as_ref());
        self
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for CMakeDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Quote a CMake argument
pub fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "/"))
}
