pub mod build;
pub mod doctor;
pub mod generate;
pub mod init;
pub mod unit;

use anyhow::{Context, Result};
use colored::Colorize;
use kiln_config::{Config, ConfigLoader};
use std::path::Path;

/// Load the project containing `dir` (searching parent directories)
pub fn load_project(dir: &Path) -> Result<Config> {
    ConfigLoader::new()
        .load_from_directory(dir)
        .with_context(|| format!("Failed to load project from {}", dir.display()))
}

/// Print a right-aligned status line, cargo style
pub fn status(label: &str, message: impl std::fmt::Display) {
    println!("{:>12} {}", label.green().bold(), message);
}

/// Print a warning line to stderr
pub fn warning(message: impl std::fmt::Display) {
    eprintln!("{} {}", "warning:".yellow().bold(), message);
}
