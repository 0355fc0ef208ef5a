//! Unit command - create a header/source pair in a target

use super::{load_project, status, warning};
use anyhow::Result;
use kiln_build::UnitScaffolder;
use std::path::PathBuf;

/// Unit command arguments
#[derive(Debug, Clone)]
pub struct UnitArgs {
    pub target: String,
    pub unit: String,
    /// Directory to start the project search from
    pub dir: PathBuf,
}

/// Run the unit command
pub fn run(args: UnitArgs) -> Result<()> {
    let config = load_project(&args.dir)?;
    let files = UnitScaffolder::new(&config.project_root, &config.project)
        .create(&args.target, &args.unit)?;

    for file in &files {
        if file.created {
            status("Created", file.path.display());
        } else {
            warning(format!("{} already exists, left untouched", file.path.display()));
        }
    }
    Ok(())
}
