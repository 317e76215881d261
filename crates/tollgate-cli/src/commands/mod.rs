//! CLI command implementations.

use std::path::Path;

use anyhow::{Context, Result};
use tollgate::Tollgate;
use tollgate_config::{ConfigLoader, Paths};

pub mod check;
pub mod init;
pub mod rules;
pub mod user;

/// Opens the project's service, loading its configuration and snapshot.
pub fn open(project_dir: &Path) -> Result<Tollgate> {
    if !Paths::is_initialized(project_dir) {
        anyhow::bail!(
            "No tollgate.toml in {}. Run `tollgate init` first.",
            project_dir.display()
        );
    }

    let config = ConfigLoader::new()
        .with_project_dir(project_dir)
        .load()
        .context("Failed to load configuration")?;
    Tollgate::from_config(&config).context("Failed to open store")
}
