//! Initialize command - writes tollgate.toml and a seeded snapshot.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tollgate::Tollgate;
use tollgate_config::{ConfigLoader, Paths, TollgateConfig};
use uuid::Uuid;

use crate::style::{colors::SemanticStyle, print_hint, print_labeled, print_success};

const GITIGNORE: &str = "# Tollgate local state
.tollgate/
tollgate.local.toml
";

pub fn run(project_dir: &Path, force: bool) -> Result<()> {
    fs::create_dir_all(project_dir).context("Failed to create project directory")?;

    let config_path = Paths::project_config_file(project_dir);
    if config_path.exists() {
        print_hint("tollgate.toml already exists, keeping it");
    } else {
        let mut config = TollgateConfig::default();
        config.auth.secret = generate_secret();
        fs::write(&config_path, config.to_toml()?).context("Failed to write tollgate.toml")?;
        print_success("Wrote tollgate.toml");
    }

    let config = ConfigLoader::new()
        .with_project_dir(project_dir)
        .load()
        .context("Failed to load configuration")?;

    let snapshot = &config.storage.snapshot;
    if snapshot.exists() {
        if !force {
            anyhow::bail!(
                "Store already initialized at {}. Use --force to reseed it.",
                snapshot.display()
            );
        }
        fs::remove_file(snapshot).context("Failed to remove existing snapshot")?;
    }

    let tollgate = Tollgate::from_config(&config).context("Failed to seed store")?;
    tollgate.persist().context("Failed to write snapshot")?;
    print_success(&format!("Seeded store at {}", snapshot.display().code()));

    let store = tollgate.store();
    print_labeled("roles", &store.list_roles()?.len().to_string());
    print_labeled("resources", &store.list_resources()?.len().to_string());
    print_labeled("rules", &store.list_rules()?.len().to_string());

    let gitignore_path = project_dir.join(".gitignore");
    if !gitignore_path.exists() {
        fs::write(&gitignore_path, GITIGNORE).context("Failed to write .gitignore")?;
    }

    println!();
    print_hint("Next: tollgate user add <username> <email>");
    Ok(())
}

/// 256 bits from two v4 UUIDs, hex-encoded.
fn generate_secret() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}
