//! User commands.
//!
//! The operator owns the snapshot, so role changes and deactivation go to
//! the store directly rather than through an administrator principal.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tollgate::Registration;
use tollgate_types::RoleName;
use tracing::info;

use crate::style::{colors::SemanticStyle, print_success, print_table, print_warn};

pub fn add(
    project_dir: &Path,
    username: &str,
    email: &str,
    first_name: &str,
    last_name: &str,
) -> Result<()> {
    let tollgate = super::open(project_dir)?;

    let registration = Registration {
        username: username.to_string(),
        email: email.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
    };
    let user = tollgate.register_user(registration)?;
    tollgate.persist()?;

    print_success(&format!("Registered {} (id {})", username.code(), user.id));
    if user.role.is_none() {
        print_warn("No User role is seeded; the account has no role");
    }
    Ok(())
}

pub fn list(project_dir: &Path) -> Result<()> {
    let tollgate = super::open(project_dir)?;
    let store = tollgate.store();

    let roles: HashMap<_, _> = store
        .list_roles()?
        .into_iter()
        .map(|role| (role.id, role.name))
        .collect();

    let rows: Vec<Vec<String>> = store
        .list_users()?
        .into_iter()
        .map(|user| {
            vec![
                user.id.to_string(),
                user.username,
                user.email,
                user.role
                    .and_then(|id| roles.get(&id))
                    .map_or_else(|| "-".to_string(), ToString::to_string),
                if user.active { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();

    print_table(
        &["id", "username", "email", "role", "active"],
        &rows,
        "user",
        "No users registered.",
    );
    Ok(())
}

pub fn role(project_dir: &Path, username: &str, role: &str) -> Result<()> {
    let tollgate = super::open(project_dir)?;
    let store = tollgate.store();

    let user = store.find_user(username)?;
    let role_id = if role.eq_ignore_ascii_case("none") {
        None
    } else {
        let name = RoleName::new(role).context("Invalid role name")?;
        Some(store.find_role(&name)?.id)
    };

    store.set_role(user.id, role_id)?;
    tollgate.persist()?;
    info!(user = %user.id, role, "role assigned");

    match role_id {
        Some(_) => print_success(&format!("{} is now {}", username.code(), role)),
        None => print_success(&format!("Cleared the role of {}", username.code())),
    }
    Ok(())
}

pub fn deactivate(project_dir: &Path, username: &str) -> Result<()> {
    let tollgate = super::open(project_dir)?;
    let store = tollgate.store();

    let user = store.find_user(username)?;
    if !user.active {
        print_warn(&format!("{username} is already inactive"));
        return Ok(());
    }

    store.deactivate_user(user.id)?;
    tollgate.persist()?;
    info!(user = %user.id, "user deactivated");

    print_success(&format!(
        "Deactivated {}; outstanding credentials are revoked",
        username.code()
    ));
    Ok(())
}
