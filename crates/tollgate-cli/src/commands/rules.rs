//! Rules command - prints the permission matrix.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use tollgate_rbac::{AccessFlags, PermissionFlag};

use crate::style::print_table;

const COLUMNS: [&str; 10] = [
    "id",
    "role",
    "resource",
    "read owned",
    "read all",
    "create",
    "update owned",
    "update all",
    "delete owned",
    "delete all",
];

const FLAGS: [PermissionFlag; 7] = [
    PermissionFlag::ReadOwned,
    PermissionFlag::ReadAll,
    PermissionFlag::Create,
    PermissionFlag::UpdateOwned,
    PermissionFlag::UpdateAll,
    PermissionFlag::DeleteOwned,
    PermissionFlag::DeleteAll,
];

pub fn run(project_dir: &Path) -> Result<()> {
    let tollgate = super::open(project_dir)?;
    let store = tollgate.store();

    let roles: HashMap<_, _> = store
        .list_roles()?
        .into_iter()
        .map(|role| (role.id, role.name))
        .collect();
    let resources: HashMap<_, _> = store
        .list_resources()?
        .into_iter()
        .map(|resource| (resource.id, resource.name))
        .collect();

    let rows: Vec<Vec<String>> = store
        .list_rules()?
        .into_iter()
        .map(|rule| {
            let mut row = vec![
                rule.id.to_string(),
                roles
                    .get(&rule.role)
                    .map_or_else(|| rule.role.to_string(), ToString::to_string),
                resources
                    .get(&rule.resource)
                    .map_or_else(|| rule.resource.to_string(), ToString::to_string),
            ];
            row.extend(flag_cells(&rule.flags));
            row
        })
        .collect();

    print_table(&COLUMNS, &rows, "rule", "No access rules defined.");
    Ok(())
}

fn flag_cells(flags: &AccessFlags) -> impl Iterator<Item = String> + '_ {
    FLAGS
        .into_iter()
        .map(move |flag| if flags.get(flag) { "✓" } else { "·" }.to_string())
}
