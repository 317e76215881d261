//! Initial roles, resources and access rules.

use serde::{Deserialize, Serialize};
use tollgate_rbac::{AccessFlags, StandardRules};
use tollgate_types::{ResourceName, RoleName};

/// Data loaded into an empty (or partially seeded) store.
///
/// Seeding is additive: entries that already exist are left untouched, so a
/// seed can be applied on every start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub roles: Vec<RoleName>,
    pub resources: Vec<SeedResource>,
    pub rules: Vec<SeedRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedResource {
    pub name: ResourceName,
    #[serde(default)]
    pub description: String,
}

/// One matrix entry, by name. Missing flags take the owned-only defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRule {
    pub role: RoleName,
    pub resource: ResourceName,
    #[serde(default)]
    pub flags: AccessFlags,
}

impl Seed {
    /// Empty seed.
    pub fn empty() -> Self {
        Self {
            roles: Vec::new(),
            resources: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// The three standard roles, the three standard resources, and the
    /// [`StandardRules`] flags for every pair.
    pub fn standard() -> Self {
        let roles = vec![RoleName::admin(), RoleName::manager(), RoleName::user()];
        let resources = vec![
            SeedResource {
                name: ResourceName::products(),
                description: "Catalog products".to_string(),
            },
            SeedResource {
                name: ResourceName::orders(),
                description: "Customer orders".to_string(),
            },
            SeedResource {
                name: ResourceName::shops(),
                description: "Storefronts".to_string(),
            },
        ];

        let mut rules = Vec::new();
        for role in &roles {
            let Some(flags) = StandardRules::for_role(role) else {
                continue;
            };
            for resource in &resources {
                rules.push(SeedRule {
                    role: role.clone(),
                    resource: resource.name.clone(),
                    flags,
                });
            }
        }

        Self {
            roles,
            resources,
            rules,
        }
    }
}

impl Default for Seed {
    fn default() -> Self {
        Self::standard()
    }
}

/// Counts of entries created by a seeding pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub roles: usize,
    pub resources: usize,
    pub rules: usize,
}
