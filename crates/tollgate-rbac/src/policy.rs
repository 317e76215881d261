//! Access rules and the permission matrix.
//!
//! An [`AccessRule`] is the matrix entry for one (role, resource) pair. The
//! [`PermissionMatrix`] holds all rules and enforces that each pair has at
//! most one. Absence of a rule means no permission of any kind.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tollgate_types::{ResourceId, ResourceName, RoleId, RoleName, RuleId};

use crate::permissions::{AccessFlags, FlagsPatch};

/// Errors raised by matrix mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// A rule already exists for this (role, resource) pair.
    #[error("access rule already exists for role {role} and resource {resource}")]
    DuplicateRule { role: RoleId, resource: ResourceId },

    /// A rule with this id already exists.
    #[error("access rule id {0} already in use")]
    DuplicateRuleId(RuleId),

    /// No rule with this id.
    #[error("access rule {0} not found")]
    RuleNotFound(RuleId),
}

/// Matrix entry binding one role to one business resource.
///
/// The (role, resource) identity never changes after creation; only the
/// flags are mutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    pub id: RuleId,
    pub role: RoleId,
    pub resource: ResourceId,
    pub flags: AccessFlags,
}

impl AccessRule {
    pub fn new(id: RuleId, role: RoleId, resource: ResourceId, flags: AccessFlags) -> Self {
        Self {
            id,
            role,
            resource,
            flags,
        }
    }
}

/// Source of permission flags for the decision engine.
///
/// Implementations resolve names to their stored rule. Returning `None`
/// means no rule exists, which the engine treats as a silent deny.
pub trait RuleSource {
    fn rule_flags(&self, role: &RoleName, resource: &ResourceName) -> Option<AccessFlags>;
}

impl RuleSource for HashMap<(RoleName, ResourceName), AccessFlags> {
    fn rule_flags(&self, role: &RoleName, resource: &ResourceName) -> Option<AccessFlags> {
        self.get(&(role.clone(), resource.clone())).copied()
    }
}

impl<T: RuleSource + ?Sized> RuleSource for &T {
    fn rule_flags(&self, role: &RoleName, resource: &ResourceName) -> Option<AccessFlags> {
        (**self).rule_flags(role, resource)
    }
}

/// All access rules, indexed by id and by (role, resource) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<AccessRule>", into = "Vec<AccessRule>")]
pub struct PermissionMatrix {
    rules: BTreeMap<RuleId, AccessRule>,
    by_pair: HashMap<(RoleId, ResourceId), RuleId>,
}

impl PermissionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new rule.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::DuplicateRule`] if the pair already has a rule,
    /// or [`PolicyError::DuplicateRuleId`] if the id is taken.
    pub fn insert(&mut self, rule: AccessRule) -> Result<(), PolicyError> {
        let pair = (rule.role, rule.resource);
        if self.by_pair.contains_key(&pair) {
            return Err(PolicyError::DuplicateRule {
                role: rule.role,
                resource: rule.resource,
            });
        }
        if self.rules.contains_key(&rule.id) {
            return Err(PolicyError::DuplicateRuleId(rule.id));
        }

        self.by_pair.insert(pair, rule.id);
        self.rules.insert(rule.id, rule);
        Ok(())
    }

    pub fn get(&self, id: RuleId) -> Option<&AccessRule> {
        self.rules.get(&id)
    }

    /// Looks up the rule for a (role, resource) pair.
    pub fn lookup(&self, role: RoleId, resource: ResourceId) -> Option<&AccessRule> {
        self.by_pair
            .get(&(role, resource))
            .and_then(|id| self.rules.get(id))
    }

    /// Applies a partial flag update to an existing rule.
    pub fn update_flags(&mut self, id: RuleId, patch: &FlagsPatch) -> Result<&AccessRule, PolicyError> {
        let rule = self.rules.get_mut(&id).ok_or(PolicyError::RuleNotFound(id))?;
        patch.apply(&mut rule.flags);
        Ok(rule)
    }

    pub fn remove(&mut self, id: RuleId) -> Option<AccessRule> {
        let rule = self.rules.remove(&id)?;
        self.by_pair.remove(&(rule.role, rule.resource));
        Some(rule)
    }

    /// Removes every rule of a role. Returns the number removed.
    pub fn remove_role(&mut self, role: RoleId) -> usize {
        self.remove_where(|rule| rule.role == role)
    }

    /// Removes every rule of a resource. Returns the number removed.
    pub fn remove_resource(&mut self, resource: ResourceId) -> usize {
        self.remove_where(|rule| rule.resource == resource)
    }

    fn remove_where(&mut self, predicate: impl Fn(&AccessRule) -> bool) -> usize {
        let doomed: Vec<RuleId> = self
            .rules
            .values()
            .filter(|rule| predicate(rule))
            .map(|rule| rule.id)
            .collect();
        for id in &doomed {
            self.remove(*id);
        }
        doomed.len()
    }

    /// Iterates rules in id order.
    pub fn iter(&self) -> impl Iterator<Item = &AccessRule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl TryFrom<Vec<AccessRule>> for PermissionMatrix {
    type Error = PolicyError;

    /// Rebuilds the indexes. A repeated pair or rule id is rejected.
    fn try_from(rules: Vec<AccessRule>) -> Result<Self, Self::Error> {
        let mut matrix = Self::new();
        for rule in rules {
            matrix.insert(rule)?;
        }
        Ok(matrix)
    }
}

impl From<PermissionMatrix> for Vec<AccessRule> {
    fn from(matrix: PermissionMatrix) -> Self {
        matrix.rules.into_values().collect()
    }
}

/// Standard flag sets for the seeded roles.
pub struct StandardRules;

impl StandardRules {
    /// Administrator: every flag on every resource.
    pub fn admin() -> AccessFlags {
        AccessFlags::full()
    }

    /// Manager: reads everything, creates, edits and deletes own records.
    pub fn manager() -> AccessFlags {
        AccessFlags {
            read_owned: true,
            read_all: true,
            create: true,
            update_owned: true,
            update_all: false,
            delete_owned: true,
            delete_all: false,
        }
    }

    /// User: creates, and works only with own records.
    pub fn user() -> AccessFlags {
        AccessFlags {
            create: true,
            ..AccessFlags::owned_only()
        }
    }

    /// Returns the standard flags for a role name, if it is a seeded one.
    pub fn for_role(role: &RoleName) -> Option<AccessFlags> {
        match role.as_str() {
            RoleName::ADMIN => Some(Self::admin()),
            RoleName::MANAGER => Some(Self::manager()),
            RoleName::USER => Some(Self::user()),
            _ => None,
        }
    }
}
