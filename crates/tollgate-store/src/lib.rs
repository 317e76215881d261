//! # tollgate-store: Entity store for `Tollgate`
//!
//! Holds roles, business resources, access rules, business objects, users
//! and revoked credential ids behind a single [`RwLock`]. Every mutation
//! takes the write lock once, so a decision never observes a half-applied
//! change (a rule with some flags updated, a user deactivated but still
//! holding live credentials).
//!
//! The store is also what the decision engine reads from: it implements
//! [`RuleSource`] by resolving role and resource names to the stored rule.
//!
//! # Cascades
//!
//! | Deleted          | Also removed                                |
//! |------------------|---------------------------------------------|
//! | Role             | its access rules (refused while users hold it) |
//! | BusinessResource | its access rules and business objects       |
//! | User             | the business objects it owns                |
//!
//! # Example
//!
//! ```
//! use tollgate_store::{NewObject, NewUser, Seed, Store};
//! use tollgate_types::{ResourceName, RoleName};
//!
//! let store = Store::seeded(&Seed::standard())?;
//! let role = store.find_role(&RoleName::user())?;
//! let alice = store.create_user(NewUser::new("alice", "alice@example.com").with_role(role.id))?;
//!
//! let orders = store.find_resource(&ResourceName::orders())?;
//! let order = store.create_object(NewObject::new("order-1", orders.id), alice.id)?;
//! assert_eq!(store.owner_of(order.id)?, alice.id);
//! # Ok::<(), tollgate_store::StoreError>(())
//! ```

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tollgate_rbac::{
    AccessFlags, AccessRule, FlagsPatch, PermissionMatrix, PolicyError, Principal, Role,
    RuleSource,
};
use tollgate_types::{ObjectId, ResourceId, ResourceName, RoleId, RoleName, RuleId, UserId};
use tracing::{debug, info, warn};

mod model;
mod seed;

#[cfg(test)]
mod tests;

pub use model::{BusinessObject, BusinessResource, NewObject, NewUser, ObjectPatch, User, UserPatch};
pub use seed::{Seed, SeedReport, SeedResource, SeedRule};

/// Errors raised by store operations.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// A uniqueness constraint would be violated.
    #[error("{entity} '{key}' already exists")]
    Conflict { entity: &'static str, key: String },

    /// The referenced entity does not exist.
    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    /// A role cannot be deleted while users are assigned to it.
    #[error("role {role} is assigned to {users} user(s)")]
    RoleInUse { role: RoleName, users: usize },

    /// A field failed validation.
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// A permission matrix constraint was violated.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Snapshot file I/O failed.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot contents could not be encoded or decoded.
    #[error("snapshot format error: {0}")]
    Format(#[from] serde_json::Error),

    /// A thread panicked while holding the store lock.
    #[error("store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    fn conflict(entity: &'static str, key: impl Display) -> Self {
        Self::Conflict {
            entity,
            key: key.to_string(),
        }
    }

    fn not_found(entity: &'static str, key: impl Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Returns whether this is a uniqueness violation, including a duplicate
    /// (role, resource) rule.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::Conflict { .. }
                | Self::Policy(PolicyError::DuplicateRule { .. } | PolicyError::DuplicateRuleId(_))
        )
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// What a resource deletion took with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Removed {
    pub objects: usize,
    pub rules: usize,
}

// ============================================================================
// Tables
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct IdCounters {
    role: u64,
    resource: u64,
    rule: u64,
    object: u64,
    user: u64,
}

fn bump(slot: &mut u64) -> u64 {
    *slot += 1;
    *slot
}

/// Every table, guarded together. This is also the snapshot format.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Tables {
    roles: BTreeMap<RoleId, Role>,
    resources: BTreeMap<ResourceId, BusinessResource>,
    rules: PermissionMatrix,
    objects: BTreeMap<ObjectId, BusinessObject>,
    users: BTreeMap<UserId, User>,
    /// Revoked credential id mapped to the Unix second after which no
    /// token carrying it can verify.
    revoked_tokens: BTreeMap<String, u64>,
    next_ids: IdCounters,
}

fn require_text(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::invalid(field, "must not be empty"));
    }
    Ok(())
}

fn require_email(value: &str) -> Result<()> {
    require_text("email", value)?;
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(StoreError::invalid("email", format!("'{value}' is not an address"))),
    }
}

impl Tables {
    fn role(&self, id: RoleId) -> Result<&Role> {
        self.roles
            .get(&id)
            .ok_or_else(|| StoreError::not_found("role", id))
    }

    fn role_by_name(&self, name: &RoleName) -> Option<&Role> {
        self.roles.values().find(|r| &r.name == name)
    }

    fn resource(&self, id: ResourceId) -> Result<&BusinessResource> {
        self.resources
            .get(&id)
            .ok_or_else(|| StoreError::not_found("resource", id))
    }

    fn resource_by_name(&self, name: &ResourceName) -> Option<&BusinessResource> {
        self.resources.values().find(|r| &r.name == name)
    }

    fn object(&self, id: ObjectId) -> Result<&BusinessObject> {
        self.objects
            .get(&id)
            .ok_or_else(|| StoreError::not_found("object", id))
    }

    fn user(&self, id: UserId) -> Result<&User> {
        self.users
            .get(&id)
            .ok_or_else(|| StoreError::not_found("user", id))
    }

    fn user_mut(&mut self, id: UserId) -> Result<&mut User> {
        self.users
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("user", id))
    }

    fn insert_role(&mut self, name: RoleName) -> Result<Role> {
        if self.role_by_name(&name).is_some() {
            return Err(StoreError::conflict("role", name));
        }
        let role = Role::new(RoleId::new(bump(&mut self.next_ids.role)), name);
        self.roles.insert(role.id, role.clone());
        Ok(role)
    }

    fn insert_resource(&mut self, name: ResourceName, description: String) -> Result<BusinessResource> {
        if self.resource_by_name(&name).is_some() {
            return Err(StoreError::conflict("resource", name));
        }
        let resource = BusinessResource {
            id: ResourceId::new(bump(&mut self.next_ids.resource)),
            name,
            description,
        };
        self.resources.insert(resource.id, resource.clone());
        Ok(resource)
    }

    fn insert_rule(&mut self, role: RoleId, resource: ResourceId, flags: AccessFlags) -> Result<AccessRule> {
        self.role(role)?;
        self.resource(resource)?;
        if self.rules.lookup(role, resource).is_some() {
            return Err(PolicyError::DuplicateRule { role, resource }.into());
        }
        let rule = AccessRule::new(RuleId::new(bump(&mut self.next_ids.rule)), role, resource, flags);
        self.rules.insert(rule.clone())?;
        Ok(rule)
    }

    fn ensure_username_free(&self, username: &str, except: Option<UserId>) -> Result<()> {
        if self
            .users
            .values()
            .any(|u| u.username == username && Some(u.id) != except)
        {
            return Err(StoreError::conflict("username", username));
        }
        Ok(())
    }

    fn ensure_object_name_free(&self, name: &str, except: Option<ObjectId>) -> Result<()> {
        if self
            .objects
            .values()
            .any(|o| o.name == name && Some(o.id) != except)
        {
            return Err(StoreError::conflict("object", name));
        }
        Ok(())
    }

    fn remove_objects_where(&mut self, predicate: impl Fn(&BusinessObject) -> bool) -> usize {
        let before = self.objects.len();
        self.objects.retain(|_, object| !predicate(object));
        before - self.objects.len()
    }

    fn rule_flags(&self, role: &RoleName, resource: &ResourceName) -> Option<AccessFlags> {
        let role = self.role_by_name(role)?;
        let resource = self.resource_by_name(resource)?;
        self.rules.lookup(role.id, resource.id).map(|rule| rule.flags)
    }
}

// ============================================================================
// Store
// ============================================================================

/// Thread-safe entity store.
///
/// Share it behind an `Arc`. Reads take the shared lock; every mutation
/// takes the exclusive lock exactly once.
#[derive(Debug, Default)]
pub struct Store {
    tables: RwLock<Tables>,
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store and applies `seed` to it.
    pub fn seeded(seed: &Seed) -> Result<Self> {
        let store = Self::new();
        store.seed(seed)?;
        Ok(store)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| StoreError::LockPoisoned)
    }

    // ------------------------------------------------------------------
    // Roles
    // ------------------------------------------------------------------

    pub fn create_role(&self, name: RoleName) -> Result<Role> {
        let role = self.write()?.insert_role(name)?;
        info!(role = %role.name, id = %role.id, "role created");
        Ok(role)
    }

    pub fn get_role(&self, id: RoleId) -> Result<Role> {
        self.read()?.role(id).cloned()
    }

    pub fn find_role(&self, name: &RoleName) -> Result<Role> {
        self.read()?
            .role_by_name(name)
            .cloned()
            .ok_or_else(|| StoreError::not_found("role", name))
    }

    pub fn list_roles(&self) -> Result<Vec<Role>> {
        Ok(self.read()?.roles.values().cloned().collect())
    }

    /// Deletes a role and its access rules. Returns the number of rules removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RoleInUse`] while any user (active or not) is
    /// assigned the role.
    pub fn delete_role(&self, id: RoleId) -> Result<usize> {
        let mut tables = self.write()?;
        let name = tables.role(id)?.name.clone();

        let users = tables.users.values().filter(|u| u.role == Some(id)).count();
        if users > 0 {
            return Err(StoreError::RoleInUse { role: name, users });
        }

        let rules = tables.rules.remove_role(id);
        tables.roles.remove(&id);
        info!(role = %name, rules, "role deleted");
        Ok(rules)
    }

    // ------------------------------------------------------------------
    // Business resources
    // ------------------------------------------------------------------

    pub fn create_resource(
        &self,
        name: ResourceName,
        description: impl Into<String>,
    ) -> Result<BusinessResource> {
        let resource = self.write()?.insert_resource(name, description.into())?;
        info!(resource = %resource.name, id = %resource.id, "resource created");
        Ok(resource)
    }

    pub fn get_resource(&self, id: ResourceId) -> Result<BusinessResource> {
        self.read()?.resource(id).cloned()
    }

    pub fn find_resource(&self, name: &ResourceName) -> Result<BusinessResource> {
        self.read()?
            .resource_by_name(name)
            .cloned()
            .ok_or_else(|| StoreError::not_found("resource", name))
    }

    pub fn list_resources(&self) -> Result<Vec<BusinessResource>> {
        Ok(self.read()?.resources.values().cloned().collect())
    }

    /// Deletes a resource together with its objects and access rules.
    pub fn delete_resource(&self, id: ResourceId) -> Result<Removed> {
        let mut tables = self.write()?;
        let name = tables.resource(id)?.name.clone();

        let removed = Removed {
            objects: tables.remove_objects_where(|o| o.resource == id),
            rules: tables.rules.remove_resource(id),
        };
        tables.resources.remove(&id);
        info!(resource = %name, objects = removed.objects, rules = removed.rules, "resource deleted");
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Access rules
    // ------------------------------------------------------------------

    /// Creates the access rule for a (role, resource) pair.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Policy`] with [`PolicyError::DuplicateRule`] if
    /// the pair already has a rule, or [`StoreError::NotFound`] if either
    /// side does not exist.
    pub fn create_rule(&self, role: RoleId, resource: ResourceId, flags: AccessFlags) -> Result<AccessRule> {
        let rule = self.write()?.insert_rule(role, resource, flags)?;
        info!(rule = %rule.id, %role, %resource, ?flags, "access rule created");
        Ok(rule)
    }

    pub fn get_rule(&self, id: RuleId) -> Result<AccessRule> {
        self.read()?
            .rules
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("access rule", id))
    }

    /// Looks up the rule for a (role, resource) pair by id.
    pub fn rule_for(&self, role: RoleId, resource: ResourceId) -> Result<Option<AccessRule>> {
        Ok(self.read()?.rules.lookup(role, resource).cloned())
    }

    pub fn list_rules(&self) -> Result<Vec<AccessRule>> {
        Ok(self.read()?.rules.iter().cloned().collect())
    }

    /// Applies a partial flag update. The (role, resource) pair never changes.
    pub fn update_rule(&self, id: RuleId, patch: &FlagsPatch) -> Result<AccessRule> {
        let mut tables = self.write()?;
        if tables.rules.get(id).is_none() {
            return Err(StoreError::not_found("access rule", id));
        }
        let rule = tables.rules.update_flags(id, patch)?.clone();
        info!(rule = %id, flags = ?rule.flags, "access rule updated");
        Ok(rule)
    }

    pub fn delete_rule(&self, id: RuleId) -> Result<AccessRule> {
        let rule = self
            .write()?
            .rules
            .remove(id)
            .ok_or_else(|| StoreError::not_found("access rule", id))?;
        info!(rule = %id, role = %rule.role, resource = %rule.resource, "access rule deleted");
        Ok(rule)
    }

    // ------------------------------------------------------------------
    // Business objects
    // ------------------------------------------------------------------

    /// Creates a business object owned by `owner`.
    pub fn create_object(&self, new: NewObject, owner: UserId) -> Result<BusinessObject> {
        require_text("object name", &new.name)?;

        let mut tables = self.write()?;
        tables.resource(new.resource)?;
        tables.user(owner)?;
        tables.ensure_object_name_free(&new.name, None)?;

        let object = BusinessObject {
            id: ObjectId::new(bump(&mut tables.next_ids.object)),
            name: new.name,
            description: new.description,
            resource: new.resource,
            owner,
        };
        tables.objects.insert(object.id, object.clone());
        debug!(object = %object.id, resource = %object.resource, %owner, "object created");
        Ok(object)
    }

    pub fn get_object(&self, id: ObjectId) -> Result<BusinessObject> {
        self.read()?.object(id).cloned()
    }

    /// Returns an object together with the name of its resource.
    pub fn object_with_resource(&self, id: ObjectId) -> Result<(BusinessObject, ResourceName)> {
        let tables = self.read()?;
        let object = tables.object(id)?;
        let resource = tables.resource(object.resource)?.name.clone();
        Ok((object.clone(), resource))
    }

    /// Returns the recorded owner of an object.
    pub fn owner_of(&self, id: ObjectId) -> Result<UserId> {
        Ok(self.read()?.object(id)?.owner)
    }

    /// Lists objects, optionally restricted to one resource.
    pub fn list_objects(&self, resource: Option<ResourceId>) -> Result<Vec<BusinessObject>> {
        let tables = self.read()?;
        Ok(tables
            .objects
            .values()
            .filter(|o| resource.is_none_or(|r| o.resource == r))
            .cloned()
            .collect())
    }

    pub fn update_object(&self, id: ObjectId, patch: ObjectPatch) -> Result<BusinessObject> {
        if let Some(name) = &patch.name {
            require_text("object name", name)?;
        }

        let mut tables = self.write()?;
        tables.object(id)?;
        if let Some(name) = &patch.name {
            tables.ensure_object_name_free(name, Some(id))?;
        }

        let object = tables
            .objects
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("object", id))?;
        if let Some(name) = patch.name {
            object.name = name;
        }
        if let Some(description) = patch.description {
            object.description = description;
        }
        debug!(object = %id, "object updated");
        Ok(object.clone())
    }

    pub fn delete_object(&self, id: ObjectId) -> Result<BusinessObject> {
        let object = self
            .write()?
            .objects
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("object", id))?;
        debug!(object = %id, "object deleted");
        Ok(object)
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Registers an active user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the username or email is taken,
    /// and [`StoreError::Invalid`] for an empty username or malformed email.
    pub fn create_user(&self, new: NewUser) -> Result<User> {
        require_text("username", &new.username)?;
        require_email(&new.email)?;

        let mut tables = self.write()?;
        tables.ensure_username_free(&new.username, None)?;
        if tables.users.values().any(|u| u.email == new.email) {
            return Err(StoreError::conflict("email", &new.email));
        }
        if let Some(role) = new.role {
            tables.role(role)?;
        }

        let user = User {
            id: UserId::new(bump(&mut tables.next_ids.user)),
            username: new.username,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            active: true,
            role: new.role,
            credential_generation: 0,
        };
        tables.users.insert(user.id, user.clone());
        info!(user = %user.id, username = %user.username, "user created");
        Ok(user)
    }

    pub fn get_user(&self, id: UserId) -> Result<User> {
        self.read()?.user(id).cloned()
    }

    pub fn find_user(&self, username: &str) -> Result<User> {
        self.read()?
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| StoreError::not_found("user", username))
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.read()?.users.values().cloned().collect())
    }

    pub fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User> {
        if let Some(username) = &patch.username {
            require_text("username", username)?;
        }

        let mut tables = self.write()?;
        tables.user(id)?;
        if let Some(username) = &patch.username {
            tables.ensure_username_free(username, Some(id))?;
        }

        let user = tables.user_mut(id)?;
        if let Some(username) = patch.username {
            user.username = username;
        }
        if let Some(first_name) = patch.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            user.last_name = last_name;
        }
        debug!(user = %id, "user updated");
        Ok(user.clone())
    }

    /// Assigns (or clears) a user's role.
    pub fn set_role(&self, id: UserId, role: Option<RoleId>) -> Result<User> {
        let mut tables = self.write()?;
        let role_name = match role {
            Some(role) => Some(tables.role(role)?.name.clone()),
            None => None,
        };

        let user = tables.user_mut(id)?;
        user.role = role;
        info!(user = %id, role = ?role_name, "user role changed");
        Ok(user.clone())
    }

    /// Deactivates a user and invalidates every credential issued to it.
    ///
    /// Both effects happen under one write lock: no verification can see the
    /// user inactive with live credentials, or active with dead ones.
    pub fn deactivate_user(&self, id: UserId) -> Result<User> {
        let mut tables = self.write()?;
        let user = tables.user_mut(id)?;
        user.active = false;
        user.credential_generation += 1;
        info!(user = %id, generation = user.credential_generation, "user deactivated");
        Ok(user.clone())
    }

    /// Permanently removes a user and the objects it owns. Returns the number
    /// of objects removed.
    pub fn delete_user(&self, id: UserId) -> Result<usize> {
        let mut tables = self.write()?;
        tables.user(id)?;
        let objects = tables.remove_objects_where(|o| o.owner == id);
        tables.users.remove(&id);
        info!(user = %id, objects, "user deleted");
        Ok(objects)
    }

    /// Resolves a user into the principal the decision engine consumes.
    pub fn principal(&self, id: UserId) -> Result<Principal> {
        let tables = self.read()?;
        let user = tables.user(id)?;
        let role = user
            .role
            .and_then(|role| tables.roles.get(&role))
            .map(|role| role.name.clone());
        Ok(Principal {
            id,
            active: user.active,
            role,
        })
    }

    // ------------------------------------------------------------------
    // Credential state
    // ------------------------------------------------------------------

    /// Records a credential id as revoked until `expires_at`. Returns
    /// `false` if it already was.
    ///
    /// Entries whose expiry is at or before `now` are dropped under the same
    /// lock: every token they covered has expired on its own.
    pub fn revoke_token(&self, token_id: &str, expires_at: u64, now: u64) -> Result<bool> {
        let mut tables = self.write()?;

        let before = tables.revoked_tokens.len();
        tables.revoked_tokens.retain(|_, expiry| *expiry > now);
        let pruned = before - tables.revoked_tokens.len();
        if pruned > 0 {
            debug!(pruned, "expired revocations dropped");
        }

        let newly = match tables.revoked_tokens.entry(token_id.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(expires_at);
                true
            }
            Entry::Occupied(mut slot) => {
                let expiry = slot.get_mut();
                *expiry = (*expiry).max(expires_at);
                false
            }
        };
        if newly {
            debug!(token = token_id, expires_at, "credential revoked");
        }
        Ok(newly)
    }

    pub fn is_token_revoked(&self, token_id: &str) -> Result<bool> {
        Ok(self.read()?.revoked_tokens.contains_key(token_id))
    }

    /// Number of revocations currently retained.
    pub fn revoked_count(&self) -> Result<usize> {
        Ok(self.read()?.revoked_tokens.len())
    }

    // ------------------------------------------------------------------
    // Seeding and snapshots
    // ------------------------------------------------------------------

    /// Applies a seed. Existing roles, resources and rules are kept as they are.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if a rule names a role or resource
    /// that is neither in the seed nor already stored.
    pub fn seed(&self, seed: &Seed) -> Result<SeedReport> {
        let mut tables = self.write()?;
        let mut report = SeedReport::default();

        for name in &seed.roles {
            if tables.role_by_name(name).is_none() {
                tables.insert_role(name.clone())?;
                report.roles += 1;
            }
        }
        for resource in &seed.resources {
            if tables.resource_by_name(&resource.name).is_none() {
                tables.insert_resource(resource.name.clone(), resource.description.clone())?;
                report.resources += 1;
            }
        }
        for rule in &seed.rules {
            let role = tables
                .role_by_name(&rule.role)
                .ok_or_else(|| StoreError::not_found("role", &rule.role))?
                .id;
            let resource = tables
                .resource_by_name(&rule.resource)
                .ok_or_else(|| StoreError::not_found("resource", &rule.resource))?
                .id;
            if tables.rules.lookup(role, resource).is_none() {
                tables.insert_rule(role, resource, rule.flags)?;
                report.rules += 1;
            }
        }

        info!(
            roles = report.roles,
            resources = report.resources,
            rules = report.rules,
            "store seeded"
        );
        Ok(report)
    }

    /// Writes the full store state to `path` as JSON.
    ///
    /// The file is written beside the target and renamed into place, so a
    /// crash mid-write leaves the previous snapshot intact.
    pub fn save(&self, path: &Path) -> Result<()> {
        let tables = self.read()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let staging = path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(File::create(&staging)?);
            serde_json::to_writer_pretty(&mut writer, &*tables)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&staging, path)?;

        debug!(path = %path.display(), "snapshot saved");
        Ok(())
    }

    /// Loads a store from a snapshot written by [`Store::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let tables: Tables = serde_json::from_reader(reader)?;
        debug!(
            path = %path.display(),
            users = tables.users.len(),
            rules = tables.rules.len(),
            "snapshot loaded"
        );
        Ok(Self {
            tables: RwLock::new(tables),
        })
    }
}

impl RuleSource for Store {
    fn rule_flags(&self, role: &RoleName, resource: &ResourceName) -> Option<AccessFlags> {
        match self.read() {
            Ok(tables) => tables.rule_flags(role, resource),
            Err(e) => {
                warn!(error = %e, %role, %resource, "rule lookup failed, treating as no rule");
                None
            }
        }
    }
}
