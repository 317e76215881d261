//! User operations.
//!
//! Profile reads and edits are allowed to the user itself and to
//! administrators. Listing users and changing roles are administrator-only.

use tollgate_rbac::{Principal, is_self_or_administrator};
use tollgate_store::{NewUser, StoreError, User, UserPatch};
use tollgate_types::{RoleName, UserId};
use tracing::{info, warn};

use crate::Tollgate;
use crate::error::{Result, TollgateError};

/// Self-service registration payload. The role is never caller-chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl Registration {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            ..Self::default()
        }
    }
}

impl Tollgate {
    fn require_self_or_admin<'p>(
        &self,
        principal: Option<&'p Principal>,
        target: UserId,
    ) -> Result<&'p Principal> {
        let principal = self.require_active(principal)?;
        // NotFound before Forbidden, as for objects.
        self.store.get_user(target)?;
        if is_self_or_administrator(Some(principal), target) {
            Ok(principal)
        } else {
            warn!(principal = %principal.id, %target, "user operation denied");
            Err(TollgateError::Forbidden)
        }
    }

    /// Registers a new user with the default `User` role.
    ///
    /// Open to anyone. If the `User` role has not been seeded the account is
    /// created without a role and can act on nothing until one is assigned.
    pub fn register_user(&self, registration: Registration) -> Result<User> {
        let mut new = NewUser::new(registration.username, registration.email)
            .with_names(registration.first_name, registration.last_name);

        match self.store.find_role(&RoleName::user()) {
            Ok(role) => new = new.with_role(role.id),
            Err(StoreError::NotFound { .. }) => {
                warn!("default role missing, registering without a role");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(self.store.create_user(new)?)
    }

    pub fn list_users(&self, principal: Option<&Principal>) -> Result<Vec<User>> {
        self.require_admin(principal)?;
        Ok(self.store.list_users()?)
    }

    pub fn get_user(&self, principal: Option<&Principal>, id: UserId) -> Result<User> {
        self.require_self_or_admin(principal, id)?;
        Ok(self.store.get_user(id)?)
    }

    /// Partially updates username and names.
    pub fn update_user(&self, principal: Option<&Principal>, id: UserId, patch: UserPatch) -> Result<User> {
        self.require_self_or_admin(principal, id)?;
        Ok(self.store.update_user(id, patch)?)
    }

    /// Soft-deletes a user and kills every credential it holds, atomically.
    pub fn deactivate_user(&self, principal: Option<&Principal>, id: UserId) -> Result<User> {
        let principal = self.require_self_or_admin(principal, id)?;
        let user = self.store.deactivate_user(id)?;
        info!(user = %id, by = %principal.id, "user deactivated");
        Ok(user)
    }

    /// Assigns a role to a user, or clears it with `None`.
    pub fn assign_role(
        &self,
        principal: Option<&Principal>,
        id: UserId,
        role: Option<&RoleName>,
    ) -> Result<User> {
        let principal = self.require_admin(principal)?;
        let role_id = match role {
            Some(name) => Some(self.store.find_role(name)?.id),
            None => None,
        };

        let user = self.store.set_role(id, role_id)?;
        info!(user = %id, role = role.map(RoleName::as_str), by = %principal.id, "role assigned");
        Ok(user)
    }
}
