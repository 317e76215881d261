//! Access rule management. Administrator-only.

use tollgate_rbac::{AccessFlags, AccessRule, FlagsPatch, Principal};
use tollgate_types::{ResourceName, RoleName, RuleId};
use tracing::info;

use crate::Tollgate;
use crate::error::Result;

impl Tollgate {
    pub fn list_rules(&self, principal: Option<&Principal>) -> Result<Vec<AccessRule>> {
        self.require_admin(principal)?;
        Ok(self.store.list_rules()?)
    }

    pub fn get_rule(&self, principal: Option<&Principal>, id: RuleId) -> Result<AccessRule> {
        self.require_admin(principal)?;
        Ok(self.store.get_rule(id)?)
    }

    /// Creates the rule for a (role, resource) pair.
    ///
    /// # Errors
    ///
    /// [`Conflict`](crate::TollgateError::Conflict) if the pair already has a rule.
    pub fn create_rule(
        &self,
        principal: Option<&Principal>,
        role: &RoleName,
        resource: &ResourceName,
        flags: AccessFlags,
    ) -> Result<AccessRule> {
        let principal = self.require_admin(principal)?;
        let role_id = self.store.find_role(role)?.id;
        let resource_id = self.store.find_resource(resource)?.id;

        let rule = self.store.create_rule(role_id, resource_id, flags)?;
        info!(rule = %rule.id, %role, %resource, by = %principal.id, "access rule created");
        Ok(rule)
    }

    /// Updates flags only. To move a rule to another pair, delete and recreate it.
    pub fn update_rule(&self, principal: Option<&Principal>, id: RuleId, patch: &FlagsPatch) -> Result<AccessRule> {
        let principal = self.require_admin(principal)?;
        let rule = self.store.update_rule(id, patch)?;
        info!(rule = %id, by = %principal.id, "access rule updated");
        Ok(rule)
    }

    pub fn delete_rule(&self, principal: Option<&Principal>, id: RuleId) -> Result<()> {
        let principal = self.require_admin(principal)?;
        self.store.delete_rule(id)?;
        info!(rule = %id, by = %principal.id, "access rule deleted");
        Ok(())
    }
}
