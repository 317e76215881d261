//! Authorization decision engine.
//!
//! Decides whether a principal may perform an action on a business resource.
//! Denial is a normal return value ([`Decision::Deny`]); only malformed input
//! is an [`EnforcementError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tollgate_types::{ResourceName, RoleName, UserId};
use tracing::debug;

use crate::permissions::Action;
use crate::policy::RuleSource;

/// Error type for malformed authorization requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnforcementError {
    /// The caller supplied a verb outside the fixed action set.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// The action needs a resource name and none was given.
    #[error("resource name is required for action '{action}'")]
    MissingResource { action: Action },
}

/// Result type for enforcement operations.
pub type Result<T> = std::result::Result<T, EnforcementError>;

/// The authenticated actor making a request, as resolved by the identity
/// provider for this request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub active: bool,
    /// Current role. `None` denies every matrix-gated action.
    pub role: Option<RoleName>,
}

impl Principal {
    pub fn new(id: UserId, role: Option<RoleName>) -> Self {
        Self {
            id,
            active: true,
            role,
        }
    }

    /// Returns the role if the principal may act at all.
    fn acting_role(&self) -> Option<&RoleName> {
        if self.active { self.role.as_ref() } else { None }
    }
}

/// Outcome of an authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Permitted regardless of ownership.
    Allow,

    /// Permitted only if the target object is owned by the principal.
    /// The caller must compare the object's recorded owner.
    AllowIfOwner,

    /// Not permitted.
    Deny,
}

impl Decision {
    /// Resolves the decision against a concrete object owner.
    pub fn permits(self, principal: UserId, owner: UserId) -> bool {
        match self {
            Decision::Allow => true,
            Decision::AllowIfOwner => principal == owner,
            Decision::Deny => false,
        }
    }

    /// Returns whether the decision grants access without an ownership check.
    pub fn is_allow(self) -> bool {
        self == Decision::Allow
    }
}

/// Authorization decision engine.
///
/// Holds a reference to the rule source and evaluates requests against the
/// current rules. Every call is a pure read: it never mutates state, so
/// concurrent decisions are independent.
pub struct AuthorizationEngine<S> {
    rules: S,
}

impl<S: RuleSource> AuthorizationEngine<S> {
    pub fn new(rules: S) -> Self {
        Self { rules }
    }

    /// Decides whether `principal` may perform `action` on `resource`.
    ///
    /// `target_owner` is the recorded owner of the target object for
    /// object-level actions. When it is known, an owned-only grant resolves
    /// to `Allow` or `Deny` here; when it is not, `AllowIfOwner` is returned
    /// for the caller to resolve. Collection-level actions (`list`, `create`)
    /// never resolve through the owned tier.
    ///
    /// # Errors
    ///
    /// Returns [`EnforcementError::MissingResource`] if an authenticated
    /// principal with a role supplies no resource name.
    pub fn decide(
        &self,
        principal: Option<&Principal>,
        action: Action,
        resource: Option<&ResourceName>,
        target_owner: Option<UserId>,
    ) -> Result<Decision> {
        // 1. Unauthenticated, deactivated or role-less principals act on nothing.
        let Some((principal, role)) = principal.and_then(|p| p.acting_role().map(|r| (p, r)))
        else {
            debug!(%action, "no acting principal, denying");
            return Ok(Decision::Deny);
        };

        // 2. There is no object to derive the resource from.
        let resource = resource.ok_or(EnforcementError::MissingResource { action })?;

        // 3. No rule for the pair is a silent deny.
        let Some(flags) = self.rules.rule_flags(role, resource) else {
            debug!(principal = %principal.id, %role, %resource, %action, "no access rule, denying");
            return Ok(Decision::Deny);
        };

        let grant = action.grant();

        // 4. The all-flag wins outright.
        let decision = if flags.get(grant.all) {
            Decision::Allow
        // 5. The owned-flag defers to the target object's owner.
        } else if grant.owned.is_some_and(|flag| flags.get(flag)) {
            if action.is_collection_level() {
                Decision::Deny
            } else {
                match target_owner {
                    Some(owner) if owner == principal.id => Decision::Allow,
                    Some(_) => Decision::Deny,
                    None => Decision::AllowIfOwner,
                }
            }
        // 6. Nothing granted.
        } else {
            Decision::Deny
        };

        debug!(
            principal = %principal.id,
            %role,
            %resource,
            %action,
            ?decision,
            "authorization decided"
        );
        Ok(decision)
    }

    /// Returns whether the request is fully permitted.
    ///
    /// Malformed requests and `AllowIfOwner` outcomes both count as denied.
    pub fn is_permitted(
        &self,
        principal: Option<&Principal>,
        action: Action,
        resource: Option<&ResourceName>,
        target_owner: Option<UserId>,
    ) -> bool {
        matches!(
            self.decide(principal, action, resource, target_owner),
            Ok(Decision::Allow)
        )
    }

    pub fn rules(&self) -> &S {
        &self.rules
    }
}

/// Returns whether the principal holds the administrator role.
///
/// Independent of the permission matrix. Deactivated principals and
/// principals without a role are never administrators.
pub fn is_administrator(principal: Option<&Principal>) -> bool {
    principal
        .and_then(Principal::acting_role)
        .is_some_and(RoleName::is_admin)
}

/// Returns whether the principal is an administrator or is acting on its own
/// user record.
///
/// The identity branch does not consult the role, so a principal without a
/// role may still act on itself. Deactivated principals fail both branches.
pub fn is_self_or_administrator(principal: Option<&Principal>, target: UserId) -> bool {
    match principal {
        Some(p) if p.active => p.id == target || is_administrator(Some(p)),
        _ => false,
    }
}
