//! Role definitions for RBAC.
//!
//! A role is a named bucket of principals sharing one permission profile.
//! Three roles are seeded by default:
//! - Admin: manages rules and users, bypasses nothing on the matrix
//! - Manager: broad read access, edits own records
//! - User: own records only (the role assigned on registration)
//!
//! The set is open: any valid [`RoleName`] can be seeded.

use serde::{Deserialize, Serialize};
use tollgate_types::{RoleId, RoleName};

/// Role in the access control system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: RoleName,
}

impl Role {
    pub fn new(id: RoleId, name: RoleName) -> Self {
        Self { id, name }
    }

    /// Returns whether this is the administrator role.
    ///
    /// Administrator identity gates rule management and cross-user
    /// operations. It does not grant anything on the permission matrix: an
    /// administrator still needs access rules to touch business objects.
    pub fn is_administrator(&self) -> bool {
        self.name.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_administrator_role() {
        let admin = Role::new(RoleId::new(1), RoleName::admin());
        let manager = Role::new(RoleId::new(2), RoleName::manager());
        let custom = Role::new(RoleId::new(3), RoleName::new("Auditor").unwrap());

        assert!(admin.is_administrator());
        assert!(!manager.is_administrator());
        assert!(!custom.is_administrator());
    }
}
