//! # tollgate-rbac: Role-Based Access Control
//!
//! Decides whether a principal may act on a business resource:
//! - **Permission matrix** (one [`AccessRule`] per role and resource pair)
//! - **Two-tier grants** (an "all objects" flag and an "owned objects" flag)
//! - **Administrator checks** independent of the matrix
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Request (principal, action, resource)       │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  AuthorizationEngine                         │
//! │  ├─ Principal gate (active, has role)        │
//! │  ├─ Rule lookup (RuleSource)                 │
//! │  ├─ "all" flag                               │
//! │  └─ "owned" flag + owner comparison          │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Decision: Allow | AllowIfOwner | Deny       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Standard Roles
//!
//! The seeded flag sets for `Admin`, `Manager` and `User` live in
//! [`StandardRules`]; [`StandardRules::for_role`] returns them by role name.
//!
//! ```
//! use tollgate_rbac::StandardRules;
//! use tollgate_types::RoleName;
//!
//! let manager = StandardRules::for_role(&RoleName::manager()).unwrap();
//! assert!(manager.read_all && !manager.update_all);
//! assert_eq!(StandardRules::for_role(&RoleName::admin()), Some(StandardRules::admin()));
//! ```
//!
//! Being an administrator does not bypass the matrix: without a rule, Admin
//! is denied like anyone else.
//!
//! ## Examples
//!
//! ```
//! use std::collections::HashMap;
//! use tollgate_rbac::{AccessFlags, Action, AuthorizationEngine, Decision, Principal};
//! use tollgate_types::{ResourceName, RoleName, UserId};
//!
//! let mut rules = HashMap::new();
//! rules.insert(
//!     (RoleName::manager(), ResourceName::orders()),
//!     AccessFlags { read_all: true, update_owned: true, ..AccessFlags::none() },
//! );
//! let engine = AuthorizationEngine::new(rules);
//! let manager = Principal::new(UserId::new(1), Some(RoleName::manager()));
//!
//! let own = engine.decide(Some(&manager), Action::Update, Some(&ResourceName::orders()), Some(UserId::new(1)))?;
//! let other = engine.decide(Some(&manager), Action::Update, Some(&ResourceName::orders()), Some(UserId::new(2)))?;
//!
//! assert_eq!(own, Decision::Allow);
//! assert_eq!(other, Decision::Deny);
//! # Ok::<(), tollgate_rbac::EnforcementError>(())
//! ```

pub mod enforcement;
pub mod permissions;
pub mod policy;
pub mod roles;

// Re-export commonly used types
pub use enforcement::{
    AuthorizationEngine, Decision, EnforcementError, Principal, is_administrator,
    is_self_or_administrator,
};
pub use permissions::{AccessFlags, Action, ActionGrant, FlagsPatch, PermissionFlag};
pub use policy::{AccessRule, PermissionMatrix, PolicyError, RuleSource, StandardRules};
pub use roles::Role;
