//! # Tollgate
//!
//! Role-based access control for business objects.
//!
//! Every business object belongs to one business resource (`products`,
//! `orders`, `shops`, ...) and one owner. Every user holds at most one role.
//! A permission matrix with one rule per (role, resource) pair says, per
//! action, whether the role may act on all objects of the resource or only
//! on the objects it owns.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Tollgate                            │
//! │  ┌──────────┐   ┌───────────┐   ┌──────────┐   ┌──────────┐ │
//! │  │ Sessions │ → │ Principal │ → │  Engine  │ → │  Store   │ │
//! │  │  (JWT)   │   │(id, role) │   │ (matrix) │   │ (owners) │ │
//! │  └──────────┘   └───────────┘   └──────────┘   └──────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use tollgate::{Registration, Tollgate};
//! use tollgate_auth::JwtConfig;
//! use tollgate_store::Seed;
//! use tollgate_types::ResourceName;
//!
//! let tollgate = Tollgate::with_seed(&Seed::standard(), JwtConfig::new("secret"))?;
//! tollgate.register_user(Registration::new("alice", "alice@example.com"))?;
//!
//! let tokens = tollgate.login("alice")?;
//! let alice = tollgate.authenticate(&tokens.access)?;
//!
//! let order = tollgate.create_object(Some(&alice), &ResourceName::orders(), "order-1", "")?;
//! assert_eq!(tollgate.retrieve_object(Some(&alice), order.id)?.owner, alice.id);
//! # Ok::<(), tollgate::TollgateError>(())
//! ```
//!
//! # Outcomes
//!
//! - Unknown ids are `NotFound`, checked before permissions.
//! - Denials are a bare `Forbidden`, with no hint of the missing flag.
//! - No principal, or a deactivated one, is `AuthenticationFailure`.

mod error;
mod objects;
mod rules;
mod tollgate;
mod users;

pub use error::{Result, TollgateError};
pub use tollgate::Tollgate;
pub use users::Registration;

// Re-export the types callers need at the boundary
pub use tollgate_auth::{JwtConfig, TokenPair};
pub use tollgate_rbac::{AccessFlags, AccessRule, Action, FlagsPatch, Principal, Role};
pub use tollgate_store::{BusinessObject, BusinessResource, ObjectPatch, Seed, User, UserPatch};
pub use tollgate_types::{ObjectId, ResourceName, RoleName, RuleId, UserId};
