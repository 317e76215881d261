//! # tollgate-types: Core types for `Tollgate`
//!
//! This crate contains shared types used across the `Tollgate` system:
//! - Entity IDs ([`UserId`], [`RoleId`], [`ResourceId`], [`ObjectId`], [`RuleId`])
//! - Validated names ([`RoleName`], [`ResourceName`])
//!
//! Role and resource names are open sets. The well-known values
//! (`Admin`, `Manager`, `User`; `products`, `orders`, `shops`) are provided as
//! constructors, but any name that passes validation can be seeded at runtime.

use std::fmt::{Debug, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// Entity IDs - All Copy (cheap 8-byte values)
// ============================================================================

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the raw `u64` value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a user (the principal making requests).
    UserId
);

entity_id!(
    /// Unique identifier for a role.
    RoleId
);

entity_id!(
    /// Unique identifier for a business resource (e.g. `orders`).
    ResourceId
);

entity_id!(
    /// Unique identifier for a business object.
    ObjectId
);

entity_id!(
    /// Unique identifier for an access rule.
    RuleId
);

// ============================================================================
// Validated Names - Clone (heap-backed, compared by value)
// ============================================================================

/// Maximum length of a role or resource name, in bytes.
pub const NAME_MAX_LENGTH: usize = 64;

/// Error returned when a role or resource name fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("name must not be empty")]
    Empty,

    #[error("name exceeds {max} bytes: {len}")]
    TooLong { len: usize, max: usize },

    #[error("name contains invalid character {ch:?} (allowed: ASCII letters, digits, '_', '-')")]
    InvalidCharacter { ch: char },
}

fn validate_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if name.len() > NAME_MAX_LENGTH {
        return Err(NameError::TooLong {
            len: name.len(),
            max: NAME_MAX_LENGTH,
        });
    }
    if let Some(ch) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(NameError::InvalidCharacter { ch });
    }
    Ok(())
}

/// Name of a role.
///
/// Comparison is exact and case-sensitive: `Admin` and `admin` are different
/// roles. Only [`RoleName::admin`] unlocks administrator-only operations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleName(String);

impl RoleName {
    pub const ADMIN: &'static str = "Admin";
    pub const MANAGER: &'static str = "Manager";
    pub const USER: &'static str = "User";

    /// Creates a validated role name.
    ///
    /// # Errors
    ///
    /// Returns [`NameError`] if the name is empty, too long, or contains
    /// characters outside `[A-Za-z0-9_-]`.
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self(name))
    }

    /// The administrator role.
    pub fn admin() -> Self {
        Self(Self::ADMIN.to_string())
    }

    /// The manager role.
    pub fn manager() -> Self {
        Self(Self::MANAGER.to_string())
    }

    /// The default role assigned on registration.
    pub fn user() -> Self {
        Self(Self::USER.to_string())
    }

    pub fn is_admin(&self) -> bool {
        self.0 == Self::ADMIN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RoleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for RoleName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for RoleName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

/// Name of a business resource (a category of business objects).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceName(String);

impl ResourceName {
    pub const PRODUCTS: &'static str = "products";
    pub const ORDERS: &'static str = "orders";
    pub const SHOPS: &'static str = "shops";

    /// Creates a validated resource name.
    ///
    /// # Errors
    ///
    /// Returns [`NameError`] if the name is empty, too long, or contains
    /// characters outside `[A-Za-z0-9_-]`.
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self(name))
    }

    pub fn products() -> Self {
        Self(Self::PRODUCTS.to_string())
    }

    pub fn orders() -> Self {
        Self(Self::ORDERS.to_string())
    }

    pub fn shops() -> Self {
        Self(Self::SHOPS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ResourceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ResourceName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for ResourceName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<ResourceName> for String {
    fn from(value: ResourceName) -> Self {
        value.0
    }
}
