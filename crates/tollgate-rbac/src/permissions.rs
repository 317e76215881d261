#![allow(clippy::match_same_arms)]
//! Actions and permission flags.
//!
//! Every caller-side verb is mapped onto one of five [`Action`]s, and every
//! action maps onto a fixed pair of [`PermissionFlag`]s: the flag that grants
//! access to all objects, and (except for `create`) the flag that grants
//! access to owned objects only.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::enforcement::EnforcementError;

/// Action a principal attempts on a business resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// List the objects of a resource. Collection-level.
    List,

    /// Read a single object. Object-level.
    Retrieve,

    /// Create a new object. Collection-level; there is no owner yet.
    Create,

    /// Partially update an existing object. Object-level.
    Update,

    /// Delete an existing object. Object-level.
    Delete,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::List,
        Action::Retrieve,
        Action::Create,
        Action::Update,
        Action::Delete,
    ];

    /// Returns whether this action is checked before any target object exists.
    ///
    /// Collection-level actions can never be resolved through the "owned"
    /// tier because there is no object whose owner could be compared.
    pub fn is_collection_level(self) -> bool {
        matches!(self, Action::List | Action::Create)
    }

    /// Returns the flags governing this action.
    pub fn grant(self) -> ActionGrant {
        match self {
            Action::List | Action::Retrieve => ActionGrant {
                all: PermissionFlag::ReadAll,
                owned: Some(PermissionFlag::ReadOwned),
            },
            Action::Create => ActionGrant {
                all: PermissionFlag::Create,
                owned: None,
            },
            Action::Update => ActionGrant {
                all: PermissionFlag::UpdateAll,
                owned: Some(PermissionFlag::UpdateOwned),
            },
            Action::Delete => ActionGrant {
                all: PermissionFlag::DeleteAll,
                owned: Some(PermissionFlag::DeleteOwned),
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Retrieve => "retrieve",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = EnforcementError;

    /// Maps a caller verb onto an action.
    ///
    /// Accepts the canonical names plus the REST-style aliases
    /// `partial_update` and `destroy`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(Action::List),
            "retrieve" => Ok(Action::Retrieve),
            "create" => Ok(Action::Create),
            "update" | "partial_update" => Ok(Action::Update),
            "delete" | "destroy" => Ok(Action::Delete),
            other => Err(EnforcementError::UnknownAction(other.to_string())),
        }
    }
}

/// A single boolean field of an access rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionFlag {
    ReadOwned,
    ReadAll,
    Create,
    UpdateOwned,
    UpdateAll,
    DeleteOwned,
    DeleteAll,
}

/// The (all, owned) flag pair consulted for one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionGrant {
    /// Grants the action on every object of the resource.
    pub all: PermissionFlag,

    /// Grants the action on the principal's own objects. `None` for `create`.
    pub owned: Option<PermissionFlag>,
}

/// The permission bits of one access rule.
///
/// Flags are independent: `update_all` does not require `update_owned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessFlags {
    pub read_owned: bool,
    pub read_all: bool,
    pub create: bool,
    pub update_owned: bool,
    pub update_all: bool,
    pub delete_owned: bool,
    pub delete_all: bool,
}

impl AccessFlags {
    /// Every flag cleared. A rule with these flags denies everything.
    pub const fn none() -> Self {
        Self {
            read_owned: false,
            read_all: false,
            create: false,
            update_owned: false,
            update_all: false,
            delete_owned: false,
            delete_all: false,
        }
    }

    /// Every flag set.
    pub const fn full() -> Self {
        Self {
            read_owned: true,
            read_all: true,
            create: true,
            update_owned: true,
            update_all: true,
            delete_owned: true,
            delete_all: true,
        }
    }

    /// Owned-object access only: read, update and delete what you own.
    ///
    /// This is the flag set a new rule gets when none are specified.
    pub const fn owned_only() -> Self {
        Self {
            read_owned: true,
            read_all: false,
            create: false,
            update_owned: true,
            update_all: false,
            delete_owned: true,
            delete_all: false,
        }
    }

    /// Returns the value of a single flag.
    pub fn get(&self, flag: PermissionFlag) -> bool {
        match flag {
            PermissionFlag::ReadOwned => self.read_owned,
            PermissionFlag::ReadAll => self.read_all,
            PermissionFlag::Create => self.create,
            PermissionFlag::UpdateOwned => self.update_owned,
            PermissionFlag::UpdateAll => self.update_all,
            PermissionFlag::DeleteOwned => self.delete_owned,
            PermissionFlag::DeleteAll => self.delete_all,
        }
    }

    /// Sets a single flag.
    pub fn set(&mut self, flag: PermissionFlag, value: bool) {
        let slot = match flag {
            PermissionFlag::ReadOwned => &mut self.read_owned,
            PermissionFlag::ReadAll => &mut self.read_all,
            PermissionFlag::Create => &mut self.create,
            PermissionFlag::UpdateOwned => &mut self.update_owned,
            PermissionFlag::UpdateAll => &mut self.update_all,
            PermissionFlag::DeleteOwned => &mut self.delete_owned,
            PermissionFlag::DeleteAll => &mut self.delete_all,
        };
        *slot = value;
    }

    /// Returns whether any flag is set.
    pub fn any(&self) -> bool {
        *self != Self::none()
    }
}

impl Default for AccessFlags {
    fn default() -> Self {
        Self::owned_only()
    }
}

/// Partial update of [`AccessFlags`]. `None` leaves a flag unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagsPatch {
    pub read_owned: Option<bool>,
    pub read_all: Option<bool>,
    pub create: Option<bool>,
    pub update_owned: Option<bool>,
    pub update_all: Option<bool>,
    pub delete_owned: Option<bool>,
    pub delete_all: Option<bool>,
}

impl FlagsPatch {
    /// Applies the patch to a full flag set.
    pub fn apply(&self, flags: &mut AccessFlags) {
        let updates = [
            (PermissionFlag::ReadOwned, self.read_owned),
            (PermissionFlag::ReadAll, self.read_all),
            (PermissionFlag::Create, self.create),
            (PermissionFlag::UpdateOwned, self.update_owned),
            (PermissionFlag::UpdateAll, self.update_all),
            (PermissionFlag::DeleteOwned, self.delete_owned),
            (PermissionFlag::DeleteAll, self.delete_all),
        ];
        for (flag, value) in updates {
            if let Some(value) = value {
                flags.set(flag, value);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
