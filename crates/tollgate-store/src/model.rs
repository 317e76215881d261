//! Stored entities and their create/patch payloads.

use serde::{Deserialize, Serialize};
use tollgate_types::{ObjectId, ResourceId, ResourceName, RoleId, UserId};

/// A named category of business objects whose access is governed uniformly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessResource {
    pub id: ResourceId,
    pub name: ResourceName,
    #[serde(default)]
    pub description: String,
}

/// An individual record belonging to one resource and one owner.
///
/// Both `resource` and `owner` are fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessObject {
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub resource: ResourceId,
    pub owner: UserId,
}

/// A registered user, the principal behind every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub active: bool,
    pub role: Option<RoleId>,
    /// Bumped on deactivation. Credentials carrying an older value are dead.
    #[serde(default)]
    pub credential_generation: u64,
}

/// Payload for registering a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: Option<RoleId>,
}

impl NewUser {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_names(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    #[must_use]
    pub fn with_role(mut self, role: RoleId) -> Self {
        self.role = Some(role);
        self
    }
}

/// Partial update of a user's profile. Email, role and the active flag have
/// dedicated operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Payload for creating a business object. The owner is always the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewObject {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub resource: ResourceId,
}

impl NewObject {
    pub fn new(name: impl Into<String>, resource: ResourceId) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            resource,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Partial update of a business object. Resource and owner are immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}
