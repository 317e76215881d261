//! Business object operations.
//!
//! Collection-level actions (`list`, `create`) are checked against the
//! resource alone. Object-level actions load the object first, so an unknown
//! id is `NotFound` before any permission check, then compare its stored
//! owner.

use tollgate_rbac::{Action, Principal};
use tollgate_store::{BusinessObject, NewObject, ObjectPatch};
use tollgate_types::{ObjectId, ResourceName};
use tracing::info;

use crate::Tollgate;
use crate::error::Result;

impl Tollgate {
    /// Lists every object of a resource.
    ///
    /// Requires `read_all` on the resource; a principal with only
    /// `read_owned` is denied rather than given a filtered list.
    ///
    /// # Errors
    ///
    /// [`Malformed`](crate::TollgateError::Malformed) when `resource` is
    /// `None`.
    pub fn list_objects(
        &self,
        principal: Option<&Principal>,
        resource: Option<&ResourceName>,
    ) -> Result<Vec<BusinessObject>> {
        let principal = self.require_active(principal)?;
        self.authorize(principal, Action::List, resource, None)?;

        // authorize() has already rejected a missing resource.
        let Some(resource) = resource else {
            return Ok(Vec::new());
        };
        let resource = self.store.find_resource(resource)?;
        Ok(self.store.list_objects(Some(resource.id))?)
    }

    /// Creates an object in `resource`, owned by the principal.
    ///
    /// The permission check runs before the resource is resolved, so a
    /// principal without create rights gets `Forbidden` whether or not the
    /// resource exists.
    pub fn create_object(
        &self,
        principal: Option<&Principal>,
        resource: &ResourceName,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<BusinessObject> {
        let principal = self.require_active(principal)?;
        self.authorize(principal, Action::Create, Some(resource), None)?;
        let stored = self.store.find_resource(resource)?;

        let object = self.store.create_object(
            NewObject::new(name, stored.id).with_description(description),
            principal.id,
        )?;
        info!(object = %object.id, %resource, owner = %principal.id, "object created");
        Ok(object)
    }

    pub fn retrieve_object(&self, principal: Option<&Principal>, id: ObjectId) -> Result<BusinessObject> {
        let principal = self.require_active(principal)?;
        let (object, resource) = self.store.object_with_resource(id)?;
        self.authorize(principal, Action::Retrieve, Some(&resource), Some(object.owner))?;
        Ok(object)
    }

    /// Applies a partial update. Resource and owner cannot change.
    pub fn update_object(
        &self,
        principal: Option<&Principal>,
        id: ObjectId,
        patch: ObjectPatch,
    ) -> Result<BusinessObject> {
        let principal = self.require_active(principal)?;
        let (object, resource) = self.store.object_with_resource(id)?;
        self.authorize(principal, Action::Update, Some(&resource), Some(object.owner))?;

        let updated = self.store.update_object(id, patch)?;
        info!(object = %id, by = %principal.id, "object updated");
        Ok(updated)
    }

    pub fn delete_object(&self, principal: Option<&Principal>, id: ObjectId) -> Result<()> {
        let principal = self.require_active(principal)?;
        let (object, resource) = self.store.object_with_resource(id)?;
        self.authorize(principal, Action::Delete, Some(&resource), Some(object.owner))?;

        self.store.delete_object(id)?;
        info!(object = %id, by = %principal.id, "object deleted");
        Ok(())
    }
}
