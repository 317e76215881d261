//! Check command - evaluates one authorization decision.

use std::path::Path;

use anyhow::{Context, Result};
use tollgate_rbac::{Action, AuthorizationEngine, Decision};
use tollgate_types::{ObjectId, ResourceName};

use crate::style::{colors::SemanticStyle, print_labeled};

pub fn run(
    project_dir: &Path,
    user: &str,
    action: &str,
    resource: &str,
    owner: Option<&str>,
    object: Option<u64>,
) -> Result<()> {
    let tollgate = super::open(project_dir)?;
    let store = tollgate.store();

    let action: Action = action.parse()?;
    let resource = ResourceName::new(resource).context("Invalid resource name")?;
    let principal = store.principal(store.find_user(user)?.id)?;

    let owner = match (owner, object) {
        (Some(name), _) => Some(store.find_user(name)?.id),
        (None, Some(id)) => {
            let (object, object_resource) = store.object_with_resource(ObjectId::new(id))?;
            if object_resource != resource {
                anyhow::bail!("Object {id} belongs to {object_resource}, not {resource}");
            }
            Some(object.owner)
        }
        (None, None) => None,
    };

    let engine = AuthorizationEngine::new(&**store);
    let decision = engine.decide(Some(&principal), action, Some(&resource), owner)?;

    let verdict = match decision {
        Decision::Allow => "allow".success(),
        Decision::AllowIfOwner => "allow if owner".warning(),
        Decision::Deny => "deny".error(),
    };
    println!("{verdict}");
    print_labeled("user", user);
    print_labeled(
        "role",
        principal.role.as_ref().map_or("(none)", |role| role.as_str()),
    );
    if !principal.active {
        print_labeled("status", "inactive");
    }
    print_labeled("action", action.as_str());
    print_labeled("resource", resource.as_str());
    if let Some(owner) = owner {
        print_labeled("owner", &owner.to_string());
    }

    Ok(())
}
