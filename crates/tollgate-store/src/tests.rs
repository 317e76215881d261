//! Unit tests for tollgate-store

use std::sync::Arc;
use std::thread;

use proptest::prelude::*;
use tempfile::TempDir;
use test_case::test_case;
use tollgate_rbac::{AccessFlags, Action, AuthorizationEngine, Decision, FlagsPatch, RuleSource};
use tollgate_types::{ObjectId, ResourceName, RoleName, UserId};

use crate::{NewObject, NewUser, ObjectPatch, Seed, Store, StoreError, UserPatch};

fn seeded() -> Store {
    Store::seeded(&Seed::standard()).unwrap()
}

fn user_with_role(store: &Store, username: &str, role: &RoleName) -> UserId {
    let role = store.find_role(role).unwrap();
    store
        .create_user(NewUser::new(username, format!("{username}@example.com")).with_role(role.id))
        .unwrap()
        .id
}

// ============================================================================
// Seeding
// ============================================================================

#[test]
fn standard_seed_populates_tables() {
    let store = seeded();
    assert_eq!(store.list_roles().unwrap().len(), 3);
    assert_eq!(store.list_resources().unwrap().len(), 3);
    assert_eq!(store.list_rules().unwrap().len(), 9);
}

#[test]
fn seeding_twice_is_additive() {
    let store = seeded();
    let report = store.seed(&Seed::standard()).unwrap();
    assert_eq!(report.roles, 0);
    assert_eq!(report.resources, 0);
    assert_eq!(report.rules, 0);
    assert_eq!(store.list_rules().unwrap().len(), 9);
}

#[test]
fn seed_rule_with_unknown_role_fails() {
    let mut seed = Seed::empty();
    seed.resources = Seed::standard().resources;
    seed.rules = vec![crate::SeedRule {
        role: RoleName::new("Ghost").unwrap(),
        resource: ResourceName::orders(),
        flags: AccessFlags::none(),
    }];

    let store = Store::new();
    let err = store.seed(&seed).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "role", .. }));
}

// ============================================================================
// Uniqueness
// ============================================================================

#[test]
fn duplicate_rule_pair_is_conflict() {
    let store = seeded();
    let role = store.find_role(&RoleName::manager()).unwrap();
    let resource = store.find_resource(&ResourceName::orders()).unwrap();

    let err = store
        .create_rule(role.id, resource.id, AccessFlags::none())
        .unwrap_err();
    assert!(err.is_conflict());
}

#[test_case("role"; "role name")]
#[test_case("resource"; "resource name")]
#[test_case("username"; "username")]
#[test_case("email"; "email")]
#[test_case("object"; "object name")]
fn uniqueness_violations_are_conflicts(kind: &str) {
    let store = seeded();
    let alice = user_with_role(&store, "alice", &RoleName::user());
    let orders = store.find_resource(&ResourceName::orders()).unwrap();
    store
        .create_object(NewObject::new("order-1", orders.id), alice)
        .unwrap();

    let err = match kind {
        "role" => store.create_role(RoleName::manager()).unwrap_err(),
        "resource" => store
            .create_resource(ResourceName::orders(), "again")
            .unwrap_err(),
        "username" => store
            .create_user(NewUser::new("alice", "other@example.com"))
            .unwrap_err(),
        "email" => store
            .create_user(NewUser::new("alice2", "alice@example.com"))
            .unwrap_err(),
        _ => store
            .create_object(NewObject::new("order-1", orders.id), alice)
            .unwrap_err(),
    };
    assert!(err.is_conflict(), "{kind}: {err}");
}

#[test]
fn malformed_email_is_invalid() {
    let store = Store::new();
    let err = store
        .create_user(NewUser::new("bob", "not-an-address"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Invalid { field: "email", .. }));
}

#[test]
fn renaming_user_to_taken_username_is_conflict() {
    let store = seeded();
    let alice = user_with_role(&store, "alice", &RoleName::user());
    user_with_role(&store, "bob", &RoleName::user());

    let patch = UserPatch {
        username: Some("bob".to_string()),
        ..UserPatch::default()
    };
    assert!(store.update_user(alice, patch).unwrap_err().is_conflict());

    // Keeping your own name is not a conflict.
    let patch = UserPatch {
        username: Some("alice".to_string()),
        first_name: Some("Alice".to_string()),
        ..UserPatch::default()
    };
    let updated = store.update_user(alice, patch).unwrap();
    assert_eq!(updated.first_name, "Alice");
}

// ============================================================================
// Cascades
// ============================================================================

#[test]
fn role_in_use_cannot_be_deleted() {
    let store = seeded();
    let alice = user_with_role(&store, "alice", &RoleName::manager());
    let manager = store.find_role(&RoleName::manager()).unwrap();

    let err = store.delete_role(manager.id).unwrap_err();
    assert!(matches!(err, StoreError::RoleInUse { users: 1, .. }));

    store.set_role(alice, None).unwrap();
    let rules_removed = store.delete_role(manager.id).unwrap();
    assert_eq!(rules_removed, 3);
    assert_eq!(store.list_rules().unwrap().len(), 6);
}

#[test]
fn deleting_resource_cascades_objects_and_rules() {
    let store = seeded();
    let alice = user_with_role(&store, "alice", &RoleName::user());
    let orders = store.find_resource(&ResourceName::orders()).unwrap();
    let shops = store.find_resource(&ResourceName::shops()).unwrap();
    store
        .create_object(NewObject::new("order-1", orders.id), alice)
        .unwrap();
    store
        .create_object(NewObject::new("shop-1", shops.id), alice)
        .unwrap();

    let removed = store.delete_resource(orders.id).unwrap();
    assert_eq!(removed.objects, 1);
    assert_eq!(removed.rules, 3);
    assert_eq!(store.list_objects(None).unwrap().len(), 1);
}

#[test]
fn deleting_user_cascades_owned_objects() {
    let store = seeded();
    let alice = user_with_role(&store, "alice", &RoleName::user());
    let bob = user_with_role(&store, "bob", &RoleName::user());
    let orders = store.find_resource(&ResourceName::orders()).unwrap();
    store
        .create_object(NewObject::new("a", orders.id), alice)
        .unwrap();
    store
        .create_object(NewObject::new("b", orders.id), bob)
        .unwrap();

    assert_eq!(store.delete_user(alice).unwrap(), 1);
    let remaining = store.list_objects(Some(orders.id)).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].owner, bob);
}

// ============================================================================
// Objects
// ============================================================================

#[test]
fn object_owner_and_resource_are_fixed() {
    let store = seeded();
    let alice = user_with_role(&store, "alice", &RoleName::user());
    let orders = store.find_resource(&ResourceName::orders()).unwrap();
    let object = store
        .create_object(NewObject::new("order-1", orders.id).with_description("two items"), alice)
        .unwrap();

    let patch = ObjectPatch {
        description: Some("three items".to_string()),
        ..ObjectPatch::default()
    };
    let updated = store.update_object(object.id, patch).unwrap();
    assert_eq!(updated.description, "three items");
    assert_eq!(updated.owner, alice);
    assert_eq!(updated.resource, orders.id);

    let (_, resource) = store.object_with_resource(object.id).unwrap();
    assert_eq!(resource, ResourceName::orders());
}

#[test]
fn unknown_object_is_not_found() {
    let store = seeded();
    let err = store.owner_of(ObjectId::new(404)).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "object", .. }));
}

// ============================================================================
// Principals and credentials
// ============================================================================

#[test]
fn principal_resolves_role_name() {
    let store = seeded();
    let alice = user_with_role(&store, "alice", &RoleName::manager());
    let bob = store
        .create_user(NewUser::new("bob", "bob@example.com"))
        .unwrap()
        .id;

    assert_eq!(store.principal(alice).unwrap().role, Some(RoleName::manager()));
    assert_eq!(store.principal(bob).unwrap().role, None);
}

#[test]
fn deactivation_flips_flag_and_bumps_generation() {
    let store = seeded();
    let alice = user_with_role(&store, "alice", &RoleName::user());
    let before = store.get_user(alice).unwrap().credential_generation;

    let user = store.deactivate_user(alice).unwrap();
    assert!(!user.active);
    assert_eq!(user.credential_generation, before + 1);
    assert!(!store.principal(alice).unwrap().active);
}

#[test]
fn token_revocation_is_idempotent() {
    let store = Store::new();
    assert!(!store.is_token_revoked("jti-1").unwrap());
    assert!(store.revoke_token("jti-1", 1_000, 10).unwrap());
    assert!(!store.revoke_token("jti-1", 1_000, 20).unwrap());
    assert!(store.is_token_revoked("jti-1").unwrap());
}

#[test]
fn expired_revocations_are_pruned() {
    let store = Store::new();
    store.revoke_token("old", 100, 50).unwrap();
    store.revoke_token("edge", 200, 50).unwrap();
    assert_eq!(store.revoked_count().unwrap(), 2);

    store.revoke_token("new", 1_000, 200).unwrap();

    assert!(!store.is_token_revoked("old").unwrap());
    assert!(!store.is_token_revoked("edge").unwrap());
    assert!(store.is_token_revoked("new").unwrap());
    assert_eq!(store.revoked_count().unwrap(), 1);
}

#[test]
fn repeated_revocation_keeps_later_expiry() {
    let store = Store::new();
    store.revoke_token("sid", 500, 0).unwrap();
    store.revoke_token("sid", 100, 0).unwrap();

    store.revoke_token("other", 1_000, 300).unwrap();
    assert!(store.is_token_revoked("sid").unwrap());
}

// ============================================================================
// Rule source
// ============================================================================

#[test]
fn store_serves_rules_to_engine() {
    let store = seeded();
    let alice = user_with_role(&store, "alice", &RoleName::manager());
    let principal = store.principal(alice).unwrap();
    let engine = AuthorizationEngine::new(&store);

    let decision = engine
        .decide(Some(&principal), Action::List, Some(&ResourceName::orders()), None)
        .unwrap();
    assert_eq!(decision, Decision::Allow);

    let custom = ResourceName::new("invoices").unwrap();
    assert!(store.rule_flags(&RoleName::manager(), &custom).is_none());
}

#[test]
fn rule_update_is_visible_to_next_decision() {
    let store = seeded();
    let alice = user_with_role(&store, "alice", &RoleName::user());
    let principal = store.principal(alice).unwrap();
    let user_role = store.find_role(&RoleName::user()).unwrap();
    let orders = store.find_resource(&ResourceName::orders()).unwrap();
    let rule = store.rule_for(user_role.id, orders.id).unwrap().unwrap();

    let engine = AuthorizationEngine::new(&store);
    assert!(!engine.is_permitted(Some(&principal), Action::List, Some(&orders.name), None));

    let patch = FlagsPatch {
        read_all: Some(true),
        ..FlagsPatch::default()
    };
    store.update_rule(rule.id, &patch).unwrap();
    assert!(engine.is_permitted(Some(&principal), Action::List, Some(&orders.name), None));
}

// ============================================================================
// Snapshots
// ============================================================================

#[test]
fn snapshot_round_trip_preserves_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("store.json");

    let store = seeded();
    let alice = user_with_role(&store, "alice", &RoleName::user());
    let orders = store.find_resource(&ResourceName::orders()).unwrap();
    store
        .create_object(NewObject::new("order-1", orders.id), alice)
        .unwrap();
    store.revoke_token("jti-9", u64::MAX, 0).unwrap();
    store.save(&path).unwrap();

    let restored = Store::load(&path).unwrap();
    assert_eq!(restored.list_rules().unwrap(), store.list_rules().unwrap());
    assert_eq!(restored.get_user(alice).unwrap(), store.get_user(alice).unwrap());
    assert!(restored.is_token_revoked("jti-9").unwrap());

    // Id counters survive, so new ids never collide with restored ones.
    let bob = user_with_role(&restored, "bob", &RoleName::user());
    assert_ne!(bob, alice);
}

#[test]
fn loading_missing_snapshot_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = Store::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, StoreError::Io(_)));
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn concurrent_user_creation_assigns_unique_ids() {
    let store = Arc::new(Store::new());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                store
                    .create_user(NewUser::new(format!("u{i}"), format!("u{i}@example.com")))
                    .unwrap()
                    .id
            })
        })
        .collect();

    let mut ids: Vec<UserId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8);
}

proptest! {
    /// Property: whatever rules get created, each (role, resource) pair holds at most one.
    #[test]
    fn prop_at_most_one_rule_per_pair(pairs in prop::collection::vec((0usize..3, 0usize..3), 0..20)) {
        let store = Store::new();
        let seed = Seed { rules: Vec::new(), ..Seed::standard() };
        store.seed(&seed).unwrap();
        let roles = store.list_roles().unwrap();
        let resources = store.list_resources().unwrap();

        for (role, resource) in pairs {
            let _ = store.create_rule(roles[role].id, resources[resource].id, AccessFlags::none());
        }

        let rules = store.list_rules().unwrap();
        let mut seen = std::collections::HashSet::new();
        for rule in &rules {
            prop_assert!(seen.insert((rule.role, rule.resource)));
        }
    }
}

#[test]
fn snapshot_with_duplicate_rule_pair_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");
    seeded().save(&path).unwrap();

    let mut snapshot: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let rules = snapshot["rules"].as_array_mut().unwrap();
    let mut duplicate = rules[0].clone();
    duplicate["id"] = serde_json::json!(999);
    duplicate["flags"]["read_all"] = serde_json::json!(true);
    rules.insert(0, duplicate);
    std::fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();

    let err = Store::load(&path).unwrap_err();
    assert!(matches!(err, StoreError::Format(_)));
}
