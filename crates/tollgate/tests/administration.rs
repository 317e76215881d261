//! Users, roles and access rules through the service.

use test_case::test_case;
use tollgate::{
    AccessFlags, FlagsPatch, JwtConfig, Principal, Registration, ResourceName, RoleName, RuleId,
    Seed, Tollgate, TollgateError, UserPatch,
};

fn setup() -> (Tollgate, Principal) {
    let tollgate = Tollgate::with_seed(&Seed::standard(), JwtConfig::new("integration-secret")).unwrap();
    let root = tollgate
        .register_user(Registration::new("root", "root@example.com"))
        .unwrap();
    let admin_role = tollgate.store().find_role(&RoleName::admin()).unwrap();
    tollgate.store().set_role(root.id, Some(admin_role.id)).unwrap();
    let admin = tollgate.store().principal(root.id).unwrap();
    (tollgate, admin)
}

fn register(tollgate: &Tollgate, name: &str) -> Principal {
    let user = tollgate
        .register_user(Registration::new(name, format!("{name}@example.com")))
        .unwrap();
    tollgate.store().principal(user.id).unwrap()
}

#[test]
fn registration_assigns_default_role() {
    let (tollgate, _) = setup();
    let alice = register(&tollgate, "alice");
    assert_eq!(alice.role, Some(RoleName::user()));
    assert!(alice.active);
}

#[test]
fn registration_conflicts_are_reported() {
    let (tollgate, _) = setup();
    register(&tollgate, "alice");

    let err = tollgate
        .register_user(Registration::new("alice", "other@example.com"))
        .unwrap_err();
    assert!(matches!(err, TollgateError::Conflict(_)));

    let err = tollgate
        .register_user(Registration::new("", "blank@example.com"))
        .unwrap_err();
    assert!(matches!(err, TollgateError::Validation(_)));
}

#[test]
fn registration_without_user_role_leaves_role_empty() {
    let seed = Seed {
        roles: vec![RoleName::admin()],
        ..Seed::empty()
    };
    let tollgate = Tollgate::with_seed(&seed, JwtConfig::new("s")).unwrap();
    let user = tollgate
        .register_user(Registration::new("alice", "alice@example.com"))
        .unwrap();
    assert_eq!(user.role, None);
}

#[test]
fn only_admins_list_users() {
    let (tollgate, admin) = setup();
    let alice = register(&tollgate, "alice");

    assert_eq!(tollgate.list_users(Some(&admin)).unwrap().len(), 2);
    assert!(matches!(
        tollgate.list_users(Some(&alice)),
        Err(TollgateError::Forbidden)
    ));
}

#[test]
fn self_or_admin_gates_profiles() {
    let (tollgate, admin) = setup();
    let alice = register(&tollgate, "alice");
    let bob = register(&tollgate, "bob");

    assert!(tollgate.get_user(Some(&alice), alice.id).is_ok());
    assert!(tollgate.get_user(Some(&admin), alice.id).is_ok());
    assert!(matches!(
        tollgate.get_user(Some(&bob), alice.id),
        Err(TollgateError::Forbidden)
    ));

    let patch = UserPatch {
        first_name: Some("Alice".to_string()),
        ..UserPatch::default()
    };
    let updated = tollgate.update_user(Some(&alice), alice.id, patch).unwrap();
    assert_eq!(updated.first_name, "Alice");
}

#[test]
fn null_role_passes_self_check_only() {
    let (tollgate, admin) = setup();
    let alice = register(&tollgate, "alice");
    let bob = register(&tollgate, "bob");
    tollgate.assign_role(Some(&admin), alice.id, None).unwrap();
    let alice = tollgate.store().principal(alice.id).unwrap();

    assert!(tollgate.get_user(Some(&alice), alice.id).is_ok());
    assert!(matches!(
        tollgate.get_user(Some(&alice), bob.id),
        Err(TollgateError::Forbidden)
    ));
}

#[test]
fn only_admins_assign_roles() {
    let (tollgate, admin) = setup();
    let alice = register(&tollgate, "alice");

    assert!(matches!(
        tollgate.assign_role(Some(&alice), alice.id, Some(&RoleName::admin())),
        Err(TollgateError::Forbidden)
    ));

    let user = tollgate
        .assign_role(Some(&admin), alice.id, Some(&RoleName::manager()))
        .unwrap();
    let manager = tollgate.store().find_role(&RoleName::manager()).unwrap();
    assert_eq!(user.role, Some(manager.id));

    let ghost = RoleName::new("Ghost").unwrap();
    assert!(matches!(
        tollgate.assign_role(Some(&admin), alice.id, Some(&ghost)),
        Err(TollgateError::NotFound { entity: "role", .. })
    ));
}

#[test]
fn deactivated_admin_loses_admin_rights() {
    let (tollgate, admin) = setup();
    tollgate.deactivate_user(Some(&admin), admin.id).unwrap();
    let admin = tollgate.store().principal(admin.id).unwrap();

    assert!(matches!(
        tollgate.list_rules(Some(&admin)),
        Err(TollgateError::AuthenticationFailure(_))
    ));
}

#[test]
fn rule_lifecycle() {
    let (tollgate, admin) = setup();
    let invoices = ResourceName::new("invoices").unwrap();
    tollgate
        .store()
        .create_resource(invoices.clone(), "Billing")
        .unwrap();

    let rule = tollgate
        .create_rule(Some(&admin), &RoleName::manager(), &invoices, AccessFlags::default())
        .unwrap();
    assert_eq!(rule.flags, AccessFlags::owned_only());

    let dup = tollgate.create_rule(Some(&admin), &RoleName::manager(), &invoices, AccessFlags::none());
    assert!(matches!(dup, Err(TollgateError::Conflict(_))));

    let patch = FlagsPatch {
        delete_all: Some(true),
        ..FlagsPatch::default()
    };
    let updated = tollgate.update_rule(Some(&admin), rule.id, &patch).unwrap();
    assert!(updated.flags.delete_all);
    assert!(updated.flags.read_owned);
    assert_eq!(updated.role, rule.role);
    assert_eq!(updated.resource, rule.resource);

    tollgate.delete_rule(Some(&admin), rule.id).unwrap();
    assert!(matches!(
        tollgate.get_rule(Some(&admin), rule.id),
        Err(TollgateError::NotFound { .. })
    ));
}

#[test_case("list"; "list")]
#[test_case("get"; "get")]
#[test_case("update"; "update")]
#[test_case("delete"; "delete")]
fn rule_management_is_admin_only(operation: &str) {
    let (tollgate, _) = setup();
    let manager = register(&tollgate, "mara");
    let id = RuleId::new(1);

    let result = match operation {
        "list" => tollgate.list_rules(Some(&manager)).map(|_| ()),
        "get" => tollgate.get_rule(Some(&manager), id).map(|_| ()),
        "update" => tollgate
            .update_rule(Some(&manager), id, &FlagsPatch::default())
            .map(|_| ()),
        _ => tollgate.delete_rule(Some(&manager), id),
    };
    assert!(matches!(result, Err(TollgateError::Forbidden)));
}

#[test]
fn roles_and_resources_are_listed_to_any_active_user() {
    let (tollgate, _) = setup();
    let alice = register(&tollgate, "alice");

    assert_eq!(tollgate.list_roles(Some(&alice)).unwrap().len(), 3);
    assert_eq!(tollgate.list_resources(Some(&alice)).unwrap().len(), 3);
    assert!(tollgate.list_roles(None).is_err());
}
