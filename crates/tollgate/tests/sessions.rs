//! Sessions, deactivation and persistence.

use std::fs;

use tempfile::tempdir;
use tollgate::{JwtConfig, Registration, ResourceName, Seed, Tollgate, TollgateError};
use tollgate_config::ConfigLoader;

fn tollgate() -> Tollgate {
    Tollgate::with_seed(&Seed::standard(), JwtConfig::new("integration-secret")).unwrap()
}

#[test]
fn login_authenticate_refresh() {
    let tollgate = tollgate();
    let alice = tollgate
        .register_user(Registration::new("alice", "alice@example.com"))
        .unwrap();

    let tokens = tollgate.login("alice").unwrap();
    assert_eq!(tollgate.authenticate(&tokens.access).unwrap().id, alice.id);

    let access = tollgate.refresh(&tokens.refresh).unwrap();
    assert_eq!(tollgate.authenticate(&access).unwrap().id, alice.id);
}

#[test]
fn unknown_user_cannot_log_in() {
    let tollgate = tollgate();
    assert!(matches!(
        tollgate.login("ghost"),
        Err(TollgateError::AuthenticationFailure(_))
    ));
}

#[test]
fn logout_revokes_and_is_idempotent() {
    let tollgate = tollgate();
    tollgate
        .register_user(Registration::new("alice", "alice@example.com"))
        .unwrap();
    let tokens = tollgate.login("alice").unwrap();

    tollgate.logout(&tokens.refresh).unwrap();
    tollgate.logout(&tokens.refresh).unwrap();

    assert!(matches!(
        tollgate.authenticate(&tokens.access),
        Err(TollgateError::InvalidCredential(_))
    ));
    assert!(matches!(
        tollgate.refresh(&tokens.refresh),
        Err(TollgateError::InvalidCredential(_))
    ));
    assert!(matches!(
        tollgate.logout("garbage"),
        Err(TollgateError::InvalidCredential(_))
    ));
}

#[test]
fn self_deactivation_ends_everything() {
    let tollgate = tollgate();
    tollgate
        .register_user(Registration::new("alice", "alice@example.com"))
        .unwrap();
    let tokens = tollgate.login("alice").unwrap();
    let alice = tollgate.authenticate(&tokens.access).unwrap();
    let order = tollgate
        .create_object(Some(&alice), &ResourceName::orders(), "order-1", "")
        .unwrap();

    let user = tollgate.deactivate_user(Some(&alice), alice.id).unwrap();
    assert!(!user.active);

    // Every later verification fails, and so does every later decision.
    assert!(tollgate.authenticate(&tokens.access).is_err());
    assert!(tollgate.refresh(&tokens.refresh).is_err());
    assert!(tollgate.login("alice").is_err());

    let stale = tollgate.store().principal(alice.id).unwrap();
    assert!(matches!(
        tollgate.retrieve_object(Some(&stale), order.id),
        Err(TollgateError::AuthenticationFailure(_))
    ));

    // The record stays: deactivation is a soft delete.
    assert!(tollgate.store().get_user(alice.id).is_ok());
    assert!(tollgate.store().get_object(order.id).is_ok());
}

#[test]
fn from_config_requires_secret() {
    let dir = tempdir().unwrap();
    let config = ConfigLoader::new()
        .with_project_dir(dir.path())
        .with_env_prefix("TOLLGATE_TEST_UNSET")
        .without_user_config()
        .load()
        .unwrap();

    assert!(matches!(
        Tollgate::from_config(&config),
        Err(TollgateError::Config(_))
    ));
}

#[test]
fn state_survives_persist_and_reopen() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("tollgate.toml"),
        "[auth]\nsecret = \"persist-secret\"\n",
    )
    .unwrap();
    let load = || {
        ConfigLoader::new()
            .with_project_dir(dir.path())
            .with_env_prefix("TOLLGATE_TEST_UNSET")
            .without_user_config()
            .load()
            .unwrap()
    };

    let first = Tollgate::from_config(&load()).unwrap();
    first
        .register_user(Registration::new("alice", "alice@example.com"))
        .unwrap();
    let tokens = first.login("alice").unwrap();
    first.logout(&tokens.refresh).unwrap();
    first.persist().unwrap();
    assert!(dir.path().join(".tollgate/store.json").exists());

    let second = Tollgate::from_config(&load()).unwrap();
    assert!(second.store().find_user("alice").is_ok());
    assert_eq!(second.store().list_rules().unwrap().len(), 9);
    // Revocations are store state and survive a restart.
    assert!(second.authenticate(&tokens.access).is_err());
}
