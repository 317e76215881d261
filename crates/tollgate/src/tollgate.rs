//! Main entry point for the Tollgate service.
//!
//! The `Tollgate` struct owns the store and the session service, and runs
//! every request through the decision engine with an explicit principal.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tollgate_auth::{JwtConfig, SessionService, TokenPair};
use tollgate_config::TollgateConfig;
use tollgate_rbac::{Action, AuthorizationEngine, Decision, Principal, Role, is_administrator};
use tollgate_store::{BusinessResource, Seed, Store};
use tollgate_types::{ResourceName, UserId};
use tracing::{info, warn};

use crate::error::{Result, TollgateError};

/// Role-based access control service over business objects.
///
/// Cheap to share: wrap it in an `Arc` and call it from any thread. Every
/// operation reads the current rules, so matrix changes apply to the next
/// request.
pub struct Tollgate {
    pub(crate) store: Arc<Store>,
    sessions: SessionService,
    snapshot: Option<PathBuf>,
}

impl Tollgate {
    /// Creates a service over an existing store.
    pub fn new(store: Arc<Store>, jwt: JwtConfig) -> Self {
        let sessions = SessionService::new(jwt, Arc::clone(&store));
        Self {
            store,
            sessions,
            snapshot: None,
        }
    }

    /// Creates a service over a fresh store seeded with `seed`.
    pub fn with_seed(seed: &Seed, jwt: JwtConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(Store::seeded(seed)?), jwt))
    }

    /// Opens the service described by `config`.
    ///
    /// Loads the configured snapshot if it exists, applies the configured
    /// seed on top, and remembers the snapshot path for [`Tollgate::persist`].
    pub fn from_config(config: &TollgateConfig) -> Result<Self> {
        config.validate()?;

        let path = &config.storage.snapshot;
        let store = if path.exists() {
            Store::load(path)?
        } else {
            Store::new()
        };
        store.seed(&config.effective_seed())?;

        let jwt = JwtConfig::new(config.auth.secret.clone())
            .with_access_ttl(config.auth.access_ttl())
            .with_refresh_ttl(config.auth.refresh_ttl())
            .with_issuer(config.auth.issuer.clone())
            .with_audience(config.auth.audience.clone());

        info!(snapshot = %path.display(), "tollgate opened");
        let mut tollgate = Self::new(Arc::new(store), jwt);
        tollgate.snapshot = Some(path.clone());
        Ok(tollgate)
    }

    /// Writes the store to the configured snapshot path, if any.
    pub fn persist(&self) -> Result<()> {
        if let Some(path) = &self.snapshot {
            self.store.save(path)?;
        }
        Ok(())
    }

    /// Writes the store to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        Ok(self.store.save(path)?)
    }

    /// The underlying store, for administrative tooling.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub(crate) fn engine(&self) -> AuthorizationEngine<&Store> {
        AuthorizationEngine::new(&*self.store)
    }

    /// Rejects requests with no principal or a deactivated one.
    pub(crate) fn require_active<'p>(&self, principal: Option<&'p Principal>) -> Result<&'p Principal> {
        match principal {
            Some(p) if p.active => Ok(p),
            Some(p) => {
                warn!(principal = %p.id, "deactivated principal rejected");
                Err(TollgateError::AuthenticationFailure(format!(
                    "user {} is inactive",
                    p.id
                )))
            }
            None => Err(TollgateError::AuthenticationFailure(
                "authentication required".to_string(),
            )),
        }
    }

    /// Rejects anyone but an active administrator.
    pub(crate) fn require_admin<'p>(&self, principal: Option<&'p Principal>) -> Result<&'p Principal> {
        let principal = self.require_active(principal)?;
        if is_administrator(Some(principal)) {
            Ok(principal)
        } else {
            warn!(principal = %principal.id, "administrator operation denied");
            Err(TollgateError::Forbidden)
        }
    }

    /// Runs the decision engine and turns anything short of a full allow
    /// into [`TollgateError::Forbidden`].
    pub(crate) fn authorize(
        &self,
        principal: &Principal,
        action: Action,
        resource: Option<&ResourceName>,
        owner: Option<UserId>,
    ) -> Result<()> {
        match self.engine().decide(Some(principal), action, resource, owner)? {
            Decision::Allow => Ok(()),
            Decision::AllowIfOwner | Decision::Deny => {
                warn!(
                    principal = %principal.id,
                    %action,
                    resource = resource.map(ResourceName::as_str),
                    "request denied"
                );
                Err(TollgateError::Forbidden)
            }
        }
    }

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------

    /// Opens a session for a user whose password was verified by the caller.
    pub fn login(&self, username: &str) -> Result<TokenPair> {
        let user = self.store.find_user(username).map_err(|_| {
            TollgateError::AuthenticationFailure(format!("unknown user {username}"))
        })?;
        Ok(self.sessions.issue(user.id)?)
    }

    /// Verifies an access token and returns the principal behind it.
    pub fn authenticate(&self, access_token: &str) -> Result<Principal> {
        Ok(self.sessions.verify(access_token)?)
    }

    /// Exchanges a refresh token for a new access token.
    pub fn refresh(&self, refresh_token: &str) -> Result<String> {
        Ok(self.sessions.refresh(refresh_token)?)
    }

    /// Ends the session a token belongs to. Idempotent.
    pub fn logout(&self, refresh_token: &str) -> Result<()> {
        Ok(self.sessions.revoke(refresh_token)?)
    }

    // ------------------------------------------------------------------
    // Roles and resources
    // ------------------------------------------------------------------

    pub fn list_roles(&self, principal: Option<&Principal>) -> Result<Vec<Role>> {
        self.require_active(principal)?;
        Ok(self.store.list_roles()?)
    }

    pub fn list_resources(&self, principal: Option<&Principal>) -> Result<Vec<BusinessResource>> {
        self.require_active(principal)?;
        Ok(self.store.list_resources()?)
    }
}
