//! Session credentials: issue, verify, refresh, revoke.

use std::sync::Arc;

use tollgate_rbac::Principal;
use tollgate_store::{Store, StoreError, User};
use tollgate_types::UserId;
use tracing::{info, warn};

use crate::error::{AuthError, AuthResult};
use crate::jwt::{Claims, JwtConfig, TokenKind, TokenPair, unix_now};

/// Issues and verifies JWT credentials against the store.
///
/// Every verification re-reads the subject from the store, so deactivation,
/// role changes and revocations take effect on the next request.
pub struct SessionService {
    config: JwtConfig,
    store: Arc<Store>,
}

impl SessionService {
    pub fn new(config: JwtConfig, store: Arc<Store>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Issues a fresh token pair for a user.
    ///
    /// The caller is responsible for having verified the user's password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AuthenticationFailure`] if the user is unknown or
    /// deactivated.
    pub fn issue(&self, user_id: UserId) -> AuthResult<TokenPair> {
        let user = self.active_user(user_id)?;
        let session = uuid::Uuid::new_v4().to_string();

        let access = self.sign(&user, &session, TokenKind::Access)?;
        let refresh = self.sign(&user, &session, TokenKind::Refresh)?;

        info!(user = %user.id, session = %session, "session opened");
        Ok(TokenPair { access, refresh })
    }

    /// Verifies an access token and resolves its principal.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredential`] for malformed, expired,
    /// revoked, superseded or wrong-kind tokens, and
    /// [`AuthError::AuthenticationFailure`] if the subject is deactivated.
    pub fn verify(&self, token: &str) -> AuthResult<Principal> {
        let (_, user) = self.validate(token, TokenKind::Access)?;
        Ok(self.store.principal(user.id)?)
    }

    /// Exchanges a refresh token for a new access token in the same session.
    pub fn refresh(&self, refresh_token: &str) -> AuthResult<String> {
        let (claims, user) = self.validate(refresh_token, TokenKind::Refresh)?;
        self.sign(&user, &claims.sid, TokenKind::Access)
    }

    /// Revokes the session a token belongs to (logout).
    ///
    /// Every token of the session, access and refresh alike, fails
    /// verification afterwards. Revoking an already revoked session succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredential`] if the token is malformed,
    /// expired, or signed with another key.
    pub fn revoke(&self, token: &str) -> AuthResult<()> {
        let claims = self.config.decode(token).inspect_err(|e| {
            warn!(error = %e, "rejected credential on revoke");
        })?;

        // Refresh is refused once revoked, so no token of this session can
        // outlive the horizon and the entry may be dropped after it.
        let now = unix_now()?;
        let horizon = self.config.session_horizon(now);
        if self.store.revoke_token(&claims.sid, horizon, now)? {
            info!(subject = %claims.sub, session = %claims.sid, "session revoked");
        }
        Ok(())
    }

    fn sign(&self, user: &User, session: &str, kind: TokenKind) -> AuthResult<String> {
        let claims = self
            .config
            .claims(user.id.as_u64(), session, kind, user.credential_generation)?;
        self.config.sign(&claims)
    }

    fn active_user(&self, user_id: UserId) -> AuthResult<User> {
        let user = match self.store.get_user(user_id) {
            Ok(user) => user,
            Err(StoreError::NotFound { .. }) => {
                return Err(AuthError::AuthenticationFailure(format!(
                    "unknown user {user_id}"
                )));
            }
            Err(e) => return Err(e.into()),
        };

        if !user.active {
            warn!(user = %user_id, "inactive user refused credentials");
            return Err(AuthError::AuthenticationFailure(format!(
                "user {user_id} is inactive"
            )));
        }
        Ok(user)
    }

    fn validate(&self, token: &str, expected: TokenKind) -> AuthResult<(Claims, User)> {
        let result = self.check(token, expected);
        if let Err(e) = &result {
            warn!(error = %e, kind = ?expected, "rejected credential");
        }
        result
    }

    fn check(&self, token: &str, expected: TokenKind) -> AuthResult<(Claims, User)> {
        let claims = self.config.decode(token)?;

        if claims.kind != expected {
            return Err(AuthError::invalid(format!(
                "expected {expected:?} token, got {:?}",
                claims.kind
            )));
        }
        if self.store.is_token_revoked(&claims.sid)? {
            return Err(AuthError::invalid("session has been revoked"));
        }

        let user_id = claims
            .sub
            .parse::<u64>()
            .map(UserId::new)
            .map_err(|_| AuthError::invalid("malformed subject"))?;
        let user = match self.store.get_user(user_id) {
            Ok(user) => user,
            Err(StoreError::NotFound { .. }) => {
                return Err(AuthError::invalid("unknown subject"));
            }
            Err(e) => return Err(e.into()),
        };

        if !user.active {
            return Err(AuthError::AuthenticationFailure(format!(
                "user {user_id} is inactive"
            )));
        }
        if claims.generation != user.credential_generation {
            return Err(AuthError::invalid("credential has been superseded"));
        }

        Ok((claims, user))
    }
}
