//! Token configuration, claims, and signing.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// JWT configuration.
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing/verifying tokens.
    secret: String,
    /// Lifetime of access tokens.
    pub access_ttl: Duration,
    /// Lifetime of refresh tokens.
    pub refresh_ttl: Duration,
    /// Issuer claim.
    pub issuer: String,
    /// Audience claims.
    pub audience: Vec<String>,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl JwtConfig {
    /// Creates a new JWT configuration.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl: Duration::from_secs(15 * 60),
            refresh_ttl: Duration::from_secs(24 * 60 * 60),
            issuer: "tollgate".to_string(),
            audience: vec!["tollgate".to_string()],
        }
    }

    #[must_use]
    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Replaces the audience claims.
    #[must_use]
    pub fn with_audience(mut self, audience: Vec<String>) -> Self {
        self.audience = audience;
        self
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Builds claims for a new token, stamped with the current time.
    pub(crate) fn claims(
        &self,
        subject: u64,
        session: &str,
        kind: TokenKind,
        generation: u64,
    ) -> AuthResult<Claims> {
        let now = unix_now()?;

        Ok(Claims {
            sub: subject.to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
            sid: session.to_string(),
            kind,
            generation,
            iat: now,
            exp: now + self.ttl(kind).as_secs(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        })
    }

    /// Latest instant any token of a session stopped at `now` can expire.
    pub(crate) fn session_horizon(&self, now: u64) -> u64 {
        now + self.access_ttl.max(self.refresh_ttl).as_secs()
    }

    pub(crate) fn sign(&self, claims: &Claims) -> AuthResult<String> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Checks signature, issuer, audience and expiry. No leeway is granted.
    pub(crate) fn decode(&self, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&self.audience);
        validation.leeway = 0;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| AuthError::invalid(format!("invalid JWT: {e}")))
    }
}

/// Which half of a token pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Presented on every request.
    Access,
    /// Exchanged for new access tokens, and presented on logout.
    Refresh,
}

/// JWT claims structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,
    /// Token ID, unique per token.
    pub jti: String,
    /// Session ID, shared by every token descended from one login.
    pub sid: String,
    /// Token kind.
    pub kind: TokenKind,
    /// Credential generation of the subject at issue time.
    pub generation: u64,
    /// Issued at timestamp (seconds since epoch).
    pub iat: u64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: u64,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: Vec<String>,
}

/// Access and refresh token issued together on login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Seconds since the Unix epoch.
pub(crate) fn unix_now() -> AuthResult<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AuthError::Clock(e.to_string()))?
        .as_secs())
}
