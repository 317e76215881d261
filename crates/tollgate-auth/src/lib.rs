//! # tollgate-auth: Session credentials for `Tollgate`
//!
//! Issues and verifies JWT access/refresh token pairs (HS256, issuer and
//! audience checked). Verification resolves the token's subject against the
//! store on every call and returns the [`Principal`](tollgate_rbac::Principal)
//! the decision engine consumes.
//!
//! A credential is rejected when:
//! - it is malformed, expired, or signed for another issuer or audience
//! - its session was revoked (logout)
//! - its subject was deactivated after issue (credential generation bumped)
//! - it is the wrong kind (a refresh token presented as an access token)

mod error;
mod jwt;
mod session;

pub use error::{AuthError, AuthResult};
pub use jwt::{Claims, JwtConfig, TokenKind, TokenPair};
pub use session::SessionService;
