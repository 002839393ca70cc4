//! Error taxonomy of the authentication/authorization core.

use thiserror::Error;

use crate::Capability;

/// Failure to verify a bearer token.
///
/// `Malformed` and `InvalidSignature` are kept apart for logging only; callers
/// must treat both as "invalid token".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    /// Signing-key misconfiguration; fatal for the process, not the request.
    #[error("token signing failed: {0}")]
    Signing(String),
}

impl TokenError {
    pub fn is_invalid(&self) -> bool {
        matches!(self, TokenError::Malformed | TokenError::InvalidSignature)
    }
}

/// Request-level error returned by the authentication pipeline.
///
/// Detail strings are for server-side logs; the HTTP layer only exposes the kind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unprocessable: {0}")]
    Unprocessable(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self::Unprocessable(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<TokenError> for AuthError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Signing(msg) => AuthError::Internal(msg),
            TokenError::Malformed | TokenError::InvalidSignature | TokenError::Expired => {
                AuthError::Unauthorized
            }
        }
    }
}

/// Authorization decision failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing capability '{0}'")]
    Forbidden(Capability),

    #[error("forbidden: subjects may not edit their own membership")]
    SelfEdit,

    #[error("forbidden: payload project does not match path project")]
    ProjectMismatch,

    #[error("forbidden: only users may perform this action")]
    UserRequired,

    #[error("forbidden: users may only modify their own account")]
    NotSelf,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<AuthzError> for AuthError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::Internal(msg) => AuthError::Internal(msg),
            _ => AuthError::Forbidden,
        }
    }
}
