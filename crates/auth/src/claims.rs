use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{Subject, SubjectId, SubjectKind};

/// Signed identity assertion carried by a bearer token.
///
/// Known fields are typed; anything else found in a decoded token lands in
/// `extra` so introspection can pass it through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject identifier (user id or client id).
    pub sub: SubjectId,

    /// Subject kind.
    #[serde(rename = "subType")]
    pub sub_type: SubjectKind,

    /// Issuer name configured for this deployment.
    pub iss: String,

    /// Issued-at timestamp (seconds precision on the wire).
    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    /// Expiration timestamp (seconds precision on the wire).
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,

    /// Unrecognized claims.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenClaims {
    pub fn subject(&self) -> Subject {
        Subject {
            id: self.sub.clone(),
            kind: self.sub_type,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimsValidationError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate the time window of decoded claims.
///
/// Signature verification happens before this is ever called.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), ClaimsValidationError> {
    if claims.exp <= claims.iat {
        return Err(ClaimsValidationError::InvalidTimeWindow);
    }
    if now >= claims.exp {
        return Err(ClaimsValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(iat: DateTime<Utc>, exp: DateTime<Utc>) -> TokenClaims {
        TokenClaims {
            sub: SubjectId::new("u1"),
            sub_type: SubjectKind::User,
            iss: "test".into(),
            iat,
            exp,
            extra: Map::new(),
        }
    }

    #[test]
    fn live_window_is_valid() {
        let now = Utc::now();
        let c = claims(now - Duration::minutes(1), now + Duration::minutes(1));
        assert_eq!(validate_claims(&c, now), Ok(()));
    }

    #[test]
    fn expiry_is_exclusive() {
        let now = Utc::now();
        let c = claims(now - Duration::minutes(1), now);
        assert_eq!(validate_claims(&c, now), Err(ClaimsValidationError::Expired));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        let c = claims(now, now);
        assert_eq!(validate_claims(&c, now), Err(ClaimsValidationError::InvalidTimeWindow));
    }

    #[test]
    fn unknown_fields_are_kept_aside() {
        let json = serde_json::json!({
            "sub": "c1",
            "subType": "client",
            "iss": "lexicon",
            "iat": 1_700_000_000,
            "exp": 1_700_086_400,
            "scope": "export",
        });
        let c: TokenClaims = serde_json::from_value(json).unwrap();
        assert_eq!(c.sub_type, SubjectKind::Client);
        assert_eq!(c.extra.get("scope"), Some(&Value::from("export")));
        assert_eq!((c.exp - c.iat).num_hours(), 24);
    }
}
