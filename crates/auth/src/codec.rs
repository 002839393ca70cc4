//! HS256 token codec: mint, verify and introspect signed identity assertions.
//!
//! The signing key is loaded once at startup and never changes afterwards, so a
//! single `TokenCodec` is shared by every request without synchronization.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use serde_json::Map;

use crate::claims::{ClaimsValidationError, TokenClaims, validate_claims};
use crate::{Subject, TokenError};

/// Lifetime of every issued token, in seconds (24 hours).
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Lifetime of every issued token. Fixed at issuance; tokens are never revoked.
pub fn default_token_ttl() -> Duration {
    Duration::seconds(DEFAULT_TOKEN_TTL_SECS)
}

/// Identity recovered from a successfully verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject: Subject,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Token status as reported by the introspection endpoint.
///
/// `claims` is absent when the token could not be decoded or its signature did
/// not verify; in that case nothing about the token is trustworthy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Introspection {
    #[serde(flatten)]
    pub claims: Option<TokenClaims>,
    pub active: bool,
}

pub struct TokenCodec {
    issuer: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Build a codec from the process-wide signing key.
    ///
    /// An empty key is a configuration error.
    pub fn new(signing_key: impl AsRef<[u8]>, issuer: impl Into<String>) -> Result<Self, TokenError> {
        let key = signing_key.as_ref();
        if key.is_empty() {
            return Err(TokenError::Signing("signing key is empty".to_string()));
        }

        // Expiry is checked by `validate_claims` after the signature, with no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;

        Ok(Self {
            issuer: issuer.into(),
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn issue(&self, subject: &Subject, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(subject, ttl, Utc::now())
    }

    /// Mint a token with `iat = now` and `exp = now + ttl`.
    ///
    /// `now` is truncated to whole seconds so the wire timestamps and the
    /// returned window agree exactly.
    pub fn issue_at(&self, subject: &Subject, ttl: Duration, now: DateTime<Utc>) -> Result<String, TokenError> {
        let now = now.trunc_subsecs(0);
        let claims = TokenClaims {
            sub: subject.id.clone(),
            sub_type: subject.kind,
            iss: self.issuer.clone(),
            iat: now,
            exp: now + ttl,
            extra: Map::new(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature first, then the time window.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<VerifiedToken, TokenError> {
        let claims = self.decode(token)?;

        validate_claims(&claims, now).map_err(|e| match e {
            ClaimsValidationError::Expired | ClaimsValidationError::InvalidTimeWindow => TokenError::Expired,
        })?;

        Ok(VerifiedToken {
            subject: claims.subject(),
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }

    pub fn introspect(&self, token: &str) -> Introspection {
        self.introspect_at(token, Utc::now())
    }

    /// Report claims and liveness without failing hard.
    pub fn introspect_at(&self, token: &str, now: DateTime<Utc>) -> Introspection {
        match self.decode(token) {
            Ok(claims) => {
                let active = validate_claims(&claims, now).is_ok();
                Introspection {
                    claims: Some(claims),
                    active,
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "introspected token did not decode");
                Introspection {
                    claims: None,
                    active: false,
                }
            }
        }
    }

    fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        jsonwebtoken::decode::<TokenClaims>(token.trim(), &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })
    }
}
