//! Authentication pipeline: credential grants in, signed tokens out; bearer
//! tokens in, verified subjects out.
//!
//! Every credential failure collapses into the same `Unauthorized` so callers
//! cannot probe which emails or client ids exist.

use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use lexicon_core::ClientId;

use crate::codec::{Introspection, TokenCodec, default_token_ttl};
use crate::password::{dummy_hash, verify_password};
use crate::store::{CredentialStore, StoreError};
use crate::{AuthError, Subject};

/// Credential exchange method selected by `grant_type`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GrantType {
    Password,
    ClientCredentials,
}

impl GrantType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "password" => Some(GrantType::Password),
            "client_credentials" => Some(GrantType::ClientCredentials),
            _ => None,
        }
    }
}

/// Form fields accepted by the token endpoint.
#[derive(Clone, Default, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub grant_type: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
}

impl core::fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenRequest")
            .field("grant_type", &self.grant_type)
            .field("username", &self.username)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// Successful token response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

pub struct Authenticator {
    codec: Arc<TokenCodec>,
    credentials: Arc<dyn CredentialStore>,
    ttl: Duration,
}

impl Authenticator {
    pub fn new(codec: Arc<TokenCodec>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            codec,
            credentials,
            ttl: default_token_ttl(),
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Dispatch on `grant_type` and exchange credentials for a token.
    ///
    /// Field validation happens before the credential store is touched.
    pub async fn issue_token(&self, request: &TokenRequest) -> Result<IssuedToken, AuthError> {
        let grant = request
            .grant_type
            .as_deref()
            .and_then(GrantType::parse)
            .ok_or_else(|| AuthError::bad_request("unsupported grant_type"))?;

        match grant {
            GrantType::Password => {
                let (username, password) = required_pair(&request.username, &request.password)
                    .ok_or_else(|| AuthError::unprocessable("username and password are required"))?;
                self.password_grant(username, password).await
            }
            GrantType::ClientCredentials => {
                let (client_id, secret) = required_pair(&request.client_id, &request.client_secret)
                    .ok_or_else(|| AuthError::unprocessable("client_id and client_secret are required"))?;
                self.client_credentials_grant(client_id, secret).await
            }
        }
    }

    pub async fn password_grant(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let user = match self.credentials.get_user_by_email(email).await {
            Ok(user) => Some(user),
            Err(StoreError::NotFound) => None,
            Err(StoreError::Unavailable(e)) => {
                return Err(AuthError::internal(format!("credential store: {e}")));
            }
        };

        let hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| dummy_hash().to_string());
        let password = password.to_string();
        let matches = tokio::task::spawn_blocking(move || verify_password(&hash, &password))
            .await
            .map_err(|e| AuthError::internal(format!("password verification task: {e}")))?;

        let user = match user {
            Some(user) if matches => user,
            _ => {
                tracing::debug!(grant = "password", "credential verification failed");
                return Err(AuthError::Unauthorized);
            }
        };

        tracing::info!(subject_id = %user.id, grant = "password", "token issued");
        self.mint(&Subject::user(&user.id))
    }

    pub async fn client_credentials_grant(&self, client_id: &str, secret: &str) -> Result<IssuedToken, AuthError> {
        let client = match self
            .credentials
            .find_client_by_id(&ClientId::from_raw(client_id))
            .await
        {
            Ok(client) => client,
            Err(StoreError::NotFound) => {
                tracing::debug!(grant = "client_credentials", "unknown client");
                return Err(AuthError::Unauthorized);
            }
            Err(StoreError::Unavailable(e)) => {
                return Err(AuthError::internal(format!("credential store: {e}")));
            }
        };

        if client.secret != secret {
            tracing::debug!(grant = "client_credentials", client_id = %client.client_id, "secret mismatch");
            return Err(AuthError::Unauthorized);
        }

        tracing::info!(subject_id = %client.client_id, grant = "client_credentials", "token issued");
        self.mint(&Subject::client(&client.client_id))
    }

    /// Verify an `Authorization` header value and return the subject it names.
    pub fn authenticate_bearer(&self, header: Option<&str>) -> Result<Subject, AuthError> {
        let token = header.and_then(extract_bearer).ok_or(AuthError::Unauthorized)?;
        let verified = self.codec.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "bearer token rejected");
            AuthError::from(e)
        })?;
        Ok(verified.subject)
    }

    pub fn introspect(&self, token: &str) -> Introspection {
        self.codec.introspect(token)
    }

    fn mint(&self, subject: &Subject) -> Result<IssuedToken, AuthError> {
        let access_token = self.codec.issue(subject, self.ttl)?;
        Ok(IssuedToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.ttl.num_seconds(),
        })
    }
}

/// Extract the token from `Bearer <token>`; the scheme is case-insensitive.
pub fn extract_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn required_pair<'a>(a: &'a Option<String>, b: &'a Option<String>) -> Option<(&'a str, &'a str)> {
    match (a.as_deref(), b.as_deref()) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => Some((a, b)),
        _ => None,
    }
}
