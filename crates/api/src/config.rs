//! Startup configuration read from the environment.

use anyhow::bail;

pub const SIGNING_KEY_VAR: &str = "LEXICON_AUTH_SIGNING_KEY";
pub const ISSUER_VAR: &str = "LEXICON_AUTH_ISSUER_NAME";
pub const BIND_ADDR_VAR: &str = "LEXICON_API_HOST_PORT";

pub const DEFAULT_ISSUER: &str = "lexicon-default";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Clone)]
pub struct ApiConfig {
    pub signing_key: String,
    pub issuer: String,
    pub bind_addr: String,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("signing_key", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

impl ApiConfig {
    pub fn new(signing_key: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            signing_key: signing_key.into(),
            issuer: issuer.into(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    ///
    /// A missing or blank signing key is fatal; other values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let present = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let Some(signing_key) = present(SIGNING_KEY_VAR) else {
            bail!("{SIGNING_KEY_VAR} must be set to a non-empty value");
        };

        let issuer = present(ISSUER_VAR).unwrap_or_else(|| {
            tracing::warn!("{ISSUER_VAR} not set; using '{DEFAULT_ISSUER}'");
            DEFAULT_ISSUER.to_string()
        });

        let bind_addr = present(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Ok(Self {
            signing_key,
            issuer,
            bind_addr,
        })
    }
}
