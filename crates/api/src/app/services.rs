use std::sync::Arc;

use lexicon_auth::{AuthorizationGate, Authenticator, TokenCodec, TokenError};
use lexicon_infra::InMemoryDirectory;

use crate::config::ApiConfig;

/// Collaborators shared by every request.
pub struct AppServices {
    pub directory: Arc<InMemoryDirectory>,
    pub authenticator: Arc<Authenticator>,
    pub gate: AuthorizationGate,
}

pub fn build_services(config: &ApiConfig) -> Result<AppServices, TokenError> {
    let codec = Arc::new(TokenCodec::new(config.signing_key.as_bytes(), config.issuer.clone())?);
    let directory = Arc::new(InMemoryDirectory::new());

    let authenticator = Arc::new(Authenticator::new(codec, directory.clone()));
    let gate = AuthorizationGate::new(directory.clone(), directory.clone());

    Ok(AppServices {
        directory,
        authenticator,
        gate,
    })
}
