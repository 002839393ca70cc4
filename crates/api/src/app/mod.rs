//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: shared collaborators built once at startup
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use lexicon_auth::TokenError;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &ApiConfig) -> Result<Router, TokenError> {
    let services = Arc::new(services::build_services(config)?);
    Ok(router(services))
}

/// Router over already built services.
pub fn router(services: Arc<services::AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        authenticator: services.authenticator.clone(),
    };

    // Protected routes: require a verified bearer token.
    let protected = routes::protected(&services.gate).layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    let json_api = routes::public()
        .merge(protected)
        .layer(axum::middleware::from_fn(middleware::enforce_json_content_type));

    Router::new()
        .nest("/api/v1", json_api.merge(routes::token::router()))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::hsts))
                .layer(Extension(services)),
        )
}
