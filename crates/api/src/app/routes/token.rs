//! Credential exchange and token introspection.
//!
//! Both endpoints take form-encoded bodies and sit outside the bearer layer.

use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{Extension, rejection::FormRejection},
    http::header,
    response::{IntoResponse, Response},
    routing::post,
};

use lexicon_auth::TokenRequest;

use crate::app::dto::IntrospectRequest;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/auth/token", post(issue_token))
        .route("/auth/introspect", post(introspect))
}

/// POST /auth/token - exchange credentials for a bearer token
pub async fn issue_token(
    Extension(services): Extension<Arc<AppServices>>,
    form: Result<Form<TokenRequest>, FormRejection>,
) -> Result<Response, ApiError> {
    let Form(request) = form?;
    let issued = services.authenticator.issue_token(&request).await?;

    Ok((
        [(header::CACHE_CONTROL, "no-store"), (header::PRAGMA, "no-cache")],
        Json(issued),
    )
        .into_response())
}

/// POST /auth/introspect - report whether a token is live, with its claims
pub async fn introspect(
    Extension(services): Extension<Arc<AppServices>>,
    form: Result<Form<IntrospectRequest>, FormRejection>,
) -> Result<Response, ApiError> {
    let Form(request) = form?;
    let token = request
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("token is required".to_string()))?;

    let status = services.authenticator.introspect(&token);
    Ok(([(header::CACHE_CONTROL, "no-store")], Json(status)).into_response())
}
