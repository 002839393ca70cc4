use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, Method, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use lexicon_auth::Authenticator;

use crate::app::errors::ApiError;
use crate::context::SubjectContext;

pub const HSTS_VALUE: &str = "max-age=63072000; includeSubDomains";

#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Arc<Authenticator>,
}

/// Verify the bearer token and attach the [`SubjectContext`].
pub async fn auth_middleware(State(state): State<AuthState>, mut req: Request, next: Next) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let subject = state.authenticator.authenticate_bearer(header)?;

    req.extensions_mut().insert(SubjectContext::new(subject));
    Ok(next.run(req).await)
}

/// Reject JSON-route mutations whose non-empty body is not JSON.
pub async fn enforce_json_content_type(req: Request, next: Next) -> Response {
    if matches!(*req.method(), Method::POST | Method::PUT | Method::PATCH)
        && has_body(&req)
        && !is_json(req.headers().get(header::CONTENT_TYPE))
    {
        return ApiError::UnsupportedMediaType.into_response();
    }
    next.run(req).await
}

/// Add `Strict-Transport-Security` to every response.
pub async fn hsts(req: Request, next: Next) -> Response {
    let mut res = next.run(req).await;
    res.headers_mut()
        .insert(header::STRICT_TRANSPORT_SECURITY, HeaderValue::from_static(HSTS_VALUE));
    res
}

fn has_body(req: &Request) -> bool {
    match req.headers().get(header::CONTENT_LENGTH) {
        Some(len) => len.to_str().ok().and_then(|l| l.parse::<u64>().ok()).unwrap_or(1) > 0,
        None => req.headers().contains_key(header::TRANSFER_ENCODING),
    }
}

fn is_json(content_type: Option<&HeaderValue>) -> bool {
    let Some(value) = content_type.and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let mut parts = value.split(';').map(str::trim);
    let mime = parts.next().unwrap_or_default();
    if !mime.eq_ignore_ascii_case("application/json") {
        return false;
    }
    parts.all(|p| p.eq_ignore_ascii_case("charset=utf-8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_content_types() {
        let ok = ["application/json", "application/json; charset=utf-8", "Application/JSON"];
        for ct in ok {
            assert!(is_json(Some(&HeaderValue::from_static(ct))), "{ct}");
        }
        let bad = ["text/plain", "application/x-www-form-urlencoded", "application/json; charset=latin1"];
        for ct in bad {
            assert!(!is_json(Some(&HeaderValue::from_static(ct))), "{ct}");
        }
        assert!(!is_json(None));
    }
}
