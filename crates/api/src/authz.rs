//! Route guard that enforces a capability on the project named in the path.
//!
//! The guard runs after the bearer middleware and before the handler, so a
//! handler behind it only executes for an authorized subject.

use std::collections::HashMap;

use axum::{
    extract::{Extension, Path, Request, State},
    middleware::{Next, from_fn_with_state},
    response::Response,
    routing::MethodRouter,
};

use lexicon_auth::{AuthorizationGate, Capability};
use lexicon_core::ProjectId;

use crate::app::errors::ApiError;
use crate::context::SubjectContext;

/// Path parameter holding the project being acted on.
pub const PROJECT_PARAM: &str = "project_id";

#[derive(Clone)]
pub struct GuardState {
    gate: AuthorizationGate,
    capability: Capability,
}

/// Wrap `route` so it only runs when the caller holds `capability` on the
/// path's project.
pub fn must_authorize(route: MethodRouter, gate: &AuthorizationGate, capability: Capability) -> MethodRouter {
    let state = GuardState {
        gate: gate.clone(),
        capability,
    };
    route.route_layer(from_fn_with_state(state, guard))
}

async fn guard(
    State(state): State<GuardState>,
    subject: Option<Extension<SubjectContext>>,
    Path(params): Path<HashMap<String, String>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(Extension(subject)) = subject else {
        return Err(ApiError::Unauthorized);
    };

    let project: ProjectId = params
        .get(PROJECT_PARAM)
        .map(String::as_str)
        .unwrap_or_default()
        .parse()?;

    state
        .gate
        .authorize(subject.subject(), &project, state.capability)
        .await?;

    Ok(next.run(req).await)
}
