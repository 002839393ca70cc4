//! Membership management.
//!
//! The guard has already checked the caller's capability on the path project.
//! Handlers additionally refuse self-edits and payloads naming another project.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use lexicon_auth::{ensure_not_self, ensure_same_project};
use lexicon_core::{ProjectId, UserId};

use crate::app::dto::{AssignProjectUserRequest, UpdateRoleRequest};
use crate::app::errors::{ApiError, parse_role};
use crate::app::services::AppServices;
use crate::context::SubjectContext;

/// GET /projects/:project_id/users - members other than the caller
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(subject): Extension<SubjectContext>,
    Path(project_id): Path<ProjectId>,
) -> Result<impl IntoResponse, ApiError> {
    let users: Vec<_> = services
        .directory
        .project_users(&project_id)?
        .into_iter()
        .filter(|pu| pu.user_id.as_str() != subject.id())
        .collect();
    Ok(Json(users))
}

/// POST /projects/:project_id/users - grant a registered user a role
pub async fn assign(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(subject): Extension<SubjectContext>,
    Path(project_id): Path<ProjectId>,
    body: Result<Json<AssignProjectUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    ensure_same_project(&project_id, &req.project_id)?;
    let role = parse_role(&req.role)?;

    let user_id = match (req.user_id, req.email.as_deref()) {
        (Some(id), _) => id,
        (None, Some(email)) if !email.trim().is_empty() => services.directory.user_by_email(email)?.id,
        _ => return Err(ApiError::BadRequest("userId or email is required".to_string())),
    };
    ensure_not_self(subject.subject(), &user_id)?;

    let member = services.directory.assign_project_user(&project_id, &user_id, role)?;
    tracing::info!(project_id = %project_id, user_id = %user_id, role = role.as_str(), "project role assigned");
    Ok((StatusCode::CREATED, Json(member)))
}

/// PATCH /projects/:project_id/users/:user_id/role
pub async fn update_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(subject): Extension<SubjectContext>,
    Path((project_id, user_id)): Path<(ProjectId, UserId)>,
    body: Result<Json<UpdateRoleRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_not_self(subject.subject(), &user_id)?;
    let Json(req) = body?;
    let role = parse_role(&req.role)?;

    let member = services
        .directory
        .update_project_user_role(&project_id, &user_id, role)?;
    Ok(Json(member))
}

/// DELETE /projects/:project_id/users/:user_id
pub async fn revoke(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(subject): Extension<SubjectContext>,
    Path((project_id, user_id)): Path<(ProjectId, UserId)>,
) -> Result<StatusCode, ApiError> {
    ensure_not_self(subject.subject(), &user_id)?;
    services.directory.revoke_project_user(&project_id, &user_id)?;
    tracing::info!(project_id = %project_id, user_id = %user_id, "project role revoked");
    Ok(StatusCode::NO_CONTENT)
}
