//! Account registration and the caller's own account.
//!
//! Every `/users/self/*` mutation names the user it targets; it must be the
//! caller.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use lexicon_auth::{GrantMatrix, ensure_same_user, ensure_user, hash_password, verify_password};
use lexicon_infra::NewUser;

use crate::app::dto::{
    RegisterUserRequest, SelfQuery, SelfResponse, UpdatePasswordRequest, UpdateUserEmailRequest,
    UpdateUserNameRequest, UserResponse,
};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::SubjectContext;

const MIN_PASSWORD_LEN: usize = 8;

fn check_password_len(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Unprocessable(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

async fn hash_blocking(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("hashing task: {e}")))?
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// POST /users/register - create a user account
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<RegisterUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    check_password_len(&req.password)?;
    let password_hash = hash_blocking(req.password).await?;

    let user = services.directory.create_user(NewUser {
        email: req.email,
        name: req.name,
        password_hash,
    })?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// GET /users/self?include=projectRoles|projectGrants
///
/// `projectRoles` maps each project to the caller's role; `projectGrants` maps
/// it to the capabilities that role confers. Other values are ignored.
pub async fn show_self(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(subject): Extension<SubjectContext>,
    Query(query): Query<SelfQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = ensure_user(subject.subject())?;
    let user = services.directory.user(&user_id)?;

    let mut response = SelfResponse {
        user: UserResponse::from(&user),
        project_roles: None,
        project_grants: None,
    };

    match query.include.as_deref() {
        Some("projectRoles") => {
            let memberships = services.directory.user_project_roles(&user_id)?;
            response.project_roles = Some(memberships.into_iter().map(|pu| (pu.project_id, pu.role)).collect());
        }
        Some("projectGrants") => {
            let memberships = services.directory.user_project_roles(&user_id)?;
            response.project_grants = Some(
                memberships
                    .into_iter()
                    .map(|pu| (pu.project_id, GrantMatrix::for_role(pu.role)))
                    .collect(),
            );
        }
        _ => {}
    }

    Ok(Json(response))
}

/// PATCH /users/self/password - change password after re-verifying the old one
pub async fn update_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(subject): Extension<SubjectContext>,
    body: Result<Json<UpdatePasswordRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let user_id = ensure_same_user(subject.subject(), &req.user_id)?;
    let user = services.directory.user(&user_id)?;

    let hash = user.password_hash.clone();
    let old_password = req.old_password;
    let matches = tokio::task::spawn_blocking(move || verify_password(&hash, &old_password))
        .await
        .map_err(|e| ApiError::Internal(format!("password verification task: {e}")))?;
    if !matches {
        tracing::debug!(user_id = %user_id, "password change rejected: old password mismatch");
        return Err(ApiError::Forbidden);
    }

    check_password_len(&req.new_password)?;
    let password_hash = hash_blocking(req.new_password).await?;
    let user = services.directory.update_user_password(&user_id, password_hash)?;

    tracing::info!(user_id = %user_id, "password changed");
    Ok(Json(UserResponse::from(&user)))
}

/// PATCH /users/self/name
pub async fn update_name(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(subject): Extension<SubjectContext>,
    body: Result<Json<UpdateUserNameRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let user_id = ensure_same_user(subject.subject(), &req.user_id)?;
    let user = services.directory.update_user_name(&user_id, &req.name)?;
    Ok(Json(UserResponse::from(&user)))
}

/// PATCH /users/self/email
pub async fn update_email(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(subject): Extension<SubjectContext>,
    body: Result<Json<UpdateUserEmailRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let user_id = ensure_same_user(subject.subject(), &req.user_id)?;
    let user = services.directory.update_user_email(&user_id, &req.email)?;
    tracing::info!(user_id = %user_id, "email changed");
    Ok(Json(UserResponse::from(&user)))
}
