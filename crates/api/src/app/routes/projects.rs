use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use lexicon_auth::{CredentialStore, SubjectKind, ensure_user};
use lexicon_core::ProjectId;
use lexicon_infra::NewProject;

use crate::app::dto::NameRequest;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::SubjectContext;

/// GET /projects - projects the caller can see
///
/// Users see every project they hold a role on; a client sees its own project.
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(subject): Extension<SubjectContext>,
) -> Result<impl IntoResponse, ApiError> {
    let projects = match subject.kind() {
        SubjectKind::User => {
            let user_id = ensure_user(subject.subject())?;
            services.directory.user_projects(&user_id)?
        }
        SubjectKind::Client => {
            let client_id = subject.subject().client_id().ok_or(ApiError::Forbidden)?;
            let client = services
                .directory
                .find_client_by_id(&client_id)
                .await?;
            vec![services.directory.project(&client.project_id)?]
        }
    };
    Ok(Json(projects))
}

/// POST /projects - create a project owned by the caller
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(subject): Extension<SubjectContext>,
    body: Result<Json<NameRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = ensure_user(subject.subject())?;
    let Json(req) = body?;
    let project = services.directory.create_project(&owner, NewProject { name: req.name })?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /projects/:project_id
pub async fn show(
    Extension(services): Extension<Arc<AppServices>>,
    Path(project_id): Path<ProjectId>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(services.directory.project(&project_id)?))
}

/// PATCH /projects/:project_id/name
pub async fn rename(
    Extension(services): Extension<Arc<AppServices>>,
    Path(project_id): Path<ProjectId>,
    body: Result<Json<NameRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    Ok(Json(services.directory.rename_project(&project_id, &req.name)?))
}

/// DELETE /projects/:project_id
pub async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Path(project_id): Path<ProjectId>,
) -> Result<StatusCode, ApiError> {
    services.directory.delete_project(&project_id)?;
    tracing::info!(project_id = %project_id, "project deleted");
    Ok(StatusCode::NO_CONTENT)
}
