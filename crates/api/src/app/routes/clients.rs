use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use lexicon_auth::generate_client_secret;
use lexicon_core::{ClientId, ProjectId};
use lexicon_infra::NewClient;

use crate::app::dto::NameRequest;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

/// GET /projects/:project_id/clients
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Path(project_id): Path<ProjectId>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(services.directory.project_clients(&project_id)?))
}

/// POST /projects/:project_id/clients - register a client and issue its secret
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Path(project_id): Path<ProjectId>,
    body: Result<Json<NameRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let secret = generate_client_secret()?;
    let client = services.directory.create_client(
        NewClient {
            project_id,
            name: req.name,
        },
        secret,
    )?;
    tracing::info!(client_id = %client.client_id, project_id = %client.project_id, "client registered");
    Ok((StatusCode::CREATED, Json(client)))
}

/// GET /projects/:project_id/clients/:client_id
pub async fn show(
    Extension(services): Extension<Arc<AppServices>>,
    Path((project_id, client_id)): Path<(ProjectId, ClientId)>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(services.directory.project_client(&project_id, &client_id)?))
}

/// PATCH /projects/:project_id/clients/:client_id/name
pub async fn rename(
    Extension(services): Extension<Arc<AppServices>>,
    Path((project_id, client_id)): Path<(ProjectId, ClientId)>,
    body: Result<Json<NameRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    Ok(Json(services.directory.rename_client(&project_id, &client_id, &req.name)?))
}

/// PATCH /projects/:project_id/clients/:client_id/resetSecret
pub async fn reset_secret(
    Extension(services): Extension<Arc<AppServices>>,
    Path((project_id, client_id)): Path<(ProjectId, ClientId)>,
) -> Result<impl IntoResponse, ApiError> {
    let secret = generate_client_secret()?;
    Ok(Json(services.directory.reset_client_secret(&project_id, &client_id, secret)?))
}

/// DELETE /projects/:project_id/clients/:client_id
pub async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Path((project_id, client_id)): Path<(ProjectId, ClientId)>,
) -> Result<StatusCode, ApiError> {
    services.directory.delete_client(&project_id, &client_id)?;
    Ok(StatusCode::NO_CONTENT)
}
