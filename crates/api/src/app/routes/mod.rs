use axum::{
    Router,
    routing::{MethodRouter, delete, get, patch, post},
};

use lexicon_auth::{AuthorizationGate, Capability};

use crate::authz::must_authorize;

pub mod clients;
pub mod project_users;
pub mod projects;
pub mod system;
pub mod token;
pub mod users;

/// Routes reachable without a token.
pub fn public() -> Router {
    Router::new()
        .route("/ping", get(system::ping))
        .route("/users/register", post(users::register))
}

/// Routes that require a verified subject; project routes are guarded per capability.
pub fn protected(gate: &AuthorizationGate) -> Router {
    let guard = |route: MethodRouter, capability: Capability| must_authorize(route, gate, capability);

    Router::new()
        .route("/users/self", get(users::show_self))
        .route("/users/self/password", patch(users::update_password))
        .route("/users/self/name", patch(users::update_name))
        .route("/users/self/email", patch(users::update_email))
        .route("/projects", get(projects::list).post(projects::create))
        // Project
        .route("/projects/:project_id", guard(get(projects::show), Capability::ViewProject))
        .route("/projects/:project_id", guard(delete(projects::remove), Capability::DeleteProject))
        .route(
            "/projects/:project_id/name",
            guard(patch(projects::rename), Capability::UpdateProject),
        )
        // Project users
        .route(
            "/projects/:project_id/users",
            guard(get(project_users::list), Capability::ViewProjectRoles),
        )
        .route(
            "/projects/:project_id/users",
            guard(post(project_users::assign), Capability::AssignProjectRoles),
        )
        .route(
            "/projects/:project_id/users/:user_id/role",
            guard(patch(project_users::update_role), Capability::UpdateProjectRoles),
        )
        .route(
            "/projects/:project_id/users/:user_id",
            guard(delete(project_users::revoke), Capability::RevokeProjectRoles),
        )
        // API clients
        .route(
            "/projects/:project_id/clients",
            guard(get(clients::list).post(clients::create), Capability::ManageApiClients),
        )
        .route(
            "/projects/:project_id/clients/:client_id",
            guard(get(clients::show).delete(clients::remove), Capability::ManageApiClients),
        )
        .route(
            "/projects/:project_id/clients/:client_id/name",
            guard(patch(clients::rename), Capability::ManageApiClients),
        )
        .route(
            "/projects/:project_id/clients/:client_id/resetSecret",
            guard(patch(clients::reset_secret), Capability::ManageApiClients),
        )
}
