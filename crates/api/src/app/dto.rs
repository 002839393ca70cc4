use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use lexicon_auth::{Capability, Role, UserRecord};
use lexicon_core::{ProjectId, UserId};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignProjectUserRequest {
    pub project_id: ProjectId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub email: Option<String>,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub user_id: UserId,
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserNameRequest {
    pub user_id: UserId,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserEmailRequest {
    pub user_id: UserId,
    pub email: String,
}

/// `?include=` on `GET /users/self`.
#[derive(Debug, Default, Deserialize)]
pub struct SelfQuery {
    #[serde(default)]
    pub include: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IntrospectRequest {
    #[serde(default)]
    pub token: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub name: String,
}

impl From<&UserRecord> for UserResponse {
    fn from(value: &UserRecord) -> Self {
        Self {
            id: value.id.clone(),
            email: value.email.clone(),
            name: value.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_roles: Option<BTreeMap<ProjectId, Role>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_grants: Option<BTreeMap<ProjectId, &'static [Capability]>>,
}
