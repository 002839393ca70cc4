//! Read-only collaborator interfaces consumed by the core.
//!
//! Storage is owned elsewhere; implementations only need to tell "does not
//! exist" apart from "could not ask".

use async_trait::async_trait;
use thiserror::Error;

use lexicon_core::{ClientId, ProjectId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    /// Transport or backend failure; the record may or may not exist.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A human user as seen by the authentication pipeline.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub name: String,
    /// PHC-formatted adaptive hash; never the plaintext.
    pub password_hash: String,
}

impl core::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// A machine client registered on exactly one project.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientRecord {
    pub client_id: ClientId,
    pub project_id: ProjectId,
    pub name: String,
    /// Stored as issued: the owning project must be able to display it again.
    pub secret: String,
}

impl core::fmt::Debug for ClientRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClientRecord")
            .field("client_id", &self.client_id)
            .field("project_id", &self.project_id)
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, StoreError>;

    async fn get_user_by_id(&self, id: &UserId) -> Result<UserRecord, StoreError>;

    async fn find_client_by_id(&self, id: &ClientId) -> Result<ClientRecord, StoreError>;
}

#[async_trait]
pub trait MembershipLookup: Send + Sync {
    /// Role name stored for `user` on `project`, or `NotFound` when there is
    /// no membership. Names are returned as stored; the gate resolves them.
    async fn get_role(&self, project: &ProjectId, user: &UserId) -> Result<String, StoreError>;
}
