use core::str::FromStr;
use serde::{Deserialize, Serialize};

use lexicon_core::{ClientId, UserId};

/// Kind of an authenticated subject.
///
/// The kind of an identity never changes once it exists; a token carries the
/// kind it was minted for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    /// A human user authenticated with email + password.
    User,
    /// A registered machine client authenticated with its project secret.
    Client,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectKind::User => "user",
            SubjectKind::Client => "client",
        }
    }
}

impl core::fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubjectKind {
    type Err = UnknownSubjectKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(SubjectKind::User),
            "client" => Ok(SubjectKind::Client),
            other => Err(UnknownSubjectKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown subject kind '{0}'")]
pub struct UnknownSubjectKind(pub String);

/// Opaque identifier of an authenticated subject (user id or client id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&UserId> for SubjectId {
    fn from(value: &UserId) -> Self {
        Self(value.as_str().to_string())
    }
}

impl From<&ClientId> for SubjectId {
    fn from(value: &ClientId) -> Self {
        Self(value.as_str().to_string())
    }
}

/// A verified identity: who is making the request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub kind: SubjectKind,
}

impl Subject {
    pub fn user(id: &UserId) -> Self {
        Self {
            id: id.into(),
            kind: SubjectKind::User,
        }
    }

    pub fn client(id: &ClientId) -> Self {
        Self {
            id: id.into(),
            kind: SubjectKind::Client,
        }
    }

    /// The user id, when this subject is a human user.
    pub fn user_id(&self) -> Option<UserId> {
        match self.kind {
            SubjectKind::User => Some(UserId::from_raw(self.id.as_str())),
            SubjectKind::Client => None,
        }
    }

    /// The client id, when this subject is a machine client.
    pub fn client_id(&self) -> Option<ClientId> {
        match self.kind {
            SubjectKind::Client => Some(ClientId::from_raw(self.id.as_str())),
            SubjectKind::User => None,
        }
    }
}
