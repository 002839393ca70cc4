use std::sync::Arc;

use lexicon_core::{ClientId, ProjectId, UserId};

use crate::grants::GrantMatrix;
use crate::store::{CredentialStore, MembershipLookup, StoreError};
use crate::{AuthzError, Capability, Subject, SubjectKind};

/// Check a required capability against an already resolved grant set.
///
/// - No IO
/// - No panics
/// - Fails closed on an empty set
pub fn authorize(granted: &[Capability], required: Capability) -> Result<(), AuthzError> {
    if granted.contains(&required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required))
    }
}

/// Resolves a subject's standing on a project and checks capabilities.
///
/// Built once at startup with its collaborators and shared across requests.
/// Decisions have no side effects and are safe to retry.
#[derive(Clone)]
pub struct AuthorizationGate {
    memberships: Arc<dyn MembershipLookup>,
    credentials: Arc<dyn CredentialStore>,
}

impl AuthorizationGate {
    pub fn new(memberships: Arc<dyn MembershipLookup>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            memberships,
            credentials,
        }
    }

    /// Capabilities `subject` holds on `project`.
    ///
    /// Users get their membership role's grants. Clients get the fixed client
    /// set, but only on the project they are registered to. Absence of either
    /// resolves to the empty set rather than an error, so callers cannot tell
    /// "no such project" from "not a member".
    pub async fn capabilities(
        &self,
        subject: &Subject,
        project: &ProjectId,
    ) -> Result<&'static [Capability], AuthzError> {
        match subject.kind {
            SubjectKind::User => {
                let user = UserId::from_raw(subject.id.as_str());
                match self.memberships.get_role(project, &user).await {
                    Ok(role) => Ok(GrantMatrix::for_role_name(&role)),
                    Err(StoreError::NotFound) => Ok(GrantMatrix::none()),
                    Err(StoreError::Unavailable(e)) => Err(AuthzError::Internal(e)),
                }
            }
            SubjectKind::Client => {
                let client = ClientId::from_raw(subject.id.as_str());
                match self.credentials.find_client_by_id(&client).await {
                    Ok(record) if &record.project_id == project => Ok(GrantMatrix::for_client()),
                    Ok(_) | Err(StoreError::NotFound) => Ok(GrantMatrix::none()),
                    Err(StoreError::Unavailable(e)) => Err(AuthzError::Internal(e)),
                }
            }
        }
    }

    pub async fn authorize(
        &self,
        subject: &Subject,
        project: &ProjectId,
        required: Capability,
    ) -> Result<(), AuthzError> {
        let granted = self.capabilities(subject, project).await?;
        let decision = authorize(granted, required);
        if decision.is_err() {
            tracing::debug!(
                subject_id = %subject.id,
                subject_kind = %subject.kind,
                project_id = %project,
                capability = %required,
                "authorization denied"
            );
        }
        decision
    }
}

/// Membership mutations may never target the actor's own membership.
pub fn ensure_not_self(actor: &Subject, target: &UserId) -> Result<(), AuthzError> {
    if actor.kind == SubjectKind::User && actor.id.as_str() == target.as_str() {
        return Err(AuthzError::SelfEdit);
    }
    Ok(())
}

/// The project named in a mutation payload must be the one the path authorized.
pub fn ensure_same_project(path: &ProjectId, body: &ProjectId) -> Result<(), AuthzError> {
    if path != body {
        return Err(AuthzError::ProjectMismatch);
    }
    Ok(())
}

/// Account changes must name the calling user; returns that user's id.
pub fn ensure_same_user(actor: &Subject, target: &UserId) -> Result<UserId, AuthzError> {
    let user = ensure_user(actor)?;
    if &user != target {
        return Err(AuthzError::NotSelf);
    }
    Ok(user)
}

/// Only human users may perform the action (e.g. create a project).
pub fn ensure_user(subject: &Subject) -> Result<UserId, AuthzError> {
    subject.user_id().ok_or(AuthzError::UserRequired)
}
