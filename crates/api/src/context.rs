use lexicon_auth::{Subject, SubjectKind};
use lexicon_core::UserId;

/// Verified subject for a request.
///
/// Inserted once by the bearer middleware and read-only afterwards. Handlers
/// behind that middleware may rely on its presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectContext {
    subject: Subject,
}

impl SubjectContext {
    pub fn new(subject: Subject) -> Self {
        Self { subject }
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn id(&self) -> &str {
        self.subject.id.as_str()
    }

    pub fn kind(&self) -> SubjectKind {
        self.subject.kind
    }

    /// The user id when the subject is a human user.
    pub fn user_id(&self) -> Option<UserId> {
        self.subject.user_id()
    }
}
