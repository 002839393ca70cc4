//! `lexicon-auth` — authentication and authorization core.
//!
//! This crate is intentionally decoupled from HTTP and storage: credential and
//! membership data arrive through the traits in [`store`].

pub mod authorize;
pub mod claims;
pub mod codec;
pub mod error;
pub mod grants;
pub mod password;
pub mod permissions;
pub mod pipeline;
pub mod roles;
pub mod secret;
pub mod store;
pub mod subject;

pub use authorize::{
    AuthorizationGate, authorize, ensure_not_self, ensure_same_project, ensure_same_user, ensure_user,
};
pub use claims::{ClaimsValidationError, TokenClaims, validate_claims};
pub use codec::{DEFAULT_TOKEN_TTL_SECS, Introspection, TokenCodec, VerifiedToken, default_token_ttl};
pub use error::{AuthError, AuthzError, TokenError};
pub use grants::GrantMatrix;
pub use password::{PasswordError, hash_password, verify_password};
pub use permissions::Capability;
pub use pipeline::{Authenticator, GrantType, IssuedToken, TokenRequest, extract_bearer};
pub use roles::{Role, UnknownRole};
pub use secret::generate_client_secret;
pub use store::{ClientRecord, CredentialStore, MembershipLookup, StoreError, UserRecord};
pub use subject::{Subject, SubjectId, SubjectKind};
