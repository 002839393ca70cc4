//! Infrastructure layer: storage adapters behind the auth core's traits.

pub mod directory;

pub use directory::{InMemoryDirectory, NewClient, NewProject, NewUser, Project, ProjectClient, ProjectUser};
