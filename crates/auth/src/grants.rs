//! Static role → capability table.
//!
//! The matrix is total over [`Role`]: the match in [`GrantMatrix::for_role`] is
//! exhaustive, so adding a role without deciding its grants fails to compile.
//! Raw role names coming from storage go through [`GrantMatrix::for_role_name`],
//! which resolves anything unrecognized to the empty set.

use std::str::FromStr;

use crate::{Capability, Role};

use Capability::*;

const OWNER: &[Capability] = &Capability::ALL;

const EDITOR: &[Capability] = &[
    ViewProject,
    UpdateProject,
    ViewLocales,
    CreateLocales,
    UpdateLocales,
    DeleteLocales,
    ExportLocales,
    ViewProjectRoles,
];

const VIEWER: &[Capability] = &[ViewProject, ViewLocales, ExportLocales];

/// Capabilities a machine client holds on the single project it belongs to.
const CLIENT: &[Capability] = &[ViewProject, ViewLocales, ExportLocales];

const NONE: &[Capability] = &[];

/// Read-only grant table shared by every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantMatrix;

impl GrantMatrix {
    pub fn for_role(role: Role) -> &'static [Capability] {
        match role {
            Role::Owner => OWNER,
            Role::Editor => EDITOR,
            Role::Viewer => VIEWER,
        }
    }

    /// Resolve a raw role name; unknown names grant nothing.
    pub fn for_role_name(name: &str) -> &'static [Capability] {
        match Role::from_str(name) {
            Ok(role) => Self::for_role(role),
            Err(_) => Self::none(),
        }
    }

    /// The empty grant set.
    pub fn none() -> &'static [Capability] {
        NONE
    }

    pub fn for_client() -> &'static [Capability] {
        CLIENT
    }

    pub fn role_grants(role: Role, capability: Capability) -> bool {
        Self::for_role(role).contains(&capability)
    }

    pub fn role_name_grants(name: &str, capability: Capability) -> bool {
        Self::for_role_name(name).contains(&capability)
    }
}
