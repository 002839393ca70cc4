use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named permission a role may confer on a project.
///
/// The wire names (`canViewProject`, ...) are stable and appear in API
/// payloads such as the `projectGrants` view of the current user.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Capability {
    #[serde(rename = "canViewProject")]
    ViewProject,
    #[serde(rename = "canUpdateProject")]
    UpdateProject,
    #[serde(rename = "canDeleteProject")]
    DeleteProject,
    #[serde(rename = "canViewLocales")]
    ViewLocales,
    #[serde(rename = "canCreateLocales")]
    CreateLocales,
    #[serde(rename = "canUpdateLocales")]
    UpdateLocales,
    #[serde(rename = "canDeleteLocales")]
    DeleteLocales,
    #[serde(rename = "canExportLocales")]
    ExportLocales,
    #[serde(rename = "canManageAPIClients")]
    ManageApiClients,
    #[serde(rename = "canViewProjectRoles")]
    ViewProjectRoles,
    #[serde(rename = "canAssignProjectRoles")]
    AssignProjectRoles,
    #[serde(rename = "canUpdateProjectRoles")]
    UpdateProjectRoles,
    #[serde(rename = "canRevokeProjectRoles")]
    RevokeProjectRoles,
}

impl Capability {
    pub const ALL: [Capability; 13] = [
        Capability::ViewProject,
        Capability::UpdateProject,
        Capability::DeleteProject,
        Capability::ViewLocales,
        Capability::CreateLocales,
        Capability::UpdateLocales,
        Capability::DeleteLocales,
        Capability::ExportLocales,
        Capability::ManageApiClients,
        Capability::ViewProjectRoles,
        Capability::AssignProjectRoles,
        Capability::UpdateProjectRoles,
        Capability::RevokeProjectRoles,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewProject => "canViewProject",
            Capability::UpdateProject => "canUpdateProject",
            Capability::DeleteProject => "canDeleteProject",
            Capability::ViewLocales => "canViewLocales",
            Capability::CreateLocales => "canCreateLocales",
            Capability::UpdateLocales => "canUpdateLocales",
            Capability::DeleteLocales => "canDeleteLocales",
            Capability::ExportLocales => "canExportLocales",
            Capability::ManageApiClients => "canManageAPIClients",
            Capability::ViewProjectRoles => "canViewProjectRoles",
            Capability::AssignProjectRoles => "canAssignProjectRoles",
            Capability::UpdateProjectRoles => "canUpdateProjectRoles",
            Capability::RevokeProjectRoles => "canRevokeProjectRoles",
        }
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown capability '{0}'")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCapability(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_serde() {
        for cap in Capability::ALL {
            let json = serde_json::to_string(&cap).unwrap();
            assert_eq!(json, format!("\"{}\"", cap.as_str()));
            assert_eq!(cap.as_str().parse::<Capability>().unwrap(), cap);
        }
    }
}
