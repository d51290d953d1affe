use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Coarse capability tier attached to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Unassigned,
    DeveloperIntern,
    TechLead,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Unassigned => "unassigned",
            Role::DeveloperIntern => "developer_intern",
            Role::TechLead => "tech_lead",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Unassigned => "Unassigned",
            Role::DeveloperIntern => "Developer Intern",
            Role::TechLead => "Tech Lead",
        }
    }

    pub fn is_assigned(self) -> bool {
        !matches!(self, Role::Unassigned)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = crate::error::TechDevError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unassigned" => Ok(Role::Unassigned),
            "developer_intern" | "intern" => Ok(Role::DeveloperIntern),
            "tech_lead" | "tech-lead" => Ok(Role::TechLead),
            _ => Err(crate::error::TechDevError::InvalidRole(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// RoleState
// ---------------------------------------------------------------------------

/// Role combined with tech lead verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleState {
    Unassigned,
    DeveloperIntern,
    /// Role is Tech Lead but no active credential row exists.
    TechLeadPending,
    TechLeadVerified,
}

impl RoleState {
    pub fn as_str(self) -> &'static str {
        match self {
            RoleState::Unassigned => "unassigned",
            RoleState::DeveloperIntern => "developer_intern",
            RoleState::TechLeadPending => "tech_lead_pending",
            RoleState::TechLeadVerified => "tech_lead_verified",
        }
    }
}

impl fmt::Display for RoleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// The view a session is currently looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Dashboard,
    TeamManagement,
    TeamsOverview,
    Standups,
}

impl Page {
    pub fn as_str(self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::TeamManagement => "team_management",
            Page::TeamsOverview => "teams_overview",
            Page::Standups => "standups",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Page {
    type Err = crate::error::TechDevError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "dashboard" => Ok(Page::Dashboard),
            "team_management" | "team" => Ok(Page::TeamManagement),
            "teams_overview" | "teams" => Ok(Page::TeamsOverview),
            "standups" => Ok(Page::Standups),
            _ => Err(crate::error::TechDevError::UnknownPage(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
