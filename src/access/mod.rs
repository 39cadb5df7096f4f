//! Role and action model with the static permission table.
//!
//! Roles are a closed enumeration; permissions are an explicit set per role
//! rather than being inferred from any privilege ordering. The lookup is a
//! pure function with no failure modes: unknown role or action strings are
//! rejected at the persistence boundary, never silently mapped.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;


/// Privilege level a user holds within a project or task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full control over the entity, including membership management.
    Owner,
    /// May view the entity, add tasks, and invite participants or guests.
    Participant,
    /// Read-only access.
    Guest,
}

impl Role {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Participant => "participant",
            Self::Guest => "guest",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Guest
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "owner" => Ok(Self::Owner),
            "participant" => Ok(Self::Participant),
            "guest" => Ok(Self::Guest),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned while parsing roles from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

/// Action a member may attempt against a project or task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Remove any member from the entity.
    RemoveMember,
    /// Grant the Owner role.
    AddOwner,
    /// Grant the Participant role.
    AddParticipant,
    /// Grant the Guest role.
    AddGuest,
    /// Move the entity into its active state.
    Activate,
    /// Move the entity into its inactive state.
    Deactivate,
    /// Archive the entity.
    Archive,
    /// Restore the entity from the archive.
    Unarchive,
    /// Create a task under the project.
    AddTask,
    /// View entity details.
    ViewDetails,
    /// View the tasks under the project.
    ViewTasks,
}

impl Action {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RemoveMember => "remove_member",
            Self::AddOwner => "add_owner",
            Self::AddParticipant => "add_participant",
            Self::AddGuest => "add_guest",
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Archive => "archive",
            Self::Unarchive => "unarchive",
            Self::AddTask => "add_task",
            Self::ViewDetails => "view_details",
            Self::ViewTasks => "view_tasks",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns whether `role` permits `action`.
///
/// Owners may perform every listed action. Participants get the viewing
/// actions plus inviting participants or guests and creating tasks. Guests
/// are view-only.
#[must_use]
pub const fn permits(role: Role, action: Action) -> bool {
    match role {
        Role::Owner => true,
        Role::Participant => matches!(
            action,
            Action::ViewDetails
                | Action::ViewTasks
                | Action::AddParticipant
                | Action::AddGuest
                | Action::AddTask
        ),
        Role::Guest => matches!(action, Action::ViewDetails | Action::ViewTasks),
    }
}
