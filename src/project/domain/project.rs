//! Project aggregate root and its lifecycle state machine.

use super::ProjectId;
use crate::error::{DomainError, DomainResult};
use crate::ids::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Project lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectState {
    /// Work on the project is ongoing.
    Active,
    /// The project is paused but may be reactivated.
    Inactive,
    /// The project has been archived.
    Archived,
}

impl ProjectState {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Archived => "archived",
        }
    }
}

impl Default for ProjectState {
    fn default() -> Self {
        Self::Active
    }
}

impl TryFrom<&str> for ProjectState {
    type Error = ParseProjectStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "archived" => Ok(Self::Archived),
            _ => Err(ParseProjectStateError(value.to_owned())),
        }
    }
}

/// Error returned while parsing project states from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown project state: {0}")]
pub struct ParseProjectStateError(pub String);

/// Project aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    title: String,
    description: Option<String>,
    state: ProjectState,
    started_on: Option<DateTime<Utc>>,
    ended_on: Option<DateTime<Utc>>,
    created_by: Option<UserId>,
    updated_by: Option<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted project aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProjectData {
    /// Persisted project identifier.
    pub id: ProjectId,
    /// Persisted title.
    pub title: String,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted lifecycle state.
    pub state: ProjectState,
    /// Persisted start date, if any.
    pub started_on: Option<DateTime<Utc>>,
    /// Persisted end date, if any.
    pub ended_on: Option<DateTime<Utc>>,
    /// Persisted creator; nulled when the user has been deleted.
    pub created_by: Option<UserId>,
    /// Persisted last editor, if any.
    pub updated_by: Option<UserId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new active project.
    ///
    /// The creator is required at creation time even though the relation may
    /// be nulled later when the user is deleted.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] when the title is empty after
    /// trimming.
    pub fn new(
        title: impl Into<String>,
        description: Option<String>,
        created_by: UserId,
        clock: &impl Clock,
    ) -> DomainResult<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::Validation(
                "project title must not be empty".to_owned(),
            ));
        }

        let timestamp = clock.utc();
        Ok(Self {
            id: ProjectId::new(),
            title,
            description,
            state: ProjectState::Active,
            started_on: None,
            ended_on: None,
            created_by: Some(created_by),
            updated_by: None,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProjectData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            state: data.state,
            started_on: data.started_on,
            ended_on: data.ended_on,
            created_by: data.created_by,
            updated_by: data.updated_by,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the project title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the project description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ProjectState {
        self.state
    }

    /// Returns the start date, if any.
    #[must_use]
    pub const fn started_on(&self) -> Option<DateTime<Utc>> {
        self.started_on
    }

    /// Returns the end date, if any.
    #[must_use]
    pub const fn ended_on(&self) -> Option<DateTime<Utc>> {
        self.ended_on
    }

    /// Returns the creating user, unless the user has been deleted.
    #[must_use]
    pub const fn created_by(&self) -> Option<UserId> {
        self.created_by
    }

    /// Returns the last editing user, if any.
    #[must_use]
    pub const fn updated_by(&self) -> Option<UserId> {
        self.updated_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Reactivates an inactive project.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] when the project is already
    /// active, or archived (archived projects must be unarchived first).
    pub fn activate(&mut self, clock: &impl Clock) -> DomainResult<()> {
        match self.state {
            ProjectState::Active => Err(DomainError::InvalidOperation(
                "project is already active".to_owned(),
            )),
            ProjectState::Archived => Err(DomainError::InvalidOperation(
                "archived projects cannot be reactivated directly".to_owned(),
            )),
            ProjectState::Inactive => {
                self.state = ProjectState::Active;
                self.touch(clock);
                Ok(())
            }
        }
    }

    /// Pauses an active project.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] unless the project is
    /// currently active.
    pub fn deactivate(&mut self, clock: &impl Clock) -> DomainResult<()> {
        if self.state != ProjectState::Active {
            return Err(DomainError::InvalidOperation(
                "only active projects can be deactivated".to_owned(),
            ));
        }
        self.state = ProjectState::Inactive;
        self.touch(clock);
        Ok(())
    }

    /// Archives the project from any non-archived state.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidArgument`] when the project is already
    /// archived.
    pub fn archive(&mut self, clock: &impl Clock) -> DomainResult<()> {
        if self.state == ProjectState::Archived {
            return Err(DomainError::InvalidArgument(
                "project is already archived".to_owned(),
            ));
        }
        self.state = ProjectState::Archived;
        self.touch(clock);
        Ok(())
    }

    /// Restores an archived project into the inactive state.
    ///
    /// Unarchiving never returns straight to Active; the project must be
    /// explicitly activated afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] unless the project is
    /// currently archived.
    pub fn unarchive(&mut self, clock: &impl Clock) -> DomainResult<()> {
        if self.state != ProjectState::Archived {
            return Err(DomainError::InvalidOperation(
                "project is not archived".to_owned(),
            ));
        }
        self.state = ProjectState::Inactive;
        self.touch(clock);
        Ok(())
    }

    /// Replaces the project title.
    pub fn update_title(&mut self, title: impl Into<String>, clock: &impl Clock) {
        self.title = title.into();
        self.touch(clock);
    }

    /// Replaces the project description.
    pub fn update_description(&mut self, description: impl Into<String>, clock: &impl Clock) {
        self.description = Some(description.into());
        self.touch(clock);
    }

    /// Sets the start date to the current clock time.
    pub fn start(&mut self, clock: &impl Clock) {
        self.start_from(clock.utc(), clock);
    }

    /// Sets the start date.
    ///
    /// Past and future timestamps are both accepted so existing projects can
    /// be migrated and new ones planned ahead.
    pub fn start_from(&mut self, from: DateTime<Utc>, clock: &impl Clock) {
        self.started_on = Some(from);
        self.touch(clock);
    }

    /// Sets the end date to the current clock time.
    ///
    /// # Errors
    ///
    /// Same contract as [`Project::end_on`].
    pub fn end(&mut self, clock: &impl Clock) -> DomainResult<()> {
        self.end_on(clock.utc(), clock)
    }

    /// Sets the end date.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] when no start date is set or
    /// when `on` precedes the start date.
    pub fn end_on(&mut self, on: DateTime<Utc>, clock: &impl Clock) -> DomainResult<()> {
        let Some(started_on) = self.started_on else {
            return Err(DomainError::InvalidOperation(
                "cannot end a project that was never started".to_owned(),
            ));
        };
        if on < started_on {
            return Err(DomainError::InvalidOperation(
                "end date cannot precede the start date".to_owned(),
            ));
        }
        self.ended_on = Some(on);
        self.touch(clock);
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
