//! Task aggregate root and its lifecycle state machine.

use super::TaskId;
use crate::error::{DomainError, DomainResult};
use crate::ids::UserId;
use crate::project::domain::ProjectId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Work on the task may proceed.
    Opened,
    /// The task is blocked on something else.
    Blocked,
    /// The task has been completed or abandoned.
    Closed,
    /// The task has been archived.
    Archived,
    /// The task awaits a review.
    ReviewPending,
}

impl TaskState {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Blocked => "blocked",
            Self::Closed => "closed",
            Self::Archived => "archived",
            Self::ReviewPending => "review_pending",
        }
    }
}

impl Default for TaskState {
    fn default() -> Self {
        Self::Opened
    }
}

impl TryFrom<&str> for TaskState {
    type Error = ParseTaskStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "opened" => Ok(Self::Opened),
            "blocked" => Ok(Self::Blocked),
            "closed" => Ok(Self::Closed),
            "archived" => Ok(Self::Archived),
            "review_pending" => Ok(Self::ReviewPending),
            _ => Err(ParseTaskStateError(value.to_owned())),
        }
    }
}

/// Error returned while parsing task states from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task state: {0}")]
pub struct ParseTaskStateError(pub String);

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    project: ProjectId,
    title: String,
    description: Option<String>,
    estimated_hours: i32,
    hours_spent: i32,
    state: TaskState,
    started_on: Option<DateTime<Utc>>,
    ended_on: Option<DateTime<Utc>>,
    due_on: Option<DateTime<Utc>>,
    author: Option<UserId>,
    assignee: Option<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for creating a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskData {
    /// Owning project.
    pub project: ProjectId,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Estimated effort in hours; must be non-negative.
    pub estimated_hours: i32,
    /// Creating user.
    pub author: UserId,
    /// Optional assignee.
    pub assignee: Option<UserId>,
    /// Optional due date.
    pub due_on: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owning project.
    pub project: ProjectId,
    /// Persisted title.
    pub title: String,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted estimated hours.
    pub estimated_hours: i32,
    /// Persisted hours spent.
    pub hours_spent: i32,
    /// Persisted lifecycle state.
    pub state: TaskState,
    /// Persisted start date, if any.
    pub started_on: Option<DateTime<Utc>>,
    /// Persisted end date, if any.
    pub ended_on: Option<DateTime<Utc>>,
    /// Persisted due date, if any.
    pub due_on: Option<DateTime<Utc>>,
    /// Persisted author; nulled when the user has been deleted.
    pub author: Option<UserId>,
    /// Persisted assignee, if any.
    pub assignee: Option<UserId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new opened task.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] when the title is empty after
    /// trimming or the estimated hours are negative.
    pub fn new(data: NewTaskData, clock: &impl Clock) -> DomainResult<Self> {
        if data.title.trim().is_empty() {
            return Err(DomainError::Validation(
                "task title must not be empty".to_owned(),
            ));
        }
        if data.estimated_hours < 0 {
            return Err(DomainError::Validation(
                "estimated hours must not be negative".to_owned(),
            ));
        }

        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            project: data.project,
            title: data.title,
            description: data.description,
            estimated_hours: data.estimated_hours,
            hours_spent: 0,
            state: TaskState::Opened,
            started_on: None,
            ended_on: None,
            due_on: data.due_on,
            author: Some(data.author),
            assignee: data.assignee,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            project: data.project,
            title: data.title,
            description: data.description,
            estimated_hours: data.estimated_hours,
            hours_spent: data.hours_spent,
            state: data.state,
            started_on: data.started_on,
            ended_on: data.ended_on,
            due_on: data.due_on,
            author: data.author,
            assignee: data.assignee,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project(&self) -> ProjectId {
        self.project
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the estimated effort in hours.
    #[must_use]
    pub const fn estimated_hours(&self) -> i32 {
        self.estimated_hours
    }

    /// Returns the hours spent so far.
    #[must_use]
    pub const fn hours_spent(&self) -> i32 {
        self.hours_spent
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TaskState {
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

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_on(&self) -> Option<DateTime<Utc>> {
        self.due_on
    }

    /// Returns the authoring user, unless the user has been deleted.
    #[must_use]
    pub const fn author(&self) -> Option<UserId> {
        self.author
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assignee(&self) -> Option<UserId> {
        self.assignee
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

    /// Records additional hours spent on the task.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidArgument`] when `hours` is negative.
    pub fn log_hours(&mut self, hours: i32, clock: &impl Clock) -> DomainResult<()> {
        if hours < 0 {
            return Err(DomainError::InvalidArgument(
                "logged hours must not be negative".to_owned(),
            ));
        }
        self.hours_spent = self.hours_spent.saturating_add(hours);
        self.touch(clock);
        Ok(())
    }

    /// Marks the task as blocked.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] when the task is already
    /// blocked, closed, or archived.
    pub fn block(&mut self, clock: &impl Clock) -> DomainResult<()> {
        match self.state {
            TaskState::Opened | TaskState::ReviewPending => {
                self.state = TaskState::Blocked;
                self.touch(clock);
                Ok(())
            }
            TaskState::Blocked => Err(DomainError::InvalidOperation(
                "task is already blocked".to_owned(),
            )),
            TaskState::Closed | TaskState::Archived => Err(DomainError::InvalidOperation(
                "closed or archived tasks cannot be blocked".to_owned(),
            )),
        }
    }

    /// Reopens a blocked task.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] unless the task is blocked.
    pub fn unblock(&mut self, clock: &impl Clock) -> DomainResult<()> {
        if self.state != TaskState::Blocked {
            return Err(DomainError::InvalidOperation(
                "task is not blocked".to_owned(),
            ));
        }
        self.state = TaskState::Opened;
        self.touch(clock);
        Ok(())
    }

    /// Puts an opened task up for review.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] unless the task is opened.
    pub fn request_review(&mut self, clock: &impl Clock) -> DomainResult<()> {
        if self.state != TaskState::Opened {
            return Err(DomainError::InvalidOperation(
                "only opened tasks can be put up for review".to_owned(),
            ));
        }
        self.state = TaskState::ReviewPending;
        self.touch(clock);
        Ok(())
    }

    /// Closes the task.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] when the task is already
    /// closed or archived.
    pub fn close(&mut self, clock: &impl Clock) -> DomainResult<()> {
        match self.state {
            TaskState::Opened | TaskState::Blocked | TaskState::ReviewPending => {
                self.state = TaskState::Closed;
                self.touch(clock);
                Ok(())
            }
            TaskState::Closed => Err(DomainError::InvalidOperation(
                "task is already closed".to_owned(),
            )),
            TaskState::Archived => Err(DomainError::InvalidOperation(
                "archived tasks cannot be closed".to_owned(),
            )),
        }
    }

    /// Reopens a closed task.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] unless the task is closed.
    pub fn reopen(&mut self, clock: &impl Clock) -> DomainResult<()> {
        if self.state != TaskState::Closed {
            return Err(DomainError::InvalidOperation(
                "task is not closed".to_owned(),
            ));
        }
        self.state = TaskState::Opened;
        self.touch(clock);
        Ok(())
    }

    /// Archives the task from any non-archived state.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidArgument`] when the task is already
    /// archived.
    pub fn archive(&mut self, clock: &impl Clock) -> DomainResult<()> {
        if self.state == TaskState::Archived {
            return Err(DomainError::InvalidArgument(
                "task is already archived".to_owned(),
            ));
        }
        self.state = TaskState::Archived;
        self.touch(clock);
        Ok(())
    }

    /// Restores an archived task into the opened state.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] unless the task is archived.
    pub fn unarchive(&mut self, clock: &impl Clock) -> DomainResult<()> {
        if self.state != TaskState::Archived {
            return Err(DomainError::InvalidOperation(
                "task is not archived".to_owned(),
            ));
        }
        self.state = TaskState::Opened;
        self.touch(clock);
        Ok(())
    }

    /// Replaces the task title.
    pub fn update_title(&mut self, title: impl Into<String>, clock: &impl Clock) {
        self.title = title.into();
        self.touch(clock);
    }

    /// Replaces the task description.
    pub fn update_description(&mut self, description: impl Into<String>, clock: &impl Clock) {
        self.description = Some(description.into());
        self.touch(clock);
    }

    /// Sets the start date to the current clock time.
    pub fn start(&mut self, clock: &impl Clock) {
        self.start_from(clock.utc(), clock);
    }

    /// Sets the start date, past or future.
    pub fn start_from(&mut self, from: DateTime<Utc>, clock: &impl Clock) {
        self.started_on = Some(from);
        self.touch(clock);
    }

    /// Sets the end date to the current clock time.
    ///
    /// # Errors
    ///
    /// Same contract as [`Task::end_on`].
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
                "cannot end a task that was never started".to_owned(),
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
