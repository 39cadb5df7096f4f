//! Error types shared by the project and task bounded contexts.

use crate::access::Action;
use crate::ids::UserId;
use crate::project::domain::ProjectId;
use crate::task::domain::TaskId;
use std::sync::Arc;
use thiserror::Error;

/// Result type for domain-level validation and state transitions.
pub type DomainResult<T> = Result<T, DomainError>;

/// Failure raised by an aggregate method or creation factory.
///
/// Every mutating operation either fully succeeds and persists, or raises one
/// of these kinds and leaves state unchanged. Adapters map them to
/// user-visible responses; the core never retries or swallows them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    /// A required field was missing or empty at creation time.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The actor lacks the permission required for the action.
    #[error("permission denied for action {0}")]
    PermissionDenied(Action),

    /// A state-machine or membership precondition was violated.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// An argument was rejected outside the state-machine preconditions.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors returned by repository implementations.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// The project was not found.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// No membership row exists for the user on the entity.
    #[error("no membership for user {0}")]
    MembershipNotFound(UserId),

    /// A project with the same identifier already exists.
    #[error("duplicate project identifier: {0}")]
    DuplicateProject(ProjectId),

    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl From<diesel::result::Error> for RepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}

impl RepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
