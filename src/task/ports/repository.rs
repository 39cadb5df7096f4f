//! Repository port for task persistence, membership, and relation storage.

use crate::error::RepositoryResult;
use crate::membership::MembershipStore;
use crate::project::domain::ProjectId;
use crate::task::domain::{Task, TaskId, TaskMembership, TaskRelation};
use async_trait::async_trait;

/// Task persistence contract.
///
/// The membership registry and relation graph share the storage boundary so
/// that creation-with-grants and edge pairing can run inside one
/// transaction.
#[async_trait]
pub trait TaskRepository: MembershipStore<TaskId> {
    /// Persists a new task together with its initial membership grants.
    ///
    /// All writes happen in one transaction: a task is never observable
    /// without its author's Owner membership.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::DuplicateTask`] when the identifier already
    /// exists.
    ///
    /// [`RepositoryError::DuplicateTask`]: crate::error::RepositoryError::DuplicateTask
    async fn store_with_memberships(
        &self,
        task: &Task,
        memberships: &[TaskMembership],
    ) -> RepositoryResult<()>;

    /// Persists changes to an existing task (state, dates, title).
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::TaskNotFound`] when the task does not
    /// exist.
    ///
    /// [`RepositoryError::TaskNotFound`]: crate::error::RepositoryError::TaskNotFound
    async fn update(&self, task: &Task) -> RepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>>;

    /// Returns every task under the given project.
    async fn find_by_project(&self, project: ProjectId) -> RepositoryResult<Vec<Task>>;

    /// Inserts `relation` and its inverse counterpart in one transaction.
    ///
    /// Idempotent: a pre-existing identical edge is reused, not duplicated.
    /// Either both directed rows exist afterwards or neither does.
    async fn add_relation_pair(&self, relation: TaskRelation) -> RepositoryResult<TaskRelation>;

    /// Deletes `relation` and its inverse counterpart in one transaction.
    ///
    /// Deleting an absent edge is a no-op.
    async fn remove_relation_pair(&self, relation: TaskRelation) -> RepositoryResult<()>;

    /// Returns every outgoing edge whose source is `task`.
    async fn relations_for(&self, task: TaskId) -> RepositoryResult<Vec<TaskRelation>>;
}
