//! Repository port for project persistence and membership storage.

use crate::error::RepositoryResult;
use crate::ids::UserId;
use crate::membership::MembershipStore;
use crate::project::domain::{Project, ProjectId};
use async_trait::async_trait;

/// Project persistence contract.
///
/// The membership registry is part of the same storage boundary so that
/// creation can persist the project row and the creator's Owner grant in a
/// single transaction.
#[async_trait]
pub trait ProjectRepository: MembershipStore<ProjectId> {
    /// Persists a new project together with `owner`'s Owner membership.
    ///
    /// Both writes happen in one transaction: a project is never observable
    /// without its owner.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::DuplicateProject`] when the identifier
    /// already exists.
    ///
    /// [`RepositoryError::DuplicateProject`]: crate::error::RepositoryError::DuplicateProject
    async fn store_with_owner(&self, project: &Project, owner: UserId) -> RepositoryResult<()>;

    /// Persists changes to an existing project (state, dates, title).
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::ProjectNotFound`] when the project does not
    /// exist.
    ///
    /// [`RepositoryError::ProjectNotFound`]: crate::error::RepositoryError::ProjectNotFound
    async fn update(&self, project: &Project) -> RepositoryResult<()>;

    /// Finds a project by identifier.
    ///
    /// Returns `None` when the project does not exist.
    async fn find_by_id(&self, id: ProjectId) -> RepositoryResult<Option<Project>>;
}
