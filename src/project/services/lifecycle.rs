//! Service layer for project creation, lifecycle, and membership management.

use crate::access::{Action, Role};
use crate::error::{DomainError, RepositoryError};
use crate::ids::UserId;
use crate::project::domain::{Project, ProjectId, ProjectMembership};
use crate::project::ports::ProjectRepository;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Request payload for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectRequest {
    title: String,
    description: Option<String>,
    created_by: UserId,
}

impl CreateProjectRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(title: impl Into<String>, created_by: UserId) -> Self {
        Self {
            title: title.into(),
            description: None,
            created_by,
        }
    }

    /// Sets the project description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Service-level errors for project lifecycle operations.
#[derive(Debug, Error)]
pub enum ProjectServiceError {
    /// Domain validation or state-machine precondition failed.
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result type for project service operations.
pub type ProjectServiceResult<T> = Result<T, ProjectServiceError>;

/// Project lifecycle orchestration service.
#[derive(Clone)]
pub struct ProjectService<R, C>
where
    R: ProjectRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> ProjectService<R, C>
where
    R: ProjectRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new project lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates a project and grants the creator Owner membership.
    ///
    /// The project row and the Owner grant are persisted in one transaction:
    /// creation never leaves an owner-less project behind.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for an empty title, or a
    /// repository error when persistence fails.
    pub async fn create(&self, request: CreateProjectRequest) -> ProjectServiceResult<Project> {
        let project = Project::new(
            request.title,
            request.description,
            request.created_by,
            &*self.clock,
        )?;
        self.repository
            .store_with_owner(&project, request.created_by)
            .await?;
        info!(project = %project.id(), owner = %request.created_by, "project created");
        Ok(project)
    }

    /// Retrieves a project by identifier.
    ///
    /// Returns `Ok(None)` when the project does not exist.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the lookup fails.
    pub async fn find_by_id(&self, id: ProjectId) -> ProjectServiceResult<Option<Project>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Reactivates an inactive project.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] when the project is already
    /// active or archived.
    pub async fn activate(&self, id: ProjectId) -> ProjectServiceResult<Project> {
        self.mutate(id, |project| project.activate(&*self.clock))
            .await
    }

    /// Pauses an active project.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] unless the project is
    /// active.
    pub async fn deactivate(&self, id: ProjectId) -> ProjectServiceResult<Project> {
        self.mutate(id, |project| project.deactivate(&*self.clock))
            .await
    }

    /// Archives the project.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidArgument`] when the project is already
    /// archived.
    pub async fn archive(&self, id: ProjectId) -> ProjectServiceResult<Project> {
        self.mutate(id, |project| project.archive(&*self.clock))
            .await
    }

    /// Restores an archived project into the inactive state.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] unless the project is
    /// archived.
    pub async fn unarchive(&self, id: ProjectId) -> ProjectServiceResult<Project> {
        self.mutate(id, |project| project.unarchive(&*self.clock))
            .await
    }

    /// Replaces the project title.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the project is missing or persistence
    /// fails.
    pub async fn update_title(
        &self,
        id: ProjectId,
        title: impl Into<String> + Send,
    ) -> ProjectServiceResult<Project> {
        let title = title.into();
        self.mutate(id, |project| {
            project.update_title(title, &*self.clock);
            Ok(())
        })
        .await
    }

    /// Replaces the project description.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the project is missing or persistence
    /// fails.
    pub async fn update_description(
        &self,
        id: ProjectId,
        description: impl Into<String> + Send,
    ) -> ProjectServiceResult<Project> {
        let description = description.into();
        self.mutate(id, |project| {
            project.update_description(description, &*self.clock);
            Ok(())
        })
        .await
    }

    /// Sets the start date to the current clock time.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the project is missing or persistence
    /// fails.
    pub async fn start(&self, id: ProjectId) -> ProjectServiceResult<Project> {
        self.mutate(id, |project| {
            project.start(&*self.clock);
            Ok(())
        })
        .await
    }

    /// Sets the start date to the given timestamp, past or future.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the project is missing or persistence
    /// fails.
    pub async fn start_from(
        &self,
        id: ProjectId,
        from: DateTime<Utc>,
    ) -> ProjectServiceResult<Project> {
        self.mutate(id, |project| {
            project.start_from(from, &*self.clock);
            Ok(())
        })
        .await
    }

    /// Sets the end date to the current clock time.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] when no start date is set.
    pub async fn end(&self, id: ProjectId) -> ProjectServiceResult<Project> {
        self.mutate(id, |project| project.end(&*self.clock)).await
    }

    /// Sets the end date to the given timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] when no start date is set or
    /// the end date precedes it.
    pub async fn end_on(&self, id: ProjectId, on: DateTime<Utc>) -> ProjectServiceResult<Project> {
        self.mutate(id, |project| project.end_on(on, &*self.clock))
            .await
    }

    /// Grants the Owner role on the project.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the project is missing or persistence
    /// fails.
    pub async fn add_owner(
        &self,
        id: ProjectId,
        user: UserId,
    ) -> ProjectServiceResult<ProjectMembership> {
        self.grant(id, user, Role::Owner).await
    }

    /// Grants the Participant role on the project.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the project is missing or persistence
    /// fails.
    pub async fn add_participant(
        &self,
        id: ProjectId,
        user: UserId,
    ) -> ProjectServiceResult<ProjectMembership> {
        self.grant(id, user, Role::Participant).await
    }

    /// Grants the Guest role on the project.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the project is missing or persistence
    /// fails.
    pub async fn add_guest(
        &self,
        id: ProjectId,
        user: UserId,
    ) -> ProjectServiceResult<ProjectMembership> {
        self.grant(id, user, Role::Guest).await
    }

    /// Removes a user's membership from the project.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] when the user holds no
    /// membership on the project.
    pub async fn remove_user(&self, id: ProjectId, user: UserId) -> ProjectServiceResult<()> {
        match self.repository.remove_membership(id, user).await {
            Ok(()) => {
                debug!(project = %id, user = %user, "membership removed");
                Ok(())
            }
            Err(RepositoryError::MembershipNotFound(_)) => Err(DomainError::InvalidOperation(
                format!("user {user} is not a member of project {id}"),
            )
            .into()),
            Err(err) => Err(err.into()),
        }
    }

    /// Returns the role `user` holds on the project, or `None`.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the lookup fails.
    pub async fn find_access_for(
        &self,
        id: ProjectId,
        user: UserId,
    ) -> ProjectServiceResult<Option<Role>> {
        Ok(self.repository.access_for(id, user).await?)
    }

    /// Returns whether `user` may perform `action` on the project.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the lookup fails.
    pub async fn has_access(
        &self,
        id: ProjectId,
        user: UserId,
        action: Action,
    ) -> ProjectServiceResult<bool> {
        Ok(self.repository.has_access(id, user, action).await?)
    }

    /// Returns every membership row for the project.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the lookup fails.
    pub async fn memberships(&self, id: ProjectId) -> ProjectServiceResult<Vec<ProjectMembership>> {
        Ok(self.repository.memberships_for(id).await?)
    }

    /// Returns the members holding the Owner role.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the lookup fails.
    pub async fn owners(&self, id: ProjectId) -> ProjectServiceResult<Vec<ProjectMembership>> {
        self.members_with_role(id, Role::Owner).await
    }

    /// Returns the members holding the Participant role.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the lookup fails.
    pub async fn participants(
        &self,
        id: ProjectId,
    ) -> ProjectServiceResult<Vec<ProjectMembership>> {
        self.members_with_role(id, Role::Participant).await
    }

    /// Returns the members holding the Guest role.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the lookup fails.
    pub async fn guests(&self, id: ProjectId) -> ProjectServiceResult<Vec<ProjectMembership>> {
        self.members_with_role(id, Role::Guest).await
    }

    async fn members_with_role(
        &self,
        id: ProjectId,
        role: Role,
    ) -> ProjectServiceResult<Vec<ProjectMembership>> {
        let memberships = self.repository.memberships_for(id).await?;
        Ok(memberships
            .into_iter()
            .filter(|membership| membership.role() == role)
            .collect())
    }

    async fn grant(
        &self,
        id: ProjectId,
        user: UserId,
        role: Role,
    ) -> ProjectServiceResult<ProjectMembership> {
        self.ensure_exists(id).await?;
        let membership = self.repository.set_role(id, user, role).await?;
        debug!(project = %id, user = %user, role = %role, "membership granted");
        Ok(membership)
    }

    async fn ensure_exists(&self, id: ProjectId) -> ProjectServiceResult<()> {
        if self.repository.find_by_id(id).await?.is_none() {
            return Err(RepositoryError::ProjectNotFound(id).into());
        }
        Ok(())
    }

    /// Loads the project, applies the mutation, and persists the result.
    ///
    /// A failed precondition propagates before any write happens, so state is
    /// left untouched.
    async fn mutate<F>(&self, id: ProjectId, f: F) -> ProjectServiceResult<Project>
    where
        F: FnOnce(&mut Project) -> Result<(), DomainError> + Send,
    {
        let mut project = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(RepositoryError::ProjectNotFound(id))?;
        f(&mut project)?;
        self.repository.update(&project).await?;
        debug!(project = %id, state = %project.state().as_str(), "project updated");
        Ok(project)
    }
}
