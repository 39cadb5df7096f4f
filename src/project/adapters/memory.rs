//! In-memory repository for project lifecycle tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::access::Role;
use crate::error::{RepositoryError, RepositoryResult};
use crate::ids::UserId;
use crate::membership::MembershipStore;
use crate::project::domain::{Project, ProjectId, ProjectMembership};
use crate::project::ports::ProjectRepository;

/// Thread-safe in-memory project repository.
///
/// A single write lock serializes every mutation, which makes the membership
/// upsert race-free and the creation-with-owner write atomic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectRepository {
    state: Arc<RwLock<InMemoryProjectState>>,
}

#[derive(Debug, Default)]
struct InMemoryProjectState {
    projects: HashMap<ProjectId, Project>,
    memberships: HashMap<(ProjectId, UserId), ProjectMembership>,
}

impl InMemoryProjectRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> RepositoryResult<std::sync::RwLockReadGuard<'_, InMemoryProjectState>> {
        self.state
            .read()
            .map_err(|err| RepositoryError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write_state(
        &self,
    ) -> RepositoryResult<std::sync::RwLockWriteGuard<'_, InMemoryProjectState>> {
        self.state
            .write()
            .map_err(|err| RepositoryError::persistence(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl MembershipStore<ProjectId> for InMemoryProjectRepository {
    async fn find_membership(
        &self,
        entity: ProjectId,
        user: UserId,
    ) -> RepositoryResult<Option<ProjectMembership>> {
        let state = self.read_state()?;
        Ok(state.memberships.get(&(entity, user)).copied())
    }

    async fn set_role(
        &self,
        entity: ProjectId,
        user: UserId,
        role: Role,
    ) -> RepositoryResult<ProjectMembership> {
        let mut state = self.write_state()?;
        let membership = state
            .memberships
            .entry((entity, user))
            .and_modify(|existing| existing.set_role(role))
            .or_insert_with(|| ProjectMembership::new(entity, user, role));
        Ok(*membership)
    }

    async fn remove_membership(&self, entity: ProjectId, user: UserId) -> RepositoryResult<()> {
        let mut state = self.write_state()?;
        state
            .memberships
            .remove(&(entity, user))
            .map(|_| ())
            .ok_or(RepositoryError::MembershipNotFound(user))
    }

    async fn memberships_for(&self, entity: ProjectId) -> RepositoryResult<Vec<ProjectMembership>> {
        let state = self.read_state()?;
        Ok(state
            .memberships
            .values()
            .filter(|membership| membership.entity() == entity)
            .copied()
            .collect())
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn store_with_owner(&self, project: &Project, owner: UserId) -> RepositoryResult<()> {
        let mut state = self.write_state()?;
        if state.projects.contains_key(&project.id()) {
            return Err(RepositoryError::DuplicateProject(project.id()));
        }

        // Both writes happen under the same lock: no owner-less project is
        // ever observable.
        state.projects.insert(project.id(), project.clone());
        state.memberships.insert(
            (project.id(), owner),
            ProjectMembership::new(project.id(), owner, Role::Owner),
        );
        Ok(())
    }

    async fn update(&self, project: &Project) -> RepositoryResult<()> {
        let mut state = self.write_state()?;
        if !state.projects.contains_key(&project.id()) {
            return Err(RepositoryError::ProjectNotFound(project.id()));
        }
        state.projects.insert(project.id(), project.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ProjectId) -> RepositoryResult<Option<Project>> {
        let state = self.read_state()?;
        Ok(state.projects.get(&id).cloned())
    }
}
