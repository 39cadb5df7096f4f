//! In-memory repository for task lifecycle and relation-graph tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::access::Role;
use crate::error::{RepositoryError, RepositoryResult};
use crate::ids::UserId;
use crate::membership::MembershipStore;
use crate::project::domain::ProjectId;
use crate::task::domain::{Task, TaskId, TaskMembership, TaskRelation};
use crate::task::ports::TaskRepository;

/// Thread-safe in-memory task repository.
///
/// A single write lock serializes every mutation, which makes the membership
/// upsert race-free and relation pairing atomic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    memberships: HashMap<(TaskId, UserId), TaskMembership>,
    relations: HashSet<TaskRelation>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> RepositoryResult<std::sync::RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state
            .read()
            .map_err(|err| RepositoryError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write_state(&self) -> RepositoryResult<std::sync::RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state
            .write()
            .map_err(|err| RepositoryError::persistence(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl MembershipStore<TaskId> for InMemoryTaskRepository {
    async fn find_membership(
        &self,
        entity: TaskId,
        user: UserId,
    ) -> RepositoryResult<Option<TaskMembership>> {
        let state = self.read_state()?;
        Ok(state.memberships.get(&(entity, user)).copied())
    }

    async fn set_role(
        &self,
        entity: TaskId,
        user: UserId,
        role: Role,
    ) -> RepositoryResult<TaskMembership> {
        let mut state = self.write_state()?;
        let membership = state
            .memberships
            .entry((entity, user))
            .and_modify(|existing| existing.set_role(role))
            .or_insert_with(|| TaskMembership::new(entity, user, role));
        Ok(*membership)
    }

    async fn remove_membership(&self, entity: TaskId, user: UserId) -> RepositoryResult<()> {
        let mut state = self.write_state()?;
        state
            .memberships
            .remove(&(entity, user))
            .map(|_| ())
            .ok_or(RepositoryError::MembershipNotFound(user))
    }

    async fn memberships_for(&self, entity: TaskId) -> RepositoryResult<Vec<TaskMembership>> {
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
impl TaskRepository for InMemoryTaskRepository {
    async fn store_with_memberships(
        &self,
        task: &Task,
        memberships: &[TaskMembership],
    ) -> RepositoryResult<()> {
        let mut state = self.write_state()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(RepositoryError::DuplicateTask(task.id()));
        }

        // All writes happen under the same lock: the task and its grants
        // appear together or not at all.
        state.tasks.insert(task.id(), task.clone());
        for membership in memberships {
            state
                .memberships
                .insert((membership.entity(), membership.user()), *membership);
        }
        Ok(())
    }

    async fn update(&self, task: &Task) -> RepositoryResult<()> {
        let mut state = self.write_state()?;
        if !state.tasks.contains_key(&task.id()) {
            return Err(RepositoryError::TaskNotFound(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>> {
        let state = self.read_state()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_by_project(&self, project: ProjectId) -> RepositoryResult<Vec<Task>> {
        let state = self.read_state()?;
        Ok(state
            .tasks
            .values()
            .filter(|task| task.project() == project)
            .cloned()
            .collect())
    }

    async fn add_relation_pair(&self, relation: TaskRelation) -> RepositoryResult<TaskRelation> {
        let mut state = self.write_state()?;
        // HashSet insertion is the get-or-create: re-adding an identical edge
        // is a no-op, and both directions go in under one lock.
        state.relations.insert(relation);
        state.relations.insert(relation.inverse());
        Ok(relation)
    }

    async fn remove_relation_pair(&self, relation: TaskRelation) -> RepositoryResult<()> {
        let mut state = self.write_state()?;
        state.relations.remove(&relation);
        state.relations.remove(&relation.inverse());
        Ok(())
    }

    async fn relations_for(&self, task: TaskId) -> RepositoryResult<Vec<TaskRelation>> {
        let state = self.read_state()?;
        Ok(state
            .relations
            .iter()
            .filter(|relation| relation.source() == task)
            .copied()
            .collect())
    }
}
