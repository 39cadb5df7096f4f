//! Service layer for task creation, lifecycle, membership, and relations.

use crate::access::{Action, Role};
use crate::error::{DomainError, RepositoryError};
use crate::ids::UserId;
use crate::project::domain::ProjectId;
use crate::project::ports::ProjectRepository;
use crate::task::domain::{
    NewTaskData, RelationKind, Task, TaskId, TaskMembership, TaskRelation,
};
use crate::task::ports::TaskRepository;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    project: ProjectId,
    author: UserId,
    title: String,
    description: Option<String>,
    estimated_hours: i32,
    assignee: Option<UserId>,
    due_on: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(project: ProjectId, author: UserId, title: impl Into<String>) -> Self {
        Self {
            project,
            author,
            title: title.into(),
            description: None,
            estimated_hours: 0,
            assignee: None,
            due_on: None,
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the estimated effort in hours.
    #[must_use]
    pub const fn with_estimated_hours(mut self, hours: i32) -> Self {
        self.estimated_hours = hours;
        self
    }

    /// Sets the assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_on(mut self, due_on: DateTime<Utc>) -> Self {
        self.due_on = Some(due_on);
        self
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// Domain validation, permission, or state-machine precondition failed.
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Task lifecycle orchestration service.
///
/// Holds both repositories: task creation checks project-level permission,
/// and membership grants may spill over into the project registry.
#[derive(Clone)]
pub struct TaskService<R, P, C>
where
    R: TaskRepository,
    P: ProjectRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<R>,
    projects: Arc<P>,
    clock: Arc<C>,
}

impl<R, P, C> TaskService<R, P, C>
where
    R: TaskRepository,
    P: ProjectRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(tasks: Arc<R>, projects: Arc<P>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            projects,
            clock,
        }
    }

    /// Creates a task under a project.
    ///
    /// The author must hold a project role permitting task creation. On
    /// success the author receives Owner membership on the task; an assignee
    /// differing from the author receives Participant membership on the task
    /// and, when they hold no project membership yet, Participant membership
    /// on the project as well.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::PermissionDenied`] when the author may not add
    /// tasks, [`DomainError::Validation`] for an empty title or negative
    /// estimate, or a repository error when persistence fails.
    pub async fn create(&self, request: CreateTaskRequest) -> TaskServiceResult<Task> {
        if self.projects.find_by_id(request.project).await?.is_none() {
            return Err(RepositoryError::ProjectNotFound(request.project).into());
        }
        if !self
            .projects
            .has_access(request.project, request.author, Action::AddTask)
            .await?
        {
            return Err(DomainError::PermissionDenied(Action::AddTask).into());
        }

        let task = Task::new(
            NewTaskData {
                project: request.project,
                title: request.title,
                description: request.description,
                estimated_hours: request.estimated_hours,
                author: request.author,
                assignee: request.assignee,
                due_on: request.due_on,
            },
            &*self.clock,
        )?;

        let mut memberships = vec![TaskMembership::new(task.id(), request.author, Role::Owner)];
        if let Some(assignee) = request.assignee
            && assignee != request.author
        {
            if self
                .projects
                .access_for(request.project, assignee)
                .await?
                .is_none()
            {
                self.projects
                    .add_participant(request.project, assignee)
                    .await?;
            }
            memberships.push(TaskMembership::new(
                task.id(),
                assignee,
                Role::Participant,
            ));
        }

        self.tasks.store_with_memberships(&task, &memberships).await?;
        info!(task = %task.id(), project = %request.project, author = %request.author, "task created");
        Ok(task)
    }

    /// Retrieves a task by identifier.
    ///
    /// Returns `Ok(None)` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the lookup fails.
    pub async fn find_by_id(&self, id: TaskId) -> TaskServiceResult<Option<Task>> {
        Ok(self.tasks.find_by_id(id).await?)
    }

    /// Returns every task under the given project.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the lookup fails.
    pub async fn find_by_project(&self, project: ProjectId) -> TaskServiceResult<Vec<Task>> {
        Ok(self.tasks.find_by_project(project).await?)
    }

    /// Marks the task as blocked.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] when the task is already
    /// blocked, closed, or archived.
    pub async fn block(&self, id: TaskId) -> TaskServiceResult<Task> {
        self.mutate(id, |task| task.block(&*self.clock)).await
    }

    /// Reopens a blocked task.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] unless the task is blocked.
    pub async fn unblock(&self, id: TaskId) -> TaskServiceResult<Task> {
        self.mutate(id, |task| task.unblock(&*self.clock)).await
    }

    /// Puts an opened task up for review.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] unless the task is opened.
    pub async fn request_review(&self, id: TaskId) -> TaskServiceResult<Task> {
        self.mutate(id, |task| task.request_review(&*self.clock))
            .await
    }

    /// Closes the task.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] when the task is already
    /// closed or archived.
    pub async fn close(&self, id: TaskId) -> TaskServiceResult<Task> {
        self.mutate(id, |task| task.close(&*self.clock)).await
    }

    /// Reopens a closed task.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] unless the task is closed.
    pub async fn reopen(&self, id: TaskId) -> TaskServiceResult<Task> {
        self.mutate(id, |task| task.reopen(&*self.clock)).await
    }

    /// Archives the task.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidArgument`] when the task is already
    /// archived.
    pub async fn archive(&self, id: TaskId) -> TaskServiceResult<Task> {
        self.mutate(id, |task| task.archive(&*self.clock)).await
    }

    /// Restores an archived task into the opened state.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] unless the task is archived.
    pub async fn unarchive(&self, id: TaskId) -> TaskServiceResult<Task> {
        self.mutate(id, |task| task.unarchive(&*self.clock)).await
    }

    /// Records additional hours spent on the task.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidArgument`] when `hours` is negative.
    pub async fn log_hours(&self, id: TaskId, hours: i32) -> TaskServiceResult<Task> {
        self.mutate(id, |task| task.log_hours(hours, &*self.clock))
            .await
    }

    /// Replaces the task title.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the task is missing or persistence
    /// fails.
    pub async fn update_title(
        &self,
        id: TaskId,
        title: impl Into<String> + Send,
    ) -> TaskServiceResult<Task> {
        let title = title.into();
        self.mutate(id, |task| {
            task.update_title(title, &*self.clock);
            Ok(())
        })
        .await
    }

    /// Replaces the task description.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the task is missing or persistence
    /// fails.
    pub async fn update_description(
        &self,
        id: TaskId,
        description: impl Into<String> + Send,
    ) -> TaskServiceResult<Task> {
        let description = description.into();
        self.mutate(id, |task| {
            task.update_description(description, &*self.clock);
            Ok(())
        })
        .await
    }

    /// Sets the start date to the current clock time.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the task is missing or persistence
    /// fails.
    pub async fn start(&self, id: TaskId) -> TaskServiceResult<Task> {
        self.mutate(id, |task| {
            task.start(&*self.clock);
            Ok(())
        })
        .await
    }

    /// Sets the start date to the given timestamp, past or future.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the task is missing or persistence
    /// fails.
    pub async fn start_from(&self, id: TaskId, from: DateTime<Utc>) -> TaskServiceResult<Task> {
        self.mutate(id, |task| {
            task.start_from(from, &*self.clock);
            Ok(())
        })
        .await
    }

    /// Sets the end date to the current clock time.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] when no start date is set.
    pub async fn end(&self, id: TaskId) -> TaskServiceResult<Task> {
        self.mutate(id, |task| task.end(&*self.clock)).await
    }

    /// Sets the end date to the given timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] when no start date is set or
    /// the end date precedes it.
    pub async fn end_on(&self, id: TaskId, on: DateTime<Utc>) -> TaskServiceResult<Task> {
        self.mutate(id, |task| task.end_on(on, &*self.clock)).await
    }

    /// Grants the Owner role on the task.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the task is missing or persistence
    /// fails.
    pub async fn add_owner(&self, id: TaskId, user: UserId) -> TaskServiceResult<TaskMembership> {
        self.grant(id, user, Role::Owner).await
    }

    /// Grants the Participant role on the task.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the task is missing or persistence
    /// fails.
    pub async fn add_participant(
        &self,
        id: TaskId,
        user: UserId,
    ) -> TaskServiceResult<TaskMembership> {
        self.grant(id, user, Role::Participant).await
    }

    /// Grants the Guest role on the task.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the task is missing or persistence
    /// fails.
    pub async fn add_guest(&self, id: TaskId, user: UserId) -> TaskServiceResult<TaskMembership> {
        self.grant(id, user, Role::Guest).await
    }

    /// Removes a user's membership from the task.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] when the user holds no
    /// membership on the task.
    pub async fn remove_user(&self, id: TaskId, user: UserId) -> TaskServiceResult<()> {
        match self.tasks.remove_membership(id, user).await {
            Ok(()) => {
                debug!(task = %id, user = %user, "membership removed");
                Ok(())
            }
            Err(RepositoryError::MembershipNotFound(_)) => Err(DomainError::InvalidOperation(
                format!("user {user} is not a member of task {id}"),
            )
            .into()),
            Err(err) => Err(err.into()),
        }
    }

    /// Returns the role `user` holds on the task, or `None`.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the lookup fails.
    pub async fn find_access_for(
        &self,
        id: TaskId,
        user: UserId,
    ) -> TaskServiceResult<Option<Role>> {
        Ok(self.tasks.access_for(id, user).await?)
    }

    /// Returns whether `user` may perform `action` on the task.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the lookup fails.
    pub async fn has_access(
        &self,
        id: TaskId,
        user: UserId,
        action: Action,
    ) -> TaskServiceResult<bool> {
        Ok(self.tasks.has_access(id, user, action).await?)
    }

    /// Returns every membership row for the task.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the lookup fails.
    pub async fn memberships(&self, id: TaskId) -> TaskServiceResult<Vec<TaskMembership>> {
        Ok(self.tasks.memberships_for(id).await?)
    }

    /// Returns the members holding the Owner role.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the lookup fails.
    pub async fn owners(&self, id: TaskId) -> TaskServiceResult<Vec<TaskMembership>> {
        self.members_with_role(id, Role::Owner).await
    }

    /// Returns the members holding the Participant role.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the lookup fails.
    pub async fn participants(&self, id: TaskId) -> TaskServiceResult<Vec<TaskMembership>> {
        self.members_with_role(id, Role::Participant).await
    }

    /// Returns the members holding the Guest role.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the lookup fails.
    pub async fn guests(&self, id: TaskId) -> TaskServiceResult<Vec<TaskMembership>> {
        self.members_with_role(id, Role::Guest).await
    }

    /// Links `source` to `target` with the given kind.
    ///
    /// The inverse counterpart edge is written in the same transaction, so
    /// both directions exist afterwards or neither does.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] for a self-relation, or a
    /// repository error when either task is missing or persistence fails.
    pub async fn add_relation(
        &self,
        source: TaskId,
        target: TaskId,
        kind: RelationKind,
    ) -> TaskServiceResult<TaskRelation> {
        let relation = TaskRelation::new(source, target, kind)?;
        self.ensure_exists(source).await?;
        self.ensure_exists(target).await?;
        let stored = self.tasks.add_relation_pair(relation).await?;
        debug!(source = %source, target = %target, kind = %kind, "relation added");
        Ok(stored)
    }

    /// Removes the edge `(source, kind, target)` and its inverse.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] for a self-relation, or a
    /// repository error when persistence fails.
    pub async fn remove_relation(
        &self,
        source: TaskId,
        target: TaskId,
        kind: RelationKind,
    ) -> TaskServiceResult<()> {
        let relation = TaskRelation::new(source, target, kind)?;
        self.tasks.remove_relation_pair(relation).await?;
        debug!(source = %source, target = %target, kind = %kind, "relation removed");
        Ok(())
    }

    /// Declares `other` a sub-task of `task`.
    ///
    /// # Errors
    ///
    /// Same contract as [`TaskService::add_relation`].
    pub async fn add_sub_task(
        &self,
        task: TaskId,
        other: TaskId,
    ) -> TaskServiceResult<TaskRelation> {
        self.add_relation(task, other, RelationKind::ParentOf).await
    }

    /// Declares `other` the parent of `task`.
    ///
    /// # Errors
    ///
    /// Same contract as [`TaskService::add_relation`].
    pub async fn add_parent_task(
        &self,
        task: TaskId,
        other: TaskId,
    ) -> TaskServiceResult<TaskRelation> {
        self.add_relation(task, other, RelationKind::SubOf).await
    }

    /// Relates `task` and `other` without further semantics.
    ///
    /// # Errors
    ///
    /// Same contract as [`TaskService::add_relation`].
    pub async fn add_related_task(
        &self,
        task: TaskId,
        other: TaskId,
    ) -> TaskServiceResult<TaskRelation> {
        self.add_relation(task, other, RelationKind::Related).await
    }

    /// Declares `task` blocked by `other`.
    ///
    /// # Errors
    ///
    /// Same contract as [`TaskService::add_relation`].
    pub async fn mark_blocked_by(
        &self,
        task: TaskId,
        other: TaskId,
    ) -> TaskServiceResult<TaskRelation> {
        self.add_relation(task, other, RelationKind::BlockedBy)
            .await
    }

    /// Declares `task` blocking `other`.
    ///
    /// # Errors
    ///
    /// Same contract as [`TaskService::add_relation`].
    pub async fn mark_blocking(
        &self,
        task: TaskId,
        other: TaskId,
    ) -> TaskServiceResult<TaskRelation> {
        self.add_relation(task, other, RelationKind::IsBlocking)
            .await
    }

    /// Returns the sub-tasks of `task`.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the lookup fails.
    pub async fn sub_tasks(&self, task: TaskId) -> TaskServiceResult<Vec<Task>> {
        self.related_by_kind(task, RelationKind::ParentOf).await
    }

    /// Returns the parent tasks of `task`.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the lookup fails.
    pub async fn parent_tasks(&self, task: TaskId) -> TaskServiceResult<Vec<Task>> {
        self.related_by_kind(task, RelationKind::SubOf).await
    }

    /// Returns the tasks related to `task` without further semantics.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the lookup fails.
    pub async fn just_related_tasks(&self, task: TaskId) -> TaskServiceResult<Vec<Task>> {
        self.related_by_kind(task, RelationKind::Related).await
    }

    /// Returns the tasks that `task` is blocking.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the lookup fails.
    pub async fn blocked_tasks(&self, task: TaskId) -> TaskServiceResult<Vec<Task>> {
        self.related_by_kind(task, RelationKind::IsBlocking).await
    }

    /// Returns the tasks blocking `task`.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the lookup fails.
    pub async fn blocked_by_tasks(&self, task: TaskId) -> TaskServiceResult<Vec<Task>> {
        self.related_by_kind(task, RelationKind::BlockedBy).await
    }

    async fn members_with_role(
        &self,
        id: TaskId,
        role: Role,
    ) -> TaskServiceResult<Vec<TaskMembership>> {
        let memberships = self.tasks.memberships_for(id).await?;
        Ok(memberships
            .into_iter()
            .filter(|membership| membership.role() == role)
            .collect())
    }

    async fn related_by_kind(
        &self,
        task: TaskId,
        kind: RelationKind,
    ) -> TaskServiceResult<Vec<Task>> {
        let relations = self.tasks.relations_for(task).await?;
        let mut related = Vec::new();
        for relation in relations
            .into_iter()
            .filter(|relation| relation.kind() == kind)
        {
            if let Some(found) = self.tasks.find_by_id(relation.target()).await? {
                related.push(found);
            }
        }
        Ok(related)
    }

    async fn grant(
        &self,
        id: TaskId,
        user: UserId,
        role: Role,
    ) -> TaskServiceResult<TaskMembership> {
        let task = self
            .tasks
            .find_by_id(id)
            .await?
            .ok_or(RepositoryError::TaskNotFound(id))?;

        // A first-time task member with no standing on the project becomes a
        // project participant, mirroring invite semantics.
        let is_new_member = self.tasks.find_membership(id, user).await?.is_none();
        if is_new_member
            && self
                .projects
                .access_for(task.project(), user)
                .await?
                .is_none()
        {
            self.projects.add_participant(task.project(), user).await?;
        }

        let membership = self.tasks.set_role(id, user, role).await?;
        debug!(task = %id, user = %user, role = %role, "membership granted");
        Ok(membership)
    }

    async fn ensure_exists(&self, id: TaskId) -> TaskServiceResult<()> {
        if self.tasks.find_by_id(id).await?.is_none() {
            return Err(RepositoryError::TaskNotFound(id).into());
        }
        Ok(())
    }

    /// Loads the task, applies the mutation, and persists the result.
    ///
    /// A failed precondition propagates before any write happens, so state is
    /// left untouched.
    async fn mutate<F>(&self, id: TaskId, f: F) -> TaskServiceResult<Task>
    where
        F: FnOnce(&mut Task) -> Result<(), DomainError> + Send,
    {
        let mut task = self
            .tasks
            .find_by_id(id)
            .await?
            .ok_or(RepositoryError::TaskNotFound(id))?;
        f(&mut task)?;
        self.tasks.update(&task).await?;
        debug!(task = %id, state = %task.state().as_str(), "task updated");
        Ok(task)
    }
}
