//! Diesel row models for task persistence.

use super::schema::{task_memberships, task_relations, tasks};
use crate::access::Role;
use crate::error::{RepositoryError, RepositoryResult};
use crate::ids::UserId;
use crate::membership::Membership;
use crate::project::domain::ProjectId;
use crate::task::domain::{
    PersistedTaskData, RelationKind, Task, TaskId, TaskMembership, TaskRelation, TaskState,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Owning project identifier.
    pub project_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Estimated effort in hours.
    pub estimated_hours: i32,
    /// Hours spent so far.
    pub hours_spent: i32,
    /// Lifecycle state.
    pub state: String,
    /// Optional start date.
    pub started_on: Option<DateTime<Utc>>,
    /// Optional end date.
    pub ended_on: Option<DateTime<Utc>>,
    /// Optional due date.
    pub due_on: Option<DateTime<Utc>>,
    /// Authoring user, if not deleted.
    pub author: Option<uuid::Uuid>,
    /// Assigned user, if any.
    pub assignee: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for task records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskRecord {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Owning project identifier.
    pub project_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Estimated effort in hours.
    pub estimated_hours: i32,
    /// Hours spent so far.
    pub hours_spent: i32,
    /// Lifecycle state.
    pub state: String,
    /// Optional start date.
    pub started_on: Option<DateTime<Utc>>,
    /// Optional end date.
    pub ended_on: Option<DateTime<Utc>>,
    /// Optional due date.
    pub due_on: Option<DateTime<Utc>>,
    /// Authoring user, if not deleted.
    pub author: Option<uuid::Uuid>,
    /// Assigned user, if any.
    pub assignee: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    /// Builds the storage record for a task aggregate.
    #[must_use]
    pub fn from_domain(task: &Task) -> Self {
        Self {
            id: task.id().into_inner(),
            project_id: task.project().into_inner(),
            title: task.title().to_owned(),
            description: task.description().map(str::to_owned),
            estimated_hours: task.estimated_hours(),
            hours_spent: task.hours_spent(),
            state: task.state().as_str().to_owned(),
            started_on: task.started_on(),
            ended_on: task.ended_on(),
            due_on: task.due_on(),
            author: task.author().map(UserId::into_inner),
            assignee: task.assignee().map(UserId::into_inner),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

/// Query and insert model for membership rows.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_memberships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskMembershipRow {
    /// Owning task identifier.
    pub task_id: uuid::Uuid,
    /// Member user identifier.
    pub user_id: uuid::Uuid,
    /// Granted role.
    pub role: String,
}

impl TaskMembershipRow {
    /// Builds the storage row for a membership.
    #[must_use]
    pub fn from_domain(membership: &TaskMembership) -> Self {
        Self {
            task_id: membership.entity().into_inner(),
            user_id: membership.user().into_inner(),
            role: membership.role().as_str().to_owned(),
        }
    }
}

/// Query and insert model for relation edges.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_relations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRelationRow {
    /// Source task identifier.
    pub source_id: uuid::Uuid,
    /// Target task identifier.
    pub target_id: uuid::Uuid,
    /// Relation kind tag.
    pub kind: String,
}

impl TaskRelationRow {
    /// Builds the storage row for a relation edge.
    #[must_use]
    pub fn from_domain(relation: &TaskRelation) -> Self {
        Self {
            source_id: relation.source().into_inner(),
            target_id: relation.target().into_inner(),
            kind: relation.kind().as_str().to_owned(),
        }
    }
}

/// Converts a stored row back into the task aggregate.
pub fn row_to_task(row: TaskRow) -> RepositoryResult<Task> {
    let state = TaskState::try_from(row.state.as_str()).map_err(RepositoryError::persistence)?;
    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        project: ProjectId::from_uuid(row.project_id),
        title: row.title,
        description: row.description,
        estimated_hours: row.estimated_hours,
        hours_spent: row.hours_spent,
        state,
        started_on: row.started_on,
        ended_on: row.ended_on,
        due_on: row.due_on,
        author: row.author.map(UserId::from_uuid),
        assignee: row.assignee.map(UserId::from_uuid),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

/// Converts a stored membership row back into the domain value.
pub fn row_to_membership(row: &TaskMembershipRow) -> RepositoryResult<TaskMembership> {
    let role = Role::try_from(row.role.as_str()).map_err(RepositoryError::persistence)?;
    Ok(Membership::new(
        TaskId::from_uuid(row.task_id),
        UserId::from_uuid(row.user_id),
        role,
    ))
}

/// Converts a stored relation row back into the domain value.
pub fn row_to_relation(row: &TaskRelationRow) -> RepositoryResult<TaskRelation> {
    let kind = RelationKind::try_from(row.kind.as_str()).map_err(RepositoryError::persistence)?;
    Ok(TaskRelation::from_persisted(
        TaskId::from_uuid(row.source_id),
        TaskId::from_uuid(row.target_id),
        kind,
    ))
}
