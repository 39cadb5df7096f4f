//! Diesel row models for project persistence.

use super::schema::{project_memberships, projects};
use crate::access::Role;
use crate::error::{RepositoryError, RepositoryResult};
use crate::ids::UserId;
use crate::membership::Membership;
use crate::project::domain::{
    PersistedProjectData, Project, ProjectId, ProjectMembership, ProjectState,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for project records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    /// Internal project identifier.
    pub id: uuid::Uuid,
    /// Project title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Lifecycle state.
    pub state: String,
    /// Optional start date.
    pub started_on: Option<DateTime<Utc>>,
    /// Optional end date.
    pub ended_on: Option<DateTime<Utc>>,
    /// Creating user, if not deleted.
    pub created_by: Option<uuid::Uuid>,
    /// Last editing user, if any.
    pub updated_by: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for project records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(treat_none_as_null = true)]
pub struct ProjectRecord {
    /// Internal project identifier.
    pub id: uuid::Uuid,
    /// Project title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Lifecycle state.
    pub state: String,
    /// Optional start date.
    pub started_on: Option<DateTime<Utc>>,
    /// Optional end date.
    pub ended_on: Option<DateTime<Utc>>,
    /// Creating user, if not deleted.
    pub created_by: Option<uuid::Uuid>,
    /// Last editing user, if any.
    pub updated_by: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ProjectRecord {
    /// Builds the storage record for a project aggregate.
    #[must_use]
    pub fn from_domain(project: &Project) -> Self {
        Self {
            id: project.id().into_inner(),
            title: project.title().to_owned(),
            description: project.description().map(str::to_owned),
            state: project.state().as_str().to_owned(),
            started_on: project.started_on(),
            ended_on: project.ended_on(),
            created_by: project.created_by().map(UserId::into_inner),
            updated_by: project.updated_by().map(UserId::into_inner),
            created_at: project.created_at(),
            updated_at: project.updated_at(),
        }
    }
}

/// Query and insert model for membership rows.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = project_memberships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectMembershipRow {
    /// Owning project identifier.
    pub project_id: uuid::Uuid,
    /// Member user identifier.
    pub user_id: uuid::Uuid,
    /// Granted role.
    pub role: String,
}

impl ProjectMembershipRow {
    /// Builds the storage row for a membership.
    #[must_use]
    pub fn from_domain(membership: &ProjectMembership) -> Self {
        Self {
            project_id: membership.entity().into_inner(),
            user_id: membership.user().into_inner(),
            role: membership.role().as_str().to_owned(),
        }
    }
}

/// Converts a stored row back into the project aggregate.
pub fn row_to_project(row: ProjectRow) -> RepositoryResult<Project> {
    let state = ProjectState::try_from(row.state.as_str()).map_err(RepositoryError::persistence)?;
    Ok(Project::from_persisted(PersistedProjectData {
        id: ProjectId::from_uuid(row.id),
        title: row.title,
        description: row.description,
        state,
        started_on: row.started_on,
        ended_on: row.ended_on,
        created_by: row.created_by.map(UserId::from_uuid),
        updated_by: row.updated_by.map(UserId::from_uuid),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

/// Converts a stored membership row back into the domain value.
pub fn row_to_membership(row: &ProjectMembershipRow) -> RepositoryResult<ProjectMembership> {
    let role = Role::try_from(row.role.as_str()).map_err(RepositoryError::persistence)?;
    Ok(Membership::new(
        ProjectId::from_uuid(row.project_id),
        UserId::from_uuid(row.user_id),
        role,
    ))
}
