//! `PostgreSQL` repository implementation for project lifecycle storage.

use super::{
    models::{ProjectMembershipRow, ProjectRecord, ProjectRow, row_to_membership, row_to_project},
    schema::{project_memberships, projects},
};
use crate::access::Role;
use crate::error::{RepositoryError, RepositoryResult};
use crate::ids::UserId;
use crate::membership::{Membership, MembershipStore};
use crate::project::domain::{Project, ProjectId, ProjectMembership};
use crate::project::ports::ProjectRepository;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by project adapters.
pub type ProjectPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed project repository.
#[derive(Debug, Clone)]
pub struct PostgresProjectRepository {
    pool: ProjectPgPool,
}

impl PostgresProjectRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ProjectPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> RepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(RepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(RepositoryError::persistence)?
    }
}

fn upsert_membership(
    connection: &mut PgConnection,
    row: &ProjectMembershipRow,
) -> RepositoryResult<()> {
    // ON CONFLICT keeps the upsert race-free: concurrent writers for the same
    // (project, user) pair serialize on the row and the last writer wins.
    diesel::insert_into(project_memberships::table)
        .values(row)
        .on_conflict((
            project_memberships::project_id,
            project_memberships::user_id,
        ))
        .do_update()
        .set(project_memberships::role.eq(&row.role))
        .execute(connection)
        .map_err(RepositoryError::persistence)?;
    Ok(())
}

#[async_trait]
impl MembershipStore<ProjectId> for PostgresProjectRepository {
    async fn find_membership(
        &self,
        entity: ProjectId,
        user: UserId,
    ) -> RepositoryResult<Option<ProjectMembership>> {
        self.run_blocking(move |connection| {
            let row = project_memberships::table
                .find((entity.into_inner(), user.into_inner()))
                .select(ProjectMembershipRow::as_select())
                .first::<ProjectMembershipRow>(connection)
                .optional()
                .map_err(RepositoryError::persistence)?;
            row.as_ref().map(row_to_membership).transpose()
        })
        .await
    }

    async fn set_role(
        &self,
        entity: ProjectId,
        user: UserId,
        role: Role,
    ) -> RepositoryResult<ProjectMembership> {
        let membership = Membership::new(entity, user, role);
        let row = ProjectMembershipRow::from_domain(&membership);
        self.run_blocking(move |connection| {
            upsert_membership(connection, &row)?;
            Ok(membership)
        })
        .await
    }

    async fn remove_membership(&self, entity: ProjectId, user: UserId) -> RepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                project_memberships::table.find((entity.into_inner(), user.into_inner())),
            )
            .execute(connection)
            .map_err(RepositoryError::persistence)?;
            if deleted == 0 {
                return Err(RepositoryError::MembershipNotFound(user));
            }
            Ok(())
        })
        .await
    }

    async fn memberships_for(&self, entity: ProjectId) -> RepositoryResult<Vec<ProjectMembership>> {
        self.run_blocking(move |connection| {
            let rows = project_memberships::table
                .filter(project_memberships::project_id.eq(entity.into_inner()))
                .select(ProjectMembershipRow::as_select())
                .load::<ProjectMembershipRow>(connection)
                .map_err(RepositoryError::persistence)?;
            rows.iter().map(row_to_membership).collect()
        })
        .await
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn store_with_owner(&self, project: &Project, owner: UserId) -> RepositoryResult<()> {
        let project_id = project.id();
        let record = ProjectRecord::from_domain(project);
        let owner_row =
            ProjectMembershipRow::from_domain(&Membership::new(project_id, owner, Role::Owner));

        self.run_blocking(move |connection| {
            connection.transaction::<_, RepositoryError, _>(|tx_conn| {
                diesel::insert_into(projects::table)
                    .values(&record)
                    .execute(tx_conn)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            RepositoryError::DuplicateProject(project_id)
                        }
                        _ => RepositoryError::persistence(err),
                    })?;
                upsert_membership(tx_conn, &owner_row)?;
                Ok(())
            })
        })
        .await
    }

    async fn update(&self, project: &Project) -> RepositoryResult<()> {
        let project_id = project.id();
        let record = ProjectRecord::from_domain(project);
        self.run_blocking(move |connection| {
            let updated = diesel::update(projects::table.find(project_id.into_inner()))
                .set(&record)
                .execute(connection)
                .map_err(RepositoryError::persistence)?;
            if updated == 0 {
                return Err(RepositoryError::ProjectNotFound(project_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: ProjectId) -> RepositoryResult<Option<Project>> {
        self.run_blocking(move |connection| {
            let row = projects::table
                .find(id.into_inner())
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()
                .map_err(RepositoryError::persistence)?;
            row.map(row_to_project).transpose()
        })
        .await
    }
}
