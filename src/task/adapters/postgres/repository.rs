//! `PostgreSQL` repository implementation for task lifecycle storage.

use super::{
    models::{
        TaskMembershipRow, TaskRecord, TaskRelationRow, TaskRow, row_to_membership,
        row_to_relation, row_to_task,
    },
    schema::{task_memberships, task_relations, tasks},
};
use crate::access::Role;
use crate::error::{RepositoryError, RepositoryResult};
use crate::ids::UserId;
use crate::membership::{Membership, MembershipStore};
use crate::project::domain::ProjectId;
use crate::task::domain::{Task, TaskId, TaskMembership, TaskRelation};
use crate::task::ports::TaskRepository;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
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
    row: &TaskMembershipRow,
) -> RepositoryResult<()> {
    // ON CONFLICT keeps the upsert race-free: concurrent writers for the same
    // (task, user) pair serialize on the row and the last writer wins.
    diesel::insert_into(task_memberships::table)
        .values(row)
        .on_conflict((task_memberships::task_id, task_memberships::user_id))
        .do_update()
        .set(task_memberships::role.eq(&row.role))
        .execute(connection)
        .map_err(RepositoryError::persistence)?;
    Ok(())
}

fn insert_edge(connection: &mut PgConnection, row: &TaskRelationRow) -> RepositoryResult<()> {
    // get-or-create: the composite primary key makes re-insertion a no-op.
    diesel::insert_into(task_relations::table)
        .values(row)
        .on_conflict_do_nothing()
        .execute(connection)
        .map_err(RepositoryError::persistence)?;
    Ok(())
}

fn delete_edge(connection: &mut PgConnection, row: &TaskRelationRow) -> RepositoryResult<()> {
    diesel::delete(task_relations::table.find((row.source_id, row.target_id, row.kind.clone())))
        .execute(connection)
        .map_err(RepositoryError::persistence)?;
    Ok(())
}

#[async_trait]
impl MembershipStore<TaskId> for PostgresTaskRepository {
    async fn find_membership(
        &self,
        entity: TaskId,
        user: UserId,
    ) -> RepositoryResult<Option<TaskMembership>> {
        self.run_blocking(move |connection| {
            let row = task_memberships::table
                .find((entity.into_inner(), user.into_inner()))
                .select(TaskMembershipRow::as_select())
                .first::<TaskMembershipRow>(connection)
                .optional()
                .map_err(RepositoryError::persistence)?;
            row.as_ref().map(row_to_membership).transpose()
        })
        .await
    }

    async fn set_role(
        &self,
        entity: TaskId,
        user: UserId,
        role: Role,
    ) -> RepositoryResult<TaskMembership> {
        let membership = Membership::new(entity, user, role);
        let row = TaskMembershipRow::from_domain(&membership);
        self.run_blocking(move |connection| {
            upsert_membership(connection, &row)?;
            Ok(membership)
        })
        .await
    }

    async fn remove_membership(&self, entity: TaskId, user: UserId) -> RepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                task_memberships::table.find((entity.into_inner(), user.into_inner())),
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

    async fn memberships_for(&self, entity: TaskId) -> RepositoryResult<Vec<TaskMembership>> {
        self.run_blocking(move |connection| {
            let rows = task_memberships::table
                .filter(task_memberships::task_id.eq(entity.into_inner()))
                .select(TaskMembershipRow::as_select())
                .load::<TaskMembershipRow>(connection)
                .map_err(RepositoryError::persistence)?;
            rows.iter().map(row_to_membership).collect()
        })
        .await
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store_with_memberships(
        &self,
        task: &Task,
        memberships: &[TaskMembership],
    ) -> RepositoryResult<()> {
        let task_id = task.id();
        let record = TaskRecord::from_domain(task);
        let membership_rows: Vec<TaskMembershipRow> = memberships
            .iter()
            .map(TaskMembershipRow::from_domain)
            .collect();

        self.run_blocking(move |connection| {
            connection.transaction::<_, RepositoryError, _>(|tx_conn| {
                diesel::insert_into(tasks::table)
                    .values(&record)
                    .execute(tx_conn)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            RepositoryError::DuplicateTask(task_id)
                        }
                        _ => RepositoryError::persistence(err),
                    })?;
                for row in &membership_rows {
                    upsert_membership(tx_conn, row)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn update(&self, task: &Task) -> RepositoryResult<()> {
        let task_id = task.id();
        let record = TaskRecord::from_domain(task);
        self.run_blocking(move |connection| {
            let updated = diesel::update(tasks::table.find(task_id.into_inner()))
                .set(&record)
                .execute(connection)
                .map_err(RepositoryError::persistence)?;
            if updated == 0 {
                return Err(RepositoryError::TaskNotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(RepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_by_project(&self, project: ProjectId) -> RepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::project_id.eq(project.into_inner()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(RepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn add_relation_pair(&self, relation: TaskRelation) -> RepositoryResult<TaskRelation> {
        let edge = TaskRelationRow::from_domain(&relation);
        let inverse = TaskRelationRow::from_domain(&relation.inverse());
        self.run_blocking(move |connection| {
            // Both directions commit together or the transaction rolls back.
            connection.transaction::<_, RepositoryError, _>(|tx_conn| {
                insert_edge(tx_conn, &edge)?;
                insert_edge(tx_conn, &inverse)?;
                Ok(())
            })?;
            Ok(relation)
        })
        .await
    }

    async fn remove_relation_pair(&self, relation: TaskRelation) -> RepositoryResult<()> {
        let edge = TaskRelationRow::from_domain(&relation);
        let inverse = TaskRelationRow::from_domain(&relation.inverse());
        self.run_blocking(move |connection| {
            connection.transaction::<_, RepositoryError, _>(|tx_conn| {
                delete_edge(tx_conn, &edge)?;
                delete_edge(tx_conn, &inverse)?;
                Ok(())
            })
        })
        .await
    }

    async fn relations_for(&self, task: TaskId) -> RepositoryResult<Vec<TaskRelation>> {
        self.run_blocking(move |connection| {
            let rows = task_relations::table
                .filter(task_relations::source_id.eq(task.into_inner()))
                .select(TaskRelationRow::as_select())
                .load::<TaskRelationRow>(connection)
                .map_err(RepositoryError::persistence)?;
            rows.iter().map(row_to_relation).collect()
        })
        .await
    }
}
