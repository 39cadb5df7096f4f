//! Generic membership registry shared by the project and task contexts.
//!
//! A membership binds a user to an owning entity with a role. Projects and
//! tasks carry structurally identical registries, so the value type and the
//! store port are parameterized over the entity identifier and instantiated
//! per context.

use crate::access::{Action, Role, permits};
use crate::error::RepositoryResult;
use crate::ids::UserId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A role grant binding a user to an owning entity.
///
/// At most one membership exists per (entity, user) pair; re-granting a user
/// with a different role overwrites the role rather than duplicating the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Membership<E> {
    entity: E,
    user: UserId,
    role: Role,
}

impl<E: Copy> Membership<E> {
    /// Creates a membership granting `role` to `user` on `entity`.
    #[must_use]
    pub const fn new(entity: E, user: UserId, role: Role) -> Self {
        Self { entity, user, role }
    }

    /// Returns the owning entity identifier.
    #[must_use]
    pub const fn entity(&self) -> E {
        self.entity
    }

    /// Returns the member's user identifier.
    #[must_use]
    pub const fn user(&self) -> UserId {
        self.user
    }

    /// Returns the granted role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Overwrites the granted role.
    pub const fn set_role(&mut self, role: Role) {
        self.role = role;
    }
}

/// Registry port over (entity, user, role) rows.
///
/// Every mutating call persists immediately; implementations must serialize
/// concurrent upserts for the same (entity, user) pair so the last writer
/// wins without lost updates.
#[async_trait]
pub trait MembershipStore<E>: Send + Sync
where
    E: Copy + Send + Sync + 'static,
{
    /// Looks up the membership for `user` on `entity`.
    async fn find_membership(
        &self,
        entity: E,
        user: UserId,
    ) -> RepositoryResult<Option<Membership<E>>>;

    /// Idempotent upsert: overwrites the role of an existing membership or
    /// creates a new one, returning the resulting row.
    async fn set_role(
        &self,
        entity: E,
        user: UserId,
        role: Role,
    ) -> RepositoryResult<Membership<E>>;

    /// Deletes the membership for `user` on `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::MembershipNotFound`] when no membership row
    /// exists.
    ///
    /// [`RepositoryError::MembershipNotFound`]: crate::error::RepositoryError::MembershipNotFound
    async fn remove_membership(&self, entity: E, user: UserId) -> RepositoryResult<()>;

    /// Returns every membership row for `entity`.
    async fn memberships_for(&self, entity: E) -> RepositoryResult<Vec<Membership<E>>>;

    /// Grants the Owner role.
    async fn add_owner(&self, entity: E, user: UserId) -> RepositoryResult<Membership<E>> {
        self.set_role(entity, user, Role::Owner).await
    }

    /// Grants the Participant role.
    async fn add_participant(&self, entity: E, user: UserId) -> RepositoryResult<Membership<E>> {
        self.set_role(entity, user, Role::Participant).await
    }

    /// Grants the Guest role.
    async fn add_guest(&self, entity: E, user: UserId) -> RepositoryResult<Membership<E>> {
        self.set_role(entity, user, Role::Guest).await
    }

    /// Returns the role `user` holds on `entity`, or `None` for non-members.
    async fn access_for(&self, entity: E, user: UserId) -> RepositoryResult<Option<Role>> {
        Ok(self
            .find_membership(entity, user)
            .await?
            .map(|membership| membership.role()))
    }

    /// Returns whether `user` may perform `action` on `entity`.
    ///
    /// Non-members are always denied; members are checked against the static
    /// permission table.
    async fn has_access(&self, entity: E, user: UserId, action: Action) -> RepositoryResult<bool> {
        Ok(self
            .access_for(entity, user)
            .await?
            .is_some_and(|role| permits(role, action)))
    }
}
