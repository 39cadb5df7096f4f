//! Diesel schema for project lifecycle persistence.

diesel::table! {
    /// Project records.
    projects (id) {
        /// Internal project identifier.
        id -> Uuid,
        /// Project title.
        #[max_length = 256]
        title -> Varchar,
        /// Optional free-form description.
        description -> Nullable<Text>,
        /// Project lifecycle state.
        #[max_length = 50]
        state -> Varchar,
        /// Optional start date.
        started_on -> Nullable<Timestamptz>,
        /// Optional end date.
        ended_on -> Nullable<Timestamptz>,
        /// Creating user; nulled when the user is deleted.
        created_by -> Nullable<Uuid>,
        /// Last editing user, if any.
        updated_by -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Membership rows, unique per (project, user) pair.
    project_memberships (project_id, user_id) {
        /// Owning project identifier.
        project_id -> Uuid,
        /// Member user identifier.
        user_id -> Uuid,
        /// Granted role.
        #[max_length = 50]
        role -> Varchar,
    }
}

diesel::allow_tables_to_appear_in_same_query!(projects, project_memberships);
