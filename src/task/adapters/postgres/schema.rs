//! Diesel schema for task lifecycle persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Owning project identifier.
        project_id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Optional free-form description.
        description -> Nullable<Text>,
        /// Estimated effort in hours.
        estimated_hours -> Int4,
        /// Hours spent so far.
        hours_spent -> Int4,
        /// Task lifecycle state.
        #[max_length = 50]
        state -> Varchar,
        /// Optional start date.
        started_on -> Nullable<Timestamptz>,
        /// Optional end date.
        ended_on -> Nullable<Timestamptz>,
        /// Optional due date.
        due_on -> Nullable<Timestamptz>,
        /// Authoring user; nulled when the user is deleted.
        author -> Nullable<Uuid>,
        /// Assigned user, if any.
        assignee -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Membership rows, unique per (task, user) pair.
    task_memberships (task_id, user_id) {
        /// Owning task identifier.
        task_id -> Uuid,
        /// Member user identifier.
        user_id -> Uuid,
        /// Granted role.
        #[max_length = 50]
        role -> Varchar,
    }
}

diesel::table! {
    /// Directed relation edges; every logical link is stored as two rows.
    task_relations (source_id, target_id, kind) {
        /// Source task identifier.
        source_id -> Uuid,
        /// Target task identifier.
        target_id -> Uuid,
        /// Relation kind tag.
        #[max_length = 50]
        kind -> Varchar,
    }
}

diesel::allow_tables_to_appear_in_same_query!(tasks, task_memberships, task_relations);
