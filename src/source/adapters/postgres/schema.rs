//! Diesel schema for task sources and projects.

diesel::table! {
    /// Projects owning task sources.
    projects (id) {
        /// Project identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Enablement flag.
        enabled -> Bool,
    }
}

diesel::table! {
    /// Configured tracker connections.
    task_sources (id) {
        /// Source identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Source kind, denormalized from `config` for filtering.
        #[max_length = 50]
        kind -> Varchar,
        /// Provider configuration payload.
        config -> Jsonb,
        /// Enablement flag.
        enabled -> Bool,
        /// Last sync status.
        #[max_length = 50]
        sync_status -> Varchar,
        /// Start of the in-progress run.
        sync_started_at -> Nullable<Timestamptz>,
        /// Completion time of the last completed run.
        last_synced_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(task_sources -> projects (project_id));
diesel::allow_tables_to_appear_in_same_query!(projects, task_sources);
