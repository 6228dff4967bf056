//! Diesel schema for task persistence.

diesel::table! {
    /// Tasks created from external issues.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Source that created the task.
        task_source_id -> Uuid,
        /// Task title.
        title -> Text,
        /// Task description.
        description -> Nullable<Text>,
        /// Workflow status.
        #[max_length = 50]
        status -> Varchar,
        /// Provider half of the natural issue key.
        #[max_length = 20]
        external_provider -> Varchar,
        /// Provider issue id half of the natural issue key.
        #[max_length = 255]
        external_id -> Varchar,
        /// GitLab issue sub-record.
        source_gitlab_issue -> Nullable<Jsonb>,
        /// GitHub issue sub-record.
        source_github_issue -> Nullable<Jsonb>,
        /// Jira ticket sub-record.
        source_jira_issue -> Nullable<Jsonb>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
