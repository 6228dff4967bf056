//! Diesel schema for sync state and work locks.

diesel::table! {
    /// Last processed issue version per source.
    sync_state (task_source_id, issue_id) {
        /// Owning task source.
        task_source_id -> Uuid,
        /// Provider issue id.
        #[max_length = 255]
        issue_id -> Varchar,
        /// Processed issue version.
        issue_updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Leased per-issue work claims.
    work_locks (lock_key) {
        /// Claimed key, `<provider>:<external id>`.
        #[max_length = 512]
        lock_key -> Varchar,
        /// Claimant identifier.
        #[max_length = 255]
        holder_id -> Varchar,
        /// Acquisition time.
        acquired_at -> Timestamptz,
        /// Lease expiry.
        expires_at -> Timestamptz,
    }
}
