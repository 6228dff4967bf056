//! Events handed to the downstream evaluation pipeline.

use crate::source::domain::{ProjectId, TaskSourceId};
use crate::task::domain::{IssueKey, Task, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event published after sync work that downstream stages react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DownstreamEvent {
    /// A task was created and awaits evaluation.
    EvaluationRequested {
        /// Created task.
        task_id: TaskId,
        /// Owning project.
        project_id: ProjectId,
        /// Source the task came from.
        task_source_id: TaskSourceId,
        /// External issue behind the task.
        issue_key: IssueKey,
        /// When the event was raised.
        requested_at: DateTime<Utc>,
    },
}

impl DownstreamEvent {
    /// Requests evaluation of a freshly created task.
    #[must_use]
    pub fn evaluation_requested(task: &Task, requested_at: DateTime<Utc>) -> Self {
        Self::EvaluationRequested {
            task_id: task.id(),
            project_id: task.project_id(),
            task_source_id: task.task_source_id(),
            issue_key: task.issue_key(),
            requested_at,
        }
    }

    /// Returns the event kind used as a routing key.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::EvaluationRequested { .. } => "evaluation_requested",
        }
    }

    /// Returns the task the event concerns.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        match self {
            Self::EvaluationRequested { task_id, .. } => *task_id,
        }
    }
}
