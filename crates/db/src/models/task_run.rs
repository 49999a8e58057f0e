//! Background task run records.

use robofleet_core::task::{TaskName, TaskStatus};
use robofleet_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `task_runs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskRun {
    pub id: DbId,
    #[sqlx(try_from = "String")]
    pub task_name: TaskName,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    /// `None` for runs enqueued by the scheduler.
    pub requested_by: Option<DbId>,
    pub result: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub queued_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
}
