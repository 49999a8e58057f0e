//! Repository for the `task_runs` table, the durable background task queue.

use robofleet_core::task::{TaskName, TaskStatus, TASK_TIME_LIMIT_SECS};
use robofleet_core::types::DbId;
use sqlx::PgPool;

use crate::models::task_run::TaskRun;

/// Column list for `task_runs` queries.
const COLUMNS: &str = "\
    id, task_name, status, requested_by, result, error_message, \
    queued_at, started_at, finished_at";

/// Provides enqueue/claim/finish operations for task runs.
pub struct TaskRunRepo;

impl TaskRunRepo {
    /// Enqueue a new run in `queued` status. Returns immediately with the row.
    pub async fn enqueue(
        pool: &PgPool,
        task_name: TaskName,
        requested_by: Option<DbId>,
    ) -> Result<TaskRun, sqlx::Error> {
        let query = format!(
            "INSERT INTO task_runs (task_name, status, requested_by) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TaskRun>(&query)
            .bind(task_name.as_str())
            .bind(TaskStatus::Queued.as_str())
            .bind(requested_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TaskRun>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM task_runs WHERE id = $1");
        sqlx::query_as::<_, TaskRun>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Atomically claim the oldest queued run and mark it `running`.
    ///
    /// Uses `SELECT FOR UPDATE SKIP LOCKED` so concurrent workers never
    /// pick up the same run.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<TaskRun>, sqlx::Error> {
        let query = format!(
            "UPDATE task_runs \
             SET status = $1, started_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM task_runs \
                 WHERE status = $2 \
                 ORDER BY queued_at ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TaskRun>(&query)
            .bind(TaskStatus::Running.as_str())
            .bind(TaskStatus::Queued.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Record a successful run with its JSON result.
    pub async fn mark_succeeded(
        pool: &PgPool,
        id: DbId,
        result: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE task_runs SET status = $2, result = $3, finished_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(TaskStatus::Succeeded.as_str())
        .bind(result)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record a failed run with its error message.
    pub async fn mark_failed(pool: &PgPool, id: DbId, message: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE task_runs SET status = $2, error_message = $3, finished_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(TaskStatus::Failed.as_str())
        .bind(message)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Whether a run of `task_name` is queued, or running and still inside
    /// the time limit. A `running` row past the limit was abandoned by a
    /// worker that died and does not block new runs.
    pub async fn has_pending(pool: &PgPool, task_name: TaskName) -> Result<bool, sqlx::Error> {
        let pending: bool = sqlx::query_scalar(
            "SELECT EXISTS ( \
                 SELECT 1 FROM task_runs \
                 WHERE task_name = $1 \
                   AND (status = $2 \
                        OR (status = $3 AND started_at >= NOW() - make_interval(secs => $4))) \
             )",
        )
        .bind(task_name.as_str())
        .bind(TaskStatus::Queued.as_str())
        .bind(TaskStatus::Running.as_str())
        .bind(TASK_TIME_LIMIT_SECS as f64)
        .fetch_one(pool)
        .await?;
        Ok(pending)
    }

    /// Mark `running` rows whose `started_at` is older than the time limit
    /// as `failed`. Returns the number of rows reaped.
    pub async fn fail_abandoned(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE task_runs \
             SET status = $2, error_message = $3, finished_at = NOW() \
             WHERE status = $1 AND started_at < NOW() - make_interval(secs => $4)",
        )
        .bind(TaskStatus::Running.as_str())
        .bind(TaskStatus::Failed.as_str())
        .bind(format!(
            "Task abandoned: no result within the {TASK_TIME_LIMIT_SECS}s time limit"
        ))
        .bind(TASK_TIME_LIMIT_SECS as f64)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
