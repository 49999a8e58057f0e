use robofleet_core::error::CoreError;

/// Why a task run failed. The message is stored on the `task_runs` row.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to serialize task result: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Task exceeded the {0}s time limit")]
    TimedOut(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_the_limit() {
        assert_eq!(
            TaskError::TimedOut(300).to_string(),
            "Task exceeded the 300s time limit"
        );
    }

    #[test]
    fn core_errors_pass_through() {
        let err: TaskError = CoreError::InvalidState("Cannot start mission".into()).into();
        assert_eq!(err.to_string(), "Invalid state: Cannot start mission");
    }
}
