//! Background task names, run statuses and scheduling constants.

define_text_enum! {
    /// Tasks the worker knows how to execute.
    TaskName {
        FleetHealthCheck = "fleet_health_check",
        ProcessScheduledMissions = "process_scheduled_missions",
    }
}

define_text_enum! {
    /// Lifecycle of a single task run.
    TaskStatus {
        Queued = "queued",
        Running = "running",
        Succeeded = "succeeded",
        Failed = "failed",
    }
}

impl TaskStatus {
    pub fn is_finished(self) -> bool {
        matches!(self, TaskStatus::Succeeded | TaskStatus::Failed)
    }
}

/// Hard limit on a single task execution.
pub const TASK_TIME_LIMIT_SECS: u64 = 300;

/// Default period of the scheduled fleet health check.
pub const FLEET_HEALTH_INTERVAL_SECS: u64 = 60;

/// Default period of scheduled mission processing.
pub const SCHEDULED_MISSIONS_INTERVAL_SECS: u64 = 30;

/// Default queue polling period.
pub const QUEUE_POLL_INTERVAL_SECS: u64 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_names_are_snake_case() {
        assert_eq!(TaskName::FleetHealthCheck.as_str(), "fleet_health_check");
        assert_eq!(
            "process_scheduled_missions".parse::<TaskName>().unwrap(),
            TaskName::ProcessScheduledMissions
        );
    }

    #[test]
    fn finished_statuses() {
        assert!(!TaskStatus::Queued.is_finished());
        assert!(!TaskStatus::Running.is_finished());
        assert!(TaskStatus::Succeeded.is_finished());
        assert!(TaskStatus::Failed.is_finished());
    }
}
