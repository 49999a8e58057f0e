use std::time::Duration;

use robofleet_core::task::{
    FLEET_HEALTH_INTERVAL_SECS, QUEUE_POLL_INTERVAL_SECS, SCHEDULED_MISSIONS_INTERVAL_SECS,
};

/// Timing configuration for the worker loops.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// How often the runner looks for queued task runs.
    pub poll_interval: Duration,
    pub fleet_health_interval: Duration,
    pub scheduled_missions_interval: Duration,
}

impl WorkerConfig {
    /// Load from environment variables, falling back to the defaults.
    ///
    /// | Env Var                            | Default |
    /// |------------------------------------|---------|
    /// | `TASK_POLL_INTERVAL_SECS`          | `2`     |
    /// | `FLEET_HEALTH_INTERVAL_SECS`       | `60`    |
    /// | `SCHEDULED_MISSIONS_INTERVAL_SECS` | `30`    |
    pub fn from_env() -> Self {
        Self {
            poll_interval: secs_from_env("TASK_POLL_INTERVAL_SECS", QUEUE_POLL_INTERVAL_SECS),
            fleet_health_interval: secs_from_env(
                "FLEET_HEALTH_INTERVAL_SECS",
                FLEET_HEALTH_INTERVAL_SECS,
            ),
            scheduled_missions_interval: secs_from_env(
                "SCHEDULED_MISSIONS_INTERVAL_SECS",
                SCHEDULED_MISSIONS_INTERVAL_SECS,
            ),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(QUEUE_POLL_INTERVAL_SECS),
            fleet_health_interval: Duration::from_secs(FLEET_HEALTH_INTERVAL_SECS),
            scheduled_missions_interval: Duration::from_secs(SCHEDULED_MISSIONS_INTERVAL_SECS),
        }
    }
}

/// Zero or unparsable values fall back to `default`; `tokio::time::interval`
/// panics on a zero period.
fn secs_from_env(key: &str, default: u64) -> Duration {
    let secs = std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(default);
    Duration::from_secs(secs)
}
