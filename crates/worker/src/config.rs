//! Worker configuration loaded from environment variables.

/// Configuration for the task runner loop.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Seconds between queue polls when idle.
    pub poll_interval_secs: u64,
    /// Wall-clock budget for a single task run.
    pub task_timeout_secs: u64,
    /// Age after which a still-`running` claim is considered orphaned.
    /// Must exceed the task budget, or live runs get released.
    pub stale_claim_secs: i64,
    /// Seconds between orphaned-claim sweeps.
    pub stale_sweep_interval_secs: u64,
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                     | Default |
    /// |-----------------------------|---------|
    /// | `WORKER_POLL_INTERVAL_SECS` | `1`     |
    /// | `WORKER_TASK_TIMEOUT_SECS`  | `3600`  |
    /// | `WORKER_STALE_CLAIM_SECS`   | `7200`  |
    /// | `WORKER_STALE_SWEEP_SECS`   | `300`   |
    pub fn from_env() -> Self {
        let poll_interval_secs = std::env::var("WORKER_POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("WORKER_POLL_INTERVAL_SECS must be a number");

        let task_timeout_secs = std::env::var("WORKER_TASK_TIMEOUT_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("WORKER_TASK_TIMEOUT_SECS must be a number");

        let stale_claim_secs = std::env::var("WORKER_STALE_CLAIM_SECS")
            .unwrap_or_else(|_| "7200".into())
            .parse()
            .expect("WORKER_STALE_CLAIM_SECS must be a number");

        let stale_sweep_interval_secs = std::env::var("WORKER_STALE_SWEEP_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("WORKER_STALE_SWEEP_SECS must be a number");

        Self {
            poll_interval_secs,
            task_timeout_secs,
            stale_claim_secs,
            stale_sweep_interval_secs,
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 1,
            task_timeout_secs: 3600,
            stale_claim_secs: 7200,
            stale_sweep_interval_secs: 300,
        }
    }
}
