use chrono::{DateTime, Local};
use serde::Serialize;
use uuid::Uuid;

/// Lifecycle of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
    Idle,
    Running,
    Stopped,
}

/// Counters for one run. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunState {
    pub running: bool,
    pub success_count: u32,
    pub failure_count: u32,
}

impl RunState {
    pub fn started() -> Self {
        Self {
            running: true,
            ..Self::default()
        }
    }

    /// A success clears the consecutive-failure streak.
    pub fn record_success(&mut self) {
        self.success_count += 1;
        self.failure_count = 0;
    }

    pub fn record_failure(&mut self) -> u32 {
        self.failure_count += 1;
        self.failure_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Repeat until the resource count reads zero.
    DrainAll,
    /// Attempt the task exactly this many times.
    Iterations(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum StopReason {
    ResourceExhausted,
    RetryBudgetExhausted,
    IterationsCompleted,
    Cancelled,
    Fatal(String),
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::ResourceExhausted => f.write_str("resource exhausted"),
            StopReason::RetryBudgetExhausted => f.write_str("retry budget exhausted"),
            StopReason::IterationsCompleted => f.write_str("iterations completed"),
            StopReason::Cancelled => f.write_str("cancelled"),
            StopReason::Fatal(msg) => write!(f, "fatal: {msg}"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    /// Task attempts, successful or not.
    pub iterations: u32,
    pub successes: u32,
    pub failure_count: u32,
    pub reason: StopReason,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl RunReport {
    pub fn summary(&self) -> String {
        let elapsed = self.finished_at - self.started_at;
        format!(
            "run {}: {} iterations, {} successful, stopped: {} (after {}s)",
            self.run_id,
            self.iterations,
            self.successes,
            self.reason,
            elapsed.num_seconds()
        )
    }
}
