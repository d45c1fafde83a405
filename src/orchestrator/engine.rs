use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::config::{RunConfig, UnknownCountPolicy};
use crate::orchestrator::loop_control::LoopController;
use crate::orchestrator::state::{OrchestratorState, RunMode, RunReport, RunState, StopReason};
use crate::skills::TaskSkills;
use crate::vision::ResourceCount;

/// Drives repeated task attempts until the resource runs out, the retry
/// budget is spent, the requested count is reached, or the operator stops it.
pub struct Orchestrator<S: TaskSkills> {
    skills: S,
    loop_ctrl: LoopController,
    state: OrchestratorState,
    run: RunState,
    stop_flag: Arc<AtomicBool>,
}

impl<S: TaskSkills> Orchestrator<S> {
    pub fn new(skills: S, config: RunConfig) -> Self {
        Self {
            skills,
            loop_ctrl: LoopController::new(config),
            state: OrchestratorState::Idle,
            run: RunState::default(),
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Setting the flag stops the loop before its next iteration.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn run_state(&self) -> &RunState {
        &self.run
    }

    pub fn skills(&self) -> &S {
        &self.skills
    }

    pub fn skills_mut(&mut self) -> &mut S {
        &mut self.skills
    }

    pub async fn run(&mut self, mode: RunMode) -> RunReport {
        let run_id = Uuid::new_v4();
        let started_at = chrono::Local::now();
        let span = tracing::info_span!("run", %run_id);

        let (iterations, reason) = self.drive(mode).instrument(span).await;

        let report = RunReport {
            run_id,
            iterations,
            successes: self.run.success_count,
            failure_count: self.run.failure_count,
            reason,
            started_at,
            finished_at: chrono::Local::now(),
        };
        tracing::info!(
            %run_id,
            iterations = report.iterations,
            successes = report.successes,
            reason = %report.reason,
            "run finished"
        );
        report
    }

    async fn drive(&mut self, mode: RunMode) -> (u32, StopReason) {
        self.state = OrchestratorState::Running;
        self.run = RunState::started();
        tracing::info!(?mode, max_failures = self.loop_ctrl.max_failures(), "run started");

        let mut iterations = 0u32;
        let reason = match self.skills.ready() {
            Err(e) => {
                tracing::error!(error = %e, "run cannot start");
                StopReason::Fatal(e.to_string())
            }
            Ok(()) => loop {
                if self.stop_flag.load(Ordering::Relaxed) {
                    tracing::warn!("stop requested");
                    break StopReason::Cancelled;
                }

                match mode {
                    RunMode::Iterations(n) => {
                        if iterations >= n {
                            break StopReason::IterationsCompleted;
                        }
                        tracing::info!(iteration = iterations + 1, of = n, "starting iteration");
                    }
                    RunMode::DrainAll => match self.skills.probe_remaining_resource().await {
                        ResourceCount::Known(0) => {
                            tracing::info!("no resource left");
                            break StopReason::ResourceExhausted;
                        }
                        ResourceCount::Known(n) => tracing::info!(remaining = n, "resource remaining"),
                        ResourceCount::Unknown => match self.loop_ctrl.unknown_count_policy() {
                            UnknownCountPolicy::Exhausted => {
                                tracing::warn!("resource count unknown, treating as exhausted");
                                break StopReason::ResourceExhausted;
                            }
                            UnknownCountPolicy::Failure => {
                                let failures = self.run.record_failure();
                                tracing::warn!(failure_count = failures, "resource count unknown");
                                if self.loop_ctrl.budget_exhausted(failures) {
                                    break StopReason::RetryBudgetExhausted;
                                }
                                tokio::time::sleep(self.loop_ctrl.failure_backoff()).await;
                                continue;
                            }
                        },
                    },
                }

                iterations += 1;
                match self.skills.perform_task().await {
                    Ok(outcome) if outcome.success => {
                        self.run.record_success();
                        tracing::info!(successes = self.run.success_count, "task succeeded");
                        tokio::time::sleep(self.loop_ctrl.success_delay()).await;
                    }
                    Ok(outcome) => {
                        let failures = self.run.record_failure();
                        tracing::warn!(
                            failure_count = failures,
                            max_failures = self.loop_ctrl.max_failures(),
                            detail = outcome.detail.as_deref().unwrap_or("-"),
                            "task failed"
                        );
                        if self.loop_ctrl.budget_exhausted(failures) {
                            tracing::error!(failure_count = failures, "too many consecutive failures");
                            break StopReason::RetryBudgetExhausted;
                        }
                        tokio::time::sleep(self.loop_ctrl.failure_backoff()).await;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "fatal error during task");
                        break StopReason::Fatal(e.to_string());
                    }
                }
            },
        };

        self.run.running = false;
        self.state = OrchestratorState::Stopped;
        (iterations, reason)
    }
}
