pub mod engine;
pub mod loop_control;
pub mod state;

pub use engine::Orchestrator;
pub use state::{OrchestratorState, RunMode, RunReport, RunState, StopReason};
