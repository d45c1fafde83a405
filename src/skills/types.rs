use async_trait::async_trait;

use crate::errors::TinderResult;
use crate::vision::ResourceCount;

/// Result of one skill invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillOutcome {
    pub success: bool,
    pub detail: Option<String>,
}

impl SkillOutcome {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            detail: None,
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            detail: Some(detail.into()),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// What the orchestrator needs from a skill set.
///
/// `Err` is reserved for fatal preconditions; every runtime contingency is
/// an unsuccessful outcome or an unknown count.
#[async_trait(?Send)]
pub trait TaskSkills {
    /// Checked once before a run starts.
    fn ready(&self) -> TinderResult<()>;

    async fn perform_task(&mut self) -> TinderResult<SkillOutcome>;

    async fn probe_remaining_resource(&mut self) -> ResourceCount;
}
