//! Orchestrator trait: the capability every orchestration strategy shares.

use async_trait::async_trait;

use crate::error::Result;
use crate::run::{RunConfig, RunOutcome};

/// Drives one bounded model/tool exchange for a composed prompt.
///
/// A returned `Err` means the run aborted; partial tool results gathered
/// before the failure are discarded, never returned as a degraded outcome.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// The provider identifier this orchestrator was built for.
    fn name(&self) -> &str;

    async fn invoke(&self, task_prompt: &str, config: &RunConfig) -> Result<RunOutcome>;
}
