//! Generation pipeline collaborator contract.

use async_trait::async_trait;

use crate::error::AgentResult;
use vguard_models::{GenerationParams, Scene};

/// The external video generation pipeline the retry controller drives.
///
/// Regeneration replaces the scene at a given order with a fresh render
/// from the mutated prompt and parameters; predecessors are looked up by
/// order so the controller never holds the whole sequence.
#[async_trait]
pub trait GenerationPipeline: Send + Sync {
    /// Regenerate the scene at `order` with a mutated prompt and params.
    async fn regenerate(
        &self,
        order: u32,
        prompt: &str,
        params: &GenerationParams,
    ) -> AgentResult<Scene>;

    /// The scene at `order`, or `None` when no such scene exists.
    async fn previous_scene(&self, order: u32) -> AgentResult<Option<Scene>>;
}
