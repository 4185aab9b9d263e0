//! Adapter for using Rig agents as a [`TextGenerator`]
//!
//! Rig agents are built per provider at startup (model, temperature) and are
//! then only ever prompted with plain strings.

use std::sync::Arc;

use async_trait::async_trait;
use rig::agent::Agent;
use rig::completion::{CompletionModel, Prompt};
use tracing::debug;

use super::TextGenerator;
use crate::error::LlmError;

/// Wraps a Rig `Agent<M>` so the workflow can call it through
/// [`TextGenerator`].
pub struct RigGenerator<M>
where
    M: CompletionModel + Send + Sync,
{
    agent: Arc<Agent<M>>,
    provider_name: String,
    model_name: String,
}

impl<M> RigGenerator<M>
where
    M: CompletionModel + Send + Sync,
{
    /// Wrap an agent with generic names
    pub fn new(agent: Agent<M>) -> Self {
        Self::with_names(agent, "rig", "rig-agent")
    }

    /// Wrap an agent with provider/model names for logging
    pub fn with_names(
        agent: Agent<M>,
        provider_name: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            agent: Arc::new(agent),
            provider_name: provider_name.into(),
            model_name: model_name.into(),
        }
    }
}

#[async_trait]
impl<M> TextGenerator for RigGenerator<M>
where
    M: CompletionModel + Send + Sync + 'static,
{
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        debug!(
            provider = %self.provider_name,
            model = %self.model_name,
            prompt_chars = prompt.len(),
            "Sending prompt"
        );

        self.agent
            .prompt(prompt)
            .await
            .map_err(|e| LlmError::request(format!("{} completion failed: {}", self.provider_name, e)))
    }

    fn name(&self) -> &str {
        &self.provider_name
    }

    fn model(&self) -> &str {
        &self.model_name
    }
}

