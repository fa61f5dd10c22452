// file: src/llm/mod.rs
// description: chat model abstraction and provider selection
// reference: https://platform.openai.com/docs/api-reference/chat

pub mod ollama;
pub mod openai;

#[cfg(test)]
pub mod mock;

pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use crate::config::{LlmConfig, ProviderKind};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single round-trip to a chat model. Implementations return the trimmed
/// text of the first choice.
pub trait LlmClient {
    fn complete(&self, messages: &[ChatMessage]) -> impl Future<Output = Result<String>> + Send;

    fn describe(&self) -> String;
}

/// Runtime choice between the supported endpoints.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    OpenAi(OpenAiClient),
    Ollama(OllamaClient),
}

impl LlmProvider {
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let resolved = config.resolve()?;
        let timeout = Duration::from_secs(config.timeout_secs);

        let provider = match resolved.kind {
            ProviderKind::Ollama => LlmProvider::Ollama(OllamaClient::new(
                &resolved.base_url,
                resolved.model,
                config.temperature,
                config.num_ctx,
                timeout,
            )?),
            kind => LlmProvider::OpenAi(OpenAiClient::new(
                kind.as_str(),
                &resolved.base_url,
                resolved.model,
                resolved.api_key,
                config.temperature,
                timeout,
                config.max_retries,
            )?),
        };

        Ok(provider)
    }

    pub async fn ping(&self) -> Result<()> {
        match self {
            LlmProvider::OpenAi(client) => client.ping().await,
            LlmProvider::Ollama(client) => client.ping().await,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            LlmProvider::OpenAi(client) => client.model(),
            LlmProvider::Ollama(client) => client.model(),
        }
    }
}

impl LlmClient for LlmProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        match self {
            LlmProvider::OpenAi(client) => client.complete(messages).await,
            LlmProvider::Ollama(client) => client.complete(messages).await,
        }
    }

    fn describe(&self) -> String {
        match self {
            LlmProvider::OpenAi(client) => client.describe(),
            LlmProvider::Ollama(client) => client.describe(),
        }
    }
}

/// `base_delay * 2^attempt`, saturating instead of overflowing.
pub(crate) fn backoff_delay(base_delay: Duration, attempt: u32) -> Duration {
    base_delay.saturating_mul(2u32.saturating_pow(attempt))
}

/// Runs `op` until it succeeds, fails permanently, or `max_retries` extra
/// attempts are spent. Delay doubles from `base_delay` between attempts.
pub(crate) async fn with_retries<T, F, Fut>(
    max_retries: u32,
    base_delay: Duration,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < max_retries => {
                let delay = backoff_delay(base_delay, attempt);
                attempt += 1;
                warn!(
                    "LLM call failed ({}), retry {}/{} in {:?}",
                    e, attempt, max_retries, delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
