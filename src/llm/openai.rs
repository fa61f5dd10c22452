// file: src/llm/openai.rs
// description: OpenAI-compatible chat completions client, used for OpenAI and Groq
// reference: https://console.groq.com/docs/openai

use super::{ChatMessage, LlmClient, with_retries};
use crate::error::{ChronologyError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    label: String,
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    max_retries: u32,
}

impl OpenAiClient {
    pub fn new(
        label: &str,
        base_url: &str,
        model: String,
        api_key: Option<String>,
        temperature: f32,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChronologyError::Llm(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            label: label.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
            temperature,
            max_retries,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Any HTTP answer from the models listing counts as reachable.
    pub async fn ping(&self) -> Result<()> {
        let mut request = self
            .client
            .get(format!("{}/models", self.base_url))
            .timeout(Duration::from_secs(5));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ChronologyError::Llm(format!("{} unreachable: {}", self.label, e)))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(ChronologyError::LlmStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    async fn send_once(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        debug!(
            "Requesting completion from {} ({} messages, {} chars)",
            self.label,
            messages.len(),
            messages.iter().map(|m| m.content.len()).sum::<usize>()
        );

        let mut builder = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ChronologyError::Llm(format!("{} request timed out: {}", self.label, e))
            } else {
                ChronologyError::Llm(format!("Failed to send {} request: {}", self.label, e))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ChronologyError::LlmStatus {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            ChronologyError::ResponseParse(format!("Failed to parse {} response: {}", self.label, e))
        })?;

        extract_content(completion)
    }
}

fn extract_content(completion: ChatCompletionResponse) -> Result<String> {
    let text = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ChronologyError::ResponseParse(
            "No completion content returned".to_string(),
        ));
    }

    debug!("Received completion of {} chars", text.len());
    Ok(text)
}

impl LlmClient for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        with_retries(self.max_retries, RETRY_BASE_DELAY, || self.send_once(messages)).await
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.label, self.model)
    }
}
