// file: src/llm/ollama.rs
// description: local Ollama chat client
// reference: https://github.com/ollama/ollama/blob/main/docs/api.md#generate-a-chat-completion

use super::{ChatMessage, LlmClient};
use crate::error::{ChronologyError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_ctx: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
    num_ctx: u32,
}

impl OllamaClient {
    pub fn new(
        base_url: &str,
        model: String,
        temperature: f32,
        num_ctx: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChronologyError::Llm(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            temperature,
            num_ctx,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn map_transport_error(&self, e: reqwest::Error) -> ChronologyError {
        if e.is_connect() {
            ChronologyError::Llm(format!(
                "Cannot reach Ollama at {}. Make sure Ollama is running locally",
                self.base_url
            ))
        } else if e.is_timeout() {
            ChronologyError::Llm(format!("Ollama request timed out: {}", e))
        } else {
            ChronologyError::Llm(e.to_string())
        }
    }

    pub async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChronologyError::LlmStatus {
                status: status.as_u16(),
                body,
            });
        }

        let tags: OllamaTagsResponse = response
            .json()
            .await
            .map_err(|e| ChronologyError::ResponseParse(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Reachable and the configured model has been pulled.
    pub async fn ping(&self) -> Result<()> {
        let models = self.list_models().await?;
        if models.iter().any(|m| m.starts_with(&self.model)) {
            Ok(())
        } else {
            Err(ChronologyError::Config(format!(
                "Model {} is not pulled (available: {})",
                self.model,
                if models.is_empty() {
                    "none".to_string()
                } else {
                    models.join(", ")
                }
            )))
        }
    }
}

impl LlmClient for OllamaClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
                num_ctx: self.num_ctx,
            },
        };

        debug!(
            "Requesting completion from ollama model {} ({} messages)",
            self.model,
            messages.len()
        );

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChronologyError::LlmStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| ChronologyError::ResponseParse(e.to_string()))?;

        let text = parsed.message.content.trim().to_string();
        if text.is_empty() {
            return Err(ChronologyError::ResponseParse(
                "Ollama returned an empty message".to_string(),
            ));
        }
        Ok(text)
    }

    fn describe(&self) -> String {
        format!("ollama ({})", self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("doc")];
        let request = OllamaChatRequest {
            model: "qwen2.5:7b",
            messages: &messages,
            stream: false,
            options: OllamaOptions {
                temperature: 0.0,
                num_ctx: 16000,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_ctx"], 16000);
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[test]
    fn test_response_parsing() {
        let parsed: OllamaChatResponse = serde_json::from_str(
            r#"{"model":"qwen2.5:7b","message":{"role":"assistant","content":"COMPLETE"},"done":true}"#,
        )
        .unwrap();
        assert_eq!(parsed.message.content, "COMPLETE");
    }

    #[test]
    fn test_tags_parsing() {
        let tags: OllamaTagsResponse = serde_json::from_str(
            r#"{"models":[{"name":"qwen2.5:7b","size":1},{"name":"deepseek-r1:14b"}]}"#,
        )
        .unwrap();
        let names: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["qwen2.5:7b", "deepseek-r1:14b"]);
    }

    #[test]
    fn test_base_url_normalized() {
        let client = OllamaClient::new(
            "http://localhost:11434/",
            "qwen2.5:7b".to_string(),
            0.0,
            16000,
            Duration::from_secs(60),
        )
        .unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.describe(), "ollama (qwen2.5:7b)");
    }
}
