// file: src/agents/analyzer.rs
// description: llm extraction of structured metadata from document text
// reference: https://docs.rs/serde_json

use super::patterns::strip_think_blocks;
use super::prompts::{ANALYZE_PROMPT, REANALYSIS_TEMPLATE};
use crate::error::{ChronologyError, Result};
use crate::llm::{ChatMessage, LlmClient};
use crate::models::{AgentState, DocumentData};
use crate::utils::{PromptTemplate, Validator};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

const LOG_PREVIEW_CHARS: usize = 500;

/// Parses the JSON object out of a model reply. Handles markdown fences,
/// leading reasoning blocks and prose around the object.
pub fn extract_json_from_response(content: &str) -> Result<Value> {
    let cleaned = strip_think_blocks(content);
    let unfenced = strip_code_fence(&cleaned);

    let value = match serde_json::from_str::<Value>(unfenced) {
        Ok(value) => value,
        Err(direct_err) => {
            let span = outermost_object(unfenced).ok_or_else(|| {
                ChronologyError::ResponseParse(format!("No JSON object in response: {}", direct_err))
            })?;
            serde_json::from_str::<Value>(span)
                .map_err(|e| ChronologyError::ResponseParse(e.to_string()))?
        }
    };

    if value.is_object() {
        Ok(value)
    } else {
        Err(ChronologyError::ResponseParse(
            "Expected a JSON object".to_string(),
        ))
    }
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let inner = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn outermost_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}

/// Asks the model for the JSON extraction. Failures are logged and yield an
/// empty object so the workflow can carry on with default data.
pub async fn analyze_document_content<C: LlmClient>(
    pdf_content: &str,
    review_feedback: Option<&str>,
    llm: &C,
) -> Value {
    if pdf_content.is_empty() {
        return Value::Object(Map::new());
    }

    let mut messages = vec![
        ChatMessage::system(ANALYZE_PROMPT),
        ChatMessage::user(pdf_content),
    ];
    if let Some(feedback) = review_feedback {
        messages.push(ChatMessage::user(
            PromptTemplate::new(REANALYSIS_TEMPLATE).render(&[("feedback", feedback)]),
        ));
    }

    info!("Analyzing document with {}", llm.describe());

    let response = match llm.complete(&messages).await {
        Ok(response) => response,
        Err(e) => {
            error!("LLM connection error: {}", e);
            return Value::Object(Map::new());
        }
    };
    debug!(
        "Analyzer response: {}",
        Validator::truncate_text(&response, LOG_PREVIEW_CHARS)
    );

    match extract_json_from_response(&response) {
        Ok(parsed) => {
            info!("Extracted document data successfully");
            parsed
        }
        Err(e) => {
            error!("JSON decode error: {}", e);
            Value::Object(Map::new())
        }
    }
}

pub async fn document_analyzer_node<C: LlmClient>(state: AgentState, llm: &C) -> AgentState {
    if state.pdf_content.is_empty() {
        error!("No PDF content to analyze");
        return AgentState {
            is_complete: false,
            ..state
        };
    }

    let feedback = (state.retry_count > 0 && !state.review_feedback.trim().is_empty())
        .then_some(state.review_feedback.as_str());

    let analysis = analyze_document_content(&state.pdf_content, feedback, llm).await;

    let has_fields = analysis.as_object().is_some_and(|map| !map.is_empty());
    let document_data = if has_fields {
        DocumentData::from_analysis(&analysis)
    } else {
        warn!("Analysis failed");
        DocumentData::default()
    };

    AgentState {
        document_data,
        ..state
    }
}
