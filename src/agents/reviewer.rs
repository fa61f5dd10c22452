// file: src/agents/reviewer.rs
// description: completeness review of extracted data with a bounded retry counter

use super::patterns::{COMPLETE_MARKER, strip_think_blocks};
use super::prompts::{REVIEW_PROMPT, REVIEW_SUMMARY_TEMPLATE};
use crate::error::ChronologyError;
use crate::llm::{ChatMessage, LlmClient};
use crate::models::{AgentState, DocumentData, describe_parties};
use crate::utils::{PromptTemplate, Validator};
use tracing::{debug, info, warn};

pub const MAX_RETRIES_FEEDBACK: &str = "Maximum retries reached. Proceeding with current data.";
pub const NO_CONTENT_FEEDBACK: &str = "No content to review";

pub fn review_summary(data: &DocumentData) -> String {
    let other_references = if data.other_references.is_empty() {
        "None".to_string()
    } else {
        data.other_references.join(", ")
    };
    let sender_count = data.sender_parties.len().to_string();
    let recipient_count = data.recipient_parties.len().to_string();
    let sender_parties = describe_parties(&data.sender_parties);
    let recipient_parties = describe_parties(&data.recipient_parties);

    PromptTemplate::new(REVIEW_SUMMARY_TEMPLATE).render(&[
        ("document_type", data.document_type.as_str()),
        ("document_date", data.date.as_str()),
        ("document_description", data.description.as_str()),
        ("sender_count", sender_count.as_str()),
        ("sender_parties", sender_parties.as_str()),
        ("recipient_count", recipient_count.as_str()),
        ("recipient_parties", recipient_parties.as_str()),
        ("main_reference", data.main_reference.as_str()),
        ("other_references", other_references.as_str()),
    ])
}

/// True when the reviewer signed off. A bare `complete` answer always
/// counts; otherwise the marker must appear as a whole word, in any case,
/// and not be negated.
pub fn is_review_complete(feedback: &str) -> bool {
    let answer = strip_think_blocks(feedback);
    let bare = answer.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '"' | '\'' | '.' | '`'));
    if bare.eq_ignore_ascii_case("complete") {
        return true;
    }

    let upper = answer.to_uppercase();
    COMPLETE_MARKER.is_match(&upper)
        && !upper.contains("NOT COMPLETE")
        && !upper.contains("NOT YET COMPLETE")
}

/// Runs one review round-trip. Transport failures come back as feedback
/// text, which never carries the completion marker.
pub async fn review_extracted_data<C: LlmClient>(
    data: &DocumentData,
    pdf_content: &str,
    llm: &C,
) -> String {
    let messages = [
        ChatMessage::system(REVIEW_PROMPT),
        ChatMessage::user(format!(
            "ORIGINAL DOCUMENT:\n{}\n\n{}",
            pdf_content,
            review_summary(data)
        )),
    ];

    match llm.complete(&messages).await {
        Ok(feedback) => feedback,
        Err(e @ ChronologyError::ResponseParse(_)) => format!("Review error: {}", e),
        Err(e) => format!("Review connection error: {}", e),
    }
}

pub async fn reflection_node<C: LlmClient>(
    state: AgentState,
    llm: &C,
    max_retries: u32,
) -> AgentState {
    if state.pdf_content.is_empty() {
        return AgentState {
            review_feedback: NO_CONTENT_FEEDBACK.to_string(),
            is_complete: false,
            ..state
        };
    }

    if state.retry_count >= max_retries {
        info!("Review retry limit ({}) reached", max_retries);
        return AgentState {
            review_feedback: MAX_RETRIES_FEEDBACK.to_string(),
            is_complete: true,
            ..state
        };
    }

    info!("Reviewing extracted data (round {})", state.retry_count + 1);
    let feedback = review_extracted_data(&state.document_data, &state.pdf_content, llm).await;
    debug!("Review feedback: {}", Validator::truncate_text(&feedback, 500));

    let is_complete = is_review_complete(&feedback);
    if !is_complete {
        warn!("Review requested changes");
    }

    AgentState {
        review_feedback: feedback,
        is_complete,
        retry_count: state.retry_count + 1,
        ..state
    }
}
