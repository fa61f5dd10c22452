// file: src/agents/formatter.rs
// description: renders extracted data as a legal chronology entry
// reference: https://docs.rs/chrono

use super::patterns::strip_think_blocks;
use super::prompts::{FORMAT_SUMMARY_TEMPLATE, LEGAL_FORMAT_PROMPT};
use crate::llm::{ChatMessage, LlmClient};
use crate::models::{AgentState, DocumentData, describe_parties};
use crate::utils::PromptTemplate;
use chrono::NaiveDate;
use tracing::{error, info};

pub const NO_DATA_OUTPUT: &str = "No data to format";
pub const INSUFFICIENT_DATA_OUTPUT: &str = "Insufficient data for formatting";

const UNKNOWN_SENDER: &str = "Unknown Sender";
const UNKNOWN_RECIPIENT: &str = "Unknown Recipient";
const UNKNOWN_REFERENCE: &str = "Unknown Reference";

/// `2024-03-05` becomes `05 March 2024`. Empty input yields `Date Unknown`;
/// anything unparsable is returned unchanged.
pub fn format_date_legal(date: &str) -> String {
    if date.is_empty() {
        return "Date Unknown".to_string();
    }

    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%d %B %Y").to_string(),
        Err(_) => date.to_string(),
    }
}

/// Prefixes the document type unless the reference already names it, so
/// `RFI` + `RFI-042` stays `RFI-042` while `letter` + `L-193` becomes
/// `letter L-193`.
pub fn format_reference(document_type: &str, main_reference: &str) -> String {
    match (document_type.is_empty(), main_reference.is_empty()) {
        (false, false) => {
            if main_reference
                .to_lowercase()
                .contains(&document_type.to_lowercase())
            {
                main_reference.to_string()
            } else {
                format!("{} {}", document_type, main_reference)
            }
        }
        (true, false) => main_reference.to_string(),
        (false, true) => document_type.to_string(),
        (true, true) => UNKNOWN_REFERENCE.to_string(),
    }
}

fn sender_role(data: &DocumentData) -> &str {
    data.first_sender_role().unwrap_or(UNKNOWN_SENDER)
}

fn recipient_role(data: &DocumentData) -> &str {
    data.first_recipient_role().unwrap_or(UNKNOWN_RECIPIENT)
}

/// Deterministic entry built by substitution alone.
pub fn basic_chronology(data: &DocumentData) -> String {
    format!(
        "On {}, {} sent {} to the {} {}, via ref. {}.",
        format_date_legal(&data.date),
        sender_role(data),
        data.document_type,
        recipient_role(data),
        data.description,
        format_reference(&data.document_type, &data.main_reference)
    )
}

pub fn format_summary(data: &DocumentData) -> String {
    let formatted_date = format_date_legal(&data.date);
    let reference = format_reference(&data.document_type, &data.main_reference);
    let sender_parties = describe_parties(&data.sender_parties);
    let recipient_parties = describe_parties(&data.recipient_parties);

    PromptTemplate::new(FORMAT_SUMMARY_TEMPLATE).render(&[
        ("document_type", data.document_type.as_str()),
        ("document_date", formatted_date.as_str()),
        ("document_description", data.description.as_str()),
        ("sender_parties", sender_parties.as_str()),
        ("recipient_parties", recipient_parties.as_str()),
        ("main_reference", data.main_reference.as_str()),
        ("sender_role", sender_role(data)),
        ("recipient_role", recipient_role(data)),
        ("reference", reference.as_str()),
    ])
}

/// Models sometimes echo the template's surrounding quotes.
fn clean_entry(response: &str) -> String {
    let text = strip_think_blocks(response);
    let trimmed = text.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

pub async fn format_document_chronology_llm<C: LlmClient>(data: &DocumentData, llm: &C) -> String {
    if data.date.is_empty() || data.total_parties() == 0 {
        return INSUFFICIENT_DATA_OUTPUT.to_string();
    }

    let messages = [
        ChatMessage::system(LEGAL_FORMAT_PROMPT),
        ChatMessage::user(format_summary(data)),
    ];

    match llm.complete(&messages).await {
        Ok(response) => {
            let entry = clean_entry(&response);
            if entry.is_empty() {
                basic_chronology(data)
            } else {
                entry
            }
        }
        Err(e) => {
            error!("LLM invocation error: {}", e);
            basic_chronology(data)
        }
    }
}

pub async fn document_formatter_node<C: LlmClient>(state: AgentState, llm: Option<&C>) -> AgentState {
    if state.document_data.document_type.is_empty() {
        return AgentState {
            formatted_output: NO_DATA_OUTPUT.to_string(),
            ..state
        };
    }

    let formatted_output = match llm {
        Some(llm) => {
            info!("Formatting chronology entry with {}", llm.describe());
            format_document_chronology_llm(&state.document_data, llm).await
        }
        None => basic_chronology(&state.document_data),
    };

    AgentState {
        formatted_output,
        ..state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockLlmClient;
    use crate::models::Party;
    use pretty_assertions::assert_eq;

    fn rfi() -> DocumentData {
        DocumentData {
            document_type: "RFI".to_string(),
            date: "2024-03-05".to_string(),
            description: "requesting clarification of slab levels at grid C4".to_string(),
            sender_parties: vec![Party::new("ABC Construction", "Contractor")],
            recipient_parties: vec![Party::new("XYZ Consultants", "Engineer")],
            main_reference: "RFI-042".to_string(),
            other_references: vec![],
        }
    }

    #[test]
    fn test_format_date_legal() {
        assert_eq!(format_date_legal("2024-12-25"), "25 December 2024");
        assert_eq!(format_date_legal("2024-03-05"), "05 March 2024");
        assert_eq!(format_date_legal(""), "Date Unknown");
        assert_eq!(format_date_legal("March 2024"), "March 2024");
        assert_eq!(format_date_legal("2024-02-30"), "2024-02-30");
    }

    #[test]
    fn test_format_reference() {
        assert_eq!(format_reference("RFI", "RFI-042"), "RFI-042");
        assert_eq!(format_reference("rfi", "RFI-042"), "RFI-042");
        assert_eq!(format_reference("letter", "ABC/L/0193"), "letter ABC/L/0193");
        assert_eq!(format_reference("", "ABC/L/0193"), "ABC/L/0193");
        assert_eq!(format_reference("email", ""), "email");
        assert_eq!(format_reference("", ""), "Unknown Reference");
    }

    #[test]
    fn test_basic_chronology() {
        assert_eq!(
            basic_chronology(&rfi()),
            "On 05 March 2024, Contractor sent RFI to the Engineer requesting clarification of slab levels at grid C4, via ref. RFI-042."
        );
    }

    #[test]
    fn test_basic_chronology_unknown_parties() {
        let data = DocumentData {
            document_type: "notice".to_string(),
            description: "of termination".to_string(),
            ..Default::default()
        };
        assert_eq!(
            basic_chronology(&data),
            "On Date Unknown, Unknown Sender sent notice to the Unknown Recipient of termination, via ref. notice."
        );
    }

    #[test]
    fn test_format_summary_uses_roles() {
        let summary = format_summary(&rfi());
        assert!(summary.contains("Document Date: 05 March 2024"));
        assert!(summary.contains("Document Sender Parties: ABC Construction (Contractor)"));
        assert!(summary.contains(
            "\"On 05 March 2024, Contractor sent RFI to the Engineer [description], via ref. RFI-042.\""
        ));
    }

    #[test]
    fn test_format_summary_keeps_braces_in_description() {
        let mut data = rfi();
        data.description = "quoting {reference} and {sender_role} from the minutes".to_string();

        let summary = format_summary(&data);
        assert!(summary.contains("quoting {reference} and {sender_role} from the minutes"));
        assert!(!summary.contains("quoting RFI-042"));
    }

    #[tokio::test]
    async fn test_llm_entry_returned_and_cleaned() {
        let llm = MockLlmClient::with_responses(&[
            "\"On 05 March 2024, the Contractor sent RFI to the Engineer seeking clarification, via ref. RFI-042.\"",
        ]);
        let entry = format_document_chronology_llm(&rfi(), &llm).await;
        assert_eq!(
            entry,
            "On 05 March 2024, the Contractor sent RFI to the Engineer seeking clarification, via ref. RFI-042."
        );
        assert_eq!(llm.request(0)[0].content, LEGAL_FORMAT_PROMPT);
    }

    #[tokio::test]
    async fn test_llm_error_falls_back_to_basic() {
        let llm = MockLlmClient::new();
        let entry = format_document_chronology_llm(&rfi(), &llm).await;
        assert_eq!(entry, basic_chronology(&rfi()));
    }

    #[tokio::test]
    async fn test_insufficient_data_skips_llm() {
        let llm = MockLlmClient::new();

        let mut data = rfi();
        data.date.clear();
        assert_eq!(
            format_document_chronology_llm(&data, &llm).await,
            INSUFFICIENT_DATA_OUTPUT
        );

        let mut data = rfi();
        data.sender_parties.clear();
        data.recipient_parties.clear();
        assert_eq!(
            format_document_chronology_llm(&data, &llm).await,
            INSUFFICIENT_DATA_OUTPUT
        );

        assert_eq!(llm.call_count(), 0);
    }

    #[test]
    fn test_formatter_node_without_llm() {
        let mut state = AgentState::new("/docs/rfi.pdf");
        state.document_data = rfi();

        let state = tokio_test::block_on(document_formatter_node::<MockLlmClient>(state, None));
        assert_eq!(state.formatted_output, basic_chronology(&rfi()));
    }

    #[test]
    fn test_formatter_node_without_type() {
        let state = tokio_test::block_on(document_formatter_node::<MockLlmClient>(
            AgentState::new("/docs/rfi.pdf"),
            None,
        ));
        assert_eq!(state.formatted_output, NO_DATA_OUTPUT);
    }

    #[tokio::test]
    async fn test_formatter_node_with_llm() {
        let llm = MockLlmClient::with_responses(&["On 05 March 2024, the Contractor sent RFI ..."]);
        let mut state = AgentState::new("/docs/rfi.pdf");
        state.document_data = rfi();

        let state = document_formatter_node(state, Some(&llm)).await;
        assert_eq!(state.formatted_output, "On 05 March 2024, the Contractor sent RFI ...");
    }
}
