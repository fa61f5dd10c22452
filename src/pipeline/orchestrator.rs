// file: src/pipeline/orchestrator.rs
// description: runs reader, analyzer, review loop and formatter for one document
// reference: sequential workflow with a bounded review loop

use crate::agents::reviewer::MAX_RETRIES_FEEDBACK;
use crate::agents::{document_analyzer_node, document_formatter_node, reflection_node};
use crate::config::PipelineConfig;
use crate::error::{ChronologyError, Result};
use crate::llm::LlmClient;
use crate::models::{AgentState, ChronologyRecord};
use crate::pipeline::status::{StepStatus, WorkflowStatus, WorkflowStep};
use crate::reader::document_reader_node;
use crate::utils::OperationTimer;
use std::path::Path;
use std::time::Duration;

const SLOW_STEP: Duration = Duration::from_secs(120);

/// Final state of a run together with the per-step status trail.
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub state: AgentState,
    pub status: WorkflowStatus,
}

impl WorkflowOutcome {
    /// A run succeeded when the reader produced text and the formatter
    /// produced an entry.
    pub fn succeeded(&self) -> bool {
        self.state.has_content() && !self.state.formatted_output.is_empty()
    }

    pub fn into_record(self) -> Result<ChronologyRecord> {
        if !self.state.has_content() {
            return Err(ChronologyError::Validation(format!(
                "Failed to load PDF content: {}",
                self.state.file_path.display()
            )));
        }
        Ok(ChronologyRecord::from_state(&self.state))
    }
}

pub struct ChronologyWorkflow<C: LlmClient> {
    llm: C,
    max_review_retries: u32,
}

impl<C: LlmClient> ChronologyWorkflow<C> {
    pub fn new(llm: C, config: &PipelineConfig) -> Self {
        Self {
            llm,
            max_review_retries: config.max_review_retries,
        }
    }

    pub fn llm(&self) -> &C {
        &self.llm
    }

    pub async fn run(&self, file_path: &Path) -> WorkflowOutcome {
        let label = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.display().to_string());
        let mut status = WorkflowStatus::new(label);
        let state = AgentState::new(file_path);

        // Reader
        status.update(WorkflowStep::Reader, StepStatus::Running, "Loading PDF document...");
        let timer = OperationTimer::new("document reader");
        let state = match tokio::task::spawn_blocking(move || document_reader_node(state)).await {
            Ok(state) => state,
            Err(e) => {
                status.update(
                    WorkflowStep::Reader,
                    StepStatus::Error,
                    format!("Reader task failed: {}", e),
                );
                return WorkflowOutcome {
                    state: AgentState::new(file_path),
                    status,
                };
            }
        };
        timer.finish();

        if !state.has_content() {
            status.update(WorkflowStep::Reader, StepStatus::Error, "Failed to load PDF content");
            return WorkflowOutcome { state, status };
        }
        status.update(
            WorkflowStep::Reader,
            StepStatus::Completed,
            format!(
                "Successfully loaded {} characters",
                group_thousands(state.pdf_content.chars().count())
            ),
        );

        // Analyzer
        status.update(
            WorkflowStep::Analyzer,
            StepStatus::Running,
            format!("Analyzing document with {}...", self.llm.describe()),
        );
        let timer = OperationTimer::new("document analyzer");
        let mut state = document_analyzer_node(state, &self.llm).await;
        timer.warn_if_slow(SLOW_STEP);
        timer.finish();

        if state.document_data.document_type.is_empty() {
            status.update(
                WorkflowStep::Analyzer,
                StepStatus::Error,
                "Failed to extract document data",
            );
        } else {
            status.update(
                WorkflowStep::Analyzer,
                StepStatus::Completed,
                format!("Extracted {} document data", state.document_data.document_type),
            );
        }

        // Review loop
        status.update(WorkflowStep::Reviewer, StepStatus::Running, "Reviewing data quality...");
        let timer = OperationTimer::new("review loop");
        let max_retries = self.max_review_retries;
        for attempt in 0..=max_retries {
            state = reflection_node(state, &self.llm, max_retries).await;
            if state.is_complete {
                break;
            }
            if attempt < max_retries {
                status.update(
                    WorkflowStep::Reviewer,
                    StepStatus::Running,
                    format!("Retry {}/{} - Re-analyzing...", attempt + 1, max_retries),
                );
                state = document_analyzer_node(state, &self.llm).await;
            }
        }
        timer.finish();

        if state.is_complete && state.review_feedback != MAX_RETRIES_FEEDBACK {
            status.update(WorkflowStep::Reviewer, StepStatus::Completed, "Data quality review passed");
        } else {
            status.update(
                WorkflowStep::Reviewer,
                StepStatus::Completed,
                "Completed with maximum retries",
            );
        }

        // Formatter
        status.update(
            WorkflowStep::Formatter,
            StepStatus::Running,
            "Formatting chronology output...",
        );
        let timer = OperationTimer::new("document formatter");
        let state = document_formatter_node(state, Some(&self.llm)).await;
        timer.finish();

        if state.formatted_output.is_empty() {
            status.update(WorkflowStep::Formatter, StepStatus::Error, "Failed to format output");
        } else {
            status.update(
                WorkflowStep::Formatter,
                StepStatus::Completed,
                "Chronology formatted successfully",
            );
        }

        WorkflowOutcome { state, status }
    }
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockLlmClient;
    use crate::reader::pdf::tests::write_test_pdf;
    use tempfile::TempDir;

    const LETTER_JSON: &str = r#"{
        "document_type": "letter",
        "document_date": "2024-01-15",
        "document_description": "giving notice of delay caused by late drawings",
        "document_senderparty": [{"name": "ABC Construction", "role": "Contractor"}],
        "document_recipientparty": [{"name": "Owner Ltd", "role": "Employer"}],
        "document_mainreference": "ABC/L/0193",
        "document_otherreferences": []
    }"#;

    const ENTRY: &str = "On 15 January 2024, the Contractor sent letter to the Employer giving notice of delay, via ref. letter ABC/L/0193.";

    fn workflow(llm: MockLlmClient) -> ChronologyWorkflow<MockLlmClient> {
        ChronologyWorkflow::new(llm, &PipelineConfig::default())
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1024), "1,024");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[tokio::test]
    async fn test_run_review_passes_first_time() {
        let dir = TempDir::new().unwrap();
        let path = write_test_pdf(&dir, "letter.pdf", "Notice of Delay");
        let wf = workflow(MockLlmClient::with_responses(&[LETTER_JSON, "COMPLETE", ENTRY]));

        let outcome = wf.run(&path).await;

        assert!(outcome.succeeded());
        assert_eq!(outcome.state.formatted_output, ENTRY);
        assert_eq!(outcome.state.retry_count, 1);
        assert_eq!(wf.llm().call_count(), 3);
        assert_eq!(
            outcome.status.get(WorkflowStep::Reviewer).unwrap().message,
            "Data quality review passed"
        );
        assert!(!outcome.status.has_error());
    }

    #[tokio::test]
    async fn test_run_review_loop_is_bounded() {
        let dir = TempDir::new().unwrap();
        let path = write_test_pdf(&dir, "letter.pdf", "Notice of Delay");
        // analyze, review, re-analyze, review, re-analyze, (cap), format
        let wf = workflow(MockLlmClient::with_responses(&[
            LETTER_JSON,
            "Add the copy list.",
            LETTER_JSON,
            "Still missing the copy list.",
            LETTER_JSON,
            ENTRY,
        ]));

        let outcome = wf.run(&path).await;

        assert_eq!(wf.llm().call_count(), 6);
        assert!(outcome.state.is_complete);
        assert_eq!(outcome.state.review_feedback, MAX_RETRIES_FEEDBACK);
        assert_eq!(outcome.state.retry_count, 2);
        assert_eq!(outcome.state.formatted_output, ENTRY);
        assert_eq!(
            outcome.status.get(WorkflowStep::Reviewer).unwrap().message,
            "Completed with maximum retries"
        );
        // re-analysis carries the reviewer's feedback
        assert!(wf.llm().request(2)[2].content.contains("Add the copy list."));
    }

    #[tokio::test]
    async fn test_run_missing_file_stops_after_reader() {
        let wf = workflow(MockLlmClient::new());
        let outcome = wf.run(Path::new("/nonexistent/letter.pdf")).await;

        assert!(!outcome.succeeded());
        assert_eq!(wf.llm().call_count(), 0);
        let reader = outcome.status.get(WorkflowStep::Reader).unwrap();
        assert_eq!(reader.status, StepStatus::Error);
        assert_eq!(reader.message, "Failed to load PDF content");
        assert_eq!(
            outcome.status.get(WorkflowStep::Analyzer).unwrap().status,
            StepStatus::Pending
        );
        assert!(outcome.into_record().is_err());
    }

    #[tokio::test]
    async fn test_run_failed_analysis_continues() {
        let dir = TempDir::new().unwrap();
        let path = write_test_pdf(&dir, "scan.pdf", "Illegible");
        let wf = workflow(MockLlmClient::with_responses(&["sorry", "COMPLETE"]));

        let outcome = wf.run(&path).await;

        assert_eq!(
            outcome.status.get(WorkflowStep::Analyzer).unwrap().status,
            StepStatus::Error
        );
        assert_eq!(outcome.state.formatted_output, "No data to format");
        assert!(outcome.into_record().is_ok());
    }
}
