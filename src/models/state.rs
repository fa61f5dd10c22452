// file: src/models/state.rs
// description: shared record threaded through the reader, analyzer, reviewer and formatter steps
// reference: internal data structures

use super::document::DocumentData;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentState {
    pub file_path: PathBuf,
    pub pdf_content: String,
    pub document_data: DocumentData,
    pub review_feedback: String,
    pub formatted_output: String,
    pub is_complete: bool,
    pub retry_count: u32,
}

impl AgentState {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Default::default()
        }
    }

    pub fn has_content(&self) -> bool {
        !self.pdf_content.is_empty()
    }
}
