// file: src/models/record.rs
// description: finished chronology entry with provenance for export
// reference: internal data structures

use super::document::DocumentData;
use super::state::AgentState;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChronologyRecord {
    pub id: String,
    pub source_file: String,
    pub content_hash: String,
    pub content_chars: usize,
    pub document: DocumentData,
    pub review_feedback: String,
    pub retry_count: u32,
    pub is_complete: bool,
    pub chronology: String,
    pub generated_at: String,
}

impl ChronologyRecord {
    pub fn from_state(state: &AgentState) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source_file: state.file_path.display().to_string(),
            content_hash: Self::compute_hash(&state.pdf_content),
            content_chars: state.pdf_content.chars().count(),
            document: state.document_data.clone(),
            review_feedback: state.review_feedback.clone(),
            retry_count: state.retry_count,
            is_complete: state.is_complete,
            chronology: state.formatted_output.clone(),
            generated_at: Utc::now().to_rfc3339(),
        }
    }

    pub(crate) fn compute_hash(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn document_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.document.date.trim(), "%Y-%m-%d").ok()
    }

    /// Chronological order: dated entries first, undated after, ties broken
    /// by source file.
    pub fn chronological_cmp(&self, other: &Self) -> Ordering {
        match (self.document_date(), other.document_date()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| self.source_file.cmp(&other.source_file))
    }
}

/// Non-empty entries joined as paragraphs, in the order given.
pub fn combined_chronology(records: &[ChronologyRecord]) -> String {
    records
        .iter()
        .map(|r| r.chronology.as_str())
        .filter(|entry| !entry.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(file: &str, date: &str) -> ChronologyRecord {
        let mut state = AgentState::new(file);
        state.pdf_content = format!("content of {}", file);
        state.document_data.date = date.to_string();
        ChronologyRecord::from_state(&state)
    }

    #[test]
    fn test_hash_consistency() {
        let hash1 = ChronologyRecord::compute_hash("Test content");
        let hash2 = ChronologyRecord::compute_hash("Test content");
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_from_state_copies_fields() {
        let mut state = AgentState::new("/docs/rfi.pdf");
        state.pdf_content = "héllo".to_string();
        state.formatted_output = "On 05 March 2024, ...".to_string();
        state.retry_count = 1;
        state.is_complete = true;

        let record = ChronologyRecord::from_state(&state);
        assert_eq!(record.source_file, "/docs/rfi.pdf");
        assert_eq!(record.content_chars, 5);
        assert_eq!(record.chronology, "On 05 March 2024, ...");
        assert_eq!(record.retry_count, 1);
        assert!(record.is_complete);
        assert!(Uuid::parse_str(&record.id).is_ok());
    }

    #[test]
    fn test_chronological_ordering() {
        let mut records = vec![
            record("c.pdf", ""),
            record("b.pdf", "2024-05-01"),
            record("a.pdf", "2023-12-24"),
            record("d.pdf", "sometime in June"),
        ];
        records.sort_by(|a, b| a.chronological_cmp(b));

        let order: Vec<&str> = records.iter().map(|r| r.source_file.as_str()).collect();
        assert_eq!(order, vec!["a.pdf", "b.pdf", "c.pdf", "d.pdf"]);
    }
}
