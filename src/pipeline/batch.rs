// file: src/pipeline/batch.rs
// description: runs the chronology workflow over every pdf in a directory
// reference: bounded concurrency with futures buffer_unordered

use crate::agents::reviewer::MAX_RETRIES_FEEDBACK;
use crate::config::PipelineConfig;
use crate::error::{ChronologyError, Result};
use crate::llm::LlmClient;
use crate::models::{ChronologyRecord, combined_chronology};
use crate::pipeline::orchestrator::ChronologyWorkflow;
use crate::pipeline::progress::{PipelineStats, ProgressTracker};
use crate::reader::{DocumentScanner, ScannedDocument};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub source_file: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Records in chronological order.
    pub records: Vec<ChronologyRecord>,
    pub failures: Vec<BatchFailure>,
    pub stats: PipelineStats,
}

impl BatchOutcome {
    /// Entries in date order, one paragraph each.
    pub fn combined_chronology(&self) -> String {
        combined_chronology(&self.records)
    }
}

pub struct BatchRunner<C: LlmClient> {
    workflow: ChronologyWorkflow<C>,
    config: PipelineConfig,
    show_progress: bool,
}

impl<C: LlmClient> BatchRunner<C> {
    pub fn new(llm: C, config: PipelineConfig) -> Self {
        Self {
            workflow: ChronologyWorkflow::new(llm, &config),
            config,
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub async fn run(&self, root: &Path, limit: Option<usize>) -> Result<BatchOutcome> {
        info!("Starting batch chronology run in {}", root.display());

        let mut documents = self.scan(root).await?;
        if let Some(limit) = limit {
            documents.truncate(limit);
        }

        if documents.is_empty() {
            warn!("No PDF documents found to process");
            return Ok(BatchOutcome::default());
        }

        let workers = self.config.parallel_workers.max(1);
        info!(
            "Processing {} documents with {} concurrent workflows...",
            documents.len(),
            workers
        );

        let progress = if self.show_progress {
            ProgressTracker::new(documents.len())
        } else {
            ProgressTracker::hidden(documents.len())
        };

        let results: Vec<std::result::Result<ChronologyRecord, BatchFailure>> =
            stream::iter(documents)
                .map(|document| self.process_one(document, &progress))
                .buffer_unordered(workers)
                .collect()
                .await;

        let (mut records, mut failures) = (Vec::new(), Vec::new());
        for result in results {
            match result {
                Ok(record) => records.push(record),
                Err(failure) => failures.push(failure),
            }
        }
        records.sort_by(|a, b| a.chronological_cmp(b));
        failures.sort_by(|a, b| a.source_file.cmp(&b.source_file));

        let stats = progress.get_stats();
        progress.finish();
        log_final_stats(&stats);

        Ok(BatchOutcome {
            records,
            failures,
            stats,
        })
    }

    async fn scan(&self, root: &Path) -> Result<Vec<ScannedDocument>> {
        let root = root.to_path_buf();
        let config = self.config.clone();

        tokio::task::spawn_blocking(move || DocumentScanner::new(config).scan_directory(&root))
            .await
            .map_err(|e| ChronologyError::Validation(format!("Directory scan task failed: {}", e)))?
    }

    async fn process_one(
        &self,
        document: ScannedDocument,
        progress: &ProgressTracker,
    ) -> std::result::Result<ChronologyRecord, BatchFailure> {
        progress.set_message(document.relative_path.clone());
        let outcome = self.workflow.run(&document.path).await;

        match outcome.into_record() {
            Ok(record) => {
                if !record.is_complete || record.review_feedback == MAX_RETRIES_FEEDBACK {
                    progress.inc_incomplete_review();
                }
                progress.inc_processed(record.content_chars as u64);
                Ok(record)
            }
            Err(e) => {
                warn!("Failed to process {}: {}", document.relative_path, e);
                progress.inc_failed();
                Err(BatchFailure {
                    source_file: document.path.display().to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

fn log_final_stats(stats: &PipelineStats) {
    info!("=== Batch Summary ===");
    info!("Duration: {} seconds", stats.duration_secs);
    info!("Documents processed: {}", stats.documents_processed);
    info!("Documents failed: {}", stats.documents_failed);
    info!("Reviews capped at retry limit: {}", stats.incomplete_reviews);
    info!("Characters extracted: {}", stats.total_chars_extracted);
    info!("Success rate: {:.1}%", stats.success_rate());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockLlmClient;
    use crate::reader::pdf::tests::write_test_pdf;
    use std::fs;
    use tempfile::TempDir;

    fn letter_json(date: &str, reference: &str) -> String {
        format!(
            r#"{{"document_type": "letter", "document_date": "{}", "document_description": "about delay",
                "document_senderparty": [{{"name": "ABC", "role": "Contractor"}}],
                "document_recipientparty": [{{"name": "Owner", "role": "Employer"}}],
                "document_mainreference": "{}", "document_otherreferences": []}}"#,
            date, reference
        )
    }

    fn sequential() -> PipelineConfig {
        PipelineConfig {
            parallel_workers: 1,
            ..PipelineConfig::default()
        }
    }

    #[tokio::test]
    async fn test_batch_orders_by_document_date() {
        let dir = TempDir::new().unwrap();
        write_test_pdf(&dir, "a_later.pdf", "Second letter");
        write_test_pdf(&dir, "b_earlier.pdf", "First letter");
        fs::write(dir.path().join("c_broken.pdf"), b"not really a pdf").unwrap();

        let later = letter_json("2024-06-01", "L-2");
        let earlier = letter_json("2024-01-10", "L-1");
        let llm = MockLlmClient::with_responses(&[
            later.as_str(),
            "COMPLETE",
            "On 01 June 2024, second entry.",
            earlier.as_str(),
            "COMPLETE",
            "On 10 January 2024, first entry.",
        ]);

        let runner = BatchRunner::new(llm, sequential()).with_progress(false);
        let outcome = runner.run(dir.path(), None).await.unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].source_file.ends_with("c_broken.pdf"));
        assert!(outcome.records[0].source_file.ends_with("b_earlier.pdf"));
        assert_eq!(
            outcome.combined_chronology(),
            "On 10 January 2024, first entry.\n\nOn 01 June 2024, second entry."
        );
        assert_eq!(outcome.stats.documents_processed, 2);
        assert_eq!(outcome.stats.documents_failed, 1);
    }

    #[tokio::test]
    async fn test_batch_limit_and_empty_dir() {
        let dir = TempDir::new().unwrap();
        let runner = BatchRunner::new(MockLlmClient::new(), sequential()).with_progress(false);
        let outcome = runner.run(dir.path(), None).await.unwrap();
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.combined_chronology(), "");

        write_test_pdf(&dir, "one.pdf", "One");
        write_test_pdf(&dir, "two.pdf", "Two");
        let outcome = runner.run(dir.path(), Some(1)).await.unwrap();
        // analyzer and reviewer both fail, formatter has no data
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].chronology, "No data to format");
        assert_eq!(outcome.stats.incomplete_reviews, 1);
    }

    #[tokio::test]
    async fn test_batch_missing_directory() {
        let runner = BatchRunner::new(MockLlmClient::new(), sequential()).with_progress(false);
        assert!(runner.run(Path::new("/nonexistent/docs"), None).await.is_err());
    }
}
