// file: src/pipeline/progress.rs
// description: progress tracking and statistics reporting for batch runs
// reference: uses indicatif for progress bars and tracks processing metrics

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineStats {
    pub documents_processed: usize,
    pub documents_failed: usize,
    pub incomplete_reviews: usize,
    pub total_chars_extracted: u64,
    pub duration_secs: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents_per_minute(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        self.documents_processed as f64 * 60.0 / self.duration_secs as f64
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.documents_processed + self.documents_failed;
        if total == 0 {
            return 0.0;
        }
        (self.documents_processed as f64 / total as f64) * 100.0
    }
}

pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    documents_processed: Arc<AtomicUsize>,
    documents_failed: Arc<AtomicUsize>,
    incomplete_reviews: Arc<AtomicUsize>,
    chars_extracted: Arc<AtomicU64>,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new(total_documents: usize) -> Self {
        Self::with_color(total_documents, true)
    }

    pub fn with_color(total_documents: usize, colored: bool) -> Self {
        let multi_progress = MultiProgress::new();

        let main_bar = create_progress_bar(&multi_progress, total_documents as u64, colored);
        let detail_bar = create_detail_bar(&multi_progress);

        Self {
            main_bar,
            detail_bar,
            documents_processed: Arc::new(AtomicUsize::new(0)),
            documents_failed: Arc::new(AtomicUsize::new(0)),
            incomplete_reviews: Arc::new(AtomicUsize::new(0)),
            chars_extracted: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    /// Hidden bars, for tests and non-interactive runs.
    pub fn hidden(total_documents: usize) -> Self {
        let tracker = Self::with_color(total_documents, false);
        tracker.main_bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        tracker.detail_bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        tracker
    }

    pub fn inc_processed(&self, chars: u64) {
        self.documents_processed.fetch_add(1, Ordering::SeqCst);
        self.chars_extracted.fetch_add(chars, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn inc_failed(&self) {
        self.documents_failed.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn inc_incomplete_review(&self) {
        self.incomplete_reviews.fetch_add(1, Ordering::SeqCst);
    }

    pub fn set_message(&self, message: String) {
        self.main_bar.set_message(message);
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("Processing complete");
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> PipelineStats {
        PipelineStats {
            documents_processed: self.documents_processed.load(Ordering::SeqCst),
            documents_failed: self.documents_failed.load(Ordering::SeqCst),
            incomplete_reviews: self.incomplete_reviews.load(Ordering::SeqCst),
            total_chars_extracted: self.chars_extracted.load(Ordering::SeqCst),
            duration_secs: self.start_time.elapsed().as_secs(),
        }
    }

    fn update_detail_bar(&self) {
        let processed = self.documents_processed.load(Ordering::SeqCst);
        let failed = self.documents_failed.load(Ordering::SeqCst);

        self.detail_bar
            .set_message(format!("Chronology entries: {} | Failed: {}", processed, failed));
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    let template = if colored {
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}"
    } else {
        "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({eta}) {msg}"
    };
    let chars = if colored { "█▓▒░" } else { "=>-" };

    if let Ok(style) = ProgressStyle::default_bar().template(template) {
        bar.set_style(style.progress_chars(chars));
    }
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    if let Ok(style) = ProgressStyle::default_bar().template("{msg}") {
        bar.set_style(style);
    }
    bar
}
