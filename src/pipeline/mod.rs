// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

mod batch;
mod orchestrator;
mod progress;
mod status;

pub use batch::{BatchFailure, BatchOutcome, BatchRunner};
pub use orchestrator::{ChronologyWorkflow, WorkflowOutcome};
pub use progress::{PipelineStats, ProgressTracker};
pub use status::{StepRecord, StepStatus, WorkflowStatus, WorkflowStep};
