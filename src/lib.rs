// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod agents;
pub mod config;
pub mod error;
pub mod exporter;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod reader;
pub mod utils;

pub use config::{Config, LlmConfig, OutputConfig, PipelineConfig, ProviderKind};
pub use error::{ChronologyError, Result};
pub use exporter::{ChronologyExporter, ExportManifest};
pub use llm::{ChatMessage, LlmClient, LlmProvider, OllamaClient, OpenAiClient};
pub use models::{AgentState, ChronologyRecord, DocumentData, Party};
pub use pipeline::{
    BatchOutcome, BatchRunner, ChronologyWorkflow, PipelineStats, ProgressTracker, StepStatus,
    WorkflowOutcome, WorkflowStatus, WorkflowStep,
};
pub use reader::{DocumentScanner, ScannedDocument, load_pdf_document};
pub use utils::{HealthCheck, HealthReport, HealthStatus, OperationTimer, PromptTemplate, Validator};
