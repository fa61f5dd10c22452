// file: src/pipeline/status.rs
// description: per-step status tracking for a single document run

use crate::utils::logging::{format_error, format_info, format_pending, format_step, format_success};
use serde::Serialize;
use std::fmt;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStep {
    Reader,
    Analyzer,
    Reviewer,
    Formatter,
}

impl WorkflowStep {
    pub const ALL: [WorkflowStep; 4] = [
        WorkflowStep::Reader,
        WorkflowStep::Analyzer,
        WorkflowStep::Reviewer,
        WorkflowStep::Formatter,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            WorkflowStep::Reader => "Document Reader",
            WorkflowStep::Analyzer => "Document Analyzer",
            WorkflowStep::Reviewer => "Reflection Agent",
            WorkflowStep::Formatter => "Document Formatter",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            WorkflowStep::Reader => "Loading and extracting text from PDF",
            WorkflowStep::Analyzer => "Analyzing content and extracting structured data",
            WorkflowStep::Reviewer => "Reviewing data completeness and accuracy",
            WorkflowStep::Formatter => "Formatting final chronology output",
        }
    }

    fn position(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0) + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Error,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StepStatus::Pending => "pending",
            StepStatus::Running => "running",
            StepStatus::Completed => "completed",
            StepStatus::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub step: WorkflowStep,
    pub status: StepStatus,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowStatus {
    label: String,
    steps: Vec<StepRecord>,
}

impl WorkflowStatus {
    /// All steps pending. `label` prefixes log lines so batch runs stay
    /// readable.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            steps: WorkflowStep::ALL
                .iter()
                .map(|&step| StepRecord {
                    step,
                    status: StepStatus::Pending,
                    message: String::new(),
                })
                .collect(),
        }
    }

    pub fn update(&mut self, step: WorkflowStep, status: StepStatus, message: impl Into<String>) {
        let message = message.into();

        match status {
            StepStatus::Error => error!("[{}] {}: {}", self.label, step.title(), message),
            StepStatus::Pending => {}
            _ => info!(
                "[{}] {} {}: {}",
                self.label,
                step.title(),
                status,
                message
            ),
        }

        if let Some(record) = self.steps.iter_mut().find(|r| r.step == step) {
            record.status = status;
            record.message = message;
        }
    }

    pub fn get(&self, step: WorkflowStep) -> Option<&StepRecord> {
        self.steps.iter().find(|r| r.step == step)
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    pub fn has_error(&self) -> bool {
        self.steps.iter().any(|r| r.status == StepStatus::Error)
    }

    /// One status card per step, in workflow order.
    pub fn render(&self) -> String {
        let total = self.steps.len();
        self.steps
            .iter()
            .map(|record| {
                let step = record.step;
                let header = format_step(step.position(), total, step.title());
                let detail = if record.message.is_empty() {
                    step.description().to_string()
                } else {
                    record.message.clone()
                };
                let line = match record.status {
                    StepStatus::Pending => format_pending(&detail),
                    StepStatus::Running => format_info(&detail),
                    StepStatus::Completed => format_success(&detail),
                    StepStatus::Error => format_error(&detail),
                };
                format!("{}\n    {}", header, line)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
