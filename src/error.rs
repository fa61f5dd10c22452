// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChronologyError>;

#[derive(Error, Debug)]
pub enum ChronologyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{message} ({path}): {source}")]
    FileOperation {
        path: PathBuf,
        message: String,
        source: std::io::Error,
    },

    #[error("Error processing PDF {path}: {message}")]
    PdfExtraction { path: PathBuf, message: String },

    #[error("LLM request failed: {0}")]
    Llm(String),

    #[error("LLM endpoint returned status {status}: {body}")]
    LlmStatus { status: u16, body: String },

    #[error("Failed to parse model response: {0}")]
    ResponseParse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ChronologyError {
    /// Transport-level failures and throttling are worth another attempt;
    /// client errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            ChronologyError::Llm(_) => true,
            ChronologyError::LlmStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ChronologyError::Llm("connection refused".to_string()).is_transient());
        assert!(
            ChronologyError::LlmStatus {
                status: 429,
                body: String::new()
            }
            .is_transient()
        );
        assert!(
            ChronologyError::LlmStatus {
                status: 503,
                body: String::new()
            }
            .is_transient()
        );
        assert!(
            !ChronologyError::LlmStatus {
                status: 401,
                body: "bad key".to_string()
            }
            .is_transient()
        );
        assert!(!ChronologyError::Validation("x".to_string()).is_transient());
    }

    #[test]
    fn test_file_operation_message() {
        let err = ChronologyError::FileOperation {
            path: PathBuf::from("/tmp/missing.pdf"),
            message: "PDF file not found".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let text = err.to_string();
        assert!(text.starts_with("PDF file not found"));
        assert!(text.contains("/tmp/missing.pdf"));
    }
}
