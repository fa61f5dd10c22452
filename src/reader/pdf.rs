// file: src/reader/pdf.rs
// description: pdf text loading and the reader step of the workflow
// reference: https://docs.rs/pdf-extract

use crate::error::{ChronologyError, Result};
use crate::models::{AgentState, DocumentData};
use crate::utils::Validator;
use std::fs;
use std::io::ErrorKind;
use std::panic;
use std::path::Path;
use tracing::{error, info, warn};

/// Reads a PDF and returns all of its text as a single string.
pub fn load_pdf_document(path: &Path) -> Result<String> {
    Validator::validate_pdf_extension(path)?;

    let bytes = fs::read(path).map_err(|source| {
        let message = match source.kind() {
            ErrorKind::NotFound => "PDF file not found",
            ErrorKind::PermissionDenied => "Permission denied accessing PDF",
            _ => "Error reading PDF",
        };
        ChronologyError::FileOperation {
            path: path.to_path_buf(),
            message: message.to_string(),
            source,
        }
    })?;

    extract_text(path, &bytes)
}

/// pdf-extract can panic on malformed content streams, so the call is
/// isolated and a panic is reported like any other parse failure.
fn extract_text(path: &Path, bytes: &[u8]) -> Result<String> {
    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ChronologyError::PdfExtraction {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
        Err(_) => Err(ChronologyError::PdfExtraction {
            path: path.to_path_buf(),
            message: "PDF parser aborted on malformed content".to_string(),
        }),
    }
}

/// Loads the document named by `state.file_path`. On success the extracted
/// data and review counters are reset; on failure `pdf_content` stays empty.
pub fn document_reader_node(state: AgentState) -> AgentState {
    if state.file_path.as_os_str().is_empty() {
        warn!("No file path provided");
        return AgentState {
            pdf_content: String::new(),
            is_complete: false,
            ..state
        };
    }

    info!("Loading PDF from: {}", state.file_path.display());

    let pdf_content = match load_pdf_document(&state.file_path) {
        Ok(text) => {
            if Validator::validate_content_not_empty(&text).is_err() {
                warn!(
                    "PDF has no extractable text (scanned image?): {}",
                    state.file_path.display()
                );
                String::new()
            } else {
                info!("Loaded PDF: {} characters", text.chars().count());
                text
            }
        }
        Err(e) => {
            error!("Error loading PDF: {}", e);
            String::new()
        }
    };

    AgentState {
        pdf_content,
        document_data: DocumentData::default(),
        is_complete: false,
        retry_count: 0,
        ..state
    }
}
