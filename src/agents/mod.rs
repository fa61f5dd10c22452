// file: src/agents/mod.rs
// description: llm-backed workflow steps module exports
// reference: internal module structure

pub mod analyzer;
pub mod formatter;
pub mod patterns;
pub mod prompts;
pub mod reviewer;

pub use analyzer::{analyze_document_content, document_analyzer_node, extract_json_from_response};
pub use formatter::{
    basic_chronology, document_formatter_node, format_date_legal,
    format_document_chronology_llm, format_reference,
};
pub use reviewer::{is_review_complete, reflection_node, review_extracted_data};
