// file: src/reader/mod.rs
// description: document loading module exports
// reference: internal module structure

pub mod pdf;
pub mod scanner;

pub use pdf::{document_reader_node, load_pdf_document};
pub use scanner::{DocumentScanner, ScannedDocument};
