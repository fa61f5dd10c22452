// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod document;
pub mod record;
pub mod state;

pub use document::{DocumentData, Party, describe_parties};
pub use record::{ChronologyRecord, combined_chronology};
pub use state::AgentState;
