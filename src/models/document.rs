// file: src/models/document.rs
// description: extracted correspondence metadata with lenient decoding from model json
// reference: internal data structures

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
}

impl Party {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
        }
    }

    /// `Name (Role)`, the form used in review and formatting summaries.
    pub fn describe(&self) -> String {
        format!("{} ({})", self.name, self.role)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentData {
    #[serde(rename = "document_type", default)]
    pub document_type: String,

    #[serde(rename = "document_date", default)]
    pub date: String,

    /// Full narrative following the document's own order.
    #[serde(rename = "document_description", default)]
    pub description: String,

    #[serde(rename = "document_senderparty", default)]
    pub sender_parties: Vec<Party>,

    #[serde(rename = "document_recipientparty", default)]
    pub recipient_parties: Vec<Party>,

    #[serde(rename = "document_mainreference", default)]
    pub main_reference: String,

    #[serde(rename = "document_otherreferences", default)]
    pub other_references: Vec<String>,
}

impl DocumentData {
    /// Builds the record from whatever JSON the model produced. Missing or
    /// null fields fall back to empty values and loosely shaped fields are
    /// coerced rather than rejected.
    pub fn from_analysis(value: &Value) -> Self {
        Self {
            document_type: string_field(value, "document_type"),
            date: string_field(value, "document_date"),
            description: string_field(value, "document_description"),
            sender_parties: party_list(value.get("document_senderparty")),
            recipient_parties: party_list(value.get("document_recipientparty")),
            main_reference: string_field(value, "document_mainreference"),
            other_references: string_list(value.get("document_otherreferences")),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn total_parties(&self) -> usize {
        self.sender_parties.len() + self.recipient_parties.len()
    }

    pub fn first_sender_role(&self) -> Option<&str> {
        self.sender_parties.first().map(|p| p.role.as_str())
    }

    pub fn first_recipient_role(&self) -> Option<&str> {
        self.recipient_parties.first().map(|p| p.role.as_str())
    }
}

/// Joins parties as `Name (Role), Name (Role)`, or `None` when empty.
pub fn describe_parties(parties: &[Party]) -> String {
    if parties.is_empty() {
        return "None".to_string();
    }
    parties
        .iter()
        .map(Party::describe)
        .collect::<Vec<_>>()
        .join(", ")
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(scalar_to_string)
        .unwrap_or_default()
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(scalar_to_string)
            .filter(|s| !s.trim().is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn party_from_value(value: &Value) -> Option<Party> {
    match value {
        Value::Object(map) => Some(Party {
            name: map.get("name").and_then(scalar_to_string).unwrap_or_default(),
            role: map.get("role").and_then(scalar_to_string).unwrap_or_default(),
        }),
        Value::String(name) if !name.trim().is_empty() => Some(Party::new(name.clone(), "")),
        _ => None,
    }
}

fn party_list(value: Option<&Value>) -> Vec<Party> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(party_from_value).collect(),
        Some(other) => party_from_value(other).into_iter().collect(),
        None => Vec::new(),
    }
}
