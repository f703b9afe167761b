//! Canonical drug record shared by every verification source.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Provenance of a drug record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataSource {
    #[serde(rename = "Simulated NAFDAC Database")]
    SimulatedNafdac,
    #[serde(rename = "AI Knowledge Base")]
    AiKnowledgeBase,
    #[serde(rename = "U.S. FDA Database")]
    UsFda,
}

impl DataSource {
    /// Human-readable label shown alongside the record.
    pub fn label(&self) -> &'static str {
        match self {
            DataSource::SimulatedNafdac => "Simulated NAFDAC Database",
            DataSource::AiKnowledgeBase => "AI Knowledge Base",
            DataSource::UsFda => "U.S. FDA Database",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A field that is a list when the source can decompose it, otherwise one string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextOrList {
    List(Vec<String>),
    Text(String),
}

impl TextOrList {
    pub fn text(value: impl Into<String>) -> Self {
        TextOrList::Text(value.into())
    }

    /// Flatten into a list (a single string becomes a one-item list).
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            TextOrList::List(items) => items.clone(),
            TextOrList::Text(text) => vec![text.clone()],
        }
    }
}

/// Canonical drug details, whichever tier produced them.
///
/// Unavailable values are spelled out with sentinel text, never left empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrugRecord {
    pub drug_name: String,
    pub generic_name: String,
    pub manufacturer: String,
    pub manufacturing_date: String,
    pub expiry_date: String,
    pub uses: TextOrList,
    pub dosage: String,
    pub side_effects: TextOrList,
    pub storage: String,
    /// Only the simulated regulatory tier supplies this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nafdac_number: Option<String>,
    pub data_source: DataSource,
}
