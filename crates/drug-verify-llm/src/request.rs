//! Knowledge lookup requests.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::prompts::{
    drug_details_schema, general_knowledge_schema, make_general_knowledge_prompt,
    make_simulated_regulatory_prompt,
};

/// A lookup against the generative knowledge source.
///
/// Each variant selects its own prompt template and output schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum KnowledgeRequest {
    /// Role-play a regulatory database entry for a recognised local drug.
    SimulatedRegulatory { term: String },
    /// Identify the drug purely from open knowledge; may come back empty.
    GeneralKnowledge { term: String },
}

impl KnowledgeRequest {
    pub fn simulated_regulatory(term: impl Into<String>) -> Self {
        Self::SimulatedRegulatory { term: term.into() }
    }

    pub fn general_knowledge(term: impl Into<String>) -> Self {
        Self::GeneralKnowledge { term: term.into() }
    }

    /// The term as the user typed it.
    pub fn term(&self) -> &str {
        match self {
            Self::SimulatedRegulatory { term } | Self::GeneralKnowledge { term } => term,
        }
    }

    pub fn prompt(&self) -> String {
        match self {
            Self::SimulatedRegulatory { term } => make_simulated_regulatory_prompt(term),
            Self::GeneralKnowledge { term } => make_general_knowledge_prompt(term),
        }
    }

    pub fn schema(&self) -> Value {
        match self {
            Self::SimulatedRegulatory { .. } => drug_details_schema(),
            Self::GeneralKnowledge { .. } => general_knowledge_schema(),
        }
    }

    /// Whether the response carries a registration number.
    pub fn includes_registration(&self) -> bool {
        matches!(self, Self::SimulatedRegulatory { .. })
    }

    /// Short label for logs.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::SimulatedRegulatory { .. } => "simulated_regulatory",
            Self::GeneralKnowledge { .. } => "general_knowledge",
        }
    }
}
