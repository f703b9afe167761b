//! Verification methods and outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::DrugRecord;

/// Which field of the user's input is being verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationMethod {
    /// Brand or generic drug name.
    #[serde(rename = "name")]
    ByName,
    /// Product code (e.g. an NDC).
    #[serde(rename = "code")]
    ByCode,
}

impl VerificationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationMethod::ByName => "name",
            VerificationMethod::ByCode => "code",
        }
    }

    /// Parse the stored form ("name" / "code").
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(VerificationMethod::ByName),
            "code" => Some(VerificationMethod::ByCode),
            _ => None,
        }
    }

    /// Message shown when the user submits a blank term.
    pub fn empty_term_message(&self) -> &'static str {
        match self {
            VerificationMethod::ByName => "Please enter a drug name.",
            VerificationMethod::ByCode => "Please enter a verification code.",
        }
    }
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed guidance attached to every "not verified" result.
pub const NOT_VERIFIED_NEXT_STEPS: [&str; 4] = [
    "Double-check the spelling and format.",
    "If you have the product, compare the name/code with the packaging.",
    "Consult a pharmacist or healthcare provider with your concerns.",
    "Do not use any medication you cannot verify.",
];

/// Message for failures inside resolution itself (not source outages).
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Report for a term no source could verify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterfeitReport {
    pub message: String,
    pub next_steps: Vec<String>,
}

impl CounterfeitReport {
    /// The static "not verified" report. `term` is quoted exactly as given.
    pub fn not_verified(term: &str) -> Self {
        Self {
            message: format!(
                "The drug \"{}\" could not be verified in our available data sources.",
                term
            ),
            next_steps: NOT_VERIFIED_NEXT_STEPS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Result of a verification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationOutcome {
    /// Nothing has been verified yet.
    Idle,
    /// A verification is in flight.
    Loading,
    /// A source recognised the drug.
    Authentic { record: DrugRecord },
    /// No source could verify the drug.
    Counterfeit { report: CounterfeitReport },
    /// Verification could not be completed.
    Error { message: String },
}

impl VerificationOutcome {
    pub fn unexpected_error() -> Self {
        VerificationOutcome::Error {
            message: UNEXPECTED_ERROR_MESSAGE.to_string(),
        }
    }

    /// Authentic and counterfeit are terminal business results; they are the
    /// only outcomes that enter the search history.
    pub fn is_conclusive(&self) -> bool {
        matches!(
            self,
            VerificationOutcome::Authentic { .. } | VerificationOutcome::Counterfeit { .. }
        )
    }

    pub fn record(&self) -> Option<&DrugRecord> {
        match self {
            VerificationOutcome::Authentic { record } => Some(record),
            _ => None,
        }
    }

    pub fn report(&self) -> Option<&CounterfeitReport> {
        match self {
            VerificationOutcome::Counterfeit { report } => Some(report),
            _ => None,
        }
    }
}
