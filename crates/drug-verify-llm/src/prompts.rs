//! Prompts and output schemas for drug verification lookups.
//!
//! Schemas use the OpenAPI subset accepted by the `responseSchema` field of the
//! generation endpoint (upper-case type names).

use serde_json::{json, Value};

/// Registration numbers the generator must reproduce verbatim, keyed by
/// lower-case drug name.
pub const PINNED_REGISTRATIONS: &[(&str, &str)] = &[("alabukun", "04-0489")];

/// Look up the pinned registration number for a drug name, if any.
pub fn pinned_registration(name: &str) -> Option<&'static str> {
    let key = name.trim().to_lowercase();
    PINNED_REGISTRATIONS
        .iter()
        .find(|(drug, _)| *drug == key)
        .map(|(_, number)| *number)
}

/// Prompt for the simulated regulatory database role-play.
pub fn make_simulated_regulatory_prompt(term: &str) -> String {
    let pinned: Vec<String> = PINNED_REGISTRATIONS
        .iter()
        .map(|(drug, number)| format!("For \"{}\", you MUST use NAFDAC number {}.", capitalize(drug), number))
        .collect();

    format!(
        r#"You are a simulated NAFDAC drug database expert for a Nigerian university's app. The user is verifying a common Nigerian drug: "{}". Based on your knowledge, including information about drugs commonly found in Nigeria, provide a detailed verification response as a JSON object. {} For other drugs, generate plausible but fictional NAFDAC numbers and batch details. The drug should be presented as authentic."#,
        term,
        pinned.join(" ")
    )
}

/// Prompt for the open-knowledge identification attempt.
pub fn make_general_knowledge_prompt(term: &str) -> String {
    format!(
        r#"A user is searching for a drug named "{}". It was not found in the US FDA database. Search your general knowledge, including information from medical sources like ajtmh.org, pmc.ncbi.nlm.nih.gov, and regulatory bodies worldwide. If you can identify this as a legitimate medication, provide its details in a JSON object. If you cannot find any information, return an empty JSON object {{}}."#,
        term
    )
}

/// Prompt for the three drug-safety article summaries.
pub const EDUCATION_PROMPT: &str = "Generate 3 short educational article summaries about drug safety. The topics should be: 1. The Dangers of Counterfeit Medication. 2. How to Properly Store Your Medicines. 3. Understanding and Reporting Drug Side Effects. Provide only the JSON array.";

/// Full drug-detail schema, including the registration number.
pub fn drug_details_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "drugName": { "type": "STRING" },
            "genericName": { "type": "STRING" },
            "manufacturer": { "type": "STRING" },
            "nafdacNumber": {
                "type": "STRING",
                "description": "A plausible NAFDAC registration number. For Alabukun, use 04-0489."
            },
            "manufacturingDate": { "type": "STRING" },
            "expiryDate": { "type": "STRING" },
            "uses": { "type": "ARRAY", "items": { "type": "STRING" } },
            "dosage": { "type": "STRING" },
            "sideEffects": { "type": "ARRAY", "items": { "type": "STRING" } },
            "storage": { "type": "STRING" }
        },
        "required": [
            "drugName", "genericName", "manufacturer", "nafdacNumber",
            "manufacturingDate", "expiryDate", "uses", "dosage", "sideEffects", "storage"
        ]
    })
}

/// General-knowledge schema: no registration number and no batch dates.
pub fn general_knowledge_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "drugName": { "type": "STRING" },
            "genericName": { "type": "STRING" },
            "manufacturer": { "type": "STRING" },
            "uses": { "type": "ARRAY", "items": { "type": "STRING" } },
            "dosage": { "type": "STRING" },
            "sideEffects": { "type": "ARRAY", "items": { "type": "STRING" } },
            "storage": { "type": "STRING" }
        },
        "required": [
            "drugName", "genericName", "manufacturer", "uses", "dosage", "sideEffects", "storage"
        ]
    })
}

/// Schema for the educational article list.
pub fn educational_articles_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": {
                    "type": "STRING",
                    "description": "A compelling title for an article on drug safety."
                },
                "summary": {
                    "type": "STRING",
                    "description": "A short, one or two sentence summary of the article."
                }
            },
            "required": ["title", "summary"]
        }
    })
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
