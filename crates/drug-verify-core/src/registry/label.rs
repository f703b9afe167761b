//! Drug-label wire types and their mapping to [`DrugRecord`].
//!
//! Every nested field is optional on the wire, and an explicit `null` counts
//! as missing. Missing structure maps to the "Not available" sentinels
//! rather than failing the lookup.

use serde::Deserialize;

use crate::models::{DataSource, DrugRecord, TextOrList};
use crate::normalize::{RecordBuilder, BATCH_SPECIFIC_UNAVAILABLE};

use super::RegistryResult;

/// Top-level label search response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelResponse {
    #[serde(default)]
    pub results: Option<Vec<DrugLabel>>,
}

/// One product label.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DrugLabel {
    #[serde(default)]
    pub openfda: Option<OpenFdaFields>,
    #[serde(default)]
    pub indications_and_usage: Option<Vec<String>>,
    #[serde(default)]
    pub dosage_and_administration: Option<Vec<String>>,
    #[serde(default)]
    pub adverse_reactions: Option<Vec<String>>,
    #[serde(default)]
    pub storage_and_handling: Option<Vec<String>>,
}

/// Harmonized provenance block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenFdaFields {
    #[serde(default)]
    pub brand_name: Option<Vec<String>>,
    #[serde(default)]
    pub generic_name: Option<Vec<String>>,
    #[serde(default)]
    pub manufacturer_name: Option<Vec<String>>,
}

/// Parse a label response body and map its first result.
///
/// Zero results is `Ok(None)`.
pub fn parse_label_response(body: &str) -> RegistryResult<Option<DrugRecord>> {
    let response: LabelResponse = serde_json::from_str(body)?;
    Ok(response
        .results
        .and_then(|results| results.into_iter().next())
        .map(label_to_record))
}

/// Map a label to a record. Dates are never claimed: labels are
/// product-level, not batch-level.
pub fn label_to_record(label: DrugLabel) -> DrugRecord {
    let openfda = label.openfda.unwrap_or_default();

    let uses = label
        .indications_and_usage
        .filter(|items| !items.is_empty())
        .map(TextOrList::List);

    RecordBuilder::new(DataSource::UsFda)
        .date_fallback(BATCH_SPECIFIC_UNAVAILABLE)
        .drug_name(first(openfda.brand_name))
        .generic_name(first(openfda.generic_name))
        .manufacturer(first(openfda.manufacturer_name))
        .uses(uses)
        .dosage(first(label.dosage_and_administration))
        .side_effects(first(label.adverse_reactions).map(TextOrList::Text))
        .storage(first(label.storage_and_handling))
        .build()
}

fn first(values: Option<Vec<String>>) -> Option<String> {
    values?.into_iter().next()
}
