//! Generative knowledge-source client.
//!
//! Backs both the simulated regulatory tier and the general-knowledge tier.
//! Transport, API and parse failures are logged here and come back as `None`.

use drug_verify_llm::{
    parse_drug_response, pinned_registration, GeneratedDrug, GeneratedList, KnowledgeRequest,
    LlmClient, LlmResult,
};

use crate::models::{DataSource, DrugRecord, TextOrList};
use crate::normalize::{non_blank, RecordBuilder, NOT_FROM_THIS_SOURCE};

/// A source that can answer knowledge requests with a canonical record.
pub trait DrugKnowledge: Send + Sync {
    /// `None` means the source had nothing or could not be reached.
    fn lookup(&self, request: &KnowledgeRequest) -> Option<DrugRecord>;
}

/// [`DrugKnowledge`] backed by a structured-generation client.
pub struct GenerativeKnowledge<C: LlmClient> {
    client: C,
}

impl<C: LlmClient> GenerativeKnowledge<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn try_lookup(&self, request: &KnowledgeRequest) -> LlmResult<Option<DrugRecord>> {
        let text = self
            .client
            .generate_json(&request.prompt(), &request.schema())?;

        Ok(parse_drug_response(&text)?.and_then(|generated| to_record(request, generated)))
    }
}

impl<C: LlmClient> DrugKnowledge for GenerativeKnowledge<C> {
    fn lookup(&self, request: &KnowledgeRequest) -> Option<DrugRecord> {
        match self.try_lookup(request) {
            Ok(Some(record)) => {
                tracing::debug!(
                    term = %request.term(),
                    mode = request.mode(),
                    drug = %record.drug_name,
                    "Knowledge source returned a record"
                );
                Some(record)
            }
            Ok(None) => {
                tracing::debug!(term = %request.term(), mode = request.mode(), "Knowledge source had no answer");
                None
            }
            Err(e) => {
                tracing::warn!(
                    term = %request.term(),
                    mode = request.mode(),
                    error = %e,
                    "Knowledge lookup failed"
                );
                None
            }
        }
    }
}

/// Map generated details to a canonical record.
///
/// A blank drug name means the generator did not identify anything.
pub fn to_record(request: &KnowledgeRequest, generated: GeneratedDrug) -> Option<DrugRecord> {
    let drug_name = non_blank(generated.drug_name)?;

    let (source, nafdac_number) = if request.includes_registration() {
        // Pinned numbers win over whatever the generator produced
        let number = pinned_registration(request.term())
            .map(str::to_string)
            .or(generated.nafdac_number);
        (DataSource::SimulatedNafdac, number)
    } else {
        (DataSource::AiKnowledgeBase, None)
    };

    Some(
        RecordBuilder::new(source)
            .date_fallback(NOT_FROM_THIS_SOURCE)
            .drug_name(Some(drug_name))
            .generic_name(generated.generic_name)
            .manufacturer(generated.manufacturer)
            .manufacturing_date(generated.manufacturing_date)
            .expiry_date(generated.expiry_date)
            .uses(generated.uses.map(to_text_or_list))
            .dosage(generated.dosage)
            .side_effects(generated.side_effects.map(to_text_or_list))
            .storage(generated.storage)
            .nafdac_number(nafdac_number)
            .build(),
    )
}

fn to_text_or_list(list: GeneratedList) -> TextOrList {
    match list {
        GeneratedList::Many(items) => TextOrList::List(items),
        GeneratedList::One(text) => TextOrList::Text(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::NOT_AVAILABLE;
    use drug_verify_llm::{MockLlmClient, MockReply};

    const PARACETAMOL_JSON: &str = r#"{"drugName":"Paracetamol","genericName":"Acetaminophen","manufacturer":"Emzor Pharmaceuticals","nafdacNumber":"A4-1234","manufacturingDate":"2024-02","expiryDate":"2027-02","uses":["Fever","Mild pain"],"dosage":"500mg-1g every 4-6 hours","sideEffects":["Rare skin rash"],"storage":"Below 30C"}"#;

    #[test]
    fn test_simulated_mode_stamps_source_and_registration() {
        let knowledge = GenerativeKnowledge::new(MockLlmClient::new(PARACETAMOL_JSON));
        let record = knowledge
            .lookup(&KnowledgeRequest::simulated_regulatory("Paracetamol"))
            .unwrap();

        assert_eq!(record.data_source, DataSource::SimulatedNafdac);
        assert_eq!(record.nafdac_number.as_deref(), Some("A4-1234"));
        assert_eq!(record.manufacturing_date, "2024-02");
    }

    #[test]
    fn test_general_mode_drops_registration_and_fills_dates() {
        let json = r#"{"drugName":"Coartem","genericName":"Artemether/Lumefantrine","manufacturer":"Novartis","nafdacNumber":"X","uses":["Malaria"],"dosage":"4 tablets","sideEffects":["Headache"],"storage":"Dry place"}"#;
        let knowledge = GenerativeKnowledge::new(MockLlmClient::new(json));
        let record = knowledge
            .lookup(&KnowledgeRequest::general_knowledge("Coartem"))
            .unwrap();

        assert_eq!(record.data_source, DataSource::AiKnowledgeBase);
        assert_eq!(record.nafdac_number, None);
        assert_eq!(record.manufacturing_date, NOT_FROM_THIS_SOURCE);
        assert_eq!(record.expiry_date, NOT_FROM_THIS_SOURCE);
    }

    #[test]
    fn test_pinned_registration_overrides_generated_value() {
        let json = r#"{"drugName":"Alabukun","nafdacNumber":"99-9999"}"#;
        let knowledge = GenerativeKnowledge::new(MockLlmClient::new(json));
        let record = knowledge
            .lookup(&KnowledgeRequest::simulated_regulatory(" Alabukun"))
            .unwrap();

        assert_eq!(record.nafdac_number.as_deref(), Some("04-0489"));
        assert_eq!(record.generic_name, NOT_AVAILABLE);
    }

    #[test]
    fn test_empty_object_is_absent() {
        let knowledge = GenerativeKnowledge::new(MockLlmClient::new("{}"));
        assert!(knowledge
            .lookup(&KnowledgeRequest::general_knowledge("zzz"))
            .is_none());
    }

    #[test]
    fn test_blank_drug_name_is_absent() {
        let knowledge = GenerativeKnowledge::new(MockLlmClient::new(r#"{"drugName":"  "}"#));
        assert!(knowledge
            .lookup(&KnowledgeRequest::general_knowledge("zzz"))
            .is_none());
    }

    #[test]
    fn test_transport_and_parse_failures_are_absent() {
        let down = GenerativeKnowledge::new(MockLlmClient::failing("connection refused"));
        assert!(down
            .lookup(&KnowledgeRequest::simulated_regulatory("paracetamol"))
            .is_none());

        let garbled = GenerativeKnowledge::new(
            MockLlmClient::new("").with_queued(MockReply::Text("not json at all".into())),
        );
        assert!(garbled
            .lookup(&KnowledgeRequest::general_knowledge("paracetamol"))
            .is_none());
    }

    #[test]
    fn test_request_prompt_reaches_client() {
        let knowledge = GenerativeKnowledge::new(MockLlmClient::new("{}"));
        knowledge.lookup(&KnowledgeRequest::simulated_regulatory("Flagyl"));

        let prompts = knowledge.client().prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("\"Flagyl\""));
        assert!(prompts[0].contains("simulated NAFDAC"));
    }
}
