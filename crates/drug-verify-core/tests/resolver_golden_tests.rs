//! Golden tests for the tiered resolver.
//!
//! Each case wires the standard tier chain to a scripted generation client
//! and a counting label registry, then checks the outcome and which sources
//! were consulted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use drug_verify_core::known_terms::COMMON_LOCAL_DRUGS;
use drug_verify_core::models::{DataSource, DrugRecord, TextOrList, VerificationMethod};
use drug_verify_core::normalize::{BATCH_SPECIFIC_UNAVAILABLE, NOT_AVAILABLE, NOT_FROM_THIS_SOURCE};
use drug_verify_core::registry::{parse_label_response, DrugRegistry};
use drug_verify_core::{GenerativeKnowledge, Resolver, VerificationOutcome};
use drug_verify_llm::{MockLlmClient, MockReply};
use proptest::prelude::*;

use VerificationMethod::{ByCode, ByName};

const PANADOL_LABEL: &str = r#"{"results": [{
    "openfda": {
        "brand_name": ["Panadol"],
        "generic_name": ["ACETAMINOPHEN"],
        "manufacturer_name": ["Haleon US Holdings LLC"]
    },
    "indications_and_usage": ["temporarily relieves minor aches and pains"],
    "dosage_and_administration": ["adults: 2 caplets every 6 hours"],
    "storage_and_handling": ["store at 20-25C"]
}]}"#;

const ALABUKUN_JSON: &str = r#"{"drugName":"Alabukun Powder","genericName":"Acetylsalicylic acid + Caffeine","manufacturer":"Alabukun Products Ltd","nafdacNumber":"A7-7777","manufacturingDate":"2024-05","expiryDate":"2027-05","uses":["Headache"],"dosage":"1 sachet","sideEffects":["Stomach upset"],"storage":"Cool dry place"}"#;

const PARACETAMOL_JSON: &str = r#"{"drugName":"Paracetamol","genericName":"Acetaminophen","manufacturer":"Emzor","nafdacNumber":"04-1111","manufacturingDate":"2024-01","expiryDate":"2027-01","uses":["Fever"],"dosage":"500mg","sideEffects":["Rash"],"storage":"Below 30C"}"#;

const COARTEM_JSON: &str = r#"{"drugName":"Coartem","genericName":"Artemether/Lumefantrine","manufacturer":"Novartis","uses":["Uncomplicated malaria"],"dosage":"4 tablets twice daily for 3 days","sideEffects":"Headache, dizziness","storage":"Below 30C"}"#;

/// Label registry double that counts calls and records the terms it saw.
#[derive(Default)]
struct CountingRegistry {
    labels: HashMap<(String, VerificationMethod), String>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl CountingRegistry {
    fn with_label(mut self, term: &str, method: VerificationMethod, body: &str) -> Self {
        self.labels.insert((term.to_string(), method), body.to_string());
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl DrugRegistry for CountingRegistry {
    fn lookup(&self, term: &str, method: VerificationMethod) -> Option<DrugRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(term.to_string());
        let body = self.labels.get(&(term.to_string(), method))?;
        parse_label_response(body).ok().flatten()
    }
}

/// Needle that only matches the simulated regulatory prompt for `term`.
fn simulated(term: &str) -> String {
    format!("drug: \"{}\"", term)
}

/// Needle that only matches the general-knowledge prompt for `term`.
fn general(term: &str) -> String {
    format!("named \"{}\"", term)
}

struct Harness {
    llm: Arc<MockLlmClient>,
    registry: Arc<CountingRegistry>,
    resolver: Resolver,
}

fn harness(llm: MockLlmClient, registry: CountingRegistry) -> Harness {
    let llm = Arc::new(llm);
    let registry = Arc::new(registry);
    let resolver = Resolver::new(
        Arc::new(GenerativeKnowledge::new(Arc::clone(&llm))),
        registry.clone(),
    );
    Harness {
        llm,
        registry,
        resolver,
    }
}

fn authentic(outcome: &VerificationOutcome) -> &DrugRecord {
    outcome
        .record()
        .unwrap_or_else(|| panic!("expected AUTHENTIC, got {:?}", outcome))
}

#[test]
fn test_known_name_resolved_by_simulated_tier() {
    let h = harness(
        MockLlmClient::new("{}").with_rule(&simulated("paracetamol"), MockReply::Text(PARACETAMOL_JSON.into())),
        CountingRegistry::default(),
    );

    let outcome = h.resolver.resolve("paracetamol", ByName);
    let record = authentic(&outcome);

    assert_eq!(record.data_source, DataSource::SimulatedNafdac);
    assert_eq!(record.nafdac_number.as_deref(), Some("04-1111"));
    // Short-circuit: neither later tier was consulted
    assert_eq!(h.registry.calls(), 0);
    assert_eq!(h.llm.call_count(), 1);
}

#[test]
fn test_alabukun_registration_is_pinned() {
    let h = harness(
        MockLlmClient::new("{}").with_rule(&simulated("alabukun"), MockReply::Text(ALABUKUN_JSON.into())),
        CountingRegistry::default(),
    );

    let outcome = h.resolver.resolve("alabukun", ByName);
    assert_eq!(authentic(&outcome).nafdac_number.as_deref(), Some("04-0489"));
}

#[test]
fn test_simulated_tier_down_falls_through_to_registry() {
    let h = harness(
        MockLlmClient::new("{}").with_rule(&simulated("paracetamol"), MockReply::Fail("503".into())),
        CountingRegistry::default().with_label("paracetamol", ByName, PANADOL_LABEL),
    );

    let outcome = h.resolver.resolve("paracetamol", ByName);
    let record = authentic(&outcome);

    assert_eq!(record.drug_name, "Panadol");
    assert_eq!(record.data_source.label(), "U.S. FDA Database");
    assert_eq!(record.manufacturing_date, BATCH_SPECIFIC_UNAVAILABLE);
    assert_eq!(record.expiry_date, BATCH_SPECIFIC_UNAVAILABLE);
    // Label had no adverse reactions
    assert_eq!(record.side_effects, TextOrList::text(NOT_AVAILABLE));
    // Tier 3 never ran
    assert_eq!(h.llm.call_count(), 1);
}

#[test]
fn test_code_with_no_registry_match_is_counterfeit() {
    let h = harness(MockLlmClient::new(COARTEM_JSON), CountingRegistry::default());

    let outcome = h.resolver.resolve("0071-0157-13", ByCode);
    let report = outcome.report().expect("expected COUNTERFEIT");

    assert!(report.message.contains("0071-0157-13"));
    assert_eq!(report.next_steps.len(), 4);
    assert_eq!(h.registry.calls(), 1);
    // Codes never reach the knowledge source
    assert_eq!(h.llm.call_count(), 0);
}

#[test]
fn test_code_matching_known_name_skips_simulated_tier() {
    let h = harness(
        MockLlmClient::new(PARACETAMOL_JSON),
        CountingRegistry::default(),
    );

    let outcome = h.resolver.resolve("paracetamol", ByCode);
    assert!(outcome.report().is_some());
    assert_eq!(h.llm.call_count(), 0);
}

#[test]
fn test_unknown_name_resolved_by_general_knowledge() {
    let h = harness(
        MockLlmClient::new("{}").with_rule(&general("Coartem"), MockReply::Text(COARTEM_JSON.into())),
        CountingRegistry::default(),
    );

    let outcome = h.resolver.resolve("Coartem", ByName);
    let record = authentic(&outcome);

    assert_eq!(record.data_source, DataSource::AiKnowledgeBase);
    assert_eq!(record.nafdac_number, None);
    assert_eq!(record.manufacturing_date, NOT_FROM_THIS_SOURCE);
    assert_eq!(record.side_effects, TextOrList::text("Headache, dizziness"));
    // Not a known local name: tier 1 skipped, registry then tier 3
    assert_eq!(h.registry.calls(), 1);
    assert_eq!(h.llm.call_count(), 1);
    assert!(h.llm.prompts()[0].contains("not found in the US FDA database"));
}

#[test]
fn test_empty_object_from_simulated_tier_advances() {
    let h = harness(
        MockLlmClient::new("{}"),
        CountingRegistry::default().with_label("flagyl", ByName, PANADOL_LABEL),
    );

    let outcome = h.resolver.resolve("flagyl", ByName);
    assert_eq!(authentic(&outcome).data_source, DataSource::UsFda);
    assert_eq!(h.registry.calls(), 1);
}

#[test]
fn test_all_sources_absent_is_counterfeit_with_original_term() {
    let h = harness(MockLlmClient::new("{}"), CountingRegistry::default());

    let outcome = h.resolver.resolve("  FaKeDrug 500 ", ByName);
    let report = outcome.report().expect("expected COUNTERFEIT");

    assert!(report.message.contains("\"  FaKeDrug 500 \""));
    assert_eq!(report.next_steps.len(), 4);
}

#[test]
fn test_all_sources_down_is_counterfeit_not_error() {
    let h = harness(MockLlmClient::failing("connection refused"), CountingRegistry::default());

    let outcome = h.resolver.resolve("ibuprofen", ByName);
    assert!(outcome.report().is_some());
    // Tier 1 and tier 3 both attempted
    assert_eq!(h.llm.call_count(), 2);
}

#[test]
fn test_downstream_sources_receive_original_term() {
    let h = harness(MockLlmClient::new("{}"), CountingRegistry::default());

    h.resolver.resolve(" Paracetamol ", ByName);

    assert_eq!(h.registry.seen(), vec![" Paracetamol ".to_string()]);
    let prompts = h.llm.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains(&simulated(" Paracetamol ")));
    assert!(prompts[1].contains(&general(" Paracetamol ")));
}

#[test]
fn test_resolution_is_repeatable() {
    let h = harness(
        MockLlmClient::new("{}").with_rule(&simulated("alabukun"), MockReply::Text(ALABUKUN_JSON.into())),
        CountingRegistry::default(),
    );

    let first = h.resolver.resolve("alabukun", ByName);
    let second = h.resolver.resolve("alabukun", ByName);
    assert_eq!(first, second);
}

#[test]
fn test_blank_generated_name_counts_as_absent() {
    let h = harness(
        MockLlmClient::new(r#"{"drugName":"   ","manufacturer":"Someone"}"#),
        CountingRegistry::default(),
    );

    let outcome = h.resolver.resolve("Mystery", ByName);
    assert!(outcome.report().is_some());
}

fn code_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(COMMON_LOCAL_DRUGS).prop_map(str::to_string),
        "[0-9]{4,5}-[0-9]{3,4}(-[0-9]{2})?",
        "\\PC{1,30}",
    ]
}

proptest! {
    #[test]
    fn known_names_resolve_in_simulated_tier(
        index in 0..COMMON_LOCAL_DRUGS.len(),
        upper in any::<bool>(),
        left in "[ \t]{0,2}",
        right in "[ \t]{0,2}",
    ) {
        let name = COMMON_LOCAL_DRUGS[index];
        let cased = if upper { name.to_uppercase() } else { name.to_string() };
        let term = format!("{}{}{}", left, cased, right);
        let h = harness(MockLlmClient::new(PARACETAMOL_JSON), CountingRegistry::default());

        let outcome = h.resolver.resolve(&term, ByName);
        let record = outcome.record();
        prop_assert!(record.is_some(), "expected AUTHENTIC for {:?}", term);
        prop_assert_eq!(record.map(|r| r.data_source), Some(DataSource::SimulatedNafdac));
        prop_assert_eq!(h.registry.calls(), 0);
        prop_assert_eq!(h.llm.call_count(), 1);
    }

    #[test]
    fn codes_never_reach_knowledge_tiers(term in code_strategy()) {
        let h = harness(MockLlmClient::new(PARACETAMOL_JSON), CountingRegistry::default());

        let outcome = h.resolver.resolve(&term, ByCode);
        prop_assert!(outcome.report().is_some());
        prop_assert_eq!(h.llm.call_count(), 0);
        prop_assert_eq!(h.registry.calls(), 1);
    }
}
