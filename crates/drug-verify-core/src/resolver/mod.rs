//! Tiered verification resolver.
//!
//! Pipeline: simulated regulatory lookup → label registry → general knowledge
//!
//! Tiers run strictly in order and the first one that returns a record wins.
//! Later tiers are never consulted after a hit.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use drug_verify_llm::KnowledgeRequest;

use crate::knowledge::DrugKnowledge;
use crate::known_terms::KnownTerms;
use crate::models::{CounterfeitReport, DrugRecord, VerificationMethod, VerificationOutcome};
use crate::registry::DrugRegistry;

/// A single verification request as seen by the tiers.
#[derive(Debug, Clone)]
pub struct Query<'a> {
    /// Term exactly as entered; used for display and for downstream lookups.
    pub term: &'a str,
    pub method: VerificationMethod,
    /// Whether the term is in the known local drug set.
    pub known: bool,
}

type Eligibility = Box<dyn Fn(&Query<'_>) -> bool + Send + Sync>;
type Lookup = Box<dyn Fn(&Query<'_>) -> Option<DrugRecord> + Send + Sync>;

/// One data source in the resolution chain, gated by an eligibility rule.
pub struct Tier {
    name: &'static str,
    eligible: Eligibility,
    lookup: Lookup,
}

impl Tier {
    pub fn new(
        name: &'static str,
        eligible: impl Fn(&Query<'_>) -> bool + Send + Sync + 'static,
        lookup: impl Fn(&Query<'_>) -> Option<DrugRecord> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            eligible: Box::new(eligible),
            lookup: Box::new(lookup),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl std::fmt::Debug for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tier").field("name", &self.name).finish()
    }
}

/// Simulated regulatory lookup, for known local drug names only.
pub fn simulated_regulatory_tier(knowledge: Arc<dyn DrugKnowledge>) -> Tier {
    Tier::new(
        "simulated_regulatory",
        |q| q.method == VerificationMethod::ByName && q.known,
        move |q| knowledge.lookup(&KnowledgeRequest::simulated_regulatory(q.term)),
    )
}

/// Label registry lookup, for every method.
pub fn registry_tier(registry: Arc<dyn DrugRegistry>) -> Tier {
    Tier::new("registry", |_| true, move |q| registry.lookup(q.term, q.method))
}

/// Open-knowledge identification, for names only.
pub fn general_knowledge_tier(knowledge: Arc<dyn DrugKnowledge>) -> Tier {
    Tier::new(
        "general_knowledge",
        |q| q.method == VerificationMethod::ByName,
        move |q| knowledge.lookup(&KnowledgeRequest::general_knowledge(q.term)),
    )
}

/// Orders the data sources and reduces their answers to one outcome.
#[derive(Debug)]
pub struct Resolver {
    tiers: Vec<Tier>,
    known_terms: KnownTerms,
}

impl Resolver {
    /// Standard three-tier chain over the given sources.
    pub fn new(knowledge: Arc<dyn DrugKnowledge>, registry: Arc<dyn DrugRegistry>) -> Self {
        Self::with_tiers(vec![
            simulated_regulatory_tier(Arc::clone(&knowledge)),
            registry_tier(registry),
            general_knowledge_tier(knowledge),
        ])
    }

    /// Custom chain, consulted in the given order.
    pub fn with_tiers(tiers: Vec<Tier>) -> Self {
        Self {
            tiers,
            known_terms: KnownTerms::global().clone(),
        }
    }

    /// Replace the reference set used for tier eligibility.
    pub fn with_known_terms(mut self, known_terms: KnownTerms) -> Self {
        self.known_terms = known_terms;
        self
    }

    pub fn tier_names(&self) -> Vec<&'static str> {
        self.tiers.iter().map(Tier::name).collect()
    }

    /// Resolve `term` to an outcome.
    ///
    /// Expects a non-blank term; callers reject blank input first. Source
    /// outages only make a tier miss. A panic inside a tier is reported as an
    /// `Error` outcome.
    pub fn resolve(&self, term: &str, method: VerificationMethod) -> VerificationOutcome {
        let query = Query {
            term,
            method,
            known: method == VerificationMethod::ByName && self.known_terms.contains(term),
        };

        for tier in &self.tiers {
            if !(tier.eligible)(&query) {
                tracing::debug!(tier = tier.name, term, %method, "Tier not eligible");
                continue;
            }

            match panic::catch_unwind(AssertUnwindSafe(|| (tier.lookup)(&query))) {
                Ok(Some(record)) => {
                    tracing::info!(
                        tier = tier.name,
                        term,
                        %method,
                        source = %record.data_source,
                        "Drug verified"
                    );
                    return VerificationOutcome::Authentic { record };
                }
                Ok(None) => {
                    tracing::debug!(tier = tier.name, term, %method, "Tier returned no record");
                }
                Err(_) => {
                    tracing::error!(tier = tier.name, term, %method, "Tier failed unexpectedly");
                    return VerificationOutcome::unexpected_error();
                }
            }
        }

        tracing::info!(term, %method, "Drug could not be verified");
        VerificationOutcome::Counterfeit {
            report: CounterfeitReport::not_verified(term),
        }
    }
}
