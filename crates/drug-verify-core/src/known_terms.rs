//! Reference set of common local drug names.
//!
//! Membership drives eligibility for the simulated regulatory tier.

use std::collections::HashSet;
use std::sync::OnceLock;

use strsim::jaro_winkler;

/// Common drug names (generic and brand) seen in Nigerian pharmacies.
pub const COMMON_LOCAL_DRUGS: &[&str] = &[
    // Analgesics / NSAIDs
    "paracetamol",
    "ibuprofen",
    "diclofenac",
    "aspirin",
    "tramadol",
    "codeine",
    "alabukun",
    // Antibiotics / antiprotozoals
    "metronidazole",
    "flagyl",
    "ampiclox",
    "amoxicillin",
    "ciprofloxacin",
    "azithromycin",
    "erythromycin",
    "cefuroxime",
    "ceftriaxone",
    "tetracycline",
    "doxycycline",
    "cotrimoxazole",
    // Antimalarials
    "chloroquine",
    "artemether-lumefantrine",
    "artesunate",
    "sulfadoxine-pyrimethamine",
    "quinine",
    // Cardiovascular
    "amlodipine",
    "lisinopril",
    "hydrochlorothiazide",
    "losartan",
    "atenolol",
    "nifedipine",
    "methyldopa",
    // Steroids
    "dexamethasone",
    "prednisolone",
    // Diabetes
    "glibenclamide",
    "metformin",
    "insulin",
    // GI
    "omeprazole",
    "ranitidine",
    // Anthelmintics
    "albendazole",
    "mebendazole",
    "ivermectin",
    // Supplements
    "folic acid",
    "ferrous sulfate",
    "vitamin c",
    "multivitamins",
    // Other
    "sildenafil",
    "postinor",
    "salbutamol",
    "aminophylline",
    "chlorpheniramine",
];

/// Minimum Jaro-Winkler similarity for a spelling suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.85;

/// Trim and lower-case a term for matching.
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Case-insensitive matcher over a fixed set of names.
#[derive(Debug, Clone)]
pub struct KnownTerms {
    names: HashSet<String>,
}

impl Default for KnownTerms {
    fn default() -> Self {
        Self::new(COMMON_LOCAL_DRUGS.iter().copied())
    }
}

impl KnownTerms {
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            names: names.into_iter().map(normalize_term).collect(),
        }
    }

    /// Process-wide default reference set.
    pub fn global() -> &'static KnownTerms {
        static KNOWN: OnceLock<KnownTerms> = OnceLock::new();
        KNOWN.get_or_init(KnownTerms::default)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.names.contains(&normalize_term(term))
    }

    /// Closest known name for a likely misspelling.
    ///
    /// Returns `None` for exact matches and for anything below the
    /// similarity threshold.
    pub fn suggest(&self, term: &str) -> Option<&str> {
        let normalized = normalize_term(term);
        if normalized.is_empty() || self.names.contains(&normalized) {
            return None;
        }

        self.names
            .iter()
            .map(|name| (name, jaro_winkler(&normalized, name)))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| {
                a.1.partial_cmp(&b.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    // Deterministic tie-break on the name itself
                    .then_with(|| b.0.cmp(a.0))
            })
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Whether `term` is in the default reference set.
pub fn is_known_term(term: &str) -> bool {
    KnownTerms::global().contains(term)
}
