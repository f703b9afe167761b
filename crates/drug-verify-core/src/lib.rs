//! Drug-Verify Core Library
//!
//! Tiered medication authenticity verification with a local, device-only
//! collaborator layer (session, search history, suspicious-drug reports).
//!
//! # Architecture
//!
//! ```text
//!                       term + method
//!                             │
//!                    blank? ──┴── reject with method-specific prompt
//!                             │
//!              ┌──────────────▼──────────────┐
//!              │ Tier 1: simulated regulatory│  name + known local drug
//!              └──────────────┬──────────────┘
//!                        miss │
//!              ┌──────────────▼──────────────┐
//!              │ Tier 2: label registry      │  name or code
//!              └──────────────┬──────────────┘
//!                        miss │
//!              ┌──────────────▼──────────────┐
//!              │ Tier 3: general knowledge   │  name only
//!              └──────────────┬──────────────┘
//!                        miss │
//!                             ▼
//!                  COUNTERFEIT ("not verified")
//! ```
//!
//! Any hit stops the chain with an AUTHENTIC outcome. Source outages only
//! make a tier miss; the ERROR outcome is reserved for blank input and for
//! failures inside resolution itself.
//!
//! # Modules
//!
//! - [`models`]: Domain types (DrugRecord, VerificationOutcome, SearchHistory, etc.)
//! - [`normalize`]: Record builder and sentinel values
//! - [`known_terms`]: Known local drug names and spelling suggestions
//! - [`knowledge`]: Generative knowledge-source client
//! - [`registry`]: Drug-label registry client
//! - [`resolver`]: Tier chain and outcome resolution
//! - [`session`]: Session context and the [`Verifier`] facade
//! - [`education`]: Drug-safety articles
//! - [`db`]: SQLite persistence for history and reports
//! - [`config`], [`logging`]: Runtime configuration and tracing setup

pub mod config;
pub mod db;
pub mod education;
pub mod knowledge;
pub mod known_terms;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod registry;
pub mod resolver;
pub mod session;

// Re-export commonly used types
pub use config::{ConfigError, VerifierConfig};
pub use db::Database;
pub use knowledge::{DrugKnowledge, GenerativeKnowledge};
pub use known_terms::{is_known_term, KnownTerms};
pub use models::{
    CounterfeitReport, DataSource, DrugRecord, EducationalArticle, HistoryEntry, SearchHistory,
    SuspiciousDrugReport, TextOrList, VerificationMethod, VerificationOutcome,
};
pub use registry::{DrugRegistry, OpenFdaClient};
pub use resolver::{Resolver, Tier};
pub use session::{Session, SessionError, Verifier};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use drug_verify_llm::{GeminiClient, LlmClient};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum DrugVerifyError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Client setup error: {0}")]
    ClientError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<db::DbError> for DrugVerifyError {
    fn from(e: db::DbError) -> Self {
        DrugVerifyError::DatabaseError(e.to_string())
    }
}

impl From<ConfigError> for DrugVerifyError {
    fn from(e: ConfigError) -> Self {
        DrugVerifyError::ConfigError(e.to_string())
    }
}

impl From<SessionError> for DrugVerifyError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Database(e) => e.into(),
            other => DrugVerifyError::InvalidInput(other.to_string()),
        }
    }
}

impl From<drug_verify_llm::LlmError> for DrugVerifyError {
    fn from(e: drug_verify_llm::LlmError) -> Self {
        DrugVerifyError::ClientError(e.to_string())
    }
}

impl From<registry::RegistryError> for DrugVerifyError {
    fn from(e: registry::RegistryError) -> Self {
        DrugVerifyError::ClientError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for DrugVerifyError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        DrugVerifyError::InternalError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open a verifier backed by a database at the given path.
#[uniffi::export]
pub fn open_verifier(
    config: FfiConfig,
    db_path: String,
) -> Result<Arc<DrugVerifyApi>, DrugVerifyError> {
    let db = Database::open(&db_path)?;
    DrugVerifyApi::from_config(config.into(), db)
}

/// Open a verifier with an in-memory database (for testing).
#[uniffi::export]
pub fn open_verifier_in_memory(config: FfiConfig) -> Result<Arc<DrugVerifyApi>, DrugVerifyError> {
    let db = Database::open_in_memory()?;
    DrugVerifyApi::from_config(config.into(), db)
}

/// Read configuration from the process environment.
#[uniffi::export]
pub fn load_config_from_env() -> Result<FfiConfig, DrugVerifyError> {
    Ok(VerifierConfig::from_env()?.into())
}

/// Install the tracing subscriber. Repeat calls are ignored.
#[uniffi::export]
pub fn init_logging() {
    logging::init_logging();
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe verifier wrapper for FFI.
#[derive(uniffi::Object)]
pub struct DrugVerifyApi {
    verifier: Arc<Mutex<Verifier>>,
    llm: Arc<dyn LlmClient>,
}

impl DrugVerifyApi {
    /// Wire the standard tiers to the configured external sources.
    pub fn from_config(
        config: VerifierConfig,
        db: Database,
    ) -> Result<Arc<Self>, DrugVerifyError> {
        let llm: Arc<dyn LlmClient> = Arc::new(GeminiClient::new(
            &config.gemini_base_url,
            &config.gemini_api_key,
            &config.gemini_model,
            config.request_timeout_secs,
        )?);
        let registry = Arc::new(OpenFdaClient::new(
            &config.openfda_base_url,
            config.openfda_api_key.as_deref(),
            config.request_timeout_secs,
        )?);

        tracing::info!(model = %config.gemini_model, "Verifier configured");
        Ok(Self::with_sources(llm, registry, db))
    }

    /// Wire the standard tiers to arbitrary sources.
    pub fn with_sources(
        llm: Arc<dyn LlmClient>,
        registry: Arc<dyn DrugRegistry>,
        db: Database,
    ) -> Arc<Self> {
        let knowledge = Arc::new(GenerativeKnowledge::new(Arc::clone(&llm)));
        let resolver = Resolver::new(knowledge, registry);

        Arc::new(Self {
            verifier: Arc::new(Mutex::new(Verifier::new(resolver, db))),
            llm,
        })
    }
}

#[uniffi::export]
impl DrugVerifyApi {
    // =========================================================================
    // Session Operations
    // =========================================================================

    /// Sign in (simulated) and load the user's search history.
    pub fn login(&self, user_id: String) -> Result<(), DrugVerifyError> {
        let mut verifier = self.verifier.lock()?;
        verifier.login(&user_id)?;
        Ok(())
    }

    /// Sign out. Stored history stays on the device.
    pub fn logout(&self) -> Result<(), DrugVerifyError> {
        let mut verifier = self.verifier.lock()?;
        verifier.logout();
        Ok(())
    }

    pub fn current_user(&self) -> Result<Option<String>, DrugVerifyError> {
        let verifier = self.verifier.lock()?;
        Ok(verifier.current_user().map(str::to_string))
    }

    // =========================================================================
    // Verification
    // =========================================================================

    /// Verify a drug by name or code.
    pub fn verify(
        &self,
        term: String,
        method: FfiVerificationMethod,
    ) -> Result<FfiVerificationOutcome, DrugVerifyError> {
        let method: VerificationMethod = method.into();
        if let Some(rejected) = Verifier::reject_blank(&term, method) {
            return Ok(rejected.into());
        }

        // Resolve without holding the lock
        let (user_id, resolver) = {
            let verifier = self.verifier.lock()?;
            (verifier.current_user().map(str::to_string), verifier.shared_resolver())
        };
        let outcome = resolver.resolve(&term, method);

        if let Some(user_id) = user_id {
            self.verifier
                .lock()?
                .record_outcome(&user_id, &term, method, &outcome);
        }
        Ok(outcome.into())
    }

    /// Recent searches for the signed-in user, most recent first.
    pub fn history(&self) -> Result<Vec<FfiHistoryEntry>, DrugVerifyError> {
        let verifier = self.verifier.lock()?;
        Ok(verifier.history().iter().cloned().map(|e| e.into()).collect())
    }

    /// Closest known drug name for a likely misspelling.
    pub fn suggest_spelling(&self, term: String) -> Option<String> {
        KnownTerms::global().suggest(&term).map(str::to_string)
    }

    pub fn is_known_term(&self, term: String) -> bool {
        is_known_term(&term)
    }

    // =========================================================================
    // Reports
    // =========================================================================

    /// File a suspicious-drug report on this device.
    pub fn submit_report(
        &self,
        drug_code: String,
        drug_name: Option<String>,
        purchase_location: String,
        comments: Option<String>,
    ) -> Result<FfiSuspiciousReport, DrugVerifyError> {
        let verifier = self.verifier.lock()?;
        let report = verifier.submit_report(
            &drug_code,
            drug_name.as_deref(),
            &purchase_location,
            comments.as_deref(),
        )?;
        Ok(report.into())
    }

    /// Reports filed on this device, newest first.
    pub fn reports(&self) -> Result<Vec<FfiSuspiciousReport>, DrugVerifyError> {
        let verifier = self.verifier.lock()?;
        let reports = verifier.reports()?;
        Ok(reports.into_iter().map(|r| r.into()).collect())
    }

    // =========================================================================
    // Education
    // =========================================================================

    /// Three drug-safety article summaries (falls back to built-in text).
    pub fn educational_articles(&self) -> Vec<FfiArticle> {
        education::educational_articles(self.llm.as_ref())
            .into_iter()
            .map(|a| a.into())
            .collect()
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe runtime configuration. Unset fields take the defaults.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiConfig {
    pub gemini_api_key: String,
    pub gemini_model: Option<String>,
    pub gemini_base_url: Option<String>,
    pub openfda_api_key: Option<String>,
    pub openfda_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl From<FfiConfig> for VerifierConfig {
    fn from(config: FfiConfig) -> Self {
        let mut resolved = VerifierConfig::new(config.gemini_api_key);
        if let Some(model) = config.gemini_model {
            resolved.gemini_model = model;
        }
        if let Some(url) = config.gemini_base_url {
            resolved.gemini_base_url = url;
        }
        resolved.openfda_api_key = config.openfda_api_key;
        if let Some(url) = config.openfda_base_url {
            resolved.openfda_base_url = url;
        }
        if let Some(secs) = config.request_timeout_secs.filter(|s| *s > 0) {
            resolved.request_timeout_secs = secs;
        }
        resolved
    }
}

impl From<VerifierConfig> for FfiConfig {
    fn from(config: VerifierConfig) -> Self {
        Self {
            gemini_api_key: config.gemini_api_key,
            gemini_model: Some(config.gemini_model),
            gemini_base_url: Some(config.gemini_base_url),
            openfda_api_key: config.openfda_api_key,
            openfda_base_url: Some(config.openfda_base_url),
            request_timeout_secs: Some(config.request_timeout_secs),
        }
    }
}

/// FFI-safe verification method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiVerificationMethod {
    ByName,
    ByCode,
}

impl From<FfiVerificationMethod> for VerificationMethod {
    fn from(method: FfiVerificationMethod) -> Self {
        match method {
            FfiVerificationMethod::ByName => VerificationMethod::ByName,
            FfiVerificationMethod::ByCode => VerificationMethod::ByCode,
        }
    }
}

impl From<VerificationMethod> for FfiVerificationMethod {
    fn from(method: VerificationMethod) -> Self {
        match method {
            VerificationMethod::ByName => FfiVerificationMethod::ByName,
            VerificationMethod::ByCode => FfiVerificationMethod::ByCode,
        }
    }
}

/// FFI-safe drug record. List fields are always lists.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDrugRecord {
    pub drug_name: String,
    pub generic_name: String,
    pub manufacturer: String,
    pub manufacturing_date: String,
    pub expiry_date: String,
    pub uses: Vec<String>,
    pub dosage: String,
    pub side_effects: Vec<String>,
    pub storage: String,
    pub nafdac_number: Option<String>,
    pub data_source: String,
}

impl From<DrugRecord> for FfiDrugRecord {
    fn from(record: DrugRecord) -> Self {
        Self {
            uses: record.uses.to_vec(),
            side_effects: record.side_effects.to_vec(),
            data_source: record.data_source.label().to_string(),
            drug_name: record.drug_name,
            generic_name: record.generic_name,
            manufacturer: record.manufacturer,
            manufacturing_date: record.manufacturing_date,
            expiry_date: record.expiry_date,
            dosage: record.dosage,
            storage: record.storage,
            nafdac_number: record.nafdac_number,
        }
    }
}

/// FFI-safe "not verified" report.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCounterfeitReport {
    pub message: String,
    pub next_steps: Vec<String>,
}

impl From<CounterfeitReport> for FfiCounterfeitReport {
    fn from(report: CounterfeitReport) -> Self {
        Self {
            message: report.message,
            next_steps: report.next_steps,
        }
    }
}

/// FFI-safe verification outcome.
#[derive(Debug, Clone, uniffi::Enum)]
pub enum FfiVerificationOutcome {
    Idle,
    Loading,
    Authentic { record: FfiDrugRecord },
    Counterfeit { report: FfiCounterfeitReport },
    Error { message: String },
}

impl From<VerificationOutcome> for FfiVerificationOutcome {
    fn from(outcome: VerificationOutcome) -> Self {
        match outcome {
            VerificationOutcome::Idle => FfiVerificationOutcome::Idle,
            VerificationOutcome::Loading => FfiVerificationOutcome::Loading,
            VerificationOutcome::Authentic { record } => FfiVerificationOutcome::Authentic {
                record: record.into(),
            },
            VerificationOutcome::Counterfeit { report } => FfiVerificationOutcome::Counterfeit {
                report: report.into(),
            },
            VerificationOutcome::Error { message } => FfiVerificationOutcome::Error { message },
        }
    }
}

/// FFI-safe history entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiHistoryEntry {
    pub term: String,
    pub method: FfiVerificationMethod,
}

impl From<HistoryEntry> for FfiHistoryEntry {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            term: entry.term,
            method: entry.method.into(),
        }
    }
}

/// FFI-safe suspicious-drug report.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSuspiciousReport {
    pub report_id: String,
    pub user_id: Option<String>,
    pub drug_code: String,
    pub drug_name: Option<String>,
    pub purchase_location: String,
    pub comments: Option<String>,
    pub submitted_at: String,
}

impl From<SuspiciousDrugReport> for FfiSuspiciousReport {
    fn from(report: SuspiciousDrugReport) -> Self {
        Self {
            report_id: report.report_id,
            user_id: report.user_id,
            drug_code: report.drug_code,
            drug_name: report.drug_name,
            purchase_location: report.purchase_location,
            comments: report.comments,
            submitted_at: report.submitted_at,
        }
    }
}

/// FFI-safe educational article.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiArticle {
    pub title: String,
    pub summary: String,
}

impl From<EducationalArticle> for FfiArticle {
    fn from(article: EducationalArticle) -> Self {
        Self {
            title: article.title,
            summary: article.summary,
        }
    }
}
