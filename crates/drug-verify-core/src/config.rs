//! Runtime configuration.

use drug_verify_llm::{GEMINI_DEFAULT_BASE_URL, GEMINI_DEFAULT_MODEL};
use thiserror::Error;

use crate::registry::OPENFDA_DEFAULT_BASE_URL;

pub const APP_NAME: &str = "Drug Verify";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default per-request timeout for both external sources.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "drug_verify_core=info,drug_verify_llm=info"
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Credentials and endpoints for the external sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub openfda_api_key: Option<String>,
    pub openfda_base_url: String,
    pub request_timeout_secs: u64,
}

impl VerifierConfig {
    /// Config with default endpoints for the given generation key.
    pub fn new(gemini_api_key: impl Into<String>) -> Self {
        Self {
            gemini_api_key: gemini_api_key.into(),
            gemini_model: GEMINI_DEFAULT_MODEL.to_string(),
            gemini_base_url: GEMINI_DEFAULT_BASE_URL.to_string(),
            openfda_api_key: None,
            openfda_base_url: OPENFDA_DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read from the process environment.
    ///
    /// `GEMINI_API_KEY` (or `API_KEY`) is required. `DRUG_VERIFY_GEMINI_MODEL`,
    /// `OPENFDA_API_KEY` and `DRUG_VERIFY_TIMEOUT_SECS` are optional.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get("GEMINI_API_KEY")
            .or_else(|| get("API_KEY"))
            .ok_or(ConfigError::MissingVar("GEMINI_API_KEY"))?;

        let mut config = Self::new(api_key);
        if let Some(model) = get("DRUG_VERIFY_GEMINI_MODEL") {
            config.gemini_model = model;
        }
        config.openfda_api_key = get("OPENFDA_API_KEY");
        if let Some(raw) = get("DRUG_VERIFY_TIMEOUT_SECS") {
            config.request_timeout_secs = raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid {
                    var: "DRUG_VERIFY_TIMEOUT_SECS",
                    value: raw,
                })?;
        }

        Ok(config)
    }
}
