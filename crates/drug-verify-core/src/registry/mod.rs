//! External drug-label registry client.
//!
//! One exact-match search per lookup, keyed on the product code or the brand
//! name depending on the verification method.

mod label;

pub use label::*;

use std::time::Duration;

use thiserror::Error;

use crate::models::{DrugRecord, VerificationMethod};

/// Default public endpoint for the label registry.
pub const OPENFDA_DEFAULT_BASE_URL: &str = "https://api.fda.gov";

/// Registry errors. Never surfaced past [`DrugRegistry::lookup`].
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Registry unreachable at {0}")]
    Connection(String),

    #[error("Registry request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Registry returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Label parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// A product-level label registry.
pub trait DrugRegistry: Send + Sync {
    /// `None` covers no match as well as any transport or API failure.
    fn lookup(&self, term: &str, method: VerificationMethod) -> Option<DrugRecord>;
}

/// Exact-match search clause for `term`.
pub fn search_clause(term: &str, method: VerificationMethod) -> String {
    let field = match method {
        VerificationMethod::ByCode => "openfda.ndc.exact",
        VerificationMethod::ByName => "openfda.brand_name.exact",
    };
    format!("{}:\"{}\"", field, term)
}

/// Query parameters for a label search: credential (when configured),
/// search clause, and a limit of one result.
pub fn build_query(
    term: &str,
    method: VerificationMethod,
    api_key: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut query = Vec::with_capacity(3);
    if let Some(key) = api_key {
        query.push(("api_key", key.to_string()));
    }
    query.push(("search", search_clause(term, method)));
    query.push(("limit", "1".to_string()));
    query
}

/// Blocking client for the openFDA drug-label endpoint.
pub struct OpenFdaClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OpenFdaClient {
    pub fn new(base_url: &str, api_key: Option<&str>, timeout_secs: u64) -> RegistryResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RegistryError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            client,
            timeout_secs,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/drug/label.json", self.base_url)
    }

    /// Run the search, surfacing failures.
    pub fn search(&self, term: &str, method: VerificationMethod) -> RegistryResult<Option<DrugRecord>> {
        let query = build_query(term, method, self.api_key.as_deref());

        let response = self
            .client
            .get(self.endpoint())
            .query(&query)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    RegistryError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    RegistryError::Timeout(self.timeout_secs)
                } else {
                    RegistryError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        // The endpoint answers an empty search with 404
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RegistryError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .map_err(|e| RegistryError::Http(e.to_string()))?;
        parse_label_response(&body)
    }
}

impl DrugRegistry for OpenFdaClient {
    fn lookup(&self, term: &str, method: VerificationMethod) -> Option<DrugRecord> {
        match self.search(term, method) {
            Ok(Some(record)) => {
                tracing::debug!(term, %method, drug = %record.drug_name, "Registry match");
                Some(record)
            }
            Ok(None) => {
                tracing::debug!(term, %method, "No registry match");
                None
            }
            Err(e) => {
                tracing::warn!(term, %method, error = %e, "Registry lookup failed");
                None
            }
        }
    }
}
