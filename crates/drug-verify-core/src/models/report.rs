//! User-submitted reports of suspicious drugs.

use serde::{Deserialize, Serialize};

/// A suspicious-drug report, kept on this device only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspiciousDrugReport {
    /// Local report identifier (UUID)
    pub report_id: String,
    /// Signed-in user who filed the report, if any
    pub user_id: Option<String>,
    /// The name or code that failed verification
    pub drug_code: String,
    /// Drug name, if the user knows it
    pub drug_name: Option<String>,
    /// Pharmacy or market where it was bought
    pub purchase_location: String,
    /// Free-form comments
    pub comments: Option<String>,
    /// Submission timestamp (RFC 3339)
    pub submitted_at: String,
}

impl SuspiciousDrugReport {
    /// Create a report with a fresh ID and the current timestamp.
    pub fn new(
        user_id: Option<String>,
        drug_code: String,
        drug_name: Option<String>,
        purchase_location: String,
        comments: Option<String>,
    ) -> Self {
        Self {
            report_id: uuid::Uuid::new_v4().to_string(),
            user_id,
            drug_code,
            drug_name: drug_name.filter(|s| !s.trim().is_empty()),
            purchase_location,
            comments: comments.filter(|s| !s.trim().is_empty()),
            submitted_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
