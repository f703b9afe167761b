//! Session context and the verification facade.
//!
//! The [`Verifier`] owns the resolver, the local database and the optional
//! signed-in session. It applies the input pre-check before resolution and
//! records search history only for conclusive outcomes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db::{Database, DbError};
use crate::models::{
    HistoryEntry, SearchHistory, SuspiciousDrugReport, VerificationMethod, VerificationOutcome,
};
use crate::resolver::Resolver;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No user is signed in")]
    NotLoggedIn,

    #[error("User identity must not be blank")]
    InvalidIdentity,

    #[error("Invalid report: {0}")]
    InvalidReport(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// A simulated sign-in. Lives from login until logout.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub history: SearchHistory,
}

impl Session {
    fn start(user_id: String, history: SearchHistory) -> Self {
        Self {
            user_id,
            session_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            history,
        }
    }
}

/// Verification entry point for the presentation layer.
pub struct Verifier {
    resolver: Arc<Resolver>,
    db: Database,
    session: Option<Session>,
}

impl Verifier {
    pub fn new(resolver: Resolver, db: Database) -> Self {
        Self {
            resolver: Arc::new(resolver),
            db,
            session: None,
        }
    }

    /// Start a session for `user_id`, loading that user's stored history.
    /// Any existing session is ended first.
    pub fn login(&mut self, user_id: &str) -> SessionResult<&Session> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(SessionError::InvalidIdentity);
        }

        let history = self.db.load_history(user_id)?;
        tracing::info!(user = user_id, entries = history.len(), "User signed in");

        Ok(self.session.insert(Session::start(user_id.to_string(), history)))
    }

    /// End the current session. Stored history stays on the device.
    pub fn logout(&mut self) -> Option<Session> {
        let session = self.session.take();
        if let Some(s) = &session {
            tracing::info!(user = %s.user_id, "User signed out");
        }
        session
    }

    pub fn current_user(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.user_id.as_str())
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Shared handle to the resolver, for resolving without borrowing the
    /// verifier.
    pub fn shared_resolver(&self) -> Arc<Resolver> {
        Arc::clone(&self.resolver)
    }

    /// Input check applied before any source is consulted: a blank term is
    /// answered with a method-specific message.
    pub fn reject_blank(term: &str, method: VerificationMethod) -> Option<VerificationOutcome> {
        term.trim().is_empty().then(|| VerificationOutcome::Error {
            message: method.empty_term_message().to_string(),
        })
    }

    /// Verify `term`.
    ///
    /// A blank term is rejected with a method-specific message without
    /// consulting any source. Authentic and counterfeit outcomes are added
    /// to the signed-in user's history.
    pub fn verify(&mut self, term: &str, method: VerificationMethod) -> VerificationOutcome {
        if let Some(rejected) = Self::reject_blank(term, method) {
            return rejected;
        }

        let outcome = self.resolver.resolve(term, method);
        if let Some(user_id) = self.current_user().map(str::to_string) {
            self.record_outcome(&user_id, term, method, &outcome);
        }
        outcome
    }

    /// Add a finished search to `user_id`'s history.
    ///
    /// Skipped for error outcomes and when `user_id` is no longer the
    /// signed-in user. The session copy is authoritative: it is updated even
    /// if saving to the device fails, and the next successful save rewrites
    /// the device copy in full.
    pub fn record_outcome(
        &mut self,
        user_id: &str,
        term: &str,
        method: VerificationMethod,
        outcome: &VerificationOutcome,
    ) {
        if !outcome.is_conclusive() {
            return;
        }
        let Some(session) = self.session.as_mut().filter(|s| s.user_id == user_id) else {
            tracing::debug!(user = user_id, "Session ended before the search finished");
            return;
        };

        session.history.record(HistoryEntry::new(term, method));
        if let Err(e) = self.db.save_history(&session.user_id, &session.history) {
            tracing::error!(user = %session.user_id, error = %e, "Failed to save search history");
        }
    }

    /// The signed-in user's recent searches, most recent first.
    pub fn history(&self) -> &[HistoryEntry] {
        self.session
            .as_ref()
            .map(|s| s.history.entries())
            .unwrap_or(&[])
    }

    /// File a suspicious-drug report on this device.
    pub fn submit_report(
        &self,
        drug_code: &str,
        drug_name: Option<&str>,
        purchase_location: &str,
        comments: Option<&str>,
    ) -> SessionResult<SuspiciousDrugReport> {
        let drug_code = drug_code.trim();
        let purchase_location = purchase_location.trim();
        if drug_code.is_empty() {
            return Err(SessionError::InvalidReport("drug code is required".into()));
        }
        if purchase_location.is_empty() {
            return Err(SessionError::InvalidReport("purchase location is required".into()));
        }

        let report = SuspiciousDrugReport::new(
            self.current_user().map(str::to_string),
            drug_code.to_string(),
            drug_name.map(|s| s.trim().to_string()),
            purchase_location.to_string(),
            comments.map(|s| s.trim().to_string()),
        );
        self.db.insert_report(&report)?;

        tracing::info!(
            report_id = %report.report_id,
            drug_code = %report.drug_code,
            "Suspicious drug report submitted"
        );
        Ok(report)
    }

    /// Reports filed on this device, newest first.
    pub fn reports(&self) -> SessionResult<Vec<SuspiciousDrugReport>> {
        Ok(self.db.list_reports()?)
    }
}
