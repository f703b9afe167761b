//! SQLite schema definition.

/// Complete local database schema.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Search History (per user, most recent first)
-- ============================================================================

CREATE TABLE IF NOT EXISTS search_history (
    user_id TEXT NOT NULL,
    position INTEGER NOT NULL,                   -- 0 = most recent
    term TEXT NOT NULL,
    method TEXT NOT NULL CHECK (method IN ('name', 'code')),
    searched_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (user_id, position),
    UNIQUE (user_id, term, method)
);

-- ============================================================================
-- Suspicious Drug Reports (device-local, never uploaded)
-- ============================================================================

CREATE TABLE IF NOT EXISTS suspicious_reports (
    report_id TEXT PRIMARY KEY,
    user_id TEXT,                                -- NULL when filed while signed out
    drug_code TEXT NOT NULL CHECK (length(trim(drug_code)) > 0),
    drug_name TEXT,
    purchase_location TEXT NOT NULL CHECK (length(trim(purchase_location)) > 0),
    comments TEXT,
    submitted_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reports_user ON suspicious_reports(user_id);
CREATE INDEX IF NOT EXISTS idx_reports_submitted ON suspicious_reports(submitted_at);
"#;
