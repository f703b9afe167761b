//! Suspicious-drug report persistence.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::SuspiciousDrugReport;

const REPORT_COLUMNS: &str = "report_id, user_id, drug_code, drug_name, purchase_location, comments, submitted_at";

fn row_to_report(row: &Row<'_>) -> rusqlite::Result<SuspiciousDrugReport> {
    Ok(SuspiciousDrugReport {
        report_id: row.get(0)?,
        user_id: row.get(1)?,
        drug_code: row.get(2)?,
        drug_name: row.get(3)?,
        purchase_location: row.get(4)?,
        comments: row.get(5)?,
        submitted_at: row.get(6)?,
    })
}

impl Database {
    /// Insert a new report.
    pub fn insert_report(&self, report: &SuspiciousDrugReport) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO suspicious_reports (
                report_id, user_id, drug_code, drug_name,
                purchase_location, comments, submitted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                report.report_id,
                report.user_id,
                report.drug_code,
                report.drug_name,
                report.purchase_location,
                report.comments,
                report.submitted_at,
            ],
        )?;
        Ok(())
    }

    /// Get a report by ID.
    pub fn get_report(&self, report_id: &str) -> DbResult<Option<SuspiciousDrugReport>> {
        let sql = format!(
            "SELECT {} FROM suspicious_reports WHERE report_id = ?",
            REPORT_COLUMNS
        );
        Ok(self
            .conn
            .query_row(&sql, [report_id], row_to_report)
            .optional()?)
    }

    /// All reports on this device, newest first.
    pub fn list_reports(&self) -> DbResult<Vec<SuspiciousDrugReport>> {
        let sql = format!(
            "SELECT {} FROM suspicious_reports ORDER BY submitted_at DESC, rowid DESC",
            REPORT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let reports = stmt
            .query_map([], row_to_report)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;
    use crate::models::SuspiciousDrugReport;

    fn report(code: &str, submitted_at: &str) -> SuspiciousDrugReport {
        let mut report = SuspiciousDrugReport::new(
            Some("ada@example.com".into()),
            code.into(),
            None,
            "Idumota Market".into(),
            None,
        );
        report.submitted_at = submitted_at.into();
        report
    }

    #[test]
    fn test_insert_and_get() {
        let db = Database::open_in_memory().unwrap();
        let original = report("FAKE-001", "2026-03-01T10:00:00+00:00");
        db.insert_report(&original).unwrap();

        let loaded = db.get_report(&original.report_id).unwrap().unwrap();
        assert_eq!(loaded, original);
        assert!(db.get_report("missing").unwrap().is_none());
    }

    #[test]
    fn test_list_newest_first() {
        let db = Database::open_in_memory().unwrap();
        db.insert_report(&report("OLD", "2026-03-01T10:00:00+00:00")).unwrap();
        db.insert_report(&report("NEW", "2026-03-02T10:00:00+00:00")).unwrap();

        let codes: Vec<String> = db
            .list_reports()
            .unwrap()
            .into_iter()
            .map(|r| r.drug_code)
            .collect();
        assert_eq!(codes, vec!["NEW", "OLD"]);
    }

    #[test]
    fn test_reports_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports.db");

        {
            let db = Database::open(&path).unwrap();
            db.insert_report(&report("KEEP", "2026-03-01T10:00:00+00:00")).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.list_reports().unwrap().len(), 1);
    }
}
