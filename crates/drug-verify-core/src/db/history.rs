//! Per-user search history persistence.

use std::collections::HashMap;

use chrono::Utc;
use rusqlite::params;

use super::{Database, DbError, DbResult};
use crate::models::{HistoryEntry, SearchHistory, VerificationMethod};

impl Database {
    /// Load a user's history, most recent first.
    pub fn load_history(&self, user_id: &str) -> DbResult<SearchHistory> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT term, method
            FROM search_history
            WHERE user_id = ?
            ORDER BY position ASC
            "#,
        )?;

        let rows = stmt
            .query_map([user_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let entries = rows
            .into_iter()
            .map(|(term, method)| {
                let method = VerificationMethod::parse(&method)
                    .ok_or_else(|| DbError::Corrupt(format!("unknown method '{}'", method)))?;
                Ok(HistoryEntry::new(term, method))
            })
            .collect::<DbResult<Vec<_>>>()?;

        Ok(SearchHistory::from_entries(entries))
    }

    /// Replace a user's stored history with `history`.
    ///
    /// The front entry is stamped with the current time as the search being
    /// saved. Other entries keep the time they were first stored.
    pub fn save_history(&self, user_id: &str, history: &SearchHistory) -> DbResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        let mut searched_at = HashMap::new();
        {
            let mut stmt = tx.prepare(
                "SELECT term, method, searched_at FROM search_history WHERE user_id = ?",
            )?;
            let rows = stmt.query_map([user_id], |row| {
                Ok((
                    (row.get::<_, String>(0)?, row.get::<_, String>(1)?),
                    row.get::<_, String>(2)?,
                ))
            })?;
            for row in rows {
                let (key, stamp) = row?;
                searched_at.insert(key, stamp);
            }
        }

        let now = Utc::now().to_rfc3339();
        tx.execute("DELETE FROM search_history WHERE user_id = ?", [user_id])?;
        for (position, entry) in history.entries().iter().enumerate() {
            let key = (entry.term.clone(), entry.method.as_str().to_string());
            let stamp = match searched_at.remove(&key) {
                Some(stamp) if position > 0 => stamp,
                _ => now.clone(),
            };
            tx.execute(
                r#"
                INSERT INTO search_history (user_id, position, term, method, searched_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![user_id, position as i64, entry.term, entry.method.as_str(), stamp],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}
