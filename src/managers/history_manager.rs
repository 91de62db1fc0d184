//! Visit history storage.
//!
//! Implements `HistoryManagerTrait` over SQLite via `rusqlite`. A visit for a
//! URL that is already stored bumps its `visit_count` instead of adding a row.

use rusqlite::{params, Connection, OptionalExtension};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;
use uuid::Uuid;

use crate::types::errors::HistoryError;
use crate::types::history::VisitRecord;

/// Trait defining visit history operations.
pub trait HistoryManagerTrait {
    fn record_visit(&mut self, visit: &VisitRecord) -> Result<String, HistoryError>;
}

/// History manager backed by a SQLite connection.
pub struct HistoryManager<'a> {
    conn: &'a Connection,
}

impl<'a> HistoryManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }
}

impl<'a> HistoryManagerTrait for HistoryManager<'a> {
    /// Records a visit and returns the entry ID. A repeated URL refreshes the
    /// title and time; its favicon is only replaced when new bytes arrived.
    fn record_visit(&mut self, visit: &VisitRecord) -> Result<String, HistoryError> {
        let now = Self::now();

        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM history WHERE url = ?1",
                params![visit.url],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;

        let id = match existing {
            Some(id) => {
                self.conn
                    .execute(
                        "UPDATE history SET visit_count = visit_count + 1, visit_time = ?1, \
                         title = ?2, favicon = COALESCE(?3, favicon) WHERE id = ?4",
                        params![now, visit.title, visit.favicon, id],
                    )
                    .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;
                id
            }
            None => {
                let id = Uuid::new_v4().to_string();
                self.conn
                    .execute(
                        "INSERT INTO history (id, url, title, favicon, visit_time, visit_count) \
                         VALUES (?1, ?2, ?3, ?4, ?5, 1)",
                        params![id, visit.url, visit.title, visit.favicon, now],
                    )
                    .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;
                id
            }
        };

        debug!(url = %visit.url, has_favicon = visit.favicon.is_some(), "Visit recorded");
        Ok(id)
    }
}
