//! The persistence collaborator.
//!
//! The core only ever pushes visits and bookmark mutations into a
//! [`PersistenceSink`]. [`SqlitePersistence`] is the on-disk implementation;
//! history and bookmark managers borrow its connection per call.

use std::path::Path;

use tracing::{debug, info};

use crate::database::connection::Database;
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::managers::history_manager::{HistoryManager, HistoryManagerTrait};
use crate::platform;
use crate::types::bookmark::BookmarkMutation;
use crate::types::errors::AppError;
use crate::types::history::VisitRecord;

/// Accepts visit-history entries and bookmark mutations.
pub trait PersistenceSink: Send {
    /// Stores a visit, returning the id of the history entry it landed in.
    fn add_visit(&mut self, visit: &VisitRecord) -> Result<String, AppError>;
    /// Applies a bookmark mutation, returning the id of a created row.
    fn apply_bookmark(&mut self, mutation: BookmarkMutation) -> Result<Option<String>, AppError>;
}

/// SQLite-backed sink.
pub struct SqlitePersistence {
    db: Database,
}

impl SqlitePersistence {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let db = Database::open(path.as_ref())?;
        info!(path = %path.as_ref().display(), "Persistence opened");
        Ok(Self { db })
    }

    /// Opens the database at the platform data path.
    pub fn open_default() -> Result<Self, AppError> {
        let path = platform::get_database_path();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        Self::open(path)
    }

    pub fn in_memory() -> Result<Self, AppError> {
        Ok(Self {
            db: Database::open_in_memory()?,
        })
    }
}

impl PersistenceSink for SqlitePersistence {
    fn add_visit(&mut self, visit: &VisitRecord) -> Result<String, AppError> {
        let id = HistoryManager::new(self.db.connection()).record_visit(visit)?;
        debug!(url = %visit.url, has_favicon = visit.favicon.is_some(), "Visit persisted");
        Ok(id)
    }

    fn apply_bookmark(&mut self, mutation: BookmarkMutation) -> Result<Option<String>, AppError> {
        Ok(BookmarkManager::new(self.db.connection()).apply(mutation)?)
    }
}
