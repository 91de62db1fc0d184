//! Bookmark storage.
//!
//! Applies the [`BookmarkMutation`]s sent by the presentation layer to SQLite
//! tables via `rusqlite`. Bookmarks and folders keep a `position` within their
//! parent; new rows are appended at the end.

use rusqlite::{params, Connection};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;
use uuid::Uuid;

use crate::types::bookmark::{Bookmark, BookmarkFolder, BookmarkMutation};
use crate::types::errors::BookmarkError;

/// Trait defining bookmark operations.
pub trait BookmarkManagerTrait {
    fn add_bookmark(
        &mut self,
        url: &str,
        title: &str,
        folder_id: Option<&str>,
    ) -> Result<String, BookmarkError>;
    fn remove_bookmark(&mut self, id: &str) -> Result<(), BookmarkError>;
    fn rename_bookmark(&mut self, id: &str, title: &str) -> Result<(), BookmarkError>;
    fn move_bookmark(&mut self, id: &str, folder_id: Option<&str>) -> Result<(), BookmarkError>;
    fn list_bookmarks(&self, folder_id: Option<&str>) -> Result<Vec<Bookmark>, BookmarkError>;
    fn create_folder(&mut self, name: &str, parent_id: Option<&str>)
        -> Result<String, BookmarkError>;
    fn rename_folder(&mut self, id: &str, name: &str) -> Result<(), BookmarkError>;
    fn delete_folder(&mut self, id: &str) -> Result<(), BookmarkError>;
    fn list_folders(&self, parent_id: Option<&str>) -> Result<Vec<BookmarkFolder>, BookmarkError>;
    fn apply(&mut self, mutation: BookmarkMutation) -> Result<Option<String>, BookmarkError>;
}

/// Bookmark manager backed by a SQLite connection.
pub struct BookmarkManager<'a> {
    conn: &'a Connection,
}

fn db_err(e: rusqlite::Error) -> BookmarkError {
    BookmarkError::DatabaseError(e.to_string())
}

impl<'a> BookmarkManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    /// Next free position among the rows of `table` whose `parent_column`
    /// equals `parent` (or is NULL for the root).
    fn next_position(
        &self,
        table: &str,
        parent_column: &str,
        parent: Option<&str>,
    ) -> Result<i32, BookmarkError> {
        let sql = format!(
            "SELECT COALESCE(MAX(position), -1) + 1 FROM {table} WHERE {parent_column} IS ?1"
        );
        self.conn
            .query_row(&sql, params![parent], |row| row.get(0))
            .map_err(db_err)
    }

    fn ensure_folder(&self, folder_id: Option<&str>) -> Result<(), BookmarkError> {
        let Some(fid) = folder_id else {
            return Ok(());
        };
        let count: i32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM bookmark_folders WHERE id = ?1",
                params![fid],
                |row| row.get(0),
            )
            .map_err(db_err)?;
        if count == 0 {
            return Err(BookmarkError::FolderNotFound(fid.to_string()));
        }
        Ok(())
    }

    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        Ok(Bookmark {
            id: row.get(0)?,
            url: row.get(1)?,
            title: row.get(2)?,
            folder_id: row.get(3)?,
            position: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn row_to_folder(row: &rusqlite::Row) -> rusqlite::Result<BookmarkFolder> {
        Ok(BookmarkFolder {
            id: row.get(0)?,
            name: row.get(1)?,
            parent_id: row.get(2)?,
            position: row.get(3)?,
        })
    }
}

impl<'a> BookmarkManagerTrait for BookmarkManager<'a> {
    fn add_bookmark(
        &mut self,
        url: &str,
        title: &str,
        folder_id: Option<&str>,
    ) -> Result<String, BookmarkError> {
        self.ensure_folder(folder_id)?;

        let id = Uuid::new_v4().to_string();
        let now = Self::now();
        let position = self.next_position("bookmarks", "folder_id", folder_id)?;

        self.conn
            .execute(
                "INSERT INTO bookmarks \
                 (id, url, title, folder_id, position, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                params![id, url, title, folder_id, position, now],
            )
            .map_err(db_err)?;
        Ok(id)
    }

    fn remove_bookmark(&mut self, id: &str) -> Result<(), BookmarkError> {
        let affected = self
            .conn
            .execute("DELETE FROM bookmarks WHERE id = ?1", params![id])
            .map_err(db_err)?;
        if affected == 0 {
            return Err(BookmarkError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn rename_bookmark(&mut self, id: &str, title: &str) -> Result<(), BookmarkError> {
        let affected = self
            .conn
            .execute(
                "UPDATE bookmarks SET title = ?1, updated_at = ?2 WHERE id = ?3",
                params![title, Self::now(), id],
            )
            .map_err(db_err)?;
        if affected == 0 {
            return Err(BookmarkError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Moves a bookmark to the end of a folder (`None` is the root).
    fn move_bookmark(&mut self, id: &str, folder_id: Option<&str>) -> Result<(), BookmarkError> {
        self.ensure_folder(folder_id)?;
        let position = self.next_position("bookmarks", "folder_id", folder_id)?;

        let affected = self
            .conn
            .execute(
                "UPDATE bookmarks SET folder_id = ?1, position = ?2, updated_at = ?3 WHERE id = ?4",
                params![folder_id, position, Self::now(), id],
            )
            .map_err(db_err)?;
        if affected == 0 {
            return Err(BookmarkError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn list_bookmarks(&self, folder_id: Option<&str>) -> Result<Vec<Bookmark>, BookmarkError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, url, title, folder_id, position, created_at, updated_at \
                 FROM bookmarks WHERE folder_id IS ?1 ORDER BY position",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![folder_id], Self::row_to_bookmark)
            .map_err(db_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(db_err)
    }

    fn create_folder(
        &mut self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<String, BookmarkError> {
        self.ensure_folder(parent_id)?;

        let id = Uuid::new_v4().to_string();
        let position = self.next_position("bookmark_folders", "parent_id", parent_id)?;

        self.conn
            .execute(
                "INSERT INTO bookmark_folders (id, name, parent_id, position) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, name, parent_id, position],
            )
            .map_err(db_err)?;
        Ok(id)
    }

    fn rename_folder(&mut self, id: &str, name: &str) -> Result<(), BookmarkError> {
        let affected = self
            .conn
            .execute(
                "UPDATE bookmark_folders SET name = ?1 WHERE id = ?2",
                params![name, id],
            )
            .map_err(db_err)?;
        if affected == 0 {
            return Err(BookmarkError::FolderNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Deletes a folder. Its bookmarks and sub-folders move to the root.
    fn delete_folder(&mut self, id: &str) -> Result<(), BookmarkError> {
        self.ensure_folder(Some(id))?;

        self.conn
            .execute_batch("BEGIN")
            .map_err(db_err)?;
        let result = (|| {
            self.conn.execute(
                "UPDATE bookmarks SET folder_id = NULL WHERE folder_id = ?1",
                params![id],
            )?;
            self.conn.execute(
                "UPDATE bookmark_folders SET parent_id = NULL WHERE parent_id = ?1",
                params![id],
            )?;
            self.conn
                .execute("DELETE FROM bookmark_folders WHERE id = ?1", params![id])
        })();

        match result {
            Ok(_) => self.conn.execute_batch("COMMIT").map_err(db_err),
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(db_err(e))
            }
        }
    }

    fn list_folders(&self, parent_id: Option<&str>) -> Result<Vec<BookmarkFolder>, BookmarkError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, parent_id, position FROM bookmark_folders \
                 WHERE parent_id IS ?1 ORDER BY position",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![parent_id], Self::row_to_folder)
            .map_err(db_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(db_err)
    }

    /// Applies one mutation. Returns the new ID for mutations that create a
    /// row.
    fn apply(&mut self, mutation: BookmarkMutation) -> Result<Option<String>, BookmarkError> {
        debug!(?mutation, "Applying bookmark mutation");
        match mutation {
            BookmarkMutation::Add {
                url,
                title,
                folder_id,
            } => self.add_bookmark(&url, &title, folder_id.as_deref()).map(Some),
            BookmarkMutation::Remove { id } => self.remove_bookmark(&id).map(|_| None),
            BookmarkMutation::Rename { id, title } => {
                self.rename_bookmark(&id, &title).map(|_| None)
            }
            BookmarkMutation::Move { id, folder_id } => {
                self.move_bookmark(&id, folder_id.as_deref()).map(|_| None)
            }
            BookmarkMutation::CreateFolder { name, parent_id } => {
                self.create_folder(&name, parent_id.as_deref()).map(Some)
            }
            BookmarkMutation::RenameFolder { id, name } => {
                self.rename_folder(&id, &name).map(|_| None)
            }
            BookmarkMutation::DeleteFolder { id } => self.delete_folder(&id).map(|_| None),
        }
    }
}
