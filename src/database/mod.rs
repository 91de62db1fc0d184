//! Opacity database layer: SQLite connection management and schema
//! migrations.
//!
//! ```no_run
//! use opacity::database::Database;
//!
//! let db = Database::open("opacity.db").expect("failed to open database");
//! let conn = db.connection();
//! # let _ = conn;
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
