// Database layer: SQLite storage for fitted models and app state.
//
// We use rusqlite with the "bundled" feature so there's no system SQLite
// dependency. The database file lives wherever LDA_DB_PATH points
// (defaults to ./lda.db).

pub mod models;
pub mod queries;
pub mod schema;
pub mod sqlite;
pub mod traits;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rusqlite::Connection;

pub use traits::ModelStore;

/// Open (or create) the database and make sure its tables exist.
///
/// This is the main entry point, called by `lda init` and by `lda train`.
pub fn initialize(db_path: &str) -> Result<Connection> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for database: {}", db_path))?;
        }
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;

    schema::create_tables(&conn)?;

    Ok(conn)
}

/// Open an existing database (fails if it doesn't exist yet).
pub fn open(db_path: &str) -> Result<Connection> {
    if !Path::new(db_path).exists() {
        anyhow::bail!("Database not found at {}. Run `lda init` first.", db_path);
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;

    // Tables are created idempotently, so older files gain any new ones
    schema::create_tables(&conn)?;

    Ok(conn)
}

/// Initialize the SQLite store behind the `ModelStore` trait.
pub fn initialize_sqlite(db_path: &str) -> Result<Arc<dyn ModelStore>> {
    Ok(Arc::new(sqlite::SqliteStore::new(initialize(db_path)?)))
}

/// Open an existing SQLite store behind the `ModelStore` trait.
pub fn open_sqlite(db_path: &str) -> Result<Arc<dyn ModelStore>> {
    Ok(Arc::new(sqlite::SqliteStore::new(open(db_path)?)))
}
