// Database schema: table creation.
//
// A `schema_version` table records the layout each database was created
// with, so later releases can tell which upgrades a file needs.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
///
/// This is idempotent and safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Tracks schema version for future migrations
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Fitted topic models, one row per model name
        -- The model body is JSON so its structure can evolve without migrations
        CREATE TABLE IF NOT EXISTS topic_models (
            name TEXT PRIMARY KEY,
            num_topics INTEGER NOT NULL,
            vocab_size INTEGER NOT NULL,
            doc_count INTEGER NOT NULL,
            token_count INTEGER NOT NULL,
            log_likelihood REAL,               -- final joint log p(w, z)
            perplexity REAL,                   -- training-set perplexity
            corpus_path TEXT,                  -- file or directory trained on
            model_json TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Key/value app state (e.g. last_trained_model)
        CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_models_updated
            ON topic_models(updated_at);
        ",
    )
    .context("Failed to create database tables")?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [1],
    )?;

    Ok(())
}

/// Count the number of tables in the database (useful for init confirmation).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
