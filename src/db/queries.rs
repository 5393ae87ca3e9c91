// Database queries: CRUD operations for all tables.
//
// Every database interaction goes through this module. This keeps SQL
// contained in one place and gives the rest of the app clean Rust interfaces.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::models::{ModelRecord, StoredModel};
use crate::model::TrainedModel;

// --- App state ---

/// Get an app state value by key (e.g., "last_trained_model").
pub fn get_state(conn: &Connection, key: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT value FROM app_state WHERE key = ?1")?;
    let result = stmt.query_row(params![key], |row| row.get(0)).optional()?;
    Ok(result)
}

/// Set an app state value (upsert).
pub fn set_state(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO app_state (key, value, updated_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
        params![key, value],
    )?;
    Ok(())
}

// --- Topic models ---

const RECORD_COLUMNS: &str = "name, num_topics, vocab_size, doc_count, token_count, \
     log_likelihood, perplexity, corpus_path, created_at, updated_at";

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ModelRecord> {
    let token_count: i64 = row.get(4)?;
    Ok(ModelRecord {
        name: row.get(0)?,
        num_topics: row.get(1)?,
        vocab_size: row.get(2)?,
        doc_count: row.get(3)?,
        token_count: token_count.max(0) as u64,
        log_likelihood: row.get(5)?,
        perplexity: row.get(6)?,
        corpus_path: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Save a model under `name`, replacing any model with the same name.
/// The original creation time is kept on replace.
pub fn save_model(
    conn: &Connection,
    name: &str,
    model: &TrainedModel,
    perplexity: Option<f64>,
    corpus_path: Option<&str>,
) -> Result<()> {
    let json = model.to_json()?;
    conn.execute(
        "INSERT INTO topic_models (name, num_topics, vocab_size, doc_count, token_count,
                                   log_likelihood, perplexity, model_json, corpus_path,
                                   updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, datetime('now'))
         ON CONFLICT(name) DO UPDATE SET
            num_topics = ?2,
            vocab_size = ?3,
            doc_count = ?4,
            token_count = ?5,
            log_likelihood = ?6,
            perplexity = ?7,
            model_json = ?8,
            corpus_path = ?9,
            updated_at = datetime('now')",
        params![
            name,
            model.num_topics() as u32,
            model.vocab_size() as u32,
            model.num_documents() as u32,
            model.token_count() as i64,
            model.final_log_likelihood(),
            perplexity,
            json,
            corpus_path,
        ],
    )
    .with_context(|| format!("Failed to save model '{name}'"))?;
    Ok(())
}

/// Load a model and its record by name.
pub fn load_model(conn: &Connection, name: &str) -> Result<Option<StoredModel>> {
    let sql = format!("SELECT {RECORD_COLUMNS}, model_json FROM topic_models WHERE name = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt
        .query_row(params![name], |row| {
            let record = record_from_row(row)?;
            let json: String = row.get(10)?;
            Ok((record, json))
        })
        .optional()?;

    match row {
        Some((record, json)) => {
            let model = TrainedModel::from_json(&json)
                .with_context(|| format!("Stored model '{name}' is corrupt"))?;
            Ok(Some(StoredModel { record, model }))
        }
        None => Ok(None),
    }
}

/// All model records, most recently updated first.
pub fn list_models(conn: &Connection) -> Result<Vec<ModelRecord>> {
    let sql = format!("SELECT {RECORD_COLUMNS} FROM topic_models ORDER BY updated_at DESC, name");
    let mut stmt = conn.prepare(&sql)?;
    let records = stmt
        .query_map([], record_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}

/// Delete a model. Returns whether a row was removed.
pub fn delete_model(conn: &Connection, name: &str) -> Result<bool> {
    let removed = conn.execute("DELETE FROM topic_models WHERE name = ?1", params![name])?;
    Ok(removed > 0)
}
