// System status display: DB size, stored models, last training run.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::db::traits::LAST_TRAINED_MODEL;
use crate::db::ModelStore;

/// Display system status to the terminal.
pub async fn show(db: &Arc<dyn ModelStore>, db_display_path: &str) -> Result<()> {
    let file_size = std::fs::metadata(db_display_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_display_path, file_size);

    let models = db.list_models().await?;
    if models.is_empty() {
        println!("Models: none yet");
        println!("  Run `lda train <PATH>` to fit one");
        return Ok(());
    }
    println!("Models: {} stored", models.len());

    match db.get_state(LAST_TRAINED_MODEL).await? {
        Some(name) => match models.iter().find(|m| m.name == name) {
            Some(record) => println!(
                "Last trained: {} ({} topics, {} documents, updated {})",
                record.name, record.num_topics, record.doc_count, record.updated_at
            ),
            None => println!("Last trained: {} (since deleted)", name),
        },
        None => println!("Last trained: unknown"),
    }

    Ok(())
}

/// True if the database file exists at all.
pub fn database_exists(db_path: &str) -> bool {
    Path::new(db_path).exists()
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
