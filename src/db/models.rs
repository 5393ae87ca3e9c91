// Data models: Rust structs that map to database rows.
//
// These are separate from the queries so other modules can use them without
// depending on rusqlite directly.

use serde::{Deserialize, Serialize};

use crate::model::TrainedModel;

/// Summary row for a stored model (everything but the model body).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRecord {
    pub name: String,
    pub num_topics: u32,
    pub vocab_size: u32,
    pub doc_count: u32,
    pub token_count: u64,
    pub log_likelihood: Option<f64>,
    pub perplexity: Option<f64>,
    /// File or directory the training corpus was read from
    pub corpus_path: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A stored model with its decoded body.
#[derive(Debug, Clone)]
pub struct StoredModel {
    pub record: ModelRecord,
    pub model: TrainedModel,
}
