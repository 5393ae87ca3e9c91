// ModelStore trait: async interface over model persistence.
//
// All methods are async so the CLI can hold an `Arc<dyn ModelStore>` on the
// tokio runtime while the SQLite backend does its synchronous work behind a
// mutex.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{ModelRecord, StoredModel};
use crate::model::TrainedModel;

/// State key naming the most recently trained model.
pub const LAST_TRAINED_MODEL: &str = "last_trained_model";

#[async_trait]
pub trait ModelStore: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    // --- App state ---

    async fn get_state(&self, key: &str) -> Result<Option<String>>;

    async fn set_state(&self, key: &str, value: &str) -> Result<()>;

    // --- Models ---

    /// Save a model under `name` (upsert).
    async fn save_model(
        &self,
        name: &str,
        model: &TrainedModel,
        perplexity: Option<f64>,
        corpus_path: Option<&str>,
    ) -> Result<()>;

    async fn load_model(&self, name: &str) -> Result<Option<StoredModel>>;

    /// All stored models, most recently updated first.
    async fn list_models(&self) -> Result<Vec<ModelRecord>>;

    /// Returns whether a model was removed.
    async fn delete_model(&self, name: &str) -> Result<bool>;
}
