// SqliteStore: rusqlite backend implementing the ModelStore trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{ModelRecord, StoredModel};
use super::traits::ModelStore;
use crate::model::TrainedModel;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl ModelStore for SqliteStore {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn get_state(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().await;
        super::queries::get_state(&conn, key)
    }

    async fn set_state(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::set_state(&conn, key, value)
    }

    async fn save_model(
        &self,
        name: &str,
        model: &TrainedModel,
        perplexity: Option<f64>,
        corpus_path: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::save_model(&conn, name, model, perplexity, corpus_path)
    }

    async fn load_model(&self, name: &str) -> Result<Option<StoredModel>> {
        let conn = self.conn.lock().await;
        super::queries::load_model(&conn, name)
    }

    async fn list_models(&self) -> Result<Vec<ModelRecord>> {
        let conn = self.conn.lock().await;
        super::queries::list_models(&conn)
    }

    async fn delete_model(&self, name: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        super::queries::delete_model(&conn, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{TokenizerOptions, Vocabulary};
    use crate::db::schema::create_tables;
    use crate::db::traits::LAST_TRAINED_MODEL;
    use crate::model::LdaParams;

    async fn test_db() -> SqliteStore {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        SqliteStore::new(conn)
    }

    fn model() -> TrainedModel {
        TrainedModel {
            params: LdaParams::with_topics(2),
            alpha: 0.5,
            vocabulary: Vocabulary::from_words(["galaxy", "enzyme"]),
            tokenizer_options: TokenizerOptions::default(),
            phi: vec![vec![0.9, 0.1], vec![0.1, 0.9]],
            theta: vec![vec![0.8, 0.2]],
            doc_labels: vec!["a".into()],
            topic_token_counts: vec![3, 2],
            log_likelihoods: vec![],
        }
    }

    #[tokio::test]
    async fn test_trait_state_roundtrip() {
        let db = test_db().await;
        assert_eq!(db.get_state(LAST_TRAINED_MODEL).await.unwrap(), None);
        db.set_state(LAST_TRAINED_MODEL, "notes").await.unwrap();
        assert_eq!(
            db.get_state(LAST_TRAINED_MODEL).await.unwrap(),
            Some("notes".to_string())
        );
    }

    #[tokio::test]
    async fn test_trait_model_lifecycle() {
        let db = test_db().await;
        assert_eq!(db.table_count().await.unwrap(), 3);

        db.save_model("notes", &model(), Some(3.2), None).await.unwrap();
        let stored = db.load_model("notes").await.unwrap().unwrap();
        assert_eq!(stored.model.phi, model().phi);
        assert_eq!(stored.record.log_likelihood, None);

        assert_eq!(db.list_models().await.unwrap().len(), 1);
        assert!(db.delete_model("notes").await.unwrap());
        assert!(db.load_model("notes").await.unwrap().is_none());
    }
}
