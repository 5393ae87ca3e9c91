// Inference pipeline: topic mixtures for new documents.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::model::{Inferencer, TrainedModel};

/// Topic mixture inferred for one new document.
#[derive(Debug, Clone, Serialize)]
pub struct InferredDocument {
    pub label: String,
    /// P(topic | document), one entry per topic
    pub topics: Vec<f64>,
    /// Tokens that matched the model's vocabulary
    pub known_tokens: usize,
}

/// Infer topic mixtures for `(label, text)` pairs on a blocking thread.
pub async fn run(
    model: Arc<TrainedModel>,
    texts: Vec<(String, String)>,
    iterations: usize,
    seed: u64,
) -> Result<Vec<InferredDocument>> {
    tokio::task::spawn_blocking(move || {
        let inferencer = Inferencer::new(&model, iterations, seed)?;
        let results = texts
            .into_iter()
            .map(|(label, text)| {
                let words = inferencer.encode(&text);
                InferredDocument {
                    label,
                    topics: inferencer.infer_words(&words),
                    known_tokens: words.len(),
                }
            })
            .collect();
        anyhow::Ok(results)
    })
    .await
    .context("Inference task panicked")?
}
