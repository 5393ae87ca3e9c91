// TrainedModel: the output of fitting LDA to a corpus.
//
// Holds the estimated topic-word distributions (phi, K x V) and
// document-topic distributions (theta, D x K) plus everything needed to use
// the model later: the vocabulary, the tokenizer settings used to build it,
// and the hyperparameters. Serialized to JSON for the model store.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::params::LdaParams;
use crate::corpus::{TokenizerOptions, Vocabulary};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub params: LdaParams,
    /// Alpha after optimization (equals `params.alpha` when not optimized)
    pub alpha: f64,
    pub vocabulary: Vocabulary,
    pub tokenizer_options: TokenizerOptions,
    /// Topic-word distributions, one row per topic
    pub phi: Vec<Vec<f64>>,
    /// Document-topic distributions, one row per training document
    pub theta: Vec<Vec<f64>>,
    pub doc_labels: Vec<String>,
    /// Number of training tokens assigned to each topic in the final state
    pub topic_token_counts: Vec<u64>,
    /// (iteration, joint log-likelihood) checkpoints recorded during training
    pub log_likelihoods: Vec<(usize, f64)>,
}

impl TrainedModel {
    pub fn num_topics(&self) -> usize {
        self.phi.len()
    }

    pub fn vocab_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn num_documents(&self) -> usize {
        self.theta.len()
    }

    pub fn token_count(&self) -> u64 {
        self.topic_token_counts.iter().sum()
    }

    /// The `n` most probable words of topic `k`, highest first.
    pub fn top_words(&self, k: usize, n: usize) -> Vec<(String, f64)> {
        let Some(row) = self.phi.get(k) else {
            return Vec::new();
        };
        let mut ranked: Vec<(usize, f64)> = row.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
            .into_iter()
            .take(n)
            .filter_map(|(id, p)| self.vocabulary.word_of(id).map(|w| (w.to_string(), p)))
            .collect()
    }

    /// Topic mixture of training document `d`.
    pub fn document_topics(&self, d: usize) -> Option<&[f64]> {
        self.theta.get(d).map(Vec::as_slice)
    }

    /// The most probable topic of training document `d`, with its probability.
    pub fn dominant_topic(&self, d: usize) -> Option<(usize, f64)> {
        argmax(self.document_topics(d)?)
    }

    /// P(word | topic k). Unknown words and topics give `None`.
    pub fn topic_word_probability(&self, k: usize, word: &str) -> Option<f64> {
        let id = self.vocabulary.id_of(word)?;
        self.phi.get(k)?.get(id).copied()
    }

    /// Share of training tokens assigned to each topic (sums to 1).
    pub fn topic_weights(&self) -> Vec<f64> {
        let total = self.token_count() as f64;
        if total == 0.0 {
            let k = self.num_topics().max(1) as f64;
            return vec![1.0 / k; self.num_topics()];
        }
        self.topic_token_counts
            .iter()
            .map(|&c| c as f64 / total)
            .collect()
    }

    /// The last recorded joint log-likelihood.
    pub fn final_log_likelihood(&self) -> Option<f64> {
        self.log_likelihoods.last().map(|&(_, ll)| ll)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize model")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let mut model: Self = serde_json::from_str(json).context("Failed to parse stored model")?;
        model.vocabulary.rebuild_index();
        Ok(model)
    }
}

/// Index and value of the largest element.
pub fn argmax(values: &[f64]) -> Option<(usize, f64)> {
    values
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_model() -> TrainedModel {
        TrainedModel {
            params: LdaParams::with_topics(2),
            alpha: 25.0,
            vocabulary: Vocabulary::from_words(["galaxy", "quasar", "enzyme"]),
            tokenizer_options: TokenizerOptions::default(),
            phi: vec![vec![0.5, 0.4, 0.1], vec![0.05, 0.05, 0.9]],
            theta: vec![vec![0.8, 0.2], vec![0.1, 0.9]],
            doc_labels: vec!["a".to_string(), "b".to_string()],
            topic_token_counts: vec![3, 1],
            log_likelihoods: vec![(10, -20.0), (20, -15.0)],
        }
    }

    #[test]
    fn test_top_words_sorted() {
        let model = tiny_model();
        let top = model.top_words(0, 2);
        assert_eq!(top[0].0, "galaxy");
        assert_eq!(top[1].0, "quasar");
        assert!(model.top_words(5, 2).is_empty());
    }

    #[test]
    fn test_dominant_topic() {
        let model = tiny_model();
        assert_eq!(model.dominant_topic(0).map(|(k, _)| k), Some(0));
        assert_eq!(model.dominant_topic(1).map(|(k, _)| k), Some(1));
        assert_eq!(model.dominant_topic(2), None);
    }

    #[test]
    fn test_topic_weights_and_lookup() {
        let model = tiny_model();
        let weights = model.topic_weights();
        assert!((weights[0] - 0.75).abs() < 1e-12);
        assert_eq!(model.topic_word_probability(1, "enzyme"), Some(0.9));
        assert_eq!(model.topic_word_probability(1, "comet"), None);
        assert_eq!(model.final_log_likelihood(), Some(-15.0));
    }

    #[test]
    fn test_json_roundtrip_keeps_lookup() {
        let model = tiny_model();
        let loaded = TrainedModel::from_json(&model.to_json().unwrap()).unwrap();
        assert_eq!(loaded.vocabulary.id_of("quasar"), Some(1));
        assert_eq!(loaded.num_topics(), 2);
    }
}
