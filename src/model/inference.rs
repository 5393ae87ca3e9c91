// Fold-in inference: topic mixtures for documents the model never saw.
//
// phi is held fixed and only the new document's token assignments are
// resampled:
//
//   p(z = k | rest) ∝ (n_dk + alpha) * phi_kw
//
// Words outside the model's vocabulary are ignored.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::gibbs::sample_index;
use super::likelihood::{perplexity, predictive_log_likelihood};
use super::trained::TrainedModel;
use crate::corpus::{encode_with, Document, Tokenizer};

/// Infers document-topic distributions against a trained model.
pub struct Inferencer<'a> {
    model: &'a TrainedModel,
    tokenizer: Tokenizer,
    iterations: usize,
    seed: u64,
}

impl<'a> Inferencer<'a> {
    pub fn new(model: &'a TrainedModel, iterations: usize, seed: u64) -> Result<Self> {
        if iterations == 0 {
            anyhow::bail!("Inference needs at least one iteration");
        }
        Ok(Self {
            model,
            tokenizer: Tokenizer::new(&model.tokenizer_options)?,
            iterations,
            seed,
        })
    }

    /// Map raw text onto the model's vocabulary.
    pub fn encode(&self, text: &str) -> Vec<usize> {
        encode_with(&self.tokenizer, &self.model.vocabulary, text)
    }

    /// Topic mixture for raw text.
    pub fn infer(&self, text: &str) -> Vec<f64> {
        self.infer_words(&self.encode(text))
    }

    /// Topic mixture for an already-encoded document.
    ///
    /// An empty document gets the uniform distribution.
    pub fn infer_words(&self, words: &[usize]) -> Vec<f64> {
        let num_topics = self.model.num_topics();
        let alpha = self.model.alpha;
        let phi = &self.model.phi;

        let words: Vec<usize> = words
            .iter()
            .copied()
            .filter(|&w| w < self.model.vocab_size())
            .collect();
        if words.is_empty() || num_topics == 0 {
            return vec![1.0 / num_topics.max(1) as f64; num_topics];
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut counts = vec![0u32; num_topics];
        let mut assignments: Vec<usize> = words
            .iter()
            .map(|_| {
                let k = rng.random_range(0..num_topics);
                counts[k] += 1;
                k
            })
            .collect();

        let burn_in = self.iterations / 2;
        let mut theta_sum = vec![0.0; num_topics];
        let mut samples = 0usize;
        let mut weights = vec![0.0; num_topics];
        let denom = words.len() as f64 + num_topics as f64 * alpha;

        for iteration in 1..=self.iterations {
            for (n, &w) in words.iter().enumerate() {
                counts[assignments[n]] -= 1;
                for (k, weight) in weights.iter_mut().enumerate() {
                    *weight = (counts[k] as f64 + alpha) * phi[k][w];
                }
                let k = sample_index(&weights, &mut rng);
                counts[k] += 1;
                assignments[n] = k;
            }

            if iteration > burn_in {
                for (acc, &c) in theta_sum.iter_mut().zip(&counts) {
                    *acc += (c as f64 + alpha) / denom;
                }
                samples += 1;
            }
        }

        theta_sum.iter().map(|&t| t / samples as f64).collect()
    }

    /// Perplexity of held-out texts, using inferred mixtures.
    ///
    /// `None` when not one word of the texts is in the model's vocabulary.
    pub fn perplexity(&self, texts: &[String]) -> Result<Option<f64>> {
        let documents: Vec<Document> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Document {
                label: format!("held-out-{i}"),
                words: self.encode(text),
            })
            .filter(|doc| !doc.is_empty())
            .collect();

        let theta: Vec<Vec<f64>> = documents
            .iter()
            .map(|doc| self.infer_words(&doc.words))
            .collect();
        let tokens: usize = documents.iter().map(Document::len).sum();
        if tokens == 0 {
            return Ok(None);
        }

        let ll = predictive_log_likelihood(&self.model.phi, &theta, &documents)?;
        perplexity(ll, tokens).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{TokenizerOptions, Vocabulary};
    use crate::model::params::LdaParams;

    fn model() -> TrainedModel {
        TrainedModel {
            params: LdaParams::with_topics(2),
            alpha: 0.1,
            vocabulary: Vocabulary::from_words(["galaxy", "quasar", "enzyme", "protein"]),
            tokenizer_options: TokenizerOptions::default(),
            phi: vec![
                vec![0.49, 0.49, 0.01, 0.01],
                vec![0.01, 0.01, 0.49, 0.49],
            ],
            theta: vec![],
            doc_labels: vec![],
            topic_token_counts: vec![10, 10],
            log_likelihoods: vec![],
        }
    }

    #[test]
    fn test_infer_single_theme() {
        let model = model();
        let inferencer = Inferencer::new(&model, 50, 1).unwrap();
        let theta = inferencer.infer("galaxy quasar galaxy quasar galaxy");
        assert!(theta[0] > 0.8, "theta = {theta:?}");
        assert!((theta.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_words_give_uniform() {
        let model = model();
        let inferencer = Inferencer::new(&model, 50, 1).unwrap();
        assert_eq!(inferencer.infer("spaceship dinosaur"), vec![0.5, 0.5]);
        assert_eq!(inferencer.infer_words(&[]), vec![0.5, 0.5]);
    }

    #[test]
    fn test_held_out_perplexity_is_finite() {
        let model = model();
        let inferencer = Inferencer::new(&model, 50, 1).unwrap();
        let ppl = inferencer
            .perplexity(&["galaxy quasar".to_string(), "enzyme protein".to_string()])
            .unwrap()
            .unwrap();
        assert!(ppl.is_finite());
        // Well-separated topics: close to the 2-word-per-topic ideal
        assert!(ppl < 3.0, "perplexity = {ppl}");
    }

    #[test]
    fn test_perplexity_without_known_words_is_none() {
        let model = model();
        let inferencer = Inferencer::new(&model, 50, 1).unwrap();
        let ppl = inferencer
            .perplexity(&["spaceship dinosaur".to_string(), String::new()])
            .unwrap();
        assert_eq!(ppl, None);
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let model = model();
        assert!(Inferencer::new(&model, 0, 1).is_err());
    }
}
