// Collapsed Gibbs sampling for LDA (Griffiths & Steyvers, 2004).
//
// phi and theta are integrated out, so the sampler only tracks one topic
// assignment per token and three count tables. Each token's topic is
// resampled from
//
//   p(z = k | rest) ∝ (n_dk + alpha) * (n_kw + beta) / (n_k + V * beta)
//
// with the token's own assignment removed from the counts first. After
// burn-in, phi/theta point estimates are averaged over lagged samples.

use anyhow::Result;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::likelihood::{digamma, joint_log_likelihood};
use super::params::LdaParams;
use super::trained::TrainedModel;
use super::traits::TopicModel;
use crate::corpus::{Corpus, Document};

/// Topic assignments and count tables for one chain.
#[derive(Debug, Clone)]
pub struct GibbsState {
    /// Topic of every token, `assignments[d][n]`
    pub assignments: Vec<Vec<usize>>,
    /// Tokens in document d assigned to topic k: documents x topics
    pub doc_topic: Array2<u32>,
    /// Tokens of word w assigned to topic k: topics x words
    pub topic_word: Array2<u32>,
    /// Tokens assigned to topic k
    pub topic_totals: Array1<u32>,
}

impl GibbsState {
    /// Assign every token a uniformly random topic.
    pub fn initialize<R: Rng>(
        documents: &[Document],
        vocab_size: usize,
        num_topics: usize,
        rng: &mut R,
    ) -> Self {
        let mut state = Self {
            assignments: Vec::with_capacity(documents.len()),
            doc_topic: Array2::zeros((documents.len(), num_topics)),
            topic_word: Array2::zeros((num_topics, vocab_size)),
            topic_totals: Array1::zeros(num_topics),
        };

        for (d, doc) in documents.iter().enumerate() {
            let mut topics = Vec::with_capacity(doc.len());
            for &w in &doc.words {
                let k = rng.random_range(0..num_topics);
                state.doc_topic[[d, k]] += 1;
                state.topic_word[[k, w]] += 1;
                state.topic_totals[k] += 1;
                topics.push(k);
            }
            state.assignments.push(topics);
        }
        state
    }

    pub fn num_topics(&self) -> usize {
        self.topic_totals.len()
    }

    /// Resample every token once.
    pub fn sweep<R: Rng>(
        &mut self,
        documents: &[Document],
        alpha: f64,
        beta: f64,
        rng: &mut R,
        weights: &mut Vec<f64>,
    ) {
        let num_topics = self.num_topics();
        let v_beta = self.topic_word.ncols() as f64 * beta;
        weights.resize(num_topics, 0.0);

        for (d, doc) in documents.iter().enumerate() {
            for (n, &w) in doc.words.iter().enumerate() {
                let old = self.assignments[d][n];
                self.doc_topic[[d, old]] -= 1;
                self.topic_word[[old, w]] -= 1;
                self.topic_totals[old] -= 1;

                for (k, weight) in weights.iter_mut().enumerate() {
                    *weight = (self.doc_topic[[d, k]] as f64 + alpha)
                        * (self.topic_word[[k, w]] as f64 + beta)
                        / (self.topic_totals[k] as f64 + v_beta);
                }
                let new = sample_index(weights, rng);

                self.doc_topic[[d, new]] += 1;
                self.topic_word[[new, w]] += 1;
                self.topic_totals[new] += 1;
                self.assignments[d][n] = new;
            }
        }
    }

    /// Point estimate of the topic-word distributions: topics x words.
    pub fn phi(&self, beta: f64) -> Array2<f64> {
        let v_beta = self.topic_word.ncols() as f64 * beta;
        let totals = self.topic_totals.mapv(|n| n as f64 + v_beta);
        (self.topic_word.mapv(|n| n as f64 + beta)) / totals.insert_axis(Axis(1))
    }

    /// Point estimate of the document-topic distributions: documents x topics.
    pub fn theta(&self, alpha: f64) -> Array2<f64> {
        let k_alpha = self.num_topics() as f64 * alpha;
        let lengths = self
            .doc_topic
            .sum_axis(Axis(1))
            .mapv(|n| n as f64 + k_alpha);
        (self.doc_topic.mapv(|n| n as f64 + alpha)) / lengths.insert_axis(Axis(1))
    }

    pub fn log_likelihood(&self, alpha: f64, beta: f64) -> f64 {
        joint_log_likelihood(
            self.doc_topic.view(),
            self.topic_word.view(),
            self.topic_totals.view(),
            alpha,
            beta,
        )
    }

    /// Check the count tables agree with the assignments.
    pub fn check_consistency(&self, documents: &[Document]) -> Result<()> {
        let mut total_tokens = 0u64;
        for (d, (doc, row)) in documents.iter().zip(self.doc_topic.rows()).enumerate() {
            let row_sum = row.sum();
            if row_sum as usize != doc.len() {
                anyhow::bail!(
                    "doc_topic row {d} sums to {row_sum}, document has {} tokens",
                    doc.len()
                );
            }
            total_tokens += doc.len() as u64;
        }
        for (k, row) in self.topic_word.rows().into_iter().enumerate() {
            let row_sum = row.sum();
            if row_sum != self.topic_totals[k] {
                anyhow::bail!(
                    "topic_word row {k} sums to {row_sum}, topic total is {}",
                    self.topic_totals[k]
                );
            }
        }
        let assigned: u64 = self.topic_totals.iter().map(|&n| n as u64).sum();
        if assigned != total_tokens {
            anyhow::bail!("{assigned} tokens assigned, corpus has {total_tokens}");
        }
        Ok(())
    }
}

/// Draw an index with probability proportional to `weights`.
pub(crate) fn sample_index<R: Rng>(weights: &[f64], rng: &mut R) -> usize {
    let total: f64 = weights.iter().sum();
    let mut u = rng.random::<f64>() * total;
    for (i, &w) in weights.iter().enumerate() {
        if u < w {
            return i;
        }
        u -= w;
    }
    // Floating-point leftovers land on the last topic
    weights.len() - 1
}

/// Minka's fixed-point update for a symmetric Dirichlet alpha.
pub fn optimize_alpha(doc_topic: &Array2<u32>, alpha: f64) -> f64 {
    let num_topics = doc_topic.ncols() as f64;
    if num_topics == 0.0 {
        return alpha;
    }

    let lengths = doc_topic.sum_axis(Axis(1));
    let mut alpha = alpha;
    for _ in 0..20 {
        let numerator: f64 = doc_topic
            .iter()
            .map(|&n| digamma(n as f64 + alpha) - digamma(alpha))
            .sum();
        let denominator: f64 = lengths
            .iter()
            .map(|&len| digamma(len as f64 + num_topics * alpha) - digamma(num_topics * alpha))
            .sum();
        if denominator <= 0.0 || numerator <= 0.0 {
            break;
        }
        let next = alpha * numerator / (num_topics * denominator);
        let converged = (next - alpha).abs() < 1e-6;
        alpha = next.max(1e-6);
        if converged {
            break;
        }
    }
    alpha
}

/// LDA estimator using collapsed Gibbs sampling.
pub struct GibbsSampler {
    params: LdaParams,
}

impl GibbsSampler {
    pub fn new(params: LdaParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &LdaParams {
        &self.params
    }
}

impl TopicModel for GibbsSampler {
    fn fit(&self, corpus: &Corpus) -> Result<TrainedModel> {
        self.fit_with_progress(corpus, &mut |_| {})
    }

    fn fit_with_progress(
        &self,
        corpus: &Corpus,
        progress: &mut dyn FnMut(usize),
    ) -> Result<TrainedModel> {
        if corpus.is_empty() || corpus.vocabulary.is_empty() {
            anyhow::bail!("Cannot fit a topic model to an empty corpus");
        }

        let p = &self.params;
        let documents = &corpus.documents;
        let vocab_size = corpus.vocabulary.len();
        let mut rng = StdRng::seed_from_u64(p.seed);
        let mut state = GibbsState::initialize(documents, vocab_size, p.num_topics, &mut rng);
        let mut alpha = p.alpha;

        info!(
            topics = p.num_topics,
            documents = documents.len(),
            vocabulary = vocab_size,
            tokens = corpus.token_count(),
            iterations = p.iterations,
            "Starting Gibbs sampling"
        );

        let mut phi_sum = Array2::<f64>::zeros((p.num_topics, vocab_size));
        let mut theta_sum = Array2::<f64>::zeros((documents.len(), p.num_topics));
        let mut samples = 0usize;
        let mut log_likelihoods = Vec::new();
        let mut weights = Vec::with_capacity(p.num_topics);

        for iteration in 1..=p.iterations {
            state.sweep(documents, alpha, p.beta, &mut rng, &mut weights);

            let past_burn_in = iteration > p.burn_in;

            if past_burn_in && p.optimize_interval > 0 && iteration % p.optimize_interval == 0 {
                let updated = optimize_alpha(&state.doc_topic, alpha);
                debug!(iteration, old = alpha, new = updated, "Re-estimated alpha");
                alpha = updated;
            }

            if past_burn_in && (iteration - p.burn_in) % p.sample_lag == 0 {
                phi_sum += &state.phi(p.beta);
                theta_sum += &state.theta(alpha);
                samples += 1;
            }

            if iteration % p.sample_lag == 0 || iteration == p.iterations {
                let ll = state.log_likelihood(alpha, p.beta);
                debug!(iteration, log_likelihood = ll, "Gibbs checkpoint");
                log_likelihoods.push((iteration, ll));
            }

            progress(iteration);
        }

        let (phi, theta) = if samples > 0 {
            let n = samples as f64;
            (phi_sum / n, theta_sum / n)
        } else {
            (state.phi(p.beta), state.theta(alpha))
        };

        let final_ll = log_likelihoods.last().map(|&(_, ll)| ll).unwrap_or_default();
        info!(
            samples,
            alpha,
            log_likelihood = final_ll,
            "Finished Gibbs sampling"
        );

        Ok(TrainedModel {
            params: p.clone(),
            alpha,
            vocabulary: corpus.vocabulary.clone(),
            tokenizer_options: corpus.tokenizer_options.clone(),
            phi: to_rows(&phi),
            theta: to_rows(&theta),
            doc_labels: documents.iter().map(|d| d.label.clone()).collect(),
            topic_token_counts: state.topic_totals.iter().map(|&n| n as u64).collect(),
            log_likelihoods,
        })
    }
}

/// Row-major `Vec` rows, the layout `TrainedModel` serializes.
fn to_rows(matrix: &Array2<f64>) -> Vec<Vec<f64>> {
    matrix.rows().into_iter().map(|row| row.to_vec()).collect()
}
