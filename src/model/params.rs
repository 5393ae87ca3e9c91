// Hyperparameters and run settings for LDA training.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Settings for a collapsed Gibbs LDA run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LdaParams {
    /// Number of topics (K)
    pub num_topics: usize,
    /// Symmetric document-topic Dirichlet prior
    pub alpha: f64,
    /// Symmetric topic-word Dirichlet prior
    pub beta: f64,
    /// Total Gibbs sweeps over the corpus
    pub iterations: usize,
    /// Sweeps discarded before phi/theta samples are averaged
    pub burn_in: usize,
    /// Take a sample (and record log-likelihood) every this many sweeps
    pub sample_lag: usize,
    /// Re-estimate alpha every this many sweeps after burn-in (0 = never)
    pub optimize_interval: usize,
    pub seed: u64,
}

impl Default for LdaParams {
    fn default() -> Self {
        Self::with_topics(10)
    }
}

impl LdaParams {
    /// Defaults for `num_topics` topics, with alpha set by the 50/K heuristic.
    pub fn with_topics(num_topics: usize) -> Self {
        Self {
            num_topics,
            alpha: default_alpha(num_topics),
            beta: 0.01,
            iterations: 1000,
            burn_in: 200,
            sample_lag: 10,
            optimize_interval: 0,
            seed: 42,
        }
    }

    /// Change the sweep count, shrinking burn-in to `iterations / 5` when the
    /// current burn-in would no longer leave any sweeps to sample from.
    pub fn set_iterations(&mut self, iterations: usize) {
        self.iterations = iterations;
        if self.burn_in >= iterations {
            self.burn_in = iterations / 5;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_topics == 0 {
            anyhow::bail!("num_topics must be at least 1");
        }
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            anyhow::bail!("alpha must be a positive number, got {}", self.alpha);
        }
        if !(self.beta.is_finite() && self.beta > 0.0) {
            anyhow::bail!("beta must be a positive number, got {}", self.beta);
        }
        if self.iterations == 0 {
            anyhow::bail!("iterations must be at least 1");
        }
        if self.burn_in >= self.iterations {
            anyhow::bail!(
                "burn_in ({}) must be smaller than iterations ({})",
                self.burn_in,
                self.iterations
            );
        }
        if self.sample_lag == 0 {
            anyhow::bail!("sample_lag must be at least 1");
        }
        Ok(())
    }
}

/// The Griffiths & Steyvers heuristic: alpha = 50 / K.
pub fn default_alpha(num_topics: usize) -> f64 {
    50.0 / num_topics.max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = LdaParams::default();
        assert_eq!(params.num_topics, 10);
        assert!((params.alpha - 5.0).abs() < 1e-12);
        params.validate().unwrap();
    }

    #[test]
    fn test_set_iterations_fits_burn_in() {
        let mut params = LdaParams::default();
        params.set_iterations(100);
        assert_eq!(params.burn_in, 20);
        params.validate().unwrap();

        // A burn-in that still fits is left alone
        params.burn_in = 50;
        params.set_iterations(400);
        assert_eq!(params.burn_in, 50);
    }

    #[test]
    fn test_rejects_bad_values() {
        let base = LdaParams::with_topics(4);
        let cases = [
            LdaParams { num_topics: 0, ..base.clone() },
            LdaParams { alpha: 0.0, ..base.clone() },
            LdaParams { beta: f64::NAN, ..base.clone() },
            LdaParams { iterations: 0, burn_in: 0, ..base.clone() },
            LdaParams { burn_in: 1000, ..base.clone() },
            LdaParams { sample_lag: 0, ..base.clone() },
        ];
        for params in cases {
            assert!(params.validate().is_err(), "{params:?} should be rejected");
        }
    }
}
