// Topic model trait: swap-ready abstraction.
//
// Callers fit models through this trait so the estimator (collapsed Gibbs
// today) can be replaced without touching the pipeline or the CLI.

use super::trained::TrainedModel;
use crate::corpus::Corpus;
use anyhow::Result;

/// Trait for estimating a topic model from a corpus.
pub trait TopicModel {
    /// Fit the model to `corpus`.
    fn fit(&self, corpus: &Corpus) -> Result<TrainedModel>;

    /// Fit the model, calling `progress` with the number of completed sweeps.
    fn fit_with_progress(
        &self,
        corpus: &Corpus,
        progress: &mut dyn FnMut(usize),
    ) -> Result<TrainedModel> {
        let _ = progress;
        self.fit(corpus)
    }
}
