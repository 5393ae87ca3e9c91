// Training pipeline: fit, evaluate, persist.
//
// 1. Fit the sampler on a blocking thread, driving a progress bar
// 2. Score the training corpus (perplexity under the averaged phi/theta,
//    UMass coherence of each topic's top words)
// 3. Save the model and mark it as the most recently trained one

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::corpus::Corpus;
use crate::db::traits::{ModelStore, LAST_TRAINED_MODEL};
use crate::model::likelihood::{perplexity, predictive_log_likelihood};
use crate::model::{GibbsSampler, LdaParams, TopicModel, TrainedModel};
use crate::topics::coherence::{mean_coherence, topic_coherence, COHERENCE_TOP_WORDS};

/// What a training run produced.
#[derive(Debug)]
pub struct TrainingReport {
    pub name: String,
    pub model: TrainedModel,
    pub perplexity: f64,
    /// UMass coherence per topic, `None` where it couldn't be scored
    pub coherence: Vec<Option<f64>>,
    pub documents: usize,
    pub tokens: usize,
    pub elapsed: Duration,
}

/// Fit a model to `corpus`, store it as `name`, and return a report.
pub async fn run(
    store: &Arc<dyn ModelStore>,
    corpus: Corpus,
    params: LdaParams,
    name: &str,
    corpus_path: Option<&str>,
) -> Result<TrainingReport> {
    let sampler = GibbsSampler::new(params)?;
    let documents = corpus.len();
    let tokens = corpus.token_count();

    let pb = ProgressBar::new(sampler.params().iterations as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Sampling [{bar:30}] {pos}/{len} sweeps ({eta})")
            .unwrap(),
    );

    let started = Instant::now();
    let task_pb = pb.clone();
    let (model, training_perplexity, coherence) = tokio::task::spawn_blocking(move || {
        let model = sampler.fit_with_progress(&corpus, &mut |i| task_pb.set_position(i as u64))?;
        let ll = predictive_log_likelihood(&model.phi, &model.theta, &corpus.documents)?;
        let ppl = perplexity(ll, corpus.token_count())?;
        let coherence = topic_coherence(&model, &corpus, COHERENCE_TOP_WORDS);
        anyhow::Ok((model, ppl, coherence))
    })
    .await
    .context("Training task panicked")??;
    pb.finish_and_clear();
    let elapsed = started.elapsed();

    info!(
        name,
        perplexity = training_perplexity,
        coherence = mean_coherence(&coherence).unwrap_or(f64::NAN),
        elapsed_ms = elapsed.as_millis() as u64,
        "Trained model"
    );

    store
        .save_model(name, &model, Some(training_perplexity), corpus_path)
        .await?;
    store.set_state(LAST_TRAINED_MODEL, name).await?;

    Ok(TrainingReport {
        name: name.to_string(),
        model,
        perplexity: training_perplexity,
        coherence,
        documents,
        tokens,
        elapsed,
    })
}
