use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::corpus::CorpusOptions;
use crate::model::params::default_alpha;
use crate::model::LdaParams;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. CLI flags
/// override anything set here.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    /// Default training hyperparameters
    pub params: LdaParams,
    /// True when LDA_ALPHA was set, so changing the topic count keeps it
    pub alpha_is_set: bool,
    /// Words shown per topic
    pub top_words: usize,
    pub min_doc_freq: usize,
    pub max_doc_ratio: f64,
    /// README used for the package manifest (`lda about`)
    pub readme_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "./lda.db".to_string(),
            params: LdaParams::default(),
            alpha_is_set: false,
            top_words: 10,
            min_doc_freq: 1,
            max_doc_ratio: 1.0,
            readme_path: "README.md".to_string(),
        }
    }
}

/// Training flags given on the command line. `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct ParamOverrides {
    pub num_topics: Option<usize>,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub iterations: Option<usize>,
    pub burn_in: Option<usize>,
    pub seed: Option<u64>,
    pub optimize_interval: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default. A variable that is set but doesn't parse is
    /// an error naming the variable.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let var = |name: &str| (name.to_string(), lookup(name));

        let num_topics = parse_value(var("LDA_NUM_TOPICS"))?.unwrap_or(defaults.params.num_topics);
        let mut params = LdaParams::with_topics(num_topics);

        let alpha = parse_value(var("LDA_ALPHA"))?;
        if let Some(alpha) = alpha {
            params.alpha = alpha;
        }
        if let Some(beta) = parse_value(var("LDA_BETA"))? {
            params.beta = beta;
        }
        if let Some(iterations) = parse_value(var("LDA_ITERATIONS"))? {
            params.set_iterations(iterations);
        }
        if let Some(burn_in) = parse_value(var("LDA_BURN_IN"))? {
            params.burn_in = burn_in;
        }
        if let Some(seed) = parse_value(var("LDA_SEED"))? {
            params.seed = seed;
        }

        Ok(Self {
            db_path: lookup("LDA_DB_PATH").unwrap_or(defaults.db_path),
            params,
            alpha_is_set: alpha.is_some(),
            top_words: parse_value(var("LDA_TOP_WORDS"))?.unwrap_or(defaults.top_words),
            min_doc_freq: parse_value(var("LDA_MIN_DOC_FREQ"))?.unwrap_or(defaults.min_doc_freq),
            max_doc_ratio: parse_value(var("LDA_MAX_DOC_RATIO"))?
                .unwrap_or(defaults.max_doc_ratio),
            readme_path: lookup("LDA_README_PATH").unwrap_or(defaults.readme_path),
        })
    }

    /// Training parameters after applying command-line flags.
    ///
    /// Changing the topic count re-derives alpha as 50/K unless alpha was
    /// given by flag or by LDA_ALPHA.
    pub fn training_params(&self, overrides: &ParamOverrides) -> Result<LdaParams> {
        let mut params = self.params.clone();
        if let Some(k) = overrides.num_topics {
            params.num_topics = k;
            if !self.alpha_is_set {
                params.alpha = default_alpha(k);
            }
        }
        if let Some(alpha) = overrides.alpha {
            params.alpha = alpha;
        }
        if let Some(beta) = overrides.beta {
            params.beta = beta;
        }
        if let Some(iterations) = overrides.iterations {
            params.set_iterations(iterations);
        }
        if let Some(burn_in) = overrides.burn_in {
            params.burn_in = burn_in;
        }
        if let Some(seed) = overrides.seed {
            params.seed = seed;
        }
        params.optimize_interval = overrides.optimize_interval;
        params.validate()?;
        Ok(params)
    }

    /// Corpus options derived from this configuration.
    pub fn corpus_options(&self) -> CorpusOptions {
        CorpusOptions {
            min_doc_freq: self.min_doc_freq,
            max_doc_ratio: self.max_doc_ratio,
            ..CorpusOptions::default()
        }
    }
}

/// Parse an optional variable. Unset or empty means `None`.
fn parse_value<T>((name, raw): (String, Option<String>)) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        _ => Ok(None),
    }
}
