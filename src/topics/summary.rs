// TopicSummary: a human-readable view of one fitted topic.
//
// A summary is the topic's most probable words, a label built from the first
// few of them, and a weight giving the topic's share of the corpus tokens.

use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::model::TrainedModel;

/// A single topic, ready for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSummary {
    /// Topic index in the model
    pub id: usize,
    /// Human-readable label for this topic
    pub label: String,
    /// Most probable words with P(word | topic), highest first
    pub top_words: Vec<(String, f64)>,
    /// Share of training tokens assigned to this topic (0.0 to 1.0)
    pub weight: f64,
}

/// Summarize every topic of `model`, heaviest first.
pub fn summarize(model: &TrainedModel, top_n: usize) -> Vec<TopicSummary> {
    let weights = model.topic_weights();

    let mut summaries: Vec<TopicSummary> = (0..model.num_topics())
        .map(|k| {
            let top_words = model.top_words(k, top_n);
            TopicSummary {
                id: k,
                label: generate_topic_label(&top_words),
                top_words,
                weight: weights.get(k).copied().unwrap_or(0.0),
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.id.cmp(&b.id))
    });
    summaries
}

/// Join the first three words with " / ".
fn generate_topic_label(top_words: &[(String, f64)]) -> String {
    let label_words: Vec<&str> = top_words.iter().take(3).map(|(w, _)| w.as_str()).collect();
    label_words.join(" / ")
}

impl TopicSummary {
    /// Word -> probability map of the listed top words.
    pub fn word_weights(&self) -> std::collections::HashMap<String, f64> {
        self.top_words.iter().cloned().collect()
    }
}

/// Display topic summaries as a bar chart in the terminal.
pub fn display(summaries: &[TopicSummary], model_name: &str) {
    println!(
        "\n{}",
        format!("=== Topics in '{}' ({} topics) ===", model_name, summaries.len()).bold()
    );
    println!();

    let bar_width: usize = 20;
    // Scale bars against the heaviest topic so small models still read well
    let max_weight = summaries
        .iter()
        .map(|s| s.weight)
        .fold(0.0_f64, f64::max)
        .max(f64::EPSILON);

    for summary in summaries {
        let filled = ((summary.weight / max_weight) * bar_width as f64).round() as usize;
        let empty = bar_width.saturating_sub(filled);
        let bar = format!("[{}{}]", "=".repeat(filled), " ".repeat(empty));

        let colored_bar = if summary.weight >= 0.25 {
            bar.bright_green()
        } else if summary.weight >= 0.10 {
            bar.bright_yellow()
        } else {
            bar.bright_blue()
        };

        println!(
            "  #{:<3} {:<40} {} {:.2}",
            summary.id,
            summary.label.bold(),
            colored_bar,
            summary.weight
        );

        let words: Vec<String> = summary
            .top_words
            .iter()
            .map(|(w, p)| format!("{w} ({p:.3})"))
            .collect();
        println!("       Words: {}", words.join(", ").dimmed());
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{TokenizerOptions, Vocabulary};
    use crate::model::LdaParams;

    fn model() -> TrainedModel {
        TrainedModel {
            params: LdaParams::with_topics(2),
            alpha: 0.1,
            vocabulary: Vocabulary::from_words(["galaxy", "quasar", "nebula", "enzyme"]),
            tokenizer_options: TokenizerOptions::default(),
            phi: vec![vec![0.1, 0.1, 0.1, 0.7], vec![0.5, 0.3, 0.15, 0.05]],
            theta: vec![],
            doc_labels: vec![],
            topic_token_counts: vec![10, 30],
            log_likelihoods: vec![],
        }
    }

    #[test]
    fn test_summaries_sorted_by_weight() {
        let summaries = summarize(&model(), 3);
        assert_eq!(summaries[0].id, 1);
        assert!((summaries[0].weight - 0.75).abs() < 1e-12);
        assert_eq!(summaries[0].label, "galaxy / quasar / nebula");
        let total: f64 = summaries.iter().map(|s| s.weight).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_word_weights() {
        let summaries = summarize(&model(), 2);
        let enzyme_topic = summaries.iter().find(|s| s.id == 0).unwrap();
        let weights = enzyme_topic.word_weights();
        assert!((weights["enzyme"] - 0.7).abs() < 1e-12);
        assert_eq!(weights.len(), 2);
    }
}
