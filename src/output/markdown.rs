// Markdown topic report.
//
// Produces a standalone document describing a fitted model: run settings,
// a topic table, and each topic's top words and most representative
// training documents.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::model::TrainedModel;
use crate::topics::summary::TopicSummary;

/// Representative documents listed per topic.
const DOCS_PER_TOPIC: usize = 5;

/// Render the report as a Markdown string.
pub fn render_report(
    model_name: &str,
    model: &TrainedModel,
    summaries: &[TopicSummary],
    perplexity: Option<f64>,
) -> String {
    let params = &model.params;
    let mut out = String::new();

    let _ = writeln!(out, "# Topic report: {model_name}\n");
    let _ = writeln!(
        out,
        "_Generated {}_\n",
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    );

    let _ = writeln!(out, "## Model\n");
    let _ = writeln!(out, "| Setting | Value |");
    let _ = writeln!(out, "|---|---|");
    let _ = writeln!(out, "| Topics | {} |", params.num_topics);
    let _ = writeln!(out, "| Documents | {} |", model.num_documents());
    let _ = writeln!(out, "| Vocabulary | {} |", model.vocab_size());
    let _ = writeln!(out, "| Tokens | {} |", model.token_count());
    let _ = writeln!(out, "| alpha | {:.4} |", model.alpha);
    let _ = writeln!(out, "| beta | {:.4} |", params.beta);
    let _ = writeln!(out, "| Sweeps | {} (burn-in {}) |", params.iterations, params.burn_in);
    let _ = writeln!(out, "| Seed | {} |", params.seed);
    if let Some(ll) = model.final_log_likelihood() {
        let _ = writeln!(out, "| Log-likelihood | {ll:.1} |");
    }
    if let Some(ppl) = perplexity {
        let _ = writeln!(out, "| Perplexity | {ppl:.1} |");
    }
    out.push('\n');

    let _ = writeln!(out, "## Topics\n");
    let _ = writeln!(out, "| # | Label | Weight |");
    let _ = writeln!(out, "|---|---|---|");
    for summary in summaries {
        let _ = writeln!(
            out,
            "| {} | {} | {:.3} |",
            summary.id,
            escape_cell(&summary.label),
            summary.weight
        );
    }
    out.push('\n');

    for summary in summaries {
        let _ = writeln!(out, "### Topic {}: {}\n", summary.id, summary.label);
        let words: Vec<String> = summary
            .top_words
            .iter()
            .map(|(w, p)| format!("`{w}` ({p:.3})"))
            .collect();
        let _ = writeln!(out, "**Top words:** {}\n", words.join(", "));

        let docs = representative_documents(model, summary.id, DOCS_PER_TOPIC);
        if !docs.is_empty() {
            let _ = writeln!(out, "**Representative documents:**\n");
            for (label, p) in docs {
                let _ = writeln!(out, "- {label} ({p:.2})");
            }
            out.push('\n');
        }
    }

    out
}

/// Write the report to `path`.
pub fn generate_report(
    path: &Path,
    model_name: &str,
    model: &TrainedModel,
    summaries: &[TopicSummary],
    perplexity: Option<f64>,
) -> Result<()> {
    let report = render_report(model_name, model, summaries, perplexity);
    std::fs::write(path, report)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

/// Training documents with the highest share of topic `k`.
fn representative_documents(model: &TrainedModel, k: usize, n: usize) -> Vec<(&str, f64)> {
    let mut docs: Vec<(&str, f64)> = model
        .theta
        .iter()
        .zip(&model.doc_labels)
        .filter_map(|(row, label)| row.get(k).map(|&p| (label.as_str(), p)))
        .collect();
    docs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    docs.truncate(n);
    docs
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{TokenizerOptions, Vocabulary};
    use crate::model::LdaParams;
    use crate::topics::summary::summarize;

    fn model() -> TrainedModel {
        TrainedModel {
            params: LdaParams::with_topics(2),
            alpha: 0.1,
            vocabulary: Vocabulary::from_words(["galaxy", "quasar", "enzyme", "protein"]),
            tokenizer_options: TokenizerOptions::default(),
            phi: vec![vec![0.45, 0.45, 0.05, 0.05], vec![0.05, 0.05, 0.45, 0.45]],
            theta: vec![vec![0.9, 0.1], vec![0.2, 0.8], vec![0.6, 0.4]],
            doc_labels: vec!["stars".into(), "cells".into(), "mixed".into()],
            topic_token_counts: vec![6, 4],
            log_likelihoods: vec![(100, -321.0)],
        }
    }

    #[test]
    fn test_report_contains_topics_and_documents() {
        let model = model();
        let summaries = summarize(&model, 3);
        let report = render_report("demo", &model, &summaries, Some(3.7));

        assert!(report.starts_with("# Topic report: demo"));
        assert!(report.contains("| Perplexity | 3.7 |"));
        assert!(report.contains("### Topic 0: galaxy / quasar / enzyme"));
        assert!(report.contains("- stars (0.90)"));
        assert!(report.contains("- cells (0.80)"));
    }

    #[test]
    fn test_representative_documents_ranked() {
        let model = model();
        let docs = representative_documents(&model, 0, 2);
        assert_eq!(docs, vec![("stars", 0.9), ("mixed", 0.6)]);
    }

    #[test]
    fn test_generate_report_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        let model = model();
        generate_report(&path, "demo", &model, &summarize(&model, 2), None).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("## Topics"));
        assert!(!written.contains("Perplexity"));
    }
}
