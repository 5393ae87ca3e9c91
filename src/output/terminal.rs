// Colored terminal output for models, documents, and inference results.
//
// main.rs delegates all display formatting here.

use colored::Colorize;

use crate::db::models::ModelRecord;
use crate::manifest::PackageManifest;
use crate::model::trained::argmax;
use crate::model::TrainedModel;
use crate::pipeline::infer::InferredDocument;
use crate::pipeline::train::TrainingReport;
use crate::topics::coherence::{mean_coherence, COHERENCE_TOP_WORDS};

/// Display the outcome of a training run.
pub fn display_training_report(report: &TrainingReport) {
    let params = &report.model.params;
    println!("\n{}", format!("=== Trained '{}' ===", report.name).bold());
    println!(
        "  Corpus: {} documents, {} tokens, {} distinct words",
        report.documents,
        report.tokens,
        report.model.vocab_size()
    );
    println!(
        "  Topics: {}  alpha: {:.4}  beta: {:.4}  sweeps: {}",
        params.num_topics, report.model.alpha, params.beta, params.iterations
    );
    if let Some(ll) = report.model.final_log_likelihood() {
        println!("  Log-likelihood: {:.1}", ll);
    }
    println!("  Perplexity: {}", format!("{:.1}", report.perplexity).bold());
    if let Some(mean) = mean_coherence(&report.coherence) {
        println!(
            "  Coherence (UMass, top {COHERENCE_TOP_WORDS} words): {mean:.3} mean over {} topics",
            report.coherence.iter().flatten().count()
        );
    }
    println!("  Time: {:.1}s", report.elapsed.as_secs_f64());
}

/// Display each training document's dominant topic.
pub fn display_documents(model: &TrainedModel, limit: usize) {
    println!(
        "\n{}",
        format!("=== Document topics ({} documents) ===", model.num_documents()).bold()
    );
    println!();
    println!(
        "  {:>5}  {:<32} {:>5}  {:>6}",
        "Index".dimmed(),
        "Document".dimmed(),
        "Topic".dimmed(),
        "Share".dimmed(),
    );
    println!("  {}", "-".repeat(56).dimmed());

    for (d, label) in model.doc_labels.iter().enumerate().take(limit) {
        let Some((k, p)) = model.dominant_topic(d) else {
            continue;
        };
        println!(
            "  {:>5}  {:<32} {:>5}  {:>6.2}  {}",
            d,
            super::truncate_chars(label, 30),
            format!("#{k}"),
            p,
            super::probability_bar(p, 20).dimmed()
        );
    }

    if model.num_documents() > limit {
        println!(
            "\n  {}",
            format!("... {} more (use --limit)", model.num_documents() - limit).dimmed()
        );
    }
}

/// Display inferred topic mixtures, with the top words of each dominant topic.
pub fn display_inferred(model: &TrainedModel, results: &[InferredDocument]) {
    println!(
        "\n{}",
        format!("=== Inferred topics ({} documents) ===", results.len()).bold()
    );

    for result in results {
        println!();
        if result.known_tokens == 0 {
            println!(
                "  {}  {}",
                result.label.bold(),
                "no known words, uniform mixture".yellow()
            );
            continue;
        }
        println!(
            "  {}  ({} known tokens)",
            result.label.bold(),
            result.known_tokens
        );

        let mut ranked: Vec<(usize, f64)> = result.topics.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        for (k, p) in ranked.into_iter().take(3) {
            let words: Vec<String> = model.top_words(k, 5).into_iter().map(|(w, _)| w).collect();
            println!(
                "    #{:<3} {:>5.2} {}  {}",
                k,
                p,
                super::probability_bar(p, 20),
                words.join(", ").dimmed()
            );
        }
    }
}

/// Display documents most similar to `doc`.
pub fn display_similar(model: &TrainedModel, doc: usize, similar: &[(usize, f64)]) {
    let label = model.doc_labels.get(doc).map(String::as_str).unwrap_or("?");
    println!(
        "\n{}",
        format!("=== Documents similar to [{doc}] {label} ===").bold()
    );
    println!();
    for (i, (other, similarity)) in similar.iter().enumerate() {
        let other_label = model.doc_labels.get(*other).map(String::as_str).unwrap_or("?");
        let topic = model
            .document_topics(*other)
            .and_then(argmax)
            .map(|(k, _)| format!("#{k}"))
            .unwrap_or_default();
        println!(
            "  {:>3}. [{:>4}] {:<32} {:.3}  {}",
            i + 1,
            other,
            super::truncate_chars(other_label, 30),
            similarity,
            topic.dimmed()
        );
    }
}

/// Display a table of stored models.
pub fn display_model_list(records: &[ModelRecord], last_trained: Option<&str>) {
    if records.is_empty() {
        println!("No models stored yet. Run `lda train <PATH>` first.");
        return;
    }

    println!("\n{}", format!("=== Models ({}) ===", records.len()).bold());
    println!();
    println!(
        "  {:<24} {:>6} {:>7} {:>6} {:>10}  {}",
        "Name".dimmed(),
        "Topics".dimmed(),
        "Vocab".dimmed(),
        "Docs".dimmed(),
        "Perplexity".dimmed(),
        "Updated".dimmed(),
    );
    println!("  {}", "-".repeat(78).dimmed());

    for record in records {
        let marker = if Some(record.name.as_str()) == last_trained {
            "*".green().to_string()
        } else {
            " ".to_string()
        };
        let ppl = record
            .perplexity
            .map(|p| format!("{p:.1}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} {:<24} {:>6} {:>7} {:>6} {:>10}  {}",
            marker,
            super::truncate_chars(&record.name, 22),
            record.num_topics,
            record.vocab_size,
            record.doc_count,
            ppl,
            record.updated_at.dimmed()
        );
    }
}

/// Display the package manifest.
pub fn display_manifest(manifest: &PackageManifest) {
    println!(
        "{} {}",
        manifest.name.bold(),
        manifest.version.as_str().green()
    );
    println!("  {}", manifest.description);
    if !manifest.authors.is_empty() {
        println!("  Authors: {}", manifest.authors.join(", "));
    }
    println!("  License: {}", manifest.license);
    if !manifest.url.is_empty() {
        println!("  Homepage: {}", manifest.url);
    }
    for classifier in &manifest.classifiers {
        println!("  {}", classifier.dimmed());
    }
}
