// Unit tests for topic summaries and similarity measures.
//
// Tests isolated pure functions on hand-built models: summarize ordering
// and labels, distribution distances, document ranking, and topic alignment.

use lda::corpus::{TokenizerOptions, Vocabulary};
use lda::model::{LdaParams, TrainedModel};
use lda::topics::similarity::{
    align_topics, cosine_similarity, hellinger_distance, jaccard_from_weights,
    jensen_shannon_divergence, most_similar_documents, weighted_jaccard,
};
use lda::topics::summary::{summarize, TopicSummary};

fn model(phi: Vec<Vec<f64>>, theta: Vec<Vec<f64>>) -> TrainedModel {
    let num_topics = phi.len();
    let doc_labels = (0..theta.len()).map(|i| format!("doc-{i}")).collect();
    TrainedModel {
        params: LdaParams::with_topics(num_topics),
        alpha: 0.1,
        vocabulary: Vocabulary::from_words(["galaxy", "quasar", "enzyme", "protein"]),
        tokenizer_options: TokenizerOptions::default(),
        phi,
        theta,
        doc_labels,
        topic_token_counts: vec![5; num_topics],
        log_likelihoods: vec![],
    }
}

fn space_bio_model() -> TrainedModel {
    model(
        vec![vec![0.45, 0.45, 0.05, 0.05], vec![0.05, 0.05, 0.45, 0.45]],
        vec![
            vec![0.95, 0.05],
            vec![0.05, 0.95],
            vec![0.90, 0.10],
            vec![0.50, 0.50],
        ],
    )
}

// ============================================================
// summarize
// ============================================================

#[test]
fn summarize_equal_weights_keep_topic_order() {
    let summaries = summarize(&space_bio_model(), 2);
    let ids: Vec<usize> = summaries.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![0, 1]);
    assert!((summaries[0].weight - 0.5).abs() < 1e-12);
}

#[test]
fn summarize_top_n_larger_than_vocabulary() {
    let summaries = summarize(&space_bio_model(), 50);
    assert!(summaries.iter().all(|s| s.top_words.len() == 4));
}

#[test]
fn summarize_label_uses_at_most_three_words() {
    let summaries = summarize(&space_bio_model(), 10);
    for summary in &summaries {
        assert_eq!(summary.label.split(" / ").count(), 3);
    }
}

#[test]
fn summarize_zero_words_gives_empty_label() {
    let summaries = summarize(&space_bio_model(), 0);
    assert!(summaries.iter().all(|s| s.label.is_empty() && s.top_words.is_empty()));
}

// ============================================================
// Distribution measures
// ============================================================

#[test]
fn hellinger_is_symmetric() {
    let p = [0.7, 0.2, 0.1];
    let q = [0.1, 0.3, 0.6];
    let pq = hellinger_distance(&p, &q).unwrap();
    let qp = hellinger_distance(&q, &p).unwrap();
    assert!((pq - qp).abs() < 1e-12);
    assert!(pq > 0.0 && pq < 1.0);
}

#[test]
fn jensen_shannon_handles_zero_entries() {
    let p = [0.5, 0.5, 0.0];
    let q = [0.0, 0.5, 0.5];
    let js = jensen_shannon_divergence(&p, &q).unwrap();
    assert!(js.is_finite());
    assert!((js - 0.5).abs() < 1e-12, "got {js}");
}

#[test]
fn cosine_of_zero_vector_is_zero() {
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).unwrap(), 0.0);
}

#[test]
fn jaccard_from_weights_disjoint() {
    let a = [("galaxy".to_string(), 0.5)].into_iter().collect();
    let b = [("enzyme".to_string(), 0.5)].into_iter().collect();
    assert_eq!(jaccard_from_weights(&a, &b), 0.0);
}

#[test]
fn jaccard_across_models() {
    let a = TopicSummary {
        id: 0,
        label: "galaxy".to_string(),
        top_words: vec![("galaxy".to_string(), 0.4), ("quasar".to_string(), 0.4)],
        weight: 0.5,
    };
    let b = TopicSummary {
        id: 3,
        label: "galaxy".to_string(),
        top_words: vec![("galaxy".to_string(), 0.4), ("comet".to_string(), 0.4)],
        weight: 0.2,
    };
    // min sum 0.4, max sum 1.2
    assert!((weighted_jaccard(&a, &b) - 1.0 / 3.0).abs() < 1e-12);
}

// ============================================================
// Document ranking and topic alignment
// ============================================================

#[test]
fn most_similar_documents_ranks_same_theme_first() {
    let model = space_bio_model();
    let similar = most_similar_documents(&model, 0, 3).unwrap();
    assert_eq!(similar.len(), 3);
    assert_eq!(similar[0].0, 2);
    assert_eq!(similar[2].0, 1);
    assert!(similar.iter().all(|(i, _)| *i != 0));
}

#[test]
fn most_similar_documents_out_of_range() {
    assert!(most_similar_documents(&space_bio_model(), 99, 3).is_err());
}

#[test]
fn align_topics_handles_label_switching() {
    let a = space_bio_model();
    let mut b = space_bio_model();
    b.phi.reverse();
    let pairs = align_topics(&a, &b).unwrap();
    assert_eq!(pairs[0].0, 0);
    assert_eq!(pairs[0].1, 1);
    assert_eq!(pairs[1].1, 0);
    assert!(pairs.iter().all(|&(_, _, d)| d < 1e-6));
}

#[test]
fn align_topics_rejects_different_vocabularies() {
    let a = space_bio_model();
    let mut b = space_bio_model();
    b.vocabulary = Vocabulary::from_words(["one", "two", "three", "four"]);
    assert!(align_topics(&a, &b).is_err());
}
