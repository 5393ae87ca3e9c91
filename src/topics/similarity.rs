// Similarity measures over topic distributions.
//
// Documents are compared through their topic mixtures (theta rows) and
// topics through their word distributions or top-word weights:
//
//   Hellinger distance      H(p, q) = sqrt(1 - sum sqrt(p_i q_i))       in [0, 1]
//   Jensen-Shannon (base 2) JS(p, q) = (KL(p || m) + KL(q || m)) / 2    in [0, 1]
//   Weighted Jaccard        sum min(a, b) / sum max(a, b)               in [0, 1]

use std::collections::{HashMap, HashSet};

use anyhow::Result;

use super::summary::TopicSummary;
use crate::model::TrainedModel;

/// Hellinger distance between two distributions of equal length.
pub fn hellinger_distance(p: &[f64], q: &[f64]) -> Result<f64> {
    check_lengths(p, q)?;
    let bc: f64 = p.iter().zip(q).map(|(a, b)| (a * b).sqrt()).sum();
    Ok((1.0 - bc).max(0.0).sqrt())
}

/// Jensen-Shannon divergence (log base 2) between two distributions.
pub fn jensen_shannon_divergence(p: &[f64], q: &[f64]) -> Result<f64> {
    check_lengths(p, q)?;
    let mut js = 0.0;
    for (&a, &b) in p.iter().zip(q) {
        let m = 0.5 * (a + b);
        if a > 0.0 {
            js += 0.5 * a * (a / m).log2();
        }
        if b > 0.0 {
            js += 0.5 * b * (b / m).log2();
        }
    }
    Ok(js.clamp(0.0, 1.0))
}

/// Cosine similarity between two vectors. Zero vectors give 0.0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    check_lengths(a, b)?;
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a * norm_b))
}

/// Weighted Jaccard similarity between the top words of two topics.
///
/// Topics may come from different models, since words are matched by string.
pub fn weighted_jaccard(topic_a: &TopicSummary, topic_b: &TopicSummary) -> f64 {
    jaccard_from_weights(&topic_a.word_weights(), &topic_b.word_weights())
}

/// Weighted Jaccard from raw word weight maps.
pub fn jaccard_from_weights(
    weights_a: &HashMap<String, f64>,
    weights_b: &HashMap<String, f64>,
) -> f64 {
    let all_keys: HashSet<&String> = weights_a.keys().chain(weights_b.keys()).collect();

    if all_keys.is_empty() {
        return 0.0;
    }

    let mut min_sum = 0.0;
    let mut max_sum = 0.0;

    for key in all_keys {
        let a = weights_a.get(key).copied().unwrap_or(0.0);
        let b = weights_b.get(key).copied().unwrap_or(0.0);
        min_sum += a.min(b);
        max_sum += a.max(b);
    }

    if max_sum == 0.0 {
        0.0
    } else {
        min_sum / max_sum
    }
}

/// Rank the other training documents by similarity (1 - JS divergence) of
/// their topic mixtures to document `doc`. Returns `(index, similarity)`.
pub fn most_similar_documents(
    model: &TrainedModel,
    doc: usize,
    count: usize,
) -> Result<Vec<(usize, f64)>> {
    let Some(target) = model.document_topics(doc) else {
        anyhow::bail!(
            "Document index {doc} is out of range (model has {} documents)",
            model.num_documents()
        );
    };

    let mut scored = Vec::with_capacity(model.num_documents());
    for (i, other) in model.theta.iter().enumerate() {
        if i == doc {
            continue;
        }
        scored.push((i, 1.0 - jensen_shannon_divergence(target, other)?));
    }

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(count);
    Ok(scored)
}

/// Pair each topic of `a` with its closest topic in `b` by Hellinger
/// distance on phi rows. Both models must share a vocabulary layout.
pub fn align_topics(a: &TrainedModel, b: &TrainedModel) -> Result<Vec<(usize, usize, f64)>> {
    if a.vocabulary.words() != b.vocabulary.words() {
        anyhow::bail!("Models were trained on different vocabularies");
    }

    let mut pairs = Vec::with_capacity(a.num_topics());
    for (i, row_a) in a.phi.iter().enumerate() {
        let mut best: Option<(usize, f64)> = None;
        for (j, row_b) in b.phi.iter().enumerate() {
            let d = hellinger_distance(row_a, row_b)?;
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((j, d));
            }
        }
        if let Some((j, d)) = best {
            pairs.push((i, j, d));
        }
    }
    Ok(pairs)
}

fn check_lengths(p: &[f64], q: &[f64]) -> Result<()> {
    if p.len() != q.len() {
        anyhow::bail!("Distributions differ in length ({} vs {})", p.len(), q.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(words: &[(&str, f64)]) -> TopicSummary {
        TopicSummary {
            id: 0,
            label: String::new(),
            top_words: words.iter().map(|(w, p)| (w.to_string(), *p)).collect(),
            weight: 1.0,
        }
    }

    #[test]
    fn test_identical_distributions() {
        let p = [0.2, 0.3, 0.5];
        assert!(hellinger_distance(&p, &p).unwrap() < 1e-7);
        assert!(jensen_shannon_divergence(&p, &p).unwrap() < 1e-12);
        assert!((cosine_similarity(&p, &p).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_distributions() {
        let p = [1.0, 0.0];
        let q = [0.0, 1.0];
        assert!((hellinger_distance(&p, &q).unwrap() - 1.0).abs() < 1e-12);
        assert!((jensen_shannon_divergence(&p, &q).unwrap() - 1.0).abs() < 1e-12);
        assert!(cosine_similarity(&p, &q).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch_fails() {
        assert!(hellinger_distance(&[1.0], &[0.5, 0.5]).is_err());
        assert!(jensen_shannon_divergence(&[1.0], &[0.5, 0.5]).is_err());
    }

    #[test]
    fn test_jaccard_partial_overlap() {
        let a = summary(&[("galaxy", 0.3), ("quasar", 0.2), ("nebula", 0.15)]);
        let b = summary(&[("galaxy", 0.2), ("comet", 0.3), ("nebula", 0.1)]);
        let score = weighted_jaccard(&a, &b);
        assert!(score > 0.0 && score < 1.0);
        assert!((weighted_jaccard(&a, &a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_jaccard_empty() {
        let empty = summary(&[]);
        assert_eq!(weighted_jaccard(&empty, &empty), 0.0);
    }
}
