// Topic coherence (UMass): how often a topic's top words share documents.
//
//   C(t) = mean over pairs l < m of ln((D(w_l, w_m) + 1) / D(w_l))
//
// where w_l ranks above w_m in the topic and D counts training documents
// containing the word(s). Scores are at most around zero; values closer to
// zero read as more coherent.

use std::collections::HashSet;

use crate::corpus::Corpus;
use crate::model::TrainedModel;

/// Number of top words scored per topic by default.
pub const COHERENCE_TOP_WORDS: usize = 10;

/// UMass coherence of a ranked word list against `corpus`.
///
/// Words the corpus doesn't know are skipped. `None` when fewer than two
/// known words remain.
pub fn umass_coherence<S: AsRef<str>>(corpus: &Corpus, ranked_words: &[S]) -> Option<f64> {
    let ids: Vec<usize> = ranked_words
        .iter()
        .filter_map(|w| corpus.vocabulary.id_of(w.as_ref()))
        .collect();
    if ids.len() < 2 {
        return None;
    }

    let containing: Vec<HashSet<usize>> = ids
        .iter()
        .map(|&id| {
            corpus
                .documents
                .iter()
                .enumerate()
                .filter(|(_, doc)| doc.words.contains(&id))
                .map(|(d, _)| d)
                .collect()
        })
        .collect();

    let mut total = 0.0;
    let mut pairs = 0usize;
    for (l, docs_l) in containing.iter().enumerate() {
        if docs_l.is_empty() {
            continue;
        }
        for docs_m in containing.iter().skip(l + 1) {
            let both = docs_l.intersection(docs_m).count() as f64;
            total += ((both + 1.0) / docs_l.len() as f64).ln();
            pairs += 1;
        }
    }

    (pairs > 0).then(|| total / pairs as f64)
}

/// Coherence of every topic in `model`, scored on its top `top_n` words.
pub fn topic_coherence(model: &TrainedModel, corpus: &Corpus, top_n: usize) -> Vec<Option<f64>> {
    (0..model.num_topics())
        .map(|k| {
            let words: Vec<String> = model.top_words(k, top_n).into_iter().map(|(w, _)| w).collect();
            umass_coherence(corpus, &words)
        })
        .collect()
}

/// Mean over the topics that could be scored.
pub fn mean_coherence(scores: &[Option<f64>]) -> Option<f64> {
    let known: Vec<f64> = scores.iter().flatten().copied().collect();
    (!known.is_empty()).then(|| known.iter().sum::<f64>() / known.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusOptions;

    fn corpus() -> Corpus {
        let texts = vec![
            ("a", "galaxy quasar nebula"),
            ("b", "galaxy quasar telescope"),
            ("c", "protein enzyme genome"),
            ("d", "protein enzyme membrane"),
        ];
        Corpus::from_texts(texts, &CorpusOptions::default()).unwrap()
    }

    #[test]
    fn test_cooccurring_words_score_higher() {
        let corpus = corpus();
        let together = umass_coherence(&corpus, &["galaxy", "quasar"]).unwrap();
        let apart = umass_coherence(&corpus, &["galaxy", "protein"]).unwrap();
        assert!(together > apart, "{together} vs {apart}");
        // galaxy in 2 docs, both with quasar: ln(3 / 2)
        assert!((together - (1.5f64).ln()).abs() < 1e-12);
        // never together: ln(1 / 2)
        assert!((apart - (0.5f64).ln()).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_words_are_skipped() {
        let corpus = corpus();
        assert_eq!(umass_coherence(&corpus, &["galaxy", "spaceship"]), None);
        assert!(umass_coherence(&corpus, &["galaxy", "spaceship", "quasar"]).is_some());
    }

    #[test]
    fn test_mean_ignores_unscored_topics() {
        assert_eq!(mean_coherence(&[None, None]), None);
        let mean = mean_coherence(&[Some(-1.0), None, Some(-3.0)]).unwrap();
        assert!((mean + 2.0).abs() < 1e-12);
    }
}
