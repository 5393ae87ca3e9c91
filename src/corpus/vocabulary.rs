// Vocabulary: a bijection between word strings and dense integer ids.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Maps words to ids `0..len()` in first-seen order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vocabulary {
    words: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vocabulary from an ordered word list (ids follow list order).
    /// Duplicate words keep their first id.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self::new();
        for word in words {
            vocab.intern(word);
        }
        vocab
    }

    /// Return the id for `word`, assigning the next free id if it is new.
    pub fn intern(&mut self, word: impl Into<String>) -> usize {
        let word = word.into();
        if let Some(&id) = self.index.get(&word) {
            return id;
        }
        let id = self.words.len();
        self.index.insert(word.clone(), id);
        self.words.push(word);
        id
    }

    pub fn id_of(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    pub fn word_of(&self, id: usize) -> Option<&str> {
        self.words.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// All words in id order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Rebuild the lookup index. Needed after deserialization, since only
    /// the word list is persisted.
    pub fn rebuild_index(&mut self) {
        self.index = self
            .words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_stable() {
        let mut vocab = Vocabulary::new();
        assert_eq!(vocab.intern("topic"), 0);
        assert_eq!(vocab.intern("model"), 1);
        assert_eq!(vocab.intern("topic"), 0);
        assert_eq!(vocab.len(), 2);
    }

    #[test]
    fn test_bijection() {
        let vocab = Vocabulary::from_words(["alpha", "beta", "gamma", "beta"]);
        assert_eq!(vocab.len(), 3);
        for id in 0..vocab.len() {
            let word = vocab.word_of(id).unwrap();
            assert_eq!(vocab.id_of(word), Some(id));
        }
        assert_eq!(vocab.word_of(3), None);
        assert_eq!(vocab.id_of("delta"), None);
    }

    #[test]
    fn test_json_roundtrip_rebuilds_index() {
        let vocab = Vocabulary::from_words(["alpha", "beta"]);
        let json = serde_json::to_string(&vocab).unwrap();
        let mut loaded: Vocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.id_of("beta"), None);
        loaded.rebuild_index();
        assert_eq!(loaded.id_of("beta"), Some(1));
    }
}
