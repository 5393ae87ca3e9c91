// Text tokenization for bag-of-words modeling.
//
// Text is lowercased, URLs are stripped, and the remainder is split into
// runs of Unicode letters and digits (internal apostrophes and hyphens are
// kept, so "don't", "topic-model" and "résumé" survive as single tokens). English stop words from the
// `stop-words` crate, purely numeric tokens and very short tokens are dropped.

use std::collections::HashSet;

use anyhow::{Context, Result};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use stop_words::{get, LANGUAGE};

/// Knobs for the tokenizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenizerOptions {
    /// Tokens shorter than this (in characters) are dropped
    pub min_token_len: usize,
    /// Remove English stop words
    pub remove_stop_words: bool,
    /// Extra words to drop in addition to the stop-word list
    pub extra_stop_words: Vec<String>,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            min_token_len: 3,
            remove_stop_words: true,
            extra_stop_words: Vec::new(),
        }
    }
}

/// A compiled tokenizer. Build once, reuse across documents.
pub struct Tokenizer {
    url_re: Regex,
    stop_words: HashSet<String>,
    min_token_len: usize,
}

impl Tokenizer {
    pub fn new(options: &TokenizerOptions) -> Result<Self> {
        let url_re = Regex::new(r"https?://\S+").context("Failed to compile URL pattern")?;

        let mut stop_words: HashSet<String> = if options.remove_stop_words {
            get(LANGUAGE::English).into_iter().collect()
        } else {
            HashSet::new()
        };
        stop_words.extend(options.extra_stop_words.iter().map(|w| w.to_lowercase()));

        Ok(Self {
            url_re,
            stop_words,
            min_token_len: options.min_token_len,
        })
    }

    /// Split `text` into modeling tokens.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        let without_urls = self.url_re.replace_all(&lower, " ");

        split_words(&without_urls)
            .into_iter()
            .filter(|t| t.chars().count() >= self.min_token_len)
            .filter(|t| !t.chars().all(char::is_numeric))
            .filter(|t| !self.stop_words.contains(*t))
            .map(str::to_string)
            .collect()
    }
}

/// Runs of alphanumeric characters. An apostrophe or hyphen joins two runs
/// only when it sits between alphanumerics on both sides.
fn split_words(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut words = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].1.is_alphanumeric() {
            i += 1;
            continue;
        }
        let start = chars[i].0;
        let mut j = i + 1;
        while j < chars.len() {
            let c = chars[j].1;
            let joins = matches!(c, '\'' | '-')
                && chars.get(j + 1).is_some_and(|&(_, next)| next.is_alphanumeric());
            if c.is_alphanumeric() || joins {
                j += 1;
            } else {
                break;
            }
        }
        let end = chars.get(j).map_or(text.len(), |&(offset, _)| offset);
        words.push(&text[start..end]);
        i = j;
    }
    words
}

/// One-shot tokenization with the given options.
///
/// Compiles a fresh tokenizer on every call. Use [`Tokenizer`] directly when
/// processing many documents.
pub fn tokenize(text: &str, options: &TokenizerOptions) -> Result<Vec<String>> {
    Ok(Tokenizer::new(options)?.tokenize(text))
}
