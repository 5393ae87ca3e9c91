// Corpus construction: turning raw text into bag-of-words documents.
//
// A corpus is a list of documents (sequences of vocabulary ids) plus the
// vocabulary that maps ids back to words. Documents that end up with no
// tokens after tokenization or pruning are dropped, never kept empty.

pub mod tokenize;
pub mod vocabulary;

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use tokenize::{Tokenizer, TokenizerOptions};
pub use vocabulary::Vocabulary;

/// A single document as a sequence of vocabulary ids, in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Human-readable name (file stem or `line-N`)
    pub label: String,
    pub words: Vec<usize>,
}

impl Document {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// How to turn raw text into a corpus.
#[derive(Debug, Clone)]
pub struct CorpusOptions {
    pub tokenizer: TokenizerOptions,
    /// Drop words that appear in fewer than this many documents
    pub min_doc_freq: usize,
    /// Drop words that appear in more than this share of documents (0.0-1.0)
    pub max_doc_ratio: f64,
}

impl Default for CorpusOptions {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerOptions::default(),
            min_doc_freq: 1,
            max_doc_ratio: 1.0,
        }
    }
}

/// A tokenized document collection with its vocabulary.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub documents: Vec<Document>,
    pub vocabulary: Vocabulary,
    pub tokenizer_options: TokenizerOptions,
}

impl Corpus {
    /// Build a corpus from `(label, text)` pairs.
    ///
    /// Fails if no document has any token left after tokenization and pruning.
    pub fn from_texts<I, L, T>(texts: I, options: &CorpusOptions) -> Result<Self>
    where
        I: IntoIterator<Item = (L, T)>,
        L: Into<String>,
        T: AsRef<str>,
    {
        let tokenizer = Tokenizer::new(&options.tokenizer)?;
        let mut vocabulary = Vocabulary::new();
        let mut documents = Vec::new();
        let mut dropped = 0usize;

        for (label, text) in texts {
            let words: Vec<usize> = tokenizer
                .tokenize(text.as_ref())
                .into_iter()
                .map(|token| vocabulary.intern(token))
                .collect();

            if words.is_empty() {
                dropped += 1;
                continue;
            }
            documents.push(Document {
                label: label.into(),
                words,
            });
        }

        if dropped > 0 {
            debug!(dropped, "Skipped documents with no usable tokens");
        }

        if documents.is_empty() {
            anyhow::bail!(
                "No documents contained any usable words; texts may be empty or made only of stop words"
            );
        }

        let mut corpus = Self {
            documents,
            vocabulary,
            tokenizer_options: options.tokenizer.clone(),
        };

        if options.min_doc_freq > 1 || options.max_doc_ratio < 1.0 {
            corpus.prune(options.min_doc_freq, options.max_doc_ratio)?;
        }

        info!(
            documents = corpus.documents.len(),
            vocabulary = corpus.vocabulary.len(),
            tokens = corpus.token_count(),
            "Built corpus"
        );

        Ok(corpus)
    }

    /// Load a corpus from disk.
    ///
    /// A directory yields one document per `*.txt` / `*.md` file (sorted by
    /// file name, labelled by file stem). A regular file yields one document
    /// per non-blank line, labelled `line-N`.
    pub fn load_path(path: impl AsRef<Path>, options: &CorpusOptions) -> Result<Self> {
        let texts = read_texts(path.as_ref())?;
        Self::from_texts(texts, options)
    }

    /// Remove rare and ubiquitous words, then re-pack ids.
    ///
    /// Word order in the new vocabulary follows the old id order. Documents
    /// left empty are dropped.
    pub fn prune(&mut self, min_doc_freq: usize, max_doc_ratio: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&max_doc_ratio) {
            anyhow::bail!("max_doc_ratio must be between 0.0 and 1.0, got {max_doc_ratio}");
        }

        let doc_freq = self.document_frequencies();
        let max_docs = max_doc_ratio * self.documents.len() as f64;

        let mut remap: Vec<Option<usize>> = vec![None; self.vocabulary.len()];
        let mut vocabulary = Vocabulary::new();
        for (old_id, word) in self.vocabulary.words().iter().enumerate() {
            let df = doc_freq[old_id];
            if df >= min_doc_freq && (df as f64) <= max_docs {
                remap[old_id] = Some(vocabulary.intern(word.clone()));
            }
        }

        let removed_words = self.vocabulary.len() - vocabulary.len();
        let before_docs = self.documents.len();

        let documents: Vec<Document> = self
            .documents
            .drain(..)
            .filter_map(|doc| {
                let words: Vec<usize> = doc.words.iter().filter_map(|&w| remap[w]).collect();
                (!words.is_empty()).then_some(Document {
                    label: doc.label,
                    words,
                })
            })
            .collect();

        if documents.is_empty() || vocabulary.is_empty() {
            anyhow::bail!(
                "Pruning (min_doc_freq={min_doc_freq}, max_doc_ratio={max_doc_ratio}) removed every word"
            );
        }

        info!(
            removed_words,
            removed_documents = before_docs - documents.len(),
            "Pruned vocabulary"
        );

        self.documents = documents;
        self.vocabulary = vocabulary;
        Ok(())
    }

    /// Number of documents each word appears in, indexed by word id.
    pub fn document_frequencies(&self) -> Vec<usize> {
        let mut freq = vec![0usize; self.vocabulary.len()];
        for doc in &self.documents {
            let unique: HashSet<usize> = doc.words.iter().copied().collect();
            for w in unique {
                freq[w] += 1;
            }
        }
        freq
    }

    /// Total number of tokens across all documents.
    pub fn token_count(&self) -> usize {
        self.documents.iter().map(Document::len).sum()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Map new text onto this corpus's vocabulary. Unknown words are skipped.
    pub fn encode(&self, text: &str) -> Result<Vec<usize>> {
        let tokenizer = Tokenizer::new(&self.tokenizer_options)?;
        Ok(encode_with(&tokenizer, &self.vocabulary, text))
    }
}

/// Tokenize `text` and keep the tokens `vocabulary` knows about.
pub fn encode_with(tokenizer: &Tokenizer, vocabulary: &Vocabulary, text: &str) -> Vec<usize> {
    tokenizer
        .tokenize(text)
        .iter()
        .filter_map(|t| vocabulary.id_of(t))
        .collect()
}

/// Read `(label, text)` pairs from a directory or a line-per-document file.
pub fn read_texts(path: &Path) -> Result<Vec<(String, String)>> {
    if path.is_dir() {
        let mut files: Vec<_> = std::fs::read_dir(path)
            .with_context(|| format!("Failed to read directory {}", path.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .filter(|p| {
                matches!(
                    p.extension().and_then(|e| e.to_str()),
                    Some("txt") | Some("md")
                )
            })
            .collect();
        files.sort();

        if files.is_empty() {
            anyhow::bail!("No .txt or .md files found in {}", path.display());
        }

        files
            .into_iter()
            .map(|file| -> Result<(String, String)> {
                let text = std::fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                let label = file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file.display().to_string());
                Ok((label, text))
            })
            .collect()
    } else {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| (format!("line-{}", i + 1), line.to_string()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts() -> Vec<(String, String)> {
        vec![
            ("a".to_string(), "galaxy quasar galaxy nebula".to_string()),
            ("b".to_string(), "galaxy nebula telescope".to_string()),
            ("c".to_string(), "galaxy protein enzyme".to_string()),
        ]
    }

    #[test]
    fn test_from_texts_ids_in_range() {
        let corpus = Corpus::from_texts(texts(), &CorpusOptions::default()).unwrap();
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.token_count(), 10);
        for doc in &corpus.documents {
            assert!(doc.words.iter().all(|&w| w < corpus.vocabulary.len()));
        }
    }

    #[test]
    fn test_empty_documents_are_dropped() {
        let input = vec![("x", "the and of"), ("y", "galaxy telescope")];
        let corpus = Corpus::from_texts(input, &CorpusOptions::default()).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.documents[0].label, "y");
    }

    #[test]
    fn test_all_empty_fails() {
        let input = vec![("x", "the and of"), ("y", "")];
        assert!(Corpus::from_texts(input, &CorpusOptions::default()).is_err());
    }

    #[test]
    fn test_prune_repacks_ids() {
        let mut corpus = Corpus::from_texts(texts(), &CorpusOptions::default()).unwrap();
        // galaxy is in every document; quasar/telescope/protein/enzyme in one
        corpus.prune(2, 0.9).unwrap();
        assert_eq!(corpus.vocabulary.words(), &["nebula".to_string()]);
        assert_eq!(corpus.len(), 2);
        for doc in &corpus.documents {
            assert!(doc.words.iter().all(|&w| w == 0));
        }
    }

    #[test]
    fn test_prune_everything_fails() {
        let mut corpus = Corpus::from_texts(texts(), &CorpusOptions::default()).unwrap();
        assert!(corpus.prune(10, 1.0).is_err());
    }

    #[test]
    fn test_document_frequencies() {
        let corpus = Corpus::from_texts(texts(), &CorpusOptions::default()).unwrap();
        let df = corpus.document_frequencies();
        let galaxy = corpus.vocabulary.id_of("galaxy").unwrap();
        assert_eq!(df[galaxy], 3);
    }

    #[test]
    fn test_encode_skips_unknown_words() {
        let corpus = Corpus::from_texts(texts(), &CorpusOptions::default()).unwrap();
        let ids = corpus.encode("galaxy spaceship enzyme").unwrap();
        assert_eq!(ids.len(), 2);
    }
}
