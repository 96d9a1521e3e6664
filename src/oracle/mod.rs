//! Capability interfaces for the external oracles the pipeline consults,
//! and file-backed adapters for each of them.
//!
//! The pipeline only ever sees the traits. Adapters are constructed and
//! owned by the caller and lent to the simplifier for its lifetime.

pub mod arpa;
pub mod tagger;
pub mod vectors;

pub use arpa::ArpaLanguageModel;
pub use tagger::LexiconTagger;
pub use vectors::WordVectors;

/// Nearest-neighbour lookup over an embedding vocabulary.
pub trait EmbeddingOracle {
    /// Up to `topn` neighbours of `word`, most similar first, never
    /// including `word` itself. `None` when `word` is out of vocabulary.
    fn nearest(&self, word: &str, topn: usize) -> Option<Vec<(String, f64)>>;

    /// Similarity between two words; words outside the vocabulary score
    /// lower than any in-vocabulary pair.
    fn similarity(&self, a: &str, b: &str) -> f64;

    fn contains(&self, word: &str) -> bool;
}

/// Log-likelihood of a whitespace-separated token sequence.
pub trait LanguageModel {
    fn score(&self, text: &str, sentence_start: bool, sentence_end: bool) -> f64;
}

/// Part-of-speech tagging, optionally taking left context into account.
pub trait PosTagger {
    fn tag(&self, word: &str, context: Option<&str>) -> String;
}
