// File: src/core/generator.rs
use crate::core::types::distinct_candidates;
use crate::oracle::EmbeddingOracle;

/// Produces substitution candidates for a complex word.
pub trait Generator {
    fn generate(&self, word: &str) -> Vec<String>;
}

/// Candidates are the embedding oracle's nearest neighbours, in the
/// oracle's similarity order.
pub struct EmbeddingGenerator<'a> {
    oracle: &'a dyn EmbeddingOracle,
    topn: usize,
    lowercase: bool,
}

impl<'a> EmbeddingGenerator<'a> {
    pub fn new(oracle: &'a dyn EmbeddingOracle, topn: usize) -> Self {
        Self {
            oracle,
            topn,
            lowercase: true,
        }
    }

    /// Hierarchy-trained (Poincaré) vocabularies keep their original casing.
    pub fn lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    pub fn topn(&self) -> usize {
        self.topn
    }
}

impl Generator for EmbeddingGenerator<'_> {
    /// Out-of-vocabulary words yield no candidates.
    fn generate(&self, word: &str) -> Vec<String> {
        let Some(neighbours) = self.oracle.nearest(word, self.topn) else {
            return Vec::new();
        };
        let lowercase = self.lowercase;
        distinct_candidates(
            word,
            neighbours.into_iter().map(|(w, _)| if lowercase { w.to_lowercase() } else { w }),
        )
    }
}
