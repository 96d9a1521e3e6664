// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A dotted MeSH tree number such as `C05.116.198.579`.
pub type TaxonomyId = String;

/// Part-of-speech label as produced by the tagger oracle.
pub type PosTag = String;

/// Sentence-start marker prefixed to every beam hypothesis.
pub const SENTENCE_START: &str = "<s>";

/// A ranked substitution with the score the ranker assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub word: String,
    pub score: f64,
}

/// Candidate counts after each pipeline stage, for tracing a single word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    pub generated: usize,
    pub selected: usize,
    pub ranked: usize,
}

/// Result of running the word pipeline with tracing enabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordTrace {
    pub word: String,
    pub counts: StageCounts,
    pub candidates: Vec<String>,
}

/// Removes duplicates and the original word while keeping first-seen order.
pub fn distinct_candidates<I>(word: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen: HashSet<String> = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| !c.is_empty() && c != word)
        .filter(|c| seen.insert(c.clone()))
        .collect()
}

/// Multi-word expressions are joined with `_` in embedding vocabularies.
pub fn expand_mwe(candidate: &str) -> String {
    candidate.replace('_', " ")
}
