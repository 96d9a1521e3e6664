// File: src/core/ranker.rs
use crate::core::types::{expand_mwe, ScoredCandidate, SENTENCE_START};
use crate::oracle::{EmbeddingOracle, LanguageModel};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Orders selected candidates, best first.
pub trait Ranker {
    fn rank_scored(&self, word: &str, candidates: &[String], context: Option<&str>) -> Vec<ScoredCandidate>;

    fn rank(&self, word: &str, candidates: &[String], context: Option<&str>) -> Vec<String> {
        self.rank_scored(word, candidates, context)
            .into_iter()
            .map(|c| c.word)
            .collect()
    }
}

/// Ranking strategy as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankerKind {
    Similarity,
    PartialBeamSearch,
}

pub enum RankingStrategy<'a> {
    /// Descending embedding similarity to the complex word.
    Similarity { oracle: &'a dyn EmbeddingOracle },
    /// Language-model score of the left context followed by each candidate,
    /// keeping the best `beam_width`.
    PartialBeamSearch {
        lm: &'a dyn LanguageModel,
        beam_width: usize,
    },
}

impl RankingStrategy<'_> {
    pub fn kind(&self) -> RankerKind {
        match self {
            RankingStrategy::Similarity { .. } => RankerKind::Similarity,
            RankingStrategy::PartialBeamSearch { .. } => RankerKind::PartialBeamSearch,
        }
    }
}

impl Ranker for RankingStrategy<'_> {
    fn rank_scored(&self, word: &str, candidates: &[String], context: Option<&str>) -> Vec<ScoredCandidate> {
        match self {
            RankingStrategy::Similarity { oracle } => {
                let scored = candidates
                    .iter()
                    .map(|c| ScoredCandidate {
                        word: c.clone(),
                        score: oracle.similarity(c, word),
                    })
                    .collect();
                sort_descending(scored)
            }
            RankingStrategy::PartialBeamSearch { lm, beam_width } => {
                let start = Hypothesis::start(context);
                let expanded: Vec<Hypothesis> = candidates
                    .iter()
                    .filter(|c| !c.trim().is_empty())
                    .map(|c| start.extend(c))
                    .collect();
                prune(*lm, expanded, *beam_width)
                    .into_iter()
                    .map(|h| ScoredCandidate {
                        word: h.last,
                        score: h.score,
                    })
                    .collect()
            }
        }
    }
}

/// Stable descending sort; equal scores keep their input order.
fn sort_descending(mut scored: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored
}

/// A sentence prefix under construction. `last` is the token (or candidate)
/// appended most recently; `score` is assigned by [`prune`] and never
/// carried into the next expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis {
    pub text: String,
    pub last: String,
    pub score: f64,
}

impl Hypothesis {
    /// `<s>` alone, or `<s>` followed by the left context.
    pub fn start(context: Option<&str>) -> Self {
        let text = match context.map(str::trim).filter(|c| !c.is_empty()) {
            None => SENTENCE_START.to_string(),
            Some(c) if c.split_whitespace().next() == Some(SENTENCE_START) => c.to_string(),
            Some(c) => format!("{SENTENCE_START} {c}"),
        };
        Self {
            text,
            last: String::new(),
            score: 0.0,
        }
    }

    /// Appends `token` after a single space. Multi-word expressions are
    /// spelled out in the text but `last` keeps the token as given.
    pub fn extend(&self, token: &str) -> Self {
        let mut text = String::with_capacity(self.text.len() + token.len() + 1);
        text.push_str(&self.text);
        text.push(' ');
        text.push_str(&expand_mwe(token));
        Self {
            text,
            last: token.to_string(),
            score: 0.0,
        }
    }

    /// Tokens after the sentence-start marker.
    pub fn tokens(&self) -> Vec<String> {
        self.text
            .split_whitespace()
            .skip_while(|t| *t == SENTENCE_START)
            .map(str::to_string)
            .collect()
    }
}

/// Scores every hypothesis as a sentence start without a sentence end and
/// keeps the `beam_width` best. Ties keep input order.
pub fn prune(lm: &dyn LanguageModel, hypotheses: Vec<Hypothesis>, beam_width: usize) -> Vec<Hypothesis> {
    let mut scored: Vec<Hypothesis> = hypotheses
        .into_iter()
        .map(|mut h| {
            h.score = lm.score(&h.text, true, false);
            h
        })
        .collect();
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(beam_width);
    scored
}
