// File: src/evaluation.rs
use crate::core::engine::Simplifier;
use crate::error::{Result, SimplifyError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Complex word -> acceptable simpler alternatives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldTable {
    entries: BTreeMap<String, Vec<String>>,
}

impl GoldTable {
    /// One `complex,simple` pair per line; pairs for the same complex word
    /// are grouped in file order.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let mut entries: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((complex, simple)) = line.split_once(',') else {
                return Err(SimplifyError::Parse {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    reason: "expected `complex,simple`".into(),
                });
            };
            let (complex, simple) = (complex.trim().to_lowercase(), simple.trim().to_lowercase());
            if complex.is_empty() || simple.is_empty() {
                continue;
            }
            let alternatives = entries.entry(complex).or_default();
            if !alternatives.contains(&simple) {
                alternatives.push(simple);
            }
        }
        Ok(Self { entries })
    }

    pub fn from_entries(entries: BTreeMap<String, Vec<String>>) -> Self {
        Self { entries }
    }

    pub fn get(&self, word: &str) -> Option<&[String]> {
        self.entries.get(word).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scores for a single word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WordScores {
    /// 1 when at least one candidate is in the gold list.
    pub potential: f64,
    /// Number of candidates found in the gold list.
    pub precision: f64,
    pub f1: f64,
}

impl WordScores {
    pub fn compute(candidates: &[String], gold: &[String]) -> Self {
        let hits = candidates.iter().filter(|c| gold.contains(c)).count() as f64;
        let potential = if hits > 0.0 { 1.0 } else { 0.0 };
        let precision = hits;
        let f1 = 2.0 * (precision * potential) / (precision + potential + 1e-8);
        Self {
            potential,
            precision,
            f1,
        }
    }
}

/// Averages over every word that produced at least one candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupervisedReport {
    pub potential: f64,
    pub precision: f64,
    pub f1: f64,
    pub evaluated: usize,
    pub without_candidates: usize,
}

#[derive(Debug, Default)]
pub struct SupervisedEvaluation {
    totals: WordScores,
    evaluated: usize,
    without_candidates: usize,
}

impl SupervisedEvaluation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, candidates: &[String], gold: &[String]) {
        if candidates.is_empty() {
            self.without_candidates += 1;
            return;
        }
        let scores = WordScores::compute(candidates, gold);
        self.totals.potential += scores.potential;
        self.totals.precision += scores.precision;
        self.totals.f1 += scores.f1;
        self.evaluated += 1;
    }

    pub fn report(&self) -> SupervisedReport {
        let n = self.evaluated.max(1) as f64;
        SupervisedReport {
            potential: self.totals.potential / n,
            precision: self.totals.precision / n,
            f1: self.totals.f1 / n,
            evaluated: self.evaluated,
            without_candidates: self.without_candidates,
        }
    }

    /// Runs the word pipeline (no context) over every gold entry.
    pub fn run(simplifier: &Simplifier<'_>, gold: &GoldTable) -> SupervisedReport {
        let mut evaluation = Self::new();
        for (word, alternatives) in gold.iter() {
            let candidates = simplifier.simplify_word(word, None);
            evaluation.update(&candidates, alternatives);
        }
        evaluation.report()
    }
}
