// File: src/core/complexity.rs
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Frequency assumed for words missing from either table. Keeps the score
/// finite and ranks unknown words as maximally complex against known simple
/// words.
pub const FREQUENCY_FLOOR: f64 = 1e-8;

/// Direction of the complex/simple decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// `score > threshold` means complex.
    #[default]
    AboveIsComplex,
    /// `score <= threshold` means complex.
    AtOrBelowIsComplex,
}

/// Complex-word identification.
pub trait ComplexityScorer {
    fn complex_frequency(&self, word: &str) -> f64;
    fn simple_frequency(&self, word: &str) -> f64;

    /// `(complex_frequency / simple_frequency) * len(word)`; higher is more complex.
    fn complexity_score(&self, word: &str) -> f64 {
        let length = word.chars().count() as f64;
        (self.complex_frequency(word) / self.simple_frequency(word)) * length
    }

    fn is_complex(&self, word: &str, threshold: f64) -> bool;
}

/// Word frequencies in the scientific corpus and in the general corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrequencyTables {
    pub complex: HashMap<String, f64>,
    pub simple: HashMap<String, f64>,
}

impl FrequencyTables {
    pub fn new(complex: HashMap<String, f64>, simple: HashMap<String, f64>) -> Self {
        Self { complex, simple }
    }
}

/// Scores words from a pair of frequency tables.
#[derive(Debug, Clone, Default)]
pub struct FrequencyScorer {
    tables: FrequencyTables,
    polarity: Polarity,
}

impl FrequencyScorer {
    pub fn new(tables: FrequencyTables) -> Self {
        Self {
            tables,
            polarity: Polarity::default(),
        }
    }

    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn tables(&self) -> &FrequencyTables {
        &self.tables
    }
}

impl ComplexityScorer for FrequencyScorer {
    fn complex_frequency(&self, word: &str) -> f64 {
        self.tables.complex.get(word).copied().unwrap_or(FREQUENCY_FLOOR)
    }

    fn simple_frequency(&self, word: &str) -> f64 {
        self.tables.simple.get(word).copied().unwrap_or(FREQUENCY_FLOOR)
    }

    fn is_complex(&self, word: &str, threshold: f64) -> bool {
        let score = self.complexity_score(word);
        match self.polarity {
            Polarity::AboveIsComplex => score > threshold,
            Polarity::AtOrBelowIsComplex => score <= threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> FrequencyScorer {
        let complex = HashMap::from([("neoplasm".to_string(), 500.0)]);
        let simple = HashMap::from([("tumor".to_string(), 500.0), ("neoplasm".to_string(), 1.0)]);
        FrequencyScorer::new(FrequencyTables::new(complex, simple))
    }

    #[test]
    fn score_scales_frequency_ratio_by_length() {
        let s = scorer();
        assert!((s.complexity_score("neoplasm") - 4000.0).abs() < 1e-9);
        let tumor = s.complexity_score("tumor");
        assert!((tumor - 1e-10).abs() < 1e-15);
    }

    #[test]
    fn unknown_words_use_the_floor_in_both_tables() {
        let s = scorer();
        assert_eq!(s.complex_frequency("zzz"), FREQUENCY_FLOOR);
        assert_eq!(s.simple_frequency("zzz"), FREQUENCY_FLOOR);
        assert!((s.complexity_score("zzz") - 3.0).abs() < 1e-9);
    }

    #[test]
    fn default_polarity_treats_high_scores_as_complex() {
        let s = scorer();
        assert!(s.is_complex("neoplasm", 10.0));
        assert!(!s.is_complex("tumor", 10.0));
    }

    #[test]
    fn inverted_polarity_treats_low_scores_as_complex() {
        let s = scorer().with_polarity(Polarity::AtOrBelowIsComplex);
        assert!(!s.is_complex("neoplasm", 10.0));
        assert!(s.is_complex("tumor", 10.0));
        // boundary belongs to the "at or below" side
        assert!(s.is_complex("neoplasm", 4000.0));
    }
}
