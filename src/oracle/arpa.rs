// File: src/oracle/arpa.rs
use super::LanguageModel;
use crate::core::types::SENTENCE_START;
use crate::error::{Result, SimplifyError};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const SENTENCE_END: &str = "</s>";
const UNKNOWN: &str = "<unk>";
/// log10 probability used when the model has no `<unk>` entry.
const UNKNOWN_FALLBACK: f64 = -100.0;

#[derive(Debug, Clone, Copy)]
struct NgramEntry {
    log_prob: f64,
    backoff: f64,
}

/// Back-off n-gram model read from an ARPA file. Scores are log10.
#[derive(Debug, Clone, Default)]
pub struct ArpaLanguageModel {
    order: usize,
    ngrams: HashMap<String, NgramEntry>,
    unknown: f64,
}

impl ArpaLanguageModel {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Self::parse(&text, path)
    }

    pub fn from_arpa_str(text: &str) -> Result<Self> {
        Self::parse(text, Path::new("<memory>"))
    }

    fn parse(text: &str, path: &Path) -> Result<Self> {
        let fail = |line: usize, reason: String| SimplifyError::Parse {
            path: PathBuf::from(path),
            line,
            reason,
        };

        let mut model = Self::default();
        let mut section: Option<usize> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line == "\\data\\" || line.starts_with("ngram ") {
                continue;
            }
            if line == "\\end\\" {
                break;
            }
            if let Some(n) = line.strip_prefix('\\').and_then(|s| s.strip_suffix("-grams:")) {
                let n = n
                    .parse::<usize>()
                    .map_err(|_| fail(idx + 1, format!("bad section header `{line}`")))?;
                model.order = model.order.max(n);
                section = Some(n);
                continue;
            }
            let Some(n) = section else {
                return Err(fail(idx + 1, "entry outside of an n-gram section".into()));
            };

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < n + 1 {
                return Err(fail(idx + 1, format!("expected {} words", n)));
            }
            let log_prob = fields[0]
                .parse::<f64>()
                .map_err(|e| fail(idx + 1, format!("bad probability: {e}")))?;
            let backoff = match fields.get(n + 1) {
                Some(v) => v
                    .parse::<f64>()
                    .map_err(|e| fail(idx + 1, format!("bad back-off weight: {e}")))?,
                None => 0.0,
            };
            model
                .ngrams
                .insert(fields[1..=n].join(" "), NgramEntry { log_prob, backoff });
        }

        model.unknown = model
            .ngrams
            .get(UNKNOWN)
            .map(|e| e.log_prob)
            .unwrap_or(UNKNOWN_FALLBACK);
        Ok(model)
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// log10 P(word | history), backing off from the longest history.
    fn log_prob(&self, history: &[&str], word: &str) -> f64 {
        let mut penalty = 0.0;
        for start in 0..=history.len() {
            let context = &history[start..];
            let key = if context.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", context.join(" "), word)
            };
            if let Some(entry) = self.ngrams.get(&key) {
                return entry.log_prob + penalty;
            }
            if !context.is_empty() {
                if let Some(entry) = self.ngrams.get(&context.join(" ")) {
                    penalty += entry.backoff;
                }
            }
        }
        self.unknown + penalty
    }
}

impl LanguageModel for ArpaLanguageModel {
    fn score(&self, text: &str, sentence_start: bool, sentence_end: bool) -> f64 {
        let mut tokens: Vec<&str> = text.split_whitespace().collect();
        let mut history: Vec<&str> = Vec::new();
        if sentence_start {
            let leading = tokens.iter().take_while(|t| **t == SENTENCE_START).count();
            tokens.drain(..leading);
            history.push(SENTENCE_START);
        }
        if sentence_end {
            tokens.push(SENTENCE_END);
        }

        let keep = self.order.saturating_sub(1);
        let mut total = 0.0;
        for token in tokens {
            let from = history.len().saturating_sub(keep);
            total += self.log_prob(&history[from..], token);
            history.push(token);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = "\\data\\
ngram 1=5
ngram 2=3

\\1-grams:
-1.0\t<s>\t-0.5
-2.0\tthe\t-0.3
-2.5\ttumor\t-0.2
-3.0\tneoplasm
-1.5\t</s>

\\2-grams:
-0.5\t<s> the
-0.4\tthe tumor
-0.7\ttumor </s>

\\end\\
";

    #[test]
    fn uses_longest_available_history() {
        let lm = ArpaLanguageModel::from_arpa_str(MODEL).unwrap();
        assert_eq!(lm.order(), 2);
        let score = lm.score("the tumor", true, false);
        assert!((score - (-0.5 + -0.4)).abs() < 1e-9);
    }

    #[test]
    fn backs_off_through_history_weight() {
        let lm = ArpaLanguageModel::from_arpa_str(MODEL).unwrap();
        // P(neoplasm | the) = bow(the) + P(neoplasm)
        let score = lm.score("the neoplasm", true, false);
        assert!((score - (-0.5 + -0.3 + -3.0)).abs() < 1e-9);
    }

    #[test]
    fn leading_start_marker_is_not_scored_twice() {
        let lm = ArpaLanguageModel::from_arpa_str(MODEL).unwrap();
        assert_eq!(lm.score("<s> the tumor", true, false), lm.score("the tumor", true, false));
    }

    #[test]
    fn sentence_end_adds_closing_token() {
        let lm = ArpaLanguageModel::from_arpa_str(MODEL).unwrap();
        let open = lm.score("the tumor", true, false);
        let closed = lm.score("the tumor", true, true);
        assert!((closed - open - (-0.7)).abs() < 1e-9);
    }

    #[test]
    fn unknown_words_get_fallback() {
        let lm = ArpaLanguageModel::from_arpa_str(MODEL).unwrap();
        let score = lm.score("zebra", false, false);
        assert!((score - UNKNOWN_FALLBACK).abs() < 1e-9);
    }

    #[test]
    fn entries_outside_sections_are_rejected() {
        let err = ArpaLanguageModel::from_arpa_str("-1.0 the\n").unwrap_err();
        assert!(matches!(err, SimplifyError::Parse { line: 1, .. }));
    }
}
