// File: src/core/selector.rs
use crate::core::complexity::ComplexityScorer;
use crate::core::taxonomy::TaxonomyIndex;
use crate::oracle::{EmbeddingOracle, PosTagger};
use serde::{Deserialize, Serialize};

/// Narrows a candidate list for a complex word.
pub trait Selector {
    fn select(&self, word: &str, candidates: &[String], context: Option<&str>) -> Vec<String>;
}

/// Filter names as they appear in configuration, before oracles are bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterKind {
    SharedNgram { n: usize },
    PosAgreement,
    Similarity { threshold: f64 },
    Taxonomy,
    Complexity { frequency_threshold: f64 },
}

impl FilterKind {
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::SharedNgram { .. } => "shared_ngram",
            FilterKind::PosAgreement => "pos_agreement",
            FilterKind::Similarity { .. } => "similarity",
            FilterKind::Taxonomy => "taxonomy",
            FilterKind::Complexity { .. } => "complexity",
        }
    }
}

/// A single filter with the oracle it consults.
pub enum Filter<'a> {
    /// Drops candidates sharing any character n-gram with the complex word.
    SharedNgram { n: usize },
    /// Keeps candidates tagged like the complex word.
    PosAgreement { tagger: &'a dyn PosTagger },
    /// Keeps candidates whose similarity to the complex word exceeds `threshold`.
    Similarity {
        oracle: &'a dyn EmbeddingOracle,
        threshold: f64,
    },
    /// Keeps candidates inside the complex word's taxonomy hierarchy.
    Taxonomy { index: &'a TaxonomyIndex },
    /// Keeps candidates that are simpler than the complex word and frequent
    /// enough in the scientific corpus.
    Complexity {
        scorer: &'a dyn ComplexityScorer,
        frequency_threshold: f64,
    },
}

impl Filter<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Filter::SharedNgram { .. } => "shared_ngram",
            Filter::PosAgreement { .. } => "pos_agreement",
            Filter::Similarity { .. } => "similarity",
            Filter::Taxonomy { .. } => "taxonomy",
            Filter::Complexity { .. } => "complexity",
        }
    }

    pub fn apply(&self, word: &str, candidates: &[String], context: Option<&str>) -> Vec<String> {
        if candidates.is_empty() {
            return Vec::new();
        }
        match self {
            Filter::SharedNgram { n } => filter_shared_ngram(word, candidates, *n),
            Filter::PosAgreement { tagger } => {
                let expected = tagger.tag(word, context);
                keep(candidates, |c| tagger.tag(c, context) == expected)
            }
            Filter::Similarity { oracle, threshold } => {
                keep(candidates, |c| oracle.similarity(word, c) > *threshold)
            }
            Filter::Taxonomy { index } => {
                if !index.contains_term(word) {
                    return candidates.to_vec();
                }
                let hierarchy = index.hierarchy(word);
                if hierarchy.is_empty() {
                    return candidates.to_vec();
                }
                keep(candidates, |c| hierarchy.contains(c))
            }
            Filter::Complexity {
                scorer,
                frequency_threshold,
            } => {
                let reference = scorer.complexity_score(word);
                keep(candidates, |c| {
                    scorer.complexity_score(c) < reference
                        && scorer.complex_frequency(c) > *frequency_threshold
                })
            }
        }
    }
}

fn keep<F>(candidates: &[String], mut predicate: F) -> Vec<String>
where
    F: FnMut(&str) -> bool,
{
    candidates.iter().filter(|c| predicate(c)).cloned().collect()
}

/// Character n-grams of `word`; none when `n` is zero or exceeds the word.
pub fn char_ngrams(word: &str, n: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    if n == 0 || chars.len() < n {
        return Vec::new();
    }
    chars.windows(n).map(|w| w.iter().collect()).collect()
}

fn filter_shared_ngram(word: &str, candidates: &[String], n: usize) -> Vec<String> {
    let grams = char_ngrams(word, n);
    if grams.is_empty() {
        return candidates.to_vec();
    }
    keep(candidates, |c| !grams.iter().any(|g| c.contains(g.as_str())))
}

/// Filters applied in order; each one sees only what the previous kept.
#[derive(Default)]
pub struct FilterChain<'a> {
    filters: Vec<Filter<'a>>,
}

impl<'a> FilterChain<'a> {
    pub fn new(filters: Vec<Filter<'a>>) -> Self {
        Self { filters }
    }

    pub fn filters(&self) -> &[Filter<'a>] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Selector for FilterChain<'_> {
    fn select(&self, word: &str, candidates: &[String], context: Option<&str>) -> Vec<String> {
        let mut current = candidates.to_vec();
        for filter in &self.filters {
            if current.is_empty() {
                break;
            }
            current = filter.apply(word, &current, context);
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::complexity::{FrequencyScorer, FrequencyTables};
    use crate::oracle::{LexiconTagger, WordVectors};
    use std::collections::{BTreeMap, BTreeSet, HashMap};

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn shared_ngram_removes_morphological_variants() {
        let out = filter_shared_ngram("neoplasms", &words(&["neoplasm", "tumor", "plasma"]), 4);
        assert_eq!(out, words(&["tumor"]));
    }

    #[test]
    fn shared_ngram_never_leaves_an_overlap() {
        let cands = words(&["osteopenia", "bone loss", "porous", "loss", "steoid"]);
        for n in 1..=6 {
            let kept = filter_shared_ngram("osteoporosis", &cands, n);
            let grams = char_ngrams("osteoporosis", n);
            for c in &kept {
                assert!(grams.iter().all(|g| !c.contains(g.as_str())), "n={n} kept {c}");
            }
        }
    }

    #[test]
    fn shared_ngram_on_short_word_is_a_no_op() {
        let cands = words(&["flu", "cold"]);
        assert_eq!(filter_shared_ngram("flu", &cands, 4), cands);
        assert_eq!(filter_shared_ngram("flu", &cands, 0), cands);
    }

    #[test]
    fn pos_agreement_keeps_matching_tags() {
        let tagger = LexiconTagger::from_pairs(vec![
            ("neoplasm", "NN"),
            ("tumor", "NN"),
            ("grow", "VB"),
        ]);
        let filter = Filter::PosAgreement { tagger: &tagger };
        let out = filter.apply("neoplasm", &words(&["tumor", "grow"]), Some("a benign"));
        assert_eq!(out, words(&["tumor"]));
    }

    #[test]
    fn similarity_threshold_is_strict() {
        let vectors = WordVectors::from_pairs(vec![
            ("neoplasm", vec![1.0, 0.0]),
            ("tumor", vec![1.0, 0.0]),
            ("lump", vec![0.0, 1.0]),
        ]);
        let filter = Filter::Similarity {
            oracle: &vectors,
            threshold: 0.4,
        };
        let out = filter.apply("neoplasm", &words(&["tumor", "lump", "unknown"]), None);
        assert_eq!(out, words(&["tumor"]));
        let at_boundary = Filter::Similarity {
            oracle: &vectors,
            threshold: 1.0,
        };
        assert!(at_boundary.apply("neoplasm", &words(&["tumor"]), None).is_empty());
    }

    fn taxonomy() -> TaxonomyIndex {
        let mut nodes: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        nodes.insert("C04".into(), ["neoplasms".to_string()].into_iter().collect());
        nodes.insert("C04.557".into(), ["tumor".to_string(), "neoplasm".to_string()].into_iter().collect());
        nodes.insert("C04.557.1".into(), ["carcinoma".to_string()].into_iter().collect());
        nodes.insert("D01".into(), ["isolated".to_string()].into_iter().collect());
        TaxonomyIndex::new(nodes)
    }

    #[test]
    fn taxonomy_filter_restricts_to_hierarchy() {
        let index = taxonomy();
        let filter = Filter::Taxonomy { index: &index };
        let out = filter.apply("neoplasm", &words(&["tumor", "lump", "carcinoma"]), None);
        assert_eq!(out, words(&["tumor", "carcinoma"]));
    }

    #[test]
    fn taxonomy_filter_skips_unknown_words_and_empty_hierarchies() {
        let index = taxonomy();
        let filter = Filter::Taxonomy { index: &index };
        let cands = words(&["tumor", "lump"]);
        assert_eq!(filter.apply("fever", &cands, None), cands);
        assert_eq!(filter.apply("isolated", &cands, None), cands);
    }

    #[test]
    fn complexity_filter_needs_simpler_and_frequent() {
        let complex = HashMap::from([
            ("neoplasm".to_string(), 500.0),
            ("tumor".to_string(), 4000.0),
            ("lump".to_string(), 10.0),
        ]);
        let simple = HashMap::from([
            ("neoplasm".to_string(), 1.0),
            ("tumor".to_string(), 5000.0),
            ("lump".to_string(), 900.0),
            ("carcinoma".to_string(), 1.0),
        ]);
        let scorer = FrequencyScorer::new(FrequencyTables::new(complex, simple));
        let filter = Filter::Complexity {
            scorer: &scorer,
            frequency_threshold: 3000.0,
        };
        let out = filter.apply("neoplasm", &words(&["tumor", "lump", "carcinoma"]), None);
        assert_eq!(out, words(&["tumor"]));
    }

    #[test]
    fn chain_applies_filters_in_order_and_handles_empty_input() {
        let tagger = LexiconTagger::from_pairs(vec![("neoplasm", "NN"), ("tumor", "NN"), ("neoplasia", "NN")]);
        let chain = FilterChain::new(vec![
            Filter::SharedNgram { n: 4 },
            Filter::PosAgreement { tagger: &tagger },
        ]);
        let input = words(&["neoplasia", "tumor", "grow"]);
        assert_eq!(chain.select("neoplasm", &input, None), words(&["tumor"]));
        assert_eq!(input.len(), 3);
        assert!(chain.select("neoplasm", &[], None).is_empty());
    }
}
