// File: src/config.rs
use crate::core::complexity::Polarity;
use crate::core::ranker::RankerKind;
use crate::core::selector::FilterKind;
use crate::core::taxonomy::TermMatch;
use crate::error::{Result, SimplifyError};
use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The simplifier variants known to the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Word2vec candidates; n-gram, POS, cosine and complexity filters; similarity ranking.
    #[default]
    SimpleScience,
    /// Word2vec candidates; n-gram, POS and MeSH filters; similarity ranking.
    HierarchySimple,
    /// Word2vec candidates; n-gram, POS and MeSH filters; LM beam ranking.
    HierarchyPbs,
    /// Poincaré candidates, unfiltered; similarity ranking.
    PoincareSimple,
    /// Poincaré candidates, unfiltered; LM beam ranking.
    PoincarePbs,
}

impl Variant {
    pub fn name(&self) -> &'static str {
        match self {
            Variant::SimpleScience => "simple_science",
            Variant::HierarchySimple => "hierarchy_simple",
            Variant::HierarchyPbs => "hierarchy_pbs",
            Variant::PoincareSimple => "poincare_simple",
            Variant::PoincarePbs => "poincare_pbs",
        }
    }

    pub fn ranker(&self) -> RankerKind {
        match self {
            Variant::SimpleScience | Variant::HierarchySimple | Variant::PoincareSimple => {
                RankerKind::Similarity
            }
            Variant::HierarchyPbs | Variant::PoincarePbs => RankerKind::PartialBeamSearch,
        }
    }

    fn lowercases(&self) -> bool {
        !matches!(self, Variant::PoincareSimple | Variant::PoincarePbs)
    }
}

/// Pipeline parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifierConfig {
    pub variant: Variant,
    /// Neighbours requested from the embedding oracle.
    pub topn: usize,
    pub cosine_threshold: f64,
    /// Minimum scientific-corpus frequency for a candidate.
    pub frequency_threshold: f64,
    pub char_ngram: usize,
    pub beam_width: usize,
    /// Decision boundary for whole-text rewriting.
    pub complexity_threshold: f64,
    pub polarity: Polarity,
    pub term_match: TermMatch,
    /// Overrides the variant's casing rule when set.
    pub lowercase_candidates: Option<bool>,
    /// Overrides the variant's filter list when set.
    pub filters: Option<Vec<FilterKind>>,
}

impl Default for SimplifierConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            topn: 100,
            cosine_threshold: 0.4,
            frequency_threshold: 3000.0,
            char_ngram: 4,
            beam_width: 5,
            complexity_threshold: 10.0,
            polarity: Polarity::default(),
            term_match: TermMatch::default(),
            lowercase_candidates: None,
            filters: None,
        }
    }
}

impl SimplifierConfig {
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.topn == 0 {
            return Err(SimplifyError::InvalidConfig("topn must be at least 1".into()));
        }
        if self.beam_width == 0 {
            return Err(SimplifyError::InvalidConfig("beam_width must be at least 1".into()));
        }
        for (name, value) in [
            ("cosine_threshold", self.cosine_threshold),
            ("frequency_threshold", self.frequency_threshold),
            ("complexity_threshold", self.complexity_threshold),
        ] {
            if !value.is_finite() {
                return Err(SimplifyError::InvalidConfig(format!("{name} must be finite")));
            }
        }
        for filter in self.filter_kinds() {
            match filter {
                FilterKind::SharedNgram { n: 0 } => {
                    return Err(SimplifyError::InvalidConfig(
                        "shared n-gram size must be at least 1".into(),
                    ))
                }
                FilterKind::Similarity { threshold } | FilterKind::Complexity { frequency_threshold: threshold }
                    if !threshold.is_finite() =>
                {
                    return Err(SimplifyError::InvalidConfig(format!(
                        "{} threshold must be finite",
                        filter.name()
                    )))
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// The ordered filter list for this configuration.
    pub fn filter_kinds(&self) -> Vec<FilterKind> {
        if let Some(filters) = &self.filters {
            return filters.clone();
        }
        let ngram = FilterKind::SharedNgram { n: self.char_ngram };
        match self.variant {
            Variant::SimpleScience => vec![
                ngram,
                FilterKind::PosAgreement,
                FilterKind::Similarity {
                    threshold: self.cosine_threshold,
                },
                FilterKind::Complexity {
                    frequency_threshold: self.frequency_threshold,
                },
            ],
            Variant::HierarchySimple | Variant::HierarchyPbs => {
                vec![ngram, FilterKind::PosAgreement, FilterKind::Taxonomy]
            }
            Variant::PoincareSimple | Variant::PoincarePbs => Vec::new(),
        }
    }

    pub fn ranker_kind(&self) -> RankerKind {
        self.variant.ranker()
    }

    pub fn lowercase(&self) -> bool {
        self.lowercase_candidates.unwrap_or_else(|| self.variant.lowercases())
    }
}

/// Files the binaries load. Every entry is optional; a variant that needs a
/// missing one fails when the simplifier is assembled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcePaths {
    pub vectors: Option<PathBuf>,
    pub language_model: Option<PathBuf>,
    pub pos_lexicon: Option<PathBuf>,
    pub taxonomy: Option<PathBuf>,
    pub complex_frequencies: Option<PathBuf>,
    pub simple_frequencies: Option<PathBuf>,
    pub gold: Option<PathBuf>,
}

/// Top-level settings file: `{ "simplifier": {…}, "resources": {…}, "log": {…} }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub simplifier: SimplifierConfig,
    pub resources: ResourcePaths,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub path: Option<PathBuf>,
    pub level: LogLevel,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            path: None,
            level: LogLevel::Info,
        }
    }
}

impl Settings {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&text)?;
        settings.simplifier.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_follow_simple_science() {
        let config = SimplifierConfig::default();
        assert_eq!(config.topn, 100);
        assert_eq!(config.char_ngram, 4);
        assert_eq!(config.ranker_kind(), RankerKind::Similarity);
        let names: Vec<&str> = config.filter_kinds().iter().map(FilterKind::name).collect();
        assert_eq!(names, vec!["shared_ngram", "pos_agreement", "similarity", "complexity"]);
        assert!(config.lowercase());
    }

    #[test]
    fn variants_expand_to_their_pipelines() {
        let hier = SimplifierConfig::for_variant(Variant::HierarchyPbs);
        assert_eq!(hier.ranker_kind(), RankerKind::PartialBeamSearch);
        assert_eq!(hier.filter_kinds().last(), Some(&FilterKind::Taxonomy));
        let poincare = SimplifierConfig::for_variant(Variant::PoincareSimple);
        assert!(poincare.filter_kinds().is_empty());
        assert!(!poincare.lowercase());
    }

    #[test]
    fn explicit_filters_override_the_variant() {
        let config = SimplifierConfig {
            filters: Some(vec![FilterKind::Taxonomy]),
            ..SimplifierConfig::default()
        };
        assert_eq!(config.filter_kinds(), vec![FilterKind::Taxonomy]);
    }

    #[test]
    fn validation_rejects_degenerate_values() {
        let zero_ngram = SimplifierConfig {
            char_ngram: 0,
            ..SimplifierConfig::default()
        };
        assert!(matches!(zero_ngram.validate(), Err(SimplifyError::InvalidConfig(_))));
        let zero_beam = SimplifierConfig {
            beam_width: 0,
            ..SimplifierConfig::default()
        };
        assert!(zero_beam.validate().is_err());
        let nan = SimplifierConfig {
            cosine_threshold: f64::NAN,
            ..SimplifierConfig::default()
        };
        assert!(nan.validate().is_err());
        // n-gram size is irrelevant when the variant has no n-gram filter
        let poincare = SimplifierConfig {
            char_ngram: 0,
            ..SimplifierConfig::for_variant(Variant::PoincarePbs)
        };
        assert!(poincare.validate().is_ok());
    }

    #[test]
    fn settings_load_partial_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{
                "simplifier": { "variant": "hierarchy_pbs", "beam_width": 3, "polarity": "at_or_below_is_complex" },
                "resources": { "taxonomy": "mesh.json" },
                "log": { "level": "DEBUG" }
            }"#,
        )
        .unwrap();
        let settings = Settings::from_path(&path).unwrap();
        assert_eq!(settings.simplifier.variant, Variant::HierarchyPbs);
        assert_eq!(settings.simplifier.beam_width, 3);
        assert_eq!(settings.simplifier.topn, 100);
        assert_eq!(settings.simplifier.polarity, Polarity::AtOrBelowIsComplex);
        assert_eq!(settings.resources.taxonomy, Some(PathBuf::from("mesh.json")));
        assert_eq!(settings.log.level, LogLevel::Debug);
    }
}
