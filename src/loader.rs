// src/loader.rs
use crate::config::{ResourcePaths, SimplifierConfig};
use crate::core::complexity::{FrequencyScorer, FrequencyTables};
use crate::core::engine::Resources;
use crate::core::taxonomy::TaxonomyIndex;
use crate::error::{Result, SimplifyError};
use crate::logging::Telemetry;
use crate::oracle::{ArpaLanguageModel, LexiconTagger, WordVectors};
use crate::persistence::{load_frequencies, load_taxonomy};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Every resource named in [`ResourcePaths`], loaded and owned. The
/// simplifier borrows from this for its whole lifetime.
pub struct LoadedResources {
    pub vectors: Option<WordVectors>,
    pub language_model: Option<ArpaLanguageModel>,
    pub tagger: Option<LexiconTagger>,
    pub taxonomy: Option<TaxonomyIndex>,
    pub scorer: Option<FrequencyScorer>,
}

impl LoadedResources {
    /// Relative paths are resolved against `base` when given.
    pub fn load(
        paths: &ResourcePaths,
        base: Option<&Path>,
        config: &SimplifierConfig,
        telemetry: &Telemetry,
    ) -> Result<Self> {
        let resolve = |p: &PathBuf| match base {
            Some(base) if p.is_relative() => base.join(p),
            _ => p.clone(),
        };

        let vectors = match &paths.vectors {
            Some(p) => {
                let path = resolve(p);
                let vectors = WordVectors::from_path(&path)?;
                telemetry.info(
                    "resources.vectors",
                    json!({ "path": path, "words": vectors.len(), "dimension": vectors.dimension() }),
                );
                Some(vectors)
            }
            None => None,
        };

        let language_model = match &paths.language_model {
            Some(p) => {
                let path = resolve(p);
                let lm = ArpaLanguageModel::from_path(&path)?;
                telemetry.info("resources.language_model", json!({ "path": path, "order": lm.order() }));
                Some(lm)
            }
            None => None,
        };

        let tagger = match &paths.pos_lexicon {
            Some(p) => {
                let path = resolve(p);
                let tagger = LexiconTagger::from_path(&path)?;
                telemetry.info("resources.pos_lexicon", json!({ "path": path, "words": tagger.len() }));
                Some(tagger)
            }
            None => None,
        };

        let taxonomy = match &paths.taxonomy {
            Some(p) => {
                let path = resolve(p);
                let index = TaxonomyIndex::new(load_taxonomy(&path)?).with_term_match(config.term_match);
                telemetry.info("resources.taxonomy", json!({ "path": path, "nodes": index.len() }));
                Some(index)
            }
            None => None,
        };

        let scorer = match (&paths.complex_frequencies, &paths.simple_frequencies) {
            (Some(complex), Some(simple)) => {
                let (complex, simple) = (resolve(complex), resolve(simple));
                let tables = FrequencyTables::new(load_frequencies(&complex)?, load_frequencies(&simple)?);
                telemetry.info(
                    "resources.frequencies",
                    json!({
                        "complex": complex,
                        "complex_words": tables.complex.len(),
                        "simple": simple,
                        "simple_words": tables.simple.len(),
                    }),
                );
                Some(FrequencyScorer::new(tables).with_polarity(config.polarity))
            }
            (None, None) => None,
            _ => {
                telemetry.warn("resources.frequencies_incomplete", json!({}));
                None
            }
        };

        Ok(Self {
            vectors,
            language_model,
            tagger,
            taxonomy,
            scorer,
        })
    }

    /// Borrows the loaded oracles. Fails when no embeddings were configured.
    pub fn resources(&self) -> Result<Resources<'_>> {
        let vectors = self
            .vectors
            .as_ref()
            .ok_or(SimplifyError::MissingResource("word vectors"))?;
        let mut resources = Resources::new(vectors);
        if let Some(lm) = &self.language_model {
            resources = resources.with_language_model(lm);
        }
        if let Some(tagger) = &self.tagger {
            resources = resources.with_tagger(tagger);
        }
        if let Some(taxonomy) = &self.taxonomy {
            resources = resources.with_taxonomy(taxonomy);
        }
        if let Some(scorer) = &self.scorer {
            resources = resources.with_scorer(scorer);
        }
        Ok(resources)
    }
}
