// src/core/engine.rs
use crate::config::SimplifierConfig;
use crate::core::complexity::ComplexityScorer;
use crate::core::context::ContextBuffer;
use crate::core::generator::{EmbeddingGenerator, Generator};
use crate::core::ranker::{prune, Hypothesis, Ranker, RankerKind, RankingStrategy};
use crate::core::selector::{Filter, FilterChain, FilterKind, Selector};
use crate::core::taxonomy::TaxonomyIndex;
use crate::core::types::{expand_mwe, StageCounts, WordTrace};
use crate::error::{Result, SimplifyError};
use crate::logging::Telemetry;
use crate::oracle::{EmbeddingOracle, LanguageModel, PosTagger};
use serde_json::json;
use std::cell::Cell;
use std::cmp::Ordering;

/// Where the word pipeline currently is. Re-entered for every word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Generating,
    Selecting,
    Ranking,
    Done,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Generating => "generating",
            Stage::Selecting => "selecting",
            Stage::Ranking => "ranking",
            Stage::Done => "done",
        }
    }
}

/// Oracles lent to the simplifier. Only the embeddings are required; the
/// rest are checked against the configured filters and ranker when the
/// simplifier is built.
#[derive(Clone, Copy)]
pub struct Resources<'a> {
    pub embeddings: &'a dyn EmbeddingOracle,
    pub language_model: Option<&'a dyn LanguageModel>,
    pub tagger: Option<&'a dyn PosTagger>,
    pub taxonomy: Option<&'a TaxonomyIndex>,
    pub scorer: Option<&'a dyn ComplexityScorer>,
}

impl<'a> Resources<'a> {
    pub fn new(embeddings: &'a dyn EmbeddingOracle) -> Self {
        Self {
            embeddings,
            language_model: None,
            tagger: None,
            taxonomy: None,
            scorer: None,
        }
    }

    pub fn with_language_model(mut self, lm: &'a dyn LanguageModel) -> Self {
        self.language_model = Some(lm);
        self
    }

    pub fn with_tagger(mut self, tagger: &'a dyn PosTagger) -> Self {
        self.tagger = Some(tagger);
        self
    }

    pub fn with_taxonomy(mut self, taxonomy: &'a TaxonomyIndex) -> Self {
        self.taxonomy = Some(taxonomy);
        self
    }

    pub fn with_scorer(mut self, scorer: &'a dyn ComplexityScorer) -> Self {
        self.scorer = Some(scorer);
        self
    }

    fn bind(&self, kind: &FilterKind) -> Result<Filter<'a>> {
        Ok(match *kind {
            FilterKind::SharedNgram { n } => Filter::SharedNgram { n },
            FilterKind::PosAgreement => Filter::PosAgreement {
                tagger: self.tagger.ok_or(SimplifyError::MissingResource("pos tagger"))?,
            },
            FilterKind::Similarity { threshold } => Filter::Similarity {
                oracle: self.embeddings,
                threshold,
            },
            FilterKind::Taxonomy => Filter::Taxonomy {
                index: self.taxonomy.ok_or(SimplifyError::MissingResource("taxonomy"))?,
            },
            FilterKind::Complexity { frequency_threshold } => Filter::Complexity {
                scorer: self.scorer.ok_or(SimplifyError::MissingResource("frequency tables"))?,
                frequency_threshold,
            },
        })
    }
}

pub struct SimplifierBuilder<'a> {
    config: SimplifierConfig,
    resources: Resources<'a>,
    telemetry: Telemetry,
    generator: Option<Box<dyn Generator + 'a>>,
    filters: Option<Vec<Filter<'a>>>,
}

impl<'a> SimplifierBuilder<'a> {
    pub fn telemetry(mut self, telemetry: Telemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Replaces the embedding-neighbour generator.
    pub fn generator(mut self, generator: Box<dyn Generator + 'a>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Replaces the configured filter list with already-bound filters.
    pub fn filters(mut self, filters: Vec<Filter<'a>>) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn build(self) -> Result<Simplifier<'a>> {
        let config = self.config;
        config.validate()?;
        let resources = self.resources;

        let filters = match self.filters {
            Some(filters) => filters,
            None => config
                .filter_kinds()
                .iter()
                .map(|kind| resources.bind(kind))
                .collect::<Result<Vec<_>>>()?,
        };

        let ranker = match config.ranker_kind() {
            RankerKind::Similarity => RankingStrategy::Similarity {
                oracle: resources.embeddings,
            },
            RankerKind::PartialBeamSearch => RankingStrategy::PartialBeamSearch {
                lm: resources
                    .language_model
                    .ok_or(SimplifyError::MissingResource("language model"))?,
                beam_width: config.beam_width,
            },
        };

        // The index is shared and immutable; its matching mode is fixed by whoever loaded it.
        if let Some(index) = resources.taxonomy {
            if index.term_match() != config.term_match {
                self.telemetry.warn(
                    "engine.term_match_mismatch",
                    json!({ "configured": config.term_match, "index": index.term_match() }),
                );
            }
        }

        let generator: Box<dyn Generator + 'a> = match self.generator {
            Some(generator) => generator,
            None => Box::new(
                EmbeddingGenerator::new(resources.embeddings, config.topn).lowercase(config.lowercase()),
            ),
        };

        let filter_names: Vec<&str> = filters.iter().map(Filter::name).collect();
        self.telemetry.info(
            "engine.ready",
            json!({
                "variant": config.variant.name(),
                "filters": filter_names,
                "ranker": ranker.kind(),
            }),
        );

        Ok(Simplifier {
            generator,
            selector: FilterChain::new(filters),
            ranker,
            scorer: resources.scorer,
            complexity_threshold: config.complexity_threshold,
            lowercase: config.lowercase(),
            telemetry: self.telemetry,
            stage: Cell::new(Stage::Idle),
        })
    }
}

/// Generator -> selector -> ranker for single words, plus two whole-text
/// modes driven by the complexity scorer.
///
/// The simplifier borrows every oracle; it never outlives them.
pub struct Simplifier<'a> {
    generator: Box<dyn Generator + 'a>,
    selector: FilterChain<'a>,
    ranker: RankingStrategy<'a>,
    scorer: Option<&'a dyn ComplexityScorer>,
    complexity_threshold: f64,
    lowercase: bool,
    telemetry: Telemetry,
    stage: Cell<Stage>,
}

impl<'a> Simplifier<'a> {
    pub fn builder(config: SimplifierConfig, resources: Resources<'a>) -> SimplifierBuilder<'a> {
        SimplifierBuilder {
            config,
            resources,
            telemetry: Telemetry::disabled("engine"),
            generator: None,
            filters: None,
        }
    }

    pub fn new(config: SimplifierConfig, resources: Resources<'a>) -> Result<Self> {
        Self::builder(config, resources).build()
    }

    pub fn stage(&self) -> Stage {
        self.stage.get()
    }

    pub fn ranker_kind(&self) -> RankerKind {
        self.ranker.kind()
    }

    pub fn selector(&self) -> &FilterChain<'a> {
        &self.selector
    }

    /// Ranked substitutions for `word`, best first. Empty when the word is
    /// out of vocabulary or every candidate is filtered out.
    pub fn simplify_word(&self, word: &str, context: Option<&str>) -> Vec<String> {
        self.simplify_word_traced(word, context).candidates
    }

    pub fn simplify_word_traced(&self, word: &str, context: Option<&str>) -> WordTrace {
        let word = self.normalize(word);
        if word.is_empty() {
            return WordTrace::default();
        }

        let selected = self.candidates(&word, context);
        let mut counts = selected.counts;

        self.enter(Stage::Ranking, &word, selected.candidates.len());
        let ranked = self.ranker.rank(&word, &selected.candidates, context);
        counts.ranked = ranked.len();
        self.enter(Stage::Done, &word, ranked.len());

        WordTrace {
            word,
            counts,
            candidates: ranked,
        }
    }

    /// Greedy left-to-right rewriting. Every complex token is replaced by
    /// its top candidate, with the output so far as context; a complex token
    /// without candidates is kept. Multi-word substitutions come back as a
    /// single space-separated element.
    pub fn simplify_text<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Vec<String>> {
        if self.ranker.kind() == RankerKind::PartialBeamSearch {
            self.telemetry.warn("engine.unsupported", json!({ "mode": "greedy_text" }));
            return Err(SimplifyError::Unsupported(
                "greedy text rewriting with partial beam search ranking".into(),
            ));
        }
        let scorer = self.scorer.ok_or(SimplifyError::MissingResource("frequency tables"))?;

        let mut output = ContextBuffer::with_capacity(tokens.len());
        for token in tokens.iter().map(|t| t.as_ref()).filter(|t| !t.trim().is_empty()) {
            let key = self.normalize(token);
            if !scorer.is_complex(&key, self.complexity_threshold) {
                output.push(token);
                continue;
            }
            match self.simplify_word(&key, output.context()).into_iter().next() {
                Some(best) => output.push(expand_mwe(&best)),
                None => output.push(token),
            }
        }
        Ok(output.into_tokens())
    }

    /// Sentence-level partial beam search. Non-complex tokens extend every
    /// live hypothesis; a complex token branches every hypothesis on every
    /// selected candidate (or on itself when there are none) and the beam is
    /// pruned by language-model score. Returns the tokens of the best full
    /// sentence.
    pub fn simplify_text_beam<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Vec<String>> {
        let RankingStrategy::PartialBeamSearch { lm, beam_width } = &self.ranker else {
            self.telemetry.warn("engine.unsupported", json!({ "mode": "beam_text" }));
            return Err(SimplifyError::Unsupported(
                "sentence beam search without a partial beam search ranker".into(),
            ));
        };
        let scorer = self.scorer.ok_or(SimplifyError::MissingResource("frequency tables"))?;

        let mut beams = vec![Hypothesis::start(None)];
        let mut consumed = 0usize;
        for token in tokens.iter().map(|t| t.as_ref()).filter(|t| !t.trim().is_empty()) {
            consumed += 1;
            let key = self.normalize(token);
            if !scorer.is_complex(&key, self.complexity_threshold) {
                beams = beams.iter().map(|h| h.extend(token)).collect();
                continue;
            }
            let context = beams.first().map(|h| h.tokens().join(" "));
            let mut options = self.candidates(&key, context.as_deref()).candidates;
            if options.is_empty() {
                options.push(token.to_string());
            }
            let expanded: Vec<Hypothesis> = beams
                .iter()
                .flat_map(|h| options.iter().map(move |c| h.extend(c)))
                .collect();
            self.enter(Stage::Ranking, &key, expanded.len());
            beams = prune(*lm, expanded, *beam_width);
            self.enter(Stage::Done, &key, beams.len());
            self.telemetry.debug(
                "engine.beam",
                json!({ "word": key, "options": options.len(), "live": beams.len() }),
            );
        }

        // A start-only hypothesis is never scored.
        if consumed == 0 {
            return Ok(Vec::new());
        }
        if beams.len() == 1 {
            return Ok(beams.pop().map(|h| h.tokens()).unwrap_or_default());
        }

        let best = beams
            .into_iter()
            .map(|h| {
                let score = lm.score(&h.text, true, true);
                (h, score)
            })
            .fold(None::<(Hypothesis, f64)>, |best, (h, score)| match best {
                Some((b, s)) if s.partial_cmp(&score) != Some(Ordering::Less) => Some((b, s)),
                _ => Some((h, score)),
            });
        Ok(best.map(|(h, _)| h.tokens()).unwrap_or_default())
    }

    /// Generation and selection without ranking.
    fn candidates(&self, word: &str, context: Option<&str>) -> Selected {
        self.enter(Stage::Generating, word, 0);
        let generated = self.generator.generate(word);

        self.enter(Stage::Selecting, word, generated.len());
        let mut selected = self.selector.select(word, &generated, context);
        selected.retain(|c| c != word);

        Selected {
            counts: StageCounts {
                generated: generated.len(),
                selected: selected.len(),
                ranked: 0,
            },
            candidates: selected,
        }
    }

    fn normalize(&self, word: &str) -> String {
        let word = word.trim();
        if self.lowercase {
            word.to_lowercase()
        } else {
            word.to_string()
        }
    }

    fn enter(&self, stage: Stage, word: &str, candidates: usize) {
        self.stage.set(stage);
        self.telemetry.debug(
            "engine.stage",
            json!({ "stage": stage.name(), "word": word, "candidates": candidates }),
        );
    }
}

struct Selected {
    counts: StageCounts,
    candidates: Vec<String>,
}
