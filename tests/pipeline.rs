use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use simplify_core::core::complexity::{ComplexityScorer, FrequencyScorer, FrequencyTables};
use simplify_core::core::ranker::RankerKind;
use simplify_core::core::taxonomy::TaxonomyIndex;
use simplify_core::evaluation::{GoldTable, SupervisedEvaluation};
use simplify_core::logging::Telemetry;
use simplify_core::{LoadedResources, Settings, Simplifier, SimplifierConfig, SimplifyError, Variant};
use tempfile::{tempdir, TempDir};

const VECTORS: &str = "5 3
neoplasm 1 0 0
tumor 0.95 0.05 0
growth 0.7 0.3 0
lump 0.5 0.5 0
carcinoma 0.9 0 0.1
";

const LANGUAGE_MODEL: &str = "\\data\\
ngram 1=7

\\1-grams:
-1.0 <s>
-1.5 a
-2.0 benign
-1.0 tumor
-3.0 carcinoma
-4.0 </s>
-5.0 <unk>

\\end\\
";

fn write_fixture(dir: &Path) {
    fs::write(dir.join("vectors.txt"), VECTORS).unwrap();
    fs::write(dir.join("lm.arpa"), LANGUAGE_MODEL).unwrap();
    fs::write(
        dir.join("lexicon.tsv"),
        "neoplasm\tNN\ntumor\tNN\ngrowth\tNN\nlump\tNN\ncarcinoma\tNN\n",
    )
    .unwrap();
    fs::write(
        dir.join("mesh.json"),
        r#"{"C04": ["Neoplasms"], "C04.557": ["neoplasm", "tumor"], "C04.557.337": ["carcinoma"], "A01": ["lump"]}"#,
    )
    .unwrap();
    fs::write(dir.join("pubmed.json"), r#"{"neoplasm": 500, "tumor": 4000}"#).unwrap();
    fs::write(dir.join("wiki.json"), r#"{"tumor": 500, "neoplasm": 1}"#).unwrap();
    fs::write(dir.join("gold.csv"), "neoplasm,tumor\nneoplasm,growth\npyrexia,fever\n").unwrap();
    fs::write(
        dir.join("settings.json"),
        r#"{
            "simplifier": { "variant": "hierarchy_simple" },
            "resources": {
                "vectors": "vectors.txt",
                "language_model": "lm.arpa",
                "pos_lexicon": "lexicon.tsv",
                "taxonomy": "mesh.json",
                "complex_frequencies": "pubmed.json",
                "simple_frequencies": "wiki.json",
                "gold": "gold.csv"
            }
        }"#,
    )
    .unwrap();
}

fn fixture() -> (TempDir, Settings, LoadedResources) {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    let settings = Settings::from_path(dir.path().join("settings.json")).unwrap();
    let loaded = LoadedResources::load(
        &settings.resources,
        Some(dir.path()),
        &settings.simplifier,
        &Telemetry::disabled("test"),
    )
    .unwrap();
    (dir, settings, loaded)
}

fn simplifier(loaded: &LoadedResources, variant: Variant) -> Simplifier<'_> {
    Simplifier::new(SimplifierConfig::for_variant(variant), loaded.resources().unwrap()).unwrap()
}

#[test]
fn hierarchy_simple_keeps_taxonomy_relatives_by_similarity() {
    let (_dir, _settings, loaded) = fixture();
    let simplifier = simplifier(&loaded, Variant::HierarchySimple);
    assert_eq!(simplifier.simplify_word("neoplasm", None), vec!["tumor", "carcinoma"]);
}

#[test]
fn hierarchy_pbs_ranks_by_language_model() {
    let (_dir, _settings, loaded) = fixture();
    let simplifier = simplifier(&loaded, Variant::HierarchyPbs);
    assert_eq!(simplifier.ranker_kind(), RankerKind::PartialBeamSearch);
    let trace = simplifier.simplify_word_traced("neoplasm", Some("a benign"));
    assert_eq!(trace.counts.generated, 4);
    assert_eq!(trace.counts.selected, 2);
    assert_eq!(trace.candidates, vec!["tumor", "carcinoma"]);
}

#[test]
fn greedy_text_with_beam_ranking_fails_fast() {
    let (_dir, _settings, loaded) = fixture();
    let simplifier = simplifier(&loaded, Variant::HierarchyPbs);
    let err = simplifier.simplify_text(&["a", "benign", "neoplasm"]).unwrap_err();
    assert!(matches!(err, SimplifyError::Unsupported(_)));
    assert!(err.to_string().starts_with("not implemented for this configuration"));
}

#[test]
fn sentence_beam_search_rewrites_complex_words() {
    let (_dir, _settings, loaded) = fixture();
    let simplifier = simplifier(&loaded, Variant::HierarchyPbs);
    let out = simplifier.simplify_text_beam(&["a", "benign", "neoplasm"]).unwrap();
    assert_eq!(out, vec!["a", "benign", "tumor"]);
}

#[test]
fn out_of_vocabulary_word_flows_through_every_stage() {
    let (_dir, _settings, loaded) = fixture();
    for variant in [Variant::HierarchySimple, Variant::HierarchyPbs, Variant::PoincarePbs] {
        let simplifier = simplifier(&loaded, variant);
        let trace = simplifier.simplify_word_traced("pyrexia", Some("a high"));
        assert_eq!(trace.counts.generated, 0);
        assert!(trace.candidates.is_empty());
    }
}

#[test]
fn supervised_evaluation_over_gold_table() {
    let (dir, settings, loaded) = fixture();
    let gold_path = dir.path().join(settings.resources.gold.as_ref().unwrap());
    let gold = GoldTable::from_path(gold_path).unwrap();
    let simplifier = simplifier(&loaded, settings.simplifier.variant);
    let report = SupervisedEvaluation::run(&simplifier, &gold);
    assert_eq!(report.evaluated, 1);
    assert_eq!(report.without_candidates, 1);
    assert_eq!(report.potential, 1.0);
    assert_eq!(report.precision, 1.0);
    assert!((report.f1 - 1.0).abs() < 1e-6);
}

#[test]
fn cat_kitten_hierarchy() {
    let nodes: BTreeMap<String, BTreeSet<String>> = BTreeMap::from([
        ("C1".to_string(), BTreeSet::from(["cat".to_string()])),
        ("C1.1".to_string(), BTreeSet::from(["kitten".to_string()])),
    ]);
    let index = TaxonomyIndex::new(nodes);
    assert_eq!(index.hierarchy("cat"), BTreeSet::from(["kitten".to_string()]));
    assert!(index.hierarchy("dog").is_empty());
}

#[test]
fn neoplasm_complexity_scores() {
    let complex = HashMap::from([("neoplasm".to_string(), 500.0)]);
    let simple = HashMap::from([("tumor".to_string(), 500.0), ("neoplasm".to_string(), 1.0)]);
    let scorer = FrequencyScorer::new(FrequencyTables::new(complex, simple));
    assert_eq!(scorer.complexity_score("neoplasm"), 4000.0);
    let tumor = scorer.complexity_score("tumor");
    assert!((tumor - 1e-10).abs() < 1e-15);
}
