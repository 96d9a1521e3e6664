// --- File: src/core/taxonomy.rs
use crate::core::types::TaxonomyId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// How a surface term is matched against the terms stored on each node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermMatch {
    /// The stored term must equal the query.
    #[default]
    Exact,
    /// The stored term must contain the query.
    Substring,
}

/// Read-only index over the MeSH tree: id -> synonym set, plus the inverse
/// term -> ids map used for exact lookups.
///
/// Ids are kept in a `BTreeMap` so that all descendants of `C05.116` are a
/// contiguous range starting at `C05.116.`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxonomyIndex {
    nodes: BTreeMap<TaxonomyId, BTreeSet<String>>,
    term_ids: HashMap<String, BTreeSet<TaxonomyId>>,
    term_match: TermMatch,
}

impl TaxonomyIndex {
    pub fn new(nodes: BTreeMap<TaxonomyId, BTreeSet<String>>) -> Self {
        let mut term_ids: HashMap<String, BTreeSet<TaxonomyId>> = HashMap::new();
        for (id, terms) in &nodes {
            for term in terms {
                term_ids.entry(term.clone()).or_default().insert(id.clone());
            }
        }
        Self {
            nodes,
            term_ids,
            term_match: TermMatch::Exact,
        }
    }

    pub fn with_term_match(mut self, term_match: TermMatch) -> Self {
        self.term_match = term_match;
        self
    }

    pub fn term_match(&self) -> TermMatch {
        self.term_match
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &BTreeMap<TaxonomyId, BTreeSet<String>> {
        &self.nodes
    }

    /// True when `term` is stored on at least one node (always exact).
    pub fn contains_term(&self, term: &str) -> bool {
        self.term_ids.contains_key(term)
    }

    /// Ids whose term set matches `term` under the configured [`TermMatch`].
    pub fn lookup_ids_by_term(&self, term: &str) -> BTreeSet<TaxonomyId> {
        if term.is_empty() {
            return BTreeSet::new();
        }
        match self.term_match {
            TermMatch::Exact => self.term_ids.get(term).cloned().unwrap_or_default(),
            TermMatch::Substring => self
                .nodes
                .iter()
                .filter(|(_, terms)| terms.iter().any(|t| t.contains(term)))
                .map(|(id, _)| id.clone())
                .collect(),
        }
    }

    /// Union of the term sets of `ids`. Unknown ids contribute nothing.
    pub fn synonyms<'a, I>(&self, ids: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a TaxonomyId>,
    {
        let mut out = BTreeSet::new();
        for id in ids {
            if let Some(terms) = self.nodes.get(id) {
                out.extend(terms.iter().cloned());
            }
        }
        out
    }

    /// Union of the term sets of every proper ancestor of every id.
    pub fn hypernyms<'a, I>(&self, ids: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a TaxonomyId>,
    {
        let mut out = BTreeSet::new();
        for id in ids {
            for ancestor in ancestor_ids(id) {
                if let Some(terms) = self.nodes.get(ancestor) {
                    out.extend(terms.iter().cloned());
                }
            }
        }
        out
    }

    /// Union of the term sets of every strict descendant of every id.
    pub fn hyponyms<'a, I>(&self, ids: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a TaxonomyId>,
    {
        let mut out = BTreeSet::new();
        for id in ids {
            for (_, terms) in self.descendants(id) {
                out.extend(terms.iter().cloned());
            }
        }
        out
    }

    /// Synonyms, hypernyms and hyponyms reachable from every id matching
    /// `term`, without `term` itself.
    pub fn hierarchy(&self, term: &str) -> BTreeSet<String> {
        let ids = self.lookup_ids_by_term(term);
        if ids.is_empty() {
            return BTreeSet::new();
        }
        let mut out = self.synonyms(&ids);
        out.extend(self.hypernyms(&ids));
        out.extend(self.hyponyms(&ids));
        out.remove(term);
        out
    }

    /// Walks the contiguous key range below `id`. A plain string prefix is not
    /// enough (`C05.11` must not capture `C05.116`), so the range starts at
    /// `id` followed by the separator.
    fn descendants<'s>(&'s self, id: &str) -> impl Iterator<Item = (&'s TaxonomyId, &'s BTreeSet<String>)> + 's {
        let prefix = format!("{id}.");
        let depth = tree_depth(id);
        self.nodes
            .range(prefix.clone()..)
            .take_while(move |(key, _)| key.starts_with(&prefix))
            .filter(move |(key, _)| tree_depth(key) > depth)
    }
}

/// Number of dot-separated segments; `C05` is 1, `C05.116` is 2.
pub fn tree_depth(id: &str) -> usize {
    id.split('.').count()
}

/// Proper dot-prefixes of `id`, shortest first. Root ids have none.
pub fn ancestor_ids(id: &str) -> Vec<&str> {
    id.match_indices('.').map(|(pos, _)| &id[..pos]).collect()
}

/// Immediate parent of `id`, or `None` for a root id.
pub fn parent_id(id: &str) -> Option<&str> {
    id.rfind('.').map(|pos| &id[..pos])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, &[&str])]) -> BTreeMap<TaxonomyId, BTreeSet<String>> {
        entries
            .iter()
            .map(|(id, terms)| {
                (
                    id.to_string(),
                    terms.iter().map(|t| t.to_string()).collect(),
                )
            })
            .collect()
    }

    fn sample() -> TaxonomyIndex {
        TaxonomyIndex::new(table(&[
            ("C05", &["musculoskeletal diseases"]),
            ("C05.116", &["bone diseases"]),
            ("C05.116.198", &["bone diseases, metabolic", "metabolic bone disease"]),
            ("C05.116.198.579", &["osteoporosis", "bone loss"]),
            ("C05.116.198.579.610", &["osteoporosis, postmenopausal"]),
            ("C05.1160", &["unrelated sibling prefix"]),
            ("C05.117", &["cartilage diseases"]),
        ]))
    }

    #[test]
    fn ancestors_are_proper_prefixes() {
        assert_eq!(ancestor_ids("A.B.C"), vec!["A", "A.B"]);
        assert!(ancestor_ids("A").is_empty());
        assert_eq!(parent_id("A.B.C"), Some("A.B"));
        assert_eq!(parent_id("A"), None);
    }

    #[test]
    fn hypernyms_exclude_the_node_itself() {
        let index = TaxonomyIndex::new(table(&[("A", &["a"]), ("A.B", &["ab"]), ("A.B.C", &["abc"])]));
        let hyper = index.hypernyms(&["A.B.C".to_string()]);
        assert!(hyper.contains("a"));
        assert!(hyper.contains("ab"));
        assert!(!hyper.contains("abc"));
    }

    #[test]
    fn root_ids_have_no_hypernyms() {
        let index = sample();
        assert!(index.hypernyms(&["C05".to_string()]).is_empty());
    }

    #[test]
    fn hyponyms_respect_segment_boundaries() {
        let index = sample();
        let hypo = index.hyponyms(&["C05.116".to_string()]);
        assert!(hypo.contains("osteoporosis"));
        assert!(hypo.contains("osteoporosis, postmenopausal"));
        assert!(!hypo.contains("unrelated sibling prefix"));
        assert!(!hypo.contains("bone diseases"));
        assert!(!hypo.contains("cartilage diseases"));
    }

    #[test]
    fn hierarchy_unions_all_directions() {
        let index = sample();
        let hierarchy = index.hierarchy("osteoporosis");
        assert!(hierarchy.contains("bone loss"));
        assert!(hierarchy.contains("bone diseases"));
        assert!(hierarchy.contains("musculoskeletal diseases"));
        assert!(hierarchy.contains("osteoporosis, postmenopausal"));
        assert!(!hierarchy.contains("osteoporosis"));
        assert!(!hierarchy.contains("cartilage diseases"));
    }

    #[test]
    fn hierarchy_of_unknown_term_is_empty() {
        assert!(sample().hierarchy("appendicitis").is_empty());
    }

    #[test]
    fn root_term_yields_only_its_hyponyms() {
        let index = TaxonomyIndex::new(table(&[("C1", &["cat"]), ("C1.1", &["kitten"])]));
        let expected: BTreeSet<String> = ["kitten".to_string()].into_iter().collect();
        assert_eq!(index.hierarchy("cat"), expected);
    }

    #[test]
    fn substring_matching_is_opt_in() {
        let exact = sample();
        assert!(exact.lookup_ids_by_term("osteo").is_empty());
        let fuzzy = sample().with_term_match(TermMatch::Substring);
        let ids = fuzzy.lookup_ids_by_term("osteo");
        assert!(ids.contains("C05.116.198.579"));
        assert!(ids.contains("C05.116.198.579.610"));
    }

    #[test]
    fn term_shared_by_several_nodes_returns_all_ids() {
        let index = TaxonomyIndex::new(table(&[("A.1", &["fever"]), ("B.7", &["fever", "pyrexia"])]));
        let ids = index.lookup_ids_by_term("fever");
        assert_eq!(ids.len(), 2);
        assert!(index.hierarchy("fever").contains("pyrexia"));
    }
}
