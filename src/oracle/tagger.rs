// File: src/oracle/tagger.rs
use super::PosTagger;
use crate::error::{Result, SimplifyError};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Tag given to words absent from the lexicon.
pub const UNKNOWN_TAG: &str = "X";

/// Dictionary tagger: `word<TAB>tag` per line, most frequent tag first
/// when a word is listed more than once.
///
/// Context is ignored; a word always receives the same tag.
#[derive(Debug, Clone, Default)]
pub struct LexiconTagger {
    tags: HashMap<String, String>,
}

impl LexiconTagger {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let mut tags = HashMap::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut it = line.split('\t');
            let word = it.next().unwrap_or("").trim();
            let tag = it.next().unwrap_or("").trim();
            if word.is_empty() || tag.is_empty() {
                return Err(SimplifyError::Parse {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    reason: "expected `word<TAB>tag`".into(),
                });
            }
            tags.entry(word.to_lowercase()).or_insert_with(|| tag.to_string());
        }
        Ok(Self { tags })
    }

    pub fn from_pairs<I, W, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (W, T)>,
        W: Into<String>,
        T: Into<String>,
    {
        let mut tags = HashMap::new();
        for (word, tag) in pairs {
            let word: String = word.into();
            tags.entry(word.to_lowercase()).or_insert_with(|| tag.into());
        }
        Self { tags }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl PosTagger for LexiconTagger {
    fn tag(&self, word: &str, _context: Option<&str>) -> String {
        self.tags
            .get(&word.to_lowercase())
            .cloned()
            .unwrap_or_else(|| UNKNOWN_TAG.to_string())
    }
}
