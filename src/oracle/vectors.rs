// File: src/oracle/vectors.rs
use super::EmbeddingOracle;
use crate::error::{Result, SimplifyError};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Word vectors held in memory, answering neighbour queries by brute-force
/// cosine similarity.
///
/// Vectors are unit-normalised on load so a similarity is a single dot
/// product. Words whose vector has zero magnitude are kept in the vocabulary
/// but are similar to nothing.
#[derive(Debug, Clone, Default)]
pub struct WordVectors {
    words: Vec<String>,
    index: HashMap<String, usize>,
    vectors: Vec<Vec<f32>>,
    dimension: usize,
}

impl WordVectors {
    /// Reads the word2vec text format: an optional `<count> <dimension>`
    /// header, then one `word v1 v2 …` line per entry.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let mut out = Self::default();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else { continue };
            let values: Vec<&str> = fields.collect();

            if idx == 0 && values.len() == 1 && word.parse::<usize>().is_ok() {
                continue; // header
            }

            let vector = values
                .iter()
                .map(|v| v.parse::<f32>())
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| SimplifyError::Parse {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    reason: format!("bad vector component: {e}"),
                })?;
            if let Some(pos) = vector.iter().position(|v| !v.is_finite()) {
                return Err(SimplifyError::Parse {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    reason: format!("non-finite vector component at position {}", pos + 1),
                });
            }
            if out.dimension != 0 && vector.len() != out.dimension {
                return Err(SimplifyError::Parse {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    reason: format!("expected {} components, found {}", out.dimension, vector.len()),
                });
            }
            out.insert(word, vector);
        }
        Ok(out)
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: Into<String>,
    {
        let mut out = Self::default();
        for (word, vector) in pairs {
            let word: String = word.into();
            out.insert(&word, vector);
        }
        out
    }

    fn insert(&mut self, word: &str, vector: Vec<f32>) {
        if self.dimension == 0 {
            self.dimension = vector.len();
        }
        let vector = normalize(vector);
        if let Some(&id) = self.index.get(word) {
            self.vectors[id] = vector;
            return;
        }
        self.index.insert(word.to_string(), self.words.len());
        self.words.push(word.to_string());
        self.vectors.push(vector);
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn vector(&self, word: &str) -> Option<&[f32]> {
        self.index.get(word).map(|&id| self.vectors[id].as_slice())
    }
}

impl EmbeddingOracle for WordVectors {
    fn nearest(&self, word: &str, topn: usize) -> Option<Vec<(String, f64)>> {
        let query = self.vector(word)?;
        let mut scored: Vec<(usize, f64)> = self
            .vectors
            .iter()
            .enumerate()
            .filter(|(id, _)| self.words[*id] != word)
            .map(|(id, v)| (id, dot(query, v)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(topn);
        Some(
            scored
                .into_iter()
                .map(|(id, score)| (self.words[id].clone(), score))
                .collect(),
        )
    }

    fn similarity(&self, a: &str, b: &str) -> f64 {
        match (self.vector(a), self.vector(b)) {
            (Some(va), Some(vb)) => dot(va, vb),
            _ => f64::NEG_INFINITY,
        }
    }

    fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }
}

fn normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut vector {
            *x /= norm;
        }
    }
    vector
}

fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum()
}
