// File: src/persistence.rs
use crate::core::types::TaxonomyId;
use crate::error::{Result, SimplifyError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Persisted id -> terms table.
pub type TaxonomyTable = BTreeMap<TaxonomyId, BTreeSet<String>>;

/// Persisted word -> frequency table.
pub type FrequencyTable = HashMap<String, f64>;

/// On-disk encoding, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Tsv,
    Bincode,
}

impl Format {
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => Format::Tsv,
            _ => Format::Bincode,
        }
    }
}

pub fn load_taxonomy(path: &Path) -> Result<TaxonomyTable> {
    let raw: TaxonomyTable = match Format::of(path) {
        Format::Json => read_json(path)?,
        Format::Bincode => read_binary(path)?,
        Format::Tsv => read_taxonomy_tsv(path)?,
    };
    Ok(raw
        .into_iter()
        .map(|(id, terms)| {
            let terms = terms
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect();
            (id.trim().to_string(), terms)
        })
        .filter(|(id, _): &(String, BTreeSet<String>)| !id.is_empty())
        .collect())
}

pub fn load_frequencies(path: &Path) -> Result<FrequencyTable> {
    let raw: FrequencyTable = match Format::of(path) {
        Format::Json => read_json(path)?,
        Format::Bincode => read_binary(path)?,
        Format::Tsv => read_frequency_tsv(path)?,
    };
    let mut table = FrequencyTable::with_capacity(raw.len());
    for (word, count) in raw {
        *table.entry(word.trim().to_lowercase()).or_insert(0.0) += count;
    }
    Ok(table)
}

pub fn save_taxonomy(table: &TaxonomyTable, path: &Path) -> Result<()> {
    write_binary(table, path)
}

pub fn save_frequencies(table: &FrequencyTable, path: &Path) -> Result<()> {
    write_binary(table, path)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

fn read_binary<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(bincode::deserialize_from(reader)?)
}

/// Serialises into a temporary file next to `path`, then moves it over
/// `path`, so readers never see a half-written table.
fn write_binary<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        bincode::serialize_into(&mut writer, value)?;
        writer.flush()?;
    }
    temp_file.persist(path).map_err(|e| SimplifyError::Io(e.error))?;
    Ok(())
}

/// `id<TAB>term|term|…`; an id may repeat across lines.
fn read_taxonomy_tsv(path: &Path) -> Result<TaxonomyTable> {
    let text = fs::read_to_string(path)?;
    let mut table = TaxonomyTable::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((id, terms)) = line.split_once('\t') else {
            return Err(SimplifyError::Parse {
                path: path.to_path_buf(),
                line: idx + 1,
                reason: "expected `id<TAB>term|term`".into(),
            });
        };
        table
            .entry(id.to_string())
            .or_default()
            .extend(terms.split('|').map(str::to_string));
    }
    Ok(table)
}

/// `word<TAB>count`.
fn read_frequency_tsv(path: &Path) -> Result<FrequencyTable> {
    let text = fs::read_to_string(path)?;
    let mut table = FrequencyTable::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut it = line.split('\t');
        let word = it.next().unwrap_or("").trim();
        let count = it
            .next()
            .map(str::trim)
            .and_then(|c| c.parse::<f64>().ok())
            .filter(|c| c.is_finite());
        match count {
            Some(count) if !word.is_empty() => *table.entry(word.to_string()).or_insert(0.0) += count,
            _ => {
                return Err(SimplifyError::Parse {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    reason: "expected `word<TAB>count`".into(),
                })
            }
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn taxonomy_round_trips_through_bincode() {
        let dir = tempdir().unwrap();
        let json = dir.path().join("mesh.json");
        fs::write(&json, r#"{"C04": ["Neoplasms "], "C04.557": ["tumor", "neoplasm"]}"#).unwrap();
        let table = load_taxonomy(&json).unwrap();
        assert!(table["C04"].contains("neoplasms"));

        let bin = dir.path().join("packed/mesh.bin");
        save_taxonomy(&table, &bin).unwrap();
        assert_eq!(load_taxonomy(&bin).unwrap(), table);
    }

    #[test]
    fn taxonomy_tsv_merges_repeated_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mesh.tsv");
        fs::write(&path, "# tree\nC01\tInfections|Infection\nC01\tsepsis\n").unwrap();
        let table = load_taxonomy(&path).unwrap();
        assert_eq!(table["C01"].len(), 3);
        assert!(table["C01"].contains("infections"));
    }

    #[test]
    fn frequency_tsv_sums_case_variants() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pubmed.tsv");
        fs::write(&path, "Tumor\t10\ntumor\t5\nneoplasm\t2.5\n").unwrap();
        let table = load_frequencies(&path).unwrap();
        assert_eq!(table["tumor"], 15.0);
        assert_eq!(table["neoplasm"], 2.5);
    }

    #[test]
    fn malformed_frequency_line_reports_position() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wiki.tsv");
        fs::write(&path, "tumor\t10\nfever\tlots\n").unwrap();
        assert!(matches!(
            load_frequencies(&path),
            Err(SimplifyError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            load_frequencies(&dir.path().join("absent.bin")),
            Err(SimplifyError::Io(_))
        ));
    }
}
