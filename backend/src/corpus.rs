//! Interchange types for the parsed corpus.
//!
//! The parser writes the full corpus as a JSON artifact, an ordered
//! list of `{book, verses}` objects, which the store builder consumes
//! in a separate invocation. Loading the artifact back must yield a
//! sequence equal to what was written.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::books::{BookInfo, Testament};

/// One scripture verse as produced by the parser, with markup removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRecord {
    pub book_id: i32,
    pub chapter: i32,
    pub verse: i32,
    pub text: String,
}

/// Owned registry fields for the interchange artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: i32,
    pub name_english: String,
    pub name_telugu: String,
    pub testament: Testament,
}

impl From<&BookInfo> for BookRecord {
    fn from(info: &BookInfo) -> Self {
        Self {
            id: info.id,
            name_english: info.name_english.to_string(),
            name_telugu: info.name_telugu.to_string(),
            testament: info.testament,
        }
    }
}

/// The parse result for one source file: the recognized book and its
/// verses in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedBook {
    pub book: BookRecord,
    pub verses: Vec<VerseRecord>,
}

impl ParsedBook {
    /// Highest chapter number observed in the verse data.
    pub fn chapter_count(&self) -> i32 {
        self.verses.iter().map(|v| v.chapter).max().unwrap_or(0)
    }

    pub fn verse_count(&self) -> usize {
        self.verses.len()
    }
}

/// Write the corpus as pretty-printed UTF-8 JSON (no byte-order mark).
pub fn save_corpus(books: &[ParsedBook], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(books)
        .context("Failed to serialize corpus")?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    fs::write(path, json)
        .with_context(|| format!("Failed to write corpus file: {}", path.display()))?;

    Ok(())
}

pub fn load_corpus(path: &Path) -> Result<Vec<ParsedBook>> {
    if !path.exists() {
        anyhow::bail!("Corpus file not found: {}", path.display());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus file: {}", path.display()))?;

    let books: Vec<ParsedBook> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse corpus file: {}", path.display()))?;

    Ok(books)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::books::BOOK_REGISTRY;
    use tempfile::TempDir;

    fn sample_corpus() -> Vec<ParsedBook> {
        let genesis = BOOK_REGISTRY.get_by_code("GEN").unwrap();
        let john = BOOK_REGISTRY.get_by_code("JHN").unwrap();

        vec![
            ParsedBook {
                book: BookRecord::from(genesis),
                verses: vec![
                    VerseRecord { book_id: 1, chapter: 1, verse: 1, text: "Text A".to_string() },
                    VerseRecord { book_id: 1, chapter: 1, verse: 2, text: "Text B".to_string() },
                    VerseRecord { book_id: 1, chapter: 2, verse: 1, text: "Text C".to_string() },
                ],
            },
            ParsedBook {
                book: BookRecord::from(john),
                verses: vec![
                    VerseRecord { book_id: 43, chapter: 3, verse: 16, text: "దేవుడు లోకమును ఎంతో ప్రేమించెను".to_string() },
                ],
            },
        ]
    }

    #[test]
    fn test_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("corpus.json");

        let corpus = sample_corpus();
        save_corpus(&corpus, &path).unwrap();

        let loaded = load_corpus(&path).unwrap();
        assert_eq!(corpus, loaded);
    }

    #[test]
    fn test_artifact_is_utf8_without_bom() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("corpus.json");

        save_corpus(&sample_corpus(), &path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(!bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"testament\": \"OT\""));
        assert!(text.contains("\"testament\": \"NT\""));
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("no_such_corpus.json");

        let err = load_corpus(&path).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_chapter_count_is_max_observed() {
        let corpus = sample_corpus();
        assert_eq!(corpus[0].chapter_count(), 2);
        assert_eq!(corpus[0].verse_count(), 3);
        assert_eq!(corpus[1].chapter_count(), 3);
    }
}
