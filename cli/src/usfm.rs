//! Line scanner for USFM (Unified Standard Format Markers) sources.
//!
//! Three marker families are recognized: `\id` declares which book the
//! file belongs to, `\c` starts a chapter, and `\v` carries one verse
//! of text. Everything else is ignored, which tolerates the format
//! variations found in real-world source files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use grantham_backend::books::BookRegistry;
use grantham_backend::corpus::{BookRecord, ParsedBook, VerseRecord};

lazy_static! {
    // \v 12 Verse text, possibly with embedded \f ... \f* markers
    static ref RE_VERSE_MARKER: Regex = Regex::new(r"^\\v (\d+)\s+(.+)$").unwrap();

    // Inline markers like \f or \add with their required whitespace
    static ref RE_INLINE_MARKER: Regex = Regex::new(r"\\[a-z]+\s+").unwrap();

    // Closing markers like \f* or \add*
    static ref RE_CLOSING_MARKER: Regex = Regex::new(r"\\[a-z]+\*").unwrap();

    static ref RE_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Strip inline markers from a verse payload and normalize whitespace.
/// Applying this twice gives the same result as applying it once.
pub fn clean_verse_text(text: &str) -> String {
    let text = RE_INLINE_MARKER.replace_all(text, "");
    let text = RE_CLOSING_MARKER.replace_all(&text, "");
    let text = RE_WHITESPACE.replace_all(&text, " ");
    text.trim().to_string()
}

/// A source file that failed to parse, kept for the end-of-run report.
#[derive(Debug)]
pub struct FileFailure {
    pub file: PathBuf,
    pub error: anyhow::Error,
}

#[derive(Debug, Default)]
pub struct DirectoryParse {
    pub books: Vec<ParsedBook>,
    pub failures: Vec<FileFailure>,
}

impl DirectoryParse {
    pub fn total_verses(&self) -> usize {
        self.books.iter().map(|b| b.verses.len()).sum()
    }
}

pub struct UsfmParser<'a> {
    registry: &'a BookRegistry,
}

impl<'a> UsfmParser<'a> {
    pub fn new(registry: &'a BookRegistry) -> Self {
        Self { registry }
    }

    /// Scan one book's markup. Returns None when no recognized identity
    /// marker was seen or no verses were emitted.
    pub fn parse_str(&self, content: &str, source_name: &str) -> Result<Option<ParsedBook>> {
        let mut current_book = None;
        let mut current_chapter: i32 = 0;
        let mut verses: Vec<VerseRecord> = Vec::new();
        let mut seen: HashSet<(i32, i32, i32)> = HashSet::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(rest) = line.strip_prefix("\\id ") {
                let code: String = rest
                    .split_whitespace()
                    .next()
                    .unwrap_or("")
                    .chars()
                    .take(3)
                    .collect();
                current_book = self.registry.get_by_code(&code);
                if current_book.is_none() {
                    warn!("Unknown book code '{}' in {}", code, source_name);
                }
            } else if let Some(rest) = line.strip_prefix("\\c ") {
                let chapter_str = rest.split_whitespace().next().unwrap_or("");
                current_chapter = chapter_str
                    .parse()
                    .with_context(|| format!("Invalid chapter marker '{}' in {}", line, source_name))?;
            } else if let Some(caps) = RE_VERSE_MARKER.captures(line) {
                let Some(book) = current_book else {
                    warn!("Dropping verse with no active book in {}: {}", source_name, line);
                    continue;
                };
                if current_chapter < 1 {
                    warn!("Dropping verse before any chapter marker in {}: {}", source_name, line);
                    continue;
                }

                let verse_num: i32 = caps[1]
                    .parse()
                    .with_context(|| format!("Invalid verse number '{}' in {}", line, source_name))?;

                let text = clean_verse_text(&caps[2]);
                if text.is_empty() {
                    warn!("Verse reduced to empty text in {}: {}", source_name, line);
                    continue;
                }

                if !seen.insert((book.id, current_chapter, verse_num)) {
                    warn!("Duplicate verse marker in {}: {}", source_name, line);
                    continue;
                }

                verses.push(VerseRecord {
                    book_id: book.id,
                    chapter: current_chapter,
                    verse: verse_num,
                    text,
                });
            }
            // Other marker families (\h, \p, \s, ...) carry no verse data.
        }

        match current_book {
            Some(book) if !verses.is_empty() => Ok(Some(ParsedBook {
                book: BookRecord::from(book),
                verses,
            })),
            _ => Ok(None),
        }
    }

    pub fn parse_file(&self, path: &Path) -> Result<Option<ParsedBook>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let source_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("<unnamed>");

        self.parse_str(&content, source_name)
    }

    /// Parse every USFM file in a directory. A file that fails does not
    /// abort the run; failures are collected and reported together.
    pub fn parse_directory(&self, dir: &Path) -> Result<DirectoryParse> {
        let files = discover_usfm_files(dir)?;
        info!("Found {} USFM files in {}", files.len(), dir.display());

        let mut parse = DirectoryParse::default();

        for file in files {
            match self.parse_file(&file) {
                Ok(Some(book)) => {
                    info!("{}: {} verses", book.book.name_english, book.verses.len());
                    parse.books.push(book);
                }
                Ok(None) => {
                    warn!("No verses parsed from {}", file.display());
                }
                Err(error) => {
                    parse.failures.push(FileFailure { file, error });
                }
            }
        }

        if !parse.failures.is_empty() {
            warn!("{} file(s) failed to parse:", parse.failures.len());
            for failure in &parse.failures {
                warn!("  {}: {:#}", failure.file.display(), failure.error);
            }
        }

        Ok(parse)
    }
}

fn discover_usfm_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Source directory not found: {}", dir.display());
    }

    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let is_usfm = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("usfm"))
            .unwrap_or(false);

        if is_usfm {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grantham_backend::books::BOOK_REGISTRY;

    #[test]
    fn test_clean_verse_text() {
        assert_eq!(clean_verse_text("plain text"), "plain text");
        assert_eq!(clean_verse_text("Text \\f note \\f* more"), "Text note more");
        assert_eq!(clean_verse_text("  spaced   out  "), "spaced out");
        assert_eq!(clean_verse_text("\\add word\\add*"), "word");
    }

    #[test]
    fn test_clean_verse_text_is_idempotent() {
        let samples = [
            "Text \\f note \\f* more",
            "\\wj In the beginning\\wj* was",
            "  a \t b \n c ",
            "no markers at all",
        ];
        for s in samples {
            let once = clean_verse_text(s);
            let twice = clean_verse_text(&once);
            assert_eq!(once, twice, "cleaning '{}' is not idempotent", s);
        }
    }

    #[test]
    fn test_unknown_code_then_valid_book() {
        let content = "\\id QQQ Some unknown book\n\
                       \\id GEN Telugu Bible\n\
                       \\c 1\n\
                       \\v 1 Text A\n\
                       \\v 2 Text B\n";

        let parser = UsfmParser::new(&BOOK_REGISTRY);
        let parsed = parser.parse_str(content, "test.usfm").unwrap().unwrap();

        assert_eq!(parsed.book.id, 1);
        assert_eq!(parsed.verses.len(), 2);
        assert_eq!(parsed.verses[0].chapter, 1);
        assert_eq!(parsed.verses[0].verse, 1);
        assert_eq!(parsed.verses[0].text, "Text A");
        assert_eq!(parsed.verses[1].verse, 2);
        assert_eq!(parsed.verses[1].text, "Text B");
    }

    #[test]
    fn test_verse_before_identity_marker_is_dropped() {
        let content = "\\v 1 Orphan verse\n\
                       \\id GEN\n\
                       \\c 1\n\
                       \\v 2 Kept verse\n";

        let parser = UsfmParser::new(&BOOK_REGISTRY);
        let parsed = parser.parse_str(content, "test.usfm").unwrap().unwrap();

        assert_eq!(parsed.verses.len(), 1);
        assert_eq!(parsed.verses[0].verse, 2);
    }

    #[test]
    fn test_verse_before_chapter_marker_is_dropped() {
        let content = "\\id GEN\n\
                       \\v 1 Too early\n\
                       \\c 1\n\
                       \\v 1 On time\n";

        let parser = UsfmParser::new(&BOOK_REGISTRY);
        let parsed = parser.parse_str(content, "test.usfm").unwrap().unwrap();

        assert_eq!(parsed.verses.len(), 1);
        assert_eq!(parsed.verses[0].text, "On time");
    }

    #[test]
    fn test_verses_after_unknown_code_are_dropped() {
        let content = "\\id GEN\n\
                       \\c 1\n\
                       \\v 1 Kept\n\
                       \\id QQQ\n\
                       \\c 2\n\
                       \\v 1 Dropped\n";

        let parser = UsfmParser::new(&BOOK_REGISTRY);
        // The last identity marker was unrecognized, so the scan ends
        // with no active book and the file yields nothing.
        assert!(parser.parse_str(content, "test.usfm").unwrap().is_none());
    }

    #[test]
    fn test_triples_are_unique_within_a_parse() {
        let content = "\\id GEN\n\
                       \\c 1\n\
                       \\v 1 First\n\
                       \\v 1 Second copy\n\
                       \\v 2 Other\n";

        let parser = UsfmParser::new(&BOOK_REGISTRY);
        let parsed = parser.parse_str(content, "test.usfm").unwrap().unwrap();

        assert_eq!(parsed.verses.len(), 2);
        assert_eq!(parsed.verses[0].text, "First");

        let mut triples: Vec<(i32, i32, i32)> = parsed
            .verses
            .iter()
            .map(|v| (v.book_id, v.chapter, v.verse))
            .collect();
        triples.dedup();
        assert_eq!(triples.len(), parsed.verses.len());
    }

    #[test]
    fn test_inline_markers_stripped_from_payload() {
        let content = "\\id GEN\n\
                       \\c 1\n\
                       \\v 1 In the \\nd beginning\\nd* God created\n";

        let parser = UsfmParser::new(&BOOK_REGISTRY);
        let parsed = parser.parse_str(content, "test.usfm").unwrap().unwrap();

        assert_eq!(parsed.verses[0].text, "In the beginning God created");
    }

    #[test]
    fn test_chapter_state_persists_across_verses() {
        let content = "\\id GEN\n\
                       \\c 2\n\
                       \\v 1 A\n\
                       \\v 2 B\n\
                       \\c 3\n\
                       \\v 1 C\n";

        let parser = UsfmParser::new(&BOOK_REGISTRY);
        let parsed = parser.parse_str(content, "test.usfm").unwrap().unwrap();

        let chapters: Vec<i32> = parsed.verses.iter().map(|v| v.chapter).collect();
        assert_eq!(chapters, vec![2, 2, 3]);
    }

    #[test]
    fn test_malformed_chapter_marker_is_an_error() {
        let content = "\\id GEN\n\\c one\n\\v 1 Text\n";

        let parser = UsfmParser::new(&BOOK_REGISTRY);
        let err = parser.parse_str(content, "test.usfm").unwrap_err();
        assert!(err.to_string().contains("Invalid chapter marker"));
    }

    #[test]
    fn test_unrelated_markers_are_ignored() {
        let content = "\\id GEN\n\
                       \\h Genesis\n\
                       \\toc1 Genesis\n\
                       \\mt Book of Genesis\n\
                       \\c 1\n\
                       \\p\n\
                       \\v 1 Verse text\n\
                       \\s Section heading\n";

        let parser = UsfmParser::new(&BOOK_REGISTRY);
        let parsed = parser.parse_str(content, "test.usfm").unwrap().unwrap();
        assert_eq!(parsed.verses.len(), 1);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let parser = UsfmParser::new(&BOOK_REGISTRY);
        assert!(parser.parse_str("", "empty.usfm").unwrap().is_none());
        assert!(parser.parse_str("\\id GEN\n\\c 1\n", "noverses.usfm").unwrap().is_none());
    }
}
