//! The fixed 66-book canon registry.
//!
//! Book identifiers, names and testament classification are reference
//! data: they are not derived from input files and never change at
//! runtime. The registry is constructed once and passed by reference to
//! the parser and the store builder.

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Testament {
    #[serde(rename = "OT")]
    Old,
    #[serde(rename = "NT")]
    New,
}

impl Testament {
    pub fn as_str(&self) -> &'static str {
        match self {
            Testament::Old => "OT",
            Testament::New => "NT",
        }
    }
}

/// One entry of the canon registry, keyed by the standard 3-letter
/// USFM book code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookInfo {
    pub id: i32,
    pub code: &'static str,
    pub name_english: &'static str,
    pub name_telugu: &'static str,
    pub testament: Testament,
}

// (id, USFM code, English name, Telugu name, testament)
const BOOK_TABLE: [(i32, &str, &str, &str, Testament); 66] = [
    (1, "GEN", "Genesis", "ఆదికాండము", Testament::Old),
    (2, "EXO", "Exodus", "నిర్గమకాండము", Testament::Old),
    (3, "LEV", "Leviticus", "లేవీయకాండము", Testament::Old),
    (4, "NUM", "Numbers", "సంఖ్యాకాండము", Testament::Old),
    (5, "DEU", "Deuteronomy", "ద్వితీయోపదేశకాండము", Testament::Old),
    (6, "JOS", "Joshua", "యెహోషువ", Testament::Old),
    (7, "JDG", "Judges", "న్యాయాధిపతులు", Testament::Old),
    (8, "RUT", "Ruth", "రూతు", Testament::Old),
    (9, "1SA", "1 Samuel", "1 సమూయేలు", Testament::Old),
    (10, "2SA", "2 Samuel", "2 సమూయేలు", Testament::Old),
    (11, "1KI", "1 Kings", "1 రాజులు", Testament::Old),
    (12, "2KI", "2 Kings", "2 రాజులు", Testament::Old),
    (13, "1CH", "1 Chronicles", "1 దినవృత్తాంతములు", Testament::Old),
    (14, "2CH", "2 Chronicles", "2 దినవృత్తాంతములు", Testament::Old),
    (15, "EZR", "Ezra", "ఎజ్రా", Testament::Old),
    (16, "NEH", "Nehemiah", "నెహెమ్యా", Testament::Old),
    (17, "EST", "Esther", "ఎస్తేరు", Testament::Old),
    (18, "JOB", "Job", "యోబు", Testament::Old),
    (19, "PSA", "Psalms", "కీర్తనల గ్రంథము", Testament::Old),
    (20, "PRO", "Proverbs", "సామెతలు", Testament::Old),
    (21, "ECC", "Ecclesiastes", "ప్రసంగి", Testament::Old),
    (22, "SNG", "Song of Solomon", "పరమగీతము", Testament::Old),
    (23, "ISA", "Isaiah", "యెషయా", Testament::Old),
    (24, "JER", "Jeremiah", "యిర్మియా", Testament::Old),
    (25, "LAM", "Lamentations", "విలాపవాక్యములు", Testament::Old),
    (26, "EZK", "Ezekiel", "యెహెఙ్కేలు", Testament::Old),
    (27, "DAN", "Daniel", "దానియేలు", Testament::Old),
    (28, "HOS", "Hosea", "హోషేయ", Testament::Old),
    (29, "JOL", "Joel", "యోవేలు", Testament::Old),
    (30, "AMO", "Amos", "ఆమోసు", Testament::Old),
    (31, "OBA", "Obadiah", "ఓబద్యా", Testament::Old),
    (32, "JON", "Jonah", "యోనా", Testament::Old),
    (33, "MIC", "Micah", "మీకా", Testament::Old),
    (34, "NAM", "Nahum", "నహూము", Testament::Old),
    (35, "HAB", "Habakkuk", "హబక్కూకు", Testament::Old),
    (36, "ZEP", "Zephaniah", "జెఫన్యా", Testament::Old),
    (37, "HAG", "Haggai", "హగ్గయి", Testament::Old),
    (38, "ZEC", "Zechariah", "జెకర్యా", Testament::Old),
    (39, "MAL", "Malachi", "మలాకి", Testament::Old),
    (40, "MAT", "Matthew", "మత్తయి", Testament::New),
    (41, "MRK", "Mark", "మార్కు", Testament::New),
    (42, "LUK", "Luke", "లూకా", Testament::New),
    (43, "JHN", "John", "యోహాను", Testament::New),
    (44, "ACT", "Acts", "అపొస్తలుల కార్యములు", Testament::New),
    (45, "ROM", "Romans", "రోమీయులకు", Testament::New),
    (46, "1CO", "1 Corinthians", "1 కొరిందీయులకు", Testament::New),
    (47, "2CO", "2 Corinthians", "2 కొరిందీయులకు", Testament::New),
    (48, "GAL", "Galatians", "గలతియులకు", Testament::New),
    (49, "EPH", "Ephesians", "ఎఫెసీయులకు", Testament::New),
    (50, "PHP", "Philippians", "ఫిలిప్పీయులకు", Testament::New),
    (51, "COL", "Colossians", "కొలొస్సయులకు", Testament::New),
    (52, "1TH", "1 Thessalonians", "1 థెస్సలొనీకయులకు", Testament::New),
    (53, "2TH", "2 Thessalonians", "2 థెస్సలొనీకయులకు", Testament::New),
    (54, "1TI", "1 Timothy", "1 తిమోతికి", Testament::New),
    (55, "2TI", "2 Timothy", "2 తిమోతికి", Testament::New),
    (56, "TIT", "Titus", "తీతుకు", Testament::New),
    (57, "PHM", "Philemon", "ఫిలేమోనుకు", Testament::New),
    (58, "HEB", "Hebrews", "హెబ్రీయులకు", Testament::New),
    (59, "JAS", "James", "యాకోబు", Testament::New),
    (60, "1PE", "1 Peter", "1 పేతురు", Testament::New),
    (61, "2PE", "2 Peter", "2 పేతురు", Testament::New),
    (62, "1JN", "1 John", "1 యోహాను", Testament::New),
    (63, "2JN", "2 John", "2 యోహాను", Testament::New),
    (64, "3JN", "3 John", "3 యోహాను", Testament::New),
    (65, "JUD", "Jude", "యూదా", Testament::New),
    (66, "REV", "Revelation", "ప్రకటన", Testament::New),
];

pub struct BookRegistry {
    books: Vec<BookInfo>,
    by_code: HashMap<&'static str, usize>,
    by_id: HashMap<i32, usize>,
}

impl BookRegistry {
    fn new() -> Self {
        let books: Vec<BookInfo> = BOOK_TABLE
            .iter()
            .map(|&(id, code, name_english, name_telugu, testament)| BookInfo {
                id,
                code,
                name_english,
                name_telugu,
                testament,
            })
            .collect();

        let by_code = books
            .iter()
            .enumerate()
            .map(|(idx, b)| (b.code, idx))
            .collect();

        let by_id = books
            .iter()
            .enumerate()
            .map(|(idx, b)| (b.id, idx))
            .collect();

        Self { books, by_code, by_id }
    }

    /// Look up a book by its 3-letter USFM code, e.g. "GEN".
    pub fn get_by_code(&self, code: &str) -> Option<&BookInfo> {
        self.by_code.get(code).map(|&idx| &self.books[idx])
    }

    pub fn get_by_id(&self, id: i32) -> Option<&BookInfo> {
        self.by_id.get(&id).map(|&idx| &self.books[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &BookInfo> {
        self.books.iter()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

lazy_static! {
    pub static ref BOOK_REGISTRY: BookRegistry = BookRegistry::new();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_66_books() {
        assert_eq!(BOOK_REGISTRY.len(), 66);
    }

    #[test]
    fn test_ids_are_sequential_and_unique() {
        let mut ids: Vec<i32> = BOOK_REGISTRY.iter().map(|b| b.id).collect();
        ids.sort();
        assert_eq!(ids, (1..=66).collect::<Vec<i32>>());
    }

    #[test]
    fn test_codes_are_unique() {
        let codes: std::collections::HashSet<&str> =
            BOOK_REGISTRY.iter().map(|b| b.code).collect();
        assert_eq!(codes.len(), 66);
    }

    #[test]
    fn test_testament_split() {
        let ot = BOOK_REGISTRY
            .iter()
            .filter(|b| b.testament == Testament::Old)
            .count();
        let nt = BOOK_REGISTRY
            .iter()
            .filter(|b| b.testament == Testament::New)
            .count();
        assert_eq!(ot, 39);
        assert_eq!(nt, 27);
    }

    #[test]
    fn test_lookup_by_code() {
        let genesis = BOOK_REGISTRY.get_by_code("GEN").unwrap();
        assert_eq!(genesis.id, 1);
        assert_eq!(genesis.name_english, "Genesis");
        assert_eq!(genesis.testament, Testament::Old);

        let revelation = BOOK_REGISTRY.get_by_code("REV").unwrap();
        assert_eq!(revelation.id, 66);
        assert_eq!(revelation.testament, Testament::New);

        assert!(BOOK_REGISTRY.get_by_code("XYZ").is_none());
        // Lookups are exact: the parser passes codes through unchanged.
        assert!(BOOK_REGISTRY.get_by_code("gen").is_none());
    }

    #[test]
    fn test_lookup_by_id() {
        assert_eq!(BOOK_REGISTRY.get_by_id(43).unwrap().code, "JHN");
        assert!(BOOK_REGISTRY.get_by_id(0).is_none());
        assert!(BOOK_REGISTRY.get_by_id(67).is_none());
    }
}
