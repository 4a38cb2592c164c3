//! Read-side queries over a built store.
//!
//! Two access patterns are supported: exact lookup by (book, chapter,
//! verse or verse range), and full-text search over verse text ranked
//! by BM25 relevance. Search goes through the verses_fts index and is
//! joined back to the verses table on the shared rowid.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Text};
use thiserror::Error;

use crate::books::Testament;
use crate::db::models::{Book, Verse};
use crate::db::schema::{books, verses};

pub fn get_books(conn: &mut SqliteConnection) -> Result<Vec<Book>> {
    let res = books::table
        .select(Book::as_select())
        .order(books::id.asc())
        .load(conn)?;
    Ok(res)
}

pub fn get_books_by_testament(
    conn: &mut SqliteConnection,
    testament: Testament,
) -> Result<Vec<Book>> {
    let res = books::table
        .filter(books::testament.eq(testament.as_str()))
        .select(Book::as_select())
        .order(books::id.asc())
        .load(conn)?;
    Ok(res)
}

pub fn get_book(conn: &mut SqliteConnection, book_id: i32) -> Result<Option<Book>> {
    let res = books::table
        .find(book_id)
        .select(Book::as_select())
        .first(conn)
        .optional()?;
    Ok(res)
}

pub fn get_verse(
    conn: &mut SqliteConnection,
    book_id: i32,
    chapter: i32,
    verse: i32,
) -> Result<Option<Verse>> {
    let res = verses::table
        .filter(verses::book_id.eq(book_id))
        .filter(verses::chapter.eq(chapter))
        .filter(verses::verse.eq(verse))
        .select(Verse::as_select())
        .first(conn)
        .optional()?;
    Ok(res)
}

pub fn get_chapter_verses(
    conn: &mut SqliteConnection,
    book_id: i32,
    chapter: i32,
) -> Result<Vec<Verse>> {
    let res = verses::table
        .filter(verses::book_id.eq(book_id))
        .filter(verses::chapter.eq(chapter))
        .select(Verse::as_select())
        .order(verses::verse.asc())
        .load(conn)?;
    Ok(res)
}

pub fn get_verse_range(
    conn: &mut SqliteConnection,
    book_id: i32,
    chapter: i32,
    verse_start: i32,
    verse_end: i32,
) -> Result<Vec<Verse>> {
    let res = verses::table
        .filter(verses::book_id.eq(book_id))
        .filter(verses::chapter.eq(chapter))
        .filter(verses::verse.between(verse_start, verse_end))
        .select(Verse::as_select())
        .order(verses::verse.asc())
        .load(conn)?;
    Ok(res)
}

/// Full-text search over cleaned verse text, best matches first.
pub fn search_verses(
    conn: &mut SqliteConnection,
    query: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<Verse>> {
    let res = sql_query(
        r#"
        SELECT v.id, v.book_id, v.chapter, v.verse, v.text
        FROM verses v
        JOIN verses_fts fts ON v.id = fts.rowid
        WHERE verses_fts MATCH ?
        ORDER BY rank
        LIMIT ? OFFSET ?
        "#,
    )
    .bind::<Text, _>(query)
    .bind::<BigInt, _>(limit)
    .bind::<BigInt, _>(offset)
    .load(conn)?;
    Ok(res)
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

pub fn search_hits_count(conn: &mut SqliteConnection, query: &str) -> Result<i64> {
    let row: CountRow = sql_query(
        r#"
        SELECT COUNT(*) AS count
        FROM verses v
        JOIN verses_fts fts ON v.id = fts.rowid
        WHERE verses_fts MATCH ?
        "#,
    )
    .bind::<Text, _>(query)
    .get_result(conn)?;
    Ok(row.count)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestamentStats {
    pub books: i64,
    pub verses: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreStatistics {
    pub books: i64,
    pub verses: i64,
    pub old_testament: TestamentStats,
    pub new_testament: TestamentStats,
    pub file_size_mb: f64,
}

pub fn store_statistics(conn: &mut SqliteConnection, db_path: &Path) -> Result<StoreStatistics> {
    let book_count: i64 = books::table.count().get_result(conn)?;
    let verse_count: i64 = verses::table.count().get_result(conn)?;

    let old_testament = testament_stats(conn, Testament::Old)?;
    let new_testament = testament_stats(conn, Testament::New)?;

    let file_size = std::fs::metadata(db_path)
        .with_context(|| format!("Failed to stat store file: {}", db_path.display()))?
        .len();

    Ok(StoreStatistics {
        books: book_count,
        verses: verse_count,
        old_testament,
        new_testament,
        file_size_mb: file_size as f64 / (1024.0 * 1024.0),
    })
}

fn testament_stats(conn: &mut SqliteConnection, testament: Testament) -> Result<TestamentStats> {
    use diesel::dsl::sum;

    let book_count: i64 = books::table
        .filter(books::testament.eq(testament.as_str()))
        .count()
        .get_result(conn)?;

    // Verse totals come from the per-book counts computed at load time.
    let verse_sum: Option<i64> = books::table
        .filter(books::testament.eq(testament.as_str()))
        .select(sum(books::verse_count))
        .first(conn)?;

    Ok(TestamentStats {
        books: book_count,
        verses: verse_sum.unwrap_or(0),
    })
}

/// A verse selection on the command line: a single verse number or an
/// inclusive range, e.g. "3" or "3-7".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerseSelector {
    pub start: i32,
    pub end: Option<i32>,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid verse selection: {0}")]
pub struct ParseVerseSelectorError(String);

impl FromStr for VerseSelector {
    type Err = ParseVerseSelectorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ParseVerseSelectorError(s.to_string());

        match s.split_once('-') {
            Some((a, b)) => {
                let start: i32 = a.trim().parse().map_err(|_| invalid())?;
                let end: i32 = b.trim().parse().map_err(|_| invalid())?;
                if start < 1 || end < start {
                    return Err(invalid());
                }
                Ok(VerseSelector { start, end: Some(end) })
            }
            None => {
                let start: i32 = s.parse().map_err(|_| invalid())?;
                if start < 1 {
                    return Err(invalid());
                }
                Ok(VerseSelector { start, end: None })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verse_selector_single() {
        assert_eq!(
            "3".parse::<VerseSelector>().unwrap(),
            VerseSelector { start: 3, end: None }
        );
    }

    #[test]
    fn test_verse_selector_range() {
        assert_eq!(
            "3-7".parse::<VerseSelector>().unwrap(),
            VerseSelector { start: 3, end: Some(7) }
        );
        assert_eq!(
            " 1-2 ".parse::<VerseSelector>().unwrap(),
            VerseSelector { start: 1, end: Some(2) }
        );
    }

    #[test]
    fn test_verse_selector_rejects_garbage() {
        assert!("".parse::<VerseSelector>().is_err());
        assert!("abc".parse::<VerseSelector>().is_err());
        assert!("0".parse::<VerseSelector>().is_err());
        assert!("5-2".parse::<VerseSelector>().is_err());
        assert!("1-".parse::<VerseSelector>().is_err());
    }
}
