//! Builds the persistent verse store from a parsed corpus.
//!
//! The build is not incremental: an existing store file is deleted and
//! the schema is created fresh. Verse inserts run in batches inside one
//! transaction; the FTS index rows are created by the schema's triggers
//! as part of each insert, so the index can never drift from the verse
//! table, including for ad-hoc updates made after the build.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use diesel::prelude::*;
use diesel::sql_query;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use grantham_backend::VERSE_BATCH_SIZE;
use grantham_backend::corpus::ParsedBook;
use grantham_backend::db::models::{NewBook, NewVerse};
use grantham_backend::db::schema::{books, verses};
use grantham_backend::queries::{StoreStatistics, store_statistics};

use crate::bootstrap::{create_database_connection, ensure_directory_exists, run_migrations};

pub struct StoreBootstrap {
    output_path: PathBuf,
}

impl StoreBootstrap {
    pub fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }

    pub fn create_database(&self) -> Result<()> {
        info!("Creating verse store at: {:?}", self.output_path);

        if self.output_path.exists() {
            info!("Deleting existing store file");
            fs::remove_file(&self.output_path)?;
        }

        ensure_directory_exists(
            self.output_path
                .parent()
                .ok_or_else(|| anyhow::anyhow!("Invalid store path"))?,
        )?;

        let mut conn = create_database_connection(&self.output_path)?;

        info!("Running migrations to create schema");
        run_migrations(&mut conn)?;

        Ok(())
    }

    /// Upsert one catalog row per book. Chapter and verse counts are
    /// computed from the parsed data, not trusted from input.
    pub fn insert_books(
        &self,
        conn: &mut SqliteConnection,
        corpus: &[ParsedBook],
    ) -> Result<usize> {
        info!("Inserting books");

        for parsed in corpus {
            let book = &parsed.book;
            let chapter_count = parsed.chapter_count();
            let verse_count = parsed.verses.len() as i32;

            let new_book = NewBook {
                id: book.id,
                name_telugu: &book.name_telugu,
                name_english: &book.name_english,
                testament: book.testament.as_str(),
                chapter_count,
                verse_count,
            };

            diesel::replace_into(books::table)
                .values(&new_book)
                .execute(conn)
                .with_context(|| format!("Failed to insert book {}", book.name_english))?;

            info!(
                "{} ({} verses, {} chapters)",
                book.name_english, verse_count, chapter_count
            );
        }

        Ok(corpus.len())
    }

    pub fn insert_verses(
        &self,
        conn: &mut SqliteConnection,
        corpus: &[ParsedBook],
    ) -> Result<usize> {
        info!("Inserting verses");

        let total: usize = corpus.iter().map(|b| b.verses.len()).sum();
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );

        let inserted = conn.transaction::<_, anyhow::Error, _>(|conn| {
            let mut inserted = 0usize;
            let mut batch: Vec<NewVerse> = Vec::with_capacity(VERSE_BATCH_SIZE);

            for parsed in corpus {
                for record in &parsed.verses {
                    batch.push(NewVerse {
                        book_id: record.book_id,
                        chapter: record.chapter,
                        verse: record.verse,
                        text: &record.text,
                    });

                    if batch.len() >= VERSE_BATCH_SIZE {
                        inserted += diesel::insert_into(verses::table)
                            .values(&batch)
                            .execute(conn)?;
                        pb.set_position(inserted as u64);
                        batch.clear();
                    }
                }
            }

            if !batch.is_empty() {
                inserted += diesel::insert_into(verses::table)
                    .values(&batch)
                    .execute(conn)?;
                pb.set_position(inserted as u64);
            }

            Ok(inserted)
        })?;

        pb.finish_with_message(format!("{} verses", inserted));
        Ok(inserted)
    }

    /// Refresh planner statistics, rebuild the FTS index from the verse
    /// table, and compact the file. The rebuild is a resync safety net;
    /// the triggers already keep the index current.
    pub fn optimize(&self, conn: &mut SqliteConnection) -> Result<()> {
        info!("Optimizing store");

        sql_query("ANALYZE")
            .execute(conn)
            .context("ANALYZE failed")?;

        sql_query("INSERT INTO verses_fts(verses_fts) VALUES('rebuild')")
            .execute(conn)
            .context("Full-text index rebuild failed")?;

        sql_query("VACUUM")
            .execute(conn)
            .context("VACUUM failed")?;

        Ok(())
    }

    pub fn run(&mut self, corpus: &[ParsedBook]) -> Result<StoreStatistics> {
        info!("Starting store build");

        self.create_database()?;

        {
            let mut conn = create_database_connection(&self.output_path)?;
            let book_count = self.insert_books(&mut conn, corpus)?;
            let verse_count = self.insert_verses(&mut conn, corpus)?;
            info!("Inserted {} books, {} verses", book_count, verse_count);
            self.optimize(&mut conn)?;
            // Connection drops here, before the statistics read below.
        }

        let stats = {
            let mut conn = create_database_connection(&self.output_path)?;
            store_statistics(&mut conn, &self.output_path)?
        };

        info!("Store build completed");
        Ok(stats)
    }
}
