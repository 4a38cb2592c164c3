use std::path::{Path, PathBuf};
use std::process::exit;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing::{info, warn};

use grantham_backend::books::BOOK_REGISTRY;
use grantham_backend::corpus;
use grantham_backend::db::StoreHandle;
use grantham_backend::queries::{self, VerseSelector};
use grantham_backend::{DEFAULT_STORE_PATH, SEARCH_PAGE_LEN, logger};

use grantham_cli::bootstrap::StoreBootstrap;
use grantham_cli::usfm::UsfmParser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Telugu Bible corpus tools", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the built verse store, used by the query and show
    /// commands.
    #[arg(long, global = true, value_name = "FILE_PATH", env = "GRANTHAM_DB", default_value = DEFAULT_STORE_PATH)]
    store_path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a directory of USFM source files into a corpus JSON file
    #[command(arg_required_else_help = true)]
    Parse {
        /// Directory containing .usfm source files
        #[arg(value_name = "SOURCE_DIR")]
        source_dir: PathBuf,

        /// Where to write the parsed corpus
        #[arg(value_name = "OUTPUT_FILE")]
        output_file: PathBuf,
    },

    /// Build the SQLite verse store from a parsed corpus file
    #[command(arg_required_else_help = true)]
    Build {
        /// Corpus JSON produced by the parse command
        #[arg(value_name = "INPUT_FILE")]
        input_file: PathBuf,

        /// Where to write the store
        #[arg(value_name = "STORE_PATH")]
        store_path: PathBuf,
    },

    /// Full-text search over verse text
    #[command(arg_required_else_help = true)]
    Query {
        /// The search query string
        query: String,

        /// Maximum number of results to print
        #[arg(long, default_value_t = SEARCH_PAGE_LEN)]
        limit: usize,
    },

    /// Look up verses by reference
    #[command(arg_required_else_help = true)]
    Show {
        /// Three-letter book code, e.g. GEN
        #[arg(value_name = "BOOK_CODE")]
        book_code: String,

        /// Chapter number
        chapter: i32,

        /// Verse or verse range, e.g. 3 or 3-7; whole chapter when omitted
        verses: Option<VerseSelector>,
    },
}

fn parse_sources(source_dir: &Path, output_file: &Path) -> Result<()> {
    let parser = UsfmParser::new(&BOOK_REGISTRY);
    let parse = parser.parse_directory(source_dir)?;

    if parse.books.is_empty() {
        anyhow::bail!("No books parsed from {}", source_dir.display());
    }

    corpus::save_corpus(&parse.books, output_file)?;

    info!(
        "Parsed {} books, {} verses",
        parse.books.len(),
        parse.total_verses()
    );
    info!("Corpus written to {}", output_file.display());

    Ok(())
}

fn build_store(input_file: &Path, store_path: &Path) -> Result<()> {
    let start = Instant::now();

    let corpus = corpus::load_corpus(input_file)?;
    info!("Loaded {} books from {}", corpus.len(), input_file.display());

    let mut bootstrap = StoreBootstrap::new(store_path.to_path_buf());
    let stats = match bootstrap.run(&corpus) {
        Ok(stats) => stats,
        Err(e) => {
            // A partially written store is not a valid artifact.
            if store_path.exists() {
                if let Err(rm) = std::fs::remove_file(store_path) {
                    warn!(
                        "Failed to remove incomplete store {}: {}",
                        store_path.display(),
                        rm
                    );
                }
            }
            return Err(e);
        }
    };

    info!("Books: {}", stats.books);
    info!("Total verses: {}", stats.verses);
    info!(
        "Old Testament: {} books, {} verses",
        stats.old_testament.books, stats.old_testament.verses
    );
    info!(
        "New Testament: {} books, {} verses",
        stats.new_testament.books, stats.new_testament.verses
    );
    info!("Store size: {:.2} MB", stats.file_size_mb);
    info!("Build took {}", logger::format_duration(start.elapsed()));

    Ok(())
}

fn query_verses(store_path: &Path, query: &str, limit: usize) -> Result<()> {
    let handle = StoreHandle::open(store_path)?;
    let conn = &mut handle.get_conn()?;

    let hits = queries::search_verses(conn, query, limit as i64, 0)?;
    let total = queries::search_hits_count(conn, query)?;

    for verse in &hits {
        let code = BOOK_REGISTRY
            .get_by_id(verse.book_id)
            .map(|b| b.code)
            .unwrap_or("???");
        println!("{} {}:{}  {}", code, verse.chapter, verse.verse, verse.text);
    }
    println!("{} of {} match(es)", hits.len(), total);

    Ok(())
}

fn show_reference(
    store_path: &Path,
    book_code: &str,
    chapter: i32,
    selector: Option<VerseSelector>,
) -> Result<()> {
    let code = book_code.trim().to_ascii_uppercase();
    let book = BOOK_REGISTRY
        .get_by_code(&code)
        .ok_or_else(|| anyhow::anyhow!("Unknown book code: {}", book_code))?;

    let handle = StoreHandle::open(store_path)?;
    let conn = &mut handle.get_conn()?;

    let verses = match selector {
        None => queries::get_chapter_verses(conn, book.id, chapter)?,
        Some(VerseSelector { start, end: None }) => queries::get_verse(conn, book.id, chapter, start)?
            .into_iter()
            .collect(),
        Some(VerseSelector { start, end: Some(end) }) => {
            queries::get_verse_range(conn, book.id, chapter, start, end)?
        }
    };

    if verses.is_empty() {
        anyhow::bail!("No verses found for {} {}", book.code, chapter);
    }

    for verse in &verses {
        println!("{} {}:{}  {}", book.code, verse.chapter, verse.verse, verse.text);
    }

    Ok(())
}

fn main() {
    // A missing .env file is fine; environment variables still apply.
    let _ = dotenv();

    if let Err(e) = logger::init_tracing() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    let command_result = match &cli.command {
        Commands::Parse { source_dir, output_file } => parse_sources(source_dir, output_file),

        Commands::Build { input_file, store_path } => build_store(input_file, store_path),

        Commands::Query { query, limit } => query_verses(&cli.store_path, query, *limit),

        Commands::Show { book_code, chapter, verses } => {
            show_reference(&cli.store_path, book_code, *chapter, *verses)
        }
    };

    if let Err(e) = command_result {
        eprintln!("Error executing command: {:#}", e);
        exit(1);
    }
}
