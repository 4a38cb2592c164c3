pub mod books;
pub mod corpus;
pub mod logger;
pub mod queries;

pub mod db;

/// Verse rows are written to the store in batches of this size.
pub static VERSE_BATCH_SIZE: usize = 1000;

pub static SEARCH_PAGE_LEN: usize = 50;

pub static DEFAULT_STORE_PATH: &str = "assets/bible.db";
