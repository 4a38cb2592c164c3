pub mod store;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use diesel::sqlite::SqliteConnection;

use grantham_backend::db;

pub use store::StoreBootstrap;

pub fn create_database_connection(db_path: &Path) -> Result<SqliteConnection> {
    db::establish_connection(db_path)
}

pub fn run_migrations(conn: &mut SqliteConnection) -> Result<()> {
    db::run_migrations(conn)
}

pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(())
}
