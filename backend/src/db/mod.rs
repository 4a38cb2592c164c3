pub mod models;
pub mod schema;

use std::path::Path;

use anyhow::{Context, Error as AnyhowError, Result};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

pub const STORE_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/store");

pub type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;
pub type StoreConn = PooledConnection<ConnectionManager<SqliteConnection>>;

pub fn establish_connection(db_path: &Path) -> Result<SqliteConnection> {
    let db_url = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid database path"))?;

    SqliteConnection::establish(db_url)
        .with_context(|| format!("Failed to connect to database: {}", db_url))
}

/// Apply any pending schema migrations. Safe to call against an
/// already-migrated store; the harness tracks what has been applied.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<()> {
    conn.run_pending_migrations(STORE_MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to execute pending database migrations: {}", e))?;
    Ok(())
}

/// Read-side handle over a built store. Refuses to open a path the
/// builder has not produced yet.
#[derive(Debug)]
pub struct StoreHandle {
    pool: SqlitePool,
}

impl StoreHandle {
    pub fn open(db_path: &Path) -> Result<Self> {
        if !db_path.exists() {
            anyhow::bail!("Store file not found: {}", db_path.display());
        }

        let db_url = db_path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid database path"))?;

        let manager = ConnectionManager::new(db_url);
        let pool = Pool::builder()
            .max_size(5)
            .build(manager)
            .with_context(|| format!("Failed to create pool for: {}", db_url))?;

        Ok(Self { pool })
    }

    pub fn get_conn(&self) -> Result<StoreConn> {
        self.pool.get().map_err(AnyhowError::from)
    }
}
