//! SQLite backend for local runs and tests

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::Executor;
use tracing::{debug, info};

use crate::store::ACQUIRE_TIMEOUT;
use crate::{Cat, Result, RowStore};

/// Writers queue on the database lock instead of failing immediately
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Pooled connection to a SQLite database file
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open a pool of at most `max_connections` connections, creating the file if needed
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await?;

        info!(url, max_connections, "Connected to SQLite");
        Ok(Self { pool })
    }

    /// Drop and recreate the `cats` table
    pub async fn reset(&self) -> Result<()> {
        self.drop_table().await?;
        self.pool
            .execute(
                "CREATE TABLE cats (id INTEGER PRIMARY KEY AUTOINCREMENT, \
                 name VARCHAR(20), species VARCHAR(20))",
            )
            .await?;
        debug!("Created table cats");
        Ok(())
    }

    /// Drop the `cats` table if it exists
    pub async fn drop_table(&self) -> Result<()> {
        self.pool.execute("DROP TABLE IF EXISTS cats").await?;
        Ok(())
    }
}

#[async_trait]
impl RowStore for SqliteStore {
    async fn insert(&self, cat: &Cat) -> Result<()> {
        sqlx::query("INSERT INTO cats (name, species) VALUES (?, ?)")
            .bind(&cat.name)
            .bind(&cat.species)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<Cat>> {
        let cats = sqlx::query_as::<_, Cat>("SELECT name, species FROM cats ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(cats)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
