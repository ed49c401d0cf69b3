//! MySQL-compatible backend
//!
//! The clustered database under test speaks the MySQL protocol. The server
//! URL carries no database; the harness creates its own database, runs
//! against it and drops it afterwards.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlPool, MySqlPoolOptions};
use sqlx::{ConnectOptions, Connection, Executor};
use tracing::{debug, info};

use crate::store::{validate_identifier, ACQUIRE_TIMEOUT};
use crate::{Cat, Result, RowStore};

/// Pooled connection to one database on a MySQL server
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    /// Open a pool of at most `max_connections` connections to `database`
    pub async fn connect(server_url: &str, database: &str, max_connections: u32) -> Result<Self> {
        validate_identifier(database)?;
        let options = MySqlConnectOptions::from_str(server_url)?.database(database);
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await?;

        // Fail setup on an unreachable server rather than at the first insert
        pool.acquire().await?.ping().await?;

        info!(database, max_connections, "Connected to MySQL");
        Ok(Self { pool })
    }

    /// Create `database` on the server
    pub async fn create_database(server_url: &str, database: &str) -> Result<()> {
        validate_identifier(database)?;
        admin_execute(server_url, &format!("CREATE DATABASE `{}`", database)).await?;
        info!(database, "Created database");
        Ok(())
    }

    /// Drop `database` from the server if it exists
    pub async fn drop_database(server_url: &str, database: &str) -> Result<()> {
        validate_identifier(database)?;
        admin_execute(server_url, &format!("DROP DATABASE IF EXISTS `{}`", database)).await?;
        info!(database, "Dropped database");
        Ok(())
    }

    /// Create the `cats` table
    pub async fn create_table(&self) -> Result<()> {
        self.pool
            .execute(
                "CREATE TABLE cats (id INT PRIMARY KEY AUTO_INCREMENT, \
                 name VARCHAR(20), species VARCHAR(20))",
            )
            .await?;
        debug!("Created table cats");
        Ok(())
    }
}

/// Run one statement on a short-lived connection with no database selected
async fn admin_execute(server_url: &str, sql: &str) -> Result<()> {
    let options = MySqlConnectOptions::from_str(server_url)?;
    let mut conn: MySqlConnection = options.connect().await?;
    conn.execute(sql).await?;
    conn.close().await?;
    Ok(())
}

#[async_trait]
impl RowStore for MySqlStore {
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
