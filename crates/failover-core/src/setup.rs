//! Store setup and teardown around a run
//!
//! Every failure in here is fatal to the run.

use failover_state::{Backend, MySqlStore, RowStore, SqliteStore};
use std::sync::Arc;
use tracing::info;

use crate::{HarnessConfig, Result};

/// What has to be cleaned up once the run is over
enum Teardown {
    MySql {
        server_url: String,
        database: String,
    },
    Sqlite(SqliteStore),
}

/// A freshly created, empty `cats` table and the pool pointing at it
pub struct PreparedStore {
    store: Arc<dyn RowStore>,
    teardown: Teardown,
}

impl PreparedStore {
    /// Shared handle for the coordinator and its workers
    pub fn store(&self) -> Arc<dyn RowStore> {
        self.store.clone()
    }

    /// Drop the test database (or table) and close the pool
    ///
    /// With `keep` set only the pool is closed.
    pub async fn teardown(self, keep: bool) -> Result<()> {
        if let Teardown::Sqlite(sqlite) = &self.teardown {
            if !keep {
                sqlite.drop_table().await?;
            }
        }
        self.store.close().await;

        if let Teardown::MySql {
            server_url,
            database,
        } = &self.teardown
        {
            if !keep {
                MySqlStore::drop_database(server_url, database).await?;
            }
        }

        if keep {
            info!("Keeping test data in place");
        }
        Ok(())
    }
}

/// Create an empty `cats` table for the configured backend
///
/// MySQL gets a brand new database, dropped first if an earlier run left
/// it behind. SQLite gets its table recreated in the given file.
pub async fn prepare(config: &HarnessConfig) -> Result<PreparedStore> {
    let url = config.database_url.as_str();
    match Backend::from_url(url)? {
        Backend::MySql => {
            let database = config.database_name.as_str();
            MySqlStore::drop_database(url, database).await?;
            MySqlStore::create_database(url, database).await?;

            let store = MySqlStore::connect(url, database, config.max_connections).await?;
            store.create_table().await?;

            Ok(PreparedStore {
                store: Arc::new(store),
                teardown: Teardown::MySql {
                    server_url: url.to_string(),
                    database: database.to_string(),
                },
            })
        }
        Backend::Sqlite => {
            let store = SqliteStore::connect(url, config.max_connections).await?;
            store.reset().await?;

            Ok(PreparedStore {
                store: Arc::new(store.clone()),
                teardown: Teardown::Sqlite(store),
            })
        }
    }
}
