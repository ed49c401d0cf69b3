//! Failover State - Row store client for the failover stress harness
//!
//! This crate owns everything that talks to the database under test.
//!
//! ## Components
//!
//! - **store**: the `RowStore` trait shared by all backends, and backend selection
//! - **mysql**: MySQL-compatible backend, the clustered target of a stress run
//! - **sqlite**: SQLite backend for local runs and tests
//! - **cat**: the synthetic row type and its random name generator
//! - **error**: Store-specific error types
//!
//! ## Example
//!
//! ```ignore
//! use failover_state::{Cat, RowStore, SqliteStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteStore::connect("sqlite:stress.db", 4).await?;
//!     store.reset().await?;
//!
//!     store.insert(&Cat::random()).await?;
//!     assert_eq!(store.read_all().await?.len(), 1);
//!
//!     Ok(())
//! }
//! ```

pub mod cat;
pub mod error;
pub mod mysql;
pub mod sqlite;
pub mod store;

// Re-exports for convenience
pub use cat::{Cat, MAX_FIELD_LEN};
pub use error::{Result, StoreError};
pub use mysql::MySqlStore;
pub use sqlite::SqliteStore;
pub use store::{Backend, RowStore};
