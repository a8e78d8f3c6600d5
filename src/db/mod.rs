//! Database module: pooled SQLite access for categories and products.
//!
//! Layout:
//! - `models.rs`: record types returned by queries
//! - `schema.rs`: SQL DDL run at startup
//! - `pool.rs`: lazily built, process-wide connection pool
//! - `sqlite.rs`: parameterized queries and row mapping

pub mod models;
pub mod pool;
pub mod schema;
pub mod sqlite;

#[cfg(test)]
pub(crate) mod test_support;

pub use models::{Category, Product};
pub use pool::{PoolProvisioner, SqlitePool};
pub use schema::SQLITE_INIT;
pub use sqlite::InventoryStorage;
