use crate::config::{POOL_MAX_CONNECTIONS, POOL_MIN_CONNECTIONS};
use crate::error::InventoryError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tokio::sync::OnceCell;
use tracing::info;

pub type SqlitePool = Pool<Sqlite>;

/// Builds the process-wide connection pool on first use.
///
/// Concurrent first callers wait on the same initialization, so exactly one pool is
/// ever created. A failed attempt leaves the cell empty and the next caller retries.
pub struct PoolProvisioner {
    connect_opts: SqliteConnectOptions,
    pool: OnceCell<SqlitePool>,
}

impl PoolProvisioner {
    pub fn new(database_url: &str) -> Result<Self, InventoryError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        Ok(Self {
            connect_opts,
            pool: OnceCell::new(),
        })
    }

    pub async fn pool(&self) -> Result<&SqlitePool, InventoryError> {
        let pool = self
            .pool
            .get_or_try_init(|| async {
                let pool = SqlitePoolOptions::new()
                    .min_connections(POOL_MIN_CONNECTIONS)
                    .max_connections(POOL_MAX_CONNECTIONS)
                    .connect_with(self.connect_opts.clone())
                    .await?;
                info!(
                    min = POOL_MIN_CONNECTIONS,
                    max = POOL_MAX_CONNECTIONS,
                    "database pool created"
                );
                Ok::<_, sqlx::Error>(pool)
            })
            .await?;
        Ok(pool)
    }

    #[cfg(test)]
    fn is_initialized(&self) -> bool {
        self.pool.initialized()
    }

    /// Closes the pool if it was ever created.
    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
        }
    }
}
