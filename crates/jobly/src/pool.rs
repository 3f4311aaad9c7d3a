//! Connection pool utilities

use crate::config::DbConfig;
use crate::error::{DbResult, JoblyError};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

/// Create a connection pool from a [`DbConfig`].
///
/// Uses `NoTls`; put TLS termination in front of the database if you need it.
///
/// # Example
///
/// ```ignore
/// let config = jobly::DbConfig::from_env()?;
/// let pool = jobly::create_pool(&config)?;
/// let client = pool.get().await?;
/// let jobs = jobly::Job::find_all(&client).await?;
/// ```
pub fn create_pool(config: &DbConfig) -> DbResult<Pool> {
    let pg_config: tokio_postgres::Config = config
        .database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| JoblyError::Connection(e.to_string()))?;

    let manager_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };
    let mgr = Manager::from_config(pg_config, NoTls, manager_config);
    Pool::builder(mgr)
        .max_size(config.max_pool_size)
        .build()
        .map_err(|e| JoblyError::Pool(e.to_string()))
}
