//! SQL logging and timeouts around any [`GenericClient`].
//!
//! [`TracedClient`] emits a `tracing` event for every statement under the
//! `jobly.sql` target: the SQL text (truncated), parameter count, row count or
//! affected-row count, and elapsed time. Statements slower than the configured
//! threshold are logged at `warn`.
//!
//! ```ignore
//! let config = DbConfig::from_env()?;
//! let client = TracedClient::from_config(pool.get().await?, &config);
//! let jobs = Job::find_filtered(&client, params).await?;
//! ```

use crate::client::GenericClient;
use crate::config::DbConfig;
use crate::error::{DbResult, JoblyError};
use std::time::{Duration, Instant};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

const DEFAULT_MAX_SQL_LENGTH: usize = 200;

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// A client wrapper that logs statements and optionally enforces a timeout.
#[derive(Debug, Clone)]
pub struct TracedClient<C> {
    client: C,
    slow_query_threshold: Option<Duration>,
    query_timeout: Option<Duration>,
    max_sql_length: usize,
}

impl<C: GenericClient> TracedClient<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            slow_query_threshold: None,
            query_timeout: None,
            max_sql_length: DEFAULT_MAX_SQL_LENGTH,
        }
    }

    /// Wrap `client` using the thresholds in `config`.
    pub fn from_config(client: C, config: &DbConfig) -> Self {
        Self {
            client,
            slow_query_threshold: config.slow_query_threshold(),
            query_timeout: config.query_timeout(),
            max_sql_length: config.log_sql_max_len,
        }
    }

    /// Log statements slower than `threshold` at `warn`.
    pub fn slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    /// Fail statements that run longer than `timeout` with [`JoblyError::Timeout`].
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    /// Truncate logged SQL to `len` bytes.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = len;
        self
    }

    pub fn inner(&self) -> &C {
        &self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }

    async fn with_timeout<T, F>(&self, future: F) -> DbResult<T>
    where
        F: std::future::Future<Output = DbResult<T>> + Send,
    {
        match self.query_timeout {
            Some(timeout) => tokio::time::timeout(timeout, future)
                .await
                .map_err(|_| JoblyError::Timeout(timeout))?,
            None => future.await,
        }
    }

    fn report(
        &self,
        sql: &str,
        param_count: usize,
        elapsed: Duration,
        rows: Option<u64>,
        error: Option<&JoblyError>,
    ) {
        let shown = truncate_sql_bytes(sql, self.max_sql_length);
        let truncated = shown.len() < sql.len();
        let error = error.map(tracing::field::display);
        let slow = self
            .slow_query_threshold
            .is_some_and(|threshold| elapsed >= threshold);

        if slow {
            tracing::warn!(
                target: "jobly.sql",
                sql = %shown,
                truncated,
                param_count,
                elapsed_ms = elapsed.as_millis() as u64,
                rows,
                error,
                "slow query"
            );
        } else {
            tracing::debug!(
                target: "jobly.sql",
                sql = %shown,
                truncated,
                param_count,
                elapsed_ms = elapsed.as_millis() as u64,
                rows,
                error,
                "query"
            );
        }
    }
}

impl<C: GenericClient> GenericClient for TracedClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<Vec<Row>> {
        let start = Instant::now();
        let result = self.with_timeout(self.client.query(sql, params)).await;
        let rows = result.as_ref().ok().map(|rows| rows.len() as u64);
        self.report(sql, params.len(), start.elapsed(), rows, result.as_ref().err());
        result
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<u64> {
        let start = Instant::now();
        let result = self.with_timeout(self.client.execute(sql, params)).await;
        self.report(
            sql,
            params.len(),
            start.elapsed(),
            result.as_ref().ok().copied(),
            result.as_ref().err(),
        );
        result
    }
}
