//! SQL tracing for any [`GenericClient`].
//!
//! [`TracingClient`] logs each statement through `tracing` before it runs and
//! logs the outcome and elapsed time after:
//!
//! ```ignore
//! use pgrecord::{Model, TraceConfig, TracingClient};
//! use tracing::Level;
//!
//! let client = TracingClient::new(pool.get().await?)
//!     .with_config(TraceConfig::new().level(Level::INFO).max_sql_length(120));
//! person.create(&client).await?;
//! ```

use crate::client::GenericClient;
use crate::error::OrmResult;
use crate::statement::PlaceholderStyle;
use std::time::Instant;
use tokio_postgres::types::ToSql;
use tracing::Level;

/// Configuration for [`TracingClient`].
#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Include bind values in the event.
    pub log_params: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
            log_params: false,
        }
    }
}

impl TraceConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Log bind values along with the SQL.
    pub fn log_params(mut self, enabled: bool) -> Self {
        self.log_params = enabled;
        self
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }
}

/// Cut `sql` to at most `max_bytes`, backing off to a char boundary.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

/// A [`GenericClient`] wrapper that traces every statement it executes.
pub struct TracingClient<C> {
    inner: C,
    config: TraceConfig,
}

impl<C: GenericClient> TracingClient<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            config: TraceConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TraceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    fn before(&self, tag: &str, sql: &str, params: &[&(dyn ToSql + Sync)]) {
        let sql = self.config.truncate_sql(sql);
        let param_count = params.len();
        if self.config.log_params {
            emit_at_level!(
                self.config.level,
                target: "pgrecord.sql",
                tag,
                param_count,
                sql = %sql,
                params = ?params,
            );
        } else {
            emit_at_level!(
                self.config.level,
                target: "pgrecord.sql",
                tag,
                param_count,
                sql = %sql,
            );
        }
    }

    fn after<T: std::fmt::Debug>(&self, tag: &str, started: Instant, result: &OrmResult<T>) {
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        match result {
            Ok(value) => emit_at_level!(
                self.config.level,
                target: "pgrecord.sql",
                tag,
                elapsed_ms,
                result = ?value,
                "statement completed"
            ),
            Err(error) => tracing::warn!(
                target: "pgrecord.sql",
                tag,
                elapsed_ms,
                error = %error,
                "statement failed"
            ),
        }
    }
}

impl<C: GenericClient> GenericClient for TracingClient<C> {
    fn placeholder_style(&self) -> PlaceholderStyle {
        self.inner.placeholder_style()
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<u64> {
        self.execute_tagged("-", sql, params).await
    }

    async fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> OrmResult<u64> {
        self.before(tag, sql, params);
        let started = Instant::now();
        let result = self.inner.execute_tagged(tag, sql, params).await;
        self.after(tag, started, &result);
        result
    }

    async fn execute_returning_key(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
        key_column: &str,
    ) -> OrmResult<Option<i64>> {
        self.before("returning_key", sql, params);
        let started = Instant::now();
        let result = self
            .inner
            .execute_returning_key(sql, params, key_column)
            .await;
        self.after("returning_key", started, &result);
        result
    }
}
