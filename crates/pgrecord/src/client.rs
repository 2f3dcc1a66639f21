//! Generic client trait: the connection provider consumed by the entity operations.

use crate::error::{OrmError, OrmResult};
use crate::statement::PlaceholderStyle;
use tokio_postgres::Row;
use tokio_postgres::types::{ToSql, Type};

/// A trait that unifies database clients and transactions.
///
/// Entity operations take `&impl GenericClient`, so the same call works on a
/// plain connection, a pooled connection, a transaction, or a test double.
pub trait GenericClient: Send + Sync {
    /// Placeholder style this client expects in SQL text.
    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Dollar
    }

    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send;

    /// Execute a statement and return the number of affected rows, associating a tag for
    /// observability.
    ///
    /// The default implementation ignores `tag` and calls [`GenericClient::execute`].
    fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send {
        let _ = tag;
        self.execute(sql, params)
    }

    /// Execute an INSERT and return the database-generated value of `key_column`.
    ///
    /// Returns `Ok(None)` when the statement produced no row.
    fn execute_returning_key(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
        key_column: &str,
    ) -> impl std::future::Future<Output = OrmResult<Option<i64>>> + Send;
}

/// Append `RETURNING <key_column>` to an INSERT.
pub(crate) fn returning_sql(sql: &str, key_column: &str) -> String {
    format!("{sql} RETURNING {key_column}")
}

/// Read the generated key from the first column of a `RETURNING` row.
pub(crate) fn generated_key(row: &Row, key_column: &str) -> OrmResult<i64> {
    let Some(column) = row.columns().first() else {
        return Err(OrmError::decode(key_column, "RETURNING produced no columns"));
    };

    let decode = |e: tokio_postgres::Error| OrmError::decode(key_column, e.to_string());
    match *column.type_() {
        Type::INT2 => row.try_get::<_, i16>(0).map(i64::from).map_err(decode),
        Type::INT4 => row.try_get::<_, i32>(0).map(i64::from).map_err(decode),
        Type::INT8 => row.try_get::<_, i64>(0).map_err(decode),
        ref other => Err(OrmError::decode(
            key_column,
            format!("generated key has non-integer type {other}"),
        )),
    }
}

impl GenericClient for tokio_postgres::Client {
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<u64> {
        tokio_postgres::Client::execute(self, sql, params)
            .await
            .map_err(OrmError::from_db_error)
    }

    async fn execute_returning_key(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
        key_column: &str,
    ) -> OrmResult<Option<i64>> {
        let sql = returning_sql(sql, key_column);
        let row = tokio_postgres::Client::query_opt(self, &sql, params)
            .await
            .map_err(OrmError::from_db_error)?;
        row.map(|row| generated_key(&row, key_column)).transpose()
    }
}

impl GenericClient for tokio_postgres::Transaction<'_> {
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<u64> {
        tokio_postgres::Transaction::execute(self, sql, params)
            .await
            .map_err(OrmError::from_db_error)
    }

    async fn execute_returning_key(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
        key_column: &str,
    ) -> OrmResult<Option<i64>> {
        let sql = returning_sql(sql, key_column);
        let row = tokio_postgres::Transaction::query_opt(self, &sql, params)
            .await
            .map_err(OrmError::from_db_error)?;
        row.map(|row| generated_key(&row, key_column)).transpose()
    }
}

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::Client {
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<u64> {
        // Delegate to the deref target (ClientWrapper / tokio_postgres::Client).
        GenericClient::execute(&***self, sql, params).await
    }

    async fn execute_returning_key(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
        key_column: &str,
    ) -> OrmResult<Option<i64>> {
        GenericClient::execute_returning_key(&***self, sql, params, key_column).await
    }
}

#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::Transaction<'_> {
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<u64> {
        GenericClient::execute(&**self, sql, params).await
    }

    async fn execute_returning_key(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
        key_column: &str,
    ) -> OrmResult<Option<i64>> {
        GenericClient::execute_returning_key(&**self, sql, params, key_column).await
    }
}

// ===== Reference implementation =====

impl<C: GenericClient> GenericClient for &C {
    fn placeholder_style(&self) -> PlaceholderStyle {
        (*self).placeholder_style()
    }

    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send {
        (*self).execute(sql, params)
    }

    fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send {
        (*self).execute_tagged(tag, sql, params)
    }

    fn execute_returning_key(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
        key_column: &str,
    ) -> impl std::future::Future<Output = OrmResult<Option<i64>>> + Send {
        (*self).execute_returning_key(sql, params, key_column)
    }
}
