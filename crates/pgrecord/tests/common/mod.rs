#![allow(dead_code)]

use std::sync::Mutex;

use pgrecord::tokio_postgres::types::ToSql;
use pgrecord::{GenericClient, OrmError, OrmResult, PlaceholderStyle};

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub sql: String,
    pub params: Vec<String>,
}

/// In-memory client: records every statement and answers with canned results.
pub struct RecordingClient {
    pub style: PlaceholderStyle,
    pub generated_key: Option<i64>,
    pub affected: u64,
    pub fail: bool,
    pub calls: Mutex<Vec<Call>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self {
            style: PlaceholderStyle::Question,
            generated_key: Some(42),
            affected: 1,
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn dollar() -> Self {
        Self {
            style: PlaceholderStyle::Dollar,
            ..Self::new()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_sql(&self) -> Option<String> {
        self.calls().last().map(|c| c.sql.clone())
    }

    fn record(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<()> {
        self.calls.lock().unwrap().push(Call {
            sql: sql.to_string(),
            params: params.iter().map(|p| format!("{p:?}")).collect(),
        });
        if self.fail {
            return Err(OrmError::execution("connection refused"));
        }
        Ok(())
    }
}

impl GenericClient for RecordingClient {
    fn placeholder_style(&self) -> PlaceholderStyle {
        self.style
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<u64> {
        self.record(sql, params)?;
        Ok(self.affected)
    }

    async fn execute_returning_key(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
        _key_column: &str,
    ) -> OrmResult<Option<i64>> {
        self.record(sql, params)?;
        Ok(self.generated_key)
    }
}
