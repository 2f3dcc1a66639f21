//! Entity persistence: `create`, `save` and `delete`.
//!
//! Every [`Entity`] gets these operations through a blanket impl of [`Model`].
//! Each call builds one statement, runs it on the client passed in, and returns
//! the outcome. Failures are logged under the `pgrecord.model` target and
//! returned to the caller.
//!
//! ```ignore
//! use pgrecord::{Entity, Model};
//!
//! let mut person = Person { id: None, name: "alice".into(), age: 30 };
//! person.create(&client).await?;          // INSERT ... RETURNING id
//! person.age = 31;
//! person.save(&client).await?;            // UPDATE persons SET ... WHERE id = $3
//! person.delete(&client).await?;          // DELETE FROM persons WHERE id = $1
//! ```

use crate::attribute::is_integer_type;
use crate::client::GenericClient;
use crate::entity::Entity;
use crate::error::{OrmError, OrmResult};
use crate::extract::extract;
use crate::statement::{self, Statement, StatementKind};

/// Insert, update and delete for an entity.
pub trait Model: Entity + Send + Sync + Sized {
    /// Insert this entity as a new row.
    ///
    /// The primary key is left out of the column list. When
    /// [`Entity::KEY_TYPE`] names an integer type, the database-generated value
    /// is read back and stored with [`Entity::set_primary_key`]; it is also
    /// returned. On any failure the entity is not modified.
    fn create(
        &mut self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = OrmResult<Option<i64>>> + Send {
        async move {
            let table = Self::table_name();
            let result = create_row(self, &table, conn).await;
            log_outcome::<Self, _>(StatementKind::Insert, &table, &result);
            result
        }
    }

    /// Update every non-key column of this entity's row.
    ///
    /// Fails with [`OrmError::MissingKey`] before touching the database if the
    /// primary key is unset. Returns the affected row count; zero rows is not an
    /// error.
    fn save(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send {
        async move {
            let table = Self::table_name();
            let result = save_row(self, &table, conn).await;
            log_outcome::<Self, _>(StatementKind::Update, &table, &result);
            result
        }
    }

    /// Delete this entity's row by primary key.
    ///
    /// Fails with [`OrmError::MissingKey`] before touching the database if the
    /// primary key is unset.
    fn delete(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send {
        async move {
            let table = Self::table_name();
            let result = delete_row(self, &table, conn).await;
            log_outcome::<Self, _>(StatementKind::Delete, &table, &result);
            result
        }
    }
}

impl<E: Entity + Send + Sync> Model for E {}

async fn create_row<E: Entity + Send + Sync>(
    entity: &mut E,
    table: &str,
    conn: &impl GenericClient,
) -> OrmResult<Option<i64>> {
    let extraction = extract(entity, false)?;
    let generated = is_integer_type(E::KEY_TYPE);
    let key_column = match &extraction.primary_key {
        Some(key) => key.name,
        None if generated => {
            return Err(OrmError::reflection(
                E::TYPE_NAME,
                E::PRIMARY_KEY,
                "no attribute maps to the primary key",
            ));
        }
        None => E::PRIMARY_KEY,
    };

    let stmt = statement::insert(table, extraction.attributes)?;
    let sql = render(&stmt, conn);
    trace_statement::<E>(&stmt, &sql);

    if !generated {
        conn.execute_tagged(tag(&stmt), &sql, &stmt.params_ref())
            .await?;
        return Ok(None);
    }

    let key = conn
        .execute_returning_key(&sql, &stmt.params_ref(), key_column)
        .await?;
    if let Some(key) = key {
        entity.set_primary_key(key)?;
    }
    Ok(key)
}

async fn save_row<E: Entity + Send + Sync>(
    entity: &E,
    table: &str,
    conn: &impl GenericClient,
) -> OrmResult<u64> {
    let extraction = extract(entity, true)?;
    let stmt = statement::update(table, E::PRIMARY_KEY, extraction.attributes)?;
    let sql = render(&stmt, conn);
    trace_statement::<E>(&stmt, &sql);
    conn.execute_tagged(tag(&stmt), &sql, &stmt.params_ref())
        .await
}

async fn delete_row<E: Entity + Send + Sync>(
    entity: &E,
    table: &str,
    conn: &impl GenericClient,
) -> OrmResult<u64> {
    let key = entity
        .primary_key_value()
        .ok_or_else(|| OrmError::missing_key(table, E::PRIMARY_KEY))?;
    let stmt = statement::delete(table, E::PRIMARY_KEY, key)?;
    let sql = render(&stmt, conn);
    trace_statement::<E>(&stmt, &sql);
    conn.execute_tagged(tag(&stmt), &sql, &stmt.params_ref())
        .await
}

fn render(stmt: &Statement, conn: &impl GenericClient) -> String {
    stmt.to_sql(conn.placeholder_style())
}

fn tag(stmt: &Statement) -> &'static str {
    stmt.kind().as_str()
}

fn trace_statement<E: Entity>(stmt: &Statement, sql: &str) {
    tracing::debug!(
        target: "pgrecord.model",
        op = stmt.kind().as_str(),
        table = stmt.table(),
        entity = E::TYPE_NAME,
        param_count = stmt.params().len(),
        sql,
        "executing"
    );
}

fn log_outcome<E: Entity, T: std::fmt::Debug>(
    kind: StatementKind,
    table: &str,
    result: &OrmResult<T>,
) {
    match result {
        Ok(value) => tracing::debug!(
            target: "pgrecord.model",
            op = kind.as_str(),
            table,
            entity = E::TYPE_NAME,
            result = ?value,
            "done"
        ),
        Err(OrmError::MissingKey { key, .. }) => tracing::error!(
            target: "pgrecord.model",
            op = kind.as_str(),
            table,
            entity = E::TYPE_NAME,
            key = key.as_str(),
            "primary key cannot be null"
        ),
        Err(error) => tracing::error!(
            target: "pgrecord.model",
            op = kind.as_str(),
            table,
            entity = E::TYPE_NAME,
            kind = ?error.kind(),
            error = %error,
            "operation failed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Attribute;
    use crate::param::Param;
    use crate::statement::PlaceholderStyle;
    use std::sync::Mutex;
    use tokio_postgres::types::ToSql;

    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        tag: Option<String>,
        sql: String,
        params: Vec<String>,
    }

    /// Records every statement and answers with canned results.
    struct RecordingClient {
        style: PlaceholderStyle,
        generated_key: Option<i64>,
        fail: bool,
        calls: Mutex<Vec<Call>>,
    }

    impl RecordingClient {
        fn new() -> Self {
            Self {
                style: PlaceholderStyle::Question,
                generated_key: Some(42),
                fail: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }

        fn record(&self, tag: Option<&str>, sql: &str, params: &[&(dyn ToSql + Sync)]) {
            self.calls.lock().unwrap().push(Call {
                tag: tag.map(str::to_string),
                sql: sql.to_string(),
                params: params.iter().map(|p| format!("{p:?}")).collect(),
            });
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl GenericClient for RecordingClient {
        fn placeholder_style(&self) -> PlaceholderStyle {
            self.style
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
            self.record(Some(tag), sql, params);
            if self.fail {
                return Err(OrmError::execution("connection reset"));
            }
            Ok(1)
        }

        async fn execute_returning_key(
            &self,
            sql: &str,
            params: &[&(dyn ToSql + Sync)],
            _key_column: &str,
        ) -> OrmResult<Option<i64>> {
            self.record(None, sql, params);
            if self.fail {
                return Err(OrmError::execution("connection reset"));
            }
            Ok(self.generated_key)
        }
    }

    #[derive(Debug)]
    struct Person {
        id: Option<i32>,
        name: String,
        age: i32,
    }

    impl Entity for Person {
        const TYPE_NAME: &'static str = "Person";

        fn attributes(&self) -> Vec<Attribute> {
            vec![
                Attribute::new("id", "i32", Param::nullable(self.id)),
                Attribute::new("name", "String", Param::new(self.name.clone())),
                Attribute::new("age", "i32", Param::new(self.age)),
            ]
        }

        fn primary_key_value(&self) -> Option<Param> {
            self.id.map(Param::new)
        }

        fn set_primary_key(&mut self, key: i64) -> OrmResult<()> {
            let key = i32::try_from(key)
                .map_err(|e| OrmError::reflection(Self::TYPE_NAME, "id", e.to_string()))?;
            self.id = Some(key);
            Ok(())
        }
    }

    /// A text-keyed entity: keys are never generated.
    struct Tag {
        code: String,
        label: String,
    }

    impl Entity for Tag {
        const TYPE_NAME: &'static str = "Tag";
        const PRIMARY_KEY: &'static str = "code";
        const KEY_TYPE: &'static str = "String";

        fn attributes(&self) -> Vec<Attribute> {
            vec![
                Attribute::new("code", "String", Param::new(self.code.clone())),
                Attribute::new("label", "String", Param::new(self.label.clone())),
            ]
        }

        fn primary_key_value(&self) -> Option<Param> {
            Some(Param::new(self.code.clone()))
        }

        fn set_primary_key(&mut self, _key: i64) -> OrmResult<()> {
            Err(OrmError::reflection(Self::TYPE_NAME, "code", "text keys are not generated"))
        }
    }

    /// Maps no key attribute at all.
    struct Event {
        kind: String,
    }

    impl Entity for Event {
        const TYPE_NAME: &'static str = "Event";

        fn attributes(&self) -> Vec<Attribute> {
            vec![Attribute::new("kind", "String", Param::new(self.kind.clone()))]
        }

        fn primary_key_value(&self) -> Option<Param> {
            None
        }

        fn set_primary_key(&mut self, _key: i64) -> OrmResult<()> {
            Err(OrmError::reflection(Self::TYPE_NAME, "id", "no key field"))
        }
    }

    /// Integer key assigned by the application, declared through `KEY_TYPE`.
    struct Invoice {
        number: Option<i64>,
        total: i64,
    }

    impl Entity for Invoice {
        const TYPE_NAME: &'static str = "Invoice";
        const PRIMARY_KEY: &'static str = "number";
        const KEY_TYPE: &'static str = "assigned";

        fn attributes(&self) -> Vec<Attribute> {
            vec![
                Attribute::new("number", "i64", Param::nullable(self.number)),
                Attribute::new("total", "i64", Param::new(self.total)),
            ]
        }

        fn primary_key_value(&self) -> Option<Param> {
            self.number.map(Param::new)
        }

        fn set_primary_key(&mut self, key: i64) -> OrmResult<()> {
            self.number = Some(key);
            Ok(())
        }
    }

    fn alice(id: Option<i32>) -> Person {
        Person {
            id,
            name: "alice".into(),
            age: 30,
        }
    }

    #[tokio::test]
    async fn create_writes_back_generated_key() {
        let client = RecordingClient::new();
        let mut person = alice(None);

        let key = person.create(&client).await.unwrap();

        assert_eq!(key, Some(42));
        assert_eq!(person.id, Some(42));
        assert_eq!(
            client.calls(),
            vec![Call {
                tag: None,
                sql: "INSERT INTO persons (name, age) VALUES (?, ?)".into(),
                params: vec!["\"alice\"".into(), "30".into()],
            }]
        );
    }

    #[tokio::test]
    async fn create_failure_leaves_key_unset() {
        let client = RecordingClient::failing();
        let mut person = alice(None);

        let err = person.create(&client).await.unwrap_err();

        assert!(err.is_execution());
        assert_eq!(person.id, None);
    }

    #[tokio::test]
    async fn create_with_key_overflow_is_reflection_error() {
        let client = RecordingClient {
            generated_key: Some(i64::MAX),
            ..RecordingClient::new()
        };
        let mut person = alice(None);

        let err = person.create(&client).await.unwrap_err();

        assert!(err.is_reflection());
        assert_eq!(person.id, None);
    }

    #[tokio::test]
    async fn create_without_integer_key_skips_read_back() {
        let client = RecordingClient::new();
        let mut tag = Tag {
            code: "rust".into(),
            label: "Rust".into(),
        };

        let key = tag.create(&client).await.unwrap();

        assert_eq!(key, None);
        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tag.as_deref(), Some("insert"));
        assert_eq!(calls[0].sql, "INSERT INTO tags (label) VALUES (?)");
    }

    #[tokio::test]
    async fn save_binds_key_last() {
        let client = RecordingClient::new();
        let person = alice(Some(7));

        let rows = person.save(&client).await.unwrap();

        assert_eq!(rows, 1);
        assert_eq!(
            client.calls(),
            vec![Call {
                tag: Some("update".into()),
                sql: "UPDATE persons SET name = ?, age = ? WHERE id = ?".into(),
                params: vec!["\"alice\"".into(), "30".into(), "Some(7)".into()],
            }]
        );
    }

    #[tokio::test]
    async fn save_without_key_issues_no_sql() {
        let client = RecordingClient::new();
        let person = alice(None);

        let err = person.save(&client).await.unwrap_err();

        assert!(err.is_missing_key());
        assert!(client.calls().is_empty());
        assert_eq!(person.id, None);
    }

    #[tokio::test]
    async fn delete_binds_key() {
        let client = RecordingClient {
            style: PlaceholderStyle::Dollar,
            ..RecordingClient::new()
        };
        let person = alice(Some(7));

        person.delete(&client).await.unwrap();

        assert_eq!(
            client.calls(),
            vec![Call {
                tag: Some("delete".into()),
                sql: "DELETE FROM persons WHERE id = $1".into(),
                params: vec!["7".into()],
            }]
        );
    }

    #[tokio::test]
    async fn delete_without_key_issues_no_sql() {
        let client = RecordingClient::new();
        let person = alice(None);

        let err = person.delete(&client).await.unwrap_err();

        assert!(err.is_missing_key());
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn delete_propagates_execution_failure() {
        let client = RecordingClient::failing();
        let err = alice(Some(7)).delete(&client).await.unwrap_err();
        assert!(err.is_execution());
    }

    #[tokio::test]
    async fn create_without_key_attribute_fails_before_sql() {
        let client = RecordingClient::new();
        let mut event = Event {
            kind: "signup".into(),
        };

        let err = event.create(&client).await.unwrap_err();

        assert!(err.is_reflection());
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn create_follows_declared_key_type() {
        let client = RecordingClient::new();
        let mut invoice = Invoice {
            number: Some(1001),
            total: 250,
        };

        let key = invoice.create(&client).await.unwrap();

        assert_eq!(key, None);
        assert_eq!(invoice.number, Some(1001));
        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tag.as_deref(), Some("insert"));
    }

    #[tokio::test]
    async fn save_propagates_execution_failure() {
        let client = RecordingClient::failing();
        let err = alice(Some(7)).save(&client).await.unwrap_err();
        assert!(err.is_execution());
        assert_eq!(client.calls().len(), 1);
    }
}
