//! Single-row INSERT / UPDATE / DELETE statement building.
//!
//! Each builder walks the extracted attribute list exactly once and pushes the
//! column name and its bind value together, so the n-th placeholder always
//! binds the n-th column.
//!
//! ```ignore
//! use pgrecord::{extract, statement, PlaceholderStyle};
//!
//! let ex = extract(&person, false)?;
//! let stmt = statement::insert("persons", ex.attributes)?;
//! assert_eq!(stmt.sql(), "INSERT INTO persons (name, age) VALUES (?, ?)");
//! assert_eq!(
//!     stmt.to_sql(PlaceholderStyle::Dollar),
//!     "INSERT INTO persons (name, age) VALUES ($1, $2)"
//! );
//! ```

use crate::attribute::Attribute;
use crate::error::{OrmError, OrmResult};
use crate::ident;
use crate::param::{Param, ParamList};
use std::fmt::Write as _;
use tokio_postgres::types::ToSql;

/// How bind placeholders are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderStyle {
    /// `?` for every parameter.
    Question,
    /// `$1`, `$2`, ... (PostgreSQL).
    #[default]
    Dollar,
}

/// The kind of statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// A built statement: its shape plus the ordered bind values.
#[derive(Debug, Clone)]
pub struct Statement {
    kind: StatementKind,
    table: String,
    /// INSERT columns or UPDATE SET columns, in bind order.
    columns: Vec<&'static str>,
    /// WHERE column for UPDATE and DELETE.
    key_column: Option<String>,
    params: ParamList,
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Columns in bind order, excluding the WHERE key.
    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    /// Bind values in placeholder order.
    pub fn params(&self) -> &ParamList {
        &self.params
    }

    /// Bind values as references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.as_refs()
    }

    /// SQL with `?` placeholders.
    pub fn sql(&self) -> String {
        self.to_sql(PlaceholderStyle::Question)
    }

    /// SQL with the given placeholder style.
    pub fn to_sql(&self, style: PlaceholderStyle) -> String {
        let mut out = String::with_capacity(32 + self.columns.len() * 16);
        let mut next = 0_usize;
        let mut placeholder = |out: &mut String| {
            next += 1;
            match style {
                PlaceholderStyle::Question => out.push('?'),
                PlaceholderStyle::Dollar => {
                    let _ = write!(out, "${next}");
                }
            }
        };

        match self.kind {
            StatementKind::Insert => {
                out.push_str("INSERT INTO ");
                out.push_str(&self.table);
                if self.columns.is_empty() {
                    out.push_str(" DEFAULT VALUES");
                    return out;
                }
                out.push_str(" (");
                out.push_str(&self.columns.join(", "));
                out.push_str(") VALUES (");
                for i in 0..self.columns.len() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    placeholder(&mut out);
                }
                out.push(')');
            }
            StatementKind::Update => {
                out.push_str("UPDATE ");
                out.push_str(&self.table);
                out.push_str(" SET ");
                for (i, col) in self.columns.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(col);
                    out.push_str(" = ");
                    placeholder(&mut out);
                }
                self.write_where(&mut out, &mut placeholder);
            }
            StatementKind::Delete => {
                out.push_str("DELETE FROM ");
                out.push_str(&self.table);
                self.write_where(&mut out, &mut placeholder);
            }
        }

        out
    }

    fn write_where(&self, out: &mut String, placeholder: &mut impl FnMut(&mut String)) {
        if let Some(key) = &self.key_column {
            out.push_str(" WHERE ");
            out.push_str(key);
            out.push_str(" = ");
            placeholder(out);
        }
    }
}

/// Build `INSERT INTO <table> (<cols>) VALUES (<placeholders>)`.
///
/// Primary-key attributes are skipped; every other attribute becomes one
/// column and one bind value, in list order.
pub fn insert(table: &str, attributes: Vec<Attribute>) -> OrmResult<Statement> {
    ident::validate("table", table)?;

    let mut columns = Vec::with_capacity(attributes.len());
    let mut params = ParamList::with_capacity(attributes.len());
    for attr in attributes.into_iter().filter(|a| !a.is_primary_key) {
        ident::validate("column", attr.name)?;
        columns.push(attr.name);
        params.push(attr.value);
    }

    Ok(Statement {
        kind: StatementKind::Insert,
        table: table.to_string(),
        columns,
        key_column: None,
        params,
    })
}

/// Build `UPDATE <table> SET <col> = ?, ... WHERE <primary_key> = ?`.
///
/// The key value is bound last. Fails with [`OrmError::MissingKey`] when the
/// list holds no primary-key attribute or the key is `NULL`.
pub fn update(table: &str, primary_key: &str, attributes: Vec<Attribute>) -> OrmResult<Statement> {
    ident::validate("table", table)?;
    ident::validate("column", primary_key)?;

    let mut columns = Vec::with_capacity(attributes.len());
    let mut params = ParamList::with_capacity(attributes.len());
    let mut key: Option<Param> = None;
    for attr in attributes {
        if attr.is_primary_key {
            key = Some(attr.value);
            continue;
        }
        ident::validate("column", attr.name)?;
        columns.push(attr.name);
        params.push(attr.value);
    }

    let key = match key {
        Some(key) if !key.is_null() => key,
        _ => return Err(OrmError::missing_key(table, primary_key)),
    };
    if columns.is_empty() {
        return Err(OrmError::validation(format!(
            "UPDATE {table} has no columns to set"
        )));
    }
    params.push(key);

    Ok(Statement {
        kind: StatementKind::Update,
        table: table.to_string(),
        columns,
        key_column: Some(primary_key.to_string()),
        params,
    })
}

/// Build `DELETE FROM <table> WHERE <primary_key> = ?` with the key bound.
pub fn delete(table: &str, primary_key: &str, key: Param) -> OrmResult<Statement> {
    ident::validate("table", table)?;
    ident::validate("column", primary_key)?;
    if key.is_null() {
        return Err(OrmError::missing_key(table, primary_key));
    }

    let mut params = ParamList::with_capacity(1);
    params.push(key);

    Ok(Statement {
        kind: StatementKind::Delete,
        table: table.to_string(),
        columns: Vec::new(),
        key_column: Some(primary_key.to_string()),
        params,
    })
}
