//! Bind values.

use std::fmt;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// A clone-friendly bind value.
///
/// Attribute values are read out of an entity once and then shared between the
/// descriptor list and the statement that binds them, so the value sits behind
/// an `Arc`. A `Param` also remembers whether it is SQL `NULL`, which the key
/// checks in `save` and `delete` rely on.
#[derive(Clone)]
pub struct Param {
    value: Arc<dyn ToSql + Send + Sync>,
    is_null: bool,
}

impl Param {
    /// Wrap a non-null value.
    pub fn new<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            is_null: false,
        }
    }

    /// Wrap an optional value; `None` binds as a typed `NULL`.
    pub fn nullable<T: ToSql + Send + Sync + 'static>(value: Option<T>) -> Self {
        let is_null = value.is_none();
        Self {
            value: Arc::new(value),
            is_null,
        }
    }

    /// Whether this value binds as `NULL`.
    pub fn is_null(&self) -> bool {
        self.is_null
    }

    /// Borrow the value in the form tokio-postgres expects.
    pub fn as_ref(&self) -> &(dyn ToSql + Sync) {
        &*self.value as &(dyn ToSql + Sync)
    }
}

impl fmt::Debug for Param {
    // `ToSql: Debug`, so the inner value prints itself.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.value, f)
    }
}

/// Ordered bind values of one statement.
#[derive(Clone, Debug, Default)]
pub struct ParamList {
    params: Vec<Param>,
}

impl ParamList {
    /// Create a new empty parameter list.
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Create an empty list with room for `capacity` values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            params: Vec::with_capacity(capacity),
        }
    }

    /// Add a parameter and return its 1-based index.
    pub fn push(&mut self, param: Param) -> usize {
        self.params.push(param);
        self.params.len()
    }

    /// Get the current parameter count.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterate the values in bind order.
    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.params.iter()
    }

    /// Get all parameters as references for tokio-postgres.
    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(Param::as_ref).collect()
    }
}

impl<'a> IntoIterator for &'a ParamList {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullable_tracks_none() {
        assert!(Param::nullable(Option::<i32>::None).is_null());
        assert!(!Param::nullable(Some(3_i32)).is_null());
        assert!(!Param::new(3_i32).is_null());
    }

    #[test]
    fn debug_shows_inner_value() {
        assert_eq!(format!("{:?}", Param::new("alice")), "\"alice\"");
        assert_eq!(format!("{:?}", Param::nullable(Some(7_i64))), "Some(7)");
    }

    #[test]
    fn push_returns_one_based_index() {
        let mut list = ParamList::new();
        assert_eq!(list.push(Param::new(1_i32)), 1);
        assert_eq!(list.push(Param::new(2_i32)), 2);
        assert_eq!(list.len(), 2);
        assert_eq!(list.as_refs().len(), 2);
    }
}
