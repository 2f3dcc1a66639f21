//! The entity contract.
//!
//! An [`Entity`] is a plain struct that maps to one row. The mapping is
//! described at compile time, usually by `#[derive(Entity)]`:
//!
//! ```ignore
//! use pgrecord::Entity;
//!
//! #[derive(Entity)]
//! struct Person {
//!     id: Option<i32>,
//!     name: String,
//!     age: i32,
//! }
//!
//! assert_eq!(Person::table_name(), "persons");
//! ```
//!
//! Implementing the trait by hand works the same way; see the trait docs.

use crate::attribute::Attribute;
use crate::error::OrmResult;
use crate::param::Param;
use crate::table;

/// Compile-time attribute mapping of a persisted struct.
///
/// # Implementing by hand
///
/// ```ignore
/// use pgrecord::{Attribute, Entity, OrmError, OrmResult, Param};
///
/// struct Order {
///     id: Option<i64>,
///     total: i64,
/// }
///
/// impl Entity for Order {
///     const TYPE_NAME: &'static str = "Order";
///
///     fn attributes(&self) -> Vec<Attribute> {
///         vec![
///             Attribute::new("id", "i64", Param::nullable(self.id)),
///             Attribute::new("total", "i64", Param::new(self.total)),
///         ]
///     }
///
///     fn primary_key_value(&self) -> Option<Param> {
///         self.id.map(Param::new)
///     }
///
///     fn set_primary_key(&mut self, key: i64) -> OrmResult<()> {
///         self.id = Some(key);
///         Ok(())
///     }
/// }
/// ```
pub trait Entity {
    /// Simple type name, used to derive the table name.
    const TYPE_NAME: &'static str;

    /// Column name of the primary key.
    const PRIMARY_KEY: &'static str = "id";

    /// Type label of the primary key. Integer labels mean the key is generated
    /// by the database and read back after insert.
    const KEY_TYPE: &'static str = "int";

    /// Every persisted attribute, primary key included, in declaration order.
    fn attributes(&self) -> Vec<Attribute>;

    /// Current primary key value, or `None` if unset.
    fn primary_key_value(&self) -> Option<Param>;

    /// Store a database-generated key.
    fn set_primary_key(&mut self, key: i64) -> OrmResult<()>;

    /// Table this entity is stored in.
    fn table_name() -> String {
        table::table_name(Self::TYPE_NAME)
    }
}
