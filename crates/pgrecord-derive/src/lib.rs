//! Derive macros for pgrecord
//!
//! Provides `#[derive(Entity)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod common;
mod entity;
mod sql_ident;

/// Derive the `Entity` mapping for a struct.
///
/// # Example
///
/// ```ignore
/// use pgrecord::Entity;
///
/// #[derive(Entity)]
/// struct Person {
///     id: Option<i32>,
///     name: String,
///     #[orm(column = "years")]
///     age: i32,
///     #[orm(skip)]
///     scratch: Vec<u8>,
/// }
/// ```
///
/// # Generated
///
/// - `TYPE_NAME` - the struct name (the table is `persons`)
/// - `PRIMARY_KEY` / `KEY_TYPE` - key column and its type label
/// - `attributes()` - every persisted field, in declaration order
/// - `primary_key_value()` / `set_primary_key()` - key accessor and mutator
///
/// # Attributes
///
/// - `#[orm(primary_key = "name")]` - Key column name (default `id`)
/// - `#[orm(key_type = "label")]` - Override the key type label
/// - `#[orm(id)]` - Mark a field as the primary key
/// - `#[orm(column = "name")]` - Map field to a different column name
/// - `#[orm(skip)]` - Do not persist this field
///
/// Every persisted field must implement `Clone` and `ToSql`. One field must map
/// to the primary key; a struct without one does not compile. The key field may
/// be an integer or `Option` of an integer; `None` means "not yet inserted".
#[proc_macro_derive(Entity, attributes(orm))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
