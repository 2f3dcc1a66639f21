//! Table name resolution.

use crate::entity::Entity;

/// Derive a table name from a type name: `Person` -> `persons`.
///
/// Any module path and generic arguments are dropped first, so
/// `app::models::Person` and `Person<'a>` both resolve to `persons`. The
/// plural is always a trailing `s`.
pub fn table_name(type_name: &str) -> String {
    let simple = type_name.split('<').next().unwrap_or(type_name);
    let simple = simple.rsplit("::").next().unwrap_or(simple).trim();

    let mut out = simple.to_lowercase();
    out.push('s');
    out
}

/// Table name of an entity instance.
pub fn table_of<E: Entity>(_entity: &E) -> String {
    E::table_name()
}
