//! Attribute descriptors.

use crate::param::Param;

/// Type labels treated as integer keys, i.e. keys the database can generate.
const INTEGER_TYPES: &[&str] = &[
    "int", "integer", "smallint", "bigint", "serial", "bigserial", "i8", "i16", "i32", "i64", "isize", "u8", "u16", "u32", "u64", "usize",
];

/// Returns `true` if `label` names an integer type.
pub fn is_integer_type(label: &str) -> bool {
    INTEGER_TYPES.contains(&label)
}

/// One persisted attribute of an entity, read at extraction time.
#[derive(Clone, Debug)]
pub struct Attribute {
    /// Column name.
    pub name: &'static str,
    /// Type label, e.g. `"i32"` or `"String"`.
    pub declared_type: &'static str,
    /// Set by the extractor when `name` matches the entity's primary key.
    pub is_primary_key: bool,
    /// Current value.
    pub value: Param,
}

impl Attribute {
    pub fn new(name: &'static str, declared_type: &'static str, value: Param) -> Self {
        Self {
            name,
            declared_type,
            is_primary_key: false,
            value,
        }
    }

    /// Whether the declared type is an integer (generated-key) type.
    pub fn is_integer(&self) -> bool {
        is_integer_type(self.declared_type)
    }

    /// Whether the current value is `NULL`.
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }
}
