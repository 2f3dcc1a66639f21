//! Attribute extraction.
//!
//! Turns an entity into the ordered descriptor list the statement builder
//! consumes. The list is produced once per call, and column text, placeholders
//! and bind values are all derived from that single list.

use crate::attribute::Attribute;
use crate::entity::Entity;
use crate::error::{OrmError, OrmResult};
use crate::ident;
use std::collections::HashSet;

/// Attribute names that are never persisted.
pub const RESERVED_ATTRIBUTES: &[&str] = &["class"];

/// Result of one extraction.
#[derive(Clone, Debug)]
pub struct Extraction {
    /// Persisted attributes in declaration order.
    ///
    /// Holds the primary key only when it was requested.
    pub attributes: Vec<Attribute>,
    /// The primary-key descriptor, reported even when excluded from `attributes`.
    pub primary_key: Option<Attribute>,
}

impl Extraction {
    /// Column names in bind order.
    pub fn column_names(&self) -> Vec<&'static str> {
        self.attributes.iter().map(|a| a.name).collect()
    }
}

/// Extract the persisted attributes of `entity`.
///
/// The primary key is the attribute named `E::PRIMARY_KEY`. When
/// `include_primary_key` is `false` it is left out of
/// [`Extraction::attributes`] but still returned in
/// [`Extraction::primary_key`].
pub fn extract<E: Entity>(entity: &E, include_primary_key: bool) -> OrmResult<Extraction> {
    let key_name = E::PRIMARY_KEY.to_ascii_lowercase();
    let raw = entity.attributes();

    let mut seen = HashSet::with_capacity(raw.len());
    let mut attributes = Vec::with_capacity(raw.len());
    let mut primary_key: Option<Attribute> = None;

    for mut attr in raw {
        if RESERVED_ATTRIBUTES.contains(&attr.name) {
            continue;
        }
        ident::validate("column", attr.name)?;

        let name = attr.name.to_ascii_lowercase();
        if !seen.insert(name.clone()) {
            return Err(OrmError::reflection(
                E::TYPE_NAME,
                attr.name,
                "attribute is mapped more than once",
            ));
        }

        attr.is_primary_key = name == key_name;
        if attr.is_primary_key {
            primary_key = Some(attr.clone());
            if !include_primary_key {
                continue;
            }
        }
        attributes.push(attr);
    }

    Ok(Extraction {
        attributes,
        primary_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::Param;

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
            self.id = Some(key as i32);
            Ok(())
        }
    }

    struct Duplicated;

    impl Entity for Duplicated {
        const TYPE_NAME: &'static str = "Duplicated";

        fn attributes(&self) -> Vec<Attribute> {
            vec![
                Attribute::new("name", "String", Param::new("a")),
                Attribute::new("NAME", "String", Param::new("b")),
            ]
        }

        fn primary_key_value(&self) -> Option<Param> {
            None
        }

        fn set_primary_key(&mut self, _key: i64) -> OrmResult<()> {
            Ok(())
        }
    }

    struct WithReserved;

    impl Entity for WithReserved {
        const TYPE_NAME: &'static str = "WithReserved";

        fn attributes(&self) -> Vec<Attribute> {
            vec![
                Attribute::new("class", "String", Param::new("WithReserved")),
                Attribute::new("label", "String", Param::new("x")),
            ]
        }

        fn primary_key_value(&self) -> Option<Param> {
            None
        }

        fn set_primary_key(&mut self, _key: i64) -> OrmResult<()> {
            Ok(())
        }
    }

    fn person() -> Person {
        Person {
            id: Some(7),
            name: "alice".into(),
            age: 30,
        }
    }

    #[test]
    fn excludes_key_but_reports_it() {
        let ex = extract(&person(), false).unwrap();
        assert_eq!(ex.column_names(), vec!["name", "age"]);
        let key = ex.primary_key.unwrap();
        assert_eq!(key.name, "id");
        assert!(key.is_primary_key);
        assert!(ex.attributes.iter().all(|a| !a.is_primary_key));
    }

    #[test]
    fn includes_key_in_declaration_order() {
        let ex = extract(&person(), true).unwrap();
        assert_eq!(ex.column_names(), vec!["id", "name", "age"]);
        assert_eq!(ex.attributes.iter().filter(|a| a.is_primary_key).count(), 1);
    }

    #[test]
    fn values_follow_names() {
        let ex = extract(&person(), true).unwrap();
        let rendered: Vec<String> = ex
            .attributes
            .iter()
            .map(|a| format!("{}={:?}", a.name, a.value))
            .collect();
        assert_eq!(rendered, vec!["id=Some(7)", "name=\"alice\"", "age=30"]);
    }

    #[test]
    fn duplicate_names_are_a_reflection_error() {
        let err = extract(&Duplicated, true).unwrap_err();
        assert!(err.is_reflection());
    }

    #[test]
    fn reserved_names_are_dropped() {
        let ex = extract(&WithReserved, true).unwrap();
        assert_eq!(ex.column_names(), vec!["label"]);
        assert!(ex.primary_key.is_none());
    }
}
