//! SQL identifier checks.
//!
//! Table and column names are rendered into statement text verbatim, so every
//! name is checked before it gets there. Each dot-separated part must match
//! `[A-Za-z_][A-Za-z0-9_$]*`. Quoted identifiers are not supported.

use crate::error::{OrmError, OrmResult};

/// Check that `name` is a plain (optionally dotted) SQL identifier.
///
/// `what` names the identifier in the error message, e.g. `"table"` or `"column"`.
pub fn validate(what: &str, name: &str) -> OrmResult<()> {
    if name.is_empty() {
        return Err(OrmError::validation(format!("{what} name cannot be empty")));
    }

    for part in name.split('.') {
        let mut chars = part.chars();
        let Some(first) = chars.next() else {
            return Err(OrmError::validation(format!(
                "Empty segment in {what} name '{name}'"
            )));
        };
        if !(first == '_' || first.is_ascii_alphabetic()) {
            return Err(OrmError::validation(format!(
                "Invalid start character '{first}' in {what} name '{name}'"
            )));
        }
        if let Some(c) = chars.find(|&c| !(c == '_' || c == '$' || c.is_ascii_alphanumeric())) {
            return Err(OrmError::validation(format!(
                "Invalid character '{c}' in {what} name '{name}'"
            )));
        }
    }

    Ok(())
}

/// Returns `true` if `name` passes [`validate`].
pub fn is_valid(name: &str) -> bool {
    validate("identifier", name).is_ok()
}
