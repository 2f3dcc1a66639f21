//! Type helper utilities for syn type analysis.

use quote::ToTokens;

/// Extract the inner type T from Option<T>, or return None if not an Option type.
///
/// Recognizes `Option<T>`, `std::option::Option<T>`, and `core::option::Option<T>`.
pub fn option_inner(ty: &syn::Type) -> Option<&syn::Type> {
    let syn::Type::Path(type_path) = ty else {
        return None;
    };
    let seg = type_path.path.segments.last()?;
    if seg.ident != "Option" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &seg.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    let syn::GenericArgument::Type(inner) = args.args.first()? else {
        return None;
    };
    Some(inner)
}

/// Short label for a type: the last path segment, without generic arguments.
///
/// `i32` -> `"i32"`, `chrono::DateTime<Utc>` -> `"DateTime"`. Non-path types
/// fall back to their token text.
pub fn type_label(ty: &syn::Type) -> String {
    match ty {
        syn::Type::Path(type_path) if type_path.qself.is_none() => type_path
            .path
            .segments
            .last()
            .map(|seg| seg.ident.to_string())
            .unwrap_or_default(),
        syn::Type::Group(group) => type_label(&group.elem),
        syn::Type::Paren(paren) => type_label(&paren.elem),
        other => other.to_token_stream().to_string().replace(' ', ""),
    }
}

/// Whether `label` is a Rust integer type a generated key can be converted into.
pub fn is_integer_label(label: &str) -> bool {
    matches!(
        label,
        "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64" | "usize"
    )
}

/// Whether a `KEY_TYPE` label asks for a database-generated key.
///
/// Accepts the Rust integer labels plus the SQL integer type names.
pub fn is_generated_key_label(label: &str) -> bool {
    is_integer_label(label)
        || matches!(
            label,
            "int" | "integer" | "smallint" | "bigint" | "serial" | "bigserial"
        )
}
