//! Attribute parsing for the Entity derive macro.
//!
//! Handles struct-level and field-level `#[orm(...)]` attributes.

use proc_macro2::Span;
use syn::Result;

use crate::sql_ident::parse_sql_ident;

#[derive(Default)]
pub(super) struct StructAttrs {
    pub(super) primary_key: Option<(String, Span)>,
    pub(super) key_type: Option<String>,
}

impl syn::parse::Parse for StructAttrs {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attrs = StructAttrs::default();

        loop {
            if input.is_empty() {
                break;
            }

            let ident: syn::Ident = input.parse()?;
            let _: syn::Token![=] = input.parse()?;
            let value: syn::LitStr = input.parse()?;

            match ident.to_string().as_str() {
                "primary_key" => {
                    let name = parse_sql_ident(&value, "primary_key")?;
                    attrs.primary_key = Some((name, value.span()));
                }
                "key_type" => {
                    let label = value.value().trim().to_string();
                    if label.is_empty() {
                        return Err(syn::Error::new(value.span(), "key_type must not be empty"));
                    }
                    attrs.key_type = Some(label);
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown struct attribute `{other}` (expected primary_key or key_type)"),
                    ));
                }
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(attrs)
    }
}

#[derive(Default)]
pub(super) struct FieldAttrs {
    pub(super) is_id: bool,
    pub(super) skip: bool,
    pub(super) column: Option<String>,
}

impl syn::parse::Parse for FieldAttrs {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attrs = FieldAttrs::default();

        loop {
            if input.is_empty() {
                break;
            }

            let ident: syn::Ident = input.parse()?;
            match ident.to_string().as_str() {
                "id" => attrs.is_id = true,
                "skip" => attrs.skip = true,
                "column" => {
                    let _: syn::Token![=] = input.parse()?;
                    let value: syn::LitStr = input.parse()?;
                    attrs.column = Some(parse_sql_ident(&value, "column")?);
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown field attribute `{other}` (expected id, skip or column)"),
                    ));
                }
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(attrs)
    }
}

/// Merge every struct-level `#[orm(...)]` attribute.
pub(super) fn get_struct_attrs(attrs: &[syn::Attribute]) -> Result<StructAttrs> {
    let mut merged = StructAttrs::default();
    for attr in attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        let parsed: StructAttrs = attr.parse_args()?;
        if parsed.primary_key.is_some() {
            merged.primary_key = parsed.primary_key;
        }
        if parsed.key_type.is_some() {
            merged.key_type = parsed.key_type;
        }
    }
    Ok(merged)
}

/// Merge every field-level `#[orm(...)]` attribute.
pub(super) fn get_field_attrs(field: &syn::Field) -> Result<FieldAttrs> {
    let mut merged = FieldAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        let parsed: FieldAttrs = attr.parse_args()?;
        merged.is_id |= parsed.is_id;
        merged.skip |= parsed.skip;
        if parsed.column.is_some() {
            merged.column = parsed.column;
        }
    }
    Ok(merged)
}
