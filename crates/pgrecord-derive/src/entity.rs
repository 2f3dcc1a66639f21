//! Entity derive macro implementation.

mod attrs;

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

use crate::common::syn_types::{
    is_generated_key_label, is_integer_label, option_inner, type_label,
};
use crate::sql_ident::parse_sql_ident_with_span;

use attrs::{get_field_attrs, get_struct_attrs};

const DEFAULT_PRIMARY_KEY: &str = "id";

struct PersistedField {
    ident: syn::Ident,
    column: String,
    label: String,
    /// `Some(T)` when the field is `Option<T>`.
    inner: Option<syn::Type>,
    ty: syn::Type,
    is_id: bool,
    span: Span,
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    if !input.generics.params.is_empty() || input.generics.where_clause.is_some() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Entity cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Entity can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity can only be derived for structs",
            ));
        }
    };

    let struct_attrs = get_struct_attrs(&input.attrs)?;

    let mut persisted: Vec<PersistedField> = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let field_attrs = get_field_attrs(field)?;
        if field_attrs.skip {
            if field_attrs.is_id {
                return Err(syn::Error::new_spanned(
                    field,
                    "the primary key field cannot be skipped",
                ));
            }
            continue;
        }

        let column = match field_attrs.column {
            Some(column) => column,
            None => parse_sql_ident_with_span(
                &ident.unraw().to_string().to_lowercase(),
                ident.span(),
                "column",
            )?,
        };

        if let Some(previous) = persisted
            .iter()
            .find(|p| p.column.eq_ignore_ascii_case(&column))
        {
            return Err(syn::Error::new_spanned(
                field,
                format!(
                    "column `{column}` is already mapped by field `{}`",
                    previous.ident
                ),
            ));
        }

        let inner = option_inner(&field.ty).cloned();
        let label = type_label(inner.as_ref().unwrap_or(&field.ty));

        persisted.push(PersistedField {
            span: ident.span(),
            ident,
            column,
            label,
            inner,
            ty: field.ty.clone(),
            is_id: field_attrs.is_id,
        });
    }

    let mut id_fields = persisted.iter().filter(|f| f.is_id);
    let id_field = id_fields.next();
    if let Some(second) = id_fields.next() {
        return Err(syn::Error::new(
            second.span,
            "only one field can be marked #[orm(id)]",
        ));
    }

    let primary_key = match (&struct_attrs.primary_key, id_field) {
        (Some((pk, span)), Some(field)) => {
            if !pk.eq_ignore_ascii_case(&field.column) {
                return Err(syn::Error::new(
                    *span,
                    format!(
                        "primary_key `{pk}` conflicts with #[orm(id)] field `{}` (column `{}`)",
                        field.ident, field.column
                    ),
                ));
            }
            pk.clone()
        }
        (Some((pk, _)), None) => pk.clone(),
        (None, Some(field)) => field.column.clone(),
        (None, None) => DEFAULT_PRIMARY_KEY.to_string(),
    };

    let Some(key_field) = id_field.or_else(|| {
        persisted
            .iter()
            .find(|f| f.column.eq_ignore_ascii_case(&primary_key))
    }) else {
        return Err(syn::Error::new_spanned(
            name,
            format!(
                "no field maps to the primary key `{primary_key}`; add a `{primary_key}` field or mark one with #[orm(id)]"
            ),
        ));
    };

    let key_type = struct_attrs
        .key_type
        .clone()
        .unwrap_or_else(|| key_field.label.clone());
    if is_generated_key_label(&key_type) && !is_integer_label(&key_field.label) {
        return Err(syn::Error::new(
            key_field.span,
            format!(
                "key_type `{key_type}` is generated by the database, but field `{}` of type {} cannot hold an integer key",
                key_field.ident, key_field.label
            ),
        ));
    }

    let type_name = name.unraw().to_string();

    let attribute_exprs = persisted.iter().map(|f| {
        let ident = &f.ident;
        let column = &f.column;
        let label = &f.label;
        let value = if f.inner.is_some() {
            quote! { ::pgrecord::Param::nullable(::core::clone::Clone::clone(&self.#ident)) }
        } else {
            quote! { ::pgrecord::Param::new(::core::clone::Clone::clone(&self.#ident)) }
        };
        quote! { ::pgrecord::Attribute::new(#column, #label, #value) }
    });

    let primary_key_value = {
        let ident = &key_field.ident;
        if key_field.inner.is_some() {
            quote! {
                ::core::clone::Clone::clone(&self.#ident).map(::pgrecord::Param::new)
            }
        } else {
            quote! {
                ::core::option::Option::Some(::pgrecord::Param::new(
                    ::core::clone::Clone::clone(&self.#ident),
                ))
            }
        }
    };

    let key_ident = &key_field.ident;
    let key_column = &key_field.column;
    let key_label = &key_field.label;
    let set_primary_key = if is_integer_label(key_label) {
        let target = key_field.inner.as_ref().unwrap_or(&key_field.ty);
        let assign = if key_field.inner.is_some() {
            quote! { self.#key_ident = ::core::option::Option::Some(value); }
        } else {
            quote! { self.#key_ident = value; }
        };
        quote! {
            let value = <#target as ::core::convert::TryFrom<i64>>::try_from(key).map_err(|e| {
                ::pgrecord::OrmError::reflection(
                    #type_name,
                    #key_column,
                    ::std::format!("generated key {key} does not fit {}: {e}", #key_label),
                )
            })?;
            #assign
            ::core::result::Result::Ok(())
        }
    } else {
        let message = format!(
            "key field `{key_ident}` of type {key_label} cannot hold a generated key"
        );
        quote! {
            let _ = key;
            ::core::result::Result::Err(::pgrecord::OrmError::reflection(
                #type_name,
                #key_column,
                #message,
            ))
        }
    };

    Ok(quote! {
        impl ::pgrecord::Entity for #name {
            const TYPE_NAME: &'static str = #type_name;
            const PRIMARY_KEY: &'static str = #primary_key;
            const KEY_TYPE: &'static str = #key_type;

            fn attributes(&self) -> ::std::vec::Vec<::pgrecord::Attribute> {
                ::std::vec![#(#attribute_exprs),*]
            }

            fn primary_key_value(&self) -> ::core::option::Option<::pgrecord::Param> {
                #primary_key_value
            }

            fn set_primary_key(&mut self, key: i64) -> ::pgrecord::OrmResult<()> {
                #set_primary_key
            }
        }
    })
}
