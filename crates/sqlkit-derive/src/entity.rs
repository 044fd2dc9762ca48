//! Entity derive macro implementation
//!
//! ## Module Structure
//!
//! - `attrs`: Struct and field attribute parsing

mod attrs;

use crate::common::syn_types::field_kind;
use attrs::{field_attr, table_name};
use heck::ToLowerCamelCase;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Entity cannot be derived for generic structs",
        ));
    }

    let table = match table_name(&input)? {
        Some(table) => quote! { ::core::option::Option::Some(#table) },
        None => quote! { ::core::option::Option::None },
    };

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

    let mut descriptors = Vec::new();
    let mut value_arms = Vec::new();
    let mut parent: Option<(&syn::Ident, &syn::Type)> = None;
    let mut changes: Option<&syn::Ident> = None;

    for field in fields {
        // Named fields always carry an ident.
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attr = field_attr(field)?;

        if attr.flatten {
            if parent.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one #[orm(flatten)] parent is allowed",
                ));
            }
            parent = Some((ident, &field.ty));
            continue;
        }
        if attr.changes {
            if changes.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one #[orm(changes)] field is allowed",
                ));
            }
            changes = Some(ident);
            continue;
        }

        let prop = ident.unraw().to_string().to_lower_camel_case();
        let kind = format_ident!("{}", field_kind(&field.ty));

        let mut desc = quote! {
            ::sqlkit::FieldDescriptor::new(#prop, ::sqlkit::FieldKind::#kind)
        };
        if let Some(column) = &attr.column {
            desc = quote! { #desc.column(#column) };
        }
        if attr.is_id {
            desc = quote! { #desc.id() };
        }
        if attr.read_only {
            desc = quote! { #desc.read_only() };
        }
        if attr.non_updatable {
            desc = quote! { #desc.non_updatable() };
        }
        if attr.transient {
            desc = quote! { #desc.transient() };
        }
        if attr.skip {
            desc = quote! { #desc.no_accessor() };
        }
        descriptors.push(desc);

        if !attr.skip && !attr.transient {
            value_arms.push(quote! {
                #prop => ::core::option::Option::Some(::sqlkit::Value::from(
                    ::core::clone::Clone::clone(&self.#ident),
                )),
            });
        }
    }

    let (parent_desc, parent_value, parent_changes) = match parent {
        Some((ident, ty)) => (
            quote! {
                ::core::option::Option::Some(
                    <#ty as ::sqlkit::Entity>::descriptor
                        as fn() -> &'static ::sqlkit::EntityDescriptor,
                )
            },
            quote! { ::sqlkit::Entity::value_of(&self.#ident, prop) },
            quote! { ::sqlkit::Entity::changed_properties(&self.#ident) },
        ),
        None => (
            quote! { ::core::option::Option::None },
            quote! { ::core::option::Option::None },
            quote! { ::core::option::Option::None },
        ),
    };

    let changed = match changes {
        Some(ident) => quote! { ::core::option::Option::Some(self.#ident.changed()) },
        None => parent_changes,
    };

    let entity_name = name.unraw().to_string();

    Ok(quote! {
        impl ::sqlkit::Entity for #name {
            fn descriptor() -> &'static ::sqlkit::EntityDescriptor {
                static DESCRIPTOR: ::sqlkit::EntityDescriptor = ::sqlkit::EntityDescriptor {
                    name: #entity_name,
                    table: #table,
                    fields: &[#(#descriptors),*],
                    parent: #parent_desc,
                };
                &DESCRIPTOR
            }

            fn value_of(&self, prop: &str) -> ::core::option::Option<::sqlkit::Value> {
                match prop {
                    #(#value_arms)*
                    _ => #parent_value,
                }
            }

            fn changed_properties(
                &self,
            ) -> ::core::option::Option<::std::vec::Vec<::std::string::String>> {
                #changed
            }
        }
    })
}
