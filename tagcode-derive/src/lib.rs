//! # Tagcode Derive Macros
//!
//! This crate provides the procedural macros for `tagcode`. It automates the
//! implementation of `WireEntity` and `WireValue` for structs whose fields carry
//! explicit wire indices.
//!
//! Compatible with `syn 2.0`.

use proc_macro::TokenStream;
use quote::quote;
use std::collections::HashMap;
use syn::{Attribute, Data, DeriveInput, Fields, LitInt, LitStr, parse_macro_input};

/// Derives `WireEntity` and `WireValue`.
///
/// Every field needs `#[wire(index = N)]`. `#[wire(default)]` marks a field that
/// decodes to `Default::default()` when missing from the stream. The entity
/// name defaults to the type name and can be overridden with
/// `#[wire(name = "...")]` on the struct.
#[proc_macro_derive(WireEntity, attributes(wire))]
pub fn derive_wire_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(e) => e.to_compile_error().into(),
    }
}

// --- Internal Data Structures ---
struct WireField {
    ident: syn::Ident,
    ty: syn::Type,
    index: u32,
    default: bool,
}

fn expand(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let entity_name = parse_struct_attributes(&input.attrs)?.unwrap_or_else(|| name.to_string());

    let data_struct = match &input.data {
        Data::Struct(ds) => ds,
        _ => return Err(syn::Error::new(name.span(), "WireEntity only supports structs")),
    };
    let named = match &data_struct.fields {
        Fields::Named(named) => named,
        _ => {
            return Err(syn::Error::new(
                name.span(),
                "WireEntity only supports structs with named fields",
            ));
        }
    };

    let mut fields = Vec::new();
    let mut seen: HashMap<u32, syn::Ident> = HashMap::new();
    for field in &named.named {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let (index, default) = parse_field_attributes(&field.attrs, &ident)?;
        if let Some(previous) = seen.insert(index, ident.clone()) {
            return Err(syn::Error::new(
                ident.span(),
                format!("wire index {index} is already used by `{previous}`"),
            ));
        }
        fields.push(WireField {
            ident,
            ty: field.ty.clone(),
            index,
            default,
        });
    }

    let impl_entity = generate_wire_entity(&input, &entity_name, &fields);
    let impl_value = generate_wire_value(&input, &entity_name, &fields);

    Ok(quote! {
        #impl_entity
        #impl_value
    })
}

/// Parses `#[wire(name = "...")]` on the struct.
fn parse_struct_attributes(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut name = None;
    for attr in attrs {
        if attr.path().is_ident("wire") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let s: LitStr = meta.value()?.parse()?;
                    name = Some(s.value());
                    return Ok(());
                }
                Err(meta.error("Unknown wire attribute key on a struct. Supported: name"))
            })?;
        }
    }
    Ok(name)
}

/// Parses field attributes. Returns (index, default).
fn parse_field_attributes(attrs: &[Attribute], ident: &syn::Ident) -> syn::Result<(u32, bool)> {
    let mut index = None;
    let mut default = false;

    for attr in attrs {
        if attr.path().is_ident("wire") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("index") {
                    let lit: LitInt = meta.value()?.parse()?;
                    index = Some(lit.base10_parse::<u32>()?);
                    return Ok(());
                }

                if meta.path.is_ident("default") {
                    default = true;
                    return Ok(());
                }
                Err(meta.error("Unknown wire attribute key. Supported: index, default"))
            })?;
        }
    }

    match index {
        Some(index) => Ok((index, default)),
        None => Err(syn::Error::new(
            ident.span(),
            "missing #[wire(index = N)] on field",
        )),
    }
}

// --- Generator: WireEntity ---

fn generate_wire_entity(
    input: &DeriveInput,
    entity_name: &str,
    fields: &[WireField],
) -> proc_macro2::TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let metadata_fields = fields.iter().map(|f| {
        let index = i64::from(f.index);
        let fname = f.ident.to_string();
        let ty = &f.ty;
        let default = f.default.then(|| quote! { .with_default() });
        quote! {
            .with_field(
                tagcode::FieldMetadata::new(#index, #fname, <#ty as tagcode::WireValue>::kind())
                #default
            )
        }
    });

    let set_fields = fields.iter().map(|f| {
        let fname = &f.ident;
        let index = f.index;
        quote! {
            instance.set(#index, tagcode::WireValue::to_value(&self.#fname));
        }
    });

    let take_fields = fields.iter().map(|f| {
        let fname = &f.ident;
        let index = f.index;
        if f.default {
            quote! { #fname: tagcode::rt::take_field_or_default(&mut instance, #index)?, }
        } else {
            quote! { #fname: tagcode::rt::take_field(&mut instance, #index)?, }
        }
    });

    quote! {
        impl #impl_generics tagcode::WireEntity for #name #ty_generics #where_clause {
            fn entity_name() -> &'static str {
                #entity_name
            }

            fn metadata() -> tagcode::EntityMetadata {
                tagcode::EntityMetadata::new(#entity_name)
                    #(#metadata_fields)*
            }

            fn to_instance(&self) -> tagcode::EntityInstance {
                let mut instance = tagcode::EntityInstance::new(#entity_name);
                #(#set_fields)*
                instance
            }

            fn from_instance(
                mut instance: tagcode::EntityInstance,
            ) -> ::std::result::Result<Self, tagcode::DecodeError> {
                tagcode::rt::check_entity(&instance, #entity_name)?;
                Ok(Self {
                    #(#take_fields)*
                })
            }
        }
    }
}

// --- Generator: WireValue ---

fn generate_wire_value(
    input: &DeriveInput,
    entity_name: &str,
    fields: &[WireField],
) -> proc_macro2::TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let collect_children = fields.iter().map(|f| {
        let ty = &f.ty;
        quote! { <#ty as tagcode::WireValue>::collect_metadata(set); }
    });

    quote! {
        impl #impl_generics tagcode::WireValue for #name #ty_generics #where_clause {
            fn kind() -> tagcode::ValueKind {
                tagcode::ValueKind::entity(#entity_name)
            }

            fn to_value(&self) -> tagcode::Value {
                tagcode::Value::Entity(tagcode::WireEntity::to_instance(self))
            }

            fn from_value(value: tagcode::Value) -> ::std::result::Result<Self, tagcode::DecodeError> {
                tagcode::rt::entity_from_value(value)
            }

            fn collect_metadata(set: &mut tagcode::MetadataSet) {
                if set.begin(#entity_name) {
                    set.push(<Self as tagcode::WireEntity>::metadata());
                    #(#collect_children)*
                }
            }
        }
    }
}
