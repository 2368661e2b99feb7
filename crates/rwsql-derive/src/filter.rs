//! Filter derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

use crate::attrs::{field_str, named_fields, table_name, validate_tag};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = named_fields(&input, "Filter")?;

    let mut tagged = Vec::new();
    for field in fields {
        let Some(tag) = field_str(field, "sql")? else {
            continue;
        };
        if tag.value().trim().is_empty() {
            continue;
        }
        if let Err(reason) = validate_tag(&tag.value()) {
            return Err(syn::Error::new(tag.span(), format!("invalid sql tag: {reason}")));
        }
        let ident = &field.ident;
        tagged.push(quote! {
            ::rwsql::TaggedValue::new(#tag, &self.#ident)
        });
    }

    let table_fn = table_name(&input)?.map(|table| {
        quote! {
            fn table_name(&self) -> ::core::option::Option<&str> {
                ::core::option::Option::Some(#table)
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::rwsql::Filter for #name #ty_generics #where_clause {
            #table_fn

            fn tagged_values(&self) -> ::std::vec::Vec<::rwsql::TaggedValue> {
                ::std::vec![#(#tagged),*]
            }
        }
    })
}
