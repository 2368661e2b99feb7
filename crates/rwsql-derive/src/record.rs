//! Record derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

use crate::attrs::{field_str, named_fields, table_name};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = named_fields(&input, "Record")?;

    let mut columns = Vec::new();
    for field in fields {
        let Some(column) = field_str(field, "db")? else {
            continue;
        };
        if column.value().trim().is_empty() {
            return Err(syn::Error::new(column.span(), "column name cannot be empty"));
        }
        let ident = &field.ident;
        columns.push(quote! {
            ::rwsql::FieldValue::new(#column, &self.#ident)
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
        impl #impl_generics ::rwsql::Record for #name #ty_generics #where_clause {
            #table_fn

            fn fields(&self) -> ::std::vec::Vec<::rwsql::FieldValue> {
                ::std::vec![#(#columns),*]
            }
        }
    })
}
