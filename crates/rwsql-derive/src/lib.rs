//! Derive macros for rwsql
//!
//! Provides `#[derive(Filter)]` and `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod filter;
mod record;

/// Derive `rwsql::Filter` from `#[sql("...")]` field tags.
///
/// # Example
///
/// ```ignore
/// #[derive(rwsql::Filter, Default)]
/// #[rwsql(table = "users")]
/// struct UserQuery {
///     #[sql("col:id")]
///     id: u64,
///     #[sql("col:kind;op:in")]
///     kinds: Vec<i32>,
///     #[sql("col:email; op:{}%")]
///     email_prefix: String,
///     page: u32,
/// }
/// ```
///
/// # Attributes
///
/// - `#[rwsql(table = "name")]` - table inferred by builders that have none set
/// - `#[sql("col:<column>[;op:<op>]")]` - where clause tag; `op` is one of
///   `=`, `IN`, `NOTIN`, `>=`, `%{}%`, `{}%`. Untagged fields are ignored.
///
/// Malformed tags are rejected at compile time.
#[proc_macro_derive(Filter, attributes(rwsql, sql))]
pub fn derive_filter(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    filter::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `rwsql::Record` from `#[db("column")]` field attributes.
///
/// # Example
///
/// ```ignore
/// #[derive(rwsql::Record, Default)]
/// #[rwsql(table = "users")]
/// struct User {
///     #[db("id")]
///     id: i64,
///     #[db("name")]
///     name: String,
///     cached_score: f64,
/// }
/// ```
///
/// Fields without `#[db]` are not columns.
#[proc_macro_derive(Record, attributes(rwsql, db))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
