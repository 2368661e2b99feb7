//! Fluent SQL statement builders.
//!
//! Statements are assembled with `?` placeholders and a parallel argument
//! list; [`Statement::build`] renders both. Placeholders are rebound to the
//! driver's syntax at execution time.
//!
//! - Builders consume and return `self`, so calls chain.
//! - The first error a builder hits is kept; later calls are ignored and
//!   `build()` reports it.
//! - `Clone` produces an independent copy for branching a partial statement.

pub mod arg;
pub mod delete;
pub mod fragment;
pub mod insert;
pub mod option;
pub mod record;
pub mod select;
pub mod tag;
pub mod traits;
pub mod update;
pub mod where_expr;

pub use arg::{Arg, IntoArg};
pub use delete::DeleteBuilder;
pub use fragment::Fragment;
pub use insert::{InsertBuilder, InsertRow, InsertRows, InsertSource};
pub use option::Opt;
pub use record::{FieldValue, Record};
pub use select::{JoinKind, LockMode, Pagination, SelectBuilder};
pub use tag::{Filter, LikeTemplate, TagOp, TagSpec, TaggedColumn, TaggedValue};
pub use traits::Statement;
pub use update::UpdateBuilder;
pub use where_expr::{Conj, WhereExpr};

/// Start a SELECT.
pub fn select() -> SelectBuilder {
    SelectBuilder::new()
}

/// Start an INSERT.
pub fn insert() -> InsertBuilder {
    InsertBuilder::new()
}

/// Start an UPDATE.
pub fn update() -> UpdateBuilder {
    UpdateBuilder::new()
}

/// Start a DELETE.
pub fn delete() -> DeleteBuilder {
    DeleteBuilder::new()
}

#[cfg(test)]
mod tests;
