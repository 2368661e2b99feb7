//! Row decoding.

use crate::error::OrmResult;
use crate::value::ValueMap;

/// Decode `Self` from one driver row of type `R`.
///
/// Implement it for the adapter's row type, e.g. `tokio_postgres::Row`:
///
/// ```ignore
/// impl FromRow<tokio_postgres::Row> for User {
///     fn from_row(row: &tokio_postgres::Row) -> OrmResult<Self> {
///         Ok(User { id: row.try_get("id")?, name: row.try_get("name")? })
///     }
/// }
/// ```
pub trait FromRow<R>: Sized {
    fn from_row(row: &R) -> OrmResult<Self>;
}

impl FromRow<ValueMap> for ValueMap {
    fn from_row(row: &ValueMap) -> OrmResult<Self> {
        Ok(row.clone())
    }
}
