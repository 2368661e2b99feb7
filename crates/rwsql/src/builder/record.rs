//! Column decomposition for INSERT rows and UPDATE assignments.

use std::borrow::Cow;

use crate::value::{ToValue, Value};

/// One column of a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub column: Cow<'static, str>,
    pub value: Value,
    pub zero: bool,
}

impl FieldValue {
    pub fn new<T: ToValue + ?Sized>(column: impl Into<Cow<'static, str>>, value: &T) -> Self {
        Self {
            column: column.into(),
            value: value.to_value(),
            zero: value.is_zero(),
        }
    }
}

/// A typed row: its table and its columns in declaration order.
///
/// Usually derived with `#[derive(Record)]`.
pub trait Record {
    fn table_name(&self) -> Option<&str> {
        None
    }

    fn fields(&self) -> Vec<FieldValue>;
}

impl<R: Record + ?Sized> Record for &R {
    fn table_name(&self) -> Option<&str> {
        (**self).table_name()
    }

    fn fields(&self) -> Vec<FieldValue> {
        (**self).fields()
    }
}
