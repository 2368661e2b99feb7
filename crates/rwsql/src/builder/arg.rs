//! Arguments accepted by clause-building methods.

use crate::builder::select::SelectBuilder;
use crate::builder::traits::Statement;
use crate::error::BuildResult;
use crate::value::{ToValue, Value};

/// One clause argument, classified at the call site.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// The clause is a constant and binds nothing (`kind = 0`).
    Absent,
    /// A bound value and its zero classification.
    Value { value: Value, zero: bool },
    /// A built sub-query; its text replaces the first `?` of the clause.
    Query(BuildResult<(String, Vec<Value>)>),
}

impl Arg {
    pub fn value(value: impl ToValue) -> Self {
        Arg::Value {
            zero: value.is_zero(),
            value: value.to_value(),
        }
    }

    pub fn query(statement: &(impl Statement + ?Sized)) -> Self {
        Arg::Query(statement.build())
    }

    /// Zero classification for the option chain. Constant clauses and
    /// sub-queries are never zero.
    pub(crate) fn is_zero(&self) -> bool {
        matches!(self, Arg::Value { zero: true, .. })
    }
}

/// Conversion into an [`Arg`].
///
/// Implemented for every [`ToValue`] type, for `()` (no argument) and for
/// [`SelectBuilder`] so sub-queries can be passed where a value would go.
pub trait IntoArg {
    fn into_arg(self) -> Arg;
}

impl<T: ToValue> IntoArg for T {
    fn into_arg(self) -> Arg {
        Arg::value(self)
    }
}

impl IntoArg for () {
    fn into_arg(self) -> Arg {
        Arg::Absent
    }
}

impl IntoArg for Arg {
    fn into_arg(self) -> Arg {
        self
    }
}

impl IntoArg for SelectBuilder {
    fn into_arg(self) -> Arg {
        Arg::query(&self)
    }
}

impl IntoArg for &SelectBuilder {
    fn into_arg(self) -> Arg {
        Arg::query(self)
    }
}
