//! SQL text accumulated together with its positional arguments.

use crate::value::Value;

/// An append-only SQL buffer paired with the arguments bound to its `?`
/// placeholders, left to right.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    sql: String,
    args: Vec<Value>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Append raw SQL text without arguments.
    pub fn push_sql(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Append SQL text and the arguments it binds.
    pub fn push(&mut self, sql: &str, args: impl IntoIterator<Item = Value>) {
        self.sql.push_str(sql);
        self.args.extend(args);
    }

    /// Append `sql`, preceded by `separator` when the buffer already has content.
    pub fn push_separated(
        &mut self,
        separator: &str,
        sql: &str,
        args: impl IntoIterator<Item = Value>,
    ) {
        if !self.sql.is_empty() {
            self.sql.push_str(separator);
        }
        self.push(sql, args);
    }

    /// Append another fragment's text and arguments.
    pub fn extend(&mut self, other: &Fragment) {
        self.sql.push_str(&other.sql);
        self.args.extend(other.args.iter().cloned());
    }

    pub fn reset(&mut self) {
        self.sql.clear();
        self.args.clear();
    }

    pub fn to_parts(&self) -> (String, Vec<Value>) {
        (self.sql.clone(), self.args.clone())
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.args)
    }
}
