use super::arg::{Arg, IntoArg};
use super::fragment::Fragment;
use super::option::Opt;
use super::record::Record;
use super::traits::{Statement, impl_where_methods};
use super::where_expr::{WhereExpr, resolve_term};
use crate::error::{BuildError, BuildResult};
use crate::value::{ToValue, Value, ValueMap};

/// UPDATE statement builder.
///
/// A missing WHERE clause is allowed and updates every row of the table.
///
/// ```ignore
/// let (sql, args) = update()
///     .table("users")
///     .set("name", "vic")
///     .set_expr("login_count = login_count + 1", ())
///     .and("id = ?", 1)
///     .build()?;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateBuilder {
    table: String,
    assignments: Fragment,
    where_expr: WhereExpr,
    error: Option<BuildError>,
}

impl UpdateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, table: &str) -> Self {
        if self.error.is_none() {
            self.table = table.to_string();
        }
        self
    }

    /// `column = ?`.
    pub fn set(self, column: &str, value: impl ToValue) -> Self {
        self.set_opts(column, value, &[])
    }

    pub fn set_opts(self, column: &str, value: impl ToValue, opts: &[Opt]) -> Self {
        self.set_expr_opts(&format!("{column} = ?"), Arg::value(value), opts)
    }

    /// A raw assignment such as `phone = 1234` (pass `()`) or
    /// `count = count + ?`.
    pub fn set_expr(self, clause: &str, arg: impl IntoArg) -> Self {
        self.set_expr_opts(clause, arg, &[])
    }

    pub fn set_expr_opts(mut self, clause: &str, arg: impl IntoArg, opts: &[Opt]) -> Self {
        if self.error.is_none() {
            let result = self.push_assignment(clause, arg.into_arg(), opts);
            self.record(result);
        }
        self
    }

    /// `column = ?` for every field of `record`. Sets the table from the
    /// record when none is set yet.
    pub fn set_all<R: Record + ?Sized>(mut self, record: &R, opts: &[Opt]) -> Self {
        if self.error.is_some() {
            return self;
        }
        if let Some(table) = record.table_name() {
            self.infer_table(table);
        }
        for field in record.fields() {
            let arg = Arg::Value {
                value: field.value,
                zero: field.zero,
            };
            let result = self.push_assignment(&format!("{} = ?", field.column), arg, opts);
            if result.is_err() {
                self.record(result);
                break;
            }
        }
        self
    }

    /// `key = ?` for every entry of `map`, in insertion order.
    pub fn set_map(mut self, map: &ValueMap, opts: &[Opt]) -> Self {
        if self.error.is_some() {
            return self;
        }
        for (key, value) in map.iter() {
            let result = self.push_assignment(&format!("{key} = ?"), Arg::value(value), opts);
            if result.is_err() {
                self.record(result);
                break;
            }
        }
        self
    }

    impl_where_methods!();

    fn push_assignment(&mut self, clause: &str, arg: Arg, opts: &[Opt]) -> BuildResult<()> {
        if let Some((clause, args)) = resolve_term(clause, arg, false, opts)? {
            self.assignments.push_separated(", ", &clause, args);
        }
        Ok(())
    }

    fn record(&mut self, result: BuildResult<()>) {
        if let Err(err) = result {
            self.error.get_or_insert(err);
        }
    }

    fn infer_table(&mut self, table: &str) {
        if self.table.is_empty() {
            self.table = table.to_string();
        }
    }
}

impl Statement for UpdateBuilder {
    fn build(&self) -> BuildResult<(String, Vec<Value>)> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if self.table.trim().is_empty() {
            return Err(BuildError::EmptyTable { statement: "update" });
        }
        if self.assignments.is_empty() {
            return Err(BuildError::EmptySet);
        }

        let mut sql = format!("UPDATE {} SET {}", self.table, self.assignments.sql());
        let mut args = self.assignments.args().to_vec();
        if !self.where_expr.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(self.where_expr.sql());
            args.extend(self.where_expr.args().iter().cloned());
        }
        Ok((sql, args))
    }
}
