use crate::error::BuildResult;
use crate::monitor::explain_sql;
use crate::value::Value;

/// A buildable statement.
///
/// `build` is idempotent: calling it twice on an unmodified builder yields
/// the same text and arguments.
pub trait Statement {
    /// Render SQL text with `?` placeholders and the arguments bound to them.
    fn build(&self) -> BuildResult<(String, Vec<Value>)>;

    /// Debug helper: SQL text only.
    fn to_sql(&self) -> BuildResult<String> {
        self.build().map(|(sql, _)| sql)
    }

    /// Debug helper: SQL text with arguments interpolated.
    fn explain(&self) -> BuildResult<String> {
        let (sql, args) = self.build()?;
        Ok(explain_sql(&sql, &args))
    }
}

impl<S: Statement + ?Sized> Statement for &S {
    fn build(&self) -> BuildResult<(String, Vec<Value>)> {
        (**self).build()
    }
}

/// WHERE methods shared by the SELECT, UPDATE and DELETE builders.
///
/// The builder must have `where_expr: WhereExpr` and `error: Option<BuildError>`
/// fields plus `record` and `infer_table` methods.
macro_rules! impl_where_methods {
    () => {
        /// Append `clause` with AND. `?` in the clause binds `arg`; pass `()`
        /// for a constant clause, or a sub-query to embed it.
        pub fn and(self, clause: &str, arg: impl $crate::builder::IntoArg) -> Self {
            self.and_opts(clause, arg, &[])
        }

        /// [`and`](Self::and) with an option chain.
        pub fn and_opts(
            mut self,
            clause: &str,
            arg: impl $crate::builder::IntoArg,
            opts: &[$crate::builder::Opt],
        ) -> Self {
            if self.error.is_none() {
                let result = self.where_expr.push_term(
                    $crate::builder::Conj::And,
                    clause,
                    $crate::builder::IntoArg::into_arg(arg),
                    opts,
                );
                self.record(result);
            }
            self
        }

        /// Append `clause` with OR.
        pub fn or(self, clause: &str, arg: impl $crate::builder::IntoArg) -> Self {
            self.or_opts(clause, arg, &[])
        }

        pub fn or_opts(
            mut self,
            clause: &str,
            arg: impl $crate::builder::IntoArg,
            opts: &[$crate::builder::Opt],
        ) -> Self {
            if self.error.is_none() {
                let result = self.where_expr.push_term(
                    $crate::builder::Conj::Or,
                    clause,
                    $crate::builder::IntoArg::into_arg(arg),
                    opts,
                );
                self.record(result);
            }
            self
        }

        /// Append an IN clause with AND, e.g. `and_in("id IN (?)", vec![1, 2])`.
        ///
        /// Nested collections are flattened. An empty collection renders `()`.
        pub fn and_in(self, clause: &str, arg: impl $crate::builder::IntoArg) -> Self {
            self.and_in_opts(clause, arg, &[])
        }

        pub fn and_in_opts(
            mut self,
            clause: &str,
            arg: impl $crate::builder::IntoArg,
            opts: &[$crate::builder::Opt],
        ) -> Self {
            if self.error.is_none() {
                let result = self.where_expr.push_in(
                    $crate::builder::Conj::And,
                    clause,
                    $crate::builder::IntoArg::into_arg(arg),
                    opts,
                );
                self.record(result);
            }
            self
        }

        /// Append an IN clause with OR.
        pub fn or_in(self, clause: &str, arg: impl $crate::builder::IntoArg) -> Self {
            self.or_in_opts(clause, arg, &[])
        }

        pub fn or_in_opts(
            mut self,
            clause: &str,
            arg: impl $crate::builder::IntoArg,
            opts: &[$crate::builder::Opt],
        ) -> Self {
            if self.error.is_none() {
                let result = self.where_expr.push_in(
                    $crate::builder::Conj::Or,
                    clause,
                    $crate::builder::IntoArg::into_arg(arg),
                    opts,
                );
                self.record(result);
            }
            self
        }

        /// AND every tagged field of `filter`. Sets the table from the filter
        /// when none is set yet.
        pub fn filter<F: $crate::builder::Filter + ?Sized>(
            mut self,
            filter: &F,
            opts: &[$crate::builder::Opt],
        ) -> Self {
            if self.error.is_none() {
                if let Some(table) = filter.table_name() {
                    self.infer_table(table);
                }
                let result = self.where_expr.push_filter(filter, opts);
                self.record(result);
            }
            self
        }

        /// The WHERE expression built so far.
        pub fn where_expr(&self) -> &$crate::builder::WhereExpr {
            &self.where_expr
        }
    };
}

pub(crate) use impl_where_methods;
