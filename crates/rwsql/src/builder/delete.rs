use super::traits::{Statement, impl_where_methods};
use super::where_expr::WhereExpr;
use crate::error::{BuildError, BuildResult};
use crate::value::Value;

/// DELETE statement builder.
///
/// Renders `DELETE FROM t [USING a, b] [WHERE ...]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteBuilder {
    table: String,
    using: Vec<String>,
    where_expr: WhereExpr,
    error: Option<BuildError>,
}

impl DeleteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, table: &str) -> Self {
        if self.error.is_none() {
            self.table = table.to_string();
        }
        self
    }

    /// Add a table to the USING list.
    pub fn using(mut self, table: &str) -> Self {
        if self.error.is_none() && !table.trim().is_empty() {
            self.using.push(table.to_string());
        }
        self
    }

    impl_where_methods!();

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

impl Statement for DeleteBuilder {
    fn build(&self) -> BuildResult<(String, Vec<Value>)> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if self.table.trim().is_empty() {
            return Err(BuildError::EmptyTable { statement: "delete" });
        }

        let mut sql = format!("DELETE FROM {}", self.table);
        if !self.using.is_empty() {
            sql.push_str(" USING ");
            sql.push_str(&self.using.join(", "));
        }
        let (where_sql, args) = self.where_expr.to_parts();
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }
        Ok((sql, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::delete;

    #[test]
    fn delete_with_where() {
        let (sql, args) = delete().table("users").and("id = ?", 1).build().unwrap();
        assert_eq!(sql, "DELETE FROM users WHERE id = ?");
        assert_eq!(args, vec![Value::Int(1)]);
    }

    #[test]
    fn delete_using() {
        let sql = delete()
            .table("orders")
            .using("users")
            .and("orders.user_id = users.id", ())
            .and("users.banned = ?", true)
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "DELETE FROM orders USING users WHERE orders.user_id = users.id AND users.banned = ?"
        );
    }

    #[test]
    fn delete_requires_table() {
        assert_eq!(
            delete().and("id = ?", 1).build().unwrap_err(),
            BuildError::EmptyTable { statement: "delete" }
        );
    }
}
