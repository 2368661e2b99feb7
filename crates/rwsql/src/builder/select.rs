use super::fragment::Fragment;
use super::traits::{Statement, impl_where_methods};
use super::where_expr::WhereExpr;
use crate::error::{BuildError, BuildResult};
use crate::value::Value;

/// Join flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinKind::Inner => "JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL OUTER JOIN",
        }
    }
}

/// Row locking clause appended after LIMIT/OFFSET.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// `FOR UPDATE`
    ForUpdate,
    /// `LOCK IN SHARE MODE`
    ShareMode,
}

impl LockMode {
    pub fn as_sql(&self) -> &'static str {
        match self {
            LockMode::ForUpdate => "FOR UPDATE",
            LockMode::ShareMode => "LOCK IN SHARE MODE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetOp {
    Union,
    UnionAll,
}

impl SetOp {
    fn as_sql(&self) -> &'static str {
        match self {
            SetOp::Union => "UNION",
            SetOp::UnionAll => "UNION ALL",
        }
    }
}

/// Page-number pagination. Pages start at 1; page 0 is treated as page 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub per_page: u64,
    pub page: u64,
}

impl Pagination {
    pub fn new(per_page: u64, page: u64) -> Self {
        Self { per_page, page }
    }

    /// `(limit, offset)` for this page. `per_page == 0` means no limit.
    pub fn limit_offset(&self) -> (u64, u64) {
        if self.per_page == 0 {
            return (0, 0);
        }
        let offset = self.page.saturating_sub(1).saturating_mul(self.per_page);
        (self.per_page, offset)
    }

    /// Number of pages needed for `total` rows.
    pub fn total_pages(&self, total: u64) -> u64 {
        if self.per_page == 0 {
            return 0;
        }
        total.div_ceil(self.per_page)
    }
}

/// SELECT statement builder.
///
/// # Example
///
/// ```ignore
/// let (sql, args) = select()
///     .from("users")
///     .select("id, name")
///     .and("status = ?", 1)
///     .and_in("kind IN (?)", vec![1, 2])
///     .order_by("id DESC")
///     .limit(20)
///     .build()?;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectBuilder {
    projection: Vec<String>,
    from: String,
    from_args: Vec<Value>,
    joins: Fragment,
    where_expr: WhereExpr,
    group_by: Vec<String>,
    order_by: Vec<String>,
    limit: u64,
    offset: u64,
    lock: Option<String>,
    unions: Vec<(SetOp, SelectBuilder)>,
    error: Option<BuildError>,
}

impl SelectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the FROM source (table name, alias, or any raw source text).
    pub fn from(mut self, source: &str) -> Self {
        if self.error.is_none() {
            self.from = source.to_string();
            self.from_args.clear();
        }
        self
    }

    /// Set the FROM source to `source` with its first `?` replaced by `sub`.
    ///
    /// ```ignore
    /// select().from_query("(?) stat", &select().from("account").group_by("user_id"))
    /// ```
    pub fn from_query(mut self, source: &str, sub: &(impl Statement + ?Sized)) -> Self {
        if self.error.is_some() {
            return self;
        }
        match sub.build() {
            Ok((sub_sql, sub_args)) => {
                self.from = source.replacen('?', &sub_sql, 1);
                self.from_args = sub_args;
            }
            Err(err) => self.error = Some(err),
        }
        self
    }

    /// Current FROM source.
    pub fn source(&self) -> &str {
        &self.from
    }

    /// Append to the projection list.
    pub fn select(mut self, columns: &str) -> Self {
        if self.error.is_none() && !columns.trim().is_empty() {
            self.projection.push(columns.to_string());
        }
        self
    }

    /// Append several columns to the projection list.
    pub fn select_columns(mut self, columns: &[&str]) -> Self {
        if self.error.is_none() {
            self.projection
                .extend(columns.iter().filter(|c| !c.trim().is_empty()).map(|c| c.to_string()));
        }
        self
    }

    /// Replace the projection with `COUNT(1)`.
    pub fn count(mut self) -> Self {
        if self.error.is_none() {
            self.projection = vec!["COUNT(1)".to_string()];
        }
        self
    }

    /// `JOIN <clause>`, e.g. `join("projects p ON u.id = p.user_id")`.
    pub fn join(self, clause: &str) -> Self {
        self.push_join(JoinKind::Inner, clause, Vec::new())
    }

    pub fn left_join(self, clause: &str) -> Self {
        self.push_join(JoinKind::Left, clause, Vec::new())
    }

    pub fn right_join(self, clause: &str) -> Self {
        self.push_join(JoinKind::Right, clause, Vec::new())
    }

    pub fn full_join(self, clause: &str) -> Self {
        self.push_join(JoinKind::Full, clause, Vec::new())
    }

    /// Join a sub-query: the first `?` of `clause` is replaced by `sub`.
    pub fn join_query(
        mut self,
        kind: JoinKind,
        clause: &str,
        sub: &(impl Statement + ?Sized),
    ) -> Self {
        if self.error.is_some() {
            return self;
        }
        match sub.build() {
            Ok((sub_sql, sub_args)) => {
                let clause = clause.replacen('?', &sub_sql, 1);
                self.push_join(kind, &clause, sub_args)
            }
            Err(err) => {
                self.error = Some(err);
                self
            }
        }
    }

    fn push_join(mut self, kind: JoinKind, clause: &str, args: Vec<Value>) -> Self {
        if self.error.is_none() {
            let text = format!("{} {}", kind.as_sql(), clause);
            self.joins.push_separated(" ", &text, args);
        }
        self
    }

    impl_where_methods!();

    /// Append GROUP BY columns. Repeated calls accumulate.
    pub fn group_by(mut self, columns: &str) -> Self {
        if self.error.is_none() && !columns.trim().is_empty() {
            self.group_by.push(columns.to_string());
        }
        self
    }

    /// Append ORDER BY terms. Repeated calls accumulate.
    pub fn order_by(mut self, terms: &str) -> Self {
        if self.error.is_none() && !terms.trim().is_empty() {
            self.order_by.push(terms.to_string());
        }
        self
    }

    /// `LIMIT n`; 0 renders nothing.
    pub fn limit(mut self, limit: u64) -> Self {
        if self.error.is_none() {
            self.limit = limit;
        }
        self
    }

    /// `OFFSET n`; 0 renders nothing.
    pub fn offset(mut self, offset: u64) -> Self {
        if self.error.is_none() {
            self.offset = offset;
        }
        self
    }

    pub fn limit_offset(self, limit: u64, offset: u64) -> Self {
        self.limit(limit).offset(offset)
    }

    pub fn paginate(self, page: Pagination) -> Self {
        let (limit, offset) = page.limit_offset();
        self.limit_offset(limit, offset)
    }

    pub fn lock(self, mode: LockMode) -> Self {
        self.lock_raw(mode.as_sql())
    }

    /// Any other locking clause, e.g. `FOR SHARE SKIP LOCKED`.
    pub fn lock_raw(mut self, clause: &str) -> Self {
        if self.error.is_none() {
            self.lock = Some(clause.to_string());
        }
        self
    }

    /// `(self) UNION (other)`.
    pub fn union(self, other: SelectBuilder) -> Self {
        self.push_union(SetOp::Union, other)
    }

    /// `(self) UNION ALL (other)`.
    pub fn union_all(self, other: SelectBuilder) -> Self {
        self.push_union(SetOp::UnionAll, other)
    }

    fn push_union(mut self, op: SetOp, other: SelectBuilder) -> Self {
        if self.error.is_none() {
            self.unions.push((op, other));
        }
        self
    }

    fn record(&mut self, result: BuildResult<()>) {
        if let Err(err) = result {
            self.error.get_or_insert(err);
        }
    }

    fn infer_table(&mut self, table: &str) {
        if self.from.is_empty() {
            self.from = table.to_string();
        }
    }

    fn build_single(&self) -> BuildResult<(String, Vec<Value>)> {
        if self.from.trim().is_empty() {
            return Err(BuildError::EmptyTable { statement: "select" });
        }

        let mut sql = String::with_capacity(128);
        let mut args = Vec::with_capacity(self.from_args.len() + self.where_expr.args().len());

        sql.push_str("SELECT ");
        if self.projection.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.projection.join(", "));
        }
        sql.push_str(" FROM ");
        sql.push_str(&self.from);
        args.extend(self.from_args.iter().cloned());

        if !self.joins.is_empty() {
            sql.push(' ');
            sql.push_str(self.joins.sql());
            args.extend(self.joins.args().iter().cloned());
        }

        if !self.where_expr.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(self.where_expr.sql());
            args.extend(self.where_expr.args().iter().cloned());
        }

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }

        if self.limit > 0 {
            sql.push_str(&format!(" LIMIT {}", self.limit));
        }

        if self.offset > 0 {
            sql.push_str(&format!(" OFFSET {}", self.offset));
        }

        if let Some(lock) = &self.lock {
            sql.push(' ');
            sql.push_str(lock);
        }

        Ok((sql, args))
    }
}

impl Statement for SelectBuilder {
    fn build(&self) -> BuildResult<(String, Vec<Value>)> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        let (sql, mut args) = self.build_single()?;
        if self.unions.is_empty() {
            return Ok((sql, args));
        }

        let mut sql = format!("({sql})");
        for (op, other) in &self.unions {
            let (other_sql, other_args) = other.build()?;
            sql.push_str(&format!(" {} ({other_sql})", op.as_sql()));
            args.extend(other_args);
        }
        Ok((sql, args))
    }
}
