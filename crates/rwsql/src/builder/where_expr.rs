//! WHERE clause composition shared by SELECT, UPDATE and DELETE.

use super::arg::Arg;
use super::fragment::Fragment;
use super::option::{Opt, apply_options};
use super::tag::{Filter, TaggedColumn};
use crate::error::{BuildError, BuildResult};
use crate::value::Value;

/// Boolean connective placed before every term but the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conj {
    And,
    Or,
}

impl Conj {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Conj::And => "AND",
            Conj::Or => "OR",
        }
    }
}

/// Boolean expression built term by term, in call order.
///
/// No precedence rewriting happens: `a AND b OR c` is emitted exactly as
/// called. Group with explicit parentheses in the clause text when needed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereExpr {
    fragment: Fragment,
}

impl WhereExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fragment.is_empty()
    }

    pub fn sql(&self) -> &str {
        self.fragment.sql()
    }

    pub fn args(&self) -> &[Value] {
        self.fragment.args()
    }

    pub fn reset(&mut self) {
        self.fragment.reset();
    }

    pub fn to_parts(&self) -> (String, Vec<Value>) {
        self.fragment.to_parts()
    }

    /// Append an already resolved clause.
    pub fn append(&mut self, conj: Conj, clause: &str, args: Vec<Value>) {
        if !self.fragment.is_empty() {
            self.fragment.push_sql(" ");
            self.fragment.push_sql(conj.as_sql());
            self.fragment.push_sql(" ");
        }
        self.fragment.push(clause, args);
    }

    /// Append `clause` binding `arg` to its placeholder.
    pub fn push_term(&mut self, conj: Conj, clause: &str, arg: Arg, opts: &[Opt]) -> BuildResult<()> {
        if let Some((clause, args)) = resolve_term(clause, arg, false, opts)? {
            self.append(conj, &clause, args);
        }
        Ok(())
    }

    /// Append an IN clause. `arg` must be a collection; nested collections are
    /// flattened and the single placeholder grows to match.
    pub fn push_in(&mut self, conj: Conj, clause: &str, arg: Arg, opts: &[Opt]) -> BuildResult<()> {
        if let Some((clause, args)) = resolve_term(clause, arg, true, opts)? {
            self.append(conj, &clause, args);
        }
        Ok(())
    }

    /// AND every tagged field of `filter` into the expression.
    pub fn push_filter<F: Filter + ?Sized>(&mut self, filter: &F, opts: &[Opt]) -> BuildResult<()> {
        for field in filter.tagged_values() {
            let Some(column) = TaggedColumn::resolve(field)? else {
                continue;
            };
            let clause = column.spec.clause();
            let arg = Arg::Value {
                value: column.value,
                zero: column.zero,
            };
            if column.spec.op.is_in() {
                self.push_in(Conj::And, &clause, arg, opts)?;
            } else {
                self.push_term(Conj::And, &clause, arg, opts)?;
            }
        }
        Ok(())
    }
}

/// Turn a candidate clause and its argument into final text plus arguments.
///
/// Sub-queries replace the first `?` and skip the option chain. Values run the
/// option chain first; `Ok(None)` means an option vetoed the term.
pub(crate) fn resolve_term(
    clause: &str,
    arg: Arg,
    expand_in: bool,
    opts: &[Opt],
) -> BuildResult<Option<(String, Vec<Value>)>> {
    let zero = arg.is_zero();
    match arg {
        Arg::Query(built) => {
            let (sub_sql, sub_args) = built?;
            Ok(Some((clause.replacen('?', &sub_sql, 1), sub_args)))
        }
        Arg::Absent => Ok(apply_options(clause, zero, opts)?.map(|text| (text, Vec::new()))),
        Arg::Value { value, .. } => {
            let Some(text) = apply_options(clause, zero, opts)? else {
                return Ok(None);
            };
            if !expand_in {
                return Ok(Some((text, vec![value])));
            }
            let mut flat = Vec::new();
            if !value.flatten_into(&mut flat) {
                return Err(BuildError::NotACollection {
                    clause: clause.to_string(),
                });
            }
            let text = text.replacen('?', &placeholders(flat.len()), 1);
            Ok(Some((text, flat)))
        }
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
