//! Struct tag parsing for filter records.
//!
//! A filter field carries a tag of the form `col:<column>[;op:<op>]`:
//!
//! | op       | rendered clause        |
//! |----------|------------------------|
//! | `=`      | `col = ?` (default)    |
//! | `IN`     | `col IN (?)`           |
//! | `NOTIN`  | `col NOT IN (?)`       |
//! | `>=`     | `col >= ?`             |
//! | `%{}%`   | `col LIKE ?` (`%v%`)   |
//! | `{}%`    | `col LIKE ?` (`v%`)    |
//!
//! Operators are case-insensitive; whitespace around `;`-separated parts is
//! ignored.

use std::str::FromStr;

use crate::error::{BuildError, BuildResult};
use crate::value::{ToValue, Value};

/// LIKE pattern templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTemplate {
    /// `%{}%`
    Contains,
    /// `{}%`
    StartsWith,
}

impl LikeTemplate {
    pub fn template(&self) -> &'static str {
        match self {
            LikeTemplate::Contains => "%{}%",
            LikeTemplate::StartsWith => "{}%",
        }
    }

    pub fn apply(&self, text: &str) -> String {
        self.template().replacen("{}", text, 1)
    }
}

/// Comparison operator of a tagged column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOp {
    Eq,
    In,
    NotIn,
    Gte,
    Like(LikeTemplate),
}

impl TagOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            TagOp::Eq => "=",
            TagOp::In => "IN",
            TagOp::NotIn => "NOT IN",
            TagOp::Gte => ">=",
            TagOp::Like(_) => "LIKE",
        }
    }

    pub fn is_in(&self) -> bool {
        matches!(self, TagOp::In | TagOp::NotIn)
    }

    fn parse(token: &str, tag: &str) -> BuildResult<Self> {
        match token.to_ascii_uppercase().as_str() {
            "=" => Ok(TagOp::Eq),
            "IN" => Ok(TagOp::In),
            "NOTIN" => Ok(TagOp::NotIn),
            ">=" => Ok(TagOp::Gte),
            "%{}%" => Ok(TagOp::Like(LikeTemplate::Contains)),
            "{}%" => Ok(TagOp::Like(LikeTemplate::StartsWith)),
            _ => Err(BuildError::invalid_tag(
                tag,
                format!("unknown operator `{token}`"),
            )),
        }
    }
}

/// The column and operator a tag describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpec {
    pub column: String,
    pub op: TagOp,
}

impl TagSpec {
    pub fn parse(tag: &str) -> BuildResult<Self> {
        let mut column: Option<&str> = None;
        let mut op: Option<TagOp> = None;

        for part in tag.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let mut kv = part.split(':');
            let (Some(key), Some(value), None) = (kv.next(), kv.next(), kv.next()) else {
                return Err(BuildError::invalid_tag(
                    tag,
                    format!("`{part}` is not a key:value pair"),
                ));
            };
            let (key, value) = (key.trim(), value.trim());
            match key {
                "col" if column.is_none() => column = Some(value),
                "op" if op.is_none() => op = Some(TagOp::parse(value, tag)?),
                "col" | "op" => {
                    return Err(BuildError::invalid_tag(tag, format!("duplicate key `{key}`")));
                }
                other => {
                    return Err(BuildError::invalid_tag(tag, format!("unknown key `{other}`")));
                }
            }
        }

        match column {
            Some(column) if !column.is_empty() => Ok(TagSpec {
                column: column.to_string(),
                op: op.unwrap_or(TagOp::Eq),
            }),
            _ => Err(BuildError::invalid_tag(tag, "missing `col`")),
        }
    }

    /// Clause text with a single placeholder, ready for the WHERE builder.
    pub fn clause(&self) -> String {
        if self.op.is_in() {
            format!("{} {} (?)", self.column, self.op.as_sql())
        } else {
            format!("{} {} ?", self.column, self.op.as_sql())
        }
    }
}

impl FromStr for TagSpec {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TagSpec::parse(s)
    }
}

/// A tagged field as reported by a [`Filter`]: raw tag plus the field's value.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedValue {
    pub tag: &'static str,
    pub value: Value,
    pub zero: bool,
}

impl TaggedValue {
    pub fn new<T: ToValue + ?Sized>(tag: &'static str, value: &T) -> Self {
        Self {
            tag,
            value: value.to_value(),
            zero: value.is_zero(),
        }
    }
}

/// A resolved filter column: parsed tag, final bound value and zero flag.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedColumn {
    pub spec: TagSpec,
    pub value: Value,
    pub zero: bool,
}

impl TaggedColumn {
    /// Resolve a tagged field. Fields with an empty tag yield `None`.
    ///
    /// LIKE templates are applied here, so the bound value is the finished
    /// pattern. An empty string is left untouched and stays zero.
    pub fn resolve(field: TaggedValue) -> BuildResult<Option<Self>> {
        if field.tag.trim().is_empty() {
            return Ok(None);
        }
        let spec = TagSpec::parse(field.tag)?;
        let value = match (spec.op, field.value) {
            (TagOp::Like(template), Value::Text(text)) if !text.is_empty() => {
                Value::Text(template.apply(&text))
            }
            (TagOp::Like(_), value @ (Value::Text(_) | Value::Null)) => value,
            (TagOp::Like(_), _) => {
                return Err(BuildError::LikeOnNonText {
                    column: spec.column,
                });
            }
            (_, value) => value,
        };
        Ok(Some(Self {
            spec,
            value,
            zero: field.zero,
        }))
    }
}

/// A record whose tagged fields become WHERE terms.
///
/// Usually derived with `#[derive(Filter)]`; hand-written impls work the same.
pub trait Filter {
    /// Table used when the statement has none yet.
    fn table_name(&self) -> Option<&str> {
        None
    }

    fn tagged_values(&self) -> Vec<TaggedValue>;
}

impl<F: Filter + ?Sized> Filter for &F {
    fn table_name(&self) -> Option<&str> {
        (**self).table_name()
    }

    fn tagged_values(&self) -> Vec<TaggedValue> {
        (**self).tagged_values()
    }
}
