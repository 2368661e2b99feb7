//! Dynamic bound-argument values.
//!
//! Every argument a builder collects is converted into a [`Value`] at the call
//! site. The conversion goes through [`ToValue`], which also carries the
//! per-type "zero" predicate used by [`Opt::SkipZero`](crate::Opt::SkipZero)
//! and [`Opt::Require`](crate::Opt::Require).

use std::error::Error;
use std::fmt;

use bytes::{Bytes, BytesMut};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio_postgres::types::{IsNull, Kind, ToSql, Type, to_sql_checked};
use uuid::Uuid;

/// A single bound argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    Uuid(Uuid),
    Json(serde_json::Value),
    /// A collection. Lists may nest; IN expansion flattens them.
    List(Vec<Value>),
}

impl Value {
    /// Zero classification of an already converted value.
    ///
    /// `Bool` is never zero. Timestamps and dates are zero at the Unix epoch.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(_) => false,
            Value::Int(v) => *v == 0,
            Value::UInt(v) => *v == 0,
            Value::Float(v) => v.to_bits() == 0,
            Value::Text(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty(),
            Value::Timestamp(ts) => ts.timestamp() == 0 && ts.timestamp_subsec_nanos() == 0,
            Value::Date(d) => *d == DateTime::<Utc>::UNIX_EPOCH.date_naive(),
            Value::Uuid(u) => u.is_nil(),
            Value::Json(j) => j.is_null(),
            Value::List(items) => items.is_empty(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Recursively flatten nested lists into `out`, left to right.
    ///
    /// Returns `false` when `self` is not a list at all.
    pub(crate) fn flatten_into(self, out: &mut Vec<Value>) -> bool {
        match self {
            Value::List(items) => {
                for item in items {
                    match item {
                        nested @ Value::List(_) => {
                            nested.flatten_into(out);
                        }
                        scalar => out.push(scalar),
                    }
                }
                true
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// Log-friendly rendering used by [`explain_sql`](crate::explain_sql).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "<binary {} bytes>", b.len()),
            Value::Timestamp(ts) => write!(f, "\"{}\"", ts.format("%Y-%m-%d %H:%M:%S")),
            Value::Date(d) => write!(f, "\"{}\"", d.format("%Y-%m-%d")),
            Value::Uuid(u) => write!(f, "\"{u}\""),
            Value::Json(j) => write!(f, "'{j}'"),
            Value::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Conversion into a bound [`Value`] plus the zero predicate for the type.
///
/// `Option<T>` is the nullable wrapper: `None` is zero and binds as NULL,
/// `Some(v)` is never zero even if `v` is.
pub trait ToValue {
    fn to_value(&self) -> Value;

    fn is_zero(&self) -> bool {
        self.to_value().is_zero()
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }

    fn is_zero(&self) -> bool {
        Value::is_zero(self)
    }
}

macro_rules! impl_to_value_signed {
    ($($t:ty),*) => {$(
        impl ToValue for $t {
            fn to_value(&self) -> Value {
                Value::Int(i64::from(*self))
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }
        }
    )*};
}

macro_rules! impl_to_value_unsigned {
    ($($t:ty),*) => {$(
        impl ToValue for $t {
            fn to_value(&self) -> Value {
                Value::UInt(u64::from(*self))
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }
        }
    )*};
}

impl_to_value_signed!(i8, i16, i32, i64);
impl_to_value_unsigned!(u8, u16, u32, u64);

impl ToValue for isize {
    fn to_value(&self) -> Value {
        Value::Int(*self as i64)
    }
}

impl ToValue for usize {
    fn to_value(&self) -> Value {
        Value::UInt(*self as u64)
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn is_zero(&self) -> bool {
        false
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl ToValue for Bytes {
    fn to_value(&self) -> Value {
        Value::Bytes(self.to_vec())
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl ToValue for DateTime<Utc> {
    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }
}

impl ToValue for NaiveDateTime {
    fn to_value(&self) -> Value {
        Value::Timestamp(self.and_utc())
    }
}

impl ToValue for NaiveDate {
    fn to_value(&self) -> Value {
        Value::Date(*self)
    }
}

impl ToValue for Uuid {
    fn to_value(&self) -> Value {
        Value::Uuid(*self)
    }

    fn is_zero(&self) -> bool {
        self.is_nil()
    }
}

impl ToValue for serde_json::Value {
    fn to_value(&self) -> Value {
        Value::Json(self.clone())
    }

    fn is_zero(&self) -> bool {
        self.is_null()
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }

    fn is_zero(&self) -> bool {
        N == 0
    }
}

/// An insertion-ordered column/value map.
///
/// Rendering follows insertion order, so `INSERT` column lists and `SET`
/// assignments built from a map are deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMap {
    entries: Vec<(String, Value)>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert or replace a value. Replacing keeps the original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToValue) -> Option<Value> {
        let key = key.into();
        let value = value.to_value();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: ToValue> FromIterator<(K, V)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ValueMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for ValueMap {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Build a [`ValueMap`] literal, preserving the written order.
///
/// ```ignore
/// let row = rwsql::value_map! { "id" => 1, "name" => "vic" };
/// ```
#[macro_export]
macro_rules! value_map {
    () => { $crate::ValueMap::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::ValueMap::new();
        $( map.insert($key, $value); )+
        map
    }};
}

fn narrow_int(v: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
    if *ty == Type::INT2 {
        i16::try_from(v)?.to_sql(ty, out)
    } else if *ty == Type::INT4 {
        i32::try_from(v)?.to_sql(ty, out)
    } else if *ty == Type::FLOAT8 {
        (v as f64).to_sql(ty, out)
    } else if *ty == Type::FLOAT4 {
        (v as f32).to_sql(ty, out)
    } else {
        v.to_sql(ty, out)
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => b.to_sql(ty, out),
            Value::Int(v) => narrow_int(*v, ty, out),
            Value::UInt(v) => narrow_int(i64::try_from(*v)?, ty, out),
            Value::Float(v) => {
                if *ty == Type::FLOAT4 {
                    (*v as f32).to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            Value::Text(s) => s.to_sql(ty, out),
            Value::Bytes(b) => b.as_slice().to_sql(ty, out),
            Value::Timestamp(ts) => {
                if *ty == Type::TIMESTAMP {
                    ts.naive_utc().to_sql(ty, out)
                } else {
                    ts.to_sql(ty, out)
                }
            }
            Value::Date(d) => d.to_sql(ty, out),
            Value::Uuid(u) => u.to_sql(ty, out),
            Value::Json(j) => j.to_sql(ty, out),
            Value::List(items) => match ty.kind() {
                Kind::Array(_) => items.to_sql(ty, out),
                _ => Err(format!("cannot bind a list to a parameter of type {ty}").into()),
            },
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}
