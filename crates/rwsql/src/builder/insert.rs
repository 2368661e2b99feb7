use super::option::{Opt, apply_options};
use super::record::Record;
use super::traits::Statement;
use crate::error::{BuildError, BuildResult};
use crate::value::{Value, ValueMap};

/// One decomposed INSERT row: `(column, value)` in column order.
pub type InsertRow = Vec<(String, Value)>;

/// Rows decomposed from an insert source, plus the table it names, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertRows {
    pub table: Option<String>,
    pub rows: Vec<InsertRow>,
}

/// Anything [`InsertBuilder::rows`] accepts: a record, a [`ValueMap`], or a
/// slice/`Vec` of either.
///
/// Record rows run the option chain per column and always omit zero columns.
/// Map rows run the option chain but keep zero values.
pub trait InsertSource {
    fn into_rows(self, opts: &[Opt]) -> BuildResult<InsertRows>;
}

fn record_row<R: Record + ?Sized>(record: &R, opts: &[Opt]) -> BuildResult<InsertRow> {
    let mut row = Vec::new();
    for field in record.fields() {
        let Some(column) = apply_options(&field.column, field.zero, opts)? else {
            continue;
        };
        if !field.zero {
            row.push((column, field.value));
        }
    }
    Ok(row)
}

fn map_row(map: &ValueMap, opts: &[Opt]) -> BuildResult<InsertRow> {
    let mut row = Vec::with_capacity(map.len());
    for (key, value) in map.iter() {
        if let Some(column) = apply_options(key, value.is_zero(), opts)? {
            row.push((column, value.clone()));
        }
    }
    Ok(row)
}

fn records<R: Record>(records: &[R], opts: &[Opt]) -> BuildResult<InsertRows> {
    Ok(InsertRows {
        table: records
            .first()
            .and_then(|r| r.table_name())
            .map(str::to_string),
        rows: records
            .iter()
            .map(|r| record_row(r, opts))
            .collect::<BuildResult<_>>()?,
    })
}

fn maps(maps: &[ValueMap], opts: &[Opt]) -> BuildResult<InsertRows> {
    Ok(InsertRows {
        table: None,
        rows: maps.iter().map(|m| map_row(m, opts)).collect::<BuildResult<_>>()?,
    })
}

impl<R: Record> InsertSource for &R {
    fn into_rows(self, opts: &[Opt]) -> BuildResult<InsertRows> {
        records(std::slice::from_ref(self), opts)
    }
}

impl<R: Record> InsertSource for &[R] {
    fn into_rows(self, opts: &[Opt]) -> BuildResult<InsertRows> {
        records(self, opts)
    }
}

impl<R: Record> InsertSource for &Vec<R> {
    fn into_rows(self, opts: &[Opt]) -> BuildResult<InsertRows> {
        records(self, opts)
    }
}

impl<R: Record> InsertSource for Vec<R> {
    fn into_rows(self, opts: &[Opt]) -> BuildResult<InsertRows> {
        records(&self, opts)
    }
}

impl InsertSource for ValueMap {
    fn into_rows(self, opts: &[Opt]) -> BuildResult<InsertRows> {
        maps(std::slice::from_ref(&self), opts)
    }
}

impl InsertSource for &ValueMap {
    fn into_rows(self, opts: &[Opt]) -> BuildResult<InsertRows> {
        maps(std::slice::from_ref(self), opts)
    }
}

impl InsertSource for &[ValueMap] {
    fn into_rows(self, opts: &[Opt]) -> BuildResult<InsertRows> {
        maps(self, opts)
    }
}

impl InsertSource for Vec<ValueMap> {
    fn into_rows(self, opts: &[Opt]) -> BuildResult<InsertRows> {
        maps(&self, opts)
    }
}

/// INSERT statement builder.
///
/// ```ignore
/// let (sql, args) = insert()
///     .table("users")
///     .rows(value_map! { "id" => 1, "name" => "vic" })
///     .build()?;
/// assert_eq!(sql, "INSERT INTO users (id, name) VALUES (?, ?)");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertBuilder {
    table: String,
    rows: Vec<InsertRow>,
    error: Option<BuildError>,
}

impl InsertBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, table: &str) -> Self {
        if self.error.is_none() {
            self.table = table.to_string();
        }
        self
    }

    /// Add rows. The first row ever added fixes the column order.
    pub fn rows(self, source: impl InsertSource) -> Self {
        self.rows_opts(source, &[])
    }

    /// [`rows`](Self::rows) with an option chain applied to every column.
    pub fn rows_opts(mut self, source: impl InsertSource, opts: &[Opt]) -> Self {
        if self.error.is_some() {
            return self;
        }
        match source.into_rows(opts) {
            Ok(decomposed) => {
                if self.table.is_empty() {
                    if let Some(table) = decomposed.table {
                        self.table = table;
                    }
                }
                self.rows.extend(decomposed.rows);
            }
            Err(err) => self.error = Some(err),
        }
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl Statement for InsertBuilder {
    fn build(&self) -> BuildResult<(String, Vec<Value>)> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if self.table.trim().is_empty() {
            return Err(BuildError::EmptyTable { statement: "insert" });
        }
        let Some(first) = self.rows.first() else {
            return Err(BuildError::NoRows);
        };
        let columns: Vec<&str> = first.iter().map(|(c, _)| c.as_str()).collect();

        let mut args = Vec::with_capacity(columns.len() * self.rows.len());
        let mut tuples = Vec::with_capacity(self.rows.len());
        let tuple = format!("({})", vec!["?"; columns.len()].join(", "));

        for (index, row) in self.rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(BuildError::RowShapeMismatch { row: index });
            }
            for column in &columns {
                let value = row
                    .iter()
                    .find(|(c, _)| c.as_str() == *column)
                    .map(|(_, v)| v.clone())
                    .ok_or(BuildError::RowShapeMismatch { row: index })?;
                args.push(value);
            }
            tuples.push(tuple.as_str());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.table,
            columns.join(", "),
            tuples.join(", ")
        );
        Ok((sql, args))
    }
}
