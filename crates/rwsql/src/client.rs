//! Executor traits a database adapter implements.
//!
//! A [`Database`] is one connection pool (a writer or a reader). Beginning a
//! transaction on it yields a [`TxHandle`] pinned to a single connection.
//! Both run statements through [`Executor`], which takes SQL with `?`
//! placeholders; adapters rewrite placeholders for their driver.

use std::future::Future;

use crate::error::OrmResult;
use crate::value::Value;

/// Outcome of a write statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteResult {
    pub rows_affected: u64,
    /// Driver-reported id of the last inserted row, when the driver has one.
    pub last_insert_id: Option<i64>,
}

/// Runs statements.
pub trait Executor: Send + Sync {
    /// Row type returned by reads.
    type Row: Send;

    /// Execute a statement that returns no rows.
    fn execute_write(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl Future<Output = OrmResult<WriteResult>> + Send;

    /// Execute a statement and collect its rows.
    fn execute_read(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl Future<Output = OrmResult<Vec<Self::Row>>> + Send;
}

/// A pool that can also open transactions.
pub trait Database: Executor + Clone + 'static {
    type Tx: TxHandle<Row = Self::Row>;

    fn begin(
        &self,
        options: &TransactionOptions,
    ) -> impl Future<Output = OrmResult<Self::Tx>> + Send;
}

/// An open transaction.
///
/// `commit` and `rollback` take `&self` so the handle can be shared by every
/// session that joined the transaction. Finishing twice is an adapter error.
pub trait TxHandle: Executor + 'static {
    fn commit(&self) -> impl Future<Output = OrmResult<()>> + Send;

    fn rollback(&self) -> impl Future<Output = OrmResult<()>> + Send;
}

/// Transaction isolation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionIsolation {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl TransactionIsolation {
    pub fn as_sql(&self) -> &'static str {
        match self {
            TransactionIsolation::ReadUncommitted => "READ UNCOMMITTED",
            TransactionIsolation::ReadCommitted => "READ COMMITTED",
            TransactionIsolation::RepeatableRead => "REPEATABLE READ",
            TransactionIsolation::Serializable => "SERIALIZABLE",
        }
    }
}

/// Options for a new transaction. Unset fields use the server default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionOptions {
    pub isolation: Option<TransactionIsolation>,
    pub read_only: bool,
    pub deferrable: bool,
}

impl TransactionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn isolation_level(mut self, level: TransactionIsolation) -> Self {
        self.isolation = Some(level);
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn deferrable(mut self, deferrable: bool) -> Self {
        self.deferrable = deferrable;
        self
    }

    /// The `BEGIN` statement these options describe.
    pub fn begin_sql(&self) -> String {
        let mut modes = Vec::new();
        if let Some(level) = self.isolation {
            modes.push(format!("ISOLATION LEVEL {}", level.as_sql()));
        }
        if self.read_only {
            modes.push("READ ONLY".to_string());
        }
        if self.deferrable {
            modes.push("DEFERRABLE".to_string());
        }
        if modes.is_empty() {
            "BEGIN".to_string()
        } else {
            format!("BEGIN {}", modes.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_sql_defaults() {
        assert_eq!(TransactionOptions::new().begin_sql(), "BEGIN");
    }

    #[test]
    fn begin_sql_with_modes() {
        let opts = TransactionOptions::new()
            .isolation_level(TransactionIsolation::Serializable)
            .read_only(true)
            .deferrable(true);
        assert_eq!(
            opts.begin_sql(),
            "BEGIN ISOLATION LEVEL SERIALIZABLE, READ ONLY, DEFERRABLE"
        );

        let opts = TransactionOptions::new().read_only(true);
        assert_eq!(opts.begin_sql(), "BEGIN READ ONLY");
    }
}
