//! PostgreSQL adapter over `deadpool-postgres`.

use std::sync::atomic::{AtomicBool, Ordering};

use deadpool_postgres::Pool;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

use crate::client::{Database, Executor, TransactionOptions, TxHandle, WriteResult};
use crate::cluster::Cluster;
use crate::config::ClusterConfig;
use crate::error::{OrmError, OrmResult};
use crate::pool::create_pool_with_size;
use crate::session::Session;
use crate::value::Value;

/// Rewrite `?` placeholders to PostgreSQL's `$1..$n`.
///
/// Placeholders inside single-quoted literals and double-quoted identifiers
/// are left alone.
pub fn rebind(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut n = 0usize;
    let mut quote: Option<char> = None;
    for ch in sql.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => {
                quote = None;
                out.push(c);
            }
            (Some(_), c) => out.push(c),
            (None, '\'' | '"') => {
                quote = Some(ch);
                out.push(ch);
            }
            (None, '?') => {
                n += 1;
                out.push('$');
                out.push_str(&n.to_string());
            }
            (None, c) => out.push(c),
        }
    }
    out
}

fn params(args: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    args.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

/// One pool: a writer or a reader.
#[derive(Clone)]
pub struct PgDatabase {
    pool: Pool,
}

impl std::fmt::Debug for PgDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgDatabase")
            .field("status", &self.pool.status())
            .finish()
    }
}

impl PgDatabase {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn connect(database_url: &str, max_size: usize) -> OrmResult<Self> {
        Ok(Self::new(create_pool_with_size(database_url, max_size)?))
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

impl Executor for PgDatabase {
    type Row = Row;

    async fn execute_write(&self, sql: &str, args: &[Value]) -> OrmResult<WriteResult> {
        let client = self.pool.get().await?;
        let sql = rebind(sql);
        let rows_affected = client.execute(sql.as_str(), &params(args)).await?;
        Ok(WriteResult {
            rows_affected,
            last_insert_id: None,
        })
    }

    async fn execute_read(&self, sql: &str, args: &[Value]) -> OrmResult<Vec<Row>> {
        let client = self.pool.get().await?;
        let sql = rebind(sql);
        Ok(client.query(sql.as_str(), &params(args)).await?)
    }
}

impl Database for PgDatabase {
    type Tx = PgTransaction;

    async fn begin(&self, options: &TransactionOptions) -> OrmResult<PgTransaction> {
        let client = self.pool.get().await?;
        client.batch_execute(&options.begin_sql()).await?;
        Ok(PgTransaction {
            client: Some(client),
            finished: AtomicBool::new(false),
        })
    }
}

/// A transaction pinned to one pooled connection.
///
/// Dropping it while still open detaches the connection from the pool, which
/// closes it and lets the server abort the transaction.
pub struct PgTransaction {
    client: Option<deadpool_postgres::Client>,
    finished: AtomicBool,
}

impl std::fmt::Debug for PgTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgTransaction")
            .field("finished", &self.finished.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl PgTransaction {
    fn client(&self) -> OrmResult<&deadpool_postgres::Client> {
        if self.finished.load(Ordering::Acquire) {
            return Err(OrmError::driver("transaction already finished"));
        }
        self.client
            .as_ref()
            .ok_or_else(|| OrmError::driver("transaction has no connection"))
    }
}

impl Executor for PgTransaction {
    type Row = Row;

    async fn execute_write(&self, sql: &str, args: &[Value]) -> OrmResult<WriteResult> {
        let client = self.client()?;
        let sql = rebind(sql);
        let rows_affected = client.execute(sql.as_str(), &params(args)).await?;
        Ok(WriteResult {
            rows_affected,
            last_insert_id: None,
        })
    }

    async fn execute_read(&self, sql: &str, args: &[Value]) -> OrmResult<Vec<Row>> {
        let client = self.client()?;
        let sql = rebind(sql);
        Ok(client.query(sql.as_str(), &params(args)).await?)
    }
}

impl TxHandle for PgTransaction {
    /// A failed COMMIT leaves the handle open so a following rollback still
    /// reaches the server.
    async fn commit(&self) -> OrmResult<()> {
        self.client()?.batch_execute("COMMIT").await?;
        self.finished.store(true, Ordering::Release);
        Ok(())
    }

    /// Rolling back a finished transaction is a no-op.
    async fn rollback(&self) -> OrmResult<()> {
        if self.finished.load(Ordering::Acquire) {
            return Ok(());
        }
        let result = self.client()?.batch_execute("ROLLBACK").await;
        self.finished.store(true, Ordering::Release);
        Ok(result?)
    }
}

impl Drop for PgTransaction {
    fn drop(&mut self) {
        if self.finished.load(Ordering::Acquire) {
            return;
        }
        if let Some(client) = self.client.take() {
            tracing::warn!(
                target: crate::monitor::TRACING_TARGET_TX,
                "transaction dropped while open; discarding its connection"
            );
            drop(deadpool_postgres::Object::take(client));
        }
    }
}

/// Build pools for every URL in `config` and wrap them in a session.
///
/// Pools connect lazily, so this fails only on malformed URLs.
pub fn connect(config: &ClusterConfig) -> OrmResult<Session<PgDatabase>> {
    config.validate()?;
    let open = |urls: &[String]| -> OrmResult<Vec<PgDatabase>> {
        urls.iter()
            .map(|url| PgDatabase::connect(url, config.max_pool_size))
            .collect()
    };
    let writers = open(&config.writers)?;
    let readers = open(&config.readers)?;
    Ok(Session::new(Cluster::round_robin(writers, readers)).with_log_config(config.log.clone()))
}
