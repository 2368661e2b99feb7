//! Statement execution with read/write routing and transaction propagation.
//!
//! A [`Session`] is a cheap handle: the cluster, the routing intent and the
//! active transaction (if any). Derived sessions (`read_only()`,
//! `must_write()`, the session handed to an [`execute_tx`](Session::execute_tx)
//! callback) share the cluster and transaction with their parent.
//!
//! ```ignore
//! let session = Session::new(Cluster::round_robin(writers, readers));
//!
//! session
//!     .execute_tx(TransactionOptions::new(), |tx| async move {
//!         tx.execute(&update().table("users").set("level", 2).and("id = ?", 1)).await?;
//!         tx.execute(&insert().table("audit").rows(value_map! { "user_id" => 1 })).await?;
//!         Ok(())
//!     })
//!     .await?;
//! ```

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;

use crate::builder::Statement;
use crate::client::{Database, Executor, TransactionOptions, TxHandle, WriteResult};
use crate::cluster::{Cluster, RoutingIntent};
use crate::error::{OrmError, OrmResult};
use crate::monitor::{LogConfig, TRACING_TARGET_TX, log_query};
use crate::row::FromRow;
use crate::value::Value;

/// Routing and transaction context for executing statements.
pub struct Session<D: Database> {
    cluster: Arc<Cluster<D>>,
    intent: RoutingIntent,
    tx: Option<Arc<D::Tx>>,
    log: Arc<LogConfig>,
}

impl<D: Database> Clone for Session<D> {
    fn clone(&self) -> Self {
        Self {
            cluster: Arc::clone(&self.cluster),
            intent: self.intent,
            tx: self.tx.clone(),
            log: Arc::clone(&self.log),
        }
    }
}

impl<D: Database> std::fmt::Debug for Session<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("intent", &self.intent)
            .field("in_transaction", &self.tx.is_some())
            .field("log", &self.log)
            .finish_non_exhaustive()
    }
}

impl<D: Database> Session<D> {
    pub fn new(cluster: Cluster<D>) -> Self {
        Self {
            cluster: Arc::new(cluster),
            intent: RoutingIntent::None,
            tx: None,
            log: Arc::new(LogConfig::default()),
        }
    }

    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = Arc::new(log);
        self
    }

    /// A session that sends everything to the reader.
    pub fn read_only(&self) -> Self {
        self.with_intent(RoutingIntent::ReadOnly)
    }

    /// A session that sends everything, reads included, to the writer.
    pub fn must_write(&self) -> Self {
        self.with_intent(RoutingIntent::MustWrite)
    }

    fn with_intent(&self, intent: RoutingIntent) -> Self {
        let mut session = self.clone();
        session.intent = intent;
        session
    }

    fn with_tx(&self, tx: Arc<D::Tx>) -> Self {
        let mut session = self.clone();
        session.tx = Some(tx);
        session
    }

    pub fn intent(&self) -> RoutingIntent {
        self.intent
    }

    pub fn is_read_only(&self) -> bool {
        self.intent == RoutingIntent::ReadOnly
    }

    pub fn in_transaction(&self) -> bool {
        self.tx.is_some()
    }

    pub fn cluster(&self) -> &Cluster<D> {
        &self.cluster
    }

    /// Reads skip the writer unless the caller insists on it.
    fn read_intent(&self) -> RoutingIntent {
        match self.intent {
            RoutingIntent::MustWrite => RoutingIntent::MustWrite,
            RoutingIntent::None | RoutingIntent::ReadOnly => RoutingIntent::ReadOnly,
        }
    }

    fn route_name(intent: RoutingIntent) -> &'static str {
        match intent {
            RoutingIntent::ReadOnly => "reader",
            RoutingIntent::None | RoutingIntent::MustWrite => "writer",
        }
    }

    /// Build and execute a statement that returns no rows.
    pub async fn execute(&self, statement: &(impl Statement + ?Sized)) -> OrmResult<WriteResult> {
        let (sql, args) = statement.build()?;
        self.execute_sql(&sql, &args).await
    }

    /// Execute raw SQL with `?` placeholders.
    pub async fn execute_sql(&self, sql: &str, args: &[Value]) -> OrmResult<WriteResult> {
        let started = Instant::now();
        let (route, result) = match &self.tx {
            Some(tx) => ("tx", tx.execute_write(sql, args).await),
            None => {
                let db = self.cluster.get(self.intent)?;
                (Self::route_name(self.intent), db.execute_write(sql, args).await)
            }
        };
        let rows = result.as_ref().map(|r| r.rows_affected).unwrap_or(0);
        log_query(&self.log, route, sql, args, rows, started.elapsed(), result.as_ref().err());
        result
    }

    /// Build and run a statement, returning the driver's rows.
    pub async fn query(&self, statement: &(impl Statement + ?Sized)) -> OrmResult<Vec<D::Row>> {
        let (sql, args) = statement.build()?;
        self.query_sql(&sql, &args).await
    }

    /// Run raw SQL with `?` placeholders, returning the driver's rows.
    pub async fn query_sql(&self, sql: &str, args: &[Value]) -> OrmResult<Vec<D::Row>> {
        let started = Instant::now();
        let (route, result) = match &self.tx {
            Some(tx) => ("tx", tx.execute_read(sql, args).await),
            None => {
                let intent = self.read_intent();
                let db = self.cluster.get(intent)?;
                (Self::route_name(intent), db.execute_read(sql, args).await)
            }
        };
        let rows = result.as_ref().map(|r| r.len() as u64).unwrap_or(0);
        log_query(&self.log, route, sql, args, rows, started.elapsed(), result.as_ref().err());
        result
    }

    pub async fn fetch_all<T: FromRow<D::Row>>(
        &self,
        statement: &(impl Statement + ?Sized),
    ) -> OrmResult<Vec<T>> {
        self.query(statement).await?.iter().map(T::from_row).collect()
    }

    /// The first row, or [`OrmError::NotFound`].
    pub async fn fetch_one<T: FromRow<D::Row>>(
        &self,
        statement: &(impl Statement + ?Sized),
    ) -> OrmResult<T> {
        self.fetch_opt(statement)
            .await?
            .ok_or_else(|| OrmError::not_found("query returned no rows"))
    }

    pub async fn fetch_opt<T: FromRow<D::Row>>(
        &self,
        statement: &(impl Statement + ?Sized),
    ) -> OrmResult<Option<T>> {
        match self.query(statement).await?.first() {
            Some(row) => T::from_row(row).map(Some),
            None => Ok(None),
        }
    }

    /// Open a transaction and return a session bound to it.
    ///
    /// A read-only session begins on the reader with a read-only transaction.
    /// Finish it with [`commit`](Self::commit) or [`rollback`](Self::rollback).
    pub async fn begin(&self, options: TransactionOptions) -> OrmResult<Self> {
        if self.tx.is_some() {
            return Err(OrmError::Other("session already has an open transaction".into()));
        }
        let (db, options) = if self.is_read_only() {
            (self.cluster.reader()?, options.read_only(true))
        } else {
            (self.cluster.writer()?, options)
        };
        tracing::debug!(target: TRACING_TARGET_TX, sql = %options.begin_sql(), "begin");
        let tx = db.begin(&options).await?;
        Ok(self.with_tx(Arc::new(tx)))
    }

    pub async fn commit(&self) -> OrmResult<()> {
        let tx = self.tx.as_ref().ok_or(OrmError::NoTransaction)?;
        tracing::debug!(target: TRACING_TARGET_TX, "commit");
        tx.commit().await
    }

    pub async fn rollback(&self) -> OrmResult<()> {
        let tx = self.tx.as_ref().ok_or(OrmError::NoTransaction)?;
        tracing::debug!(target: TRACING_TARGET_TX, "rollback");
        tx.rollback().await
    }

    /// Run `f` inside a transaction.
    ///
    /// When this session already carries a transaction, `f` joins it and
    /// nothing is committed here. Otherwise a new transaction is opened (on
    /// the reader for a read-only session), committed when `f` succeeds and
    /// rolled back when it fails or panics. A panic is returned as
    /// [`OrmError::Panicked`].
    pub async fn execute_tx<T, F, Fut>(&self, options: TransactionOptions, f: F) -> OrmResult<T>
    where
        F: FnOnce(Session<D>) -> Fut + Send,
        Fut: Future<Output = OrmResult<T>> + Send,
        T: Send,
    {
        if self.tx.is_some() {
            return f(self.clone()).await;
        }

        let session = self.begin(options).await?;
        let Some(tx) = session.tx.clone() else {
            return Err(OrmError::NoTransaction);
        };

        let outcome = AssertUnwindSafe(async move { f(session).await })
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(value)) => {
                tracing::debug!(target: TRACING_TARGET_TX, "commit");
                match tx.commit().await {
                    Ok(()) => Ok(value),
                    Err(err) => Err(rollback_after(tx.as_ref(), err).await),
                }
            }
            Ok(Err(err)) => Err(rollback_after(tx.as_ref(), err).await),
            Err(panic) => {
                let err = OrmError::Panicked(panic_message(panic.as_ref()));
                Err(rollback_after(tx.as_ref(), err).await)
            }
        }
    }

    /// [`execute_tx`](Self::execute_tx) on the reader with a read-only transaction.
    pub async fn view_tx<T, F, Fut>(&self, options: TransactionOptions, f: F) -> OrmResult<T>
    where
        F: FnOnce(Session<D>) -> Fut + Send,
        Fut: Future<Output = OrmResult<T>> + Send,
        T: Send,
    {
        self.read_only().execute_tx(options, f).await
    }
}

async fn rollback_after<Tx: TxHandle>(tx: &Tx, err: OrmError) -> OrmError {
    tracing::debug!(target: TRACING_TARGET_TX, error = %err, "rollback");
    match tx.rollback().await {
        Ok(()) => err,
        Err(rollback) => {
            tracing::error!(target: TRACING_TARGET_TX, error = %rollback, "rollback failed");
            err.with_rollback_failure(rollback)
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "transaction callback panicked".to_string()
    }
}
