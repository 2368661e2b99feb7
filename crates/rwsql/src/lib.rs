//! # rwsql
//!
//! Fluent SQL statement builders plus read/write routing and transactions.
//!
//! ## Builders
//!
//! Every builder collects `?` placeholders and their arguments in call order;
//! `build()` returns both, or the first error any call produced.
//!
//! ```ignore
//! use rwsql::{Opt, Statement, select};
//!
//! let (sql, args) = select()
//!     .from("users")
//!     .select("id, name")
//!     .and("id = ?", 1)
//!     .and_in("gender IN (?)", vec![1, 2])
//!     .and_opts("name = ?", "", &[Opt::SkipZero])
//!     .build()?;
//! assert_eq!(sql, "SELECT id, name FROM users WHERE id = ? AND gender IN (?, ?)");
//! ```
//!
//! Tagged structs drive WHERE clauses, records drive INSERT and UPDATE:
//!
//! ```ignore
//! #[derive(rwsql::Filter, Default)]
//! #[rwsql(table = "users")]
//! struct UserQuery {
//!     #[sql("col:id")]
//!     id: u64,
//!     #[sql("col:kind;op:in")]
//!     kinds: Vec<i32>,
//!     #[sql("col:name;op:%{}%")]
//!     name_like: String,
//! }
//!
//! let query = select().filter(&UserQuery { id: 1, ..Default::default() }, &[Opt::SkipZero]);
//! ```
//!
//! ## Routing
//!
//! A [`Session`] sends writes to the writer pool and reads to the reader
//! pool. `read_only()` and `must_write()` override that, and
//! [`Session::execute_tx`] pins everything to one transaction.
//!
//! ```ignore
//! let session = rwsql::connect(&ClusterConfig::from_toml_str(&raw)?)?;
//! let users: Vec<User> = session.fetch_all(&select().from("users")).await?;
//! ```

pub mod builder;
pub mod client;
pub mod cluster;
pub mod config;
pub mod error;
pub mod monitor;
pub mod row;
pub mod session;
pub mod value;

pub use builder::{
    Arg, DeleteBuilder, FieldValue, Filter, InsertBuilder, InsertSource, IntoArg, JoinKind,
    LockMode, Opt, Pagination, Record, SelectBuilder, Statement, TaggedValue, UpdateBuilder,
    WhereExpr, delete, insert, select, update,
};
pub use client::{
    Database, Executor, TransactionIsolation, TransactionOptions, TxHandle, WriteResult,
};
pub use cluster::{Cluster, Policy, RoundRobinPolicy, RoutingIntent};
pub use config::ClusterConfig;
pub use error::{BuildError, BuildResult, OrmError, OrmResult};
pub use monitor::{LogConfig, LogLevel, TRACING_TARGET_SQL, TRACING_TARGET_TX, explain_sql};
pub use row::FromRow;
pub use session::Session;
pub use value::{ToValue, Value, ValueMap};

#[cfg(feature = "pool")]
pub mod pg;
#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pg::{PgDatabase, PgTransaction, connect, rebind};
#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_size, create_pool_with_tls};

#[cfg(feature = "derive")]
pub use rwsql_derive::{Filter, Record};
