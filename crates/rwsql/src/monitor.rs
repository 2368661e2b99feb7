//! Statement logging through `tracing`.
//!
//! Every statement a [`Session`](crate::Session) executes emits one event
//! under [`TRACING_TARGET_SQL`]. Transaction lifecycle events use
//! [`TRACING_TARGET_TX`].

use std::time::Duration;

use serde::Deserialize;

use crate::error::OrmError;
use crate::value::Value;

/// Tracing target for executed statements.
pub const TRACING_TARGET_SQL: &str = "rwsql::sql";

/// Tracing target for `BEGIN` / `COMMIT` / `ROLLBACK`.
pub const TRACING_TARGET_TX: &str = "rwsql::tx";

const DEFAULT_SLOW_THRESHOLD_MS: u64 = 1000;

/// Level used for statements that neither failed nor ran slow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Debug,
    Info,
    /// Disable statement logging entirely.
    Off,
}

/// Statement logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    /// Statements slower than this are logged at `warn`.
    pub slow_threshold_ms: u64,
    /// Truncate logged SQL (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Debug,
            slow_threshold_ms: DEFAULT_SLOW_THRESHOLD_MS,
            max_sql_length: None,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold_ms = u64::try_from(threshold.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Turn statement logging off.
    pub fn off(self) -> Self {
        self.level(LogLevel::Off)
    }

    pub fn slow_threshold_duration(&self) -> Duration {
        Duration::from_millis(self.slow_threshold_ms)
    }

    fn truncate(&self, sql: String) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_bytes(&sql, max)),
            _ => sql,
        }
    }
}

fn truncate_bytes(sql: &str, max_bytes: usize) -> &str {
    let mut end = max_bytes.min(sql.len());
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Render `sql` with each `?` replaced by the matching argument.
///
/// Text is double-quoted, null renders as `NULL` and timestamps as
/// `"YYYY-MM-DD HH:MM:SS"`. Placeholders inside single-quoted literals or
/// double-quoted identifiers are left alone, as are placeholders without a
/// matching argument.
///
/// The output is for humans; never execute it.
pub fn explain_sql(sql: &str, args: &[Value]) -> String {
    let mut out = String::with_capacity(sql.len() + args.len() * 8);
    let mut args = args.iter();
    let mut quote: Option<char> = None;
    for ch in sql.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '?') => {
                if let Some(arg) = args.next() {
                    out.push_str(&arg.to_string());
                    continue;
                }
            }
            (None, _) => {}
        }
        out.push(ch);
    }
    out
}

/// Emit the event for one executed statement.
pub(crate) fn log_query(
    config: &LogConfig,
    route: &'static str,
    sql: &str,
    args: &[Value],
    rows: u64,
    elapsed: Duration,
    error: Option<&OrmError>,
) {
    if config.level == LogLevel::Off {
        return;
    }
    let sql = config.truncate(explain_sql(sql, args));
    let elapsed_ms = elapsed.as_secs_f64() * 1000.0;

    if let Some(error) = error {
        tracing::error!(
            target: TRACING_TARGET_SQL,
            route,
            elapsed_ms,
            sql = %sql,
            error = %error,
            "statement failed"
        );
    } else if elapsed >= config.slow_threshold_duration() {
        tracing::warn!(
            target: TRACING_TARGET_SQL,
            route,
            rows,
            elapsed_ms,
            sql = %sql,
            "slow statement"
        );
    } else if config.level == LogLevel::Info {
        tracing::info!(target: TRACING_TARGET_SQL, route, rows, elapsed_ms, sql = %sql);
    } else {
        tracing::debug!(target: TRACING_TARGET_SQL, route, rows, elapsed_ms, sql = %sql);
    }
}
