//! Cluster configuration loaded from TOML.
//!
//! ```toml
//! writers = ["postgres://app@primary/app"]
//! readers = ["postgres://app@replica-1/app", "${REPLICA_2_URL}"]
//! max_pool_size = 32
//!
//! [log]
//! level = "info"
//! slow_threshold_ms = 500
//! ```
//!
//! `${VAR}` references in URLs are expanded from the environment.

use std::path::Path;

use serde::Deserialize;

use crate::error::{OrmError, OrmResult};
use crate::monitor::LogConfig;

const DEFAULT_MAX_POOL_SIZE: usize = 16;

fn default_max_pool_size() -> usize {
    DEFAULT_MAX_POOL_SIZE
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClusterConfig {
    /// Writer connection URLs.
    pub writers: Vec<String>,
    /// Reader connection URLs. Empty means reads use the writers.
    #[serde(default)]
    pub readers: Vec<String>,
    /// Connections per pool.
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: usize,
    #[serde(default)]
    pub log: LogConfig,
}

impl ClusterConfig {
    /// A config with one writer and no readers.
    pub fn single(url: impl Into<String>) -> Self {
        Self {
            writers: vec![url.into()],
            readers: Vec::new(),
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            log: LogConfig::default(),
        }
    }

    pub fn from_toml_str(raw: &str) -> OrmResult<Self> {
        let mut config: ClusterConfig = toml::from_str(raw)
            .map_err(|e| OrmError::config(format!("failed to parse cluster config: {e}")))?;
        config.expand_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> OrmResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            OrmError::config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> OrmResult<()> {
        if self.writers.is_empty() {
            return Err(OrmError::config("at least one writer is required"));
        }
        if self
            .writers
            .iter()
            .chain(&self.readers)
            .any(|url| url.trim().is_empty())
        {
            return Err(OrmError::config("connection urls must not be empty"));
        }
        if self.max_pool_size == 0 {
            return Err(OrmError::config("max_pool_size must be greater than 0"));
        }
        Ok(())
    }

    /// Reader URLs, falling back to the writers.
    pub fn reader_urls(&self) -> &[String] {
        if self.readers.is_empty() {
            &self.writers
        } else {
            &self.readers
        }
    }

    fn expand_env(&mut self) -> OrmResult<()> {
        for url in self.writers.iter_mut().chain(self.readers.iter_mut()) {
            *url = expand_env_vars(url)?;
        }
        Ok(())
    }
}

fn expand_env_vars(input: &str) -> OrmResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' || chars.peek() != Some(&'{') {
            out.push(c);
            continue;
        }
        chars.next();

        let mut key = String::new();
        let mut closed = false;
        for ch in chars.by_ref() {
            if ch == '}' {
                closed = true;
                break;
            }
            key.push(ch);
        }
        if !closed {
            return Err(OrmError::config(format!(
                "unterminated env var reference: ${{{key}"
            )));
        }
        if key.is_empty() {
            return Err(OrmError::config("invalid env var reference: ${}"));
        }
        let value = std::env::var(&key)
            .map_err(|_| OrmError::config(format!("missing env var for config expansion: {key}")))?;
        out.push_str(&value);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::LogLevel;

    #[test]
    fn parses_full_config() {
        let config = ClusterConfig::from_toml_str(
            r#"
            writers = ["postgres://w"]
            readers = ["postgres://r1", "postgres://r2"]
            max_pool_size = 4

            [log]
            level = "info"
            slow_threshold_ms = 250
            max_sql_length = 120
            "#,
        )
        .unwrap();
        assert_eq!(config.writers, vec!["postgres://w"]);
        assert_eq!(config.reader_urls(), ["postgres://r1", "postgres://r2"]);
        assert_eq!(config.max_pool_size, 4);
        assert_eq!(config.log.level, LogLevel::Info);
        assert_eq!(config.log.slow_threshold_ms, 250);
        assert_eq!(config.log.max_sql_length, Some(120));
    }

    #[test]
    fn defaults_apply() {
        let config = ClusterConfig::from_toml_str(r#"writers = ["postgres://w"]"#).unwrap();
        assert_eq!(config.reader_urls(), ["postgres://w"]);
        assert_eq!(config.max_pool_size, 16);
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn rejects_missing_or_empty_writers() {
        let err = ClusterConfig::from_toml_str("writers = []").unwrap_err();
        assert!(matches!(err, OrmError::Config(_)));

        let err = ClusterConfig::from_toml_str(r#"writers = ["  "]"#).unwrap_err();
        assert!(matches!(err, OrmError::Config(_)));

        let err = ClusterConfig::from_toml_str("max_pool_size = 3").unwrap_err();
        assert!(err.to_string().contains("failed to parse cluster config"));
    }

    #[test]
    fn rejects_unknown_log_level() {
        let err = ClusterConfig::from_toml_str(
            r#"
            writers = ["postgres://w"]
            [log]
            level = "loud"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, OrmError::Config(_)));
    }

    #[test]
    fn env_expansion() {
        assert_eq!(expand_env_vars("postgres://plain").unwrap(), "postgres://plain");
        assert!(expand_env_vars("${RWSQL_TEST_SURELY_UNSET_VAR}").is_err());
        assert!(expand_env_vars("${OPEN").is_err());
        assert!(expand_env_vars("${}").is_err());
    }
}
