//! Writer/reader pools and the policies that pick one.

use std::sync::{Mutex, PoisonError};

use crate::error::{OrmError, OrmResult};

/// How a session wants its statements routed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoutingIntent {
    /// Writes go to the writer, reads go to the reader.
    #[default]
    None,
    /// Everything goes to the reader.
    ReadOnly,
    /// Everything goes to the writer.
    MustWrite,
}

/// Picks one database out of a group.
pub trait Policy<D>: Send + Sync {
    fn get(&self) -> OrmResult<D>;
}

/// Cycles through its databases in order.
///
/// Concurrent callers each get the next position; over `k * len` calls every
/// database is returned exactly `k` times.
#[derive(Debug)]
pub struct RoundRobinPolicy<D> {
    dbs: Vec<D>,
    cursor: Mutex<usize>,
}

impl<D> RoundRobinPolicy<D> {
    pub fn new(dbs: Vec<D>) -> Self {
        Self {
            dbs,
            cursor: Mutex::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.dbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dbs.is_empty()
    }
}

impl<D: Clone + Send + Sync> Policy<D> for RoundRobinPolicy<D> {
    fn get(&self) -> OrmResult<D> {
        if self.dbs.is_empty() {
            return Err(OrmError::config("round-robin policy has no databases"));
        }
        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        let db = self.dbs[*cursor % self.dbs.len()].clone();
        *cursor = (*cursor + 1) % self.dbs.len();
        Ok(db)
    }
}

/// A writer policy and a reader policy.
pub struct Cluster<D> {
    writer: Box<dyn Policy<D>>,
    reader: Box<dyn Policy<D>>,
}

impl<D> std::fmt::Debug for Cluster<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cluster").finish_non_exhaustive()
    }
}

impl<D: Clone + Send + Sync + 'static> Cluster<D> {
    pub fn new(writer: impl Policy<D> + 'static, reader: impl Policy<D> + 'static) -> Self {
        Self {
            writer: Box::new(writer),
            reader: Box::new(reader),
        }
    }

    /// Round-robin over `writers` and `readers`. With no readers, reads use
    /// the writers.
    pub fn round_robin(writers: Vec<D>, readers: Vec<D>) -> Self {
        let readers = if readers.is_empty() {
            writers.clone()
        } else {
            readers
        };
        Self::new(RoundRobinPolicy::new(writers), RoundRobinPolicy::new(readers))
    }

    /// One database serving both roles.
    pub fn single(db: D) -> Self {
        Self::round_robin(vec![db], Vec::new())
    }
}

impl<D> Cluster<D> {
    /// The database for `intent`. `None` picks the writer.
    pub fn get(&self, intent: RoutingIntent) -> OrmResult<D> {
        match intent {
            RoutingIntent::ReadOnly => self.reader.get(),
            RoutingIntent::None | RoutingIntent::MustWrite => self.writer.get(),
        }
    }

    pub fn writer(&self) -> OrmResult<D> {
        self.writer.get()
    }

    pub fn reader(&self) -> OrmResult<D> {
        self.reader.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[test]
    fn round_robin_cycles() {
        let policy = RoundRobinPolicy::new(vec![0, 1, 2]);
        let picked: Vec<i32> = (0..7).map(|_| policy.get().unwrap()).collect();
        assert_eq!(picked, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn round_robin_is_fair_across_threads() {
        let policy = Arc::new(RoundRobinPolicy::new(vec!["a", "b", "c"]));
        let handles: Vec<_> = (0..6)
            .map(|_| {
                let policy = Arc::clone(&policy);
                std::thread::spawn(move || {
                    (0..50).map(|_| policy.get().unwrap()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut counts = HashMap::new();
        for handle in handles {
            for db in handle.join().unwrap() {
                *counts.entry(db).or_insert(0) += 1;
            }
        }
        assert_eq!(counts.len(), 3);
        assert!(counts.values().all(|&n| n == 100));
    }

    #[test]
    fn empty_policy_is_an_error() {
        let policy: RoundRobinPolicy<i32> = RoundRobinPolicy::new(Vec::new());
        assert!(matches!(policy.get(), Err(OrmError::Config(_))));
    }

    #[test]
    fn cluster_routes_by_intent() {
        let cluster = Cluster::round_robin(vec!["w"], vec!["r1", "r2"]);
        assert_eq!(cluster.get(RoutingIntent::None).unwrap(), "w");
        assert_eq!(cluster.get(RoutingIntent::MustWrite).unwrap(), "w");
        assert_eq!(cluster.get(RoutingIntent::ReadOnly).unwrap(), "r1");
        assert_eq!(cluster.reader().unwrap(), "r2");
    }

    #[test]
    fn readers_default_to_writers() {
        let cluster = Cluster::single("only");
        assert_eq!(cluster.reader().unwrap(), "only");
        assert_eq!(cluster.writer().unwrap(), "only");
    }
}
