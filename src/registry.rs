use crate::errors::{ErrorIdentity, SharedError};
use log::trace;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
/// Fix callback. Returns `true` when it did something worth retrying for.
pub type FixFn<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;
/// How a hook matches the error under consideration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Fires only when the error is identical to the key.
    Exact,
    /// Also fires for any error that is-a the key.
    Any,
}
#[derive(Clone)]
pub struct FixRecord<E> {
    pub callback: FixFn<E>,
    pub mode: MatchMode,
    /// Registry-wide registration sequence number.
    pub seq: u64,
}
struct Entry<E> {
    key: E,
    records: Vec<FixRecord<E>>,
}
struct Table<E> {
    entries: Vec<Entry<E>>,
    next_seq: u64,
}
/// Mapping from error keys to their fixes.
///
/// Both lookups return handlers in registration order, across keys as well as
/// within one key. Registrations are never removed.
pub struct Registry<E> {
    table: RwLock<Table<E>>,
}
impl<E: ErrorIdentity> Registry<E> {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                entries: Vec::new(),
                next_seq: 0,
            }),
        }
    }
    /// Hook a fix that fires only on the identical error.
    pub fn hook<F>(&self, key: E, callback: F)
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.register(key, callback, MatchMode::Exact);
    }
    /// Hook a fix that fires on the key and on anything that is-a the key.
    pub fn hook_any<F>(&self, key: E, callback: F)
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.register(key, callback, MatchMode::Any);
    }
    pub fn register<F>(&self, key: E, callback: F, mode: MatchMode)
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let record = FixRecord {
            callback: Arc::new(callback),
            mode,
            seq: table.next_seq,
        };
        table.next_seq += 1;
        let entries = &mut table.entries;
        match entries.iter_mut().find(|entry| entry.key.same(&key)) {
            Some(entry) => entry.records.push(record),
            None => {
                entries
                    .push(Entry {
                        key,
                        records: vec![record],
                    })
            }
        }
        trace!("registered {:?} fix ({} keys)", mode, entries.len());
    }
    /// Every handler registered under a key identical to `current`, whatever its mode.
    pub fn exact_handlers(&self, current: &E) -> Vec<FixFn<E>> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table
            .entries
            .iter()
            .find(|entry| current.same(&entry.key))
            .map(|entry| {
                entry.records.iter().map(|record| Arc::clone(&record.callback)).collect()
            })
            .unwrap_or_default()
    }
    /// `Any`-mode handlers of every key that `current` is-a, in registration order.
    pub fn equivalent_handlers(&self, current: &E) -> Vec<FixFn<E>> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        let mut records: Vec<&FixRecord<E>> = table
            .entries
            .iter()
            .filter(|entry| current.is_a(&entry.key))
            .flat_map(|entry| {
                entry.records.iter().filter(|record| record.mode == MatchMode::Any)
            })
            .collect();
        records.sort_by_key(|record| record.seq);
        records.into_iter().map(|record| Arc::clone(&record.callback)).collect()
    }
    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.table.read().unwrap_or_else(PoisonError::into_inner).entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn handler_count(&self) -> usize {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .iter()
            .map(|entry| entry.records.len())
            .sum()
    }
}
impl<E: ErrorIdentity> Default for Registry<E> {
    fn default() -> Self {
        Self::new()
    }
}
static GLOBAL: OnceLock<Registry<SharedError>> = OnceLock::new();
/// Process-wide registry used by the free functions in the crate root.
pub fn global() -> &'static Registry<SharedError> {
    GLOBAL.get_or_init(Registry::new)
}
