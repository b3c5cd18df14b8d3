use std::collections::HashMap;
use std::fmt;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use prometheus::IntGauge;
use tokio::time::Instant;
use tracing::trace;

use super::WatchState;
use crate::metrics::WATCHED_KEYS;

/// In-memory set of watched keys and their lock state.
///
/// Every operation is atomic on the entry it touches. There is no
/// cross-entry consistency: a scan racing with `register`/`deregister` may or
/// may not see the affected key.
///
/// The watched-keys gauge is shared by every registry of the process. Each
/// registry only adds and removes its own keys, and gives them back on drop.
pub struct WatchRegistry {
    entries: DashMap<String, WatchState>,
    gauge: IntGauge,
}

impl Default for WatchRegistry {
    fn default() -> Self {
        Self::with_gauge(WATCHED_KEYS.clone())
    }
}

impl fmt::Debug for WatchRegistry {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("WatchRegistry").field("entries", &self.entries).finish()
    }
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_gauge(gauge: IntGauge) -> Self {
        Self {
            entries: DashMap::new(),
            gauge,
        }
    }

    /// Start watching `key`. An already watched key keeps its state.
    pub fn register(
        &self,
        key: impl Into<String>,
    ) {
        let key = key.into();
        if let Entry::Vacant(entry) = self.entries.entry(key) {
            trace!(key = %entry.key(), "register watch key");
            entry.insert(WatchState::default());
            self.gauge.inc();
        }
    }

    pub fn register_many<I, K>(
        &self,
        keys: I,
    ) where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        for key in keys {
            self.register(key);
        }
    }

    /// Stop watching `key`. Unknown keys are ignored.
    pub fn deregister(
        &self,
        key: &str,
    ) {
        if self.entries.remove(key).is_some() {
            trace!(%key, "deregister watch key");
            self.gauge.dec();
        }
    }

    pub fn deregister_many<I, K>(
        &self,
        keys: I,
    ) where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for key in keys {
            self.deregister(key.as_ref());
        }
    }

    /// Point-in-time copy of every entry
    pub fn snapshot(&self) -> HashMap<String, WatchState> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<WatchState> {
        self.entries.get(key).map(|entry| *entry.value())
    }

    pub fn contains(
        &self,
        key: &str,
    ) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply the lock transition to every entry in place.
    ///
    /// Returns how many keys were unlocked.
    pub(crate) fn transition_all(
        &self,
        now: Instant,
    ) -> usize {
        let mut unlocked = 0;
        for mut entry in self.entries.iter_mut() {
            let before = *entry.value();
            let after = before.transition(now);
            if after != before {
                trace!(key = %entry.key(), attempt = after.attempt(), "watch key unlocked");
                *entry.value_mut() = after;
                unlocked += 1;
            }
        }
        unlocked
    }

    /// Keys that are currently unlocked
    pub(crate) fn eligible_keys(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| !entry.value().is_locked())
            .map(|entry| entry.key().clone())
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn insert_state(
        &self,
        key: impl Into<String>,
        state: WatchState,
    ) {
        if self.entries.insert(key.into(), state).is_none() {
            self.gauge.inc();
        }
    }
}

impl Drop for WatchRegistry {
    fn drop(&mut self) {
        self.gauge.sub(self.entries.len() as i64);
    }
}
