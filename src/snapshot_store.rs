// Single-baseline-per-entity store with an atomic read-previous / install-current exchange.

use crate::models::{RateMetrics, RawCounterSnapshot};
use crate::rate;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

/// Result of [`SnapshotStore::exchange`]: the baseline that was replaced, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exchange {
    pub previous: Option<RawCounterSnapshot>,
    pub elapsed_secs: Option<f64>,
}

/// Holds exactly one baseline per key. The lock covers only the map lookup and overwrite;
/// rate computation always happens on the returned copy, outside the lock.
pub struct SnapshotStore<K> {
    baselines: Mutex<HashMap<K, RawCounterSnapshot>>,
}

impl<K> Default for SnapshotStore<K> {
    fn default() -> Self {
        Self {
            baselines: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> SnapshotStore<K> {
    pub fn new() -> Self {
        Self::default()
    }

    // The critical sections below never panic between read and write, so a poisoned map is
    // still consistent.
    fn map(&self) -> MutexGuard<'_, HashMap<K, RawCounterSnapshot>> {
        self.baselines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Installs `current` as the baseline for `key` unconditionally (also after a reset) and
    /// returns the one it replaced together with the elapsed time between the two.
    pub fn exchange(&self, key: K, current: RawCounterSnapshot) -> Exchange {
        let previous = self.map().insert(key, current);
        Exchange {
            previous,
            elapsed_secs: previous.map(|p| rate::elapsed_secs(&p, &current)),
        }
    }

    /// Exchange, then compute rates against the old baseline.
    pub fn advance(&self, key: K, current: RawCounterSnapshot) -> RateMetrics {
        let Exchange {
            previous,
            elapsed_secs,
        } = self.exchange(key, current);
        rate::compute(previous.as_ref(), &current, elapsed_secs.unwrap_or(0.0))
    }

    /// Drops every baseline whose key is not in `live`. Returns how many were removed.
    pub fn retain(&self, live: &HashSet<K>) -> usize {
        let mut map = self.map();
        let before = map.len();
        map.retain(|k, _| live.contains(k));
        before - map.len()
    }

    pub fn remove(&self, key: &K) -> Option<RawCounterSnapshot> {
        self.map().remove(key)
    }

    pub fn baseline(&self, key: &K) -> Option<RawCounterSnapshot> {
        self.map().get(key).copied()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.map().contains_key(key)
    }

    pub fn keys(&self) -> Vec<K> {
        self.map().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }
}
