//! Behavior Store — per-client bounded sliding windows of observations.
//!
//! Each client owns an ordered window of at most `max_history_size`
//! observations; the oldest is evicted on overflow. When the number of
//! tracked clients exceeds `max_clients`, a GC sweep drops every client
//! idle longer than `stale_after_ms`. Recording never fails observably;
//! memory stays bounded by (max_clients x max_history_size).

use crate::types::{BehaviorMetrics, ClientHistory};
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Default bound on observations retained per client.
pub const DEFAULT_MAX_HISTORY: usize = 10_000;
/// Default bound on tracked clients before a GC sweep.
pub const DEFAULT_MAX_CLIENTS: usize = 10_000;
/// Default idle time after which a client record is collected (24 h).
pub const DEFAULT_STALE_AFTER_MS: u64 = 24 * 60 * 60 * 1000;

/// Thread-safe store of per-client behavior windows.
pub struct BehaviorStore {
    history: RwLock<HashMap<String, ClientHistory>>,
    max_history_size: usize,
    max_clients: usize,
    stale_after_ms: u64,
    total_recorded: AtomicU64,
    total_collected: AtomicU64,
}

impl BehaviorStore {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_HISTORY, DEFAULT_MAX_CLIENTS, DEFAULT_STALE_AFTER_MS)
    }

    pub fn with_limits(max_history_size: usize, max_clients: usize, stale_after_ms: u64) -> Self {
        Self {
            history: RwLock::new(HashMap::new()),
            max_history_size,
            max_clients,
            stale_after_ms,
            total_recorded: AtomicU64::new(0),
            total_collected: AtomicU64::new(0),
        }
    }

    /// Append an observation to the client's window.
    ///
    /// Evicts the oldest entry once the window exceeds the history bound and
    /// runs a stale-client sweep when the client map outgrows its bound.
    pub fn record(&self, metrics: BehaviorMetrics) {
        self.total_recorded.fetch_add(1, Ordering::Relaxed);
        let now_ms = metrics.timestamp_ms;

        let mut map = self.history.write();
        let entry = map
            .entry(metrics.client_id.clone())
            .or_insert_with(|| ClientHistory {
                behaviors: VecDeque::with_capacity(64),
                first_seen: now_ms,
                last_seen: now_ms,
            });

        if entry.behaviors.is_empty() {
            entry.first_seen = now_ms;
        }
        entry.last_seen = now_ms;
        entry.behaviors.push_back(metrics);

        if entry.behaviors.len() > self.max_history_size {
            entry.behaviors.pop_front();
            if let Some(front) = entry.behaviors.front() {
                entry.first_seen = front.timestamp_ms;
            }
        }

        if map.len() > self.max_clients {
            self.collect_stale(&mut map, now_ms);
        }
    }

    /// Immutable copy of a client's window for scoring.
    pub fn snapshot(&self, client_id: &str) -> Option<ClientHistory> {
        self.history.read().get(client_id).cloned()
    }

    /// Drop a client's window entirely.
    pub fn remove(&self, client_id: &str) -> bool {
        self.history.write().remove(client_id).is_some()
    }

    pub fn tracked_clients(&self) -> usize {
        self.history.read().len()
    }

    pub fn total_recorded(&self) -> u64 {
        self.total_recorded.load(Ordering::Relaxed)
    }

    pub fn total_collected(&self) -> u64 {
        self.total_collected.load(Ordering::Relaxed)
    }

    fn collect_stale(&self, map: &mut HashMap<String, ClientHistory>, now_ms: u64) {
        let cutoff = now_ms.saturating_sub(self.stale_after_ms);
        let before = map.len();
        map.retain(|_, hist| hist.last_seen >= cutoff);
        let collected = before - map.len();
        if collected > 0 {
            self.total_collected.fetch_add(collected as u64, Ordering::Relaxed);
            debug!(collected, remaining = map.len(), "Stale client histories collected");
        }
    }
}

impl Default for BehaviorStore {
    fn default() -> Self {
        Self::new()
    }
}
