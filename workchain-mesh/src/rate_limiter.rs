//! Rate Limiter — per-client fixed-window request counter.
//!
//! Each client gets a 1-second window and an `rps_cap` that starts at the
//! configured default. Anomaly enforcement lowers the cap (HIGH and above:
//! default/10, floor 1; MEDIUM: default/5, floor 5) and never raises it;
//! only `reset` restores defaults. Time comes from the shared monotonic
//! clock; `check_limit_at` takes an explicit timestamp for deterministic use.

use crate::types::{AnomalyScore, ThreatLevel};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use workchain_core::MonoClock;

/// Fixed window width.
const WINDOW_MS: u64 = 1_000;

/// Default per-client requests-per-second cap.
pub const DEFAULT_RPS: u32 = 100;

#[derive(Debug, Clone)]
struct ClientPolicy {
    rps_cap: u32,
    window_start: u64,
    count_in_window: u32,
}

/// Counter snapshot for operator dashboards.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct RateLimiterReport {
    pub total_checked: u64,
    pub total_limited: u64,
    pub limit_rate_pct: f64,
    pub tracked_clients: u64,
}

/// Thread-safe per-client fixed-window rate limiter.
pub struct RateLimiter {
    policies: RwLock<HashMap<String, ClientPolicy>>,
    default_rps: u32,
    clock: Arc<MonoClock>,
    total_checked: AtomicU64,
    total_limited: AtomicU64,
}

impl RateLimiter {
    pub fn new(default_rps: u32, clock: Arc<MonoClock>) -> Self {
        Self {
            policies: RwLock::new(HashMap::new()),
            default_rps,
            clock,
            total_checked: AtomicU64::new(0),
            total_limited: AtomicU64::new(0),
        }
    }

    /// Admit or deny one request for the client, reading the shared clock.
    pub fn check_limit(&self, client_id: &str) -> bool {
        self.check_limit_at(client_id, self.clock.now_ms())
    }

    /// Admit or deny one request as of an explicit monotonic timestamp.
    ///
    /// Once the window is at least 1 s old it resets; within a window at
    /// most `rps_cap` requests are admitted.
    pub fn check_limit_at(&self, client_id: &str, now_ms: u64) -> bool {
        self.total_checked.fetch_add(1, Ordering::Relaxed);

        let mut policies = self.policies.write();
        let policy = policies
            .entry(client_id.to_string())
            .or_insert_with(|| ClientPolicy {
                rps_cap: self.default_rps,
                window_start: now_ms,
                count_in_window: 0,
            });

        if now_ms.saturating_sub(policy.window_start) >= WINDOW_MS {
            policy.window_start = now_ms;
            policy.count_in_window = 0;
        }

        if policy.count_in_window >= policy.rps_cap {
            self.total_limited.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        policy.count_in_window += 1;
        true
    }

    /// Lower a client's cap in response to an anomaly. Never raises a cap.
    pub fn enforce_dynamic(&self, anomaly: &AnomalyScore) {
        let new_cap = if anomaly.level >= ThreatLevel::High {
            (self.default_rps / 10).max(1)
        } else if anomaly.level >= ThreatLevel::Medium {
            (self.default_rps / 5).max(5)
        } else {
            return;
        };

        let mut policies = self.policies.write();
        let policy = policies
            .entry(anomaly.client_id.clone())
            .or_insert_with(|| ClientPolicy {
                rps_cap: self.default_rps,
                window_start: anomaly.timestamp_ms,
                count_in_window: 0,
            });
        if new_cap < policy.rps_cap {
            policy.rps_cap = new_cap;
        }
    }

    /// Current cap for a client (default for unknown clients).
    pub fn current_cap(&self, client_id: &str) -> u32 {
        self.policies
            .read()
            .get(client_id)
            .map(|p| p.rps_cap)
            .unwrap_or(self.default_rps)
    }

    /// Drop one client's policy, restoring it to defaults on next contact.
    pub fn remove(&self, client_id: &str) -> bool {
        self.policies.write().remove(client_id).is_some()
    }

    /// Clear all per-client policies.
    pub fn reset(&self) {
        self.policies.write().clear();
    }

    pub fn tracked_clients(&self) -> usize {
        self.policies.read().len()
    }

    pub fn total_checked(&self) -> u64 {
        self.total_checked.load(Ordering::Relaxed)
    }

    pub fn total_limited(&self) -> u64 {
        self.total_limited.load(Ordering::Relaxed)
    }

    pub fn report(&self) -> RateLimiterReport {
        let checked = self.total_checked();
        let limited = self.total_limited();
        RateLimiterReport {
            total_checked: checked,
            total_limited: limited,
            limit_rate_pct: if checked == 0 {
                0.0
            } else {
                limited as f64 / checked as f64 * 100.0
            },
            tracked_clients: self.tracked_clients() as u64,
        }
    }
}
