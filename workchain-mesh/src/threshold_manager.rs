//! Threshold Manager — adaptive scalar thresholds, tightened under attack.
//!
//! Holds a named map of float thresholds. Reinforcement is monotone: a HIGH
//! or CRITICAL anomaly multiplies `rate_limit` by 0.9 (floor 10.0) and
//! `anomaly_score` by 0.95 (floor 0.2). Only `reset` or an explicit `set`
//! relaxes a threshold again.

use crate::types::{AnomalyScore, ThreatLevel};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Recognized threshold keys.
pub const RATE_LIMIT: &str = "rate_limit";
pub const ANOMALY_SCORE: &str = "anomaly_score";
pub const FAILURE_COUNT: &str = "failure_count";
pub const ENUMERATION_ATTEMPTS: &str = "enumeration_attempts";

/// Value returned for unknown threshold names.
const UNKNOWN_THRESHOLD: f32 = 0.5;

const RATE_LIMIT_TIGHTEN: f32 = 0.9;
const RATE_LIMIT_FLOOR: f32 = 10.0;
const ANOMALY_SCORE_TIGHTEN: f32 = 0.95;
const ANOMALY_SCORE_FLOOR: f32 = 0.2;

/// Thread-safe adaptive threshold store with per-level reinforcement counts.
pub struct ThresholdManager {
    thresholds: RwLock<HashMap<String, f32>>,
    hits: RwLock<HashMap<ThreatLevel, u32>>,
}

impl ThresholdManager {
    pub fn new() -> Self {
        Self {
            thresholds: RwLock::new(Self::defaults()),
            hits: RwLock::new(HashMap::new()),
        }
    }

    /// Current value for a named threshold; 0.5 for unknown names.
    pub fn get(&self, name: &str) -> f32 {
        self.thresholds
            .read()
            .get(name)
            .copied()
            .unwrap_or(UNKNOWN_THRESHOLD)
    }

    /// Set a threshold explicitly. This is the only way (besides `reset`)
    /// a threshold ever rises again after reinforcement.
    pub fn set(&self, name: &str, value: f32) {
        self.thresholds.write().insert(name.to_string(), value);
    }

    /// Tighten thresholds in response to an observed anomaly.
    ///
    /// Every call increments the hit counter for the anomaly's level; only
    /// HIGH and CRITICAL anomalies tighten the thresholds.
    pub fn reinforce(&self, anomaly: &AnomalyScore) {
        *self.hits.write().entry(anomaly.level).or_insert(0) += 1;

        if anomaly.level >= ThreatLevel::High {
            let mut thresholds = self.thresholds.write();
            let rate_limit = thresholds.entry(RATE_LIMIT.to_string()).or_insert(100.0);
            *rate_limit = (*rate_limit * RATE_LIMIT_TIGHTEN).max(RATE_LIMIT_FLOOR);
            let anomaly_score = thresholds.entry(ANOMALY_SCORE.to_string()).or_insert(0.5);
            *anomaly_score = (*anomaly_score * ANOMALY_SCORE_TIGHTEN).max(ANOMALY_SCORE_FLOOR);
        }
    }

    /// Restore the default thresholds and clear all hit counts.
    pub fn reset(&self) {
        *self.thresholds.write() = Self::defaults();
        self.hits.write().clear();
    }

    /// Reinforcement hits recorded at the given level.
    pub fn hit_count(&self, level: ThreatLevel) -> u32 {
        self.hits.read().get(&level).copied().unwrap_or(0)
    }

    fn defaults() -> HashMap<String, f32> {
        HashMap::from([
            (RATE_LIMIT.to_string(), 100.0),
            (ANOMALY_SCORE.to_string(), 0.5),
            (FAILURE_COUNT.to_string(), 5.0),
            (ENUMERATION_ATTEMPTS.to_string(), 20.0),
        ])
    }
}

impl Default for ThresholdManager {
    fn default() -> Self {
        Self::new()
    }
}
