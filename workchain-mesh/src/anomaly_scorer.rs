//! Anomaly Scorer — weighted composite scoring over a behavior window.
//!
//! Five heuristic sub-scores in [0, 1] combine into one composite:
//!
//! ```text
//! score = clamp(0.25*rapid + 0.25*enum + 0.30*payload + 0.10*timing + 0.10*resource, 0, 1)
//! ```
//!
//! A pattern counts as detected when its sub-score exceeds 0.70. Scoring is
//! a pure function of a window snapshot: it never mutates the store and is
//! idempotent between recordings.

use crate::types::{AnomalyScore, BehaviorPattern, ClientHistory, ThreatLevel};

// Composite weights
const WEIGHT_RAPID_FAILURES: f64 = 0.25;
const WEIGHT_ENUMERATION: f64 = 0.25;
const WEIGHT_PAYLOAD: f64 = 0.30;
const WEIGHT_TIMING: f64 = 0.10;
const WEIGHT_RESOURCE: f64 = 0.10;

/// Sub-score above which a pattern is reported as detected.
pub const DETECTION_THRESHOLD: f64 = 0.70;

// Rapid-failure scoring: confidence above this within the window counts as
// a failed request (kept literal from the source semantics).
const RAPID_FAILURE_CONFIDENCE: f64 = 0.8;
const RAPID_WINDOW_MS: u64 = 60_000;
const RAPID_SATURATION: f64 = 5.0;
const MIN_RAPID_SAMPLES: usize = 3;

// Enumeration scoring
const ENUMERATION_SATURATION: f64 = 20.0;
const MIN_ENUMERATION_SAMPLES: usize = 5;

// Timing scoring: near-zero inter-arrival jitter indicates scripted clients
const TIMING_MAX_STDDEV_MS: f64 = 10.0;
const TIMING_SCORE: f64 = 0.9;
const MIN_TIMING_SAMPLES: usize = 10;

// Resource scoring
const RESOURCE_USAGE_KEY: &str = "resource_usage";
const RESOURCE_HIGH_USAGE: f64 = 0.8;
const RESOURCE_SATURATION: f64 = 10.0;
const MIN_RESOURCE_SAMPLES: usize = 5;

/// Stateless scorer over behavior window snapshots.
#[derive(Debug, Clone, Default)]
pub struct AnomalyScorer;

impl AnomalyScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score a client's window snapshot as of `now_ms`.
    ///
    /// An absent or empty window scores 0.0 / SAFE with no patterns.
    pub fn analyze(
        &self,
        client_id: &str,
        history: Option<&ClientHistory>,
        now_ms: u64,
    ) -> AnomalyScore {
        let history = match history {
            Some(h) if !h.behaviors.is_empty() => h,
            _ => {
                return AnomalyScore {
                    client_id: client_id.to_string(),
                    score: 0.0,
                    level: ThreatLevel::Safe,
                    detected_patterns: Vec::new(),
                    timestamp_ms: now_ms,
                }
            }
        };

        let rapid = Self::rapid_failure_score(history, now_ms);
        let enumeration = Self::enumeration_score(history);
        let payload = Self::payload_score(history);
        let timing = Self::timing_score(history);
        let resource = Self::resource_score(history);

        let score = (WEIGHT_RAPID_FAILURES * rapid
            + WEIGHT_ENUMERATION * enumeration
            + WEIGHT_PAYLOAD * payload
            + WEIGHT_TIMING * timing
            + WEIGHT_RESOURCE * resource)
            .clamp(0.0, 1.0);

        let mut detected_patterns = Vec::new();
        if rapid > DETECTION_THRESHOLD {
            detected_patterns.push(BehaviorPattern::RapidFailures);
        }
        if enumeration > DETECTION_THRESHOLD {
            detected_patterns.push(BehaviorPattern::Enumeration);
        }
        if payload > DETECTION_THRESHOLD {
            detected_patterns.push(BehaviorPattern::PayloadInjection);
        }
        if timing > DETECTION_THRESHOLD {
            detected_patterns.push(BehaviorPattern::TimingAttack);
        }
        if resource > DETECTION_THRESHOLD {
            detected_patterns.push(BehaviorPattern::ResourceAbuse);
        }

        AnomalyScore {
            client_id: client_id.to_string(),
            score,
            level: Self::level_for(score),
            detected_patterns,
            timestamp_ms: now_ms,
        }
    }

    /// Map a composite score onto its threat band (strict thresholds).
    pub fn level_for(score: f64) -> ThreatLevel {
        if score > 0.90 {
            ThreatLevel::Critical
        } else if score > 0.75 {
            ThreatLevel::High
        } else if score > 0.50 {
            ThreatLevel::Medium
        } else if score > 0.25 {
            ThreatLevel::Low
        } else {
            ThreatLevel::Safe
        }
    }

    /// High-confidence observations inside the last minute, saturated at 5.
    fn rapid_failure_score(history: &ClientHistory, now_ms: u64) -> f64 {
        if history.behaviors.len() < MIN_RAPID_SAMPLES {
            return 0.0;
        }
        let failures = history
            .behaviors
            .iter()
            .filter(|b| {
                now_ms.saturating_sub(b.timestamp_ms) < RAPID_WINDOW_MS
                    && b.confidence > RAPID_FAILURE_CONFIDENCE
            })
            .count();
        (failures as f64 / RAPID_SATURATION).min(1.0)
    }

    /// Distinct non-empty resource ids across the window, saturated at 20.
    fn enumeration_score(history: &ClientHistory) -> f64 {
        if history.behaviors.len() < MIN_ENUMERATION_SAMPLES {
            return 0.0;
        }
        let unique_resources = history
            .behaviors
            .iter()
            .filter(|b| !b.resource_id.is_empty())
            .map(|b| b.resource_id.as_str())
            .collect::<std::collections::HashSet<_>>()
            .len();
        (unique_resources as f64 / ENUMERATION_SATURATION).min(1.0)
    }

    /// Any payload-injection observation saturates the sub-score.
    fn payload_score(history: &ClientHistory) -> f64 {
        let injected = history
            .behaviors
            .iter()
            .any(|b| b.pattern == BehaviorPattern::PayloadInjection);
        if injected {
            1.0
        } else {
            0.0
        }
    }

    /// Standard deviation of inter-arrival deltas; machine-regular traffic
    /// (sigma below 10 ms) scores 0.9.
    fn timing_score(history: &ClientHistory) -> f64 {
        if history.behaviors.len() < MIN_TIMING_SAMPLES {
            return 0.0;
        }
        let timestamps: Vec<u64> = history.behaviors.iter().map(|b| b.timestamp_ms).collect();
        let deltas: Vec<f64> = timestamps
            .windows(2)
            .map(|pair| pair[1].saturating_sub(pair[0]) as f64)
            .collect();

        let n = deltas.len() as f64;
        let mean = deltas.iter().sum::<f64>() / n;
        let variance = deltas.iter().map(|d| (d - mean) * (d - mean)).sum::<f64>() / n;
        let std_dev = variance.sqrt();

        if std_dev < TIMING_MAX_STDDEV_MS {
            TIMING_SCORE
        } else {
            0.0
        }
    }

    /// Observations reporting resource usage above 0.8, saturated at 10.
    fn resource_score(history: &ClientHistory) -> f64 {
        if history.behaviors.len() < MIN_RESOURCE_SAMPLES {
            return 0.0;
        }
        let heavy = history
            .behaviors
            .iter()
            .filter(|b| {
                b.indicators
                    .get(RESOURCE_USAGE_KEY)
                    .map_or(false, |usage| *usage > RESOURCE_HIGH_USAGE)
            })
            .count();
        (heavy as f64 / RESOURCE_SATURATION).min(1.0)
    }
}
