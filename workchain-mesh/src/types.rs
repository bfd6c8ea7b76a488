//! Shared types for the behavior mesh.

use std::collections::{HashMap, VecDeque};

/// Threat severity, totally ordered from SAFE to CRITICAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum ThreatLevel {
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl ThreatLevel {
    /// Event-bus severity corresponding to this threat level.
    pub fn event_severity(self) -> workchain_core::EventSeverity {
        match self {
            ThreatLevel::Safe => workchain_core::EventSeverity::Info,
            ThreatLevel::Low => workchain_core::EventSeverity::Low,
            ThreatLevel::Medium => workchain_core::EventSeverity::Medium,
            ThreatLevel::High => workchain_core::EventSeverity::High,
            ThreatLevel::Critical => workchain_core::EventSeverity::Critical,
        }
    }
}

/// Recognized client behavior classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BehaviorPattern {
    Normal,
    RapidFailures,
    Enumeration,
    PayloadInjection,
    TimingAttack,
    ResourceAbuse,
}

/// A named threat pattern with its trigger parameters. Immutable once
/// registered; the registry replaces by `id`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ThreatSignature {
    pub id: String,
    pub pattern: BehaviorPattern,
    pub threshold: u32,
    pub window_ms: u32,
    pub severity: ThreatLevel,
    pub description: String,
}

/// One behavior observation for a client.
///
/// `timestamp_ms` is monotonic milliseconds (see `workchain_core::MonoClock`);
/// `resource_id` feeds enumeration scoring and may be empty. Indicator keys
/// other than `"resource_usage"` are preserved but ignored by the scorer.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BehaviorMetrics {
    pub client_id: String,
    pub resource_id: String,
    pub timestamp_ms: u64,
    pub pattern: BehaviorPattern,
    pub confidence: f64,
    pub indicators: HashMap<String, f64>,
}

/// Per-client behavior window, ordered oldest to newest.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ClientHistory {
    pub behaviors: VecDeque<BehaviorMetrics>,
    pub first_seen: u64,
    pub last_seen: u64,
}

/// Composite anomaly verdict for a client at a point in time.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnomalyScore {
    pub client_id: String,
    /// Weighted composite score in [0, 1]
    pub score: f64,
    pub level: ThreatLevel,
    /// Patterns whose sub-score exceeded the detection threshold
    pub detected_patterns: Vec<BehaviorPattern>,
    pub timestamp_ms: u64,
}

/// Append-only record of a client quarantine decision.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ClientIsolation {
    pub client_id: String,
    pub level: ThreatLevel,
    pub start_ms: u64,
    pub reason: String,
}

/// Operator-facing alert raised by the mesh.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MeshAlert {
    pub timestamp_ms: u64,
    pub severity: ThreatLevel,
    pub component: String,
    pub client_id: String,
    pub title: String,
    pub details: String,
}
