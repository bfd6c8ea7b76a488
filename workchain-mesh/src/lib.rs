//! # WorkChain Mesh
//!
//! Behavior Scoring & Response Mesh: a concurrent, bounded-memory state
//! machine that scores per-client behavior across five heuristic detectors
//! and drives rate limits, adaptive thresholds, and isolation decisions.
//!
//! Components:
//! - [`SignatureRegistry`] — catalog of named threat patterns
//! - [`BehaviorStore`] — per-client bounded sliding window with stale GC
//! - [`AnomalyScorer`] — weighted composite anomaly score + detected patterns
//! - [`ThresholdManager`] — adaptive scalar thresholds, tightened under attack
//! - [`RateLimiter`] — per-client fixed-window counter with dynamic caps
//! - [`ResponseEngine`] — maps scored anomalies to isolate/throttle/alert/reroute
//! - [`SecurityMesh`] — the facade wiring all of the above into one verdict
//!
//! The mesh never performs I/O and never fails observably: a request that
//! cannot be scored is treated as SAFE and allowed (availability over
//! detection). Outbound actions are published through the
//! `workchain-core` event bus and the typed sinks on the response engine.

pub mod anomaly_scorer;
pub mod behavior_store;
pub mod mesh;
pub mod rate_limiter;
pub mod response_engine;
pub mod signature_registry;
pub mod threshold_manager;
pub mod types;


pub use anomaly_scorer::AnomalyScorer;
pub use behavior_store::BehaviorStore;
pub use mesh::{MeshConfig, MeshReport, SecurityMesh};
pub use rate_limiter::{RateLimiter, RateLimiterReport};
pub use response_engine::{AlertSink, IsolationSink, ResponseEngine, RerouteSink, ThrottleSink};
pub use signature_registry::SignatureRegistry;
pub use threshold_manager::ThresholdManager;
pub use types::{
    AnomalyScore, BehaviorMetrics, BehaviorPattern, ClientHistory, ClientIsolation, MeshAlert,
    ThreatLevel, ThreatSignature,
};
