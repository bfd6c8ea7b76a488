//! Security Mesh — the facade wiring all mesh components into one verdict.
//!
//! Request flow: rate-limit check, record the observation, score the
//! client's window, and at MEDIUM or above reinforce thresholds, tighten
//! the client's rate cap, and run the response engine. The verdict denies
//! when the rate limit was exceeded, the anomaly is CRITICAL, or payload
//! injection was detected.

use crate::anomaly_scorer::AnomalyScorer;
use crate::behavior_store::BehaviorStore;
use crate::rate_limiter::{RateLimiter, DEFAULT_RPS};
use crate::response_engine::{AlertSink, IsolationSink, ResponseEngine, RerouteSink, ThrottleSink};
use crate::signature_registry::SignatureRegistry;
use crate::threshold_manager::ThresholdManager;
use crate::behavior_store;
use crate::types::{AnomalyScore, BehaviorMetrics, BehaviorPattern, ClientIsolation, MeshAlert, ThreatLevel};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;
use workchain_core::{EventBus, MonoClock};

/// Tunables for the mesh. Defaults match the documented bounds.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MeshConfig {
    /// Observations retained per client before the oldest is evicted
    pub max_history_size: usize,
    /// Tracked clients before a stale-eviction sweep runs
    pub max_clients: usize,
    /// Idle time after which a client record is collected
    pub stale_after_ms: u64,
    /// Initial per-client requests-per-second cap
    pub default_rps: u32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            max_history_size: behavior_store::DEFAULT_MAX_HISTORY,
            max_clients: behavior_store::DEFAULT_MAX_CLIENTS,
            stale_after_ms: behavior_store::DEFAULT_STALE_AFTER_MS,
            default_rps: DEFAULT_RPS,
        }
    }
}

/// Aggregate counters for operator dashboards.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct MeshReport {
    pub total_requests: u64,
    pub total_denied: u64,
    pub total_rate_limited: u64,
    pub tracked_clients: u64,
    pub isolated_clients: u64,
    pub alerts_emitted: u64,
}

/// The process-wide security mesh. All component state is owned here;
/// every method is thread-safe.
pub struct SecurityMesh {
    registry: Arc<SignatureRegistry>,
    store: BehaviorStore,
    scorer: AnomalyScorer,
    thresholds: ThresholdManager,
    limiter: RateLimiter,
    response: ResponseEngine,
    bus: Arc<EventBus>,
    clock: Arc<MonoClock>,
    initialized: AtomicBool,
    total_requests: AtomicU64,
    total_denied: AtomicU64,
}

impl SecurityMesh {
    pub fn new() -> Self {
        Self::with_config(MeshConfig::default())
    }

    pub fn with_config(config: MeshConfig) -> Self {
        let registry = Arc::new(SignatureRegistry::new());
        let bus = Arc::new(EventBus::new());
        let clock = Arc::new(MonoClock::new());
        Self {
            store: BehaviorStore::with_limits(
                config.max_history_size,
                config.max_clients,
                config.stale_after_ms,
            ),
            scorer: AnomalyScorer::new(),
            thresholds: ThresholdManager::new(),
            limiter: RateLimiter::new(config.default_rps, clock.clone()),
            response: ResponseEngine::new(registry.clone(), bus.clone()),
            registry,
            bus,
            clock,
            initialized: AtomicBool::new(false),
            total_requests: AtomicU64::new(0),
            total_denied: AtomicU64::new(0),
        }
    }

    /// Arm the mesh. Until this is called, `process_request` allows
    /// everything (see there).
    pub fn initialize(&self) {
        self.initialized.store(true, Ordering::SeqCst);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Score one request and return the admission verdict (true = allow).
    ///
    /// Before `initialize` is called the mesh fails OPEN: every request is
    /// allowed and nothing is recorded. Deployments that need fail-closed
    /// must refuse requests at the caller until initialization completes.
    ///
    /// The verdict is deny when any of these hold: the client exceeded its
    /// rate cap, the anomaly level is CRITICAL, or payload injection is
    /// among the detected patterns.
    pub fn process_request(&self, client_id: &str, metrics: BehaviorMetrics) -> bool {
        if !self.is_initialized() {
            return true;
        }
        self.total_requests.fetch_add(1, Ordering::Relaxed);

        let within_limit = self.limiter.check_limit(client_id);
        self.store.record(metrics);

        let anomaly = self.analyze(client_id);
        if anomaly.level >= ThreatLevel::Medium {
            self.bus.emit_detection(
                "anomaly_scorer",
                anomaly.level.event_severity(),
                "Anomalous client behavior scored",
                std::collections::HashMap::from([
                    ("client_id".to_string(), client_id.to_string()),
                    ("score".to_string(), format!("{:.2}", anomaly.score)),
                ]),
                vec!["anomaly".into()],
            );
            self.thresholds.reinforce(&anomaly);
            self.limiter.enforce_dynamic(&anomaly);
            self.response.respond(&anomaly);
        }

        let injection = anomaly
            .detected_patterns
            .contains(&BehaviorPattern::PayloadInjection);
        let deny = !within_limit || anomaly.level == ThreatLevel::Critical || injection;

        if deny {
            self.total_denied.fetch_add(1, Ordering::Relaxed);
            warn!(
                client = %client_id,
                level = ?anomaly.level,
                score = anomaly.score,
                rate_limited = !within_limit,
                injection,
                "Request denied"
            );
        }

        !deny
    }

    /// Current threat level for a client, without recording anything.
    pub fn get_threat_level(&self, client_id: &str) -> ThreatLevel {
        self.analyze(client_id).level
    }

    /// Current anomaly score for a client, without recording anything.
    pub fn get_anomaly_score(&self, client_id: &str) -> AnomalyScore {
        self.analyze(client_id)
    }

    /// Administrative override: run the response engine on an anomaly
    /// regardless of how it was produced.
    pub fn enforce_defense(&self, anomaly: &AnomalyScore) {
        self.response.respond(anomaly);
    }

    /// Forget a client entirely: behavior window and rate policy.
    pub fn reset_client(&self, client_id: &str) {
        self.store.remove(client_id);
        self.limiter.remove(client_id);
    }

    /// Monotonic mesh time; callers stamp `BehaviorMetrics` from here.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    // ── Sink registration ────────────────────────────────────────────────

    pub fn on_alert(&self, sink: AlertSink) {
        self.response.on_alert(sink);
    }

    pub fn on_throttle(&self, sink: ThrottleSink) {
        self.response.on_throttle(sink);
    }

    pub fn on_isolation(&self, sink: IsolationSink) {
        self.response.on_isolation(sink);
    }

    pub fn on_reroute(&self, sink: RerouteSink) {
        self.response.on_reroute(sink);
    }

    // ── Introspection ────────────────────────────────────────────────────

    pub fn registry(&self) -> &SignatureRegistry {
        &self.registry
    }

    pub fn thresholds(&self) -> &ThresholdManager {
        &self.thresholds
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn alerts(&self) -> Vec<MeshAlert> {
        self.response.alerts()
    }

    pub fn isolations(&self) -> Vec<ClientIsolation> {
        self.response.isolations()
    }

    pub fn report(&self) -> MeshReport {
        MeshReport {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            total_denied: self.total_denied.load(Ordering::Relaxed),
            total_rate_limited: self.limiter.total_limited(),
            tracked_clients: self.store.tracked_clients() as u64,
            isolated_clients: self.response.total_isolations(),
            alerts_emitted: self.response.total_alerts(),
        }
    }

    fn analyze(&self, client_id: &str) -> AnomalyScore {
        let snapshot = self.store.snapshot(client_id);
        self.scorer
            .analyze(client_id, snapshot.as_ref(), self.clock.now_ms())
    }
}

impl Default for SecurityMesh {
    fn default() -> Self {
        Self::new()
    }
}
