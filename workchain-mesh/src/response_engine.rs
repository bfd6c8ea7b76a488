//! Response Engine — maps scored anomalies to enforcement actions.
//!
//! Decision table on the anomaly level:
//! - CRITICAL: isolate the client (append an isolation record) and alert
//! - HIGH: throttle at factor 0.5 and alert
//! - MEDIUM: throttle at factor 0.7
//! - LOW / SAFE: no action
//!
//! Throttle and reroute are integration hooks: they publish events and run
//! the registered sinks, but never mutate rate-limiter state themselves.
//! Isolation and alert records are kept in bounded in-memory logs;
//! deployments externalize them through the sinks or the event bus.

use crate::signature_registry::SignatureRegistry;
use crate::types::{AnomalyScore, ClientIsolation, MeshAlert, ThreatLevel};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;
use workchain_core::{EventBus, EventSeverity};

const MAX_ALERTS: usize = 5_000;
const MAX_ISOLATIONS: usize = 10_000;

const COMPONENT: &str = "response_engine";

/// Sink invoked for every operator alert.
pub type AlertSink = Arc<dyn Fn(&AnomalyScore) + Send + Sync>;
/// Sink invoked with (client_id, reduction factor in (0, 1]).
pub type ThrottleSink = Arc<dyn Fn(&str, f64) + Send + Sync>;
/// Sink invoked for every isolation record.
pub type IsolationSink = Arc<dyn Fn(&ClientIsolation) + Send + Sync>;
/// Sink invoked with the client id to reroute.
pub type RerouteSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Threat response engine with bounded logs and caller-provided sinks.
pub struct ResponseEngine {
    registry: Arc<SignatureRegistry>,
    bus: Arc<EventBus>,
    isolations: RwLock<Vec<ClientIsolation>>,
    alerts: RwLock<Vec<MeshAlert>>,
    alert_sinks: RwLock<Vec<AlertSink>>,
    throttle_sinks: RwLock<Vec<ThrottleSink>>,
    isolation_sinks: RwLock<Vec<IsolationSink>>,
    reroute_sinks: RwLock<Vec<RerouteSink>>,
    total_isolations: AtomicU64,
    total_throttles: AtomicU64,
    total_alerts: AtomicU64,
    total_reroutes: AtomicU64,
}

impl ResponseEngine {
    pub fn new(registry: Arc<SignatureRegistry>, bus: Arc<EventBus>) -> Self {
        Self {
            registry,
            bus,
            isolations: RwLock::new(Vec::new()),
            alerts: RwLock::new(Vec::new()),
            alert_sinks: RwLock::new(Vec::new()),
            throttle_sinks: RwLock::new(Vec::new()),
            isolation_sinks: RwLock::new(Vec::new()),
            reroute_sinks: RwLock::new(Vec::new()),
            total_isolations: AtomicU64::new(0),
            total_throttles: AtomicU64::new(0),
            total_alerts: AtomicU64::new(0),
            total_reroutes: AtomicU64::new(0),
        }
    }

    /// Apply the decision table to a scored anomaly.
    pub fn respond(&self, anomaly: &AnomalyScore) {
        match anomaly.level {
            ThreatLevel::Critical => {
                self.isolate(
                    &anomaly.client_id,
                    anomaly.level,
                    anomaly.timestamp_ms,
                    self.reason_for(anomaly),
                );
                self.alert(anomaly);
            }
            ThreatLevel::High => {
                self.throttle(&anomaly.client_id, 0.5, anomaly.level);
                self.alert(anomaly);
            }
            ThreatLevel::Medium => {
                self.throttle(&anomaly.client_id, 0.7, anomaly.level);
            }
            ThreatLevel::Low | ThreatLevel::Safe => {}
        }
    }

    /// Quarantine a client: append an isolation record and publish it.
    pub fn isolate(&self, client_id: &str, level: ThreatLevel, now_ms: u64, reason: String) {
        let isolation = ClientIsolation {
            client_id: client_id.to_string(),
            level,
            start_ms: now_ms,
            reason,
        };

        warn!(
            client = %client_id,
            level = ?level,
            reason = %isolation.reason,
            "Client isolated"
        );

        self.total_isolations.fetch_add(1, Ordering::Relaxed);
        {
            let mut isolations = self.isolations.write();
            if isolations.len() >= MAX_ISOLATIONS {
                isolations.remove(0);
            }
            isolations.push(isolation.clone());
        }

        self.bus.emit_response(
            COMPONENT,
            level.event_severity(),
            "Client isolated",
            HashMap::from([
                ("client_id".to_string(), client_id.to_string()),
                ("reason".to_string(), isolation.reason.clone()),
            ]),
            vec!["isolate".into()],
        );

        for sink in self.isolation_sinks.read().iter() {
            sink(&isolation);
        }
    }

    /// Publish a throttle request. Does not alter rate-limiter state.
    pub fn throttle(&self, client_id: &str, factor: f64, level: ThreatLevel) {
        self.total_throttles.fetch_add(1, Ordering::Relaxed);

        self.bus.emit_response(
            COMPONENT,
            level.event_severity(),
            "Client throttled",
            HashMap::from([
                ("client_id".to_string(), client_id.to_string()),
                ("factor".to_string(), format!("{factor:.2}")),
            ]),
            vec!["throttle".into()],
        );

        for sink in self.throttle_sinks.read().iter() {
            sink(client_id, factor);
        }
    }

    /// Publish a reroute request for a client's traffic.
    pub fn reroute(&self, client_id: &str) {
        self.total_reroutes.fetch_add(1, Ordering::Relaxed);

        self.bus.emit_response(
            COMPONENT,
            EventSeverity::Medium,
            "Client traffic rerouted",
            HashMap::from([("client_id".to_string(), client_id.to_string())]),
            vec!["reroute".into()],
        );

        for sink in self.reroute_sinks.read().iter() {
            sink(client_id);
        }
    }

    /// Raise an operator alert for a scored anomaly.
    pub fn alert(&self, anomaly: &AnomalyScore) {
        self.total_alerts.fetch_add(1, Ordering::Relaxed);

        let details = format!(
            "score {:.2}, patterns {:?}",
            anomaly.score, anomaly.detected_patterns
        );
        {
            let mut alerts = self.alerts.write();
            if alerts.len() >= MAX_ALERTS {
                alerts.remove(0);
            }
            alerts.push(MeshAlert {
                timestamp_ms: anomaly.timestamp_ms,
                severity: anomaly.level,
                component: COMPONENT.into(),
                client_id: anomaly.client_id.clone(),
                title: "Anomalous client behavior".into(),
                details: details.clone(),
            });
        }

        self.bus.emit_notification(
            COMPONENT,
            anomaly.level.event_severity(),
            "Anomalous client behavior",
            HashMap::from([
                ("client_id".to_string(), anomaly.client_id.clone()),
                ("score".to_string(), format!("{:.2}", anomaly.score)),
            ]),
            vec!["alert".into()],
        );

        for sink in self.alert_sinks.read().iter() {
            sink(anomaly);
        }
    }

    // ── Sink registration ────────────────────────────────────────────────

    pub fn on_alert(&self, sink: AlertSink) {
        self.alert_sinks.write().push(sink);
    }

    pub fn on_throttle(&self, sink: ThrottleSink) {
        self.throttle_sinks.write().push(sink);
    }

    pub fn on_isolation(&self, sink: IsolationSink) {
        self.isolation_sinks.write().push(sink);
    }

    pub fn on_reroute(&self, sink: RerouteSink) {
        self.reroute_sinks.write().push(sink);
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn isolations(&self) -> Vec<ClientIsolation> {
        self.isolations.read().clone()
    }

    pub fn alerts(&self) -> Vec<MeshAlert> {
        self.alerts.read().clone()
    }

    pub fn total_isolations(&self) -> u64 {
        self.total_isolations.load(Ordering::Relaxed)
    }

    pub fn total_throttles(&self) -> u64 {
        self.total_throttles.load(Ordering::Relaxed)
    }

    pub fn total_alerts(&self) -> u64 {
        self.total_alerts.load(Ordering::Relaxed)
    }

    pub fn total_reroutes(&self) -> u64 {
        self.total_reroutes.load(Ordering::Relaxed)
    }

    // ── Internal ─────────────────────────────────────────────────────────

    /// Build the isolation reason from registry descriptions of the
    /// detected patterns.
    fn reason_for(&self, anomaly: &AnomalyScore) -> String {
        let descriptions: Vec<String> = anomaly
            .detected_patterns
            .iter()
            .filter_map(|p| self.registry.find_by_pattern(*p))
            .map(|sig| sig.description)
            .collect();
        if descriptions.is_empty() {
            format!("Threat level {:?} exceeded isolation threshold", anomaly.level)
        } else {
            descriptions.join("; ")
        }
    }
}
