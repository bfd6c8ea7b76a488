//! Security Event Bus — outbound integration fabric.
//!
//! The mesh publishes everything it decides (detections, throttles,
//! isolations, reroutes, alerts) as typed events; deployments subscribe with
//! category/severity/tag filters and forward to their own transports. The
//! bus keeps a bounded in-memory log for introspection and nothing more:
//! persistence and SIEM delivery are the subscriber's job.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Maximum events retained in the in-memory log before the oldest are pruned.
const MAX_EVENT_LOG: usize = 10_000;
/// Maximum concurrent subscriptions.
const MAX_SUBSCRIBERS: usize = 128;

// ── Event Types ──────────────────────────────────────────────────────────────

/// Severity attached to every published event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum EventSeverity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

/// Event category — determines routing to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EventCategory {
    /// A scored detection (anomaly, pattern hit)
    Detection,
    /// An automated response action (throttle, isolate, reroute)
    Response,
    /// An operator-facing alert
    Notification,
    /// Component health/status
    Health,
}

/// An event flowing through the bus.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SecurityEvent {
    /// Monotonic event ID assigned by the bus
    pub id: u64,
    /// Wall-clock publish time (epoch millis); metadata only, never scored
    pub timestamp_ms: i64,
    /// Component that emitted the event
    pub source_component: String,
    pub category: EventCategory,
    pub severity: EventSeverity,
    pub title: String,
    /// Structured detail payload
    pub details: HashMap<String, String>,
    /// Tags for subscriber filtering (e.g. "throttle", "isolate")
    pub tags: Vec<String>,
}

// ── Subscriber ───────────────────────────────────────────────────────────────

/// Subscriber callback. Invoked synchronously on the publishing thread.
pub type SubscriberFn = Arc<dyn Fn(&SecurityEvent) + Send + Sync>;

struct Subscription {
    id: u64,
    name: String,
    filter_category: Option<EventCategory>,
    filter_severity_min: Option<EventSeverity>,
    filter_tags: Vec<String>,
    callback: SubscriberFn,
}

// ── Event Bus ────────────────────────────────────────────────────────────────

/// Central publish/subscribe bus for security events.
pub struct EventBus {
    subscriptions: RwLock<Vec<Subscription>>,
    event_log: RwLock<Vec<SecurityEvent>>,
    next_event_id: AtomicU64,
    next_sub_id: AtomicU64,
    total_published: AtomicU64,
    total_delivered: AtomicU64,
    total_dropped: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(Vec::new()),
            event_log: RwLock::new(Vec::with_capacity(256)),
            next_event_id: AtomicU64::new(1),
            next_sub_id: AtomicU64::new(1),
            total_published: AtomicU64::new(0),
            total_delivered: AtomicU64::new(0),
            total_dropped: AtomicU64::new(0),
        }
    }

    // ── Publishing ───────────────────────────────────────────────────────

    /// Publish an event. Returns the assigned event ID.
    pub fn publish(&self, mut event: SecurityEvent) -> u64 {
        let id = self.next_event_id.fetch_add(1, Ordering::Relaxed);
        event.id = id;
        if event.timestamp_ms == 0 {
            event.timestamp_ms = chrono::Utc::now().timestamp_millis();
        }
        self.total_published.fetch_add(1, Ordering::Relaxed);

        debug!(
            id = id,
            src = %event.source_component,
            cat = ?event.category,
            sev = ?event.severity,
            title = %event.title,
            "Security event published"
        );

        let subs = self.subscriptions.read();
        for sub in subs.iter() {
            if Self::matches_filter(sub, &event) {
                (sub.callback)(&event);
                self.total_delivered.fetch_add(1, Ordering::Relaxed);
            }
        }
        drop(subs);

        let mut log = self.event_log.write();
        if log.len() >= MAX_EVENT_LOG {
            let drain_count = MAX_EVENT_LOG / 10;
            log.drain(..drain_count);
            self.total_dropped.fetch_add(drain_count as u64, Ordering::Relaxed);
        }
        log.push(event);

        id
    }

    /// Convenience: publish a detection event.
    pub fn emit_detection(
        &self,
        component: &str,
        severity: EventSeverity,
        title: &str,
        details: HashMap<String, String>,
        tags: Vec<String>,
    ) -> u64 {
        self.publish(SecurityEvent {
            id: 0,
            timestamp_ms: 0,
            source_component: component.into(),
            category: EventCategory::Detection,
            severity,
            title: title.into(),
            details,
            tags,
        })
    }

    /// Convenience: publish an automated response action.
    pub fn emit_response(
        &self,
        component: &str,
        severity: EventSeverity,
        title: &str,
        details: HashMap<String, String>,
        tags: Vec<String>,
    ) -> u64 {
        self.publish(SecurityEvent {
            id: 0,
            timestamp_ms: 0,
            source_component: component.into(),
            category: EventCategory::Response,
            severity,
            title: title.into(),
            details,
            tags,
        })
    }

    /// Convenience: publish an operator-facing notification.
    pub fn emit_notification(
        &self,
        component: &str,
        severity: EventSeverity,
        title: &str,
        details: HashMap<String, String>,
        tags: Vec<String>,
    ) -> u64 {
        self.publish(SecurityEvent {
            id: 0,
            timestamp_ms: 0,
            source_component: component.into(),
            category: EventCategory::Notification,
            severity,
            title: title.into(),
            details,
            tags,
        })
    }

    // ── Subscribing ──────────────────────────────────────────────────────

    /// Subscribe to events. Returns a subscription ID for `unsubscribe`.
    pub fn subscribe(
        &self,
        name: &str,
        filter_category: Option<EventCategory>,
        filter_severity_min: Option<EventSeverity>,
        filter_tags: Vec<String>,
        callback: SubscriberFn,
    ) -> u64 {
        let id = self.next_sub_id.fetch_add(1, Ordering::Relaxed);
        let mut subs = self.subscriptions.write();
        if subs.len() >= MAX_SUBSCRIBERS {
            warn!(name = %name, "Max subscribers reached, dropping oldest");
            subs.remove(0);
        }
        subs.push(Subscription {
            id,
            name: name.into(),
            filter_category,
            filter_severity_min,
            filter_tags,
            callback,
        });
        id
    }

    /// Remove a subscription by ID. Returns true if one was removed.
    pub fn unsubscribe(&self, sub_id: u64) -> bool {
        let mut subs = self.subscriptions.write();
        let before = subs.len();
        subs.retain(|s| {
            if s.id == sub_id {
                debug!(name = %s.name, "Subscription removed");
                false
            } else {
                true
            }
        });
        subs.len() < before
    }

    // ── Querying ─────────────────────────────────────────────────────────

    /// Most recent events (up to `limit`), newest first, optionally filtered.
    pub fn recent_events(&self, limit: usize, category: Option<EventCategory>) -> Vec<SecurityEvent> {
        let log = self.event_log.read();
        log.iter()
            .rev()
            .filter(|e| category.map_or(true, |c| e.category == c))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Events carrying a specific tag, newest first.
    pub fn events_by_tag(&self, tag: &str, limit: usize) -> Vec<SecurityEvent> {
        let log = self.event_log.read();
        log.iter()
            .rev()
            .filter(|e| e.tags.iter().any(|t| t == tag))
            .take(limit)
            .cloned()
            .collect()
    }

    // ── Stats ────────────────────────────────────────────────────────────

    pub fn total_published(&self) -> u64 { self.total_published.load(Ordering::Relaxed) }
    pub fn total_delivered(&self) -> u64 { self.total_delivered.load(Ordering::Relaxed) }
    pub fn total_dropped(&self) -> u64 { self.total_dropped.load(Ordering::Relaxed) }
    pub fn event_log_size(&self) -> usize { self.event_log.read().len() }
    pub fn subscriber_count(&self) -> usize { self.subscriptions.read().len() }

    // ── Internal ─────────────────────────────────────────────────────────

    fn matches_filter(sub: &Subscription, event: &SecurityEvent) -> bool {
        if let Some(cat) = sub.filter_category {
            if event.category != cat {
                return false;
            }
        }
        if let Some(min_sev) = sub.filter_severity_min {
            if event.severity < min_sev {
                return false;
            }
        }
        if !sub.filter_tags.is_empty() && !sub.filter_tags.iter().any(|ft| event.tags.contains(ft)) {
            return false;
        }
        true
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_subscribe() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicU64::new(0));
        let c = counter.clone();

        bus.subscribe(
            "test_sub",
            Some(EventCategory::Detection),
            None,
            vec![],
            Arc::new(move |_event| {
                c.fetch_add(1, Ordering::Relaxed);
            }),
        );

        let id = bus.emit_detection(
            "scorer",
            EventSeverity::High,
            "Anomaly detected",
            HashMap::new(),
            vec!["anomaly".into()],
        );

        assert!(id > 0);
        assert_eq!(counter.load(Ordering::Relaxed), 1);
        assert_eq!(bus.total_published(), 1);
        assert_eq!(bus.total_delivered(), 1);
    }

    #[test]
    fn test_category_filter() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicU64::new(0));
        let c = counter.clone();

        bus.subscribe(
            "response_only",
            Some(EventCategory::Response),
            None,
            vec![],
            Arc::new(move |_| {
                c.fetch_add(1, Ordering::Relaxed);
            }),
        );

        bus.emit_detection("scorer", EventSeverity::High, "det", HashMap::new(), vec![]);
        assert_eq!(counter.load(Ordering::Relaxed), 0);

        bus.emit_response("responder", EventSeverity::High, "throttled", HashMap::new(), vec![]);
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_severity_filter() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicU64::new(0));
        let c = counter.clone();

        bus.subscribe(
            "high_only",
            None,
            Some(EventSeverity::High),
            vec![],
            Arc::new(move |_| {
                c.fetch_add(1, Ordering::Relaxed);
            }),
        );

        bus.emit_detection("scorer", EventSeverity::Low, "low", HashMap::new(), vec![]);
        assert_eq!(counter.load(Ordering::Relaxed), 0);

        bus.emit_detection("scorer", EventSeverity::Critical, "crit", HashMap::new(), vec![]);
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_tag_filter() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicU64::new(0));
        let c = counter.clone();

        bus.subscribe(
            "throttle_only",
            None,
            None,
            vec!["throttle".into()],
            Arc::new(move |_| {
                c.fetch_add(1, Ordering::Relaxed);
            }),
        );

        bus.emit_response("responder", EventSeverity::High, "isolated", HashMap::new(), vec!["isolate".into()]);
        assert_eq!(counter.load(Ordering::Relaxed), 0);

        bus.emit_response("responder", EventSeverity::High, "throttled", HashMap::new(), vec!["throttle".into()]);
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_event_log_pruning() {
        let bus = EventBus::new();
        for i in 0..(MAX_EVENT_LOG + 500) {
            bus.emit_detection("scorer", EventSeverity::Info, &format!("event-{}", i), HashMap::new(), vec![]);
        }
        assert!(bus.event_log_size() <= MAX_EVENT_LOG);
        assert_eq!(bus.total_published(), (MAX_EVENT_LOG + 500) as u64);
        assert!(bus.total_dropped() > 0);
    }

    #[test]
    fn test_events_by_tag() {
        let bus = EventBus::new();
        bus.emit_response("responder", EventSeverity::High, "t1", HashMap::new(), vec!["throttle".into()]);
        bus.emit_response("responder", EventSeverity::Critical, "i1", HashMap::new(), vec!["isolate".into()]);
        bus.emit_response("responder", EventSeverity::High, "t2", HashMap::new(), vec!["throttle".into()]);

        let throttles = bus.events_by_tag("throttle", 10);
        assert_eq!(throttles.len(), 2);
        assert_eq!(throttles[0].title, "t2");
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicU64::new(0));
        let c = counter.clone();

        let sub_id = bus.subscribe(
            "temp",
            None,
            None,
            vec![],
            Arc::new(move |_| {
                c.fetch_add(1, Ordering::Relaxed);
            }),
        );
        bus.emit_detection("scorer", EventSeverity::Info, "e1", HashMap::new(), vec![]);
        assert_eq!(counter.load(Ordering::Relaxed), 1);

        assert!(bus.unsubscribe(sub_id));
        bus.emit_detection("scorer", EventSeverity::Info, "e2", HashMap::new(), vec![]);
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }
}
