//! Signature Registry — catalog of named threat patterns.
//!
//! Reference data only: the scorer does not consult the registry (its math
//! is fixed); the registry exists for introspection and for the response
//! engine's reason strings. Seeded with the default signature set at
//! construction.

use crate::types::{BehaviorPattern, ThreatLevel, ThreatSignature};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Thread-safe store of threat signatures, keyed by signature id.
pub struct SignatureRegistry {
    signatures: RwLock<HashMap<String, ThreatSignature>>,
}

impl SignatureRegistry {
    /// Create a registry seeded with the default threat signatures.
    pub fn new() -> Self {
        let registry = Self {
            signatures: RwLock::new(HashMap::new()),
        };
        for sig in Self::default_signatures() {
            registry.add(sig);
        }
        registry
    }

    /// Create an empty registry (no seeded defaults).
    pub fn empty() -> Self {
        Self {
            signatures: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace a signature by its id.
    pub fn add(&self, sig: ThreatSignature) {
        self.signatures.write().insert(sig.id.clone(), sig);
    }

    /// Look up a signature by id.
    pub fn get(&self, id: &str) -> Option<ThreatSignature> {
        self.signatures.read().get(id).cloned()
    }

    /// True if any registered signature targets the given pattern.
    pub fn matches_pattern(&self, pattern: BehaviorPattern) -> bool {
        self.signatures
            .read()
            .values()
            .any(|sig| sig.pattern == pattern)
    }

    /// First registered signature targeting the given pattern, if any.
    pub fn find_by_pattern(&self, pattern: BehaviorPattern) -> Option<ThreatSignature> {
        self.signatures
            .read()
            .values()
            .find(|sig| sig.pattern == pattern)
            .cloned()
    }

    /// All registered signatures, in no particular order.
    pub fn signatures(&self) -> Vec<ThreatSignature> {
        self.signatures.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.signatures.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.read().is_empty()
    }

    fn default_signatures() -> Vec<ThreatSignature> {
        vec![
            ThreatSignature {
                id: "rapid_failures".into(),
                pattern: BehaviorPattern::RapidFailures,
                threshold: 5,
                window_ms: 60_000,
                severity: ThreatLevel::Medium,
                description: "5 failed requests in 1 minute".into(),
            },
            ThreatSignature {
                id: "enumeration_attack".into(),
                pattern: BehaviorPattern::Enumeration,
                threshold: 20,
                window_ms: 300_000,
                severity: ThreatLevel::High,
                description: "20+ path enumeration attempts".into(),
            },
            ThreatSignature {
                id: "payload_injection".into(),
                pattern: BehaviorPattern::PayloadInjection,
                threshold: 1,
                window_ms: 1_000,
                severity: ThreatLevel::Critical,
                description: "Malicious payload detected".into(),
            },
            ThreatSignature {
                id: "timing_attack".into(),
                pattern: BehaviorPattern::TimingAttack,
                threshold: 50,
                window_ms: 60_000,
                severity: ThreatLevel::Medium,
                description: "Abnormal request timing pattern".into(),
            },
            ThreatSignature {
                id: "resource_abuse".into(),
                pattern: BehaviorPattern::ResourceAbuse,
                threshold: 100,
                window_ms: 60_000,
                severity: ThreatLevel::High,
                description: "Excessive resource consumption".into(),
            },
        ]
    }
}

impl Default for SignatureRegistry {
    fn default() -> Self {
        Self::new()
    }
}
