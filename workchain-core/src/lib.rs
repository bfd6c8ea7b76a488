//! # WorkChain Core
//!
//! Shared infrastructure for the WorkChain security crates:
//! - A monotonic millisecond clock. Behavior scoring and rate limiting read
//!   time exclusively from here; wall-clock is never consulted on those paths.
//! - The security event bus: typed publish/subscribe routing that carries
//!   detections, response actions, and notifications out to caller-provided
//!   subscribers. The library itself performs no I/O.

pub mod clock;
pub mod event_bus;

pub use clock::MonoClock;
pub use event_bus::{EventBus, EventCategory, EventSeverity, SecurityEvent, SubscriberFn};
