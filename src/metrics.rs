//! Vendor-agnostic decision auditing via a pluggable sink.
//!
//! Attach a [`DecisionSink`] to an [`crate::AuthorizationProvider`] to see
//! every decision the provider's checks produce, e.g. to write an audit log
//! or feed counters in Prometheus or OpenTelemetry. Sinks are per provider;
//! there is no global sink.
//!
//! ```rust
//! use residual_authz::metrics::{DecisionEvent, DecisionOutcome, DecisionSink};
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! #[derive(Default)]
//! struct DenialCounter(AtomicU64);
//!
//! impl DecisionSink for DenialCounter {
//!     fn on_decision(&self, event: &DecisionEvent) {
//!         if event.outcome == DecisionOutcome::Denied {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//! }
//! ```

use serde::Serialize;
use strum_macros::Display;

use crate::types::{AttributeName, Decision, Privilege};

/// Classification of a decision, without its condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub enum DecisionOutcome {
    Denied,
    Granted,
    Conditional,
}

impl From<&Decision> for DecisionOutcome {
    fn from(decision: &Decision) -> Self {
        match decision {
            Decision::Denied => DecisionOutcome::Denied,
            Decision::Granted => DecisionOutcome::Granted,
            Decision::Conditional { .. } => DecisionOutcome::Conditional,
        }
    }
}

/// Time spent per phase of a check, in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecisionPhases {
    /// Asking the policy decision point
    pub pdp_ms: f64,
    /// Folding known attributes into the raw condition
    pub fold_ms: f64,
    pub total_ms: f64,
}

impl DecisionPhases {
    /// Time not accounted for by the measured phases.
    pub fn overhead_ms(&self) -> f64 {
        self.total_ms - (self.pdp_ms + self.fold_ms)
    }
}

/// One decision, as reported to a [`DecisionSink`].
#[derive(Debug, Clone, Serialize)]
pub struct DecisionEvent {
    pub principal_id: String,
    pub privilege: Privilege,
    pub outcome: DecisionOutcome,
    /// Attributes the policy decision point could not resolve, sorted
    pub unresolved: Vec<AttributeName>,
    /// True for prechecks, which run without resource-instance attributes
    pub precheck: bool,
    pub phases: DecisionPhases,
}

/// Receives decision events.
///
/// Called synchronously once per successful check, on the checking thread,
/// so implementations must be thread-safe and should return quickly. Checks
/// that fail with an error produce no event.
pub trait DecisionSink: Send + Sync {
    fn on_decision(&self, event: &DecisionEvent);
}
