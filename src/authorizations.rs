//! The authorization facade: privilege checks for one principal.
//!
//! An [`AuthorizationProvider`] is built once at startup around a shared
//! policy decision point. Each request asks it for an [`Authorizations`]
//! value bound to the request's principal, passes that value down the call
//! chain explicitly, and drops it when the request ends.
//!
//! ```rust
//! use std::sync::Arc;
//! use residual_authz::{AuthorizationProvider, Attributes, CedarPolicyDecisionPoint, Principal, Privilege};
//!
//! let pdp = CedarPolicyDecisionPoint::new_from_str(r#"
//!     permit (principal, action == Action::"read", resource == Resource::"orders")
//!     when { context.order.createdBy == principal.id };
//! "#).unwrap();
//! let provider = AuthorizationProvider::new(Arc::new(pdp));
//! let authz = provider.for_principal(Principal::new("bob"));
//!
//! let read_orders = Privilege::of("read", "orders");
//! let decision = authz.check_privilege(&read_orders, &Attributes::new()).unwrap();
//! assert_eq!(decision.to_string(), r#"Conditional(eq(order.createdBy, "bob"))"#);
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::AuthzError;
use crate::evaluator::partially_evaluate;
use crate::metrics::{DecisionEvent, DecisionPhases, DecisionSink};
use crate::pdp::PolicyDecisionPoint;
use crate::timers::{PhaseTimer, as_millis};
use crate::types::{Attributes, Decision, Principal, Privilege};

/// Long-lived factory for per-request [`Authorizations`].
///
/// The decision point handle is shared by every request, which is why
/// [`PolicyDecisionPoint`] requires `Send + Sync`.
#[derive(Clone)]
pub struct AuthorizationProvider {
    pdp: Arc<dyn PolicyDecisionPoint>,
    sink: Option<Arc<dyn DecisionSink>>,
}

impl AuthorizationProvider {
    pub fn new(pdp: Arc<dyn PolicyDecisionPoint>) -> Self {
        Self { pdp, sink: None }
    }

    /// Report every decision made through this provider to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn DecisionSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn for_principal(&self, principal: Principal) -> Authorizations {
        Authorizations {
            principal,
            base: Attributes::new(),
            pdp: Arc::clone(&self.pdp),
            sink: self.sink.clone(),
        }
    }
}

/// Privilege checks for one principal within one request.
#[derive(Clone)]
pub struct Authorizations {
    principal: Principal,
    base: Attributes,
    pdp: Arc<dyn PolicyDecisionPoint>,
    sink: Option<Arc<dyn DecisionSink>>,
}

impl Authorizations {
    /// Attributes known for the whole request, e.g. `user.region`. They are
    /// visible to prechecks and underlie every check's own attributes.
    pub fn with_attributes(mut self, base: Attributes) -> Self {
        self.base = base;
        self
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Decide `privilege` given what the caller knows about the resource
    /// instance. Attributes the caller leaves out, or binds to `Unknown`,
    /// remain in the condition of a `Conditional` decision.
    pub fn check_privilege(
        &self,
        privilege: &Privilege,
        attributes: &Attributes,
    ) -> Result<Decision, AuthzError> {
        self.decide(privilege, attributes, false)
    }

    pub fn check(
        &self,
        action: &str,
        resource: &str,
        attributes: &Attributes,
    ) -> Result<Decision, AuthzError> {
        self.check_privilege(&Privilege::of(action, resource), attributes)
    }

    /// Decide `privilege` before any resource instance is loaded.
    ///
    /// `Denied` means no instance can be permitted, so loading one is wasted
    /// work.
    pub fn precheck_privilege(&self, privilege: &Privilege) -> Result<Decision, AuthzError> {
        self.decide(privilege, &Attributes::new(), true)
    }

    /// True if the precheck of at least one of `privileges` is not `Denied`.
    /// An empty slice admits nothing.
    pub fn precheck_any(&self, privileges: &[Privilege]) -> Result<bool, AuthzError> {
        for privilege in privileges {
            if !self.precheck_privilege(privilege)?.is_denied() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Privileges the principal could hold under some attribute binding. For
    /// display only; enforce with [`Self::check_privilege`].
    pub fn get_potential_privileges(&self) -> Result<BTreeSet<Privilege>, AuthzError> {
        let privileges = self.pdp.potential_privileges(&self.principal)?;
        debug!(
            event = "Privileges",
            phase = "Potential",
            principal = self.principal.id(),
            privileges = privileges.len()
        );
        Ok(privileges)
    }

    fn decide(
        &self,
        privilege: &Privilege,
        attributes: &Attributes,
        precheck: bool,
    ) -> Result<Decision, AuthzError> {
        let mut pdp_time = Duration::ZERO;
        let mut fold_time = Duration::ZERO;
        let mut total_time = Duration::ZERO;

        let (decision, unresolved) = {
            let _total = PhaseTimer::new(&mut total_time);
            let request = self
                .base
                .overlay(attributes)
                .with_action(privilege.action())
                .with_resource(privilege.resource());

            let result = {
                let _timer = PhaseTimer::new(&mut pdp_time);
                self.pdp.evaluate(&self.principal, &request)?
            };
            let residual = {
                let _timer = PhaseTimer::new(&mut fold_time);
                partially_evaluate(&result.condition, &request)?
            };
            // Only what is left after folding is still open.
            let unresolved = residual.attributes();
            (Decision::from_residual(residual), unresolved)
        };

        debug!(
            event = "Check",
            phase = "Decision",
            principal = self.principal.id(),
            privilege = %privilege,
            precheck = precheck,
            decision = %decision
        );
        if precheck && decision.is_denied() {
            info!(
                event = "Precheck",
                phase = "Denied",
                principal = self.principal.id(),
                privilege = %privilege
            );
        }

        if let Some(sink) = &self.sink {
            sink.on_decision(&DecisionEvent {
                principal_id: self.principal.id().to_string(),
                privilege: privilege.clone(),
                outcome: (&decision).into(),
                unresolved: unresolved.into_iter().collect(),
                precheck,
                phases: DecisionPhases {
                    pdp_ms: as_millis(pdp_time),
                    fold_ms: as_millis(fold_time),
                    total_ms: as_millis(total_time),
                },
            });
        }

        Ok(decision)
    }
}
