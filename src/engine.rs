use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use cedar_policy::{ActionConstraint, Effect, EntityUid, Policy, PolicySet, ResourceConstraint};
use tracing::{debug, info, warn};

use crate::error::AuthzError;
use crate::lower::policy_condition;
use crate::loader;
use crate::pdp::{PolicyDecisionPoint, PolicyResult};
use crate::policy_match::{principal_match_reason, scope_match};
use crate::query::{ActionQuery, PrincipalQuery, ResourceQuery};
use crate::types::{Attributes, CedarType, Condition, Principal, Privilege};

/// A policy decision point over a Cedar policy set. Cloneable and
/// thread-safe; clones share the policy set.
///
/// A check for `read` on `orders` matches policies scoped to
/// `Action::"read"` and `Resource::"orders"`. The conditions of matching
/// policies are combined with Cedar's semantics: some permit must hold and
/// no forbid may hold. A permit whose condition cannot be evaluated for the
/// principal (a missing or mistyped `principal` attribute) does not apply; a
/// forbid in that state fails the request instead, so an error never widens
/// access.
#[derive(Clone)]
pub struct CedarPolicyDecisionPoint {
    inner: Arc<RwLock<PolicySet>>,
}

impl CedarPolicyDecisionPoint {
    pub fn new_from_str(policy_text: &str) -> Result<Self, AuthzError> {
        let set = loader::compile_policy(policy_text)?;
        Ok(CedarPolicyDecisionPoint {
            inner: Arc::new(RwLock::new(set)),
        })
    }

    /// Replace the policy set. Checks in flight finish against the old set.
    pub fn reload_from_str(&self, policy_text: &str) -> Result<(), AuthzError> {
        let new_set = loader::compile_policy(policy_text)?;
        let count = new_set.policies().count();
        *self.inner.write()? = new_set;
        info!(event = "Reload", phase = "Complete", policies = count);
        Ok(())
    }

    pub fn policies(&self) -> Result<Vec<Policy>, AuthzError> {
        let guard = self.inner.read()?;
        Ok(guard.policies().cloned().collect())
    }
}

impl PolicyDecisionPoint for CedarPolicyDecisionPoint {
    fn evaluate(
        &self,
        principal: &Principal,
        attributes: &Attributes,
    ) -> Result<PolicyResult, AuthzError> {
        let action = attributes
            .action()
            .ok_or_else(|| AuthzError::InvalidFormat("request has no action".to_string()))?;
        let resource = attributes
            .resource()
            .ok_or_else(|| AuthzError::InvalidFormat("request has no resource".to_string()))?;

        debug!(
            event = "Request",
            phase = "Evaluation",
            principal = principal.to_string(),
            action = action,
            resource = resource,
            attributes = attributes.len()
        );

        let principal_query = PrincipalQuery::from_principal(principal)?;
        let action_query = ActionQuery::new(action)?;
        let resource_query = ResourceQuery::new(resource)?;

        let guard = self.inner.read()?;
        let mut permits = Vec::new();
        let mut forbids = Vec::new();

        for policy in guard.policies() {
            let Some(reasons) = scope_match(policy, &principal_query, &action_query, &resource_query)
            else {
                continue;
            };

            let condition = match policy_condition(policy, principal) {
                Ok(condition) => condition,
                Err(
                    err @ (AuthzError::MissingPrincipalAttribute(_) | AuthzError::TypeMismatch(_)),
                ) if policy.effect() == Effect::Permit => {
                    warn!(
                        event = "Request",
                        phase = "Policy",
                        policy = policy.id().to_string(),
                        error = err.to_string(),
                        "policy skipped"
                    );
                    continue;
                }
                Err(err) => {
                    warn!(
                        event = "Request",
                        phase = "Policy",
                        policy = policy.id().to_string(),
                        effect = ?policy.effect(),
                        error = err.to_string(),
                        "policy failed"
                    );
                    return Err(err);
                }
            };

            debug!(
                event = "Request",
                phase = "Policy",
                policy = policy.id().to_string(),
                effect = ?policy.effect(),
                reasons = ?reasons,
                condition = condition.to_string()
            );

            match policy.effect() {
                Effect::Permit => permits.push(condition),
                Effect::Forbid => forbids.push(Condition::not(condition)),
            }
        }

        let condition = Condition::and(std::iter::once(Condition::or(permits)).chain(forbids));
        let result = PolicyResult::new(condition, attributes);

        debug!(
            event = "Request",
            phase = "Result",
            condition = result.condition.to_string(),
            unresolved = result.unresolved.len()
        );

        Ok(result)
    }

    fn potential_privileges(
        &self,
        principal: &Principal,
    ) -> Result<BTreeSet<Privilege>, AuthzError> {
        let principal_query = PrincipalQuery::from_principal(principal)?;
        let guard = self.inner.read()?;
        let mut privileges = BTreeSet::new();

        for policy in guard.policies().filter(|p| p.effect() == Effect::Permit) {
            if principal_match_reason(policy.principal_constraint(), &principal_query).is_none() {
                continue;
            }

            let actions = match policy.action_constraint() {
                ActionConstraint::Eq(uid) => vec![uid],
                ActionConstraint::In(uids) => uids,
                ActionConstraint::Any => {
                    debug!(
                        event = "Privileges",
                        phase = "Skip",
                        policy = policy.id().to_string(),
                        reason = "unconstrained action"
                    );
                    continue;
                }
            };
            let resources = match policy.resource_constraint() {
                ResourceConstraint::Eq(uid) | ResourceConstraint::In(uid) => vec![uid],
                _ => {
                    debug!(
                        event = "Privileges",
                        phase = "Skip",
                        policy = policy.id().to_string(),
                        reason = "unconstrained resource"
                    );
                    continue;
                }
            };

            for action in actions.iter().filter(|uid| is_type(uid, CedarType::Action)) {
                for resource in resources.iter().filter(|uid| is_type(uid, CedarType::Resource)) {
                    privileges.insert(Privilege::of(
                        action.id().unescaped(),
                        resource.id().unescaped(),
                    ));
                }
            }
        }

        debug!(
            event = "Privileges",
            phase = "Result",
            principal = principal.to_string(),
            privileges = privileges.len()
        );

        Ok(privileges)
    }
}

fn is_type(uid: &EntityUid, kind: CedarType) -> bool {
    uid.type_name().to_string() == kind.as_ref()
}

#[cfg(test)]
mod tests;
