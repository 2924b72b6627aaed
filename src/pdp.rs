//! The seam to the policy decision point.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::AuthzError;
use crate::types::{AttributeName, Attributes, Condition, Principal, Privilege};

/// What a policy decision point returns for one request: the raw condition
/// the applicable policies impose, and the referenced attributes it could
/// not resolve from the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyResult {
    pub condition: Condition,
    pub unresolved: BTreeSet<AttributeName>,
}

impl PolicyResult {
    pub fn new(condition: Condition, attributes: &Attributes) -> Self {
        let unresolved = condition
            .attributes()
            .into_iter()
            .filter(|name| attributes.is_unknown(name))
            .collect();
        Self {
            condition,
            unresolved,
        }
    }
}

/// A policy decision point.
///
/// One handle is shared by every request, so implementations must be safe to
/// call concurrently. A decision point that cannot be reached fails with
/// [`AuthzError::PolicyDecisionPointUnavailable`]; retrying is the caller's
/// choice.
pub trait PolicyDecisionPoint: Send + Sync {
    /// Match policies for `principal` against the action and resource in
    /// `attributes`.
    fn evaluate(
        &self,
        principal: &Principal,
        attributes: &Attributes,
    ) -> Result<PolicyResult, AuthzError>;

    /// Every privilege `principal` could hold under some attribute binding.
    fn potential_privileges(&self, principal: &Principal) -> Result<BTreeSet<Privilege>, AuthzError>;
}
