//! Static scope matching: which policies apply to a principal, action and
//! resource, before any condition is looked at.

use cedar_policy::{ActionConstraint, Policy, PrincipalConstraint, ResourceConstraint};
use serde::Serialize;
use strum_macros::Display;

use crate::query::{ActionQuery, PrincipalQuery, ResourceQuery};

/// Why a policy's scope matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub(crate) enum PolicyMatchReason {
    PrincipalEq,
    PrincipalIn,
    PrincipalAny,
    PrincipalIs,
    PrincipalIsIn,
    ActionEq,
    ActionIn,
    ActionAny,
    ResourceEq,
    ResourceIn,
    ResourceAny,
    ResourceIs,
    ResourceIsIn,
}

pub(crate) fn principal_match_reason(
    constraint: PrincipalConstraint,
    principal: &PrincipalQuery,
) -> Option<PolicyMatchReason> {
    match constraint {
        PrincipalConstraint::Eq(uid) if uid == principal.uid => {
            Some(PolicyMatchReason::PrincipalEq)
        }
        PrincipalConstraint::In(uid) if principal.is_in(&uid) => {
            Some(PolicyMatchReason::PrincipalIn)
        }
        PrincipalConstraint::Any => Some(PolicyMatchReason::PrincipalAny),
        PrincipalConstraint::Is(entity_type) if entity_type.to_string() == principal.type_name => {
            Some(PolicyMatchReason::PrincipalIs)
        }
        PrincipalConstraint::IsIn(entity_type, parent)
            if entity_type.to_string() == principal.type_name && principal.is_in(&parent) =>
        {
            Some(PolicyMatchReason::PrincipalIsIn)
        }
        _ => None,
    }
}

pub(crate) fn action_match_reason(
    constraint: ActionConstraint,
    action: &ActionQuery,
) -> Option<PolicyMatchReason> {
    match constraint {
        ActionConstraint::Eq(uid) if uid == action.uid => Some(PolicyMatchReason::ActionEq),
        ActionConstraint::In(uids) if uids.contains(&action.uid) => {
            Some(PolicyMatchReason::ActionIn)
        }
        ActionConstraint::Any => Some(PolicyMatchReason::ActionAny),
        _ => None,
    }
}

pub(crate) fn resource_match_reason(
    constraint: ResourceConstraint,
    resource: &ResourceQuery,
) -> Option<PolicyMatchReason> {
    match constraint {
        ResourceConstraint::Eq(uid) if uid == resource.uid => Some(PolicyMatchReason::ResourceEq),
        ResourceConstraint::In(uid) if uid == resource.uid => Some(PolicyMatchReason::ResourceIn),
        ResourceConstraint::Any => Some(PolicyMatchReason::ResourceAny),
        ResourceConstraint::Is(entity_type) if entity_type.to_string() == resource.type_name => {
            Some(PolicyMatchReason::ResourceIs)
        }
        ResourceConstraint::IsIn(entity_type, parent)
            if entity_type.to_string() == resource.type_name && parent == resource.uid =>
        {
            Some(PolicyMatchReason::ResourceIsIn)
        }
        _ => None,
    }
}

/// All three scope reasons, or `None` if any part of the scope misses.
pub(crate) fn scope_match(
    policy: &Policy,
    principal: &PrincipalQuery,
    action: &ActionQuery,
    resource: &ResourceQuery,
) -> Option<[PolicyMatchReason; 3]> {
    Some([
        principal_match_reason(policy.principal_constraint(), principal)?,
        action_match_reason(policy.action_constraint(), action)?,
        resource_match_reason(policy.resource_constraint(), resource)?,
    ])
}
