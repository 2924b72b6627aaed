// src/lib.rs
pub use authorizations::{AuthorizationProvider, Authorizations};
pub use engine::CedarPolicyDecisionPoint;
pub use error::AuthzError;
pub use evaluator::{evaluate, partially_evaluate};
pub use loader::compile_policy;
pub use metrics::{DecisionEvent, DecisionOutcome, DecisionPhases, DecisionSink};
pub use pdp::{PolicyDecisionPoint, PolicyResult};
pub use registry::{PrivilegeRegistry, PrivilegeRegistryBuilder};
pub use traits::AttributeSource;
pub use translator::{
    ColumnMapping, PlaceholderStyle, QueryFragment, QueryTranslator, translate, translate_with,
};
pub use types::{
    AttributeName, AttributeValue, Attributes, ComparisonOp, Condition, ConditionKind, Decision,
    MAX_EXACT_INTEGER, Principal, Privilege, ValueKind,
};
pub use visitor::ConditionVisitor;

mod authorizations;
mod engine;
mod error;
mod evaluator;
mod loader;
mod lower;
pub mod metrics;
mod pdp;
mod policy_match;
mod query;
mod registry;
mod timers;
mod traits;
mod translator;
mod types;
mod visitor;

#[cfg(test)]
mod tests;
