use cedar_policy::{ParseErrors, PolicySet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuthzError {
    #[error("invalid attribute name: {0}")]
    InvalidAttributeName(String),

    #[error("decision is not conditional: {0}")]
    NotConditional(String),

    #[error("missing attribute: {0}")]
    MissingAttribute(String),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("no column mapped for attribute: {0}")]
    UnmappableAttribute(String),

    #[error("invalid column reference: {0}")]
    InvalidColumnReference(String),

    #[error("policy decision point unavailable: {0}")]
    PolicyDecisionPointUnavailable(String),

    #[error("failed to parse policy: {0}")]
    ParseError(String),

    #[error("unsupported policy expression: {0}")]
    UnsupportedExpression(String),

    #[error("principal attribute not found: {0}")]
    MissingPrincipalAttribute(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Poisoned lock error: {0}")]
    PoisonedLockError(String),
}

impl From<ParseErrors> for AuthzError {
    fn from(err: ParseErrors) -> Self {
        AuthzError::ParseError(err.to_string())
    }
}

impl From<std::sync::PoisonError<std::sync::RwLockReadGuard<'_, PolicySet>>> for AuthzError {
    fn from(err: std::sync::PoisonError<std::sync::RwLockReadGuard<'_, PolicySet>>) -> Self {
        AuthzError::PoisonedLockError(err.to_string())
    }
}

impl From<std::sync::PoisonError<std::sync::RwLockWriteGuard<'_, PolicySet>>> for AuthzError {
    fn from(err: std::sync::PoisonError<std::sync::RwLockWriteGuard<'_, PolicySet>>) -> Self {
        AuthzError::PoisonedLockError(err.to_string())
    }
}
