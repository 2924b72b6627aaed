//! Coarse-grained capabilities: an action on a resource.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AuthzError;

/// An `(action, resource)` pair such as `read` on `orders`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub struct Privilege {
    action: String,
    resource: String,
}

impl Privilege {
    pub fn of(action: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            resource: resource.into(),
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The `action:resource` authority string used by route guards.
    ///
    /// ```rust
    /// use residual_authz::Privilege;
    /// assert_eq!(Privilege::of("read", "products").to_authority(), "read:products");
    /// ```
    pub fn to_authority(&self) -> String {
        format!("{}:{}", self.action, self.resource)
    }
}

impl Display for Privilege {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}:{}", self.action, self.resource)
    }
}

impl FromStr for Privilege {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((action, resource))
                if !action.trim().is_empty()
                    && !resource.trim().is_empty()
                    && !resource.contains(':') =>
            {
                Ok(Self::of(action.trim(), resource.trim()))
            }
            _ => Err(AuthzError::InvalidFormat(format!(
                "expected 'action:resource', got '{s}'"
            ))),
        }
    }
}
