//! Immutable attribute bindings for a single check.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{AttributeName, AttributeValue};

/// The inputs of one privilege check: the `action` and `resource` selecting
/// which policies apply, plus named attribute values.
///
/// Every builder method returns a new instance and leaves `self` untouched, so
/// a partially built value can serve as a shared prefix for several checks.
///
/// ```rust
/// use residual_authz::{AttributeName, AttributeValue, Attributes};
/// let created_by: AttributeName = "order.createdBy".parse().unwrap();
/// let base = Attributes::new().with_action("read").with_resource("orders");
/// let bob = base.with(created_by.clone(), "bob");
/// let open = base.with_unknown(created_by.clone());
/// assert_eq!(bob.get(&created_by), Some(&AttributeValue::from("bob")));
/// assert!(base.get(&created_by).is_none());
/// assert!(open.is_unknown(&created_by));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resource: Option<String>,
    #[serde(default)]
    values: Arc<BTreeMap<AttributeName, AttributeValue>>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_action(&self, action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            ..self.clone()
        }
    }

    pub fn with_resource(&self, resource: impl Into<String>) -> Self {
        Self {
            resource: Some(resource.into()),
            ..self.clone()
        }
    }

    pub fn with(&self, name: AttributeName, value: impl Into<AttributeValue>) -> Self {
        let mut values = BTreeMap::clone(&self.values);
        values.insert(name, value.into());
        Self {
            values: Arc::new(values),
            ..self.clone()
        }
    }

    /// Bind `name` to [`AttributeValue::Unknown`].
    pub fn with_unknown(&self, name: AttributeName) -> Self {
        self.with(name, AttributeValue::Unknown)
    }

    /// Layer `other` on top of `self`. Values and selectors set in `other` win.
    pub fn overlay(&self, other: &Attributes) -> Self {
        let mut values = BTreeMap::clone(&self.values);
        values.extend(other.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self {
            action: other.action.clone().or_else(|| self.action.clone()),
            resource: other.resource.clone().or_else(|| self.resource.clone()),
            values: Arc::new(values),
        }
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    pub fn get(&self, name: &AttributeName) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    /// True when `name` is absent or bound to `Unknown`.
    pub fn is_unknown(&self, name: &AttributeName) -> bool {
        self.get(name).is_none_or(AttributeValue::is_unknown)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AttributeName, &AttributeValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(AttributeName, AttributeValue)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (AttributeName, AttributeValue)>>(iter: T) -> Self {
        Self {
            values: Arc::new(iter.into_iter().collect()),
            ..Self::default()
        }
    }
}
