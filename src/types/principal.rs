//! The authenticated principal a set of checks is made for.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::traits::CedarAtom;

use super::cedar_type::CedarType;
use super::{AttributeName, AttributeValue};

/// Identity supplied by the authentication layer.
///
/// The id and groups are taken as given; nothing here validates them.
/// Policies see the principal as `User::"<id>"` with `Group::"<group>"`
/// parents, and `principal.<attr>` resolves against `attributes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    id: String,
    #[serde(default)]
    groups: BTreeSet<String>,
    #[serde(default)]
    attributes: BTreeMap<AttributeName, AttributeValue>,
}

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            groups: BTreeSet::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.insert(group.into());
        self
    }

    pub fn with_attribute(mut self, name: AttributeName, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name, value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(String::as_str)
    }

    /// Look up `principal.<name>`. `id` falls back to the principal id.
    pub fn attribute(&self, name: &AttributeName) -> Option<AttributeValue> {
        match self.attributes.get(name) {
            Some(value) => Some(value.clone()),
            None if name.segments() == ["id"] => Some(AttributeValue::String(self.id.clone())),
            None => None,
        }
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}::{:?}", CedarType::User, self.id)
    }
}

impl CedarAtom for Principal {
    fn cedar_type(&self) -> &'static str {
        CedarType::User.into()
    }

    fn cedar_id(&self) -> &str {
        &self.id
    }
}

/// A group the principal belongs to, e.g. `Group::"sales"`.
pub(crate) struct GroupRef<'a>(pub(crate) &'a str);

impl CedarAtom for GroupRef<'_> {
    fn cedar_type(&self) -> &'static str {
        CedarType::Group.into()
    }

    fn cedar_id(&self) -> &str {
        self.0
    }
}
