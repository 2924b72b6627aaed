use std::collections::HashSet;

use cedar_policy::EntityUid;

use crate::error::AuthzError;
use crate::traits::CedarAtom;
use crate::types::{CedarType, GroupRef, Principal};

/// The principal side of a scope match: `User::"id"` and its groups.
#[derive(Debug)]
pub(crate) struct PrincipalQuery {
    pub(crate) uid: EntityUid,
    pub(crate) type_name: String,
    pub(crate) parents: HashSet<EntityUid>,
}

impl PrincipalQuery {
    pub(crate) fn from_principal(principal: &Principal) -> Result<Self, AuthzError> {
        let uid = principal.cedar_entity_uid()?;
        let parents = principal
            .groups()
            .map(|group| GroupRef(group).cedar_entity_uid())
            .collect::<Result<HashSet<_>, _>>()?;

        Ok(Self {
            type_name: uid.type_name().to_string(),
            uid,
            parents,
        })
    }

    /// Cedar `in` includes equality for entities.
    pub(crate) fn is_in(&self, uid: &EntityUid) -> bool {
        *uid == self.uid || self.parents.contains(uid)
    }
}

#[derive(Debug)]
pub(crate) struct ActionQuery {
    pub(crate) uid: EntityUid,
}

impl ActionQuery {
    pub(crate) fn new(action: &str) -> Result<Self, AuthzError> {
        Ok(Self {
            uid: Selector(CedarType::Action, action).cedar_entity_uid()?,
        })
    }
}

#[derive(Debug)]
pub(crate) struct ResourceQuery {
    pub(crate) uid: EntityUid,
    pub(crate) type_name: String,
}

impl ResourceQuery {
    pub(crate) fn new(resource: &str) -> Result<Self, AuthzError> {
        let uid = Selector(CedarType::Resource, resource).cedar_entity_uid()?;
        Ok(Self {
            type_name: uid.type_name().to_string(),
            uid,
        })
    }
}

/// An action or resource name from a check, e.g. `Action::"read"`.
struct Selector<'a>(CedarType, &'a str);

impl CedarAtom for Selector<'_> {
    fn cedar_type(&self) -> &'static str {
        self.0.into()
    }

    fn cedar_id(&self) -> &str {
        self.1
    }
}
