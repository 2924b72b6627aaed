use std::str::FromStr;

use cedar_policy::{EntityId, EntityTypeName, EntityUid};

use crate::error::AuthzError;
use crate::types::Attributes;

/// Anything that maps onto a Cedar entity, e.g. `User::"alice"`,
/// `Action::"read"`, `Resource::"orders"`.
pub(crate) trait CedarAtom {
    /// The Cedar typename ("User", "Action", "Resource", ...)
    fn cedar_type(&self) -> &'static str;

    /// The unqualified id, e.g. `alice`
    fn cedar_id(&self) -> &str;

    fn cedar_entity_uid(&self) -> Result<EntityUid, AuthzError> {
        let type_name = EntityTypeName::from_str(self.cedar_type())?;
        Ok(EntityUid::from_type_name_and_id(
            type_name,
            EntityId::new(self.cedar_id()),
        ))
    }
}

/// An entity that can be checked against a residual condition in memory.
///
/// Implement this for the rows a handler loads when the condition cannot be
/// pushed down into the query.
pub trait AttributeSource {
    fn attributes(&self) -> Attributes;
}

impl AttributeSource for Attributes {
    fn attributes(&self) -> Attributes {
        self.clone()
    }
}
