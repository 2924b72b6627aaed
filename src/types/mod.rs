//! Data model: attribute names and values, privileges, principals, the
//! condition tree and decisions.
//!
//! Canonical string forms:
//! - AttributeName: dotted segments, `order.createdBy`
//! - Privilege: `action:resource`, `read:orders`
//! - Condition: `and(eq(order.createdBy, "bob"), le(order.total, 100))`

mod attribute_name;
mod attribute_value;
mod attributes;
mod cedar_type;
mod condition;
mod decision;
mod principal;
mod privilege;

pub use attribute_name::AttributeName;
pub use attribute_value::{AttributeValue, MAX_EXACT_INTEGER, ValueKind};
pub use attributes::Attributes;
pub(crate) use cedar_type::CedarType;
pub use condition::{ComparisonOp, Condition, ConditionKind};
pub use decision::Decision;
pub(crate) use principal::GroupRef;
pub use principal::Principal;
pub use privilege::Privilege;
