//! Cedar entity types that checks are mapped onto.
//!
//! A check for `read` on `orders` by `alice` in group `sales` becomes the
//! Cedar request `User::"alice"` (parent `Group::"sales"`), `Action::"read"`,
//! `Resource::"orders"`.

use strum_macros::{AsRefStr, Display, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumString, IntoStaticStr)]
pub enum CedarType {
    /// The requesting principal, e.g. `User::"alice"`
    User,
    /// A principal's group membership, e.g. `Group::"sales"`
    Group,
    /// The privilege action, e.g. `Action::"read"`
    Action,
    /// The privilege resource, e.g. `Resource::"orders"`
    Resource,
}
