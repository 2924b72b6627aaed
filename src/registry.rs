//! Named privileges, declared once at startup.

use std::collections::BTreeMap;

use crate::types::Privilege;

/// Application-wide table of privileges by name, e.g. `READ_ORDERS`.
///
/// ```rust
/// use residual_authz::{Privilege, PrivilegeRegistry};
/// let registry = PrivilegeRegistry::builder()
///     .register("READ_ORDERS", Privilege::of("read", "orders"))
///     .register("CREATE_ORDERS", Privilege::of("create", "orders"))
///     .build();
/// assert_eq!(registry.get("READ_ORDERS"), Some(&Privilege::of("read", "orders")));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrivilegeRegistry {
    entries: BTreeMap<String, Privilege>,
}

impl PrivilegeRegistry {
    pub fn builder() -> PrivilegeRegistryBuilder {
        PrivilegeRegistryBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&Privilege> {
        self.entries.get(name)
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Privilege)> {
        self.entries.iter().map(|(name, privilege)| (name.as_str(), privilege))
    }

    /// Registered privileges, sorted and without duplicates.
    pub fn privileges(&self) -> Vec<Privilege> {
        let mut privileges: Vec<Privilege> = self.entries.values().cloned().collect();
        privileges.sort();
        privileges.dedup();
        privileges
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct PrivilegeRegistryBuilder {
    entries: BTreeMap<String, Privilege>,
}

impl PrivilegeRegistryBuilder {
    /// Registering a name twice keeps the later privilege.
    pub fn register(mut self, name: impl Into<String>, privilege: Privilege) -> Self {
        self.entries.insert(name.into(), privilege);
        self
    }

    pub fn build(self) -> PrivilegeRegistry {
        PrivilegeRegistry {
            entries: self.entries,
        }
    }
}
