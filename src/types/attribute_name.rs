//! Namespaced attribute names such as `order.createdBy`.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::sync::Arc;

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AuthzError;

static SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$?[A-Za-z_][A-Za-z0-9_]*$").expect("segment pattern is valid"));

/// An ordered, non-empty list of name segments.
///
/// Names compare and hash by their segments, so two names built from the same
/// segments are interchangeable. Cloning shares the segment storage.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttributeName {
    segments: Arc<[String]>,
}

impl AttributeName {
    /// Build a name from its segments.
    ///
    /// Fails with [`AuthzError::InvalidAttributeName`] if `segments` is empty or
    /// any segment is not an identifier.
    ///
    /// ```rust
    /// use residual_authz::AttributeName;
    /// let name = AttributeName::of(["order", "createdBy"]).unwrap();
    /// assert_eq!(name.to_string(), "order.createdBy");
    /// assert!(AttributeName::of(Vec::<String>::new()).is_err());
    /// ```
    pub fn of<I, S>(segments: I) -> Result<Self, AuthzError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(AuthzError::InvalidAttributeName(
                "attribute name needs at least one segment".to_string(),
            ));
        }
        if let Some(bad) = segments.iter().find(|s| !SEGMENT.is_match(s)) {
            return Err(AuthzError::InvalidAttributeName(format!(
                "invalid segment '{bad}' in '{}'",
                segments.join(".")
            )));
        }
        Ok(Self {
            segments: segments.into(),
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// A new name with `segment` appended.
    pub fn child(&self, segment: impl Into<String>) -> Result<Self, AuthzError> {
        Self::of(self.segments.iter().cloned().chain([segment.into()]))
    }
}

impl Display for AttributeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.segments.iter().join("."))
    }
}

impl FromStr for AttributeName {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(AuthzError::InvalidAttributeName(
                "attribute name cannot be empty".to_string(),
            ));
        }
        Self::of(s.split('.'))
    }
}

impl Serialize for AttributeName {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AttributeName {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(de)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
