//! Attribute values used as decision inputs and condition operands.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumDiscriminants};
use utoipa::ToSchema;

/// Largest integer magnitude a [`AttributeValue::Number`] holds exactly (2^53).
pub const MAX_EXACT_INTEGER: u64 = 1 << 53;

/// A typed attribute value.
///
/// `Unknown` marks an attribute whose value is deliberately left open at
/// check time, so the check yields a condition over it instead of an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, EnumDiscriminants)]
#[serde(tag = "type", content = "value")]
#[strum_discriminants(name(ValueKind), derive(StrumDisplay, Hash))]
pub enum AttributeValue {
    String(String),
    /// Integers are exact up to [`MAX_EXACT_INTEGER`] in magnitude. Policy
    /// literals beyond that are rejected rather than rounded.
    Number(f64),
    Bool(bool),
    Unknown,
}

impl AttributeValue {
    pub fn kind(&self) -> ValueKind {
        ValueKind::from(self)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, AttributeValue::Unknown)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AttributeValue::String(s) => write!(f, "{s:?}"),
            AttributeValue::Number(n) => write!(f, "{n}"),
            AttributeValue::Bool(b) => write!(f, "{b}"),
            AttributeValue::Unknown => write!(f, "unknown"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

/// Rounds integers beyond [`MAX_EXACT_INTEGER`] in magnitude.
impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Number(value as f64)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Number(f64::from(value))
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        string = { AttributeValue::from("bob"), r#""bob""# },
        quoted = { AttributeValue::from("say \"hi\""), r#""say \"hi\"""# },
        integer = { AttributeValue::from(100), "100" },
        fraction = { AttributeValue::from(12.5), "12.5" },
        boolean = { AttributeValue::from(true), "true" },
        unknown = { AttributeValue::Unknown, "unknown" },
    )]
    fn test_display(value: AttributeValue, expected: &str) {
        assert_eq!(value.to_string(), expected);
    }

    #[test]
    fn test_exact_integer_range() {
        let max = MAX_EXACT_INTEGER as i64;
        assert_ne!(AttributeValue::from(max - 1), AttributeValue::from(max));
        // Beyond the exact range neighbouring integers collapse.
        assert_eq!(AttributeValue::from(max + 1), AttributeValue::from(max));
    }

    #[test]
    fn test_kind() {
        assert_eq!(AttributeValue::from("x").kind(), ValueKind::String);
        assert_eq!(AttributeValue::from(1).kind(), ValueKind::Number);
        assert_eq!(AttributeValue::from(false).kind(), ValueKind::Bool);
        assert_eq!(AttributeValue::Unknown.kind(), ValueKind::Unknown);
        assert_eq!(ValueKind::Number.to_string(), "Number");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(AttributeValue::from("x").as_str(), Some("x"));
        assert_eq!(AttributeValue::from(3).as_number(), Some(3.0));
        assert_eq!(AttributeValue::from(true).as_bool(), Some(true));
        assert_eq!(AttributeValue::from(true).as_str(), None);
        assert!(AttributeValue::Unknown.is_unknown());
    }

    #[test]
    fn test_serialization_shape() {
        let json = serde_json::to_value(AttributeValue::from("bob")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "String", "value": "bob"}));

        let json = serde_json::to_value(AttributeValue::Unknown).unwrap();
        assert_eq!(json, serde_json::json!({"type": "Unknown"}));

        let back: AttributeValue =
            serde_json::from_value(serde_json::json!({"type": "Number", "value": 160})).unwrap();
        assert_eq!(back, AttributeValue::Number(160.0));
    }
}
