//! Tri-state authorization decisions.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::Serialize;

use crate::error::AuthzError;
use crate::evaluator::evaluate;
use crate::traits::AttributeSource;
use crate::visitor::ConditionVisitor;

use super::{Attributes, Condition};

/// Outcome of a privilege check.
///
/// A `Conditional` decision always carries a non-constant condition: residuals
/// that fold to `true` or `false` become `Granted` or `Denied`. Decisions are
/// built by [`crate::Authorizations`] and can be shared freely.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Denied,
    Granted,
    #[non_exhaustive]
    Conditional { condition: Condition },
}

impl Decision {
    /// Classify a residual condition.
    pub(crate) fn from_residual(residual: Condition) -> Self {
        match residual.as_constant() {
            Some(true) => Decision::Granted,
            Some(false) => Decision::Denied,
            None => Decision::Conditional {
                condition: residual,
            },
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, Decision::Granted)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Decision::Denied)
    }

    pub fn is_conditional(&self) -> bool {
        matches!(self, Decision::Conditional { .. })
    }

    /// The residual condition of a `Conditional` decision.
    pub fn condition(&self) -> Result<&Condition, AuthzError> {
        match self {
            Decision::Conditional { condition } => Ok(condition),
            other => Err(AuthzError::NotConditional(format!(
                "decision is {other}"
            ))),
        }
    }

    /// Hand the decision to `visitor`. `Granted` and `Denied` are visited as
    /// the constants `true` and `false`.
    pub fn visit<V: ConditionVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Decision::Denied => visitor.visit_constant(false),
            Decision::Granted => visitor.visit_constant(true),
            Decision::Conditional { condition } => condition.accept(visitor),
        }
    }

    /// Whether an entity with `attributes` is permitted.
    pub fn permits(&self, attributes: &Attributes) -> Result<bool, AuthzError> {
        match self {
            Decision::Denied => Ok(false),
            Decision::Granted => Ok(true),
            Decision::Conditional { condition } => evaluate(condition, attributes),
        }
    }

    /// Keep the entities this decision permits, in their original order.
    ///
    /// Fails on the first entity whose evaluation fails; nothing is returned
    /// in that case.
    pub fn filter_entities<T, I>(&self, entities: I) -> Result<Vec<T>, AuthzError>
    where
        T: AttributeSource,
        I: IntoIterator<Item = T>,
    {
        let mut permitted = Vec::new();
        for entity in entities {
            if self.permits(&entity.attributes())? {
                permitted.push(entity);
            }
        }
        Ok(permitted)
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Decision::Denied => write!(f, "Denied"),
            Decision::Granted => write!(f, "Granted"),
            Decision::Conditional { condition } => write!(f, "Conditional({condition})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributeName;

    fn created_by() -> AttributeName {
        "order.createdBy".parse().unwrap()
    }

    struct Order {
        id: u32,
        created_by: &'static str,
    }

    impl AttributeSource for Order {
        fn attributes(&self) -> Attributes {
            Attributes::new().with(created_by(), self.created_by)
        }
    }

    struct KindCounter;

    impl ConditionVisitor for KindCounter {
        type Output = String;

        fn visit_comparison(
            &mut self,
            op: crate::types::ComparisonOp,
            attribute: &AttributeName,
            _value: &crate::types::AttributeValue,
        ) -> String {
            format!("{op} on {attribute}")
        }

        fn visit_and(&mut self, operands: &[Condition]) -> String {
            format!("and of {}", operands.len())
        }

        fn visit_or(&mut self, operands: &[Condition]) -> String {
            format!("or of {}", operands.len())
        }

        fn visit_not(&mut self, _operand: &Condition) -> String {
            "not".to_string()
        }

        fn visit_constant(&mut self, value: bool) -> String {
            value.to_string()
        }
    }

    #[test]
    fn test_from_residual_classification() {
        assert_eq!(Decision::from_residual(Condition::constant(true)), Decision::Granted);
        assert_eq!(Decision::from_residual(Condition::constant(false)), Decision::Denied);

        let residual = Condition::eq(created_by(), "bob");
        let decision = Decision::from_residual(residual.clone());
        assert!(decision.is_conditional());
        assert!(!decision.is_granted());
        assert!(!decision.is_denied());
        assert_eq!(decision.condition().unwrap(), &residual);
    }

    #[test]
    fn test_condition_on_unconditional_decision() {
        assert!(matches!(
            Decision::Granted.condition(),
            Err(AuthzError::NotConditional(_))
        ));
        assert!(matches!(
            Decision::Denied.condition(),
            Err(AuthzError::NotConditional(_))
        ));
    }

    #[test]
    fn test_visit() {
        let conditional = Decision::from_residual(Condition::eq(created_by(), "bob"));
        assert_eq!(conditional.visit(&mut KindCounter), "eq on order.createdBy");
        assert_eq!(Decision::Granted.visit(&mut KindCounter), "true");
        assert_eq!(Decision::Denied.visit(&mut KindCounter), "false");
    }

    #[test]
    fn test_filter_entities() {
        let orders = vec![
            Order { id: 1, created_by: "bob" },
            Order { id: 2, created_by: "carol" },
            Order { id: 3, created_by: "bob" },
        ];

        let decision = Decision::from_residual(Condition::eq(created_by(), "bob"));
        let ids: Vec<u32> = decision
            .filter_entities(orders)
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);

        let none = Decision::Denied
            .filter_entities(vec![Order { id: 4, created_by: "bob" }])
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_filter_entities_fails_on_missing_attribute() {
        let decision = Decision::from_residual(Condition::eq(created_by(), "bob"));
        let result = decision.filter_entities(vec![Attributes::new()]);
        assert!(matches!(result, Err(AuthzError::MissingAttribute(_))));
    }

    #[test]
    fn test_serialization() {
        let decision = Decision::from_residual(Condition::eq(created_by(), "bob"));
        insta::assert_json_snapshot!(decision, @r#"
        {
          "decision": "conditional",
          "condition": {
            "comparison": {
              "op": "eq",
              "attribute": "order.createdBy",
              "value": {
                "type": "String",
                "value": "bob"
              }
            }
          }
        }
        "#);
        assert_eq!(
            serde_json::to_value(Decision::Denied).unwrap(),
            serde_json::json!({"decision": "denied"})
        );
    }

    #[test]
    fn test_display() {
        let decision = Decision::from_residual(Condition::eq(created_by(), "bob"));
        assert_eq!(decision.to_string(), r#"Conditional(eq(order.createdBy, "bob"))"#);
        assert_eq!(Decision::Granted.to_string(), "Granted");
    }
}
