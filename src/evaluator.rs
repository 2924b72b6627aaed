//! Evaluation of conditions against attribute bindings.
//!
//! [`evaluate`] is the strict per-entity path: every referenced attribute
//! must be bound to a concrete value. [`partially_evaluate`] folds what is
//! known and keeps comparisons over absent or `Unknown` attributes; the
//! authorization facade uses it to turn a policy's raw condition into the
//! residual carried by a decision.
//!
//! Both walk operands left to right and stop at the first operand that
//! decides an `and` or `or`, so operands after it are never looked at.

use crate::error::AuthzError;
use crate::types::{AttributeName, AttributeValue, Attributes, ComparisonOp, Condition};
use crate::visitor::ConditionVisitor;

/// Evaluate `condition` with every attribute supplied by `attributes`.
///
/// Fails with [`AuthzError::MissingAttribute`] when a reached comparison
/// names an attribute that is absent or `Unknown`, and with
/// [`AuthzError::TypeMismatch`] when its operands cannot be compared.
///
/// ```rust
/// use residual_authz::{evaluate, Attributes, Condition};
/// let created_by = "order.createdBy".parse().unwrap();
/// let condition = Condition::eq(created_by, "bob");
/// let attrs = Attributes::new().with("order.createdBy".parse().unwrap(), "bob");
/// assert!(evaluate(&condition, &attrs).unwrap());
/// assert!(evaluate(&condition, &Attributes::new()).is_err());
/// ```
pub fn evaluate(condition: &Condition, attributes: &Attributes) -> Result<bool, AuthzError> {
    condition.accept(&mut StrictEvaluator { attributes })
}

/// Fold the known attributes of `attributes` into `condition`.
///
/// The result is constant when the known attributes decide the condition,
/// and otherwise only references attributes that are absent or `Unknown`.
pub fn partially_evaluate(
    condition: &Condition,
    attributes: &Attributes,
) -> Result<Condition, AuthzError> {
    condition.accept(&mut PartialEvaluator { attributes })
}

struct StrictEvaluator<'a> {
    attributes: &'a Attributes,
}

impl ConditionVisitor for StrictEvaluator<'_> {
    type Output = Result<bool, AuthzError>;

    fn visit_comparison(
        &mut self,
        op: ComparisonOp,
        attribute: &AttributeName,
        value: &AttributeValue,
    ) -> Self::Output {
        match self.attributes.get(attribute) {
            None | Some(AttributeValue::Unknown) => {
                Err(AuthzError::MissingAttribute(attribute.to_string()))
            }
            Some(bound) => op.apply(bound, value).map_err(|e| in_context(e, attribute)),
        }
    }

    fn visit_and(&mut self, operands: &[Condition]) -> Self::Output {
        for operand in operands {
            if !operand.accept(self)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn visit_or(&mut self, operands: &[Condition]) -> Self::Output {
        for operand in operands {
            if operand.accept(self)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn visit_not(&mut self, operand: &Condition) -> Self::Output {
        Ok(!operand.accept(self)?)
    }

    fn visit_constant(&mut self, value: bool) -> Self::Output {
        Ok(value)
    }
}

struct PartialEvaluator<'a> {
    attributes: &'a Attributes,
}

impl PartialEvaluator<'_> {
    // `absorbing` decides the combinator outright: false for and, true for or.
    fn fold(
        &mut self,
        operands: &[Condition],
        absorbing: bool,
    ) -> Result<Condition, AuthzError> {
        let mut residual = Vec::with_capacity(operands.len());
        for operand in operands {
            let folded = operand.accept(self)?;
            if folded.as_constant() == Some(absorbing) {
                return Ok(folded);
            }
            residual.push(folded);
        }
        Ok(if absorbing {
            Condition::or(residual)
        } else {
            Condition::and(residual)
        })
    }
}

impl ConditionVisitor for PartialEvaluator<'_> {
    type Output = Result<Condition, AuthzError>;

    fn visit_comparison(
        &mut self,
        op: ComparisonOp,
        attribute: &AttributeName,
        value: &AttributeValue,
    ) -> Self::Output {
        match self.attributes.get(attribute) {
            None | Some(AttributeValue::Unknown) => {
                Ok(Condition::comparison(op, attribute.clone(), value.clone()))
            }
            Some(bound) => op
                .apply(bound, value)
                .map(Condition::constant)
                .map_err(|e| in_context(e, attribute)),
        }
    }

    fn visit_and(&mut self, operands: &[Condition]) -> Self::Output {
        self.fold(operands, false)
    }

    fn visit_or(&mut self, operands: &[Condition]) -> Self::Output {
        self.fold(operands, true)
    }

    fn visit_not(&mut self, operand: &Condition) -> Self::Output {
        Ok(Condition::not(operand.accept(self)?))
    }

    fn visit_constant(&mut self, value: bool) -> Self::Output {
        Ok(Condition::constant(value))
    }
}

fn in_context(err: AuthzError, attribute: &AttributeName) -> AuthzError {
    match err {
        AuthzError::TypeMismatch(msg) => AuthzError::TypeMismatch(format!("{attribute}: {msg}")),
        other => other,
    }
}
