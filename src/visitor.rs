//! Traversal of condition trees.

use crate::types::{AttributeName, AttributeValue, ComparisonOp, Condition};

/// One method per node kind. Implementors recurse by calling
/// [`Condition::accept`] on the operands they want to visit, which leaves
/// evaluation order and short-circuiting up to the visitor.
pub trait ConditionVisitor {
    type Output;

    fn visit_comparison(
        &mut self,
        op: ComparisonOp,
        attribute: &AttributeName,
        value: &AttributeValue,
    ) -> Self::Output;

    fn visit_and(&mut self, operands: &[Condition]) -> Self::Output;

    fn visit_or(&mut self, operands: &[Condition]) -> Self::Output;

    fn visit_not(&mut self, operand: &Condition) -> Self::Output;

    fn visit_constant(&mut self, value: bool) -> Self::Output;
}
