//! The residual condition algebra.
//!
//! A [`Condition`] is an immutable tree of literal comparisons joined by
//! `and`, `or` and `not`. The constructors normalize as they build:
//!
//! - `and()` of nothing is `true`, `or()` of nothing is `false`;
//! - constants fold (`and(false, x)` is `false`, `or(true, x)` is `true`,
//!   neutral constants are dropped);
//! - nested combinators of the same kind flatten, so `and(and(a, b), c)` is
//!   `and(a, b, c)`;
//! - a combinator with one remaining operand collapses to that operand;
//! - `not(not(x))` is `x` and `not` of a constant is the opposite constant.
//!
//! Outside this crate the tree is read through [`ConditionVisitor`] only.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display as StrumDisplay, EnumString};

use crate::error::AuthzError;
use crate::visitor::ConditionVisitor;

use super::{AttributeName, AttributeValue};

/// Comparison operator of a literal comparison.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    StrumDisplay,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparisonOp {
    /// The SQL operator.
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "<>",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
        }
    }

    /// The operator with its operands swapped: `5 < x` is `x > 5`.
    pub fn flip(self) -> Self {
        match self {
            ComparisonOp::Eq => ComparisonOp::Eq,
            ComparisonOp::Ne => ComparisonOp::Ne,
            ComparisonOp::Lt => ComparisonOp::Gt,
            ComparisonOp::Le => ComparisonOp::Ge,
            ComparisonOp::Gt => ComparisonOp::Lt,
            ComparisonOp::Ge => ComparisonOp::Le,
        }
    }

    pub fn is_ordering(self) -> bool {
        !matches!(self, ComparisonOp::Eq | ComparisonOp::Ne)
    }

    /// Apply the operator to two concrete values.
    ///
    /// Ordering needs two numbers. Equality needs two values of the same
    /// kind; nothing is coerced. An `Unknown` operand is a type mismatch.
    pub fn apply(self, lhs: &AttributeValue, rhs: &AttributeValue) -> Result<bool, AuthzError> {
        use AttributeValue as V;

        let mismatch = || {
            AuthzError::TypeMismatch(format!(
                "cannot apply {self} to {} and {}",
                lhs.kind(),
                rhs.kind()
            ))
        };

        match (lhs, rhs) {
            (V::Unknown, _) | (_, V::Unknown) => Err(mismatch()),
            (V::Number(a), V::Number(b)) => {
                let ordering = a.partial_cmp(b);
                Ok(match self {
                    ComparisonOp::Eq => ordering == Some(Ordering::Equal),
                    ComparisonOp::Ne => ordering != Some(Ordering::Equal),
                    ComparisonOp::Lt => ordering == Some(Ordering::Less),
                    ComparisonOp::Le => {
                        matches!(ordering, Some(Ordering::Less | Ordering::Equal))
                    }
                    ComparisonOp::Gt => ordering == Some(Ordering::Greater),
                    ComparisonOp::Ge => {
                        matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
                    }
                })
            }
            _ if self.is_ordering() => Err(mismatch()),
            (V::String(a), V::String(b)) => Ok((a == b) == (self == ComparisonOp::Eq)),
            (V::Bool(a), V::Bool(b)) => Ok((a == b) == (self == ComparisonOp::Eq)),
            _ => Err(mismatch()),
        }
    }
}

/// Node kind tag, for callers that only need to know what a node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay)]
#[strum(serialize_all = "snake_case")]
pub enum ConditionKind {
    Comparison,
    And,
    Or,
    Not,
    Constant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Node {
    Comparison {
        op: ComparisonOp,
        attribute: AttributeName,
        value: AttributeValue,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Condition),
    Constant(bool),
}

/// An immutable condition tree. Cloning is cheap and shares the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Condition(Arc<Node>);

impl Condition {
    fn from_node(node: Node) -> Self {
        Condition(Arc::new(node))
    }

    pub fn constant(value: bool) -> Self {
        Self::from_node(Node::Constant(value))
    }

    pub fn comparison(
        op: ComparisonOp,
        attribute: AttributeName,
        value: impl Into<AttributeValue>,
    ) -> Self {
        Self::from_node(Node::Comparison {
            op,
            attribute,
            value: value.into(),
        })
    }

    pub fn eq(attribute: AttributeName, value: impl Into<AttributeValue>) -> Self {
        Self::comparison(ComparisonOp::Eq, attribute, value)
    }

    pub fn ne(attribute: AttributeName, value: impl Into<AttributeValue>) -> Self {
        Self::comparison(ComparisonOp::Ne, attribute, value)
    }

    pub fn lt(attribute: AttributeName, value: impl Into<AttributeValue>) -> Self {
        Self::comparison(ComparisonOp::Lt, attribute, value)
    }

    pub fn le(attribute: AttributeName, value: impl Into<AttributeValue>) -> Self {
        Self::comparison(ComparisonOp::Le, attribute, value)
    }

    pub fn gt(attribute: AttributeName, value: impl Into<AttributeValue>) -> Self {
        Self::comparison(ComparisonOp::Gt, attribute, value)
    }

    pub fn ge(attribute: AttributeName, value: impl Into<AttributeValue>) -> Self {
        Self::comparison(ComparisonOp::Ge, attribute, value)
    }

    /// Conjunction of `operands`, normalized.
    pub fn and(operands: impl IntoIterator<Item = Condition>) -> Self {
        Self::combine(operands, true)
    }

    /// Disjunction of `operands`, normalized.
    pub fn or(operands: impl IntoIterator<Item = Condition>) -> Self {
        Self::combine(operands, false)
    }

    pub fn not(operand: Condition) -> Self {
        match operand.0.as_ref() {
            Node::Constant(value) => Self::constant(!value),
            Node::Not(inner) => inner.clone(),
            _ => Self::from_node(Node::Not(operand)),
        }
    }

    // `neutral` is the identity of the combinator: true for and, false for or.
    fn combine(operands: impl IntoIterator<Item = Condition>, neutral: bool) -> Self {
        let mut flat = Vec::new();
        for operand in operands {
            match operand.0.as_ref() {
                Node::Constant(value) if *value == neutral => {}
                Node::Constant(_) => return Self::constant(!neutral),
                Node::And(children) if neutral => flat.extend(children.iter().cloned()),
                Node::Or(children) if !neutral => flat.extend(children.iter().cloned()),
                _ => flat.push(operand),
            }
        }

        match flat.len() {
            0 => Self::constant(neutral),
            1 => flat.remove(0),
            _ if neutral => Self::from_node(Node::And(flat)),
            _ => Self::from_node(Node::Or(flat)),
        }
    }

    pub fn kind(&self) -> ConditionKind {
        match self.0.as_ref() {
            Node::Comparison { .. } => ConditionKind::Comparison,
            Node::And(_) => ConditionKind::And,
            Node::Or(_) => ConditionKind::Or,
            Node::Not(_) => ConditionKind::Not,
            Node::Constant(_) => ConditionKind::Constant,
        }
    }

    /// Direct operands, in order. Empty for comparisons and constants.
    pub fn children(&self) -> &[Condition] {
        match self.0.as_ref() {
            Node::And(children) | Node::Or(children) => children,
            Node::Not(child) => std::slice::from_ref(child),
            Node::Comparison { .. } | Node::Constant(_) => &[],
        }
    }

    pub fn as_constant(&self) -> Option<bool> {
        match self.0.as_ref() {
            Node::Constant(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.as_constant().is_some()
    }

    /// Every attribute referenced anywhere in the tree.
    pub fn attributes(&self) -> BTreeSet<AttributeName> {
        let mut names = BTreeSet::new();
        self.collect_attributes(&mut names);
        names
    }

    fn collect_attributes(&self, names: &mut BTreeSet<AttributeName>) {
        if let Node::Comparison { attribute, .. } = self.0.as_ref() {
            names.insert(attribute.clone());
        }
        for child in self.children() {
            child.collect_attributes(names);
        }
    }

    /// Dispatch this node to `visitor`.
    pub fn accept<V: ConditionVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self.0.as_ref() {
            Node::Comparison {
                op,
                attribute,
                value,
            } => visitor.visit_comparison(*op, attribute, value),
            Node::And(operands) => visitor.visit_and(operands),
            Node::Or(operands) => visitor.visit_or(operands),
            Node::Not(operand) => visitor.visit_not(operand),
            Node::Constant(value) => visitor.visit_constant(*value),
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.0.as_ref() {
            Node::Comparison {
                op,
                attribute,
                value,
            } => write!(f, "{op}({attribute}, {value})"),
            Node::And(operands) => write!(f, "and({})", operands.iter().join(", ")),
            Node::Or(operands) => write!(f, "or({})", operands.iter().join(", ")),
            Node::Not(operand) => write!(f, "not({operand})"),
            Node::Constant(value) => write!(f, "{value}"),
        }
    }
}
