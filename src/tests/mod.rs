//! Cross-module tests: end-to-end scenarios, property tests and the
//! SQL push-down equivalence check.
//!
//! The generators below produce well-typed conditions over a small order
//! schema, so that evaluation against a complete binding never fails.

use proptest::prelude::*;

use crate::types::{AttributeName, AttributeValue, Attributes, ComparisonOp, Condition};
use crate::{AttributeSource, ColumnMapping};


pub(crate) const OWNERS: [&str; 3] = ["bob", "carol", "dave"];
pub(crate) const CATEGORIES: [&str; 2] = ["accessory", "book"];

pub(crate) fn name(raw: &str) -> AttributeName {
    raw.parse().unwrap()
}

pub(crate) fn created_by() -> AttributeName {
    name("order.createdBy")
}

pub(crate) fn category() -> AttributeName {
    name("product.category")
}

pub(crate) fn total() -> AttributeName {
    name("order.total")
}

pub(crate) fn archived() -> AttributeName {
    name("order.archived")
}

/// Column layout of the `orders` table used by the SQL tests.
pub(crate) fn order_columns() -> ColumnMapping {
    ColumnMapping::new()
        .with(created_by(), "createdBy")
        .and_then(|m| m.with(category(), "category"))
        .and_then(|m| m.with(total(), "total"))
        .and_then(|m| m.with(archived(), "archived"))
        .unwrap()
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Order {
    pub id: i64,
    pub created_by: String,
    pub category: String,
    pub total: f64,
    pub archived: bool,
}

impl AttributeSource for Order {
    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with(created_by(), self.created_by.as_str())
            .with(category(), self.category.as_str())
            .with(total(), self.total)
            .with(archived(), self.archived)
    }
}

impl Order {
    /// Only the attributes selected by `mask`, in the order
    /// createdBy, category, total, archived.
    pub(crate) fn known(&self, mask: [bool; 4]) -> Attributes {
        let all = self.attributes();
        [created_by(), category(), total(), archived()]
            .into_iter()
            .zip(mask)
            .filter(|(_, keep)| *keep)
            .filter_map(|(name, _)| all.get(&name).cloned().map(|value| (name, value)))
            .collect()
    }
}

pub(crate) fn arb_order() -> impl Strategy<Value = Order> {
    (
        prop::sample::select(OWNERS.to_vec()),
        prop::sample::select(CATEGORIES.to_vec()),
        0i32..200,
        any::<bool>(),
    )
        .prop_map(|(owner, category, total, archived)| Order {
            id: 0,
            created_by: owner.to_string(),
            category: category.to_string(),
            total: f64::from(total),
            archived,
        })
}

/// Orders with ids `1..=n`.
pub(crate) fn arb_orders() -> impl Strategy<Value = Vec<Order>> {
    prop::collection::vec(arb_order(), 0..12).prop_map(|orders| {
        orders
            .into_iter()
            .zip(1..)
            .map(|(order, id)| Order { id, ..order })
            .collect()
    })
}

fn arb_equality() -> impl Strategy<Value = ComparisonOp> {
    prop::sample::select(vec![ComparisonOp::Eq, ComparisonOp::Ne])
}

fn arb_op() -> impl Strategy<Value = ComparisonOp> {
    prop::sample::select(vec![
        ComparisonOp::Eq,
        ComparisonOp::Ne,
        ComparisonOp::Lt,
        ComparisonOp::Le,
        ComparisonOp::Gt,
        ComparisonOp::Ge,
    ])
}

fn arb_comparison() -> impl Strategy<Value = Condition> {
    prop_oneof![
        (arb_equality(), prop::sample::select(OWNERS.to_vec()))
            .prop_map(|(op, owner)| Condition::comparison(op, created_by(), owner)),
        (arb_equality(), prop::sample::select(CATEGORIES.to_vec()))
            .prop_map(|(op, value)| Condition::comparison(op, category(), value)),
        (arb_op(), 0i32..200).prop_map(|(op, limit)| Condition::comparison(
            op,
            total(),
            AttributeValue::Number(f64::from(limit))
        )),
        (arb_equality(), any::<bool>())
            .prop_map(|(op, flag)| Condition::comparison(op, archived(), flag)),
    ]
}

pub(crate) fn arb_condition() -> impl Strategy<Value = Condition> {
    let leaf = prop_oneof![
        9 => arb_comparison(),
        1 => any::<bool>().prop_map(Condition::constant),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(|ops| Condition::and(ops)),
            prop::collection::vec(inner.clone(), 0..4).prop_map(|ops| Condition::or(ops)),
            inner.prop_map(Condition::not),
        ]
    })
}

pub(crate) fn arb_mask() -> impl Strategy<Value = [bool; 4]> {
    any::<[bool; 4]>()
}
