//! Lowering of Cedar policy conditions into [`Condition`] trees.
//!
//! Works on the JSON form of a policy (`Policy::to_json`). The supported
//! subset is the one the condition algebra can express:
//!
//! - literals: strings, longs, booleans;
//! - `context.a.b`, which becomes the attribute `a.b`;
//! - `principal.x`, resolved from the principal's attributes;
//! - `==`, `!=`, `<`, `<=`, `>`, `>=` between an attribute and a literal, in
//!   either order;
//! - `&&`, `||`, `!`, and boolean attributes used as conditions.
//!
//! Anything else fails with [`AuthzError::UnsupportedExpression`].

use cedar_policy::Policy;
use serde_json::{Map, Value};

use crate::error::AuthzError;
use crate::types::{
    AttributeName, AttributeValue, ComparisonOp, Condition, MAX_EXACT_INTEGER, Principal,
};

/// The condition a policy imposes once its scope matched: the conjunction of
/// its `when` bodies and the negations of its `unless` bodies.
pub(crate) fn policy_condition(
    policy: &Policy,
    principal: &Principal,
) -> Result<Condition, AuthzError> {
    let json = policy
        .to_json()
        .map_err(|e| AuthzError::UnsupportedExpression(e.to_string()))?;
    let clauses = json
        .get("conditions")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut lowered = Vec::with_capacity(clauses.len());
    for clause in clauses {
        let body = clause
            .get("body")
            .ok_or_else(|| unsupported("condition without body", clause))?;
        let condition = boolean(body, principal)?;
        match clause.get("kind").and_then(Value::as_str) {
            Some("when") => lowered.push(condition),
            Some("unless") => lowered.push(Condition::not(condition)),
            _ => return Err(unsupported("condition kind", clause)),
        }
    }
    Ok(Condition::and(lowered))
}

enum Operand {
    Literal(AttributeValue),
    Attribute(AttributeName),
}

fn unsupported(what: &str, expr: &Value) -> AuthzError {
    AuthzError::UnsupportedExpression(format!("{what}: {expr}"))
}

// Every EST expression node is an object with exactly one key.
fn node(expr: &Value) -> Result<(&str, &Value), AuthzError> {
    match expr.as_object().map(Map::iter).and_then(|mut it| {
        let first = it.next();
        it.next().is_none().then_some(first).flatten()
    }) {
        Some((key, body)) => Ok((key.as_str(), body)),
        None => Err(unsupported("expression", expr)),
    }
}

fn field<'a>(body: &'a Value, name: &str, expr: &Value) -> Result<&'a Value, AuthzError> {
    body.get(name).ok_or_else(|| unsupported("malformed expression", expr))
}

fn boolean(expr: &Value, principal: &Principal) -> Result<Condition, AuthzError> {
    let (key, body) = node(expr)?;
    match key {
        "&&" => Ok(Condition::and([
            boolean(field(body, "left", expr)?, principal)?,
            boolean(field(body, "right", expr)?, principal)?,
        ])),
        "||" => Ok(Condition::or([
            boolean(field(body, "left", expr)?, principal)?,
            boolean(field(body, "right", expr)?, principal)?,
        ])),
        "!" => Ok(Condition::not(boolean(field(body, "arg", expr)?, principal)?)),
        "==" | "!=" | "<" | "<=" | ">" | ">=" => {
            let op = match key {
                "==" => ComparisonOp::Eq,
                "!=" => ComparisonOp::Ne,
                "<" => ComparisonOp::Lt,
                "<=" => ComparisonOp::Le,
                ">" => ComparisonOp::Gt,
                _ => ComparisonOp::Ge,
            };
            comparison(
                op,
                operand(field(body, "left", expr)?, principal)?,
                operand(field(body, "right", expr)?, principal)?,
            )
        }
        _ => match operand(expr, principal)? {
            Operand::Literal(AttributeValue::Bool(value)) => Ok(Condition::constant(value)),
            Operand::Literal(other) => Err(AuthzError::TypeMismatch(format!(
                "{} used as a condition",
                other.kind()
            ))),
            Operand::Attribute(name) => Ok(Condition::eq(name, true)),
        },
    }
}

fn comparison(op: ComparisonOp, left: Operand, right: Operand) -> Result<Condition, AuthzError> {
    match (left, right) {
        (Operand::Attribute(name), Operand::Literal(value)) => {
            Ok(Condition::comparison(op, name, value))
        }
        (Operand::Literal(value), Operand::Attribute(name)) => {
            Ok(Condition::comparison(op.flip(), name, value))
        }
        (Operand::Literal(lhs), Operand::Literal(rhs)) => literal_comparison(op, &lhs, &rhs),
        (Operand::Attribute(lhs), Operand::Attribute(rhs)) => Err(AuthzError::UnsupportedExpression(
            format!("comparison between attributes {lhs} and {rhs}"),
        )),
    }
}

// Cedar equality across types is false, not an error. Ordering across types
// still errors.
fn literal_comparison(
    op: ComparisonOp,
    lhs: &AttributeValue,
    rhs: &AttributeValue,
) -> Result<Condition, AuthzError> {
    if !op.is_ordering() && lhs.kind() != rhs.kind() {
        return Ok(Condition::constant(op == ComparisonOp::Ne));
    }
    op.apply(lhs, rhs).map(Condition::constant)
}

fn operand(expr: &Value, principal: &Principal) -> Result<Operand, AuthzError> {
    let (key, body) = node(expr)?;
    match key {
        "Value" => literal(body)
            .map(Operand::Literal)
            .ok_or_else(|| unsupported("literal", expr)),
        "neg" => match operand(field(body, "arg", expr)?, principal)? {
            Operand::Literal(AttributeValue::Number(n)) => {
                Ok(Operand::Literal(AttributeValue::Number(-n)))
            }
            _ => Err(unsupported("negation", expr)),
        },
        "." => {
            let (root, segments) = path(expr)?;
            match root {
                "context" => Ok(Operand::Attribute(AttributeName::of(segments)?)),
                "principal" => {
                    let name = AttributeName::of(segments)?;
                    principal
                        .attribute(&name)
                        .map(Operand::Literal)
                        .ok_or_else(|| {
                            AuthzError::MissingPrincipalAttribute(format!(
                                "{principal} has no attribute {name}"
                            ))
                        })
                }
                _ => Err(unsupported("attribute access", expr)),
            }
        }
        _ => Err(unsupported("operator", expr)),
    }
}

/// Split `root.a.b` into `("root", ["a", "b"])`.
fn path(expr: &Value) -> Result<(&str, Vec<String>), AuthzError> {
    let mut segments = Vec::new();
    let mut current = expr;
    loop {
        let (key, body) = node(current)?;
        match key {
            "." => {
                let attr = field(body, "attr", current)?
                    .as_str()
                    .ok_or_else(|| unsupported("attribute name", current))?;
                segments.push(attr.to_string());
                current = field(body, "left", current)?;
            }
            "Var" => {
                let root = body.as_str().ok_or_else(|| unsupported("variable", current))?;
                segments.reverse();
                return Ok((root, segments));
            }
            _ => return Err(unsupported("attribute access", current)),
        }
    }
}

fn literal(value: &Value) -> Option<AttributeValue> {
    match value {
        Value::String(s) => Some(AttributeValue::String(s.clone())),
        Value::Bool(b) => Some(AttributeValue::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) if i.unsigned_abs() > MAX_EXACT_INTEGER => None,
            _ => n.as_f64().map(AttributeValue::Number),
        },
        _ => None,
    }
}
