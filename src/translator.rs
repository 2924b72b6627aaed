//! Lowering of residual conditions into parameterized SQL predicates.
//!
//! The output is a WHERE-clause fragment plus the literals to bind, in
//! placeholder order. Literals never appear in the template, and column
//! references are validated when the mapping is built, so nothing from a
//! condition or a mapping can alter the statement's structure.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AuthzError;
use crate::types::{AttributeName, AttributeValue, ComparisonOp, Condition};
use crate::visitor::ConditionVisitor;

static COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
        .expect("column pattern is valid")
});

/// Maps attribute names to storage column references such as `createdBy` or
/// `o.created_by`.
///
/// Deserializes from a JSON object keyed by dotted attribute names:
///
/// ```rust
/// use residual_authz::ColumnMapping;
/// let mapping: ColumnMapping = serde_json::from_str(
///     r#"{"order.createdBy": "createdBy", "order.total": "o.total"}"#,
/// ).unwrap();
/// assert_eq!(mapping.len(), 2);
/// assert!(serde_json::from_str::<ColumnMapping>(r#"{"order.total": "1; drop table"}"#).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    columns: BTreeMap<AttributeName, String>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping, replacing any earlier column for `attribute`.
    pub fn with(
        mut self,
        attribute: AttributeName,
        column: impl Into<String>,
    ) -> Result<Self, AuthzError> {
        let column = column.into();
        if !COLUMN.is_match(&column) {
            return Err(AuthzError::InvalidColumnReference(column));
        }
        self.columns.insert(attribute, column);
        Ok(self)
    }

    pub fn column(&self, attribute: &AttributeName) -> Option<&str> {
        self.columns.get(attribute).map(String::as_str)
    }

    /// Fail with [`AuthzError::UnmappableAttribute`] unless every attribute
    /// `condition` references has a column.
    pub fn covers(&self, condition: &Condition) -> Result<(), AuthzError> {
        match condition
            .attributes()
            .into_iter()
            .find(|name| !self.columns.contains_key(name))
        {
            Some(missing) => Err(AuthzError::UnmappableAttribute(missing.to_string())),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'de> Deserialize<'de> for ColumnMapping {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<AttributeName, String>::deserialize(de)?;
        raw.into_iter()
            .try_fold(ColumnMapping::new(), |mapping, (attribute, column)| {
                mapping.with(attribute, column)
            })
            .map_err(serde::de::Error::custom)
    }
}

/// How parameters are marked in the template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// `?`, as used by SQLite and MySQL
    #[default]
    Positional,
    /// `$1`, `$2`, ... as used by PostgreSQL
    Numbered,
}

/// A parameterized predicate. The n-th placeholder binds `parameters[n]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryFragment {
    pub template: String,
    pub parameters: Vec<AttributeValue>,
}

/// Translate `condition` with `?` placeholders.
///
/// ```rust
/// use residual_authz::{translate, ColumnMapping, Condition, AttributeValue};
/// let created_by = "order.createdBy".parse().unwrap();
/// let mapping = ColumnMapping::new().with("order.createdBy".parse().unwrap(), "createdBy").unwrap();
/// let fragment = translate(&Condition::eq(created_by, "bob"), &mapping).unwrap();
/// assert_eq!(fragment.template, "createdBy = ?");
/// assert_eq!(fragment.parameters, vec![AttributeValue::from("bob")]);
/// ```
pub fn translate(condition: &Condition, mapping: &ColumnMapping) -> Result<QueryFragment, AuthzError> {
    translate_with(condition, mapping, PlaceholderStyle::Positional)
}

pub fn translate_with(
    condition: &Condition,
    mapping: &ColumnMapping,
    style: PlaceholderStyle,
) -> Result<QueryFragment, AuthzError> {
    let mut translator = QueryTranslator::new(mapping).with_style(style);
    let template = condition.accept(&mut translator)?;
    Ok(translator.finish(template))
}

/// The translating visitor, for callers that go through
/// [`crate::Decision::visit`]:
///
/// ```rust
/// use residual_authz::{ColumnMapping, Decision, QueryTranslator};
/// let mapping = ColumnMapping::new();
/// let mut translator = QueryTranslator::new(&mapping);
/// let template = Decision::Granted.visit(&mut translator).unwrap();
/// assert_eq!(translator.finish(template).template, "1 = 1");
/// ```
pub struct QueryTranslator<'a> {
    mapping: &'a ColumnMapping,
    style: PlaceholderStyle,
    parameters: Vec<AttributeValue>,
}

impl<'a> QueryTranslator<'a> {
    pub fn new(mapping: &'a ColumnMapping) -> Self {
        Self {
            mapping,
            style: PlaceholderStyle::default(),
            parameters: Vec::new(),
        }
    }

    pub fn with_style(mut self, style: PlaceholderStyle) -> Self {
        self.style = style;
        self
    }

    /// Pair a template produced by this translator with its parameters.
    pub fn finish(self, template: String) -> QueryFragment {
        QueryFragment {
            template,
            parameters: self.parameters,
        }
    }

    fn join(&mut self, operands: &[Condition], keyword: &str) -> Result<String, AuthzError> {
        let mut out = String::from("(");
        for (i, operand) in operands.iter().enumerate() {
            if i > 0 {
                let _ = write!(out, " {keyword} ");
            }
            out.push_str(&operand.accept(self)?);
        }
        out.push(')');
        Ok(out)
    }
}

impl ConditionVisitor for QueryTranslator<'_> {
    type Output = Result<String, AuthzError>;

    fn visit_comparison(
        &mut self,
        op: ComparisonOp,
        attribute: &AttributeName,
        value: &AttributeValue,
    ) -> Self::Output {
        let column = self
            .mapping
            .column(attribute)
            .ok_or_else(|| AuthzError::UnmappableAttribute(attribute.to_string()))?;
        if value.is_unknown() {
            return Err(AuthzError::TypeMismatch(format!(
                "{attribute}: cannot bind an unknown literal"
            )));
        }
        self.parameters.push(value.clone());
        let placeholder = match self.style {
            PlaceholderStyle::Positional => "?".to_string(),
            PlaceholderStyle::Numbered => format!("${}", self.parameters.len()),
        };
        Ok(format!("{column} {} {placeholder}", op.symbol()))
    }

    fn visit_and(&mut self, operands: &[Condition]) -> Self::Output {
        self.join(operands, "AND")
    }

    fn visit_or(&mut self, operands: &[Condition]) -> Self::Output {
        self.join(operands, "OR")
    }

    fn visit_not(&mut self, operand: &Condition) -> Self::Output {
        Ok(format!("NOT ({})", operand.accept(self)?))
    }

    fn visit_constant(&mut self, value: bool) -> Self::Output {
        Ok(if value { "1 = 1" } else { "1 = 0" }.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use yare::parameterized;

    fn name(raw: &str) -> AttributeName {
        raw.parse().unwrap()
    }

    fn mapping() -> ColumnMapping {
        ColumnMapping::new()
            .with(name("order.createdBy"), "createdBy")
            .unwrap()
            .with(name("order.total"), "o.total")
            .unwrap()
            .with(name("product.category"), "p.category")
            .unwrap()
            .with(name("order.rush"), "rush")
            .unwrap()
    }

    #[test]
    fn test_single_comparison() {
        let fragment = translate(&Condition::eq(name("order.createdBy"), "bob"), &mapping()).unwrap();
        assert_eq!(fragment.template, "createdBy = ?");
        assert_eq!(fragment.parameters, vec![AttributeValue::from("bob")]);
    }

    #[test]
    fn test_nested_order() {
        let condition = Condition::or([
            Condition::and([
                Condition::eq(name("product.category"), "accessory"),
                Condition::le(name("order.total"), 100),
            ]),
            Condition::not(Condition::eq(name("order.rush"), true)),
            Condition::ne(name("order.createdBy"), "carol"),
        ]);
        let fragment = translate(&condition, &mapping()).unwrap();
        assert_snapshot!(fragment.template, @"((p.category = ? AND o.total <= ?) OR NOT (rush = ?) OR createdBy <> ?)");
        assert_eq!(
            fragment.parameters,
            vec![
                AttributeValue::from("accessory"),
                AttributeValue::from(100),
                AttributeValue::from(true),
                AttributeValue::from("carol"),
            ]
        );
    }

    #[test]
    fn test_numbered_placeholders() {
        let condition = Condition::and([
            Condition::gt(name("order.total"), 10),
            Condition::lt(name("order.total"), 20),
            Condition::eq(name("order.createdBy"), "bob"),
        ]);
        let fragment = translate_with(&condition, &mapping(), PlaceholderStyle::Numbered).unwrap();
        assert_eq!(fragment.template, "(o.total > $1 AND o.total < $2 AND createdBy = $3)");
        assert_eq!(fragment.parameters.len(), 3);
    }

    #[parameterized(
        granted = { true, "1 = 1" },
        denied = { false, "1 = 0" },
    )]
    fn test_constants(value: bool, expected: &str) {
        let fragment = translate(&Condition::constant(value), &mapping()).unwrap();
        assert_eq!(fragment.template, expected);
        assert!(fragment.parameters.is_empty());
    }

    #[test]
    fn test_unmappable_attribute_fails_whole_translation() {
        let condition = Condition::and([
            Condition::eq(name("order.createdBy"), "bob"),
            Condition::eq(name("order.status"), "open"),
        ]);
        let err = translate(&condition, &mapping()).unwrap_err();
        assert_eq!(err, AuthzError::UnmappableAttribute("order.status".to_string()));
    }

    #[test]
    fn test_unknown_literal_rejected() {
        let condition = Condition::eq(name("order.createdBy"), AttributeValue::Unknown);
        assert!(matches!(
            translate(&condition, &mapping()),
            Err(AuthzError::TypeMismatch(_))
        ));
    }

    #[parameterized(
        statement = { "createdBy; DROP TABLE orders" },
        spaces = { "created by" },
        quoted = { "\"createdBy\"" },
        three_parts = { "a.b.c" },
        empty = { "" },
    )]
    fn test_invalid_column_reference(column: &str) {
        let result = ColumnMapping::new().with(name("order.createdBy"), column);
        assert!(matches!(result, Err(AuthzError::InvalidColumnReference(_))));
    }

    #[test]
    fn test_covers() {
        let condition = Condition::and([
            Condition::eq(name("order.createdBy"), "bob"),
            Condition::eq(name("order.status"), "open"),
        ]);
        assert!(mapping().covers(&Condition::eq(name("order.total"), 1)).is_ok());
        assert_eq!(
            mapping().covers(&condition),
            Err(AuthzError::UnmappableAttribute("order.status".to_string()))
        );
    }

    #[test]
    fn test_mapping_from_json() {
        let mapping: ColumnMapping =
            serde_json::from_value(serde_json::json!({"order.createdBy": "createdBy"})).unwrap();
        assert_eq!(mapping.column(&name("order.createdBy")), Some("createdBy"));

        let bad = serde_json::from_value::<ColumnMapping>(serde_json::json!({"order..x": "x"}));
        assert!(bad.is_err());
    }

    #[test]
    fn test_placeholder_style_serde() {
        let style: PlaceholderStyle = serde_json::from_str("\"numbered\"").unwrap();
        assert_eq!(style, PlaceholderStyle::Numbered);
        assert_eq!(PlaceholderStyle::default(), PlaceholderStyle::Positional);
    }
}
