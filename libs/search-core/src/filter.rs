use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// How the conditions of a [`FilterExpression`] are joined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Combinator {
    #[default]
    #[serde(rename = "AND", alias = "and", alias = "And")]
    And,
    #[serde(rename = "OR", alias = "or", alias = "Or")]
    Or,
}

/// Closed set of comparison operators a client may request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OperatorKind {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Contains,
    ContainsIgnoreCase,
    StartsWith,
    EndsWith,
}

impl OperatorKind {
    pub const ALL: [OperatorKind; 10] = [
        OperatorKind::Eq,
        OperatorKind::Ne,
        OperatorKind::Gt,
        OperatorKind::Ge,
        OperatorKind::Lt,
        OperatorKind::Le,
        OperatorKind::Contains,
        OperatorKind::ContainsIgnoreCase,
        OperatorKind::StartsWith,
        OperatorKind::EndsWith,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorKind::Eq => "eq",
            OperatorKind::Ne => "ne",
            OperatorKind::Gt => "gt",
            OperatorKind::Ge => "ge",
            OperatorKind::Lt => "lt",
            OperatorKind::Le => "le",
            OperatorKind::Contains => "contains",
            OperatorKind::ContainsIgnoreCase => "containsIgnoreCase",
            OperatorKind::StartsWith => "startsWith",
            OperatorKind::EndsWith => "endsWith",
        }
    }

    /// Operators that match against the column's text form.
    pub fn is_text_match(&self) -> bool {
        matches!(
            self,
            OperatorKind::Contains
                | OperatorKind::ContainsIgnoreCase
                | OperatorKind::StartsWith
                | OperatorKind::EndsWith
        )
    }
}

impl FromStr for OperatorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperatorKind::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnsupportedOperator(s.to_string()))
    }
}

impl TryFrom<String> for OperatorKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OperatorKind> for String {
    fn from(op: OperatorKind) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar operand of a condition. JSON `null` is represented by `None` at the
/// [`FilterCondition`] level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl FilterValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FilterValue::Bool(_) => "bool",
            FilterValue::Int(_) => "integer",
            FilterValue::Float(_) => "number",
            FilterValue::String(_) => "string",
        }
    }
}

/// Canonical string form, used when a condition compares text representations.
impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Bool(b) => write!(f, "{b}"),
            FilterValue::Int(i) => write!(f, "{i}"),
            FilterValue::Float(x) => write!(f, "{x}"),
            FilterValue::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::Bool(v)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Int(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        FilterValue::Int(v.into())
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        FilterValue::Float(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::String(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::String(v)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: String,
    pub operator: OperatorKind,
    #[serde(default)]
    pub value: Option<FilterValue>,
}

impl FilterCondition {
    pub fn new(
        field: impl Into<String>,
        operator: OperatorKind,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: Some(value.into()),
        }
    }

    /// A condition without an operand; it never restricts the result.
    pub fn without_value(field: impl Into<String>, operator: OperatorKind) -> Self {
        Self {
            field: field.into(),
            operator,
            value: None,
        }
    }
}

/// Conditions joined by one combinator. No conditions means no filtering.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterExpression {
    pub combinator: Combinator,
    #[serde(alias = "filter")]
    pub conditions: Vec<FilterCondition>,
}

impl FilterExpression {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all(conditions: impl IntoIterator<Item = FilterCondition>) -> Self {
        Self {
            combinator: Combinator::And,
            conditions: conditions.into_iter().collect(),
        }
    }

    pub fn any(conditions: impl IntoIterator<Item = FilterCondition>) -> Self {
        Self {
            combinator: Combinator::Or,
            conditions: conditions.into_iter().collect(),
        }
    }

    pub fn with(mut self, condition: FilterCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}
