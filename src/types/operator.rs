use std::fmt;

use serde::{Deserialize, Serialize};

/// Operators a rule can apply to its field.
///
/// Which operators are valid depends on the rule's [`DataKind`]; the evaluator
/// rejects any other combination with
/// [`EvalError::UnsupportedOperator`](super::EvalError::UnsupportedOperator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Is,
    Equals,
    NotEquals,
    Contains,
    BeginsWith,
    EndsWith,
    Exists,
    NotExists,
    In,
    NotIn,
    Greater,
    GreaterOrEquals,
    Lower,
    LowerOrEquals,
    Between,
    IsPartOf,
    IsNotPartOf,
}

/// The data kind a rule node declares. Doubles as the `dataKind` wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataKind {
    String,
    Boolean,
    Enum,
    Number,
    Combinator,
    FilterUuid,
    #[serde(alias = "SUBSTATION_PROPERTIES")]
    Properties,
}

/// Aggregation applied by a combinator node over its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Combinator {
    And,
    Or,
}

impl Operator {
    /// Operators accepted for a given data kind.
    #[must_use]
    pub fn supported_by(kind: DataKind) -> &'static [Operator] {
        use Operator::*;
        match kind {
            DataKind::String | DataKind::Enum => &[
                Is, Equals, NotEquals, Contains, BeginsWith, EndsWith, Exists, NotExists, In,
                NotIn,
            ],
            DataKind::Boolean => &[Equals, NotEquals, Exists, NotExists],
            DataKind::Number => &[
                Equals,
                NotEquals,
                Greater,
                GreaterOrEquals,
                Lower,
                LowerOrEquals,
                Between,
                Exists,
                NotExists,
                In,
                NotIn,
            ],
            DataKind::Properties => &[In, NotIn],
            DataKind::FilterUuid => &[IsPartOf, IsNotPartOf],
            DataKind::Combinator => &[],
        }
    }

    /// Whether this operator is defined for `kind`.
    #[must_use]
    pub fn is_supported_by(self, kind: DataKind) -> bool {
        Self::supported_by(kind).contains(&self)
    }

    /// The wire name, e.g. `GREATER_OR_EQUALS`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Is => "IS",
            Operator::Equals => "EQUALS",
            Operator::NotEquals => "NOT_EQUALS",
            Operator::Contains => "CONTAINS",
            Operator::BeginsWith => "BEGINS_WITH",
            Operator::EndsWith => "ENDS_WITH",
            Operator::Exists => "EXISTS",
            Operator::NotExists => "NOT_EXISTS",
            Operator::In => "IN",
            Operator::NotIn => "NOT_IN",
            Operator::Greater => "GREATER",
            Operator::GreaterOrEquals => "GREATER_OR_EQUALS",
            Operator::Lower => "LOWER",
            Operator::LowerOrEquals => "LOWER_OR_EQUALS",
            Operator::Between => "BETWEEN",
            Operator::IsPartOf => "IS_PART_OF",
            Operator::IsNotPartOf => "IS_NOT_PART_OF",
        }
    }
}

impl DataKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DataKind::String => "STRING",
            DataKind::Boolean => "BOOLEAN",
            DataKind::Enum => "ENUM",
            DataKind::Number => "NUMBER",
            DataKind::Combinator => "COMBINATOR",
            DataKind::FilterUuid => "FILTER_UUID",
            DataKind::Properties => "PROPERTIES",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::And => write!(f, "AND"),
            Combinator::Or => write!(f, "OR"),
        }
    }
}
