use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::filter::FilterId;
use super::operator::{Combinator, DataKind, Operator};

/// Name of an equipment attribute, resolved by a
/// [`FieldResolver`](crate::FieldResolver). For example `ID`, `NOMINAL_VOLTAGE`,
/// `FREE_PROPERTIES`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Field(String);

impl Field {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Field {
    fn from(v: &str) -> Self {
        Self(v.to_owned())
    }
}

impl From<String> for Field {
    fn from(v: String) -> Self {
        Self(v)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One node of an expert filter's predicate tree.
///
/// Trees are built once, by the builder functions ([`string`](crate::string),
/// [`number`](crate::number), [`and`](crate::and), ...) or by converting the
/// wire representation, and are never mutated by evaluation. Leaf variants
/// keep the operand slots their kind may use; which slot an operator reads is
/// decided by the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// AND/OR aggregation over ordered children.
    Combinator {
        combinator: Combinator,
        rules: Vec<Rule>,
    },
    /// Case-insensitive text comparison.
    String {
        field: Field,
        operator: Operator,
        value: Option<String>,
        values: BTreeSet<String>,
    },
    /// Enum constant comparison: text semantics, exact match for
    /// `EQUALS`/`NOT_EQUALS`/`IN`/`NOT_IN`.
    Enum {
        field: Field,
        operator: Operator,
        value: Option<String>,
        values: BTreeSet<String>,
    },
    Number {
        field: Field,
        operator: Operator,
        value: Option<f64>,
        values: Vec<f64>,
    },
    Boolean {
        field: Field,
        operator: Operator,
        value: Option<bool>,
    },
    /// Membership of a named, entity-held property value.
    Properties {
        field: Field,
        operator: Operator,
        property_name: String,
        property_values: Vec<String>,
    },
    /// Membership of the entity in the match set of other stored filters.
    FilterReference {
        field: Field,
        operator: Operator,
        filter_ids: BTreeSet<FilterId>,
    },
}

impl Rule {
    #[must_use]
    pub fn data_kind(&self) -> DataKind {
        match self {
            Rule::Combinator { .. } => DataKind::Combinator,
            Rule::String { .. } => DataKind::String,
            Rule::Enum { .. } => DataKind::Enum,
            Rule::Number { .. } => DataKind::Number,
            Rule::Boolean { .. } => DataKind::Boolean,
            Rule::Properties { .. } => DataKind::Properties,
            Rule::FilterReference { .. } => DataKind::FilterUuid,
        }
    }

    /// The leaf operator, `None` for combinators.
    #[must_use]
    pub fn operator(&self) -> Option<Operator> {
        match self {
            Rule::Combinator { .. } => None,
            Rule::String { operator, .. }
            | Rule::Enum { operator, .. }
            | Rule::Number { operator, .. }
            | Rule::Boolean { operator, .. }
            | Rule::Properties { operator, .. }
            | Rule::FilterReference { operator, .. } => Some(*operator),
        }
    }

    /// The leaf field, `None` for combinators.
    #[must_use]
    pub fn field(&self) -> Option<&Field> {
        match self {
            Rule::Combinator { .. } => None,
            Rule::String { field, .. }
            | Rule::Enum { field, .. }
            | Rule::Number { field, .. }
            | Rule::Boolean { field, .. }
            | Rule::Properties { field, .. }
            | Rule::FilterReference { field, .. } => Some(field),
        }
    }

    /// Canonical text form of the rule's operand, for display and audit.
    ///
    /// Set-valued operands are rendered comma-separated. Combinators render
    /// their aggregation name.
    #[must_use]
    pub fn string_value(&self) -> String {
        match self {
            Rule::Combinator { combinator, .. } => combinator.to_string(),
            Rule::String { value, values, .. } | Rule::Enum { value, values, .. } => {
                match value {
                    Some(v) => v.clone(),
                    None => join(values.iter()),
                }
            }
            Rule::Number { value, values, .. } => match value {
                Some(v) => v.to_string(),
                None => join(values.iter()),
            },
            Rule::Boolean { value, .. } => value.map(|v| v.to_string()).unwrap_or_default(),
            Rule::Properties {
                property_values, ..
            } => join(property_values.iter()),
            Rule::FilterReference { filter_ids, .. } => join(filter_ids.iter()),
        }
    }

    /// Number of nodes in this tree, combinators included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        match self {
            Rule::Combinator { rules, .. } => 1 + rules.iter().map(Rule::node_count).sum::<usize>(),
            _ => 1,
        }
    }

    pub(crate) fn collect_filter_refs(&self, out: &mut Vec<FilterId>) {
        match self {
            Rule::Combinator { rules, .. } => {
                for rule in rules {
                    rule.collect_filter_refs(out);
                }
            }
            Rule::FilterReference { filter_ids, .. } => out.extend(filter_ids.iter().copied()),
            _ => {}
        }
    }
}

fn join<T: fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|v| v.to_string()).collect::<Vec<_>>().join(",")
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Combinator { combinator, rules } => {
                if rules.is_empty() {
                    return write!(f, "({combinator})");
                }
                write!(f, "(")?;
                for (i, rule) in rules.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {combinator} ")?;
                    }
                    write!(f, "{rule}")?;
                }
                write!(f, ")")
            }
            Rule::Properties {
                field,
                operator,
                property_name,
                ..
            } => write!(f, "{field}[{property_name}] {operator} [{}]", self.string_value()),
            Rule::String {
                field, operator, ..
            }
            | Rule::Enum {
                field, operator, ..
            }
            | Rule::Number {
                field, operator, ..
            }
            | Rule::Boolean {
                field, operator, ..
            }
            | Rule::FilterReference {
                field, operator, ..
            } => {
                let operand = self.string_value();
                if operand.is_empty() {
                    write!(f, "{field} {operator}")
                } else {
                    write!(f, "{field} {operator} {operand}")
                }
            }
        }
    }
}
