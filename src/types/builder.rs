use std::collections::BTreeSet;

use super::filter::FilterId;
use super::operator::{Combinator, Operator};
use super::rule::{Field, Rule};

/// Intermediate builder for string and enum rules.
/// Created by [`string()`] or [`enumeration()`]; an operator method produces the [`Rule`].
#[derive(Debug, Clone)]
pub struct TextRuleBuilder {
    field: Field,
    exact: bool,
}

impl TextRuleBuilder {
    fn build(self, operator: Operator, value: Option<String>, values: BTreeSet<String>) -> Rule {
        if self.exact {
            Rule::Enum {
                field: self.field,
                operator,
                value,
                values,
            }
        } else {
            Rule::String {
                field: self.field,
                operator,
                value,
                values,
            }
        }
    }

    fn single(self, operator: Operator, value: impl Into<String>) -> Rule {
        self.build(operator, Some(value.into()), BTreeSet::new())
    }

    fn set<I, S>(self, operator: Operator, values: I) -> Rule
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.build(operator, None, values.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn is(self, value: impl Into<String>) -> Rule {
        self.single(Operator::Is, value)
    }

    #[must_use]
    pub fn eq(self, value: impl Into<String>) -> Rule {
        self.single(Operator::Equals, value)
    }

    #[must_use]
    pub fn neq(self, value: impl Into<String>) -> Rule {
        self.single(Operator::NotEquals, value)
    }

    #[must_use]
    pub fn contains(self, value: impl Into<String>) -> Rule {
        self.single(Operator::Contains, value)
    }

    #[must_use]
    pub fn begins_with(self, value: impl Into<String>) -> Rule {
        self.single(Operator::BeginsWith, value)
    }

    #[must_use]
    pub fn ends_with(self, value: impl Into<String>) -> Rule {
        self.single(Operator::EndsWith, value)
    }

    #[must_use]
    pub fn is_in<I, S>(self, values: I) -> Rule
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(Operator::In, values)
    }

    #[must_use]
    pub fn not_in<I, S>(self, values: I) -> Rule
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(Operator::NotIn, values)
    }

    #[must_use]
    pub fn exists(self) -> Rule {
        self.build(Operator::Exists, None, BTreeSet::new())
    }

    #[must_use]
    pub fn not_exists(self) -> Rule {
        self.build(Operator::NotExists, None, BTreeSet::new())
    }
}

/// Intermediate builder for numeric rules. Created by [`number()`].
#[derive(Debug, Clone)]
pub struct NumberRuleBuilder {
    field: Field,
}

impl NumberRuleBuilder {
    fn single(self, operator: Operator, value: f64) -> Rule {
        Rule::Number {
            field: self.field,
            operator,
            value: Some(value),
            values: Vec::new(),
        }
    }

    fn set(self, operator: Operator, values: impl IntoIterator<Item = f64>) -> Rule {
        let mut collected: Vec<f64> = Vec::new();
        for v in values {
            if !collected.contains(&v) {
                collected.push(v);
            }
        }
        Rule::Number {
            field: self.field,
            operator,
            value: None,
            values: collected,
        }
    }

    #[must_use]
    pub fn eq(self, value: f64) -> Rule {
        self.single(Operator::Equals, value)
    }

    #[must_use]
    pub fn neq(self, value: f64) -> Rule {
        self.single(Operator::NotEquals, value)
    }

    #[must_use]
    pub fn gt(self, value: f64) -> Rule {
        self.single(Operator::Greater, value)
    }

    #[must_use]
    pub fn gte(self, value: f64) -> Rule {
        self.single(Operator::GreaterOrEquals, value)
    }

    #[must_use]
    pub fn lt(self, value: f64) -> Rule {
        self.single(Operator::Lower, value)
    }

    #[must_use]
    pub fn lte(self, value: f64) -> Rule {
        self.single(Operator::LowerOrEquals, value)
    }

    /// Inclusive range. The bounds may be given in either order.
    #[must_use]
    pub fn between(self, a: f64, b: f64) -> Rule {
        self.set(Operator::Between, [a, b])
    }

    #[must_use]
    pub fn is_in(self, values: impl IntoIterator<Item = f64>) -> Rule {
        self.set(Operator::In, values)
    }

    #[must_use]
    pub fn not_in(self, values: impl IntoIterator<Item = f64>) -> Rule {
        self.set(Operator::NotIn, values)
    }

    #[must_use]
    pub fn exists(self) -> Rule {
        self.set(Operator::Exists, [])
    }

    #[must_use]
    pub fn not_exists(self) -> Rule {
        self.set(Operator::NotExists, [])
    }
}

/// Intermediate builder for boolean rules. Created by [`boolean()`].
#[derive(Debug, Clone)]
pub struct BooleanRuleBuilder {
    field: Field,
}

impl BooleanRuleBuilder {
    fn build(self, operator: Operator, value: Option<bool>) -> Rule {
        Rule::Boolean {
            field: self.field,
            operator,
            value,
        }
    }

    #[must_use]
    pub fn eq(self, value: bool) -> Rule {
        self.build(Operator::Equals, Some(value))
    }

    #[must_use]
    pub fn neq(self, value: bool) -> Rule {
        self.build(Operator::NotEquals, Some(value))
    }

    #[must_use]
    pub fn exists(self) -> Rule {
        self.build(Operator::Exists, None)
    }

    #[must_use]
    pub fn not_exists(self) -> Rule {
        self.build(Operator::NotExists, None)
    }
}

/// Intermediate builder for property rules. Created by [`properties()`].
#[derive(Debug, Clone)]
pub struct PropertiesRuleBuilder {
    field: Field,
    property_name: String,
}

impl PropertiesRuleBuilder {
    fn build<I, S>(self, operator: Operator, values: I) -> Rule
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rule::Properties {
            field: self.field,
            operator,
            property_name: self.property_name,
            property_values: values.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn is_in<I, S>(self, values: I) -> Rule
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.build(Operator::In, values)
    }

    #[must_use]
    pub fn not_in<I, S>(self, values: I) -> Rule
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.build(Operator::NotIn, values)
    }
}

/// Intermediate builder for filter-reference rules. Created by [`filter_ref()`].
#[derive(Debug, Clone)]
pub struct FilterRefBuilder {
    field: Field,
}

impl FilterRefBuilder {
    fn build(self, operator: Operator, ids: impl IntoIterator<Item = FilterId>) -> Rule {
        Rule::FilterReference {
            field: self.field,
            operator,
            filter_ids: ids.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn is_part_of(self, ids: impl IntoIterator<Item = FilterId>) -> Rule {
        self.build(Operator::IsPartOf, ids)
    }

    #[must_use]
    pub fn is_not_part_of(self, ids: impl IntoIterator<Item = FilterId>) -> Rule {
        self.build(Operator::IsNotPartOf, ids)
    }
}

#[must_use]
pub fn string(field: &str) -> TextRuleBuilder {
    TextRuleBuilder {
        field: Field::from(field),
        exact: false,
    }
}

#[must_use]
pub fn enumeration(field: &str) -> TextRuleBuilder {
    TextRuleBuilder {
        field: Field::from(field),
        exact: true,
    }
}

#[must_use]
pub fn number(field: &str) -> NumberRuleBuilder {
    NumberRuleBuilder {
        field: Field::from(field),
    }
}

#[must_use]
pub fn boolean(field: &str) -> BooleanRuleBuilder {
    BooleanRuleBuilder {
        field: Field::from(field),
    }
}

#[must_use]
pub fn properties(field: &str, property_name: &str) -> PropertiesRuleBuilder {
    PropertiesRuleBuilder {
        field: Field::from(field),
        property_name: property_name.to_owned(),
    }
}

#[must_use]
pub fn filter_ref(field: &str) -> FilterRefBuilder {
    FilterRefBuilder {
        field: Field::from(field),
    }
}

#[must_use]
pub fn and(rules: Vec<Rule>) -> Rule {
    Rule::Combinator {
        combinator: Combinator::And,
        rules,
    }
}

#[must_use]
pub fn or(rules: Vec<Rule>) -> Rule {
    Rule::Combinator {
        combinator: Combinator::Or,
        rules,
    }
}
