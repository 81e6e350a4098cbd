//! JSON interchange shape of rules and filters.
//!
//! A rule node is an object discriminated by `dataKind`:
//!
//! ```text
//! { "dataKind": "COMBINATOR", "combinator": "AND", "rules": [ ... ] }
//! { "dataKind": "STRING",  "field": "ID", "operator": "IS", "value": "P1" }
//! { "dataKind": "NUMBER",  "field": "NOMINAL_VOLTAGE", "operator": "BETWEEN", "values": [15, 30] }
//! { "dataKind": "BOOLEAN", "field": "CONNECTED", "operator": "EQUALS", "value": true }
//! { "dataKind": "ENUM",    "field": "ENERGY_SOURCE", "operator": "IN", "values": ["HYDRO"] }
//! { "dataKind": "PROPERTIES", "field": "FREE_PROPERTIES", "operator": "IN",
//!   "propertyName": "region", "propertyValues": ["north"] }
//! { "dataKind": "FILTER_UUID", "field": "ID", "operator": "IS_PART_OF", "values": ["<uuid>"] }
//! ```
//!
//! `SUBSTATION_PROPERTIES` is accepted as an alias of `PROPERTIES`. The DTOs
//! here only carry the shape; [`Rule`] is built from them with `TryFrom`,
//! which checks that the mandatory members of each kind are present.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    Combinator, DataKind, EquipmentType, Field, Filter, FilterError, FilterId, Operator, Rule,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("{data_kind} rule is missing '{field}'")]
    MissingField {
        data_kind: DataKind,
        field: &'static str,
    },

    #[error("COMBINATOR rule is missing 'combinator'")]
    MissingCombinator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dataKind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleDto {
    Combinator(CombinatorDto),
    String(TextDto),
    Enum(TextDto),
    Number(NumberDto),
    Boolean(BooleanDto),
    FilterUuid(FilterUuidDto),
    #[serde(alias = "SUBSTATION_PROPERTIES")]
    Properties(PropertiesDto),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinatorDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combinator: Option<Combinator>,
    #[serde(default)]
    pub rules: Vec<RuleDto>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterUuidDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<FilterId>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertiesDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_values: Option<Vec<String>>,
}

/// Wire shape of a stored filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDto {
    pub id: FilterId,
    pub equipment_type: EquipmentType,
    pub rules: RuleDto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn required<T>(value: Option<T>, data_kind: DataKind, field: &'static str) -> Result<T, WireError> {
    value.ok_or(WireError::MissingField { data_kind, field })
}

impl TryFrom<RuleDto> for Rule {
    type Error = WireError;

    fn try_from(dto: RuleDto) -> Result<Self, Self::Error> {
        Ok(match dto {
            RuleDto::Combinator(c) => Rule::Combinator {
                combinator: c.combinator.ok_or(WireError::MissingCombinator)?,
                rules: c
                    .rules
                    .into_iter()
                    .map(Rule::try_from)
                    .collect::<Result<_, _>>()?,
            },
            RuleDto::String(t) => {
                let kind = DataKind::String;
                Rule::String {
                    field: required(t.field, kind, "field")?,
                    operator: required(t.operator, kind, "operator")?,
                    value: t.value,
                    values: t.values.unwrap_or_default().into_iter().collect(),
                }
            }
            RuleDto::Enum(t) => {
                let kind = DataKind::Enum;
                Rule::Enum {
                    field: required(t.field, kind, "field")?,
                    operator: required(t.operator, kind, "operator")?,
                    value: t.value,
                    values: t.values.unwrap_or_default().into_iter().collect(),
                }
            }
            RuleDto::Number(n) => {
                let kind = DataKind::Number;
                let mut values: Vec<f64> = Vec::new();
                for v in n.values.unwrap_or_default() {
                    if !values.contains(&v) {
                        values.push(v);
                    }
                }
                Rule::Number {
                    field: required(n.field, kind, "field")?,
                    operator: required(n.operator, kind, "operator")?,
                    value: n.value,
                    values,
                }
            }
            RuleDto::Boolean(b) => {
                let kind = DataKind::Boolean;
                Rule::Boolean {
                    field: required(b.field, kind, "field")?,
                    operator: required(b.operator, kind, "operator")?,
                    value: b.value,
                }
            }
            RuleDto::FilterUuid(f) => {
                let kind = DataKind::FilterUuid;
                Rule::FilterReference {
                    field: required(f.field, kind, "field")?,
                    operator: required(f.operator, kind, "operator")?,
                    filter_ids: f.values.unwrap_or_default().into_iter().collect(),
                }
            }
            RuleDto::Properties(p) => {
                let kind = DataKind::Properties;
                Rule::Properties {
                    field: required(p.field, kind, "field")?,
                    operator: required(p.operator, kind, "operator")?,
                    property_name: required(p.property_name, kind, "propertyName")?,
                    property_values: p.property_values.unwrap_or_default(),
                }
            }
        })
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

impl From<&Rule> for RuleDto {
    fn from(rule: &Rule) -> Self {
        match rule {
            Rule::Combinator { combinator, rules } => RuleDto::Combinator(CombinatorDto {
                combinator: Some(*combinator),
                rules: rules.iter().map(RuleDto::from).collect(),
            }),
            Rule::String {
                field,
                operator,
                value,
                values,
            } => RuleDto::String(TextDto {
                field: Some(field.clone()),
                operator: Some(*operator),
                value: value.clone(),
                values: non_empty(values.iter().cloned().collect()),
            }),
            Rule::Enum {
                field,
                operator,
                value,
                values,
            } => RuleDto::Enum(TextDto {
                field: Some(field.clone()),
                operator: Some(*operator),
                value: value.clone(),
                values: non_empty(values.iter().cloned().collect()),
            }),
            Rule::Number {
                field,
                operator,
                value,
                values,
            } => RuleDto::Number(NumberDto {
                field: Some(field.clone()),
                operator: Some(*operator),
                value: *value,
                values: non_empty(values.clone()),
            }),
            Rule::Boolean {
                field,
                operator,
                value,
            } => RuleDto::Boolean(BooleanDto {
                field: Some(field.clone()),
                operator: Some(*operator),
                value: *value,
            }),
            Rule::FilterReference {
                field,
                operator,
                filter_ids,
            } => RuleDto::FilterUuid(FilterUuidDto {
                field: Some(field.clone()),
                operator: Some(*operator),
                values: Some(filter_ids.iter().copied().collect()),
            }),
            Rule::Properties {
                field,
                operator,
                property_name,
                property_values,
            } => RuleDto::Properties(PropertiesDto {
                field: Some(field.clone()),
                operator: Some(*operator),
                property_name: Some(property_name.clone()),
                property_values: Some(property_values.clone()),
            }),
        }
    }
}

impl TryFrom<FilterDto> for Filter {
    type Error = WireError;

    fn try_from(dto: FilterDto) -> Result<Self, Self::Error> {
        Ok(Filter {
            id: dto.id,
            equipment_type: dto.equipment_type,
            root: Rule::try_from(dto.rules)?,
            created_at: dto.created_at.unwrap_or_else(Utc::now),
        })
    }
}

impl From<&Filter> for FilterDto {
    fn from(filter: &Filter) -> Self {
        FilterDto {
            id: filter.id,
            equipment_type: filter.equipment_type,
            rules: RuleDto::from(&filter.root),
            created_at: Some(filter.created_at),
        }
    }
}

impl Rule {
    /// Parse a rule tree from its JSON wire shape.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] on malformed JSON or a rule missing a
    /// mandatory member.
    pub fn from_json(input: &str) -> Result<Self, FilterError> {
        let dto: RuleDto = serde_json::from_str(input)?;
        Ok(Rule::try_from(dto)?)
    }

    /// Render this rule tree in its JSON wire shape.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, FilterError> {
        Ok(serde_json::to_string(&RuleDto::from(self))?)
    }
}

impl Filter {
    /// Parse a filter from its JSON wire shape.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] on malformed JSON or an invalid rule tree.
    pub fn from_json(input: &str) -> Result<Self, FilterError> {
        let dto: FilterDto = serde_json::from_str(input)?;
        Ok(Filter::try_from(dto)?)
    }

    /// Render this filter in its JSON wire shape.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, FilterError> {
        Ok(serde_json::to_string(&FilterDto::from(self))?)
    }
}
