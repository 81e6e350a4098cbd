//! Operator semantics of leaf rules, over already-resolved field values.
//!
//! The evaluator runs [`check_operator`] before it resolves the field, so the
//! matchers here start with absence: an absent (or empty) text value and a
//! `NaN` number both answer `op == NOT_EXISTS`, an absent boolean likewise,
//! an absent property answers `false`. A present value with an operator
//! outside the kind's table still yields `UnsupportedOperator`.

use std::collections::BTreeSet;

use crate::{DataKind, EvalError, Operator};

pub(crate) fn check_operator(operator: Operator, data_kind: DataKind) -> Result<(), EvalError> {
    if operator.is_supported_by(data_kind) {
        Ok(())
    } else {
        Err(EvalError::UnsupportedOperator {
            operator,
            data_kind,
        })
    }
}

fn operand<T>(value: Option<T>, operator: Operator, data_kind: DataKind) -> Result<T, EvalError> {
    value.ok_or(EvalError::MissingOperand {
        operator,
        data_kind,
    })
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// String and enum rules. Enum rules compare `EQUALS`/`NOT_EQUALS`/`IN`/`NOT_IN`
/// exactly; everything else ignores case.
pub(crate) fn text_matches(
    data_kind: DataKind,
    operator: Operator,
    actual: Option<&str>,
    value: Option<&str>,
    values: &BTreeSet<String>,
) -> Result<bool, EvalError> {
    let actual = match actual {
        Some(a) if !a.is_empty() => a,
        _ => return Ok(operator == Operator::NotExists),
    };
    let exact = data_kind == DataKind::Enum;
    let same = |a: &str, b: &str| if exact { a == b } else { eq_ignore_case(a, b) };

    Ok(match operator {
        Operator::Exists => true,
        Operator::NotExists => false,
        Operator::Is => eq_ignore_case(actual, operand(value, operator, data_kind)?),
        Operator::Equals => same(actual, operand(value, operator, data_kind)?),
        Operator::NotEquals => !same(actual, operand(value, operator, data_kind)?),
        Operator::Contains => actual
            .to_lowercase()
            .contains(&operand(value, operator, data_kind)?.to_lowercase()),
        Operator::BeginsWith => actual
            .to_lowercase()
            .starts_with(&operand(value, operator, data_kind)?.to_lowercase()),
        Operator::EndsWith => actual
            .to_lowercase()
            .ends_with(&operand(value, operator, data_kind)?.to_lowercase()),
        Operator::In => values.iter().any(|v| same(actual, v)),
        Operator::NotIn => !values.iter().any(|v| same(actual, v)),
        _ => {
            return Err(EvalError::UnsupportedOperator {
                operator,
                data_kind,
            })
        }
    })
}

/// Number rules. `actual` is `NaN` when the field is absent.
pub(crate) fn number_matches(
    operator: Operator,
    actual: f64,
    value: Option<f64>,
    values: &[f64],
) -> Result<bool, EvalError> {
    let kind = DataKind::Number;
    if actual.is_nan() {
        return Ok(operator == Operator::NotExists);
    }

    Ok(match operator {
        Operator::Exists => true,
        Operator::NotExists => false,
        #[allow(clippy::float_cmp)]
        Operator::Equals => actual == operand(value, operator, kind)?,
        #[allow(clippy::float_cmp)]
        Operator::NotEquals => actual != operand(value, operator, kind)?,
        Operator::Greater => actual > operand(value, operator, kind)?,
        Operator::GreaterOrEquals => actual >= operand(value, operator, kind)?,
        Operator::Lower => actual < operand(value, operator, kind)?,
        Operator::LowerOrEquals => actual <= operand(value, operator, kind)?,
        Operator::Between => {
            let (min, max) = operand(bounds(values), operator, kind)?;
            actual >= min && actual <= max
        }
        Operator::In => values.contains(&actual),
        Operator::NotIn => !values.contains(&actual),
        _ => {
            return Err(EvalError::UnsupportedOperator {
                operator,
                data_kind: kind,
            })
        }
    })
}

/// Smallest and largest value of the set, whatever the insertion order.
fn bounds(values: &[f64]) -> Option<(f64, f64)> {
    let mut iter = values.iter().copied().filter(|v| !v.is_nan());
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

pub(crate) fn bool_matches(
    operator: Operator,
    actual: Option<bool>,
    value: Option<bool>,
) -> Result<bool, EvalError> {
    let kind = DataKind::Boolean;
    let Some(actual) = actual else {
        return Ok(operator == Operator::NotExists);
    };

    Ok(match operator {
        Operator::Exists => true,
        Operator::NotExists => false,
        Operator::Equals => actual == operand(value, operator, kind)?,
        Operator::NotEquals => actual != operand(value, operator, kind)?,
        _ => {
            return Err(EvalError::UnsupportedOperator {
                operator,
                data_kind: kind,
            })
        }
    })
}

/// Property rules. An absent property is never a match, for `IN` and `NOT_IN` alike.
pub(crate) fn property_matches(
    operator: Operator,
    actual: Option<&str>,
    property_values: &[String],
) -> Result<bool, EvalError> {
    let kind = DataKind::Properties;
    let Some(actual) = actual else {
        return Ok(false);
    };
    let found = property_values.iter().any(|v| eq_ignore_case(actual, v));

    Ok(match operator {
        Operator::In => found,
        Operator::NotIn => !found,
        _ => {
            return Err(EvalError::UnsupportedOperator {
                operator,
                data_kind: kind,
            })
        }
    })
}
