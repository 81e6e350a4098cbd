use thiserror::Error;

use super::filter::FilterId;
use super::operator::{DataKind, Operator};

/// Error type collaborators (resolvers, repositories, populations) report
/// their own failures with. The engine keeps it as the `source()` of its
/// own error, unchanged.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("operator {operator} is not supported for {data_kind} rules")]
    UnsupportedOperator {
        operator: Operator,
        data_kind: DataKind,
    },

    #[error("operator {operator} on a {data_kind} rule requires an operand")]
    MissingOperand {
        operator: Operator,
        data_kind: DataKind,
    },

    #[error("referenced filter '{id}' not found")]
    FilterNotFound { id: FilterId },

    #[error("filter reference depth exceeded {max_depth} while resolving '{filter_id}'")]
    ReferenceDepthExceeded { filter_id: FilterId, max_depth: usize },

    #[error("field resolver failed: {0}")]
    Resolver(#[source] BoxError),

    #[error("filter repository failed: {0}")]
    Repository(#[source] BoxError),

    #[error("equipment population failed: {0}")]
    Population(#[source] BoxError),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("cyclic filter reference detected: {}", display_path(path))]
    CycleDetected { path: Vec<FilterId> },

    #[error("referenced filter '{id}' not found")]
    FilterNotFound { id: FilterId },

    #[error("filter repository failed: {0}")]
    Repository(#[source] BoxError),
}

fn display_path(path: &[FilterId]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
