use thiserror::Error;

use crate::wire::WireError;
use crate::{EvalError, ValidationError};

/// Unified error type covering evaluation, validation and the wire format.
///
/// Returned by convenience methods like [`Rule::from_json()`](crate::Rule::from_json)
/// and [`Filter::from_json()`](crate::Filter::from_json); every component error
/// converts into it with `?`.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
