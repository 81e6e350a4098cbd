mod builder;
mod cache;
mod config;
mod error;
mod filter;
mod operator;
mod record;
mod rule;
mod value;

pub use builder::{
    BooleanRuleBuilder, FilterRefBuilder, NumberRuleBuilder, PropertiesRuleBuilder, TextRuleBuilder,
    and, boolean, enumeration, filter_ref, number, or, properties, string,
};
pub use cache::{EntityId, EvaluationCache};
pub use config::{DEFAULT_MAX_REFERENCE_DEPTH, EvaluatorConfig};
pub use error::{BoxError, EvalError, ValidationError};
pub use filter::{EquipmentType, Filter, FilterId};
pub use operator::{Combinator, DataKind, Operator};
pub use record::EquipmentRecord;
pub use rule::{Field, Rule};
pub use value::FieldValue;
