//! Evaluation engine for expert filters: user-authored predicate trees that
//! classify grid equipment records.
//!
//! A [`Rule`] tree combines typed leaf rules with AND/OR combinators and with
//! filter-reference rules that test membership in other stored filters. An
//! [`Evaluator`] walks a tree against one entity, reading field values
//! through a [`FieldResolver`] and memoizing referenced filters in a per-call
//! [`EvaluationCache`]. [`check_no_cycle`] must accept a filter before it is
//! stored, so that filter references never recurse back into themselves.

mod cycle;
mod error;
mod evaluate;
mod leaf;
mod memory;
mod source;
mod types;
pub mod wire;

pub use cycle::check_no_cycle;
pub use error::FilterError;
pub use evaluate::Evaluator;
pub use memory::{InMemoryNetwork, InMemoryRepository, RecordResolver};
pub use source::{Entity, FieldResolver, FilterRepository, Population};
pub use types::{
    BooleanRuleBuilder, BoxError, Combinator, DEFAULT_MAX_REFERENCE_DEPTH, DataKind, EntityId,
    EquipmentRecord, EquipmentType, EvalError, EvaluationCache, EvaluatorConfig, Field, FieldValue,
    Filter, FilterId, FilterRefBuilder, NumberRuleBuilder, Operator, PropertiesRuleBuilder, Rule,
    TextRuleBuilder, ValidationError, and, boolean, enumeration, filter_ref, number, or, properties,
    string,
};
pub use wire::WireError;
