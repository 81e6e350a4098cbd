use serde::Deserialize;

/// Default bound on nested filter-reference resolution.
pub const DEFAULT_MAX_REFERENCE_DEPTH: usize = 32;

/// Tuning knobs for an [`Evaluator`](crate::Evaluator).
///
/// Deserializable so hosts can embed it in their own configuration files:
///
/// ```
/// let config: expert_filter::EvaluatorConfig =
///     serde_json::from_str(r#"{ "maxReferenceDepth": 8 }"#).unwrap();
/// assert_eq!(config.max_reference_depth, Some(8));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EvaluatorConfig {
    /// How many filter references may be followed below the top-level rule
    /// before evaluation is aborted. `None` disables the guard; acyclicity is
    /// then only as good as the last [`check_no_cycle`](crate::check_no_cycle) run.
    pub max_reference_depth: Option<usize>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_reference_depth: Some(DEFAULT_MAX_REFERENCE_DEPTH),
        }
    }
}
