use std::collections::{BTreeSet, HashSet};

use tracing::{debug, trace, warn};

use crate::leaf;
use crate::source::{Entity, FieldResolver, FilterRepository, Population};
use crate::{
    Combinator, DataKind, EntityId, EvalError, EvaluationCache, EvaluatorConfig, Field, FieldValue,
    Filter, FilterId, Operator, Rule,
};

/// Evaluates rule trees against entities.
///
/// An evaluator only borrows its collaborators and holds no per-call state,
/// so building one per thread is cheap while the rules, filters and
/// collaborators stay shared. Every public entry point either creates a
/// fresh [`EvaluationCache`] or takes one from the caller; in the latter case
/// the caller must not share it between concurrent calls.
///
/// # Example
///
/// ```
/// use expert_filter::{
///     and, number, string, EquipmentRecord, EquipmentType, Evaluator, InMemoryNetwork,
///     InMemoryRepository, RecordResolver,
/// };
///
/// let network = InMemoryNetwork::new();
/// let repository = InMemoryRepository::new();
/// let evaluator = Evaluator::new(&RecordResolver, &repository, &network);
///
/// let rule = and(vec![string("ID").is("P1"), number("VOLTAGE").between(15.0, 30.0)]);
/// let entity = EquipmentRecord::new("P1", EquipmentType::Load)
///     .set("ID", "P1")
///     .set("VOLTAGE", 24.0);
/// assert!(evaluator.evaluate(&rule, &entity).unwrap());
/// ```
pub struct Evaluator<'a, E> {
    resolver: &'a dyn FieldResolver<E>,
    repository: &'a dyn FilterRepository,
    population: &'a dyn Population<E>,
    config: EvaluatorConfig,
}

impl<'a, E: Entity> Evaluator<'a, E> {
    #[must_use]
    pub fn new(
        resolver: &'a dyn FieldResolver<E>,
        repository: &'a dyn FilterRepository,
        population: &'a dyn Population<E>,
    ) -> Self {
        Self {
            resolver,
            repository,
            population,
            config: EvaluatorConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: EvaluatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the filter-reference depth guard; `None` disables it.
    #[must_use]
    pub fn max_reference_depth(mut self, depth: Option<usize>) -> Self {
        self.config.max_reference_depth = depth;
        self
    }

    #[must_use]
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluate `rule` against one entity with a fresh cache.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] on an invalid rule, a missing referenced filter,
    /// an exceeded reference depth, or a collaborator failure.
    pub fn evaluate(&self, rule: &Rule, entity: &E) -> Result<bool, EvalError> {
        let mut cache = EvaluationCache::new();
        self.evaluate_with_cache(rule, entity, &mut cache)
    }

    /// Evaluate `rule` against one entity, reusing the caller's cache.
    ///
    /// # Errors
    ///
    /// See [`evaluate`](Self::evaluate).
    pub fn evaluate_with_cache(
        &self,
        rule: &Rule,
        entity: &E,
        cache: &mut EvaluationCache,
    ) -> Result<bool, EvalError> {
        self.eval_rule(rule, entity, cache, 0)
    }

    /// Ids of the members of the filter's equipment population that match its
    /// root rule. One cache is shared by the whole batch, so each referenced
    /// filter is resolved once no matter how many candidates are tested.
    ///
    /// # Errors
    ///
    /// See [`evaluate`](Self::evaluate).
    pub fn matching_ids(&self, filter: &Filter) -> Result<Vec<EntityId>, EvalError> {
        let candidates = self
            .population
            .members(filter.equipment_type)
            .map_err(EvalError::Population)?;
        let mut cache = EvaluationCache::new();
        self.matching_ids_with_cache(&filter.root, &candidates, &mut cache)
    }

    /// Ids of the given candidates matching `rule`, in candidate order.
    ///
    /// # Errors
    ///
    /// See [`evaluate`](Self::evaluate).
    pub fn matching_ids_with_cache(
        &self,
        rule: &Rule,
        candidates: &[&E],
        cache: &mut EvaluationCache,
    ) -> Result<Vec<EntityId>, EvalError> {
        let mut matched = Vec::new();
        for candidate in candidates {
            if self.eval_rule(rule, candidate, cache, 0)? {
                matched.push(candidate.id().to_owned());
            }
        }
        Ok(matched)
    }

    fn eval_rule(
        &self,
        rule: &Rule,
        entity: &E,
        cache: &mut EvaluationCache,
        depth: usize,
    ) -> Result<bool, EvalError> {
        match rule {
            Rule::Combinator { combinator, rules } => match combinator {
                Combinator::And => {
                    for child in rules {
                        if !self.eval_rule(child, entity, cache, depth)? {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                }
                Combinator::Or => {
                    for child in rules {
                        if self.eval_rule(child, entity, cache, depth)? {
                            return Ok(true);
                        }
                    }
                    Ok(false)
                }
            },
            Rule::String {
                field,
                operator,
                value,
                values,
            }
            | Rule::Enum {
                field,
                operator,
                value,
                values,
            } => {
                leaf::check_operator(*operator, rule.data_kind())?;
                let actual = self.resolve(field, None, entity)?;
                let text = actual.as_ref().map(FieldValue::as_text);
                leaf::text_matches(
                    rule.data_kind(),
                    *operator,
                    text.as_deref(),
                    value.as_deref(),
                    values,
                )
            }
            Rule::Number {
                field,
                operator,
                value,
                values,
            } => {
                leaf::check_operator(*operator, DataKind::Number)?;
                let actual = self
                    .resolve(field, None, entity)?
                    .map_or(f64::NAN, |v| v.as_number());
                leaf::number_matches(*operator, actual, *value, values)
            }
            Rule::Boolean {
                field,
                operator,
                value,
            } => {
                leaf::check_operator(*operator, DataKind::Boolean)?;
                let actual = self.resolve(field, None, entity)?.and_then(|v| v.as_bool());
                leaf::bool_matches(*operator, actual, *value)
            }
            Rule::Properties {
                field,
                operator,
                property_name,
                property_values,
            } => {
                leaf::check_operator(*operator, DataKind::Properties)?;
                let actual = self.resolve(field, Some(property_name.as_str()), entity)?;
                let text = actual.as_ref().map(FieldValue::as_text);
                leaf::property_matches(*operator, text.as_deref(), property_values)
            }
            Rule::FilterReference {
                operator,
                filter_ids,
                ..
            } => {
                leaf::check_operator(*operator, DataKind::FilterUuid)?;
                self.resolve_references(filter_ids, cache, depth)?;
                let member = filter_ids.iter().any(|id| {
                    cache
                        .get(id)
                        .is_some_and(|matched| matched.contains(entity.id()))
                });
                Ok(match operator {
                    Operator::IsPartOf => member,
                    _ => !member,
                })
            }
        }
    }

    fn resolve(
        &self,
        field: &Field,
        sub_key: Option<&str>,
        entity: &E,
    ) -> Result<Option<FieldValue>, EvalError> {
        self.resolver
            .resolve(field, sub_key, entity)
            .map_err(EvalError::Resolver)
    }

    /// Make sure every id in `ids` has its match set in `cache`.
    ///
    /// Uncached ids not already fetched by an enclosing resolution are
    /// fetched in one batch. A nested reference may resolve a later id of the
    /// batch first; that id is then skipped here.
    fn resolve_references(
        &self,
        ids: &BTreeSet<FilterId>,
        cache: &mut EvaluationCache,
        depth: usize,
    ) -> Result<(), EvalError> {
        let missing: Vec<FilterId> = ids
            .iter()
            .filter(|id| !cache.contains(id))
            .copied()
            .collect();
        if missing.is_empty() {
            trace!(count = ids.len(), "filter references served from cache");
            return Ok(());
        }

        if let Some(max_depth) = self.config.max_reference_depth {
            if depth >= max_depth {
                warn!(filter_id = %missing[0], max_depth, "filter reference depth exceeded");
                return Err(EvalError::ReferenceDepthExceeded {
                    filter_id: missing[0],
                    max_depth,
                });
            }
        }

        let to_fetch: Vec<FilterId> = missing
            .iter()
            .filter(|id| !cache.is_fetched(id))
            .copied()
            .collect();
        if !to_fetch.is_empty() {
            let filters = self
                .repository
                .get_filters(&to_fetch)
                .map_err(EvalError::Repository)?;
            for filter in filters {
                if to_fetch.contains(&filter.id) {
                    cache.stage(filter);
                }
            }
        }

        for id in missing {
            if cache.contains(&id) {
                continue;
            }
            let filter = cache
                .take_fetched(&id)
                .ok_or(EvalError::FilterNotFound { id })?;
            let members = self
                .population
                .members(filter.equipment_type)
                .map_err(EvalError::Population)?;

            let mut matched = HashSet::new();
            for member in members {
                if self.eval_rule(&filter.root, member, cache, depth + 1)? {
                    matched.insert(member.id().to_owned());
                }
            }
            debug!(
                filter_id = %id,
                equipment_type = ?filter.equipment_type,
                matched = matched.len(),
                depth,
                "resolved referenced filter"
            );
            cache.insert(id, matched);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::{
        BoxError, EquipmentRecord, EquipmentType, InMemoryNetwork, InMemoryRepository,
        RecordResolver, and, boolean, filter_ref, number, or, string,
    };

    fn load(id: &str) -> EquipmentRecord {
        EquipmentRecord::new(id, EquipmentType::Load).set("ID", id)
    }

    fn eval(rule: &Rule, entity: &EquipmentRecord) -> Result<bool, EvalError> {
        let network = InMemoryNetwork::new();
        let repository = InMemoryRepository::new();
        Evaluator::new(&RecordResolver, &repository, &network).evaluate(rule, entity)
    }

    /// Resolver that counts how often each call happens, delegating to the record.
    struct CountingResolver {
        calls: Cell<usize>,
    }

    impl FieldResolver<EquipmentRecord> for CountingResolver {
        fn resolve(
            &self,
            field: &Field,
            sub_key: Option<&str>,
            entity: &EquipmentRecord,
        ) -> Result<Option<FieldValue>, BoxError> {
            self.calls.set(self.calls.get() + 1);
            RecordResolver.resolve(field, sub_key, entity)
        }
    }

    struct FailingResolver;

    impl FieldResolver<EquipmentRecord> for FailingResolver {
        fn resolve(
            &self,
            _field: &Field,
            _sub_key: Option<&str>,
            _entity: &EquipmentRecord,
        ) -> Result<Option<FieldValue>, BoxError> {
            Err("resolver offline".into())
        }
    }

    #[test]
    fn empty_and_is_true_empty_or_is_false() {
        let entity = load("L1");
        assert!(eval(&and(vec![]), &entity).unwrap());
        assert!(!eval(&or(vec![]), &entity).unwrap());
    }

    #[test]
    fn and_short_circuits_on_first_false() {
        let network = InMemoryNetwork::new();
        let repository = InMemoryRepository::new();
        let resolver = CountingResolver {
            calls: Cell::new(0),
        };
        let evaluator = Evaluator::new(&resolver, &repository, &network);
        let rule = and(vec![string("ID").is("other"), string("ID").exists()]);
        assert!(!evaluator.evaluate(&rule, &load("L1")).unwrap());
        assert_eq!(resolver.calls.get(), 1);
    }

    #[test]
    fn or_short_circuits_on_first_true() {
        let network = InMemoryNetwork::new();
        let repository = InMemoryRepository::new();
        let resolver = CountingResolver {
            calls: Cell::new(0),
        };
        let evaluator = Evaluator::new(&resolver, &repository, &network);
        let rule = or(vec![string("ID").is("L1"), string("ID").exists()]);
        assert!(evaluator.evaluate(&rule, &load("L1")).unwrap());
        assert_eq!(resolver.calls.get(), 1);
    }

    #[test]
    fn unsupported_operator_on_boolean() {
        let rule = Rule::Boolean {
            field: Field::from("CONNECTED"),
            operator: Operator::Contains,
            value: Some(true),
        };
        let err = eval(&rule, &load("L1")).unwrap_err();
        assert!(matches!(
            err,
            EvalError::UnsupportedOperator {
                operator: Operator::Contains,
                data_kind: DataKind::Boolean
            }
        ));
    }

    #[test]
    fn unsupported_operator_is_checked_before_resolving() {
        let network = InMemoryNetwork::new();
        let repository = InMemoryRepository::new();
        let evaluator = Evaluator::new(&FailingResolver, &repository, &network);
        let rule = Rule::Number {
            field: Field::from("V"),
            operator: Operator::Contains,
            value: None,
            values: vec![],
        };
        assert!(matches!(
            evaluator.evaluate(&rule, &load("L1")),
            Err(EvalError::UnsupportedOperator { .. })
        ));
    }

    #[test]
    fn resolver_error_propagates() {
        let network = InMemoryNetwork::new();
        let repository = InMemoryRepository::new();
        let evaluator = Evaluator::new(&FailingResolver, &repository, &network);
        let err = evaluator
            .evaluate(&string("ID").exists(), &load("L1"))
            .unwrap_err();
        assert_eq!(err.to_string(), "field resolver failed: resolver offline");
    }

    #[test]
    fn boolean_field_absent_takes_not_exists_branch() {
        let entity = load("L1");
        assert!(eval(&boolean("CONNECTED").not_exists(), &entity).unwrap());
        assert!(!eval(&boolean("CONNECTED").eq(false), &entity).unwrap());
    }

    #[test]
    fn number_field_absent_takes_not_exists_branch() {
        let entity = load("L1");
        assert!(eval(&number("P0").not_exists(), &entity).unwrap());
        assert!(!eval(&number("P0").lt(1e9), &entity).unwrap());
    }

    #[test]
    fn matching_ids_keeps_candidate_order() {
        let network = InMemoryNetwork::from_records(vec![
            load("L2").set("P0", 10.0),
            load("L1").set("P0", 30.0),
            load("L3").set("P0", 50.0),
        ]);
        let repository = InMemoryRepository::new();
        let evaluator = Evaluator::new(&RecordResolver, &repository, &network);
        let filter = Filter::new(
            FilterId::from_u128(1),
            EquipmentType::Load,
            number("P0").gte(20.0),
        );
        assert_eq!(evaluator.matching_ids(&filter).unwrap(), vec!["L1", "L3"]);
    }

    #[test]
    fn builder_overrides_depth() {
        let network = InMemoryNetwork::new();
        let repository = InMemoryRepository::new();
        let evaluator =
            Evaluator::new(&RecordResolver, &repository, &network).max_reference_depth(None);
        assert_eq!(evaluator.config().max_reference_depth, None);
    }

    #[test]
    fn unsupported_operator_on_absent_string_field() {
        let rule = Rule::String {
            field: Field::from("NAME"),
            operator: Operator::Greater,
            value: Some("a".to_owned()),
            values: BTreeSet::new(),
        };
        assert!(matches!(
            eval(&rule, &load("L1")),
            Err(EvalError::UnsupportedOperator {
                operator: Operator::Greater,
                data_kind: DataKind::String
            })
        ));
    }

    #[test]
    fn batch_sibling_reached_through_nested_reference_is_evaluated_once() {
        let (outer, middle, inner) = (
            FilterId::from_u128(1),
            FilterId::from_u128(2),
            FilterId::from_u128(3),
        );
        let mut repository = InMemoryRepository::new();
        repository.insert(Filter::new(
            outer,
            EquipmentType::Load,
            filter_ref("ID").is_part_of([middle, inner]),
        ));
        repository.insert(Filter::new(
            middle,
            EquipmentType::Load,
            filter_ref("ID").is_part_of([inner]),
        ));
        repository.insert(Filter::new(inner, EquipmentType::Load, number("P0").gte(20.0)));
        let network = InMemoryNetwork::from_records(vec![
            load("L1").set("P0", 10.0),
            load("L2").set("P0", 30.0),
            load("L3").set("P0", 50.0),
        ]);
        let resolver = CountingResolver {
            calls: Cell::new(0),
        };
        let evaluator = Evaluator::new(&resolver, &repository, &network);

        let mut cache = EvaluationCache::new();
        let rule = filter_ref("ID").is_part_of([outer]);
        assert!(evaluator
            .evaluate_with_cache(&rule, &load("L2"), &mut cache)
            .unwrap());
        // Only the inner leaf reads a field: once per population member.
        assert_eq!(resolver.calls.get(), 3);
        assert_eq!(cache.get(&inner).map(HashSet::len), Some(2));
    }
}
