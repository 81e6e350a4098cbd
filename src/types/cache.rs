use std::collections::{HashMap, HashSet};

use super::filter::{Filter, FilterId};

/// Identifier of an equipment record.
pub type EntityId = String;

/// Memo of already-resolved filter-reference match sets.
///
/// Scoped to a single top-level evaluation call: create one per call and
/// never share it between concurrent evaluations. Filters fetched in a batch
/// wait here until they are evaluated, so a nested reference to one of them
/// does not fetch it again.
#[derive(Debug, Clone, Default)]
pub struct EvaluationCache {
    matches: HashMap<FilterId, HashSet<EntityId>>,
    fetched: HashMap<FilterId, Filter>,
}

impl EvaluationCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, id: &FilterId) -> bool {
        self.matches.contains_key(id)
    }

    /// Ids matched by filter `id`, if it has been resolved in this call.
    #[must_use]
    pub fn get(&self, id: &FilterId) -> Option<&HashSet<EntityId>> {
        self.matches.get(id)
    }

    pub fn insert(&mut self, id: FilterId, matched: HashSet<EntityId>) {
        self.matches.insert(id, matched);
    }

    pub(crate) fn is_fetched(&self, id: &FilterId) -> bool {
        self.fetched.contains_key(id)
    }

    pub(crate) fn stage(&mut self, filter: Filter) {
        self.fetched.insert(filter.id, filter);
    }

    pub(crate) fn take_fetched(&mut self, id: &FilterId) -> Option<Filter> {
        self.fetched.remove(id)
    }

    /// Number of resolved filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}
