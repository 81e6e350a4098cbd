//! In-memory collaborators: a resolver over [`EquipmentRecord`]s, a network
//! population and a filter repository.

use std::collections::HashMap;

use tracing::debug;

use crate::source::{Entity, FieldResolver, FilterRepository, Population};
use crate::{
    BoxError, EquipmentRecord, EquipmentType, Field, FieldValue, Filter, FilterId, ValidationError,
    check_no_cycle,
};

impl Entity for EquipmentRecord {
    fn id(&self) -> &str {
        EquipmentRecord::id(self)
    }
}

/// Reads scalar fields, or the `sub_key` entry of a property map, straight
/// from an [`EquipmentRecord`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordResolver;

impl FieldResolver<EquipmentRecord> for RecordResolver {
    fn resolve(
        &self,
        field: &Field,
        sub_key: Option<&str>,
        entity: &EquipmentRecord,
    ) -> Result<Option<FieldValue>, BoxError> {
        Ok(match sub_key {
            Some(name) => entity
                .get_property(field.as_str(), name)
                .map(FieldValue::from),
            None => entity.get(field.as_str()).cloned(),
        })
    }
}

/// A flat list of equipment records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNetwork {
    records: Vec<EquipmentRecord>,
}

impl InMemoryNetwork {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_records(records: Vec<EquipmentRecord>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[EquipmentRecord] {
        &self.records
    }
}

impl Population<EquipmentRecord> for InMemoryNetwork {
    fn members(&self, equipment_type: EquipmentType) -> Result<Vec<&EquipmentRecord>, BoxError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.equipment_type() == equipment_type)
            .collect())
    }
}

/// Filters kept in a map, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    filters: HashMap<FilterId, Filter>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a filter without validation, replacing any previous version.
    pub fn insert(&mut self, filter: Filter) -> Option<Filter> {
        self.filters.insert(filter.id, filter)
    }

    /// Store a filter after checking that its references are acyclic against
    /// the filters already stored. On error nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] raised by [`check_no_cycle`].
    pub fn insert_checked(&mut self, filter: Filter) -> Result<Option<Filter>, ValidationError> {
        check_no_cycle(&filter, &*self)?;
        debug!(filter_id = %filter.id, "filter accepted");
        Ok(self.insert(filter))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl FilterRepository for InMemoryRepository {
    fn get_filters(&self, ids: &[FilterId]) -> Result<Vec<Filter>, BoxError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.filters.get(id).cloned())
            .collect())
    }

    fn get_filter(&self, id: FilterId) -> Result<Option<Filter>, BoxError> {
        Ok(self.filters.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{filter_ref, string};

    #[test]
    fn resolver_reads_fields_and_properties() {
        let rec = EquipmentRecord::new("S1", EquipmentType::Substation)
            .set("COUNTRY", "FR")
            .property("FREE_PROPERTIES", "owner", "rte");
        let field = Field::from("COUNTRY");
        assert_eq!(
            RecordResolver.resolve(&field, None, &rec).unwrap(),
            Some(FieldValue::Text("FR".into()))
        );
        let props = Field::from("FREE_PROPERTIES");
        assert_eq!(
            RecordResolver.resolve(&props, Some("owner"), &rec).unwrap(),
            Some(FieldValue::Text("rte".into()))
        );
        assert_eq!(RecordResolver.resolve(&props, Some("x"), &rec).unwrap(), None);
    }

    #[test]
    fn network_members_filter_by_type() {
        let network = InMemoryNetwork::from_records(vec![
            EquipmentRecord::new("G1", EquipmentType::Generator),
            EquipmentRecord::new("L1", EquipmentType::Load),
            EquipmentRecord::new("G2", EquipmentType::Generator),
        ]);
        let ids: Vec<&str> = network
            .members(EquipmentType::Generator)
            .unwrap()
            .into_iter()
            .map(EquipmentRecord::id)
            .collect();
        assert_eq!(ids, vec!["G1", "G2"]);
    }

    #[test]
    fn get_filters_skips_unknown_ids() {
        let mut repo = InMemoryRepository::new();
        let known = FilterId::from_u128(1);
        repo.insert(Filter::new(known, EquipmentType::Load, string("ID").exists()));
        let found = repo.get_filters(&[known, FilterId::from_u128(2)]).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, known);
    }

    #[test]
    fn insert_checked_rejects_cycle_and_keeps_store_unchanged() {
        let a = FilterId::from_u128(1);
        let b = FilterId::from_u128(2);
        let mut repo = InMemoryRepository::new();
        repo.insert_checked(Filter::new(a, EquipmentType::Load, string("ID").exists()))
            .unwrap();
        repo.insert_checked(Filter::new(b, EquipmentType::Load, filter_ref("ID").is_part_of([a])))
            .unwrap();

        let updated_a = Filter::new(a, EquipmentType::Load, filter_ref("ID").is_part_of([b]));
        let err = repo.insert_checked(updated_a).unwrap_err();
        assert!(matches!(err, ValidationError::CycleDetected { .. }));
        assert_eq!(repo.get_filter(a).unwrap().unwrap().root, string("ID").exists());
        assert_eq!(repo.len(), 2);
    }
}
