//! Seams to the outside world: where field values, stored filters and the
//! equipment population come from.
//!
//! The engine calls these synchronously and adds no timeout, retry or
//! wrapping beyond carrying the returned [`BoxError`] as an error source.

use crate::{BoxError, EquipmentType, Field, FieldValue, Filter, FilterId};

/// An equipment record the engine can evaluate. Only its id is read
/// directly; everything else goes through a [`FieldResolver`].
pub trait Entity {
    fn id(&self) -> &str;
}

/// Extracts a named field's raw value from an entity.
pub trait FieldResolver<E: ?Sized> {
    /// `sub_key` is only set for property rules and names the property to
    /// read. `Ok(None)` means the value is absent, which is not an error.
    fn resolve(
        &self,
        field: &Field,
        sub_key: Option<&str>,
        entity: &E,
    ) -> Result<Option<FieldValue>, BoxError>;
}

/// Read access to stored filters.
pub trait FilterRepository {
    /// Batch lookup. Ids with no stored filter are simply absent from the
    /// result.
    fn get_filters(&self, ids: &[FilterId]) -> Result<Vec<Filter>, BoxError>;

    fn get_filter(&self, id: FilterId) -> Result<Option<Filter>, BoxError>;
}

/// The equipment population a referenced filter is evaluated against.
pub trait Population<E> {
    fn members(&self, equipment_type: EquipmentType) -> Result<Vec<&E>, BoxError>;
}
