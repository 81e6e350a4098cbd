use std::collections::HashMap;

use super::filter::EquipmentType;
use super::value::FieldValue;

/// A flat, in-memory equipment record.
///
/// Stands in for a real grid equipment object: scalar attributes keyed by
/// field name, plus named property maps (e.g. `FREE_PROPERTIES`,
/// `SUBSTATION_PROPERTIES`) holding free-form key/value pairs.
#[derive(Debug, Clone)]
pub struct EquipmentRecord {
    id: String,
    equipment_type: EquipmentType,
    fields: HashMap<String, FieldValue>,
    properties: HashMap<String, HashMap<String, String>>,
}

impl EquipmentRecord {
    #[must_use]
    pub fn new(id: impl Into<String>, equipment_type: EquipmentType) -> Self {
        Self {
            id: id.into(),
            equipment_type,
            fields: HashMap::new(),
            properties: HashMap::new(),
        }
    }

    /// Set a scalar attribute.
    #[must_use]
    pub fn set(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value.into());
        self
    }

    /// Set one entry of a named property map.
    #[must_use]
    pub fn property(mut self, field: &str, name: &str, value: &str) -> Self {
        self.properties
            .entry(field.to_owned())
            .or_default()
            .insert(name.to_owned(), value.to_owned());
        self
    }

    /// Insert a scalar attribute (mutable reference version).
    pub fn insert(&mut self, field: &str, value: FieldValue) {
        self.fields.insert(field.to_owned(), value);
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn equipment_type(&self) -> EquipmentType {
        self.equipment_type
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    #[must_use]
    pub fn get_property(&self, field: &str, name: &str) -> Option<&str> {
        self.properties.get(field)?.get(name).map(String::as_str)
    }
}
