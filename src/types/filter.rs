use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::rule::Rule;

/// Opaque unique identifier of a stored filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterId(Uuid);

impl FilterId {
    /// A fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// A deterministic identifier, handy for fixtures.
    #[must_use]
    pub const fn from_u128(v: u128) -> Self {
        Self(Uuid::from_u128(v))
    }
}

impl Default for FilterId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for FilterId {
    fn from(v: Uuid) -> Self {
        Self(v)
    }
}

impl FromStr for FilterId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Kind of grid equipment a filter selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentType {
    Substation,
    VoltageLevel,
    Line,
    TwoWindingsTransformer,
    ThreeWindingsTransformer,
    Generator,
    Battery,
    Load,
    ShuntCompensator,
    StaticVarCompensator,
    DanglingLine,
    HvdcLine,
    LccConverterStation,
    VscConverterStation,
    Bus,
    BusbarSection,
}

/// A stored, identified predicate: a root rule plus metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub id: FilterId,
    pub equipment_type: EquipmentType,
    pub root: Rule,
    pub created_at: DateTime<Utc>,
}

impl Filter {
    /// A filter stamped with the current time.
    #[must_use]
    pub fn new(id: FilterId, equipment_type: EquipmentType, root: Rule) -> Self {
        Self {
            id,
            equipment_type,
            root,
            created_at: Utc::now(),
        }
    }

    /// Ids of every filter referenced anywhere in this filter's tree, in tree
    /// order and without duplicates.
    #[must_use]
    pub fn referenced_filters(&self) -> Vec<FilterId> {
        let mut out = Vec::new();
        self.root.collect_filter_refs(&mut out);
        let mut seen = HashSet::new();
        out.retain(|id| seen.insert(*id));
        out
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Filter({}, {:?}): {}", self.id, self.equipment_type, self.root)
    }
}
