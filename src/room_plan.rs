use crate::constants::*;
use crate::cost_matrix::*;
use crate::error::PlannerError;
use crate::labels::*;
use crate::location::*;
use fnv::{FnvHashMap, FnvHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// First char of the packed coordinate alphabet. All `BASE + 0..=ROOM_AREA`
/// code points are plain, non-surrogate characters.
const PACKING_BASE: u32 = 0x4E00;

/// Planned locations grouped by role.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoomPlan {
    locations: FnvHashMap<LocationType, FnvHashSet<Location>>,
}

impl RoomPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the location was already recorded under this label.
    pub fn add(&mut self, label: LocationType, loc: Location) -> bool {
        self.locations.entry(label).or_default().insert(loc)
    }

    pub fn remove(&mut self, label: LocationType, loc: Location) -> bool {
        let removed = self
            .locations
            .get_mut(&label)
            .map(|set| set.remove(&loc))
            .unwrap_or(false);
        if self.locations.get(&label).map(|s| s.is_empty()).unwrap_or(false) {
            self.locations.remove(&label);
        }
        removed
    }

    pub fn has(&self, label: LocationType, loc: Location) -> bool {
        self.locations
            .get(&label)
            .map(|set| set.contains(&loc))
            .unwrap_or(false)
    }

    pub fn has_any(&self, label: LocationType) -> bool {
        self.count(label) > 0
    }

    pub fn count(&self, label: LocationType) -> usize {
        self.locations.get(&label).map(|set| set.len()).unwrap_or(0)
    }

    /// Locations for a label, sorted so results are stable between calls.
    pub fn get_locations(&self, label: LocationType) -> Vec<Location> {
        let mut result: Vec<Location> = self
            .locations
            .get(&label)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        result.sort_by_key(|loc| loc.linear_index());
        result
    }

    /// All labels recorded at a location.
    pub fn labels_at(&self, loc: Location) -> Vec<LocationType> {
        let mut labels: Vec<LocationType> = self
            .locations
            .iter()
            .filter(|(_, set)| set.contains(&loc))
            .map(|(label, _)| *label)
            .collect();
        labels.sort();
        labels
    }

    pub fn labels(&self) -> impl Iterator<Item = LocationType> + '_ {
        self.locations.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Whether any label at this location blocks movement.
    pub fn is_obstacle(&self, loc: Location) -> bool {
        self.locations
            .iter()
            .any(|(label, set)| label.is_obstacle() && set.contains(&loc))
    }

    /// Cost matrix for pathing through the finished layout: roads cost 1,
    /// obstacles are impassable, everything else uses terrain cost.
    pub fn navigation_matrix(&self) -> CostMatrix {
        let mut matrix = CostMatrix::new(0);
        for (label, set) in &self.locations {
            if label.is_road() {
                for loc in set {
                    if matrix.get(*loc) != MATRIX_OBSTACLE {
                        matrix.set(*loc, MATRIX_ROAD);
                    }
                }
            }
        }
        for (label, set) in &self.locations {
            if label.is_obstacle() {
                for loc in set {
                    matrix.set(*loc, MATRIX_OBSTACLE);
                }
            }
        }
        matrix
    }

    /// Packed per-label encoding, keyed by label key.
    pub fn to_packed(&self) -> BTreeMap<String, String> {
        self.locations
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .map(|(label, set)| (label.key().to_string(), pack_locations(set.iter().copied())))
            .collect()
    }

    pub fn from_packed(packed: &BTreeMap<String, String>) -> Result<RoomPlan, PlannerError> {
        let mut plan = RoomPlan::new();
        for (key, encoded) in packed {
            let label = LocationType::from_key(key).ok_or_else(|| PlannerError::UnknownLabel(key.clone()))?;
            let locations =
                unpack_locations(encoded).ok_or_else(|| PlannerError::InvalidPacking(key.clone()))?;
            for loc in locations {
                plan.add(label, loc);
            }
        }
        Ok(plan)
    }
}

/// Encode locations as runs of consecutive linear indices, two chars per run.
pub fn pack_locations(locations: impl Iterator<Item = Location>) -> String {
    let mut indices: Vec<u32> = locations.map(|l| l.linear_index() as u32).collect();
    indices.sort_unstable();
    indices.dedup();

    let mut packed = String::new();
    let mut iter = indices.into_iter().peekable();
    while let Some(start) = iter.next() {
        let mut length = 1u32;
        while iter.peek() == Some(&(start + length)) {
            iter.next();
            length += 1;
        }
        for value in [start, length] {
            // Values stay below ROOM_AREA + 1, well inside the valid range.
            if let Some(c) = char::from_u32(PACKING_BASE + value) {
                packed.push(c);
            }
        }
    }
    packed
}

pub fn unpack_locations(packed: &str) -> Option<Vec<Location>> {
    let values: Vec<u32> = packed
        .chars()
        .map(|c| (c as u32).checked_sub(PACKING_BASE))
        .collect::<Option<_>>()?;
    if values.len() % 2 != 0 {
        return None;
    }

    let mut result = Vec::new();
    for run in values.chunks(2) {
        let (start, length) = (run[0] as usize, run[1] as usize);
        if length == 0 || start + length > ROOM_AREA {
            return None;
        }
        result.extend((start..start + length).map(Location::from_linear_index));
    }
    Some(result)
}

impl Serialize for RoomPlan {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_packed().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RoomPlan {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let packed = BTreeMap::<String, String>::deserialize(deserializer)?;
        RoomPlan::from_packed(&packed).map_err(serde::de::Error::custom)
    }
}
