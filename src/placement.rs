//! Building matrix bookkeeping and buildable spot search.
//!
//! The building matrix doubles as the pathing cost matrix used while
//! planning: free tiles are 0, roads 1, tiles next to walls or exits are
//! discouraged, reserved walkable tiles are expensive and structures are
//! impassable.

use crate::constants::*;
use crate::cost_matrix::*;
use crate::distance::DistanceFields;
use crate::labels::*;
use crate::location::*;
use crate::pathing::*;
use crate::room_plan::*;
use crate::terrain::*;
use fnv::FnvHashMap;
use log::*;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// A buildable tile found by the spot search, with the walk that led to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildSpot {
    pub location: Location,
    /// Tiles between the search origin and the spot, both excluded.
    pub path: Vec<Location>,
    pub distance: u32,
}

#[derive(Clone, Debug)]
struct TemporaryLocation {
    location: Location,
    label: LocationType,
    backup: u8,
}

/// Expanding frontier ordered by walking distance from the seeds.
#[derive(Clone, Debug, Default)]
struct SpotSearch {
    open: BinaryHeap<Reverse<(u32, usize)>>,
    distance: FnvHashMap<Location, u32>,
    came_from: FnvHashMap<Location, Location>,
    closed: Vec<bool>,
}

impl SpotSearch {
    fn new(seeds: impl Iterator<Item = Location>) -> Self {
        let mut search = SpotSearch {
            closed: vec![false; ROOM_AREA],
            ..Default::default()
        };
        for seed in seeds {
            search.distance.insert(seed, 0);
            search.open.push(Reverse((0, seed.linear_index())));
        }
        search
    }

    fn path_to(&self, loc: Location) -> Vec<Location> {
        let mut path = Vec::new();
        let mut current = loc;
        while let Some(previous) = self.came_from.get(&current) {
            path.push(*previous);
            current = *previous;
        }
        // Drop the seed, the remaining tiles lead from it to the spot.
        path.pop();
        path.reverse();
        path
    }
}

#[derive(Clone)]
pub struct PlacementManager {
    terrain: FastRoomTerrain,
    fields: DistanceFields,
    matrix: CostMatrix,
    plan: RoomPlan,
    planned_level: u8,
    temporary: Vec<TemporaryLocation>,
    search: Option<SpotSearch>,
}

impl PlacementManager {
    pub fn new(terrain: FastRoomTerrain, fields: DistanceFields, planned_level: u8) -> Self {
        PlacementManager {
            terrain,
            fields,
            matrix: CostMatrix::new(MATRIX_FREE),
            plan: RoomPlan::new(),
            planned_level,
            temporary: Vec::new(),
            search: None,
        }
    }

    pub fn terrain(&self) -> &FastRoomTerrain {
        &self.terrain
    }

    pub fn fields(&self) -> &DistanceFields {
        &self.fields
    }

    pub fn matrix(&self) -> &CostMatrix {
        &self.matrix
    }

    pub fn plan(&self) -> &RoomPlan {
        &self.plan
    }

    pub fn into_plan(self) -> RoomPlan {
        self.plan
    }

    /// Seed the building matrix from terrain and distance fields. Walls, the
    /// room border and `blocked` tiles become impassable, tiles touching a
    /// wall or close to an exit are discouraged.
    pub fn prepare_building_matrix(&mut self, blocked: &[Location]) {
        for loc in Location::all() {
            let value = if !self.terrain.is_walkable(loc) || loc.is_border() {
                MATRIX_OBSTACLE
            } else if self.fields.wall_distance(loc) == 1
                || self.fields.is_near_exit(loc, EXIT_BUILD_DISTANCE)
            {
                MATRIX_DISCOURAGED
            } else {
                MATRIX_FREE
            };
            self.matrix.set(loc, value);
        }
        for loc in blocked {
            self.block_position(*loc);
        }
        self.search = None;
    }

    pub fn is_buildable_tile(&self, loc: Location, allow_roads: bool) -> bool {
        if !self.terrain.is_walkable(loc) || loc.is_border() {
            return false;
        }
        if self.fields.is_near_exit(loc, EXIT_BUILD_DISTANCE) {
            return false;
        }
        match self.matrix.get(loc) {
            value if value > MATRIX_BUILDABLE_LIMIT => false,
            MATRIX_ROAD => allow_roads,
            _ => true,
        }
    }

    /// Whether the spot search may walk across a tile.
    fn is_traversable(&self, loc: Location) -> bool {
        self.terrain.is_walkable(loc) && !loc.is_border() && self.matrix.get(loc) < MATRIX_BUILDABLE_LIMIT
    }

    /// Change a matrix value. Tiles already taken by a structure are only ever raised.
    fn set_matrix_value(&mut self, loc: Location, value: u8) {
        let current = self.matrix.get(loc);
        if current < MATRIX_BUILDABLE_LIMIT || value > current {
            self.matrix.set(loc, value);
        }
    }

    pub fn discourage_position(&mut self, loc: Location) {
        if self.matrix.get(loc) < MATRIX_DISCOURAGED {
            self.matrix.set(loc, MATRIX_DISCOURAGED);
        }
    }

    pub fn block_position(&mut self, loc: Location) {
        self.matrix.set(loc, MATRIX_OBSTACLE);
    }

    /// Matrix value a role leaves behind, if it changes the matrix at all.
    fn matrix_value_for(label: LocationType) -> Option<u8> {
        use LocationType::*;

        match label {
            Center | Exit | Rampart => None,
            _ if label.is_obstacle() => Some(MATRIX_OBSTACLE),
            _ if label.is_road() => Some(MATRIX_ROAD),
            _ => Some(MATRIX_RESERVED),
        }
    }

    /// Remaining quota for the structure a role stands for.
    pub fn remaining_quota(&self, label: LocationType) -> u32 {
        let base = label.base();
        let structure_type = match base.structure_type() {
            Some(structure_type) => structure_type,
            None => return u32::MAX,
        };
        let planned = self.plan.count(base)
            + self
                .temporary
                .iter()
                .filter(|t| t.label.base() == base)
                .count();
        max_structures_at_rcl(structure_type, self.planned_level).saturating_sub(planned as u32)
    }

    /// Record a location under a role and its base role, and update the
    /// matrix accordingly. Returns false when the structure quota is spent.
    pub fn plan_location(&mut self, loc: Location, label: LocationType) -> bool {
        if label.structure_type().is_some()
            && !self.plan.has(label.base(), loc)
            && self.remaining_quota(label) == 0
        {
            debug!("Quota for {} exhausted, skipping {:?}", label.base(), loc);
            return false;
        }

        self.plan.add(label, loc);
        if label.base() != label {
            self.plan.add(label.base(), loc);
        }
        if let Some(value) = Self::matrix_value_for(label) {
            self.set_matrix_value(loc, value);
        }
        true
    }

    /// Road along a path, each tile recorded under `label` as well.
    pub fn plan_road(&mut self, path: &[Location], label: LocationType) {
        for loc in path {
            if self.terrain.is_walkable(*loc) && !loc.is_border() {
                self.plan_location(*loc, label);
            }
        }
    }

    /// Tentatively claim a location. The previous matrix value is kept until
    /// the placement is committed or discarded.
    pub fn plan_temporary_location(&mut self, loc: Location, label: LocationType) -> bool {
        if label.structure_type().is_some() && self.remaining_quota(label) == 0 {
            return false;
        }
        let backup = self.matrix.get(loc);
        self.temporary.push(TemporaryLocation {
            location: loc,
            label,
            backup,
        });
        if let Some(value) = Self::matrix_value_for(label) {
            self.set_matrix_value(loc, value);
        }
        true
    }

    pub fn temporary_locations(&self, label: LocationType) -> Vec<Location> {
        self.temporary
            .iter()
            .filter(|t| t.label == label)
            .map(|t| t.location)
            .collect()
    }

    /// Turn every tentative location of `label` into a planned one.
    pub fn commit_temporary_location(&mut self, label: LocationType) -> usize {
        let (committed, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.temporary).into_iter().partition(|t| t.label == label);
        self.temporary = kept;
        for entry in &committed {
            self.plan.add(label, entry.location);
            if label.base() != label {
                self.plan.add(label.base(), entry.location);
            }
        }
        committed.len()
    }

    /// Undo every tentative location of `label`, restoring the matrix values
    /// they replaced.
    pub fn discard_temporary_locations(&mut self, label: LocationType) -> usize {
        let (discarded, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.temporary).into_iter().partition(|t| t.label == label);
        self.temporary = kept;
        for entry in discarded.iter().rev() {
            self.matrix.set(entry.location, entry.backup);
        }
        discarded.len()
    }

    /// Start a fresh spot search from `origin` and `entrances`.
    pub fn start_building_placement(&mut self, origin: Location, entrances: &[Location]) {
        let seeds = std::iter::once(origin).chain(entrances.iter().copied());
        self.search = Some(SpotSearch::new(seeds));
    }

    /// Next buildable tile in order of walking distance from the origin.
    pub fn get_next_available_build_spot(&mut self) -> Option<BuildSpot> {
        let mut search = self.search.take()?;
        let mut found = None;

        while let Some(Reverse((distance, index))) = search.open.pop() {
            if search.closed[index] {
                continue;
            }
            search.closed[index] = true;
            let loc = Location::from_linear_index(index);
            let is_seed = distance == 0;

            if is_seed || self.is_traversable(loc) {
                for next in loc.neighbors() {
                    if search.closed[next.linear_index()] || !self.is_traversable(next) {
                        continue;
                    }
                    let next_distance = distance + 1;
                    let known = search.distance.get(&next).copied().unwrap_or(u32::MAX);
                    if next_distance < known {
                        search.distance.insert(next, next_distance);
                        search.came_from.insert(next, loc);
                        search.open.push(Reverse((next_distance, next.linear_index())));
                    }
                }
            }

            if !is_seed && self.is_buildable_tile(loc, false) {
                found = Some(BuildSpot {
                    location: loc,
                    path: search.path_to(loc),
                    distance,
                });
                break;
            }
        }

        self.search = Some(search);
        found
    }

    /// Shortest road between two points over the building matrix. Plains and
    /// swamps cost the same, a built road makes both equally cheap.
    pub fn find_access_road(
        &self,
        pathfinder: &dyn GridPathfinder,
        from: Location,
        goals: &[PathGoal],
    ) -> PathResult {
        let options = PathOptions {
            plain_cost: 2,
            swamp_cost: 2,
            max_rooms: 1,
            heuristic_weight: 1.0,
        };
        pathfinder.search(&self.terrain, from, goals, &self.matrix, &options)
    }

    pub fn is_position_accessible(
        &self,
        pathfinder: &dyn GridPathfinder,
        from: Location,
        goals: &[PathGoal],
    ) -> bool {
        self.find_access_road(pathfinder, from, goals).is_complete()
    }

    /// Number of buildable, non-road tiles around a location.
    pub fn free_neighbor_count(&self, loc: Location) -> usize {
        loc.neighbors().filter(|n| self.is_buildable_tile(*n, false)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> PlacementManager {
        let terrain = FastRoomTerrain::from_fn(|x, y| {
            if x == 0 || y == 0 || x == 49 || y == 49 || (x == 30 && y < 40) {
                TerrainFlags::WALL
            } else {
                TerrainFlags::NONE
            }
        });
        let fields = DistanceFields::generate(&terrain);
        let mut manager = PlacementManager::new(terrain, fields, PLANNED_LEVEL);
        manager.prepare_building_matrix(&[]);
        manager
    }

    #[test]
    fn buildable_tile_rules() {
        let mut manager = manager();
        let loc = Location::from_xy(20, 20);
        assert!(manager.is_buildable_tile(loc, false));
        // Discouraged tiles next to walls can still be built on.
        assert!(manager.is_buildable_tile(Location::from_xy(29, 20), false));
        assert!(!manager.is_buildable_tile(Location::from_xy(30, 20), true));
        assert!(!manager.is_buildable_tile(Location::from_xy(0, 20), true));

        manager.plan_location(loc, LocationType::Road);
        assert!(!manager.is_buildable_tile(loc, false));
        assert!(manager.is_buildable_tile(loc, true));

        manager.plan_location(loc, LocationType::Spawn);
        assert!(!manager.is_buildable_tile(loc, true));
        // Structures never get downgraded by a later road.
        manager.plan_location(loc, LocationType::Road);
        assert_eq!(manager.matrix().get(loc), MATRIX_OBSTACLE);
    }

    #[test]
    fn quota_is_never_exceeded() {
        let mut manager = manager();
        let mut placed = 0;
        for x in 5..25 {
            if manager.plan_location(Location::from_xy(x, 20), LocationType::Tower) {
                placed += 1;
            }
        }
        assert_eq!(placed, 6);
        assert_eq!(manager.plan().count(LocationType::Tower), 6);
    }

    #[test]
    fn sub_roles_count_against_the_base_quota() {
        let mut manager = manager();
        for x in 5..10 {
            manager.plan_location(Location::from_xy(x, 20), LocationType::LinkSource);
        }
        assert_eq!(manager.plan().count(LocationType::Link), 5);
        assert_eq!(manager.remaining_quota(LocationType::LinkBay), 1);
    }

    #[test]
    fn discard_restores_exactly_the_previous_values() {
        let mut manager = manager();
        let before = manager.matrix().clone();
        let a = Location::from_xy(20, 20);
        let b = Location::from_xy(22, 22);
        manager.plan_location(Location::from_xy(21, 21), LocationType::Road);
        let with_road = manager.matrix().clone();

        manager.plan_temporary_location(a, LocationType::Tower);
        manager.plan_temporary_location(b, LocationType::Lab);
        manager.commit_temporary_location(LocationType::Tower);
        manager.discard_temporary_locations(LocationType::Lab);
        let first_order = manager.matrix().clone();

        let mut other = manager_with_road();
        other.plan_temporary_location(a, LocationType::Tower);
        other.plan_temporary_location(b, LocationType::Lab);
        other.discard_temporary_locations(LocationType::Lab);
        other.commit_temporary_location(LocationType::Tower);

        assert_eq!(first_order, *other.matrix());
        assert_eq!(first_order.get(b), with_road.get(b));
        assert_eq!(first_order.get(a), MATRIX_OBSTACLE);
        assert_ne!(before, first_order);
        assert!(manager.plan().has(LocationType::Tower, a));
        assert!(!manager.plan().has(LocationType::Lab, b));
        assert_eq!(manager.plan().get_locations(LocationType::Tower), other.plan().get_locations(LocationType::Tower));
    }

    fn manager_with_road() -> PlacementManager {
        let mut manager = manager();
        manager.plan_location(Location::from_xy(21, 21), LocationType::Road);
        manager
    }

    #[test]
    fn spot_search_yields_tiles_by_distance() {
        let mut manager = manager();
        let origin = Location::from_xy(20, 20);
        manager.plan_location(origin, LocationType::Road);
        manager.start_building_placement(origin, &[]);

        let mut last = 0;
        for _ in 0..20 {
            let spot = manager.get_next_available_build_spot().unwrap();
            assert!(spot.distance >= last);
            assert_eq!(spot.path.len() as u32, spot.distance - 1);
            last = spot.distance;
        }
        assert_eq!(last, 2);
    }

    #[test]
    fn spot_search_walks_around_walls() {
        let mut manager = manager();
        let origin = Location::from_xy(29, 10);
        manager.start_building_placement(origin, &[]);
        let spot = std::iter::from_fn(|| manager.get_next_available_build_spot())
            .find(|spot| spot.location.x() > 30)
            .unwrap();
        assert!(spot.path.iter().all(|l| l.x() != 30 || l.y() >= 40));
        assert!(spot.distance >= 30);
    }
}
