//! Multi-criterion scoring of finished room plans.
//!
//! Five independent terms are summed into the total, higher is better:
//! structures fitted, upkeep, tower coverage of the perimeter, ramparts too
//! close to the edges, and commute lengths between key points.

use crate::constants::*;
use crate::cost_matrix::*;
use crate::labels::*;
use crate::location::*;
use crate::pathing::*;
use crate::room_plan::RoomPlan;
use crate::steps::tower_effect;
use crate::terrain::*;
use screeps::constants::StructureType;
use serde::{Deserialize, Serialize};

/// Structures that earn points, with their weight per structure.
const STRUCTURE_WEIGHTS: [(LocationType, StructureType, f32); 11] = [
    (LocationType::Storage, StructureType::Storage, 1.0),
    (LocationType::Tower, StructureType::Tower, 0.2),
    (LocationType::Terminal, StructureType::Terminal, 0.2),
    (LocationType::Spawn, StructureType::Spawn, 0.1),
    (LocationType::Lab, StructureType::Lab, 0.02),
    (LocationType::Extension, StructureType::Extension, 0.01),
    (LocationType::Link, StructureType::Link, 0.01),
    (LocationType::Nuker, StructureType::Nuker, 0.05),
    (LocationType::Observer, StructureType::Observer, 0.05),
    (LocationType::Extractor, StructureType::Extractor, 0.05),
    (LocationType::PowerSpawn, StructureType::PowerSpawn, 0.05),
];

const MAINTENANCE_WEIGHT: f32 = 0.2;
const TOWER_WEIGHT: f32 = 0.1;
const DEFENSE_WEIGHT: f32 = 0.01;

const HARVEST_DISTANCE_WEIGHT: f32 = 0.003;
const CONTROLLER_DISTANCE_WEIGHT: f32 = 0.002;
const MINERAL_DISTANCE_WEIGHT: f32 = 0.001;
const TOWER_DISTANCE_WEIGHT: f32 = 0.001;

/// Path length charged when a path can't be found.
const INCOMPLETE_PATH_LENGTH: f32 = 1000.0;

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub structures: f32,
    pub maintenance: f32,
    pub towers: f32,
    pub defense: f32,
    pub distance: f32,
    pub total: f32,
}

pub struct RoomPlanScorer<'a> {
    terrain: &'a FastRoomTerrain,
    exit_distance: &'a CostMatrix,
    pathfinder: &'a dyn GridPathfinder,
    planned_level: u8,
}

impl<'a> RoomPlanScorer<'a> {
    pub fn new(
        terrain: &'a FastRoomTerrain,
        exit_distance: &'a CostMatrix,
        pathfinder: &'a dyn GridPathfinder,
        planned_level: u8,
    ) -> Self {
        RoomPlanScorer {
            terrain,
            exit_distance,
            pathfinder,
            planned_level,
        }
    }

    #[cfg_attr(feature = "profile", screeps_timing_annotate::timing)]
    pub fn score(&self, plan: &RoomPlan) -> ScoreBreakdown {
        let structures = self.structure_score(plan);
        let maintenance = -self.upkeep_per_tick(plan) * MAINTENANCE_WEIGHT;
        let towers = self.tower_coverage(plan) * TOWER_WEIGHT;
        let defense = -self.edge_exposure(plan) * DEFENSE_WEIGHT;
        let distance = -self.commute_cost(plan);

        ScoreBreakdown {
            structures,
            maintenance,
            towers,
            defense,
            distance,
            total: structures + maintenance + towers + defense + distance,
        }
    }

    fn structure_score(&self, plan: &RoomPlan) -> f32 {
        STRUCTURE_WEIGHTS
            .iter()
            .map(|(label, structure_type, weight)| {
                let quota = max_structures_at_rcl(*structure_type, self.planned_level) as usize;
                plan.count(*label).min(quota) as f32 * weight
            })
            .sum()
    }

    /// Energy per tick spent repairing decay.
    fn upkeep_per_tick(&self, plan: &RoomPlan) -> f32 {
        let ramparts = plan.count(LocationType::Rampart) as f32 * RAMPART_DECAY_PER_TICK;
        let containers = plan.count(LocationType::Container) as f32 * CONTAINER_DECAY_PER_TICK;
        let roads: f32 = plan
            .get_locations(LocationType::Road)
            .into_iter()
            .map(|loc| {
                let terrain = self.terrain.get(&loc);
                if terrain.contains(TerrainFlags::WALL) {
                    ROAD_DECAY_PER_TICK * ROAD_WALL_MULTIPLIER
                } else if terrain.contains(TerrainFlags::SWAMP) {
                    ROAD_DECAY_PER_TICK * ROAD_SWAMP_MULTIPLIER
                } else {
                    ROAD_DECAY_PER_TICK
                }
            })
            .sum();

        (ramparts + containers + roads) / REPAIR_POWER
    }

    /// Mean tower effect over every rampart and tower pair.
    fn tower_coverage(&self, plan: &RoomPlan) -> f32 {
        let ramparts = plan.get_locations(LocationType::Rampart);
        let towers = plan.get_locations(LocationType::Tower);
        let pairs = ramparts.len() * towers.len();
        if pairs == 0 {
            return 0.0;
        }

        let total: f32 = ramparts
            .iter()
            .flat_map(|rampart| towers.iter().map(move |tower| tower_effect(rampart.distance_to(*tower))))
            .sum();
        total / pairs as f32
    }

    fn edge_exposure(&self, plan: &RoomPlan) -> f32 {
        plan.get_locations(LocationType::Rampart)
            .into_iter()
            .map(|loc| self.exit_distance.get(loc))
            .filter(|distance| *distance != 0 && *distance <= DEFENSE_EXIT_RANGE)
            .map(|distance| {
                let gap = (DEFENSE_EXIT_RANGE - distance) as f32;
                gap * gap
            })
            .sum()
    }

    fn path_length(&self, navigation: &CostMatrix, from: Location, to: Location, range: u8) -> f32 {
        let result = self.pathfinder.search(
            self.terrain,
            from,
            &[PathGoal::new(to, range)],
            navigation,
            &PathOptions::default(),
        );
        if result.is_complete() {
            result.path.len() as f32
        } else {
            INCOMPLETE_PATH_LENGTH
        }
    }

    /// Shortest path from any of `origins`, or the penalty if none gets there.
    fn closest_length(&self, navigation: &CostMatrix, origins: &[Location], to: Location, range: u8) -> f32 {
        origins
            .iter()
            .map(|origin| self.path_length(navigation, *origin, to, range))
            .fold(INCOMPLETE_PATH_LENGTH, f32::min)
    }

    fn commute_cost(&self, plan: &RoomPlan) -> f32 {
        let navigation = plan.navigation_matrix();
        let spawns = plan.get_locations(LocationType::Spawn);

        let harvest: f32 = plan
            .get_locations(LocationType::Harvester)
            .into_iter()
            .map(|loc| self.closest_length(&navigation, &spawns, loc, 0))
            .sum();
        let controller: f32 = plan
            .get_locations(LocationType::Upgrader)
            .into_iter()
            .map(|loc| self.closest_length(&navigation, &spawns, loc, 0))
            .sum();
        let mineral: f32 = plan
            .get_locations(LocationType::HarvesterMineral)
            .into_iter()
            .map(|loc| self.closest_length(&navigation, &spawns, loc, 0))
            .sum();

        let hub = plan
            .get_locations(LocationType::Storage)
            .into_iter()
            .chain(plan.get_locations(LocationType::Center))
            .next();
        let towers: f32 = match hub {
            Some(hub) => plan
                .get_locations(LocationType::Tower)
                .into_iter()
                .map(|tower| self.path_length(&navigation, hub, tower, 1))
                .sum(),
            None => 0.0,
        };

        harvest * HARVEST_DISTANCE_WEIGHT
            + controller * CONTROLLER_DISTANCE_WEIGHT
            + mineral * MINERAL_DISTANCE_WEIGHT
            + towers * TOWER_DISTANCE_WEIGHT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_room() -> FastRoomTerrain {
        FastRoomTerrain::from_fn(|x, y| {
            let exit = y == 0 && (20..30).contains(&x);
            if !exit && (x == 0 || y == 0 || x == 49 || y == 49) {
                TerrainFlags::WALL
            } else if x == 40 {
                TerrainFlags::SWAMP
            } else {
                TerrainFlags::NONE
            }
        })
    }

    fn score(plan: &RoomPlan) -> ScoreBreakdown {
        let terrain = open_room();
        let fields = crate::distance::DistanceFields::generate(&terrain);
        RoomPlanScorer::new(&terrain, &fields.exit, &AStarPathfinder, PLANNED_LEVEL).score(plan)
    }

    #[test]
    fn structures_are_capped_at_quota() {
        let mut plan = RoomPlan::new();
        plan.add(LocationType::Storage, Location::from_xy(25, 25));
        plan.add(LocationType::Storage, Location::from_xy(26, 25));
        let breakdown = score(&plan);
        assert!((breakdown.structures - 1.0).abs() < 1e-6);
    }

    #[test]
    fn swamp_roads_cost_more_upkeep() {
        let mut plain = RoomPlan::new();
        plain.add(LocationType::Road, Location::from_xy(30, 30));
        let mut swamp = RoomPlan::new();
        swamp.add(LocationType::Road, Location::from_xy(40, 30));

        let plain = score(&plain).maintenance;
        let swamp = score(&swamp).maintenance;
        assert!(swamp < plain);
        assert!((swamp / plain - ROAD_SWAMP_MULTIPLIER).abs() < 1e-4);
    }

    #[test]
    fn ramparts_near_exits_are_penalized() {
        let mut near = RoomPlan::new();
        near.add(LocationType::Rampart, Location::from_xy(25, 2));
        let mut far = RoomPlan::new();
        far.add(LocationType::Rampart, Location::from_xy(25, 20));

        assert!(score(&near).defense < 0.0);
        assert_eq!(score(&far).defense, 0.0);
        assert_eq!(score(&near).maintenance, score(&far).maintenance);
    }

    #[test]
    fn missing_spawns_cost_the_path_penalty() {
        let mut plan = RoomPlan::new();
        plan.add(LocationType::Harvester, Location::from_xy(10, 10));
        let breakdown = score(&plan);
        assert!((breakdown.distance + INCOMPLETE_PATH_LENGTH * HARVEST_DISTANCE_WEIGHT).abs() < 1e-4);

        plan.add(LocationType::Spawn, Location::from_xy(10, 14));
        let breakdown = score(&plan);
        assert!((breakdown.distance + 4.0 * HARVEST_DISTANCE_WEIGHT).abs() < 1e-4);
    }

    #[test]
    fn towers_near_ramparts_score_higher() {
        let mut plan = RoomPlan::new();
        plan.add(LocationType::Rampart, Location::from_xy(25, 10));
        plan.add(LocationType::Tower, Location::from_xy(25, 13));
        let close = score(&plan).towers;

        let mut plan = RoomPlan::new();
        plan.add(LocationType::Rampart, Location::from_xy(25, 10));
        plan.add(LocationType::Tower, Location::from_xy(25, 40));
        let far = score(&plan).towers;

        assert!((close - TOWER_WEIGHT).abs() < 1e-6);
        assert_eq!(far, 0.0);
    }
}
