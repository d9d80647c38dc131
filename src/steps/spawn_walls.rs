//! SpawnWallStep: walls off the tiles next to a spawn that have no road
//! beside them, so no creep spawns into a dead end. Last step of the
//! pipeline.

use crate::labels::*;
use crate::location::*;
use crate::step::*;
use log::*;

pub struct SpawnWallStep;

impl PlanningStep for SpawnWallStep {
    fn name(&self) -> &str {
        "spawn_walls"
    }

    fn run(&self, state: &mut BuilderState, _ctx: &PlanningContext) -> StepResult {
        let spawns = state.placement.plan().get_locations(LocationType::Spawn);
        let mut walls = Vec::new();

        for spawn in spawns {
            for tile in spawn.neighbors() {
                if !state.placement.is_buildable_tile(tile, false) {
                    continue;
                }
                let plan = state.placement.plan();
                if tile.neighbors().any(|n| plan.has(LocationType::Road, n)) {
                    continue;
                }
                walls.push(tile);
            }
        }

        walls.sort_by_key(|loc: &Location| loc.linear_index());
        walls.dedup();
        for wall in &walls {
            state.placement.plan_location(*wall, LocationType::SpawnBlocker);
        }

        debug!("{}: {} spawn walls", state.room, walls.len());
        StepResult::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::min_cut::DinicMinCut;
    use crate::pathing::AStarPathfinder;
    use crate::steps::test_support::*;

    #[test]
    fn dead_end_tiles_next_to_spawns_are_walled() {
        let intel = open_intel();
        let mut state = state_for(&intel, Location::from_xy(25, 25));
        state.placement.prepare_building_matrix(&[]);
        let spawn = Location::from_xy(30, 30);
        state.placement.plan_location(spawn, LocationType::Spawn);
        for x in 28..=32 {
            state.placement.plan_location(Location::from_xy(x, 28), LocationType::Road);
        }

        let ctx = PlanningContext {
            intel: &intel,
            pathfinder: &AStarPathfinder,
            min_cut: &DinicMinCut,
        };
        assert_eq!(SpawnWallStep.run(&mut state, &ctx), StepResult::Done);

        let plan = state.placement.plan();
        // Tiles at y = 29 touch the road, the rest of the ring does not.
        assert!(!plan.has(LocationType::SpawnBlocker, Location::from_xy(30, 29)));
        assert_eq!(plan.count(LocationType::SpawnBlocker), 5);
        assert!(plan.has(LocationType::SpawnBlocker, Location::from_xy(30, 31)));
        assert!(plan.is_obstacle(Location::from_xy(31, 31)));
    }
}
