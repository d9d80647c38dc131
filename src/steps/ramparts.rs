//! RampartStep: fortification perimeter.
//!
//! Every planned role with a protect radius contributes a square of tiles
//! that must end up inside the perimeter. The min-cut solver separates them
//! from the exits of the unsafe sides, then the cut is pruned down to the
//! tiles that actually border both the interior and the exterior.
//!
//! The safety matrix records the outcome: 0 for tiles inside, 1 for tiles an
//! attacker can reach, 2 for inside tiles within range of such a tile.

use crate::constants::*;
use crate::cost_matrix::*;
use crate::distance::flood_fill;
use crate::labels::*;
use crate::location::*;
use crate::min_cut::Rect;
use crate::step::*;
use fnv::FnvHashSet;
use log::*;

pub const SAFE: u8 = 0;
pub const EXPOSED: u8 = 1;
pub const THREATENED: u8 = 2;

pub struct RampartStep;

impl RampartStep {
    /// Tiles the perimeter has to enclose, one rect each. Tiles on the border
    /// or next to an exit can't be separated from it and stay outside.
    fn protected_regions(state: &BuilderState) -> Vec<Rect> {
        let plan = state.placement.plan();
        let terrain = state.placement.terrain();
        let exits: FnvHashSet<Location> = terrain.get_exits().into_iter().collect();
        let enclosable = |loc: &Location| !loc.is_border() && !loc.neighbors().any(|n| exits.contains(&n));

        let mut tiles: FnvHashSet<Location> = FnvHashSet::default();
        for label in plan.labels() {
            let radius = match label.info().protect_radius {
                Some(radius) => radius,
                None => continue,
            };
            for loc in plan.get_locations(label) {
                tiles.extend(Rect::around(loc, radius).tiles().filter(|tile| enclosable(tile)));
            }
        }

        let mut tiles: Vec<Location> = tiles.into_iter().collect();
        tiles.sort();
        tiles.into_iter().map(|tile| Rect::around(tile, 0)).collect()
    }

    fn safety_matrix(exterior: &[bool]) -> CostMatrix {
        let mut matrix = CostMatrix::new(SAFE);
        for loc in Location::all().filter(|l| exterior[l.linear_index()]) {
            matrix.set(loc, EXPOSED);
        }
        for loc in Location::all().filter(|l| exterior[l.linear_index()]) {
            for near in loc.area(RAMPART_THREAT_RANGE) {
                if matrix.get(near) == SAFE {
                    matrix.set(near, THREATENED);
                }
            }
        }
        matrix
    }
}

impl PlanningStep for RampartStep {
    fn name(&self) -> &str {
        "ramparts"
    }

    #[cfg_attr(feature = "profile", screeps_timing_annotate::timing)]
    fn run(&self, state: &mut BuilderState, ctx: &PlanningContext) -> StepResult {
        if state.safety.all_directions_safe() {
            debug!("{}: all directions safe, no ramparts", state.room);
            state.safety_matrix = Some(CostMatrix::new(SAFE));
            return StepResult::Ok;
        }

        let regions = Self::protected_regions(state);
        let cut = match ctx.min_cut.cut_tiles(state.placement.terrain(), &regions, &state.safety) {
            Ok(cut) => cut,
            Err(err) => return StepResult::Failed(err.to_string()),
        };

        let terrain = state.placement.terrain();
        let cut_set: FnvHashSet<Location> = cut.iter().copied().collect();
        let open = |loc: Location| terrain.is_walkable(loc) && !cut_set.contains(&loc);

        let interior_seeds: Vec<Location> = regions
            .iter()
            .flat_map(|rect| rect.tiles())
            .filter(|loc| open(*loc))
            .collect();
        let interior = flood_fill(interior_seeds, open);

        let unsafe_exits: Vec<Location> = state
            .safety
            .unsafe_sides()
            .flat_map(|side| terrain.get_side_exits(side))
            .filter(|loc| !cut_set.contains(loc))
            .collect();
        let exterior = flood_fill(unsafe_exits, open);

        let kept: Vec<Location> = cut
            .iter()
            .copied()
            .filter(|loc| {
                loc.neighbors().any(|n| interior[n.linear_index()])
                    && loc.neighbors().any(|n| exterior[n.linear_index()])
            })
            .collect();

        let safety_matrix = Self::safety_matrix(&exterior);
        for loc in &kept {
            state.placement.plan_location(*loc, LocationType::Rampart);
        }

        debug!(
            "{}: {} rampart tiles ({} before pruning)",
            state.room,
            kept.len(),
            cut.len()
        );
        state.safety_matrix = Some(safety_matrix);
        StepResult::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlannerError;
    use crate::min_cut::{DinicMinCut, MinCutSolver};
    use crate::pathing::AStarPathfinder;
    use crate::room_data::ExitSafety;
    use crate::steps::test_support::*;
    use crate::steps::*;
    use crate::terrain::FastRoomTerrain;

    /// Solver that adds a tile no attacker can ever reach on top of a real cut.
    struct PaddedMinCut;

    impl MinCutSolver for PaddedMinCut {
        fn cut_tiles(
            &self,
            terrain: &FastRoomTerrain,
            protected: &[Rect],
            safety: &ExitSafety,
        ) -> Result<Vec<Location>, PlannerError> {
            let mut cut = DinicMinCut.cut_tiles(terrain, protected, safety)?;
            cut.push(Location::from_xy(25, 25));
            Ok(cut)
        }
    }

    #[test]
    fn perimeter_separates_core_from_unsafe_exits() {
        let mut intel = open_intel();
        intel.safety = ExitSafety {
            top: false,
            ..ExitSafety::all_safe()
        };
        let mut state = state_for(&intel, Location::from_xy(25, 25));
        let ctx = PlanningContext {
            intel: &intel,
            pathfinder: &AStarPathfinder,
            min_cut: &PaddedMinCut,
        };
        for step in default_steps().iter().take(13) {
            assert_eq!(step.run(&mut state, &ctx), StepResult::Ok, "{}", step.name());
        }

        let plan = state.placement.plan();
        let ramparts = plan.get_locations(LocationType::Rampart);
        assert!(!ramparts.is_empty());
        // The padded tile sits in the core and protects nothing.
        assert!(!plan.has(LocationType::Rampart, Location::from_xy(25, 25)));

        let safety = state.safety_matrix.as_ref().unwrap();
        assert_eq!(safety.get(Location::from_xy(25, 25)), SAFE);
        assert_eq!(safety.get(Location::from_xy(22, 1)), EXPOSED);
        for storage in plan.get_locations(LocationType::Storage) {
            assert_eq!(safety.get(storage), SAFE);
        }
    }

    #[test]
    fn roles_next_to_an_unsafe_exit_stay_outside() {
        let mut intel = open_intel();
        intel.safety = ExitSafety {
            left: false,
            ..ExitSafety::all_safe()
        };
        let mut state = state_for(&intel, Location::from_xy(25, 25));
        let ctx = PlanningContext {
            intel: &intel,
            pathfinder: &AStarPathfinder,
            min_cut: &DinicMinCut,
        };
        for step in default_steps().iter().take(12) {
            assert_eq!(step.run(&mut state, &ctx), StepResult::Ok, "{}", step.name());
        }

        let harvester = Location::from_xy(1, 22);
        state.placement.plan_location(harvester, LocationType::Harvester);
        state.placement.plan_location(Location::from_xy(2, 22), LocationType::RoadSource);

        assert_eq!(RampartStep.run(&mut state, &ctx), StepResult::Ok);
        let plan = state.placement.plan();
        assert!(plan.has_any(LocationType::Rampart));
        assert!(!plan.has(LocationType::Rampart, harvester));

        let safety = state.safety_matrix.as_ref().unwrap();
        assert_eq!(safety.get(harvester), EXPOSED);
        for storage in plan.get_locations(LocationType::Storage) {
            assert_eq!(safety.get(storage), SAFE);
        }
    }

    #[test]
    fn safe_rooms_skip_the_perimeter() {
        let intel = open_intel();
        let mut state = state_for(&intel, Location::from_xy(25, 25));
        let ctx = PlanningContext {
            intel: &intel,
            pathfinder: &AStarPathfinder,
            min_cut: &DinicMinCut,
        };
        for step in default_steps().iter().take(13) {
            assert_eq!(step.run(&mut state, &ctx), StepResult::Ok);
        }
        assert!(!state.placement.plan().has_any(LocationType::Rampart));
        assert_eq!(state.safety_matrix.as_ref().map(|m| m.get(Location::from_xy(22, 1))), Some(SAFE));
    }
}
