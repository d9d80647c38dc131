//! PrepareMatrixStep: seeds the building matrix.
//!
//! Walls and the room border are impassable, sources, the mineral and the
//! controller are blocked, tiles touching a wall or close to an exit are
//! discouraged so roads avoid corners and exposed ground.

use crate::location::*;
use crate::step::*;
use log::*;

pub struct PrepareMatrixStep;

impl PlanningStep for PrepareMatrixStep {
    fn name(&self) -> &str {
        "prepare_matrix"
    }

    fn run(&self, state: &mut BuilderState, _ctx: &PlanningContext) -> StepResult {
        let blocked: Vec<Location> = state
            .sources
            .iter()
            .copied()
            .chain(state.mineral)
            .chain(state.controller)
            .collect();

        state.placement.prepare_building_matrix(&blocked);
        debug!("{}: building matrix ready, {} points blocked", state.room, blocked.len());

        StepResult::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::min_cut::DinicMinCut;
    use crate::pathing::AStarPathfinder;
    use crate::steps::test_support::*;

    #[test]
    fn points_of_interest_are_blocked() {
        let intel = open_intel();
        let mut state = state_for(&intel, Location::from_xy(25, 25));
        let ctx = PlanningContext {
            intel: &intel,
            pathfinder: &AStarPathfinder,
            min_cut: &DinicMinCut,
        };
        assert_eq!(PrepareMatrixStep.run(&mut state, &ctx), StepResult::Ok);

        let matrix = state.placement.matrix();
        assert_eq!(matrix.get(Location::from_xy(12, 12)), MATRIX_OBSTACLE);
        assert_eq!(matrix.get(Location::from_xy(12, 38)), MATRIX_OBSTACLE);
        assert_eq!(matrix.get(Location::from_xy(0, 5)), MATRIX_OBSTACLE);
        assert_eq!(matrix.get(Location::from_xy(1, 5)), MATRIX_DISCOURAGED);
        assert_eq!(matrix.get(Location::from_xy(25, 25)), MATRIX_FREE);
    }
}
