//! RoadNetworkStep: roads from every exit center and from the upgrader to the
//! core entrances. Each road lowers the matrix to road cost so later roads
//! merge into it.

use crate::labels::*;
use crate::step::*;
use log::*;

pub struct RoadNetworkStep;

impl PlanningStep for RoadNetworkStep {
    fn name(&self) -> &str {
        "road_network"
    }

    fn run(&self, state: &mut BuilderState, ctx: &PlanningContext) -> StepResult {
        let goals = state.entrance_goals();
        let mut roads = 0;

        for exit in state.exit_centers.clone() {
            let road = state.placement.find_access_road(ctx.pathfinder, exit, &goals);
            if road.is_complete() {
                state.placement.plan_road(&road.path, LocationType::RoadExit);
                roads += 1;
            } else {
                debug!("{}: exit {:?} is cut off from the core", state.room, exit);
            }
        }

        if let Some(upgrader) = state.upgrader_position {
            let road = state.placement.find_access_road(ctx.pathfinder, upgrader, &goals);
            if road.is_complete() {
                state.placement.plan_road(&road.path, LocationType::RoadController);
                roads += 1;
            } else {
                debug!("{}: upgrader {:?} is cut off from the core", state.room, upgrader);
            }
        }

        debug!("{}: {} roads to the core", state.room, roads);
        StepResult::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::*;
    use crate::min_cut::DinicMinCut;
    use crate::pathing::AStarPathfinder;
    use crate::steps::test_support::*;
    use crate::steps::*;

    #[test]
    fn every_exit_gets_a_road() {
        let intel = open_intel();
        let mut state = state_for(&intel, Location::from_xy(25, 25));
        let ctx = PlanningContext {
            intel: &intel,
            pathfinder: &AStarPathfinder,
            min_cut: &DinicMinCut,
        };
        for step in [
            &PrepareMatrixStep as &dyn PlanningStep,
            &ExitStep,
            &CorePositionStep,
            &UpgraderStep,
            &RoadNetworkStep,
        ] {
            assert_eq!(step.run(&mut state, &ctx), StepResult::Ok);
        }

        let plan = state.placement.plan();
        assert_eq!(state.exit_centers.len(), 4);
        for exit in &state.exit_centers {
            assert!(plan
                .get_locations(LocationType::RoadExit)
                .iter()
                .any(|road| road.distance_to(*exit) == 1));
        }
        assert!(plan.has_any(LocationType::RoadController));
        // Every specialised road is also a plain road.
        for road in plan.get_locations(LocationType::RoadExit) {
            assert!(plan.has(LocationType::Road, road));
        }
    }
}
