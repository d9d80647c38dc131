//! UpgraderStep: where the upgrader works.
//!
//! The upgrader stands on the first tile of the path from the controller to
//! the core. It shares the tile with the controller container, the controller
//! link goes on a free tile next to it.

use crate::labels::*;
use crate::step::*;
use log::*;

pub struct UpgraderStep;

impl PlanningStep for UpgraderStep {
    fn name(&self) -> &str {
        "upgrader"
    }

    fn run(&self, state: &mut BuilderState, ctx: &PlanningContext) -> StepResult {
        let controller = match state.controller {
            Some(controller) => controller,
            None => {
                debug!("{}: no controller, skipping upgrader", state.room);
                return StepResult::Ok;
            }
        };

        let goals = state.entrance_goals();
        let road = state.placement.find_access_road(ctx.pathfinder, controller, &goals);
        let position = road.path.first().copied().filter(|_| road.is_complete()).or_else(|| {
            controller
                .neighbors()
                .find(|n| state.placement.is_buildable_tile(*n, true))
        });

        let position = match position {
            Some(position) => position,
            None => return StepResult::Failed(format!("controller at {:?} can't be reached", controller)),
        };

        state.placement.plan_location(position, LocationType::Upgrader);
        state.placement.plan_location(position, LocationType::ContainerController);

        let link = position
            .neighbors()
            .filter(|n| state.placement.is_buildable_tile(*n, false))
            .min_by_key(|n| (n.distance_to(controller), n.linear_index()));
        match link {
            Some(link) => {
                state.placement.plan_location(link, LocationType::LinkController);
            }
            None => debug!("{}: no room for a controller link", state.room),
        }

        state.upgrader_position = Some(position);
        debug!("{}: upgrader at {:?}", state.room, position);
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
    fn upgrader_sits_next_to_the_controller() {
        let intel = open_intel();
        let mut state = state_for(&intel, Location::from_xy(25, 25));
        let ctx = PlanningContext {
            intel: &intel,
            pathfinder: &AStarPathfinder,
            min_cut: &DinicMinCut,
        };
        for step in [&PrepareMatrixStep as &dyn PlanningStep, &ExitStep, &CorePositionStep, &UpgraderStep] {
            assert_eq!(step.run(&mut state, &ctx), StepResult::Ok);
        }

        let upgrader = state.upgrader_position.unwrap();
        let controller = Location::from_xy(12, 38);
        assert_eq!(upgrader.distance_to(controller), 1);
        let plan = state.placement.plan();
        assert!(plan.has(LocationType::ContainerController, upgrader));
        assert!(plan.has(LocationType::Container, upgrader));
        let link = plan.get_locations(LocationType::LinkController)[0];
        assert_eq!(link.distance_to(upgrader), 1);
        assert!(link.distance_to(controller) <= 2);
    }
}
