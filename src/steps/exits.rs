//! ExitStep: collapses every run of exit tiles into one exit center.

use crate::labels::*;
use crate::step::*;
use log::*;

pub struct ExitStep;

impl PlanningStep for ExitStep {
    fn name(&self) -> &str {
        "exits"
    }

    fn run(&self, state: &mut BuilderState, _ctx: &PlanningContext) -> StepResult {
        let centers: Vec<_> = state
            .placement
            .terrain()
            .exit_centers()
            .into_iter()
            .map(|(_, loc)| loc)
            .collect();

        for center in &centers {
            state.placement.plan_location(*center, LocationType::Exit);
        }
        debug!("{}: {} exit centers", state.room, centers.len());
        state.exit_centers = centers;

        StepResult::Ok
    }
}
