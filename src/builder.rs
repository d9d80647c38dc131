//! Runs the step pipeline for one variation, one step per call.

use crate::distance::DistanceFields;
use crate::placement::PlacementManager;
use crate::room_data::*;
use crate::room_plan::RoomPlan;
use crate::step::*;
use crate::steps::default_steps;
use crate::variation::VariationInfo;
use log::*;
use screeps::RoomName;

/// Settings shared by every variation of a room.
#[derive(Copy, Clone, Debug)]
pub struct BuilderSettings {
    pub planned_level: u8,
    pub max_bay_probes: usize,
    /// Adjacent room safety, sampled once when planning starts.
    pub safety: ExitSafety,
}

pub struct VariationBuilder {
    key: String,
    steps: Vec<Box<dyn PlanningStep>>,
    step_index: usize,
    state: BuilderState,
    finished: bool,
    failure: Option<String>,
}

impl VariationBuilder {
    /// Builder for one variation, or `None` if the room has no terrain.
    pub fn new(
        room: RoomName,
        key: &str,
        variation: VariationInfo,
        intel: &dyn RoomIntel,
        fields: &DistanceFields,
        settings: BuilderSettings,
    ) -> Option<Self> {
        let terrain = intel.terrain(room)?.clone();
        let state = BuilderState {
            room,
            variation,
            placement: PlacementManager::new(terrain, fields.clone(), settings.planned_level),
            safety: settings.safety,
            max_bay_probes: settings.max_bay_probes,
            sources: intel.source_positions(room),
            mineral: intel.mineral_position(room),
            controller: intel.controller_position(room),
            exit_centers: Vec::new(),
            center: None,
            entrances: Vec::new(),
            harvest_positions: Vec::new(),
            mineral_position: None,
            upgrader_position: None,
            safety_matrix: None,
        };

        Some(VariationBuilder {
            key: key.to_string(),
            steps: default_steps(),
            step_index: 0,
            state,
            finished: false,
            failure: None,
        })
    }

    /// Replace the pipeline, for callers that plan with their own steps.
    pub fn with_steps(mut self, steps: Vec<Box<dyn PlanningStep>>) -> Self {
        self.steps = steps;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> &BuilderState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Name of the next step to run.
    pub fn current_step(&self) -> Option<&str> {
        self.steps.get(self.step_index).map(|step| step.name())
    }

    /// Run exactly one step.
    pub fn advance(&mut self, ctx: &PlanningContext) -> StepResult {
        if let Some(reason) = &self.failure {
            return StepResult::Failed(reason.clone());
        }
        if self.finished {
            return StepResult::Done;
        }

        let step = match self.steps.get(self.step_index) {
            Some(step) => step,
            None => {
                self.finished = true;
                return StepResult::Done;
            }
        };

        let result = step.run(&mut self.state, ctx);
        debug!("{} [{}]: step {} -> {:?}", self.state.room, self.key, step.name(), result);
        self.step_index += 1;

        match result {
            StepResult::Ok if self.step_index >= self.steps.len() => {
                self.finished = true;
                StepResult::Done
            }
            StepResult::Ok => StepResult::Ok,
            StepResult::Done => {
                self.finished = true;
                StepResult::Done
            }
            StepResult::Failed(reason) => {
                self.failure = Some(reason.clone());
                StepResult::Failed(reason)
            }
        }
    }

    /// The finished plan, once every step has run.
    pub fn into_plan(self) -> Option<RoomPlan> {
        if self.finished && self.failure.is_none() {
            Some(self.state.placement.into_plan())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::labels::*;
    use crate::location::*;
    use crate::min_cut::DinicMinCut;
    use crate::pathing::AStarPathfinder;
    use crate::steps::test_support::*;

    struct FailingStep;

    impl PlanningStep for FailingStep {
        fn name(&self) -> &str {
            "failing"
        }

        fn run(&self, _state: &mut BuilderState, _ctx: &PlanningContext) -> StepResult {
            StepResult::Failed("nope".to_string())
        }
    }

    fn builder(intel: &StaticRoomIntel) -> VariationBuilder {
        let fields = DistanceFields::generate(&intel.terrain);
        let variation = VariationInfo {
            center: Location::from_xy(25, 25),
            spawn_sources: vec![true, false],
        };
        let settings = BuilderSettings {
            planned_level: PLANNED_LEVEL,
            max_bay_probes: MAX_BAY_PROBES,
            safety: intel.safety,
        };
        VariationBuilder::new(intel.room, "weighted:+-", variation, intel, &fields, settings).unwrap()
    }

    #[test]
    fn one_step_per_advance() {
        let intel = open_intel();
        let ctx = PlanningContext {
            intel: &intel,
            pathfinder: &AStarPathfinder,
            min_cut: &DinicMinCut,
        };
        let mut builder = builder(&intel);
        let total = default_steps().len();

        let mut calls = 0;
        loop {
            calls += 1;
            match builder.advance(&ctx) {
                StepResult::Ok => assert!(!builder.is_finished()),
                StepResult::Done => break,
                StepResult::Failed(reason) => panic!("failed: {}", reason),
            }
        }
        assert_eq!(calls, total);
        assert_eq!(builder.advance(&ctx), StepResult::Done);

        let plan = builder.into_plan().unwrap();
        assert_eq!(plan.count(LocationType::Center), 1);
        assert_eq!(plan.count(LocationType::Spawn), 3);
    }

    #[test]
    fn failure_is_sticky() {
        let intel = open_intel();
        let ctx = PlanningContext {
            intel: &intel,
            pathfinder: &AStarPathfinder,
            min_cut: &DinicMinCut,
        };
        let mut builder = builder(&intel).with_steps(vec![Box::new(FailingStep)]);
        assert_eq!(builder.current_step(), Some("failing"));
        assert!(matches!(builder.advance(&ctx), StepResult::Failed(_)));
        assert_eq!(builder.failure(), Some("nope"));
        assert!(matches!(builder.advance(&ctx), StepResult::Failed(_)));
        assert!(builder.into_plan().is_none());
    }

    #[test]
    fn unknown_rooms_have_no_builder() {
        let intel = open_intel();
        let fields = DistanceFields::generate(&intel.terrain);
        let settings = BuilderSettings {
            planned_level: PLANNED_LEVEL,
            max_bay_probes: MAX_BAY_PROBES,
            safety: intel.safety,
        };
        let other: RoomName = "E5S5".parse().unwrap();
        let variation = VariationInfo {
            center: Location::from_xy(25, 25),
            spawn_sources: Vec::new(),
        };
        assert!(VariationBuilder::new(other, "weighted:", variation, &intel, &fields, settings).is_none());
    }
}
