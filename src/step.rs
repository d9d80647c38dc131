//! Core types for the step pipeline.
//!
//! `BuilderState` is the progress state of one variation, mutated by each
//! step in turn. `PlanningStep` is the trait every step implements.

use crate::cost_matrix::*;
use crate::location::*;
use crate::min_cut::MinCutSolver;
use crate::pathing::*;
use crate::placement::PlacementManager;
use crate::room_data::*;
use crate::variation::VariationInfo;
use screeps::RoomName;

/// Outcome of running one step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepResult {
    /// Step finished, continue with the next one.
    Ok,
    /// The variation can't be completed.
    Failed(String),
    /// The pipeline is complete.
    Done,
}

/// Collaborators a step may call into. Borrowed for the duration of one tick.
#[derive(Copy, Clone)]
pub struct PlanningContext<'a> {
    pub intel: &'a dyn RoomIntel,
    pub pathfinder: &'a dyn GridPathfinder,
    pub min_cut: &'a dyn MinCutSolver,
}

/// A harvested source and the tile its harvester stands on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HarvestPosition {
    pub source: Location,
    pub harvester: Location,
}

/// Everything a variation accumulates while its steps run.
#[derive(Clone)]
pub struct BuilderState {
    pub room: RoomName,
    pub variation: VariationInfo,
    pub placement: PlacementManager,
    pub safety: ExitSafety,
    pub max_bay_probes: usize,

    pub sources: Vec<Location>,
    pub mineral: Option<Location>,
    pub controller: Option<Location>,

    pub exit_centers: Vec<Location>,
    pub center: Option<Location>,
    pub entrances: Vec<Location>,
    pub harvest_positions: Vec<HarvestPosition>,
    pub mineral_position: Option<Location>,
    pub upgrader_position: Option<Location>,
    /// 0 safe, 1 reachable from an unsafe exit, 2 within threat range of such a tile.
    pub safety_matrix: Option<CostMatrix>,
}

impl BuilderState {
    /// Goals for paths that should end next to the core.
    pub fn entrance_goals(&self) -> Vec<PathGoal> {
        self.entrances.iter().map(|e| PathGoal::new(*e, 0)).collect()
    }
}

/// One stage of the variation pipeline.
///
/// Steps are stateless, all progress lives in `BuilderState`. Running a step
/// must not depend on anything but the state and the context, so a step
/// re-run on the same inputs reproduces the same outcome.
pub trait PlanningStep {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    fn run(&self, state: &mut BuilderState, ctx: &PlanningContext) -> StepResult;
}
