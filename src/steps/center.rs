//! Room core placement.
//!
//! CorePositionStep picks the room center, its four entrances at distance 2
//! and the road cross joining them. The diagonal tiles around the center are
//! held back for CoreClusterStep, which puts the storage, terminal, core link
//! and first lab on them.

use crate::constants::*;
use crate::labels::*;
use crate::location::*;
use crate::step::*;
use crate::variation::*;
use log::*;

/// Cardinal offsets of the core entrances.
const ENTRANCE_OFFSETS: [(i8, i8); 4] = [(0, -2), (2, 0), (0, 2), (-2, 0)];

/// Road cross through the center.
const CROSS_OFFSETS: [(i8, i8); 5] = [(0, 0), (0, -1), (1, 0), (0, 1), (-1, 0)];

/// Hand-placed core structures.
const CORE_LAYOUT: [((i8, i8), LocationType); 4] = [
    ((-1, -1), LocationType::Storage),
    ((1, -1), LocationType::Terminal),
    ((-1, 1), LocationType::LinkStorage),
    ((1, 1), LocationType::Lab),
];

pub struct CorePositionStep;

impl CorePositionStep {
    fn points_of_interest(state: &BuilderState) -> Vec<Location> {
        state
            .controller
            .iter()
            .chain(state.exit_centers.iter())
            .chain(state.mineral.iter())
            .chain(state.sources.iter())
            .copied()
            .collect()
    }
}

impl PlanningStep for CorePositionStep {
    fn name(&self) -> &str {
        "core_position"
    }

    fn run(&self, state: &mut BuilderState, _ctx: &PlanningContext) -> StepResult {
        let placement = &state.placement;
        let usable = |loc: Location| {
            is_core_candidate(placement.terrain(), placement.fields(), loc)
                && placement.matrix().get(loc) < MATRIX_BUILDABLE_LIMIT
        };

        let requested = state.variation.center;
        let center = if usable(requested) {
            Some(requested)
        } else {
            let candidates: Vec<Location> = core_candidates(placement.terrain(), placement.fields())
                .into_iter()
                .filter(|loc| usable(*loc))
                .collect();
            weighted_center(&candidates, &Self::points_of_interest(state))
        };

        let center = match center {
            Some(center) => center,
            None => return StepResult::Failed("no valid core position".to_string()),
        };

        let entrances: Vec<Location> = ENTRANCE_OFFSETS
            .iter()
            .filter_map(|(dx, dy)| center.offset(*dx, *dy))
            .filter(|loc| state.placement.terrain().is_walkable(*loc) && !loc.is_border())
            .collect();
        if entrances.is_empty() {
            return StepResult::Failed(format!("core at {:?} has no entrance", center));
        }

        state.placement.plan_location(center, LocationType::Center);
        for (dx, dy) in CROSS_OFFSETS {
            if let Some(loc) = center.offset(dx, dy) {
                if state.placement.terrain().is_walkable(loc) {
                    state.placement.plan_location(loc, LocationType::Road);
                }
            }
        }
        for entrance in &entrances {
            state.placement.plan_location(*entrance, LocationType::Road);
        }
        for ((dx, dy), _) in CORE_LAYOUT {
            if let Some(loc) = center.offset(dx, dy) {
                state.placement.block_position(loc);
            }
        }

        debug!("{}: core at {:?} with {} entrances", state.room, center, entrances.len());
        state.center = Some(center);
        state.entrances = entrances;

        StepResult::Ok
    }
}

pub struct CoreClusterStep;

impl PlanningStep for CoreClusterStep {
    fn name(&self) -> &str {
        "core_cluster"
    }

    fn run(&self, state: &mut BuilderState, _ctx: &PlanningContext) -> StepResult {
        let center = match state.center {
            Some(center) => center,
            None => return StepResult::Failed("core position missing".to_string()),
        };

        let mut placed = 0;
        for ((dx, dy), role) in CORE_LAYOUT {
            let loc = match center.offset(dx, dy) {
                Some(loc) => loc,
                None => continue,
            };
            if !state.placement.terrain().is_walkable(loc) || loc.is_border() {
                continue;
            }
            if state.placement.plan_location(loc, role) {
                placed += 1;
            }
        }

        debug!("{}: {} core structures", state.room, placed);
        StepResult::Ok
    }
}
