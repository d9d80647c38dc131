//! TowerStep: greedy tower placement over the rampart perimeter.
//!
//! Every rampart carries a coverage weight, starting at 1. A candidate tower
//! tile scores the weighted effect it has on all ramparts. The best candidate
//! that still has a road to the core is placed, the weight of every rampart
//! it covers is discounted by `1 - 0.8 * effect`, and the process repeats
//! until the tower quota is met or no candidate is left.

use crate::constants::*;
use crate::labels::*;
use crate::location::*;
use crate::steps::ramparts::SAFE;
use crate::step::*;
use log::*;

/// Relative tower effect at a range: 1 up to the optimal range, falling
/// linearly to 0 at the falloff range.
pub fn tower_effect(range: u8) -> f32 {
    let clamped = range.clamp(TOWER_OPTIMAL_RANGE, TOWER_FALLOFF_RANGE);
    1.0 - (clamped - TOWER_OPTIMAL_RANGE) as f32 / (TOWER_FALLOFF_RANGE - TOWER_OPTIMAL_RANGE) as f32
}

pub struct TowerStep;

impl TowerStep {
    fn candidates(state: &BuilderState, ramparts: &[Location], weights: &[f32]) -> Vec<(Location, f32)> {
        let plan = state.placement.plan();
        let safe = |loc: Location| {
            state
                .safety_matrix
                .as_ref()
                .map(|m| m.get(loc) == SAFE)
                .unwrap_or(true)
        };

        let mut candidates: Vec<(Location, f32)> = Location::all()
            .filter(|loc| state.placement.is_buildable_tile(*loc, false))
            .filter(|loc| safe(*loc) && !plan.has(LocationType::Rampart, *loc))
            .map(|loc| {
                let score = ramparts
                    .iter()
                    .zip(weights)
                    .map(|(rampart, weight)| weight * tower_effect(loc.distance_to(*rampart)))
                    .sum();
                (loc, score)
            })
            .collect();

        candidates.sort_by(|(a, a_score), (b, b_score)| {
            b_score
                .total_cmp(a_score)
                .then(a.linear_index().cmp(&b.linear_index()))
        });
        candidates
    }
}

impl PlanningStep for TowerStep {
    fn name(&self) -> &str {
        "towers"
    }

    #[cfg_attr(feature = "profile", screeps_timing_annotate::timing)]
    fn run(&self, state: &mut BuilderState, ctx: &PlanningContext) -> StepResult {
        let ramparts = state.placement.plan().get_locations(LocationType::Rampart);
        if ramparts.is_empty() {
            debug!("{}: no ramparts, no towers", state.room);
            return StepResult::Ok;
        }

        let goals = state.entrance_goals();
        let mut weights = vec![1.0f32; ramparts.len()];
        let mut placed = 0;

        while state.placement.remaining_quota(LocationType::Tower) > 0 {
            let mut tower = None;
            for (candidate, _) in Self::candidates(state, &ramparts, &weights) {
                state.placement.plan_temporary_location(candidate, LocationType::Tower);
                let road = state.placement.find_access_road(ctx.pathfinder, candidate, &goals);
                if road.is_complete() {
                    state.placement.commit_temporary_location(LocationType::Tower);
                    state.placement.plan_road(&road.path, LocationType::Road);
                    tower = Some(candidate);
                    break;
                }
                state.placement.discard_temporary_locations(LocationType::Tower);
            }

            let tower = match tower {
                Some(tower) => tower,
                None => break,
            };
            for (rampart, weight) in ramparts.iter().zip(weights.iter_mut()) {
                *weight *= 1.0 - TOWER_COVERAGE_DISCOUNT * tower_effect(tower.distance_to(*rampart));
            }
            placed += 1;
        }

        debug!("{}: {} towers", state.room, placed);
        StepResult::Ok
    }
}
