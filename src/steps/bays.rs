//! Structures placed by walking outward from the core.
//!
//! All of these use the placement manager's spot search, seeded with the
//! room center and its entrances, so closer tiles are always taken first.
//! The walk that reached a spot becomes its access road.

use crate::constants::*;
use crate::labels::*;
use crate::location::*;
use crate::placement::BuildSpot;
use crate::step::*;
use crate::steps::fill_bay;
use log::*;

fn start_search(state: &mut BuilderState) -> Option<Location> {
    let center = state.center?;
    let entrances = state.entrances.clone();
    state.placement.start_building_placement(center, &entrances);
    Some(center)
}

/// Best bay center among the first `max_bay_probes` qualifying spots, scored
/// by free neighbors over walking distance.
fn find_bay(state: &mut BuilderState) -> Option<BuildSpot> {
    start_search(state)?;

    let mut best: Option<(f32, BuildSpot)> = None;
    let mut probes = 0;
    while probes < state.max_bay_probes {
        let spot = match state.placement.get_next_available_build_spot() {
            Some(spot) => spot,
            None => break,
        };
        let free = state.placement.free_neighbor_count(spot.location);
        if free < MIN_BAY_SIZE {
            continue;
        }
        probes += 1;

        let score = free as f32 / (spot.distance as f32 + BAY_DISTANCE_OFFSET);
        if best.as_ref().map(|(best_score, _)| score > *best_score).unwrap_or(true) {
            best = Some((score, spot));
        }
    }

    best.map(|(_, spot)| spot)
}

/// Claims the next free spot for `role`, with a road to it.
fn place_single(state: &mut BuilderState, role: LocationType) -> bool {
    if state.placement.remaining_quota(role) == 0 || start_search(state).is_none() {
        return false;
    }
    match state.placement.get_next_available_build_spot() {
        Some(spot) => {
            state.placement.plan_road(&spot.path, LocationType::Road);
            state.placement.plan_location(spot.location, role)
        }
        None => false,
    }
}

pub struct HelperParkingStep;

impl PlanningStep for HelperParkingStep {
    fn name(&self) -> &str {
        "helper_parking"
    }

    fn run(&self, state: &mut BuilderState, _ctx: &PlanningContext) -> StepResult {
        if !place_single(state, LocationType::HelperParking) {
            debug!("{}: no spot for helper parking", state.room);
        }
        StepResult::Ok
    }
}

/// Extension bays until the extension quota is used up. Bays also take any
/// link or spawn still allowed.
pub struct ExtensionBayStep;

impl PlanningStep for ExtensionBayStep {
    fn name(&self) -> &str {
        "extension_bays"
    }

    fn run(&self, state: &mut BuilderState, _ctx: &PlanningContext) -> StepResult {
        let mut bays = 0;
        while state.placement.remaining_quota(LocationType::ExtensionBay) > 0 {
            let spot = match find_bay(state) {
                Some(spot) => spot,
                None => break,
            };
            state.placement.plan_road(&spot.path, LocationType::Road);
            state.placement.plan_location(spot.location, LocationType::BayCenter);
            fill_bay(
                &mut state.placement,
                spot.location,
                &[LocationType::LinkBay, LocationType::Spawn],
                LocationType::ExtensionBay,
            );
            bays += 1;
        }

        debug!(
            "{}: {} extension bays, {} extensions",
            state.room,
            bays,
            state.placement.plan().count(LocationType::Extension)
        );
        StepResult::Ok
    }
}

/// Lab clusters around a shared road tile.
pub struct LabStep;

impl PlanningStep for LabStep {
    fn name(&self) -> &str {
        "labs"
    }

    fn run(&self, state: &mut BuilderState, _ctx: &PlanningContext) -> StepResult {
        while state.placement.remaining_quota(LocationType::Lab) > 0 {
            let spot = match find_bay(state) {
                Some(spot) => spot,
                None => break,
            };
            state.placement.plan_road(&spot.path, LocationType::Road);
            state.placement.plan_location(spot.location, LocationType::Road);
            if fill_bay(&mut state.placement, spot.location, &[], LocationType::Lab) == 0 {
                break;
            }
        }

        debug!("{}: {} labs", state.room, state.placement.plan().count(LocationType::Lab));
        StepResult::Ok
    }
}

/// Power spawn, nuker and observer.
pub struct SingleStructureStep;

impl PlanningStep for SingleStructureStep {
    fn name(&self) -> &str {
        "single_structures"
    }

    fn run(&self, state: &mut BuilderState, _ctx: &PlanningContext) -> StepResult {
        for role in [LocationType::PowerSpawn, LocationType::Nuker, LocationType::Observer] {
            if !place_single(state, role) {
                debug!("{}: no spot for {}", state.room, role);
            }
        }
        StepResult::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::min_cut::DinicMinCut;
    use crate::pathing::AStarPathfinder;
    use crate::steps::test_support::*;
    use crate::steps::*;
    use screeps::constants::StructureType;

    fn run_until_bays() -> BuilderState {
        let intel = open_intel();
        let mut state = state_for(&intel, Location::from_xy(25, 25));
        let ctx = PlanningContext {
            intel: &intel,
            pathfinder: &AStarPathfinder,
            min_cut: &DinicMinCut,
        };
        for step in default_steps().iter().take(12) {
            assert_eq!(step.run(&mut state, &ctx), StepResult::Ok, "{}", step.name());
        }
        state
    }

    #[test]
    fn quotas_are_filled_but_never_exceeded() {
        let state = run_until_bays();
        let plan = state.placement.plan();

        for (role, structure_type) in [
            (LocationType::Extension, StructureType::Extension),
            (LocationType::Spawn, StructureType::Spawn),
            (LocationType::Link, StructureType::Link),
            (LocationType::Lab, StructureType::Lab),
        ] {
            let quota = max_structures_at_rcl(structure_type, PLANNED_LEVEL) as usize;
            assert_eq!(plan.count(role), quota, "{}", role);
        }
        assert_eq!(plan.count(LocationType::PowerSpawn), 1);
        assert_eq!(plan.count(LocationType::Nuker), 1);
        assert_eq!(plan.count(LocationType::Observer), 1);
        assert_eq!(plan.count(LocationType::HelperParking), 1);
    }

    #[test]
    fn every_bay_center_is_reachable_by_road() {
        let state = run_until_bays();
        let plan = state.placement.plan();
        for center in plan.get_locations(LocationType::BayCenter) {
            assert!(center.neighbors().any(|n| plan.has(LocationType::Road, n)));
            assert!(center
                .neighbors()
                .filter(|n| plan.has(LocationType::Extension, *n))
                .count()
                >= 1);
        }
    }
}
