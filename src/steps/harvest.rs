//! Source and mineral harvesting.
//!
//! HarvestPositionStep picks where harvesters stand: next to each source, the
//! walkable tile whose own neighborhood has the most room left for a bay, and
//! for the mineral, the first tile of the road toward the core.
//!
//! HarvestBayStep lays the source roads, puts a container under every
//! harvester and fills the tiles around it with a link, an optional spawn and
//! extensions. It also places the extractor, mineral container and road.

use crate::constants::*;
use crate::labels::*;
use crate::location::*;
use crate::placement::PlacementManager;
use crate::step::*;
use crate::steps::fill_bay;
use log::*;

/// Walkable tile next to `target` with the most free tiles around it.
fn best_adjacent_tile(placement: &PlacementManager, target: Location) -> Option<Location> {
    let standable = |loc: Location| {
        placement.terrain().is_walkable(loc) && !loc.is_border() && placement.matrix().get(loc) < MATRIX_RESERVED
    };
    let free = |loc: Location| {
        placement.terrain().is_walkable(loc)
            && !loc.is_border()
            && placement.matrix().get(loc) < MATRIX_BUILDABLE_LIMIT
    };

    target
        .neighbors()
        .filter(|loc| standable(*loc))
        .map(|loc| (loc, loc.neighbors().filter(|n| free(*n)).count()))
        .max_by(|(a, a_free), (b, b_free)| {
            a_free
                .cmp(b_free)
                .then(b.linear_index().cmp(&a.linear_index()))
        })
        .map(|(loc, _)| loc)
}

pub struct HarvestPositionStep;

impl PlanningStep for HarvestPositionStep {
    fn name(&self) -> &str {
        "harvest_positions"
    }

    fn run(&self, state: &mut BuilderState, ctx: &PlanningContext) -> StepResult {
        let mut positions = Vec::new();
        for source in state.sources.clone() {
            let harvester = match best_adjacent_tile(&state.placement, source) {
                Some(loc) => loc,
                None => return StepResult::Failed(format!("source at {:?} has no harvest position", source)),
            };
            state.placement.plan_location(harvester, LocationType::Harvester);
            positions.push(HarvestPosition { source, harvester });
        }
        state.harvest_positions = positions;

        if let Some(mineral) = state.mineral {
            let goals = state.entrance_goals();
            let road = state.placement.find_access_road(ctx.pathfinder, mineral, &goals);
            let position = road
                .path
                .first()
                .copied()
                .filter(|_| road.is_complete())
                .or_else(|| best_adjacent_tile(&state.placement, mineral));

            match position {
                Some(loc) => {
                    state.placement.plan_location(loc, LocationType::HarvesterMineral);
                    state.mineral_position = Some(loc);
                }
                None => warn!("{}: mineral at {:?} can't be reached", state.room, mineral),
            }
        }

        debug!(
            "{}: {} harvest positions, mineral position {:?}",
            state.room,
            state.harvest_positions.len(),
            state.mineral_position
        );
        StepResult::Ok
    }
}

pub struct HarvestBayStep;

impl PlanningStep for HarvestBayStep {
    fn name(&self) -> &str {
        "harvest_bays"
    }

    fn run(&self, state: &mut BuilderState, ctx: &PlanningContext) -> StepResult {
        let goals = state.entrance_goals();

        for (index, position) in state.harvest_positions.clone().into_iter().enumerate() {
            let road = state.placement.find_access_road(ctx.pathfinder, position.harvester, &goals);
            if road.is_complete() {
                state.placement.plan_road(&road.path, LocationType::RoadSource);
            } else {
                debug!("{}: no road from source {:?}", state.room, position.source);
            }

            state.placement.plan_location(position.harvester, LocationType::ContainerSource);

            let mut first = vec![LocationType::LinkSource];
            if state.variation.spawn_sources.get(index).copied().unwrap_or(false) {
                first.push(LocationType::Spawn);
            }
            let placed = fill_bay(&mut state.placement, position.harvester, &first, LocationType::ExtensionHarvester);
            debug!("{}: harvest bay at {:?} holds {} structures", state.room, position.harvester, placed);
        }

        if let (Some(mineral), Some(position)) = (state.mineral, state.mineral_position) {
            state.placement.plan_location(mineral, LocationType::Extractor);
            state.placement.plan_location(position, LocationType::ContainerMineral);
            let road = state.placement.find_access_road(ctx.pathfinder, position, &goals);
            if road.is_complete() {
                state.placement.plan_road(&road.path, LocationType::RoadMineral);
            }
        }

        StepResult::Ok
    }
}
