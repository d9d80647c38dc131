//! The variation pipeline, one module per stage.

pub mod bays;
pub mod center;
pub mod exits;
pub mod harvest;
pub mod prepare;
pub mod ramparts;
pub mod roads;
pub mod spawn_walls;
pub mod towers;
pub mod upgrader;

pub use self::bays::{ExtensionBayStep, HelperParkingStep, LabStep, SingleStructureStep};
pub use self::center::{CoreClusterStep, CorePositionStep};
pub use self::exits::ExitStep;
pub use self::harvest::{HarvestBayStep, HarvestPositionStep};
pub use self::prepare::PrepareMatrixStep;
pub use self::ramparts::RampartStep;
pub use self::roads::RoadNetworkStep;
pub use self::spawn_walls::SpawnWallStep;
pub use self::towers::{tower_effect, TowerStep};
pub use self::upgrader::UpgraderStep;

use crate::labels::*;
use crate::location::*;
use crate::placement::PlacementManager;
use crate::step::PlanningStep;

/// Build the default pipeline.
///
/// 1. PrepareMatrixStep -- building matrix from terrain and distance fields
/// 2. ExitStep -- one exit center per run of exit tiles
/// 3. CorePositionStep -- room center, entrances and road cross
/// 4. HarvestPositionStep -- where source and mineral harvesters stand
/// 5. UpgraderStep -- upgrader tile, controller container and link
/// 6. RoadNetworkStep -- exits and controller to the core
/// 7. HarvestBayStep -- source roads, containers and bays, mineral infrastructure
/// 8. CoreClusterStep -- storage, terminal, core link and lab
/// 9. HelperParkingStep, ExtensionBayStep, LabStep, SingleStructureStep
/// 10. RampartStep -- min-cut perimeter and safety matrix
/// 11. TowerStep -- greedy rampart coverage
/// 12. SpawnWallStep -- walls next to spawns
pub fn default_steps() -> Vec<Box<dyn PlanningStep>> {
    vec![
        Box::new(PrepareMatrixStep),
        Box::new(ExitStep),
        Box::new(CorePositionStep),
        Box::new(HarvestPositionStep),
        Box::new(UpgraderStep),
        Box::new(RoadNetworkStep),
        Box::new(HarvestBayStep),
        Box::new(CoreClusterStep),
        Box::new(HelperParkingStep),
        Box::new(ExtensionBayStep),
        Box::new(LabStep),
        Box::new(SingleStructureStep),
        Box::new(RampartStep),
        Box::new(TowerStep),
        Box::new(SpawnWallStep),
    ]
}

/// Fill the buildable neighbors of a bay center. Each role in `first` is used
/// once, in order, while its quota lasts, the remaining tiles get `rest`.
/// Returns the number of structures placed.
pub(crate) fn fill_bay(
    placement: &mut PlacementManager,
    center: Location,
    first: &[LocationType],
    rest: LocationType,
) -> usize {
    let mut pending: Vec<LocationType> = first.to_vec();
    let mut placed = 0;

    let slots: Vec<Location> = center
        .neighbors()
        .filter(|n| placement.is_buildable_tile(*n, false))
        .collect();

    for slot in slots {
        pending.retain(|role| placement.remaining_quota(*role) > 0);
        let role = if pending.is_empty() {
            rest
        } else {
            pending.remove(0)
        };
        if placement.remaining_quota(role) == 0 {
            break;
        }
        if placement.plan_location(slot, role) {
            placed += 1;
        }
    }

    placed
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn bay_roles_follow_quotas() {
        let intel = open_intel();
        let mut state = state_for(&intel, Location::from_xy(25, 25));
        state.placement.prepare_building_matrix(&[]);

        let placed = fill_bay(
            &mut state.placement,
            Location::from_xy(25, 25),
            &[LocationType::LinkBay, LocationType::Spawn],
            LocationType::ExtensionBay,
        );
        assert_eq!(placed, 8);
        let plan = state.placement.plan();
        assert_eq!(plan.count(LocationType::LinkBay), 1);
        assert_eq!(plan.count(LocationType::Spawn), 1);
        assert_eq!(plan.count(LocationType::ExtensionBay), 6);
        assert_eq!(plan.count(LocationType::Extension), 6);
    }

    #[test]
    fn exhausted_roles_are_skipped() {
        let intel = open_intel();
        let mut state = state_for(&intel, Location::from_xy(25, 25));
        state.placement.prepare_building_matrix(&[]);
        for x in 5..8 {
            state.placement.plan_location(Location::from_xy(x, 5), LocationType::Spawn);
        }
        assert_eq!(state.placement.remaining_quota(LocationType::Spawn), 0);

        fill_bay(
            &mut state.placement,
            Location::from_xy(25, 25),
            &[LocationType::Spawn],
            LocationType::ExtensionBay,
        );
        assert_eq!(state.placement.plan().count(LocationType::ExtensionBay), 8);
        assert!(state.placement.plan().count(LocationType::Spawn) <= 3);
    }
}
