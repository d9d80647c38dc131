pub const ROOM_WIDTH: u8 = 50;
pub const ROOM_HEIGHT: u8 = 50;
pub const ROOM_AREA: usize = ROOM_WIDTH as usize * ROOM_HEIGHT as usize;

/// Bump whenever planning output changes in a way that invalidates stored plans.
pub const PLANNER_VERSION: u32 = 3;

/// Controller level whose structure quotas are planned for.
pub const PLANNED_LEVEL: u8 = 8;

/// Game ticks between re-checks of adjacent room safety.
pub const SAFETY_CHECK_INTERVAL: u32 = 100;

/// Maximum candidates probed when looking for a bay spot.
pub const MAX_BAY_PROBES: usize = 8;

// Building matrix values.
pub const MATRIX_FREE: u8 = 0;
pub const MATRIX_ROAD: u8 = 1;
pub const MATRIX_DISCOURAGED: u8 = 10;
/// Anything above this is spoken for and can't be built on.
pub const MATRIX_BUILDABLE_LIMIT: u8 = 100;
/// Walkable, but reserved for a creep or a walkable structure.
pub const MATRIX_RESERVED: u8 = 150;
pub const MATRIX_OBSTACLE: u8 = 255;

/// Tiles this close to an exit (exit distance) are never built on.
pub const EXIT_BUILD_DISTANCE: u8 = 5;

/// Core candidate tiers: (minimum wall distance, exit distance must exceed).
pub const CORE_CANDIDATE_TIERS: [(u8, u8); 4] = [(4, 8), (3, 5), (2, 2), (1, 1)];

/// Minimum number of free neighbors a bay center needs.
pub const MIN_BAY_SIZE: usize = 4;
/// Added to the path distance when scoring bay candidates.
pub const BAY_DISTANCE_OFFSET: f32 = 10.0;

pub const TOWER_OPTIMAL_RANGE: u8 = 5;
pub const TOWER_FALLOFF_RANGE: u8 = 20;
/// Share of remaining rampart weight removed by a tower at full effect.
pub const TOWER_COVERAGE_DISCOUNT: f32 = 0.8;

/// Ramparts this close to an exit are penalized by the scorer.
pub const DEFENSE_EXIT_RANGE: u8 = 6;
/// Range at which attackers next to the perimeter threaten tiles inside it.
pub const RAMPART_THREAT_RANGE: u8 = 3;

use screeps::constants::StructureType;

/// Maximum number of a given structure type allowed at a controller level.
///
/// Roads, ramparts and walls are effectively unlimited.
pub fn max_structures_at_rcl(structure_type: StructureType, rcl: u8) -> u32 {
    match structure_type {
        StructureType::Spawn => match rcl {
            0 => 0,
            1..=6 => 1,
            7 => 2,
            _ => 3,
        },
        StructureType::Extension => match rcl {
            0 | 1 => 0,
            2 => 5,
            3 => 10,
            4 => 20,
            5 => 30,
            6 => 40,
            7 => 50,
            _ => 60,
        },
        StructureType::Link => match rcl {
            0..=4 => 0,
            5 => 2,
            6 => 3,
            7 => 4,
            _ => 6,
        },
        StructureType::Storage => match rcl {
            0..=3 => 0,
            _ => 1,
        },
        StructureType::Tower => match rcl {
            0..=2 => 0,
            3..=4 => 1,
            5..=6 => 2,
            7 => 3,
            _ => 6,
        },
        StructureType::Observer | StructureType::PowerSpawn | StructureType::Nuker => match rcl {
            0..=7 => 0,
            _ => 1,
        },
        StructureType::Extractor | StructureType::Terminal => match rcl {
            0..=5 => 0,
            _ => 1,
        },
        StructureType::Lab => match rcl {
            0..=5 => 0,
            6 => 3,
            7 => 6,
            _ => 10,
        },
        StructureType::Factory => match rcl {
            0..=6 => 0,
            _ => 1,
        },
        StructureType::Container => 5,
        StructureType::Rampart | StructureType::Wall | StructureType::Road => 2500,
        _ => 0,
    }
}

// Per-tick decay in hits, used to estimate upkeep.
pub const RAMPART_DECAY_PER_TICK: f32 = 300.0 / 100.0;
pub const CONTAINER_DECAY_PER_TICK: f32 = 5000.0 / 500.0;
pub const ROAD_DECAY_PER_TICK: f32 = 100.0 / 1000.0;
pub const ROAD_SWAMP_MULTIPLIER: f32 = 5.0;
pub const ROAD_WALL_MULTIPLIER: f32 = 150.0;
/// Hits repaired per energy spent.
pub const REPAIR_POWER: f32 = 100.0;
