//! Weighted shortest paths over a single room.

use crate::constants::*;
use crate::cost_matrix::*;
use crate::location::*;
use crate::terrain::*;
use pathfinding::directed::astar::astar;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PathGoal {
    pub location: Location,
    pub range: u8,
}

impl PathGoal {
    pub fn new(location: Location, range: u8) -> Self {
        PathGoal { location, range }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct PathOptions {
    pub plain_cost: u8,
    pub swamp_cost: u8,
    /// Only single-room searches are supported, larger values are clamped.
    pub max_rooms: u8,
    pub heuristic_weight: f32,
}

impl Default for PathOptions {
    fn default() -> Self {
        PathOptions {
            plain_cost: 1,
            swamp_cost: 5,
            max_rooms: 1,
            heuristic_weight: 1.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathResult {
    /// Tiles walked, excluding the start.
    pub path: Vec<Location>,
    pub incomplete: bool,
}

impl PathResult {
    pub fn is_complete(&self) -> bool {
        !self.incomplete
    }
}

pub trait GridPathfinder {
    fn search(
        &self,
        terrain: &FastRoomTerrain,
        from: Location,
        goals: &[PathGoal],
        matrix: &CostMatrix,
        options: &PathOptions,
    ) -> PathResult;
}

/// A* search using the cost matrix on top of terrain costs.
///
/// Matrix values of 0 fall back to the plain/swamp cost, `MATRIX_OBSTACLE`
/// is impassable and anything else is the cost of entering the tile.
#[derive(Copy, Clone, Debug, Default)]
pub struct AStarPathfinder;

impl GridPathfinder for AStarPathfinder {
    fn search(
        &self,
        terrain: &FastRoomTerrain,
        from: Location,
        goals: &[PathGoal],
        matrix: &CostMatrix,
        options: &PathOptions,
    ) -> PathResult {
        if goals.is_empty() {
            return PathResult {
                path: Vec::new(),
                incomplete: true,
            };
        }

        let remaining = |loc: &Location| -> u32 {
            goals
                .iter()
                .map(|g| loc.distance_to(g.location).saturating_sub(g.range) as u32)
                .min()
                .unwrap_or(0)
        };

        let tile_cost = |loc: Location| -> Option<u32> {
            if !terrain.is_walkable(loc) {
                return None;
            }
            match matrix.get(loc) {
                MATRIX_OBSTACLE => None,
                0 if terrain.is_swamp(loc.x(), loc.y()) => Some(options.swamp_cost as u32),
                0 => Some(options.plain_cost as u32),
                cost => Some(cost as u32),
            }
        };

        let result = astar(
            &from,
            |loc| {
                loc.neighbors()
                    .filter_map(|n| tile_cost(n).map(|c| (n, c.max(1))))
                    .collect::<Vec<_>>()
            },
            |loc| (remaining(loc) as f32 * options.heuristic_weight) as u32,
            |loc| remaining(loc) == 0,
        );

        match result {
            Some((path, _cost)) => PathResult {
                path: path.into_iter().skip(1).collect(),
                incomplete: false,
            },
            None => PathResult {
                path: Vec::new(),
                incomplete: true,
            },
        }
    }
}
