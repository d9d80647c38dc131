//! Wall and exit distance fields.
//!
//! Both fields are multi-source breadth-first distances computed by repeated
//! full-grid relaxation: on pass `d`, every unset tile next to a tile holding
//! `d` receives `d + 1`. Walls hold `MATRIX_OBSTACLE` and never change.

use crate::constants::*;
use crate::cost_matrix::*;
use crate::location::*;
use crate::terrain::*;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Clone, Serialize, Deserialize)]
pub struct DistanceFields {
    /// Chebyshev distance to the nearest wall, 0 if the room has no walls.
    pub wall: CostMatrix,
    /// Walking distance to the nearest exit tile, exits hold 1 and
    /// unreachable tiles hold 0.
    pub exit: CostMatrix,
}

impl DistanceFields {
    pub fn generate(terrain: &FastRoomTerrain) -> Self {
        DistanceFields {
            wall: wall_distance(terrain),
            exit: exit_distance(terrain),
        }
    }

    #[inline]
    pub fn wall_distance(&self, loc: Location) -> u8 {
        self.wall.get(loc)
    }

    #[inline]
    pub fn exit_distance(&self, loc: Location) -> u8 {
        self.exit.get(loc)
    }

    /// Whether a walkable tile is within `range` steps of an exit.
    pub fn is_near_exit(&self, loc: Location, range: u8) -> bool {
        let distance = self.exit.get(loc);
        distance != 0 && distance != MATRIX_OBSTACLE && distance <= range
    }
}

#[cfg_attr(feature = "profile", screeps_timing_annotate::timing)]
pub fn wall_distance(terrain: &FastRoomTerrain) -> CostMatrix {
    let mut matrix = CostMatrix::new(0);
    for loc in Location::all().filter(|l| !terrain.is_walkable(*l)) {
        matrix.set(loc, MATRIX_OBSTACLE);
    }
    for loc in Location::all().filter(|l| terrain.is_walkable(*l)) {
        if loc.neighbors().any(|n| !terrain.is_walkable(n)) {
            matrix.set(loc, 1);
        }
    }
    propagate(&mut matrix);
    matrix
}

#[cfg_attr(feature = "profile", screeps_timing_annotate::timing)]
pub fn exit_distance(terrain: &FastRoomTerrain) -> CostMatrix {
    let mut matrix = CostMatrix::new(0);
    for loc in Location::all().filter(|l| !terrain.is_walkable(*l)) {
        matrix.set(loc, MATRIX_OBSTACLE);
    }
    for exit in terrain.get_exits() {
        matrix.set(exit, 1);
    }
    propagate(&mut matrix);
    matrix
}

fn propagate(matrix: &mut CostMatrix) {
    let mut level = 1u8;
    loop {
        let mut changed = false;
        for loc in Location::all() {
            if matrix.get(loc) != 0 {
                continue;
            }
            if loc.neighbors().any(|n| matrix.get(n) == level) {
                matrix.set(loc, level + 1);
                changed = true;
            }
        }
        if !changed || level + 1 >= MATRIX_OBSTACLE - 1 {
            break;
        }
        level += 1;
    }
}

/// BFS flood fill over 8-connected tiles. Seeds are always included.
pub fn flood_fill<F>(seeds: impl IntoIterator<Item = Location>, is_passable: F) -> Vec<bool>
where
    F: Fn(Location) -> bool,
{
    let mut reached = vec![false; ROOM_AREA];
    let mut queue = VecDeque::new();

    for seed in seeds {
        if !reached[seed.linear_index()] {
            reached[seed.linear_index()] = true;
            queue.push_back(seed);
        }
    }

    while let Some(loc) = queue.pop_front() {
        for next in loc.neighbors() {
            if !reached[next.linear_index()] && is_passable(next) {
                reached[next.linear_index()] = true;
                queue.push_back(next);
            }
        }
    }

    reached
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    fn random_terrain(seed: u64) -> FastRoomTerrain {
        let mut rng = StdRng::seed_from_u64(seed);
        let walls: Vec<bool> = (0..ROOM_AREA).map(|_| rng.gen_bool(0.15)).collect();
        FastRoomTerrain::from_fn(|x, y| {
            let border = x == 0 || y == 0 || x == 49 || y == 49;
            let exit = border && (20..30).contains(&x.max(y)) && x.min(y) == 0;
            if exit {
                TerrainFlags::NONE
            } else if border || walls[y as usize * 50 + x as usize] {
                TerrainFlags::WALL
            } else {
                TerrainFlags::NONE
            }
        })
    }

    #[test]
    fn wall_distance_is_chebyshev_distance_to_nearest_wall() {
        for seed in 0..5 {
            let terrain = random_terrain(seed);
            let fields = DistanceFields::generate(&terrain);
            let walls: Vec<Location> = Location::all().filter(|l| !terrain.is_walkable(*l)).collect();

            for loc in Location::all() {
                if !terrain.is_walkable(loc) {
                    assert_eq!(fields.wall_distance(loc), MATRIX_OBSTACLE);
                    continue;
                }
                let expected = walls.iter().map(|w| w.distance_to(loc)).min().unwrap();
                assert_eq!(fields.wall_distance(loc), expected, "at {:?}", loc);
            }
        }
    }

    #[test]
    fn exit_distance_propagates_monotonically() {
        for seed in 10..15 {
            let terrain = random_terrain(seed);
            let fields = DistanceFields::generate(&terrain);
            for loc in Location::all().filter(|l| terrain.is_walkable(*l)) {
                let d = fields.exit_distance(loc);
                if d <= 1 {
                    continue;
                }
                // Every reached tile beyond the exits has a neighbor one step closer.
                assert!(loc.neighbors().any(|n| fields.exit_distance(n) == d - 1));
                assert!(loc
                    .neighbors()
                    .filter(|n| terrain.is_walkable(*n))
                    .all(|n| fields.exit_distance(n) == 0 || fields.exit_distance(n) + 1 >= d));
            }
        }
    }

    #[test]
    fn exit_distance_in_open_room() {
        let terrain = FastRoomTerrain::from_fn(|_, _| TerrainFlags::NONE);
        let fields = DistanceFields::generate(&terrain);
        assert_eq!(fields.exit_distance(Location::from_xy(1, 1)), 2);
        assert_eq!(fields.exit_distance(Location::from_xy(25, 3)), 4);
        assert!(fields.is_near_exit(Location::from_xy(25, 4), EXIT_BUILD_DISTANCE));
        assert!(!fields.is_near_exit(Location::from_xy(25, 5), EXIT_BUILD_DISTANCE));
        assert!(!fields.is_near_exit(Location::from_xy(25, 25), EXIT_BUILD_DISTANCE));
        // No walls anywhere.
        assert_eq!(fields.wall_distance(Location::from_xy(25, 25)), 0);
    }

    #[test]
    fn flood_fill_respects_passability() {
        let reached = flood_fill([Location::from_xy(5, 5)], |l| l.x() < 10);
        assert!(reached[Location::from_xy(9, 40).linear_index()]);
        assert!(!reached[Location::from_xy(10, 5).linear_index()]);
    }
}
