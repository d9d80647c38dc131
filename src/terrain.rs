use crate::constants::*;
use crate::location::*;
use bitflags::*;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TerrainFlags: u8 {
        const NONE = 0;
        const WALL = 1;
        const SWAMP = 2;
        const LAVA = 4;
    }
}

/// Side of the room an exit tile lies on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExitSide {
    Top,
    Right,
    Bottom,
    Left,
}

impl ExitSide {
    pub const ALL: [ExitSide; 4] = [ExitSide::Top, ExitSide::Right, ExitSide::Bottom, ExitSide::Left];

    /// Side the given border tile belongs to. Corners are never exits.
    pub fn of(loc: Location) -> Option<ExitSide> {
        let (x, y) = (loc.x(), loc.y());
        let inner = |v: u8, size: u8| v > 0 && v < size - 1;
        if y == 0 && inner(x, ROOM_WIDTH) {
            Some(ExitSide::Top)
        } else if x == ROOM_WIDTH - 1 && inner(y, ROOM_HEIGHT) {
            Some(ExitSide::Right)
        } else if y == ROOM_HEIGHT - 1 && inner(x, ROOM_WIDTH) {
            Some(ExitSide::Bottom)
        } else if x == 0 && inner(y, ROOM_HEIGHT) {
            Some(ExitSide::Left)
        } else {
            None
        }
    }

    fn tiles(self) -> impl Iterator<Item = Location> {
        let last_x = ROOM_WIDTH - 1;
        let last_y = ROOM_HEIGHT - 1;
        let range = match self {
            ExitSide::Top | ExitSide::Bottom => 1..last_x,
            ExitSide::Right | ExitSide::Left => 1..last_y,
        };
        range.map(move |i| match self {
            ExitSide::Top => Location::from_xy(i, 0),
            ExitSide::Right => Location::from_xy(last_x, i),
            ExitSide::Bottom => Location::from_xy(i, last_y),
            ExitSide::Left => Location::from_xy(0, i),
        })
    }
}

/// Terrain of a single room stored as one byte per tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FastRoomTerrain {
    buffer: Vec<u8>,
}

impl FastRoomTerrain {
    pub fn new(buffer: Vec<u8>) -> FastRoomTerrain {
        debug_assert_eq!(buffer.len(), ROOM_AREA);
        FastRoomTerrain { buffer }
    }

    /// Build terrain tile by tile.
    pub fn from_fn<F>(f: F) -> FastRoomTerrain
    where
        F: Fn(u8, u8) -> TerrainFlags,
    {
        let buffer = Location::all().map(|loc| f(loc.x(), loc.y()).bits()).collect();
        FastRoomTerrain { buffer }
    }

    pub fn get(&self, pos: &Location) -> TerrainFlags {
        TerrainFlags::from_bits_truncate(self.buffer[pos.linear_index()])
    }

    pub fn get_xy(&self, x: u8, y: u8) -> TerrainFlags {
        let index = (y as usize * ROOM_WIDTH as usize) + (x as usize);
        TerrainFlags::from_bits_truncate(self.buffer[index])
    }

    pub fn is_wall(&self, x: u8, y: u8) -> bool {
        self.get_xy(x, y).contains(TerrainFlags::WALL)
    }

    pub fn is_swamp(&self, x: u8, y: u8) -> bool {
        self.get_xy(x, y).contains(TerrainFlags::SWAMP)
    }

    #[inline]
    pub fn is_walkable(&self, loc: Location) -> bool {
        !self.get(&loc).contains(TerrainFlags::WALL)
    }

    /// Passable exit tiles on one side of the room.
    pub fn get_side_exits(&self, side: ExitSide) -> Vec<Location> {
        side.tiles().filter(|loc| self.is_walkable(*loc)).collect()
    }

    /// All passable exit tiles, clockwise from the top side.
    pub fn get_exits(&self) -> Vec<Location> {
        ExitSide::ALL
            .iter()
            .flat_map(|side| self.get_side_exits(*side))
            .collect()
    }

    /// One tile per contiguous run of exit tiles, the middle of the run.
    pub fn exit_centers(&self) -> Vec<(ExitSide, Location)> {
        let mut centers = Vec::new();
        for side in ExitSide::ALL {
            let exits = self.get_side_exits(side);
            let mut run: Vec<Location> = Vec::new();
            for exit in exits {
                if let Some(last) = run.last() {
                    if last.distance_to(exit) > 1 {
                        centers.push((side, run[run.len() / 2]));
                        run.clear();
                    }
                }
                run.push(exit);
            }
            if !run.is_empty() {
                centers.push((side, run[run.len() / 2]));
            }
        }
        centers
    }
}
