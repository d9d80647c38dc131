use crate::location::*;
use crate::terrain::*;
use screeps::RoomName;
use serde::{Deserialize, Serialize};

/// Whether the room adjacent to each side is considered safe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ExitSafety {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl ExitSafety {
    pub fn all_safe() -> Self {
        ExitSafety {
            top: true,
            right: true,
            bottom: true,
            left: true,
        }
    }

    pub fn is_safe(&self, side: ExitSide) -> bool {
        match side {
            ExitSide::Top => self.top,
            ExitSide::Right => self.right,
            ExitSide::Bottom => self.bottom,
            ExitSide::Left => self.left,
        }
    }

    pub fn all_directions_safe(&self) -> bool {
        ExitSide::ALL.iter().all(|side| self.is_safe(*side))
    }

    pub fn unsafe_sides(&self) -> impl Iterator<Item = ExitSide> + '_ {
        ExitSide::ALL.into_iter().filter(move |side| !self.is_safe(*side))
    }
}

/// Terrain and points of interest for rooms, provided by the embedding bot.
pub trait RoomIntel {
    fn terrain(&self, room: RoomName) -> Option<&FastRoomTerrain>;
    fn source_positions(&self, room: RoomName) -> Vec<Location>;
    fn mineral_position(&self, room: RoomName) -> Option<Location>;
    fn controller_position(&self, room: RoomName) -> Option<Location>;
    fn adjacent_room_safety(&self, room: RoomName) -> ExitSafety;
}

/// Fixed intel for a single room, for offline planning and tests.
#[derive(Clone)]
pub struct StaticRoomIntel {
    pub room: RoomName,
    pub terrain: FastRoomTerrain,
    pub sources: Vec<Location>,
    pub mineral: Option<Location>,
    pub controller: Option<Location>,
    pub safety: ExitSafety,
}

impl StaticRoomIntel {
    pub fn new(room: RoomName, terrain: FastRoomTerrain) -> Self {
        StaticRoomIntel {
            room,
            terrain,
            sources: Vec::new(),
            mineral: None,
            controller: None,
            safety: ExitSafety::default(),
        }
    }
}

impl RoomIntel for StaticRoomIntel {
    fn terrain(&self, room: RoomName) -> Option<&FastRoomTerrain> {
        (room == self.room).then_some(&self.terrain)
    }

    fn source_positions(&self, room: RoomName) -> Vec<Location> {
        if room == self.room {
            self.sources.clone()
        } else {
            Vec::new()
        }
    }

    fn mineral_position(&self, room: RoomName) -> Option<Location> {
        self.mineral.filter(|_| room == self.room)
    }

    fn controller_position(&self, room: RoomName) -> Option<Location> {
        self.controller.filter(|_| room == self.room)
    }

    fn adjacent_room_safety(&self, _room: RoomName) -> ExitSafety {
        self.safety
    }
}
