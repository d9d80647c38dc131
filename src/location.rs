use crate::constants::*;
use serde::*;

/// Neighbor offsets for 8-directional movement.
pub const NEIGHBORS_8: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
];

/// A tile inside the room, packed as `(x << 8) | y`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Location {
    packed: u16,
}

impl Location {
    fn from_coords(x: u32, y: u32) -> Self {
        Location {
            packed: ((x << 8) | y) as u16,
        }
    }

    #[inline]
    pub fn from_xy(x: u8, y: u8) -> Self {
        Self::from_coords(x as u32, y as u32)
    }

    /// Checked construction from signed coordinates.
    pub fn try_from_xy(x: i16, y: i16) -> Option<Self> {
        if (0..ROOM_WIDTH as i16).contains(&x) && (0..ROOM_HEIGHT as i16).contains(&y) {
            Some(Self::from_xy(x as u8, y as u8))
        } else {
            None
        }
    }

    #[inline]
    pub fn x(self) -> u8 {
        ((self.packed >> 8) & 0xFF) as u8
    }

    #[inline]
    pub fn y(self) -> u8 {
        (self.packed & 0xFF) as u8
    }

    #[inline]
    pub fn packed_repr(self) -> u16 {
        self.packed
    }

    #[inline]
    pub fn from_packed(packed: u16) -> Self {
        Location { packed }
    }

    /// Row-major index into a room-sized buffer.
    #[inline]
    pub fn linear_index(self) -> usize {
        self.y() as usize * ROOM_WIDTH as usize + self.x() as usize
    }

    pub fn from_linear_index(index: usize) -> Self {
        Self::from_xy(
            (index % ROOM_WIDTH as usize) as u8,
            (index / ROOM_WIDTH as usize) as u8,
        )
    }

    /// Chebyshev distance.
    pub fn distance_to(self, other: Self) -> u8 {
        let dx = (self.x() as i16) - (other.x() as i16);
        let dy = (self.y() as i16) - (other.y() as i16);

        dx.abs().max(dy.abs()) as u8
    }

    pub fn offset(self, dx: i8, dy: i8) -> Option<Self> {
        Self::try_from_xy(self.x() as i16 + dx as i16, self.y() as i16 + dy as i16)
    }

    pub fn is_border(self) -> bool {
        self.x() == 0 || self.y() == 0 || self.x() == ROOM_WIDTH - 1 || self.y() == ROOM_HEIGHT - 1
    }

    /// In-room tiles surrounding this one.
    pub fn neighbors(self) -> impl Iterator<Item = Location> {
        NEIGHBORS_8
            .iter()
            .filter_map(move |&(dx, dy)| self.offset(dx, dy))
    }

    /// In-room tiles within `range` (Chebyshev), including this one.
    pub fn area(self, range: u8) -> impl Iterator<Item = Location> {
        let r = range as i16;
        let (cx, cy) = (self.x() as i16, self.y() as i16);
        (-r..=r).flat_map(move |dy| (-r..=r).filter_map(move |dx| Location::try_from_xy(cx + dx, cy + dy)))
    }

    /// Every tile in the room, row by row.
    pub fn all() -> impl Iterator<Item = Location> {
        (0..ROOM_AREA).map(Location::from_linear_index)
    }
}

impl Serialize for Location {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.packed_repr().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u16::deserialize(deserializer).map(Location::from_packed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_are_clipped_at_the_edge() {
        assert_eq!(Location::from_xy(0, 0).neighbors().count(), 3);
        assert_eq!(Location::from_xy(0, 10).neighbors().count(), 5);
        assert_eq!(Location::from_xy(10, 10).neighbors().count(), 8);
        assert_eq!(Location::from_xy(49, 49).area(2).count(), 9);
    }

    #[test]
    fn linear_index_matches_coordinates() {
        let loc = Location::from_xy(7, 31);
        assert_eq!(loc.linear_index(), 31 * 50 + 7);
        assert_eq!(Location::from_linear_index(loc.linear_index()), loc);
        assert_eq!(loc.distance_to(Location::from_xy(10, 25)), 6);
    }
}
