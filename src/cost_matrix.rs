use crate::constants::*;
use crate::location::*;
use serde::{Deserialize, Serialize};

/// Dense 50x50 grid of small costs. `MATRIX_OBSTACLE` (255) always means impassable.
#[derive(Clone, PartialEq, Eq)]
pub struct CostMatrix {
    data: Vec<u8>,
}

impl Default for CostMatrix {
    fn default() -> Self {
        Self::new(0)
    }
}

impl CostMatrix {
    pub fn new(initial: u8) -> Self {
        CostMatrix {
            data: vec![initial; ROOM_AREA],
        }
    }

    #[inline]
    pub fn get(&self, loc: Location) -> u8 {
        self.data[loc.linear_index()]
    }

    #[inline]
    pub fn get_xy(&self, x: u8, y: u8) -> u8 {
        self.data[y as usize * ROOM_WIDTH as usize + x as usize]
    }

    #[inline]
    pub fn set(&mut self, loc: Location, value: u8) {
        self.data[loc.linear_index()] = value;
    }

    #[inline]
    pub fn is_impassable(&self, loc: Location) -> bool {
        self.get(loc) == MATRIX_OBSTACLE
    }
}

impl std::fmt::Debug for CostMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for y in 0..ROOM_HEIGHT {
            for x in 0..ROOM_WIDTH {
                write!(f, "{:>4}", self.get_xy(x, y))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Serialize for CostMatrix {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.data.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CostMatrix {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let data = Vec::<u8>::deserialize(deserializer)?;
        if data.len() != ROOM_AREA {
            return Err(serde::de::Error::custom("Invalid cost matrix size"));
        }
        Ok(CostMatrix { data })
    }
}
