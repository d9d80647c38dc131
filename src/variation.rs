//! Enumeration of the candidate layouts tried for a room.
//!
//! A variation is a room center choice combined with the subset of sources
//! whose harvest bay gets a spawn. Variations are addressed by stable string
//! keys such as `weighted:+-` or `1x2:++`.

use crate::constants::*;
use crate::distance::DistanceFields;
use crate::location::*;
use crate::terrain::*;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationInfo {
    pub center: Location,
    /// One flag per source, in intel order: place a spawn in its harvest bay.
    pub spawn_sources: Vec<bool>,
}

/// Whether a tile may hold the room core under the given tier.
fn qualifies(terrain: &FastRoomTerrain, fields: &DistanceFields, loc: Location, tier: (u8, u8)) -> bool {
    let (min_wall, min_exit) = tier;
    if !terrain.is_walkable(loc) || loc.is_border() {
        return false;
    }
    if loc.x() < 2 || loc.y() < 2 || loc.x() > ROOM_WIDTH - 3 || loc.y() > ROOM_HEIGHT - 3 {
        return false;
    }
    let wall = fields.wall_distance(loc);
    let exit = fields.exit_distance(loc);
    // A zero means the field never reached the tile, which is as far as it gets.
    (wall == 0 || wall >= min_wall) && (exit == 0 || exit > min_exit)
}

/// Tiles that may hold the room core, from the strictest tier that has any.
pub fn core_candidates(terrain: &FastRoomTerrain, fields: &DistanceFields) -> Vec<Location> {
    for tier in CORE_CANDIDATE_TIERS {
        let candidates: Vec<Location> = Location::all()
            .filter(|loc| qualifies(terrain, fields, *loc, tier))
            .collect();
        if !candidates.is_empty() {
            return candidates;
        }
    }
    Vec::new()
}

pub fn is_core_candidate(terrain: &FastRoomTerrain, fields: &DistanceFields, loc: Location) -> bool {
    CORE_CANDIDATE_TIERS
        .iter()
        .any(|tier| qualifies(terrain, fields, loc, *tier))
}

/// Candidate closest to the mean of the points of interest.
pub fn weighted_center(candidates: &[Location], points: &[Location]) -> Option<Location> {
    let (mean_x, mean_y) = if points.is_empty() {
        (ROOM_WIDTH as f32 / 2.0, ROOM_HEIGHT as f32 / 2.0)
    } else {
        let count = points.len() as f32;
        (
            points.iter().map(|p| p.x() as f32).sum::<f32>() / count,
            points.iter().map(|p| p.y() as f32).sum::<f32>() / count,
        )
    };

    candidates.iter().copied().min_by(|a, b| {
        let distance = |l: &Location| {
            let dx = l.x() as f32 - mean_x;
            let dy = l.y() as f32 - mean_y;
            dx * dx + dy * dy
        };
        distance(a)
            .total_cmp(&distance(b))
            .then(a.linear_index().cmp(&b.linear_index()))
    })
}

/// Best candidate, by wall distance, of each cell of a 3x3 split of the room.
pub fn grid_centers(candidates: &[Location], fields: &DistanceFields) -> Vec<(String, Location)> {
    let cell_width = (ROOM_WIDTH as usize).div_ceil(3);
    let cell_height = (ROOM_HEIGHT as usize).div_ceil(3);

    (0..3)
        .cartesian_product(0..3)
        .filter_map(|(cell_y, cell_x)| {
            candidates
                .iter()
                .copied()
                .filter(|l| l.x() as usize / cell_width == cell_x && l.y() as usize / cell_height == cell_y)
                .max_by(|a, b| {
                    fields
                        .wall_distance(*a)
                        .cmp(&fields.wall_distance(*b))
                        .then(b.linear_index().cmp(&a.linear_index()))
                })
                .map(|loc| (format!("{}x{}", cell_x, cell_y), loc))
        })
        .collect()
}

/// Every `+`/`-` combination over the sources.
pub fn spawn_subsets(source_count: usize) -> Vec<Vec<bool>> {
    if source_count == 0 {
        return vec![Vec::new()];
    }
    (0..source_count)
        .map(|_| [true, false])
        .multi_cartesian_product()
        .collect()
}

fn subset_suffix(subset: &[bool]) -> String {
    subset.iter().map(|s| if *s { '+' } else { '-' }).collect()
}

/// Ordered set of variations for one room.
#[derive(Clone, Debug, Default)]
pub struct VariationGenerator {
    variations: Vec<(String, VariationInfo)>,
}

impl VariationGenerator {
    #[cfg_attr(feature = "profile", screeps_timing_annotate::timing)]
    pub fn new(
        terrain: &FastRoomTerrain,
        fields: &DistanceFields,
        points_of_interest: &[Location],
        source_count: usize,
    ) -> Self {
        let candidates = core_candidates(terrain, fields);

        let mut centers: Vec<(String, Location)> = Vec::new();
        if let Some(weighted) = weighted_center(&candidates, points_of_interest) {
            centers.push(("weighted".to_string(), weighted));
        }
        for (key, loc) in grid_centers(&candidates, fields) {
            if !centers.iter().any(|(_, existing)| *existing == loc) {
                centers.push((key, loc));
            }
        }

        let subsets = spawn_subsets(source_count);
        let variations = centers
            .iter()
            .cartesian_product(subsets.iter())
            .map(|((key, center), subset)| {
                (
                    format!("{}:{}", key, subset_suffix(subset)),
                    VariationInfo {
                        center: *center,
                        spawn_sources: subset.clone(),
                    },
                )
            })
            .collect();

        VariationGenerator { variations }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.variations.iter().map(|(key, _)| key.as_str())
    }

    pub fn get_index(&self, index: usize) -> Option<(&str, &VariationInfo)> {
        self.variations.get(index).map(|(key, info)| (key.as_str(), info))
    }

    pub fn len(&self) -> usize {
        self.variations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variations.is_empty()
    }
}
