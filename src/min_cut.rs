//! Minimum vertex cut between unsafe exits and protected regions.
//!
//! `DinicMinCut` builds a node-split flow network:
//!   - Each walkable tile becomes two graph nodes (in, out) connected by a
//!     capacity-1 edge. Cutting this edge means placing a rampart on that tile.
//!   - Adjacent walkable tiles are connected out->in with infinite capacity.
//!   - A virtual source feeds the exit tiles of every unsafe side.
//!   - A virtual sink drains every walkable tile of the protected regions.
//! Tiles on or next to an exit can't be fortified, their internal edge has
//! infinite capacity.

use crate::constants::*;
use crate::error::PlannerError;
use crate::location::*;
use crate::room_data::ExitSafety;
use crate::terrain::*;
use fnv::FnvHashSet;
use rs_graph::builder::Builder;
use rs_graph::maxflow::dinic;
use rs_graph::traits::*;
use rs_graph::Net;

/// Infinite capacity sentinel for edges that should never be cut.
const INF_CAP: u32 = ROOM_AREA as u32 + 1;

/// Inclusive rectangle of tiles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x1: u8,
    pub y1: u8,
    pub x2: u8,
    pub y2: u8,
}

impl Rect {
    /// Square of the given radius around a tile, clipped to the room.
    pub fn around(center: Location, radius: u8) -> Rect {
        Rect {
            x1: center.x().saturating_sub(radius),
            y1: center.y().saturating_sub(radius),
            x2: (center.x() + radius).min(ROOM_WIDTH - 1),
            y2: (center.y() + radius).min(ROOM_HEIGHT - 1),
        }
    }

    pub fn contains(&self, loc: Location) -> bool {
        (self.x1..=self.x2).contains(&loc.x()) && (self.y1..=self.y2).contains(&loc.y())
    }

    pub fn tiles(&self) -> impl Iterator<Item = Location> + '_ {
        (self.y1..=self.y2).flat_map(move |y| (self.x1..=self.x2).map(move |x| Location::from_xy(x, y)))
    }
}

pub trait MinCutSolver {
    /// Tiles whose fortification separates every protected region from the
    /// exits of the unsafe sides.
    fn cut_tiles(
        &self,
        terrain: &FastRoomTerrain,
        protected: &[Rect],
        safety: &ExitSafety,
    ) -> Result<Vec<Location>, PlannerError>;
}

#[derive(Copy, Clone, Debug, Default)]
pub struct DinicMinCut;

impl MinCutSolver for DinicMinCut {
    #[cfg_attr(feature = "profile", screeps_timing_annotate::timing)]
    fn cut_tiles(
        &self,
        terrain: &FastRoomTerrain,
        protected: &[Rect],
        safety: &ExitSafety,
    ) -> Result<Vec<Location>, PlannerError> {
        let sources: Vec<Location> = safety
            .unsafe_sides()
            .flat_map(|side| terrain.get_side_exits(side))
            .collect();
        if sources.is_empty() || protected.is_empty() {
            return Ok(Vec::new());
        }

        let all_exits: FnvHashSet<Location> = terrain.get_exits().into_iter().collect();
        let protected_tiles: FnvHashSet<Location> = protected
            .iter()
            .flat_map(|rect| rect.tiles())
            .filter(|loc| terrain.is_walkable(*loc))
            .collect();

        // Sequential index per walkable tile.
        let mut tile_index: Vec<Option<usize>> = vec![None; ROOM_AREA];
        let mut tile_coords: Vec<Location> = Vec::new();
        for loc in Location::all().filter(|l| terrain.is_walkable(*l)) {
            tile_index[loc.linear_index()] = Some(tile_coords.len());
            tile_coords.push(loc);
        }

        let num_tiles = tile_coords.len();
        let num_nodes = 2 * num_tiles + 2;
        let source_idx = 2 * num_tiles;
        let sink_idx = 2 * num_tiles + 1;
        let edge_estimate = 9 * num_tiles + sources.len() + protected_tiles.len();

        let mut builder =
            <Net as rs_graph::builder::Buildable>::Builder::with_capacities(num_nodes, edge_estimate);
        let nodes: Vec<_> = (0..num_nodes).map(|_| builder.add_node()).collect();
        let mut capacities: Vec<u32> = Vec::with_capacity(edge_estimate);

        let add_edge = |b: &mut <Net as rs_graph::builder::Buildable>::Builder,
                        caps: &mut Vec<u32>,
                        u: usize,
                        v: usize,
                        cap: u32| {
            b.add_edge(nodes[u], nodes[v]);
            caps.push(cap);
        };

        for (i, loc) in tile_coords.iter().enumerate() {
            let uncuttable = loc.is_border() || loc.neighbors().any(|n| all_exits.contains(&n));
            let cap = if uncuttable { INF_CAP } else { 1 };
            add_edge(&mut builder, &mut capacities, i, num_tiles + i, cap);
        }

        for (i, loc) in tile_coords.iter().enumerate() {
            for next in loc.neighbors() {
                if let Some(j) = tile_index[next.linear_index()] {
                    add_edge(&mut builder, &mut capacities, num_tiles + i, j, INF_CAP);
                }
            }
        }

        for exit in &sources {
            if let Some(i) = tile_index[exit.linear_index()] {
                add_edge(&mut builder, &mut capacities, source_idx, i, INF_CAP);
            }
        }

        for loc in &protected_tiles {
            if let Some(i) = tile_index[loc.linear_index()] {
                add_edge(&mut builder, &mut capacities, num_tiles + i, sink_idx, INF_CAP);
            }
        }

        let graph = builder.into_graph();
        let src = nodes[source_idx];
        let snk = nodes[sink_idx];

        let (value, _flow, mincut_nodes) = dinic(&graph, src, snk, |e| capacities[graph.edge_id(e)]);
        if value >= INF_CAP {
            return Err(PlannerError::MinCutUnsolvable);
        }

        // A tile is cut when its in-node is on the source side and its
        // out-node is not.
        let cut_set: FnvHashSet<usize> = mincut_nodes.iter().map(|n| graph.node_id(*n)).collect();

        let cut = tile_coords
            .iter()
            .enumerate()
            .filter(|(i, _)| {
                cut_set.contains(&graph.node_id(nodes[*i]))
                    && !cut_set.contains(&graph.node_id(nodes[num_tiles + *i]))
            })
            .map(|(_, loc)| *loc)
            .collect();

        Ok(cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Walled room split by a vertical wall with a three tile gap; exits on the left.
    fn corridor_room() -> FastRoomTerrain {
        FastRoomTerrain::from_fn(|x, y| {
            let border = x == 0 || y == 0 || x == 49 || y == 49;
            if x == 0 && (20..25).contains(&y) {
                TerrainFlags::NONE
            } else if border || (x == 20 && !(24..27).contains(&y)) {
                TerrainFlags::WALL
            } else {
                TerrainFlags::NONE
            }
        })
    }

    #[test]
    fn cuts_through_the_gap() -> Result<(), PlannerError> {
        let terrain = corridor_room();
        let safety = ExitSafety {
            left: false,
            ..ExitSafety::all_safe()
        };
        let cut = DinicMinCut.cut_tiles(&terrain, &[Rect::around(Location::from_xy(35, 25), 3)], &safety)?;
        assert_eq!(cut.len(), 3);
        assert!(cut.iter().all(|l| (24..27).contains(&l.y()) && (19..=21).contains(&l.x())));
        Ok(())
    }

    #[test]
    fn safe_rooms_need_no_cut() -> Result<(), PlannerError> {
        let terrain = corridor_room();
        let cut = DinicMinCut.cut_tiles(
            &terrain,
            &[Rect::around(Location::from_xy(35, 25), 3)],
            &ExitSafety::all_safe(),
        )?;
        assert!(cut.is_empty());
        Ok(())
    }

    #[test]
    fn protected_exit_is_unsolvable() {
        let terrain = corridor_room();
        let safety = ExitSafety::default();
        let result = DinicMinCut.cut_tiles(&terrain, &[Rect::around(Location::from_xy(1, 22), 1)], &safety);
        assert!(matches!(result, Err(PlannerError::MinCutUnsolvable)));
    }
}
