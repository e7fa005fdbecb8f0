//! Reachability checks over the room graph and the walkable tiles.

use petgraph::algo::connected_components;
use petgraph::graph::UnGraph;
use petgraph::unionfind::UnionFind;

use super::layout::{Connection, RoomId};
use super::paths::ConnectionShape;
use super::quad::Quad;
use super::tiles::TileGrid;

/// Rooms as nodes, one edge per recorded connection
pub fn room_graph(room_count: usize, connections: &[Connection]) -> UnGraph<RoomId, ConnectionShape> {
    let mut graph = UnGraph::with_capacity(room_count, connections.len());
    let nodes: Vec<_> = (0..room_count).map(|i| graph.add_node(RoomId(i))).collect();
    for connection in connections {
        if let (Some(&a), Some(&b)) = (nodes.get(connection.from.0), nodes.get(connection.to.0)) {
            graph.add_edge(a, b, connection.shape);
        }
    }
    graph
}

pub fn room_components(room_count: usize, connections: &[Connection]) -> usize {
    if room_count == 0 {
        return 0;
    }
    connected_components(&room_graph(room_count, connections))
}

/// Every room can reach every other through recorded connections
pub fn rooms_reachable(room_count: usize, connections: &[Connection]) -> bool {
    room_components(room_count, connections) <= 1
}

/// 4-connected regions of walkable tiles
pub struct FloorComponents {
    sets: UnionFind<usize>,
    width: usize,
    height: usize,
    count: usize,
}

impl FloorComponents {
    /// Number of separate walkable regions
    pub fn count(&self) -> usize {
        self.count
    }

    /// Region label of a walkable cell; `None` for solid or out-of-grid cells
    pub fn region(&self, grid: &TileGrid, x: i32, y: i32) -> Option<usize> {
        let (ux, uy) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        if ux >= self.width || uy >= self.height {
            return None;
        }
        if !grid.tile_type(x, y).is_walkable() {
            return None;
        }
        Some(self.sets.find(uy * self.width + ux))
    }
}

pub fn floor_components(grid: &TileGrid) -> FloorComponents {
    let (width, height) = (grid.width(), grid.height());
    let mut sets = UnionFind::new(width * height);
    let rows = grid.rows();
    let walkable = |x: usize, y: usize| rows[y][x].tile_type.is_walkable();

    let mut cells = 0;
    let mut merges = 0;
    for y in 0..height {
        for x in 0..width {
            if !walkable(x, y) {
                continue;
            }
            cells += 1;
            let index = y * width + x;
            if x + 1 < width && walkable(x + 1, y) && sets.union(index, index + 1) {
                merges += 1;
            }
            if y + 1 < height && walkable(x, y + 1) && sets.union(index, index + width) {
                merges += 1;
            }
        }
    }

    FloorComponents {
        sets,
        width,
        height,
        count: cells - merges,
    }
}

/// All rooms sit in one walkable region of `grid`
pub fn rooms_connected_on_floor(grid: &TileGrid, rooms: &[Quad]) -> bool {
    let components = floor_components(grid);
    let mut region = None;
    for room in rooms {
        let Some(label) = components.region(grid, room.position.x, room.position.y) else {
            return false;
        };
        match region {
            None => region = Some(label),
            Some(existing) if existing != label => return false,
            Some(_) => {}
        }
    }
    true
}
