//! Dungeon layout: the partition tree plus the rooms, corridors and tile grid
//! generated from it.
//!
//! A generation run works on a scratch layout and only replaces `self` once
//! every stage has succeeded, so callers never observe a half-built dungeon.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::connectivity;
use super::paths::{find_closest_room, ConnectionShape, PathPlanner};
use super::quad::{Point, Quad};
use super::quadtree::{NodeId, QuadTree};
use super::rng::{RandomStream, SeededStream};
use super::tiles::TileGrid;
use super::{DungeonSeed, GenerationError};
use crate::config::{ConfigError, DungeonConfig};
use crate::logging::TimingSpan;

/// Index into [`DungeonLayout::rooms`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub usize);

/// One successful room-to-room corridor and the path segments it added
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from: RoomId,
    pub to: RoomId,
    pub shape: ConnectionShape,
    pub paths: Range<usize>,
}

#[derive(Debug, Clone)]
pub struct DungeonLayout {
    config: DungeonConfig,
    tree: Option<QuadTree>,
    rooms: Vec<Quad>,
    paths: Vec<Quad>,
    connections: Vec<Connection>,
    tiles: TileGrid,
    seed: Option<u64>,
    attempts: u32,
}

impl DungeonLayout {
    pub fn new(config: DungeonConfig) -> Self {
        let tiles = grid_for(&config);
        Self {
            config,
            tree: None,
            rooms: Vec::new(),
            paths: Vec::new(),
            connections: Vec::new(),
            tiles,
            seed: None,
            attempts: 0,
        }
    }

    /// Generate a complete layout from the configured seed.
    ///
    /// Each failed attempt is retried with the next derived seed, up to
    /// `max_attempts`. On error the previous state is left untouched.
    pub fn generate_dungeon_layout(&mut self) -> Result<(), GenerationError> {
        self.config.validate()?;
        let _span = TimingSpan::new("generate_dungeon_layout");
        let root = DungeonSeed::new(self.config.seed);

        let mut last = None;
        for attempt in 0..self.config.max_attempts {
            let seed = root.attempt_seed(attempt);
            let mut rng = SeededStream::new(seed);
            let mut draft = Self::new(self.config.clone());
            match draft.build(&mut rng) {
                Ok(()) => {
                    draft.seed = Some(seed);
                    draft.attempts = attempt + 1;
                    tracing::info!(
                        seed,
                        attempt,
                        rooms = draft.rooms.len(),
                        paths = draft.paths.len(),
                        draws = rng.draws(),
                        "dungeon layout generated"
                    );
                    *self = draft;
                    return Ok(());
                }
                Err(err) => {
                    tracing::warn!(seed, attempt, error = %err, "layout attempt failed");
                    last = Some(err);
                }
            }
        }

        let last = last.unwrap_or_else(|| {
            GenerationError::InvalidConfig(ConfigError::NonPositive {
                field: "max_attempts",
            })
        });
        Err(GenerationError::AttemptsExhausted {
            attempts: self.config.max_attempts,
            last: Box::new(last),
        })
    }

    /// Single attempt driven by a caller-supplied stream
    pub fn generate_with_stream<R: RandomStream + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<(), GenerationError> {
        self.config.validate()?;
        let mut draft = Self::new(self.config.clone());
        draft.build(rng)?;
        draft.attempts = 1;
        *self = draft;
        Ok(())
    }

    fn build<R: RandomStream + ?Sized>(&mut self, rng: &mut R) -> Result<(), GenerationError> {
        let bounds = Quad::from_size(Point::default(), self.config.dungeon_size);
        let tree = QuadTree::new(
            self.config.partition_depth,
            bounds,
            self.config.minimum_room_size,
            rng,
        )?;
        tracing::debug!(nodes = tree.len(), depth = tree.depth(), "partition tree built");
        self.tree = Some(tree);

        self.generate_rooms(rng);
        tracing::debug!(rooms = self.rooms.len(), "rooms placed");

        self.generate_paths_recursive(QuadTree::ROOT, rng)?;
        tracing::debug!(
            paths = self.paths.len(),
            connections = self.connections.len(),
            "corridors placed"
        );

        if !connectivity::rooms_reachable(self.rooms.len(), &self.connections) {
            return Err(GenerationError::Unreachable {
                connections: self.connections.len(),
            });
        }

        self.create_tile_grid();
        Ok(())
    }

    /// Replace the room list with one random room per leaf, in leaf order.
    pub fn generate_rooms<R: RandomStream + ?Sized>(&mut self, rng: &mut R) {
        self.rooms.clear();
        let Some(mut tree) = self.tree.take() else {
            return;
        };
        for leaf in tree.leaves() {
            let room = self.generate_random_room(&tree.node(leaf).quad(), rng);
            tree.set_room(leaf, Some(RoomId(self.rooms.len())));
            self.rooms.push(room);
        }
        self.tree = Some(tree);
    }

    /// Random room at least `minimum_room_size` inside `max_bounds`.
    ///
    /// Draws position x, position y, bounds x, bounds y in that order.
    pub fn generate_random_room<R: RandomStream + ?Sized>(
        &self,
        max_bounds: &Quad,
        rng: &mut R,
    ) -> Quad {
        let min = self.config.minimum_room_size;
        let px = rng.rand_range(max_bounds.position.x, max_bounds.bounds.x - min.x);
        let py = rng.rand_range(max_bounds.position.y, max_bounds.bounds.y - min.y);
        let bx = rng.rand_range(px + min.x, max_bounds.bounds.x);
        let by = rng.rand_range(py + min.y, max_bounds.bounds.y);
        Quad::new(Point::new(px, py), Point::new(bx, by))
    }

    /// Connect the four children of `node` across three of their shared
    /// edges, then recurse into each child.
    ///
    /// The edge skipped at random stands in for the first edge that fails;
    /// a second failure leaves the siblings disconnected.
    pub fn generate_paths_recursive<R: RandomStream + ?Sized>(
        &mut self,
        node: NodeId,
        rng: &mut R,
    ) -> Result<(), GenerationError> {
        let Some(tree) = self.tree.as_ref() else {
            return Ok(());
        };
        let Some(children) = tree.children(node) else {
            return Ok(());
        };
        let quad = tree.node(node).quad();

        let skip = rng.rand_range(0, 3) as usize;
        let mut substitute = Some(skip);
        for edge in (0..4).filter(|&edge| edge != skip) {
            if self.connect_siblings(node, edge, rng) {
                continue;
            }
            tracing::warn!(%quad, edge, "no corridor across sibling edge");
            let recovered = match substitute.take() {
                Some(spare) => self.connect_siblings(node, spare, rng),
                None => false,
            };
            if !recovered {
                return Err(GenerationError::Disconnected { quad, edge });
            }
        }

        for child in children {
            self.generate_paths_recursive(child, rng)?;
        }
        Ok(())
    }

    /// Try to connect child `edge` and child `edge + 1` of `node` through a
    /// random point on their shared edge.
    fn connect_siblings<R: RandomStream + ?Sized>(
        &mut self,
        node: NodeId,
        edge: usize,
        rng: &mut R,
    ) -> bool {
        let Some(tree) = self.tree.as_ref() else {
            return false;
        };
        let (Some(children), Some((start, end))) =
            (tree.children(node), tree.shared_edge(node, edge))
        else {
            return false;
        };
        let (first, second) = (children[edge % 4], children[(edge + 1) % 4]);

        for _ in 0..self.config.connection_attempts {
            let point = Point::new(
                rng.rand_range(start.x, end.x),
                rng.rand_range(start.y, end.y),
            );
            let pair = self.tree.as_ref().and_then(|tree| {
                Some((
                    find_closest_room(tree, &self.rooms, first, point)?,
                    find_closest_room(tree, &self.rooms, second, point)?,
                ))
            });
            let Some((a, b)) = pair else {
                return false;
            };
            if self.generate_path_between_quads(a, b, rng).is_some() {
                return true;
            }
        }
        false
    }

    /// Corridor between two rooms: straight along Y, straight along X, or an
    /// L-bend. Paths are appended only when the whole corridor fits.
    pub fn generate_path_between_quads<R: RandomStream + ?Sized>(
        &mut self,
        a: RoomId,
        b: RoomId,
        rng: &mut R,
    ) -> Option<ConnectionShape> {
        let room_a = *self.rooms.get(a.0)?;
        let room_b = *self.rooms.get(b.0)?;
        let (shape, segments) =
            PathPlanner::new(self.config.path_width).path_between(&room_a, &room_b, rng)?;

        let start = self.paths.len();
        self.paths.extend(segments);
        self.connections.push(Connection {
            from: a,
            to: b,
            shape,
            paths: start..self.paths.len(),
        });
        tracing::debug!(from = a.0, to = b.0, ?shape, "rooms connected");
        Some(shape)
    }

    /// Rasterize rooms and paths and run every derivation pass
    pub fn create_tile_grid(&mut self) {
        let mut tiles = grid_for(&self.config);
        tiles.create_room_layout(&self.rooms, &self.paths);
        tiles.derive_features();
        self.tiles = tiles;
    }

    pub fn config(&self) -> &DungeonConfig {
        &self.config
    }

    pub fn tree(&self) -> Option<&QuadTree> {
        self.tree.as_ref()
    }

    pub fn rooms(&self) -> &[Quad] {
        &self.rooms
    }

    pub fn paths(&self) -> &[Quad] {
        &self.paths
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn tiles(&self) -> &TileGrid {
        &self.tiles
    }

    /// Seed of the attempt that produced the current layout
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Spawn points, one per room
    pub fn room_centers(&self) -> Vec<Point> {
        self.rooms.iter().map(Quad::center).collect()
    }

    /// Every room's tiles lie in one walkable region of the grid.
    pub fn is_fully_connected(&self) -> bool {
        connectivity::rooms_connected_on_floor(&self.tiles, &self.rooms)
    }
}

fn grid_for(config: &DungeonConfig) -> TileGrid {
    let width = usize::try_from(config.dungeon_size.x).unwrap_or(0);
    let height = usize::try_from(config.dungeon_size.y).unwrap_or(0);
    TileGrid::new(width, height)
}
