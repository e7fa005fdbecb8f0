//! Tile grid built from rooms and corridors.
//!
//! Every non-solid tile is walkable floor; `Wall` and the corner types are
//! floor tiles that also carry wall art, oriented by [`Rotation`]. Solid cells
//! are `Empty`, `Pillar`, and everything outside the grid. No derivation pass
//! changes which cells are solid, so each pass is idempotent.

use serde::{Deserialize, Serialize};

use super::quad::Quad;

/// Tile classification handed to the tile placer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileType {
    #[default]
    Empty,
    Floor,
    Wall,
    InsideCorner,
    OutsideCorner,
    Pillar,
}

impl TileType {
    pub fn all() -> &'static [TileType] {
        &[
            TileType::Empty,
            TileType::Floor,
            TileType::Wall,
            TileType::InsideCorner,
            TileType::OutsideCorner,
            TileType::Pillar,
        ]
    }

    pub fn is_walkable(&self) -> bool {
        !matches!(self, TileType::Empty | TileType::Pillar)
    }

    pub fn to_u8(&self) -> u8 {
        match self {
            TileType::Empty => 0,
            TileType::Floor => 1,
            TileType::Wall => 2,
            TileType::InsideCorner => 3,
            TileType::OutsideCorner => 4,
            TileType::Pillar => 5,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::all().get(usize::from(value)).copied()
    }
}

/// Facing of the wall art: the side (or corner, clockwise from north-east)
/// where the solid neighbour is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    North,
    East,
    South,
    West,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation::North, Rotation::East, Rotation::South, Rotation::West];

    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::North => 0,
            Rotation::East => 90,
            Rotation::South => 180,
            Rotation::West => 270,
        }
    }

    /// Grid step towards this side (+y is north)
    fn step(self) -> (i32, i32) {
        match self {
            Rotation::North => (0, 1),
            Rotation::East => (1, 0),
            Rotation::South => (0, -1),
            Rotation::West => (-1, 0),
        }
    }

    /// Grid step towards the corner clockwise after this side
    fn corner_step(self) -> (i32, i32) {
        let (ax, ay) = self.step();
        let (bx, by) = self.clockwise().step();
        (ax + bx, ay + by)
    }

    fn clockwise(self) -> Rotation {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileData {
    pub tile_type: TileType,
    pub rotation: Rotation,
}

impl TileData {
    pub fn new(tile_type: TileType, rotation: Rotation) -> Self {
        Self {
            tile_type,
            rotation,
        }
    }
}

/// Row-major grid indexed `[y][x]`, row 0 at the south edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<Vec<TileData>>,
}

impl TileGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![TileData::default(); width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rows(&self) -> &[Vec<TileData>] {
        &self.cells
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&TileData> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        self.cells.get(y)?.get(x)
    }

    /// Tile type at `(x, y)`; outside the grid reads as `Empty`
    pub fn tile_type(&self, x: i32, y: i32) -> TileType {
        self.get(x, y).map_or(TileType::Empty, |tile| tile.tile_type)
    }

    fn is_solid(&self, x: i32, y: i32) -> bool {
        !self.tile_type(x, y).is_walkable()
    }

    pub fn count(&self, tile_type: TileType) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|tile| tile.tile_type == tile_type)
            .count()
    }

    pub fn walkable_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|tile| tile.tile_type.is_walkable())
            .count()
    }

    /// Cells `[position, bounds)` of `quad`, clipped to the grid
    pub fn cells_in(&self, quad: &Quad) -> impl Iterator<Item = (usize, usize)> {
        let clip = |lo: i32, hi: i32, len: usize| {
            let lo = usize::try_from(lo.max(0)).unwrap_or(0).min(len);
            let hi = usize::try_from(hi.max(0)).unwrap_or(0).min(len);
            lo..hi.max(lo)
        };
        let xs = clip(quad.position.x, quad.bounds.x, self.width);
        let ys = clip(quad.position.y, quad.bounds.y, self.height);
        ys.flat_map(move |y| xs.clone().map(move |x| (x, y)))
    }

    fn fill(&mut self, quad: &Quad, tile: TileData) {
        let cells: Vec<(usize, usize)> = self.cells_in(quad).collect();
        for (x, y) in cells {
            self.cells[y][x] = tile;
        }
    }

    /// Reset to `Empty`, then mark every room and path cell as `Floor`
    pub fn create_room_layout(&mut self, rooms: &[Quad], paths: &[Quad]) {
        for row in &mut self.cells {
            row.fill(TileData::default());
        }
        let floor = TileData::new(TileType::Floor, Rotation::North);
        for quad in rooms.iter().chain(paths) {
            self.fill(quad, floor);
        }
    }

    /// Apply `classify` to every cell of type `from`; returns the number changed.
    fn reclassify(
        &mut self,
        from: TileType,
        classify: impl Fn(&Self, i32, i32) -> Option<TileData>,
    ) -> usize {
        let mut changes = Vec::new();
        for (y, row) in self.cells.iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                if tile.tile_type != from {
                    continue;
                }
                if let Some(next) = classify(self, x as i32, y as i32) {
                    changes.push((x, y, next));
                }
            }
        }
        for &(x, y, next) in &changes {
            self.cells[y][x] = next;
        }
        changes.len()
    }

    /// Floor next to a solid side becomes `Wall`, facing the first solid side
    /// in N, E, S, W order.
    pub fn create_walls(&mut self) -> usize {
        self.reclassify(TileType::Floor, |grid, x, y| {
            Rotation::ALL
                .into_iter()
                .find(|side| {
                    let (dx, dy) = side.step();
                    grid.is_solid(x + dx, y + dy)
                })
                .map(|side| TileData::new(TileType::Wall, side))
        })
    }

    /// Empty cells boxed in by walkable tiles on all four sides become `Pillar`.
    pub fn create_pillars(&mut self) -> usize {
        self.reclassify(TileType::Empty, |grid, x, y| {
            let enclosed = Rotation::ALL.into_iter().all(|side| {
                let (dx, dy) = side.step();
                !grid.is_solid(x + dx, y + dy)
            });
            enclosed.then(|| TileData::new(TileType::Pillar, Rotation::North))
        })
    }

    /// Floor with open sides but a solid diagonal becomes `OutsideCorner`,
    /// rotated by the first solid diagonal in NE, SE, SW, NW order.
    pub fn create_outside_corners(&mut self) -> usize {
        self.reclassify(TileType::Floor, |grid, x, y| {
            Rotation::ALL
                .into_iter()
                .find(|corner| {
                    let (dx, dy) = corner.corner_step();
                    grid.is_solid(x + dx, y + dy)
                })
                .map(|corner| TileData::new(TileType::OutsideCorner, corner))
        })
    }

    /// Walls with two perpendicular solid sides become `InsideCorner`,
    /// rotated by the corner in NE, SE, SW, NW order.
    pub fn create_inside_corners(&mut self) -> usize {
        self.reclassify(TileType::Wall, |grid, x, y| {
            Rotation::ALL
                .into_iter()
                .find(|side| {
                    let (ax, ay) = side.step();
                    let (bx, by) = side.clockwise().step();
                    grid.is_solid(x + ax, y + ay) && grid.is_solid(x + bx, y + by)
                })
                .map(|corner| TileData::new(TileType::InsideCorner, corner))
        })
    }

    /// All derivation passes in dependency order
    pub fn derive_features(&mut self) {
        let walls = self.create_walls();
        let pillars = self.create_pillars();
        let outside = self.create_outside_corners();
        let inside = self.create_inside_corners();
        tracing::debug!(walls, pillars, outside, inside, "derived tile features");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::quad::Point;

    fn quad(px: i32, py: i32, bx: i32, by: i32) -> Quad {
        Quad::new(Point::new(px, py), Point::new(bx, by))
    }

    fn at(grid: &TileGrid, x: i32, y: i32) -> TileData {
        *grid.get(x, y).unwrap()
    }

    #[test]
    fn test_room_layout_marks_floor() {
        let mut grid = TileGrid::new(8, 6);
        grid.create_room_layout(&[quad(1, 1, 5, 5)], &[quad(5, 2, 8, 4)]);
        assert_eq!(grid.count(TileType::Floor), 16 + 6);
        assert_eq!(grid.tile_type(0, 0), TileType::Empty);
        assert_eq!(grid.tile_type(7, 3), TileType::Floor);
        assert_eq!(grid.tile_type(-1, 3), TileType::Empty);
    }

    #[test]
    fn test_quads_past_the_edge_are_clipped() {
        let mut grid = TileGrid::new(4, 4);
        grid.create_room_layout(&[quad(-2, -2, 2, 9)], &[]);
        assert_eq!(grid.count(TileType::Floor), 8);
    }

    #[test]
    fn test_single_room_walls_and_corners() {
        let mut grid = TileGrid::new(6, 6);
        grid.create_room_layout(&[quad(1, 1, 5, 5)], &[]);
        grid.derive_features();

        assert_eq!(grid.count(TileType::Floor), 4);
        assert_eq!(grid.count(TileType::Wall), 8);
        assert_eq!(grid.count(TileType::InsideCorner), 4);
        assert_eq!(grid.count(TileType::OutsideCorner), 0);
        assert_eq!(grid.count(TileType::Pillar), 0);

        assert_eq!(at(&grid, 2, 4), TileData::new(TileType::Wall, Rotation::North));
        assert_eq!(at(&grid, 4, 2), TileData::new(TileType::Wall, Rotation::East));
        assert_eq!(at(&grid, 2, 1), TileData::new(TileType::Wall, Rotation::South));
        assert_eq!(at(&grid, 1, 3), TileData::new(TileType::Wall, Rotation::West));

        assert_eq!(at(&grid, 4, 4).rotation, Rotation::North);
        assert_eq!(at(&grid, 4, 1).rotation, Rotation::East);
        assert_eq!(at(&grid, 1, 1).rotation, Rotation::South);
        assert_eq!(at(&grid, 1, 4).rotation, Rotation::West);
    }

    #[test]
    fn test_corridor_mouth_gets_outside_corners() {
        // room with a 2-wide corridor leaving its north side
        let mut grid = TileGrid::new(10, 12);
        grid.create_room_layout(&[quad(1, 1, 9, 7)], &[quad(4, 7, 6, 11)]);
        grid.derive_features();

        // room tiles below the corridor mouth see solid ground diagonally
        assert_eq!(
            at(&grid, 4, 6),
            TileData::new(TileType::OutsideCorner, Rotation::West)
        );
        assert_eq!(
            at(&grid, 5, 6),
            TileData::new(TileType::OutsideCorner, Rotation::North)
        );
        // corridor tiles are walls facing outward
        assert_eq!(at(&grid, 4, 8), TileData::new(TileType::Wall, Rotation::West));
        assert_eq!(at(&grid, 5, 8), TileData::new(TileType::Wall, Rotation::East));
    }

    #[test]
    fn test_enclosed_hole_becomes_pillar() {
        let mut grid = TileGrid::new(5, 5);
        let ring = [
            quad(0, 0, 5, 2),
            quad(0, 3, 5, 5),
            quad(0, 2, 2, 3),
            quad(3, 2, 5, 3),
        ];
        grid.create_room_layout(&ring, &[]);
        grid.derive_features();

        assert_eq!(grid.tile_type(2, 2), TileType::Pillar);
        assert_eq!(at(&grid, 2, 1), TileData::new(TileType::Wall, Rotation::North));
        assert_eq!(at(&grid, 2, 3), TileData::new(TileType::Wall, Rotation::South));
        assert!(!TileType::Pillar.is_walkable());
    }

    #[test]
    fn test_passes_are_idempotent() {
        let mut grid = TileGrid::new(20, 20);
        grid.create_room_layout(
            &[quad(1, 1, 8, 8), quad(12, 10, 19, 19)],
            &[quad(8, 3, 14, 5), quad(12, 5, 14, 10)],
        );
        grid.derive_features();
        let once = grid.clone();

        assert_eq!(grid.create_walls(), 0);
        assert_eq!(grid.create_pillars(), 0);
        assert_eq!(grid.create_outside_corners(), 0);
        assert_eq!(grid.create_inside_corners(), 0);
        assert_eq!(grid, once);
    }

    #[test]
    fn test_derivation_keeps_walkable_set() {
        let mut grid = TileGrid::new(12, 12);
        grid.create_room_layout(&[quad(1, 1, 6, 6), quad(7, 7, 11, 11)], &[quad(6, 2, 9, 4), quad(7, 4, 9, 7)]);
        let walkable = grid.walkable_count();
        grid.derive_features();
        assert_eq!(grid.walkable_count(), walkable);
    }

    #[test]
    fn test_tile_codes() {
        for tile in TileType::all() {
            assert_eq!(TileType::from_u8(tile.to_u8()), Some(*tile));
        }
        assert_eq!(TileType::from_u8(6), None);
        assert_eq!(Rotation::West.degrees(), 270);
    }
}
