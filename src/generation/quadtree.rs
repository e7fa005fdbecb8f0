//! Quad-tree spatial partition.
//!
//! Nodes live in a flat arena addressed by [`NodeId`]; a branch owns exactly
//! four children (all or nothing) and a leaf may reference one room by index.
//! Cloning the tree is a deep copy.

use serde::{Deserialize, Serialize};

use super::layout::RoomId;
use super::quad::{Point, Quad};
use super::rng::RandomStream;
use super::GenerationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Child slot of a branch. Index order is SW, NW, NE, SE, so consecutive
/// slots (wrapping) are always edge-adjacent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    SouthWest,
    NorthWest,
    NorthEast,
    SouthEast,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::SouthWest,
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthEast,
    ];

    pub fn index(self) -> usize {
        match self {
            Quadrant::SouthWest => 0,
            Quadrant::NorthWest => 1,
            Quadrant::NorthEast => 2,
            Quadrant::SouthEast => 3,
        }
    }

    /// Sub-rectangle of `quad` for this slot, given the absolute split point
    pub fn carve(self, quad: &Quad, split: Point) -> Quad {
        let p = quad.position;
        let b = quad.bounds;
        match self {
            Quadrant::SouthWest => Quad::new(p, split),
            Quadrant::NorthWest => Quad::new(Point::new(p.x, split.y), Point::new(split.x, b.y)),
            Quadrant::NorthEast => Quad::new(split, b),
            Quadrant::SouthEast => Quad::new(Point::new(split.x, p.y), Point::new(b.x, split.y)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadTreeNode {
    quad: Quad,
    split: Option<Point>,
    children: Option<[NodeId; 4]>,
    room: Option<RoomId>,
}

impl QuadTreeNode {
    fn leaf(quad: Quad) -> Self {
        Self {
            quad,
            split: None,
            children: None,
            room: None,
        }
    }

    pub fn quad(&self) -> Quad {
        self.quad
    }

    /// Absolute split point of a branch
    pub fn split(&self) -> Option<Point> {
        self.split
    }

    pub fn children(&self) -> Option<[NodeId; 4]> {
        self.children
    }

    pub fn room(&self) -> Option<RoomId> {
        self.room
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadTree {
    nodes: Vec<QuadTreeNode>,
    minimum_room_size: Point,
    depth: u32,
}

impl QuadTree {
    pub const ROOT: NodeId = NodeId(0);

    /// Build a tree `depth` levels deep over `bounds`, slicing with `rng`.
    pub fn new<R: RandomStream + ?Sized>(
        depth: u32,
        bounds: Quad,
        minimum_room_size: Point,
        rng: &mut R,
    ) -> Result<Self, GenerationError> {
        let mut tree = Self {
            nodes: vec![QuadTreeNode::leaf(bounds)],
            minimum_room_size,
            depth,
        };
        if depth > 0 {
            tree.create_children(Self::ROOT, depth, rng)?;
        }
        Ok(tree)
    }

    fn create_children<R: RandomStream + ?Sized>(
        &mut self,
        id: NodeId,
        depth: u32,
        rng: &mut R,
    ) -> Result<(), GenerationError> {
        let quad = self.nodes[id.0].quad;
        let split = slice(&quad, self.minimum_room_size, depth, rng)?;

        let first = self.nodes.len();
        let children = [
            NodeId(first),
            NodeId(first + 1),
            NodeId(first + 2),
            NodeId(first + 3),
        ];
        for quadrant in Quadrant::ALL {
            self.nodes
                .push(QuadTreeNode::leaf(quadrant.carve(&quad, split)));
        }

        let node = &mut self.nodes[id.0];
        node.split = Some(split);
        node.children = Some(children);

        if depth > 1 {
            for child in children {
                self.create_children(child, depth - 1, rng)?;
            }
        }
        Ok(())
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn minimum_room_size(&self) -> Point {
        self.minimum_room_size
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> &QuadTreeNode {
        &self.nodes[Self::ROOT.0]
    }

    pub fn node(&self, id: NodeId) -> &QuadTreeNode {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> Option<[NodeId; 4]> {
        self.nodes[id.0].children
    }

    pub fn room(&self, id: NodeId) -> Option<RoomId> {
        self.nodes[id.0].room
    }

    /// Associate a room with a leaf. Branches never hold rooms.
    pub fn set_room(&mut self, id: NodeId, room: Option<RoomId>) {
        let node = &mut self.nodes[id.0];
        debug_assert!(node.is_leaf(), "rooms belong to leaves");
        node.room = room;
    }

    /// Leaves under `id`, depth-first in SW, NW, NE, SE order
    pub fn leaves_under(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            match self.nodes[current.0].children {
                Some(children) => stack.extend(children.iter().rev()),
                None => out.push(current),
            }
        }
        out
    }

    pub fn leaves(&self) -> Vec<NodeId> {
        self.leaves_under(Self::ROOT)
    }

    /// Segment shared by child `edge` and child `(edge + 1) % 4` of a branch.
    ///
    /// Edge 0 (SW|NW) and 2 (NE|SE) are horizontal at the split's y; edge 1
    /// (NW|NE) and 3 (SE|SW) are vertical at the split's x.
    pub fn shared_edge(&self, id: NodeId, edge: usize) -> Option<(Point, Point)> {
        let node = &self.nodes[id.0];
        let split = node.split?;
        let p = node.quad.position;
        let b = node.quad.bounds;
        match edge % 4 {
            0 => Some((Point::new(p.x, split.y), split)),
            1 => Some((split, Point::new(split.x, b.y))),
            2 => Some((split, Point::new(b.x, split.y))),
            _ => Some((Point::new(split.x, p.y), split)),
        }
    }
}

/// Pick the split point of `quad` for a node with `depth` levels still to build.
///
/// Each side keeps `minimum_room_size * 2^(depth - 1)` so every descendant can
/// be sliced again; at the last level this is just the minimum room size.
fn slice<R: RandomStream + ?Sized>(
    quad: &Quad,
    minimum_room_size: Point,
    depth: u32,
    rng: &mut R,
) -> Result<Point, GenerationError> {
    let shift = depth.saturating_sub(1);
    let reserve_x = i64::from(minimum_room_size.x) << shift;
    let reserve_y = i64::from(minimum_room_size.y) << shift;
    let width = i64::from(quad.width());
    let height = i64::from(quad.height());

    if width < 2 * reserve_x || height < 2 * reserve_y {
        return Err(GenerationError::DegenerateSplit { quad: *quad, depth });
    }

    // reserve <= extent / 2 here, so both fit in i32
    let (reserve_x, reserve_y) = (reserve_x as i32, reserve_y as i32);
    let x_slice = rng.rand_range(reserve_x, quad.width() - reserve_x);
    let y_slice = rng.rand_range(reserve_y, quad.height() - reserve_y);
    Ok(quad.position + Point::new(x_slice, y_slice))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::rng::SeededStream;

    fn square(size: i32) -> Quad {
        Quad::new(Point::new(0, 0), Point::new(size, size))
    }

    #[test]
    fn test_depth_zero_is_single_leaf() {
        let mut rng = SeededStream::new(1);
        let tree = QuadTree::new(0, square(10), Point::new(4, 4), &mut rng).unwrap();
        assert_eq!(tree.len(), 1);
        assert!(tree.root().is_leaf());
        assert_eq!(tree.leaves(), vec![QuadTree::ROOT]);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn test_leaves_tile_the_root() {
        let mut rng = SeededStream::new(42);
        let root = Quad::new(Point::new(3, -2), Point::new(67, 62));
        let tree = QuadTree::new(2, root, Point::new(5, 5), &mut rng).unwrap();
        let leaves = tree.leaves();
        assert_eq!(leaves.len(), 16);

        let area: i64 = leaves.iter().map(|id| tree.node(*id).quad().area()).sum();
        assert_eq!(area, root.area());

        for (i, a) in leaves.iter().enumerate() {
            let qa = tree.node(*a).quad();
            assert!(root.contains(&qa));
            assert!(qa.width() >= 5 && qa.height() >= 5);
            for b in &leaves[i + 1..] {
                assert!(!qa.overlaps(&tree.node(*b).quad()));
            }
        }
    }

    #[test]
    fn test_children_all_or_nothing() {
        let mut rng = SeededStream::new(5);
        let tree = QuadTree::new(1, square(20), Point::new(4, 4), &mut rng).unwrap();
        let children = tree.children(QuadTree::ROOT).unwrap();
        assert_eq!(children.len(), 4);
        for child in children {
            assert!(tree.children(child).is_none());
        }
    }

    #[test]
    fn test_collapsed_range_splits_in_half() {
        let mut rng = SeededStream::new(1234);
        let tree = QuadTree::new(1, square(16), Point::new(8, 8), &mut rng).unwrap();
        assert_eq!(tree.root().split(), Some(Point::new(8, 8)));
        for child in tree.children(QuadTree::ROOT).unwrap() {
            assert_eq!(tree.node(child).quad().size(), Point::new(8, 8));
        }
    }

    #[test]
    fn test_degenerate_split_fails_fast() {
        let mut rng = SeededStream::new(1);
        let err = QuadTree::new(1, square(7), Point::new(4, 4), &mut rng).unwrap_err();
        assert!(matches!(err, GenerationError::DegenerateSplit { depth: 1, .. }));
        assert_eq!(rng.draws(), 0, "no draw from an inverted range");
    }

    #[test]
    fn test_quadrant_order_is_counter_clockwise_from_south_west() {
        let quad = square(10);
        let split = Point::new(4, 6);
        assert_eq!(Quadrant::SouthWest.carve(&quad, split), Quad::new(Point::new(0, 0), Point::new(4, 6)));
        assert_eq!(Quadrant::NorthWest.carve(&quad, split), Quad::new(Point::new(0, 6), Point::new(4, 10)));
        assert_eq!(Quadrant::NorthEast.carve(&quad, split), Quad::new(Point::new(4, 6), Point::new(10, 10)));
        assert_eq!(Quadrant::SouthEast.carve(&quad, split), Quad::new(Point::new(4, 0), Point::new(10, 6)));
    }

    #[test]
    fn test_shared_edges_touch_both_siblings() {
        let mut rng = SeededStream::new(77);
        let tree = QuadTree::new(1, square(30), Point::new(5, 5), &mut rng).unwrap();
        let children = tree.children(QuadTree::ROOT).unwrap();
        for edge in 0..4 {
            let (start, end) = tree.shared_edge(QuadTree::ROOT, edge).unwrap();
            let a = tree.node(children[edge]).quad();
            let b = tree.node(children[(edge + 1) % 4]).quad();
            for q in [a, b] {
                let segment = Quad::new(start, end);
                assert!(q.contains(&segment), "edge {edge} {segment} not on {q}");
            }
        }
        assert!(tree.shared_edge(children[0], 0).is_none());
    }

    #[test]
    fn test_clone_is_deep() {
        let mut rng = SeededStream::new(8);
        let tree = QuadTree::new(1, square(20), Point::new(4, 4), &mut rng).unwrap();
        let mut copy = tree.clone();
        let leaf = copy.leaves()[0];
        copy.set_room(leaf, Some(RoomId(0)));
        assert_eq!(copy.room(leaf), Some(RoomId(0)));
        assert_eq!(tree.room(leaf), None);
    }
}
