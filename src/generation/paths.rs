//! Corridor planning between rooms.
//!
//! Planners only compute rectangles; nothing is written to the layout until a
//! whole connection (one straight run, or both legs plus the intersection of an
//! L-bend) has succeeded. A failed plan therefore never leaves a stray leg.

use serde::{Deserialize, Serialize};

use super::layout::RoomId;
use super::quad::{Axis, Point, Quad, Span};
use super::quadtree::{NodeId, QuadTree};
use super::rng::RandomStream;

/// How a pair of rooms ended up connected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionShape {
    /// One run along the given axis
    Straight(Axis),
    /// Two runs meeting at a square intersection
    LBend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathPlanner {
    path_width: i32,
}

impl PathPlanner {
    pub fn new(path_width: i32) -> Self {
        Self { path_width }
    }

    pub fn path_width(&self) -> i32 {
        self.path_width
    }

    /// Plan a connection: straight along Y, then straight along X, then an
    /// L-bend. Returns the shape and the segments to commit, in order.
    pub fn path_between<R: RandomStream + ?Sized>(
        &self,
        a: &Quad,
        b: &Quad,
        rng: &mut R,
    ) -> Option<(ConnectionShape, Vec<Quad>)> {
        for axis in [Axis::Y, Axis::X] {
            if let Some(path) = self.straight_path(axis, a, b, rng) {
                return Some((ConnectionShape::Straight(axis), vec![path]));
            }
        }
        self.l_bend_path(a, b, rng)
            .map(|segments| (ConnectionShape::LBend, segments.to_vec()))
    }

    /// Corridor running along `axis` from one quad's edge to the other's.
    ///
    /// Needs an overlap of at least the path width across `axis` and the quads
    /// to be apart along it. The corridor sits at a random offset inside the
    /// overlap. Touching quads give a zero-length corridor.
    pub fn straight_path<R: RandomStream + ?Sized>(
        &self,
        axis: Axis,
        a: &Quad,
        b: &Quad,
        rng: &mut R,
    ) -> Option<Quad> {
        let across = axis.other();
        let overlap = a.span(across).overlap(b.span(across));
        if overlap.len() < self.path_width {
            return None;
        }

        let (a_along, b_along) = (a.span(axis), b.span(axis));
        let run = if a_along.hi <= b_along.lo {
            Span::new(a_along.hi, b_along.lo)
        } else if b_along.hi <= a_along.lo {
            Span::new(b_along.hi, a_along.lo)
        } else {
            return None;
        };

        let offset = rng.rand_range(overlap.lo, overlap.hi - self.path_width);
        Some(quad_from_spans(
            axis,
            run,
            Span::new(offset, offset + self.path_width),
        ))
    }

    /// L-shaped corridor: `[first leg, second leg, intersection]`.
    ///
    /// A random orientation is tried first and the other one on failure.
    pub fn l_bend_path<R: RandomStream + ?Sized>(
        &self,
        a: &Quad,
        b: &Quad,
        rng: &mut R,
    ) -> Option<[Quad; 3]> {
        let a_first = rng.rand_range(0, 1) == 0;
        let (first, second) = if a_first { (a, b) } else { (b, a) };
        self.l_bend_oriented(first, second, rng)
            .or_else(|| self.l_bend_oriented(second, first, rng))
    }

    /// `horizontal` leaves along X into the intersection, which then runs along
    /// Y into `vertical`.
    fn l_bend_oriented<R: RandomStream + ?Sized>(
        &self,
        horizontal: &Quad,
        vertical: &Quad,
        rng: &mut R,
    ) -> Option<[Quad; 3]> {
        let w = self.path_width;

        // intersection rows inside the horizontal room, clear of the vertical one
        let rows = nearest_interval(&admissible_starts(
            horizontal.span(Axis::Y),
            w,
            vertical.span(Axis::Y),
        ), vertical.span(Axis::Y), w)?;
        // intersection columns inside the vertical room, clear of the horizontal one
        let cols = nearest_interval(&admissible_starts(
            vertical.span(Axis::X),
            w,
            horizontal.span(Axis::X),
        ), horizontal.span(Axis::X), w)?;

        let y = rng.rand_range(rows.lo, rows.hi);
        let x = rng.rand_range(cols.lo, cols.hi);
        let intersection = Quad::from_size(Point::new(x, y), Point::new(w, w));

        let mut staged = Vec::with_capacity(3);
        staged.push(self.straight_path(Axis::X, horizontal, &intersection, rng)?);
        staged.push(self.straight_path(Axis::Y, &intersection, vertical, rng)?);
        staged.push(intersection);
        staged.try_into().ok()
    }
}

fn quad_from_spans(along_axis: Axis, along: Span, across: Span) -> Quad {
    let (xs, ys) = match along_axis {
        Axis::X => (along, across),
        Axis::Y => (across, along),
    };
    Quad::new(Point::new(xs.lo, ys.lo), Point::new(xs.hi, ys.hi))
}

/// Closed ranges of start coordinates for a `width`-long segment that stays
/// inside `inside` without overlapping `avoid`.
fn admissible_starts(inside: Span, width: i32, avoid: Span) -> Vec<Span> {
    let last = inside.hi - width;
    [
        Span::new(inside.lo, last.min(avoid.lo - width)),
        Span::new(inside.lo.max(avoid.hi), last),
    ]
    .into_iter()
    .filter(|range| range.lo <= range.hi)
    .collect()
}

/// The candidate range whose segments end closest to `target`
fn nearest_interval(candidates: &[Span], target: Span, width: i32) -> Option<Span> {
    candidates.iter().copied().min_by_key(|range| {
        if range.hi + width <= target.lo {
            target.lo - (range.hi + width)
        } else {
            range.lo - target.hi
        }
    })
}

/// Room under `subtree` whose nearest side has its midpoint closest to `point`.
///
/// Ties keep the first room in SW, NW, NE, SE order.
pub fn find_closest_room(
    tree: &QuadTree,
    rooms: &[Quad],
    subtree: NodeId,
    point: Point,
) -> Option<RoomId> {
    let mut best: Option<(i64, RoomId)> = None;
    for leaf in tree.leaves_under(subtree) {
        let Some(room_id) = tree.room(leaf) else {
            continue;
        };
        let Some(room) = rooms.get(room_id.0) else {
            continue;
        };
        let score = side_midpoint_distance(room, point);
        if best.map_or(true, |(best_score, _)| score < best_score) {
            best = Some((score, room_id));
        }
    }
    best.map(|(_, id)| id)
}

/// Squared distance (doubled coordinates) from `point` to the midpoint of the
/// side of `room` nearest to it
fn side_midpoint_distance(room: &Quad, point: Point) -> i64 {
    let p = (2 * i64::from(point.x), 2 * i64::from(point.y));
    let mut nearest: Option<(i64, i64)> = None;
    for (start, end) in room.sides() {
        let (sx, sy) = (2 * i64::from(start.x), 2 * i64::from(start.y));
        let (ex, ey) = (2 * i64::from(end.x), 2 * i64::from(end.y));
        let cx = p.0.clamp(sx.min(ex), sx.max(ex));
        let cy = p.1.clamp(sy.min(ey), sy.max(ey));
        let to_side = (p.0 - cx).pow(2) + (p.1 - cy).pow(2);
        let mid = ((sx + ex) / 2, (sy + ey) / 2);
        let to_mid = (p.0 - mid.0).pow(2) + (p.1 - mid.1).pow(2);
        if nearest.map_or(true, |(side, _)| to_side < side) {
            nearest = Some((to_side, to_mid));
        }
    }
    nearest.map_or(i64::MAX, |(_, to_mid)| to_mid)
}
