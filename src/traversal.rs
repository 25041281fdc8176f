//! Ray/grid traversal.
//!
//! A ray is carried as a pair of points: `p1` behind, `p2` ahead. [`step`]
//! pushes the far point onto the next grid line the ray crosses, and
//! [`cast_ray`] repeats that until the cell being entered is a wall or lies
//! outside the grid.
//!
//! Every snapped coordinate is biased by [`EPSILON`] in the direction of
//! travel. That keeps the walk moving across boundaries that floating point
//! rounding would otherwise land on twice, while still flooring to the
//! correct cell.

use crate::canvas::Color;
use crate::geometry::Vec2;
use crate::grid::{Cell, Grid};

pub const EPSILON: f64 = 1e-6;

/// Next integer grid coordinate past `value` when moving in `direction`.
/// A zero direction leaves the value untouched.
#[inline]
pub fn snap(value: f64, direction: f64) -> f64 {
    if direction > 0.0 {
        (value + EPSILON).ceil()
    } else if direction < 0.0 {
        (value - EPSILON).floor()
    } else {
        value
    }
}

// f64::signum maps +0.0 to 1.0, which would nudge axis-aligned rays sideways.
#[inline]
fn direction_sign(d: f64) -> f64 {
    if d > 0.0 {
        1.0
    } else if d < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Advance the far point of the ray `p1 -> p2` to the nearest grid line
/// crossing beyond `p2`.
///
/// With a sloped ray both the next vertical and the next horizontal line are
/// candidates; the one nearer to `p2` is crossed first. On an exact tie (a
/// ray passing through a grid corner) the vertical-line candidate is kept,
/// which is the same point anyway.
///
/// `p1` and `p2` must differ.
pub fn step(p1: Vec2, p2: Vec2) -> Vec2 {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    debug_assert!(dx != 0.0 || dy != 0.0, "ray endpoints coincide: {p1:?}");

    if dx == 0.0 {
        return Vec2::new(p2.x, snap(p2.y, dy));
    }

    // y = k * x + c through p1 and p2
    let k = dy / dx;
    let c = p1.y - k * p1.x;

    let x3 = snap(p2.x, dx);
    let mut p3 = Vec2::new(x3, k * x3 + c);

    if k != 0.0 {
        let y3 = snap(p2.y, dy);
        let candidate = Vec2::new((y3 - c) / k, y3);
        if p2.distance_to(p3) > p2.distance_to(candidate) {
            p3 = candidate;
        }
    }

    p3
}

/// Cell that the segment arriving at `p2` from `p1` is inside of (or entering).
/// Points sitting on a grid line are nudged along the direction of travel.
#[inline]
pub fn hitting_cell(p1: Vec2, p2: Vec2) -> Cell {
    let sx = direction_sign(p2.x - p1.x);
    let sy = direction_sign(p2.y - p1.y);
    Cell::new(
        (p2.x + sx * EPSILON).floor() as i64,
        (p2.y + sy * EPSILON).floor() as i64,
    )
}

/// Where a cast ray stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec2,
    pub cell: Cell,
    /// Surface of the wall that stopped the ray; `None` when it left the grid.
    pub surface: Option<Color>,
}

impl RayHit {
    #[inline]
    pub fn is_wall(&self) -> bool {
        self.surface.is_some()
    }
}

/// `Some(hit)` when the ray `p1 -> p2` must stop at `p2`.
fn terminal(grid: &Grid, p1: Vec2, p2: Vec2) -> Option<RayHit> {
    let cell = hitting_cell(p1, p2);
    // A non-finite point floors to garbage, so treat it as having left the grid.
    if !p2.is_finite() || !grid.inside(cell) {
        return Some(RayHit {
            point: p2,
            cell,
            surface: None,
        });
    }
    grid.surface(cell).map(|surface| RayHit {
        point: p2,
        cell,
        surface: Some(surface),
    })
}

/// Walk the ray from `origin` through `target` until it enters a wall or
/// leaves the grid. `target` is the first point tested, so it should lie
/// between the origin and any wall (typically on the near plane).
pub fn cast_ray(grid: &Grid, origin: Vec2, target: Vec2) -> RayHit {
    let mut p1 = origin;
    let mut p2 = target;
    loop {
        if let Some(hit) = terminal(grid, p1, p2) {
            return hit;
        }
        let p3 = step(p1, p2);
        p1 = p2;
        p2 = p3;
    }
}

/// One point visited by a [`RayTrace`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracePoint {
    pub point: Vec2,
    pub cell: Cell,
    /// Set on the last point of the trace.
    pub hit: Option<RayHit>,
}

/// Iterator over every far point [`cast_ray`] visits, ending with the point
/// it would return.
pub struct RayTrace<'a> {
    grid: &'a Grid,
    p1: Vec2,
    p2: Vec2,
    done: bool,
}

impl<'a> RayTrace<'a> {
    pub fn new(grid: &'a Grid, origin: Vec2, target: Vec2) -> Self {
        Self {
            grid,
            p1: origin,
            p2: target,
            done: false,
        }
    }
}

impl Iterator for RayTrace<'_> {
    type Item = TracePoint;

    fn next(&mut self) -> Option<TracePoint> {
        if self.done {
            return None;
        }

        let point = self.p2;
        let cell = hitting_cell(self.p1, self.p2);
        let hit = terminal(self.grid, self.p1, self.p2);
        if hit.is_some() {
            self.done = true;
        } else {
            let p3 = step(self.p1, self.p2);
            self.p1 = self.p2;
            self.p2 = p3;
        }

        Some(TracePoint { point, cell, hit })
    }
}
