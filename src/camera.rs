use std::f64::consts::PI;

use crate::geometry::Vec2;
use crate::grid::Grid;
use crate::traversal::hitting_cell;

/// Field of view and near-plane distance; fixed for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov: f64,  // radians, full horizontal angle
    pub near: f64, // distance from the eye to the near plane, grid units
}

impl Projection {
    pub fn from_horizontal_fov(fov_deg: f64, near: f64) -> Self {
        Self {
            fov: fov_deg.to_radians(),
            near,
        }
    }
}

/// Edge points of the near plane, as seen from the camera: `left` maps to
/// screen column 0, `right` to the last column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub left: Vec2,
    pub right: Vec2,
}

impl Frustum {
    /// Near-plane point for screen column `column` of `columns`.
    #[inline]
    pub fn column_target(&self, column: usize, columns: usize) -> Vec2 {
        let t = column as f64 / columns as f64;
        self.left.lerp(self.right, t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pos: Vec2,    // grid units
    pub heading: f64, // radians; 0 faces +x, PI/2 faces +y (down the screen)
}

impl Camera {
    pub fn new(pos: Vec2, heading: f64) -> Self {
        Self {
            pos,
            heading: wrap_angle(heading),
        }
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        Vec2::from_angle(self.heading)
    }

    /// Frustum edges: the near-plane center pushed `tan(fov/2) * near` to
    /// either side. With y pointing down, `rot90` of the heading is the
    /// camera's right-hand side.
    pub fn fov_range(&self, projection: &Projection) -> Frustum {
        let dir = self.direction();
        let center = self.pos + dir * projection.near;
        let half = (0.5 * projection.fov).tan() * projection.near;
        let side = dir.rot90() * half;
        Frustum {
            left: center - side,
            right: center + side,
        }
    }

    /// Distance of `point` along the view axis. Using this instead of the
    /// straight-line distance keeps flat walls flat on screen.
    #[inline]
    pub fn perpendicular_distance(&self, point: Vec2) -> f64 {
        self.direction().dot(point - self.pos)
    }

    pub fn turn(&mut self, delta: f64) {
        self.heading = wrap_angle(self.heading + delta);
    }

    /// Move `distance` along the heading (negative backs up). Refused when the
    /// destination is outside the grid or inside an occupied cell.
    pub fn advance(&mut self, grid: &Grid, distance: f64) -> bool {
        let dest = self.pos + self.direction() * distance;
        // Floor the destination itself; no directional bias for a resting point.
        let cell = hitting_cell(dest, dest);
        if !dest.is_finite() || !grid.inside(cell) || grid.is_occupied(cell) {
            return false;
        }
        self.pos = dest;
        true
    }
}

/// Wrap to [-PI, PI) so the heading does not drift after many turns.
#[inline]
pub fn wrap_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(2.0 * PI) - PI
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Color;
    use crate::grid::Cell;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    const WALL: Color = Color::rgb(255, 255, 255);

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_fov_range_facing_right() {
        let cam = Camera::new(Vec2::new(1.0, 1.0), 0.0);
        let f = cam.fov_range(&Projection::from_horizontal_fov(90.0, 1.0));
        // tan(45) = 1: edges one unit either side of the near-plane center.
        assert!(close(f.left.x, 2.0) && close(f.left.y, 0.0));
        assert!(close(f.right.x, 2.0) && close(f.right.y, 2.0));
    }

    #[test]
    fn test_fov_range_is_symmetric_for_any_heading() {
        let proj = Projection::from_horizontal_fov(66.0, 0.5);
        for i in 0..32 {
            let heading = -PI + i as f64 * (2.0 * PI / 32.0);
            let cam = Camera::new(Vec2::new(3.2, 4.7), heading);
            let f = cam.fov_range(&proj);

            // Equidistant from the eye.
            assert!(close(cam.pos.distance_to(f.left), cam.pos.distance_to(f.right)));
            // Mirror images about the heading ray.
            assert!(close(
                cam.perpendicular_distance(f.left),
                cam.perpendicular_distance(f.right)
            ));
            assert!(close(cam.perpendicular_distance(f.left), proj.near));
            let side = cam.direction().rot90();
            let l = side.dot(f.left - cam.pos);
            let r = side.dot(f.right - cam.pos);
            assert!(close(l, -r), "heading {heading}: {l} vs {r}");
            assert!(r > 0.0);
        }
    }

    #[test]
    fn test_column_targets_span_frustum() {
        let cam = Camera::new(Vec2::new(0.0, 0.0), 0.0);
        let f = cam.fov_range(&Projection::from_horizontal_fov(90.0, 1.0));
        assert_eq!(f.column_target(0, 4), f.left);
        let mid = f.column_target(2, 4);
        assert!(close(mid.x, 1.0) && close(mid.y, 0.0));
    }

    #[test]
    fn test_perpendicular_distance() {
        let cam = Camera::new(Vec2::new(1.0, 1.0), FRAC_PI_2);
        assert!(close(cam.perpendicular_distance(Vec2::new(1.0, 4.0)), 3.0));
        // Off-axis points at the same depth project to the same distance.
        assert!(close(cam.perpendicular_distance(Vec2::new(-5.0, 4.0)), 3.0));
        assert!(close(cam.perpendicular_distance(Vec2::new(1.0, 0.0)), -1.0));
    }

    #[test]
    fn test_turn_wraps() {
        let mut cam = Camera::new(Vec2::ZERO, 0.0);
        for _ in 0..9 {
            cam.turn(FRAC_PI_4);
        }
        assert!(close(cam.heading, FRAC_PI_4));
        cam.turn(-FRAC_PI_2);
        assert!(close(cam.heading, -FRAC_PI_4));
        assert!((-PI..PI).contains(&wrap_angle(3.0 * PI)));
    }

    #[test]
    fn test_advance_respects_walls_and_bounds() {
        let mut grid = Grid::new(4, 3);
        grid.set(Cell::new(3, 1), Some(WALL));
        let mut cam = Camera::new(Vec2::new(1.5, 1.5), 0.0);

        assert!(cam.advance(&grid, 1.0));
        assert_eq!(cam.pos, Vec2::new(2.5, 1.5));
        // Next cell is a wall.
        assert!(!cam.advance(&grid, 1.0));
        assert_eq!(cam.pos, Vec2::new(2.5, 1.5));
        // Backing up is fine, off the map is not.
        assert!(cam.advance(&grid, -2.0));
        assert!(!cam.advance(&grid, -1.0));
        assert_eq!(cam.pos, Vec2::new(0.5, 1.5));
    }
}
