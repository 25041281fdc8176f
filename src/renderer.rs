use rayon::prelude::*;

use crate::camera::{Camera, Projection};
use crate::canvas::{Canvas, Color};
use crate::geometry::Vec2;
use crate::grid::Grid;
use crate::traversal::{RayHit, cast_ray};

/// Screen-space layout of the first-person view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneView {
    pub columns: usize, // rays per frame
    pub width: f64,     // pixels
    pub height: f64,    // pixels
    pub sky: Color,
    pub ground: Color,
}

impl SceneView {
    #[inline]
    pub fn column_width(&self) -> f64 {
        self.width / self.columns as f64
    }
}

/// One projected wall slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strip {
    pub column: usize,
    pub hit: RayHit,
    pub color: Color,
    pub distance: f64, // perpendicular, grid units
    pub top: f64,      // pixels
    pub height: f64,   // pixels
}

/// Cast the ray for `column` and project it, or `None` when the ray leaves
/// the grid without meeting a wall.
pub fn column_strip(
    grid: &Grid,
    camera: &Camera,
    projection: &Projection,
    view: &SceneView,
    column: usize,
) -> Option<Strip> {
    let frustum = camera.fov_range(projection);
    let target = frustum.column_target(column, view.columns);
    if target == camera.pos {
        return None; // zero near plane, nothing to cast
    }

    let hit = cast_ray(grid, camera.pos, target);
    let color = hit.surface?;

    let distance = camera.perpendicular_distance(hit.point);
    if !(distance > 0.0) {
        return None;
    }

    // Nearer walls are taller: a wall one cell away fills the view.
    let height = view.height / distance;
    Some(Strip {
        column,
        hit,
        color,
        distance,
        top: 0.5 * (view.height - height),
        height,
    })
}

/// Cast every column. Columns only read the grid and camera, so they are
/// computed in parallel.
pub fn cast_columns(
    grid: &Grid,
    camera: &Camera,
    projection: &Projection,
    view: &SceneView,
) -> Vec<Option<Strip>> {
    (0..view.columns)
        .into_par_iter()
        .map(|column| column_strip(grid, camera, projection, view, column))
        .collect()
}

pub fn render_scene<C: Canvas + ?Sized>(
    canvas: &mut C,
    grid: &Grid,
    camera: &Camera,
    projection: &Projection,
    view: &SceneView,
) {
    canvas.reset_transform();

    // Sky over the top half, ground below
    canvas.fill_background(view.sky);
    canvas.set_fill_color(view.ground);
    canvas.fill_rect(
        Vec2::new(0.0, 0.5 * view.height),
        Vec2::new(view.width, 0.5 * view.height),
    );

    if view.columns == 0 {
        return;
    }

    let col_w = view.column_width();
    for strip in cast_columns(grid, camera, projection, view).into_iter().flatten() {
        canvas.set_fill_color(strip.color);
        canvas.fill_rect(
            Vec2::new(strip.column as f64 * col_w, strip.top),
            Vec2::new(col_w, strip.height),
        );
    }
}
