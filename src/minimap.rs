//! Top-down overlay of the grid, the player and the field of view.

use crate::camera::{Camera, Projection};
use crate::canvas::{Canvas, Color};
use crate::geometry::Vec2;
use crate::grid::Grid;
use crate::traversal::RayTrace;

const PLAYER_RADIUS: f64 = 0.2;
const TRACE_DOT_RADIUS: f64 = 0.1;

/// Where the minimap sits on screen, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapLayout {
    pub origin: Vec2,
    pub cell_size: f64,
}

impl MinimapLayout {
    /// Pixel size of the whole map.
    pub fn size(&self, grid: &Grid) -> Vec2 {
        let (cols, rows) = grid.size();
        Vec2::new(cols as f64, rows as f64) * self.cell_size
    }

    /// Grid-space position under a screen pixel, if it falls on the map.
    pub fn screen_to_grid(&self, grid: &Grid, pixel: Vec2) -> Option<Vec2> {
        let p = (pixel - self.origin).div(Vec2::new(self.cell_size, self.cell_size));
        let (cols, rows) = grid.size();
        let on_map = p.x >= 0.0 && p.y >= 0.0 && p.x < cols as f64 && p.y < rows as f64;
        on_map.then_some(p)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapStyle {
    pub background: Color,
    pub grid_lines: Color,
    pub player: Color,
    pub fov: Color,
    pub trace: Color,
}

impl Default for MinimapStyle {
    fn default() -> Self {
        Self {
            background: Color::rgb(16, 16, 16),
            grid_lines: Color::rgb(68, 68, 68),
            player: Color::rgb(255, 0, 255),
            fov: Color::rgb(255, 0, 255),
            trace: Color::rgb(255, 220, 0),
        }
    }
}

/// Every crossing the traversal makes from the player toward `target`,
/// ending where the ray stops.
pub fn trace_points(grid: &Grid, camera: &Camera, target: Vec2) -> Vec<Vec2> {
    if target == camera.pos {
        return Vec::new();
    }
    RayTrace::new(grid, camera.pos, target)
        .map(|step| step.point)
        .collect()
}

pub fn render_minimap<C: Canvas + ?Sized>(
    canvas: &mut C,
    grid: &Grid,
    camera: &Camera,
    projection: &Projection,
    layout: &MinimapLayout,
    style: &MinimapStyle,
    trace_target: Option<Vec2>,
) {
    let (cols, rows) = grid.size();
    let (w, h) = (cols as f64, rows as f64);

    canvas.reset_transform();
    canvas.translate(layout.origin);
    canvas.scale(Vec2::new(layout.cell_size, layout.cell_size));
    // From here on everything is in grid units
    canvas.set_line_width(1.0 / layout.cell_size);

    canvas.set_fill_color(style.background);
    canvas.fill_rect(Vec2::ZERO, Vec2::new(w, h));

    for (cell, color) in grid.occupied() {
        canvas.set_fill_color(color);
        canvas.fill_rect(Vec2::new(cell.x as f64, cell.y as f64), Vec2::new(1.0, 1.0));
    }

    canvas.set_stroke_color(style.grid_lines);
    for x in 0..=cols {
        let x = x as f64;
        canvas.stroke_line(Vec2::new(x, 0.0), Vec2::new(x, h));
    }
    for y in 0..=rows {
        let y = y as f64;
        canvas.stroke_line(Vec2::new(0.0, y), Vec2::new(w, y));
    }

    let frustum = camera.fov_range(projection);
    canvas.set_stroke_color(style.fov);
    canvas.stroke_line(camera.pos, frustum.left);
    canvas.stroke_line(frustum.left, frustum.right);
    canvas.stroke_line(frustum.right, camera.pos);

    if let Some(target) = trace_target {
        canvas.set_stroke_color(style.trace);
        canvas.set_fill_color(style.trace);
        let mut prev = camera.pos;
        for p in trace_points(grid, camera, target) {
            canvas.stroke_line(prev, p);
            canvas.fill_circle(p, TRACE_DOT_RADIUS);
            prev = p;
        }
    }

    canvas.set_fill_color(style.player);
    canvas.fill_circle(camera.pos, PLAYER_RADIUS);

    canvas.reset_transform();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Framebuffer;
    use crate::grid::Cell;

    const WALL: Color = Color::rgb(0, 200, 0);

    fn layout() -> MinimapLayout {
        MinimapLayout {
            origin: Vec2::new(10.0, 20.0),
            cell_size: 10.0,
        }
    }

    #[test]
    fn test_screen_to_grid() {
        let grid = Grid::new(4, 3);
        let l = layout();
        assert_eq!(l.size(&grid), Vec2::new(40.0, 30.0));
        assert_eq!(l.screen_to_grid(&grid, Vec2::new(25.0, 35.0)), Some(Vec2::new(1.5, 1.5)));
        assert_eq!(l.screen_to_grid(&grid, Vec2::new(5.0, 35.0)), None);
        assert_eq!(l.screen_to_grid(&grid, Vec2::new(50.0, 35.0)), None);
    }

    #[test]
    fn test_render_minimap() {
        let mut grid = Grid::new(4, 3);
        grid.set(Cell::new(3, 0), Some(WALL));
        let camera = Camera::new(Vec2::new(0.5, 2.5), 0.0);
        let projection = Projection::from_horizontal_fov(60.0, 0.5);
        let style = MinimapStyle::default();

        let mut buf = vec![0u32; 60 * 60];
        let mut fb = Framebuffer::new(&mut buf, 60, 60);
        render_minimap(&mut fb, &grid, &camera, &projection, &layout(), &style, None);

        // Wall cell (3, 0) spans pixels 40..50 x 20..30.
        assert_eq!(fb.pixel(45, 25), Some(WALL));
        // Empty cell (1, 0).
        assert_eq!(fb.pixel(25, 25), Some(style.background));
        // Grid line at x = 2.
        assert_eq!(fb.pixel(30, 27), Some(style.grid_lines));
        // Player marker.
        assert_eq!(fb.pixel(15, 45), Some(style.player));
        // Outside the map is untouched.
        assert_eq!(fb.pixel(5, 5), Some(Color(0)));
    }

    #[test]
    fn test_trace_points_follow_traversal() {
        let mut grid = Grid::new(6, 3);
        grid.set(Cell::new(4, 1), Some(WALL));
        let camera = Camera::new(Vec2::new(0.5, 1.5), 0.0);

        let points = trace_points(&grid, &camera, Vec2::new(1.5, 1.5));
        assert_eq!(
            points,
            vec![
                Vec2::new(1.5, 1.5),
                Vec2::new(2.0, 1.5),
                Vec2::new(3.0, 1.5),
                Vec2::new(4.0, 1.5),
            ]
        );
        assert!(trace_points(&grid, &camera, camera.pos).is_empty());
    }
}
