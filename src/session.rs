//! Everything one running view owns: the map, the player and the fixed
//! projection and look settings.

use crate::camera::{Camera, Projection};
use crate::canvas::{Canvas, Color};
use crate::geometry::Vec2;
use crate::grid::Grid;
use crate::input::PoseCommand;
use crate::minimap::{MinimapLayout, MinimapStyle, render_minimap};
use crate::renderer::{SceneView, render_scene};
use crate::settings::{Settings, SettingsError};

pub struct Session {
    grid: Grid,
    camera: Camera,
    projection: Projection,

    turn_step: f64, // radians
    move_step: f64, // grid units

    columns: Option<usize>,
    sky: Color,
    ground: Color,

    minimap: Option<MinimapLayout>,
    minimap_style: MinimapStyle,
    /// Grid point under the pointer while it hovers the minimap
    trace_target: Option<Vec2>,
}

impl Session {
    pub fn new(settings: &Settings) -> Result<Self, SettingsError> {
        settings.validate()?;
        let grid = settings.build_grid()?;
        let camera = settings.camera();
        log::info!(
            "Map {}x{}, player at ({:.2}, {:.2})",
            grid.cols(),
            grid.rows(),
            camera.pos.x,
            camera.pos.y
        );

        Ok(Self {
            grid,
            camera,
            projection: settings.projection(),
            turn_step: settings.turn_step_deg.to_radians(),
            move_step: settings.move_step,
            columns: settings.columns,
            sky: settings.sky,
            ground: settings.ground,
            minimap: settings.minimap.enabled.then(|| settings.minimap_layout()),
            minimap_style: MinimapStyle::default(),
            trace_target: None,
        })
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Map edits between frames.
    #[inline]
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn trace_target(&self) -> Option<Vec2> {
        self.trace_target
    }

    /// Apply a pose change. Returns true if the view needs redrawing.
    pub fn apply(&mut self, command: PoseCommand) -> bool {
        let changed = match command {
            PoseCommand::TurnLeft => {
                self.camera.turn(-self.turn_step);
                true
            }
            PoseCommand::TurnRight => {
                self.camera.turn(self.turn_step);
                true
            }
            PoseCommand::Forward => self.camera.advance(&self.grid, self.move_step),
            PoseCommand::Backward => self.camera.advance(&self.grid, -self.move_step),
        };

        if changed {
            log::debug!(
                "{command:?}: pos ({:.2}, {:.2}) heading {:.1} deg",
                self.camera.pos.x,
                self.camera.pos.y,
                self.camera.heading.to_degrees()
            );
        } else {
            log::debug!("{command:?} blocked");
        }
        changed
    }

    /// Pointer moved to `pixel` on the internal framebuffer (`None` when it
    /// left the window). Returns true if the trace overlay changed.
    pub fn point_at(&mut self, pixel: Option<Vec2>) -> bool {
        let target = match (self.minimap, pixel) {
            (Some(layout), Some(pixel)) => layout.screen_to_grid(&self.grid, pixel),
            _ => None,
        };
        let changed = target != self.trace_target;
        self.trace_target = target;
        changed
    }

    /// Full render pass: first-person view, then the minimap on top.
    pub fn render<C: Canvas + ?Sized>(&self, canvas: &mut C, width: usize, height: usize) {
        let view = SceneView {
            columns: self.columns.unwrap_or(width),
            width: width as f64,
            height: height as f64,
            sky: self.sky,
            ground: self.ground,
        };
        render_scene(canvas, &self.grid, &self.camera, &self.projection, &view);

        if let Some(layout) = &self.minimap {
            render_minimap(
                canvas,
                &self.grid,
                &self.camera,
                &self.projection,
                layout,
                &self.minimap_style,
                self.trace_target,
            );
        }
    }
}
