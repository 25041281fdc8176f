//! Grid raycaster: a first-person view of a 2D tile map, one ray per screen column.
//!
//! Core modules:
//! - `traversal`: walks a ray across grid lines until it meets a wall
//! - `camera`: player pose, view frustum and fisheye-free distances
//! - `renderer`: per-column wall strips
//! - `minimap`: top-down overlay of the map, player and field of view
//! - `canvas`: drawing surface and the software framebuffer behind it

pub mod camera;
pub mod canvas;
pub mod geometry;
pub mod grid;
pub mod input;
pub mod minimap;
pub mod renderer;
pub mod scaler;
pub mod session;
pub mod settings;
pub mod traversal;

pub use geometry::Vec2;
pub use grid::{Cell, Grid};
pub use session::Session;
pub use settings::Settings;
