//! Run configuration, read from an optional JSON file.
//!
//! Every field has a default, so a file only needs the keys it changes.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::camera::{Camera, Projection};
use crate::canvas::Color;
use crate::geometry::Vec2;
use crate::grid::{Cell, Grid, GridError};
use crate::minimap::MinimapLayout;

/// Map character for an empty cell.
pub const EMPTY_TILE: char = '.';

#[derive(Debug)]
pub enum SettingsError {
    Io { path: PathBuf, source: std::io::Error },
    Json(serde_json::Error),
    Grid(GridError),
    UnknownTile { row: usize, col: usize, tile: char },
    StartBlocked { x: f64, y: f64 },
    Invalid(&'static str),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            SettingsError::Json(e) => write!(f, "invalid settings JSON: {e}"),
            SettingsError::Grid(e) => write!(f, "invalid map: {e}"),
            SettingsError::UnknownTile { row, col, tile } => {
                write!(f, "map tile {tile:?} at row {row}, col {col} has no palette entry")
            }
            SettingsError::StartBlocked { x, y } => {
                write!(f, "player start ({x}, {y}) is not in an empty cell")
            }
            SettingsError::Invalid(what) => write!(f, "invalid setting: {what}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io { source, .. } => Some(source),
            SettingsError::Json(e) => Some(e),
            SettingsError::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Json(e)
    }
}

impl From<GridError> for SettingsError {
    fn from(e: GridError) -> Self {
        SettingsError::Grid(e)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimapSettings {
    pub enabled: bool,
    /// Top-left corner on the internal framebuffer, pixels
    pub origin: [f64; 2],
    /// Pixels per grid cell
    pub cell_size: f64,
}

impl Default for MinimapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            origin: [8.0, 8.0],
            cell_size: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStart {
    pub position: [f64; 2],
    pub heading_deg: f64,
}

impl Default for PlayerStart {
    fn default() -> Self {
        Self {
            position: [2.5, 5.5],
            heading_deg: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Window ===
    pub window_width: u32,
    pub window_height: u32,
    /// Height of the internal framebuffer; width follows the window aspect
    pub internal_height: usize,

    // === Projection ===
    /// Rays per frame; `None` casts one per internal pixel column
    pub columns: Option<usize>,
    pub fov_deg: f64,
    /// Near-plane distance, grid units
    pub near: f64,

    // === Input ===
    pub turn_step_deg: f64,
    /// Grid units per key press
    pub move_step: f64,

    // === Look ===
    pub sky: Color,
    pub ground: Color,
    pub minimap: MinimapSettings,

    // === World ===
    pub player: PlayerStart,
    /// One string per row; `.` is empty, any other character is looked up in `palette`
    pub map: Vec<String>,
    pub palette: BTreeMap<char, Color>,
}

impl Default for Settings {
    fn default() -> Self {
        let map = [
            "##########",
            "#........#",
            "#..R.....#",
            "#........#",
            "#....GG..#",
            "#....G...#",
            "#........#",
            "#.B......#",
            "#........#",
            "##########",
        ];
        let palette = BTreeMap::from([
            ('#', Color::rgb(200, 200, 200)),
            ('R', Color::rgb(250, 120, 120)),
            ('G', Color::rgb(120, 250, 140)),
            ('B', Color::rgb(130, 150, 250)),
        ]);

        Self {
            window_width: 800,
            window_height: 600,
            internal_height: 480,

            columns: None,
            fov_deg: 90.0,
            near: 0.5,

            turn_step_deg: 15.0,
            move_step: 0.25,

            sky: Color::rgb(30, 30, 70),
            ground: Color::rgb(40, 40, 40),
            minimap: MinimapSettings::default(),

            player: PlayerStart::default(),
            map: map.iter().map(|row| row.to_string()).collect(),
            palette,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Checks value ranges and that the map and start position are usable.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.fov_deg > 0.0 && self.fov_deg < 180.0) {
            return Err(SettingsError::Invalid("fov_deg must be in (0, 180)"));
        }
        if !(self.near > 0.0) {
            return Err(SettingsError::Invalid("near must be positive"));
        }
        if self.columns == Some(0) {
            return Err(SettingsError::Invalid("columns must be positive"));
        }
        if self.internal_height == 0 {
            return Err(SettingsError::Invalid("internal_height must be positive"));
        }
        if !(self.move_step > 0.0) || !(self.turn_step_deg > 0.0) {
            return Err(SettingsError::Invalid("move and turn steps must be positive"));
        }
        if !(self.minimap.cell_size > 0.0) {
            return Err(SettingsError::Invalid("minimap cell_size must be positive"));
        }

        let grid = self.build_grid()?;
        let [x, y] = self.player.position;
        let cell = Cell::new(x.floor() as i64, y.floor() as i64);
        if !x.is_finite() || !y.is_finite() || grid.get(cell) != Some(None) {
            return Err(SettingsError::StartBlocked { x, y });
        }
        Ok(())
    }

    pub fn build_grid(&self) -> Result<Grid, SettingsError> {
        let mut table = Vec::with_capacity(self.map.len());
        for (row, line) in self.map.iter().enumerate() {
            let cells = line
                .chars()
                .enumerate()
                .map(|(col, tile)| match tile {
                    EMPTY_TILE => Ok(None),
                    _ => self
                        .palette
                        .get(&tile)
                        .copied()
                        .map(Some)
                        .ok_or_else(|| SettingsError::UnknownTile { row, col, tile }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            table.push(cells);
        }
        Ok(Grid::from_rows(table)?)
    }

    pub fn projection(&self) -> Projection {
        Projection::from_horizontal_fov(self.fov_deg, self.near)
    }

    pub fn camera(&self) -> Camera {
        let [x, y] = self.player.position;
        Camera::new(Vec2::new(x, y), self.player.heading_deg.to_radians())
    }

    pub fn minimap_layout(&self) -> MinimapLayout {
        let [x, y] = self.minimap.origin;
        MinimapLayout {
            origin: Vec2::new(x, y),
            cell_size: self.minimap.cell_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        let grid = settings.build_grid().unwrap();
        assert_eq!(grid.size(), (10, 10));
        assert!(grid.is_occupied(Cell::new(0, 0)));
        assert_eq!(grid.surface(Cell::new(3, 2)), Some(Color::rgb(250, 120, 120)));
        assert!(!grid.is_occupied(Cell::new(1, 1)));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "fov_deg": 60.0, "minimap": { "enabled": false } }"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.fov_deg, 60.0);
        assert!(!settings.minimap.enabled);
        assert_eq!(settings.minimap.cell_size, 12.0);
        assert_eq!(settings.map, Settings::default().map);
    }

    #[test]
    fn test_custom_map_and_palette() {
        let json = r#"{
            "map": ["xxx", "x.x", "xxx"],
            "palette": { "x": [1, 2, 3] },
            "player": { "position": [1.5, 1.5], "heading_deg": 90.0 }
        }"#;
        let settings = Settings::from_json(json).unwrap();
        let grid = settings.build_grid().unwrap();
        assert_eq!(grid.size(), (3, 3));
        assert_eq!(grid.surface(Cell::new(0, 1)), Some(Color::rgb(1, 2, 3)));
        let camera = settings.camera();
        assert!((camera.heading - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_bundled_map_loads() {
        let settings = Settings::from_json(include_str!("../maps/pillars.json")).unwrap();
        let grid = settings.build_grid().unwrap();
        assert_eq!(grid.size(), (14, 10));
        assert_eq!(grid.surface(Cell::new(6, 4)), Some(Color::rgb(90, 200, 220)));
    }

    #[test]
    fn test_rejects_unknown_tile() {
        let json = r##"{ "map": ["#?#"], "player": { "position": [0.5, 0.5] } }"##;
        match Settings::from_json(json) {
            Err(SettingsError::UnknownTile { row: 0, col: 1, tile: '?' }) => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_rejects_ragged_map() {
        let json = r#"{ "map": ["...", ".."], "player": { "position": [0.5, 0.5] } }"#;
        assert!(matches!(
            Settings::from_json(json),
            Err(SettingsError::Grid(GridError::RaggedRow { row: 1, .. }))
        ));
    }

    #[test]
    fn test_rejects_blocked_start() {
        let json = r#"{ "player": { "position": [0.5, 0.5] } }"#;
        assert!(matches!(
            Settings::from_json(json),
            Err(SettingsError::StartBlocked { .. })
        ));
        let json = r#"{ "player": { "position": [42.0, 0.5] } }"#;
        assert!(matches!(
            Settings::from_json(json),
            Err(SettingsError::StartBlocked { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_values() {
        for json in [
            r#"{ "fov_deg": 180.0 }"#,
            r#"{ "near": 0.0 }"#,
            r#"{ "columns": 0 }"#,
            r#"{ "move_step": -1.0 }"#,
        ] {
            assert!(
                matches!(Settings::from_json(json), Err(SettingsError::Invalid(_))),
                "{json}"
            );
        }
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(SettingsError::Json(_))
        ));
    }
}
