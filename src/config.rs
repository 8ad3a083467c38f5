//! Game configuration loaded from an external RON file.
//!
//! Every section carries `#[serde(default)]`, so a config file only needs the
//! values it wants to change. Missing or malformed files fall back to the
//! built-in defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "assets/config/maze_explorer.ron";

/// Inclusive `(min, max)` range used for random counts and sizes.
pub type Span = (u32, u32);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub maze: MazeConfig,
    pub content: ContentConfig,
    pub camera: CameraConfig,
    pub render: RenderConfig,
    pub player: PlayerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub target_fps: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            target_fps: 60,
        }
    }
}

/// Maze generator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// Requested width; forced odd and at least the generator minimum.
    pub width: usize,
    pub height: usize,
    /// Spacing between carving decision points.
    pub coarse_step: u32,
    /// Corridors are `2 * corridor_half_width + 1` cells wide.
    pub corridor_half_width: u32,
    pub room_attempts: Span,
    /// Room footprint size range; only odd sizes are drawn.
    pub room_size: Span,
    /// Minimum distance between a room footprint and the grid edge.
    pub room_margin: u32,
    /// Share of a room footprint that must still be wall for it to be accepted.
    pub room_wall_coverage: f32,
    pub room_connections: Span,
    /// How far a room connector may tunnel looking for an open cell.
    pub connector_reach: u32,
    pub loop_connections: Span,
    pub loop_probability: f64,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            width: 81,
            height: 81,
            coarse_step: 12,
            corridor_half_width: 3,
            room_attempts: (8, 15),
            room_size: (15, 25),
            room_margin: 5,
            room_wall_coverage: 0.8,
            room_connections: (2, 4),
            connector_reach: 12,
            loop_connections: (15, 25),
            loop_probability: 0.3,
        }
    }
}

/// Monster and treasure placement parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub monster_count: Span,
    /// Minimum Manhattan distance between two monsters.
    pub monster_spacing: u32,
    pub monster_health: Span,
    pub room_health_bonus: Span,
    pub treasure_count: Span,
    /// Chance for any open cell to become a random treasure candidate.
    pub treasure_random_chance: f64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            monster_count: (20, 35),
            monster_spacing: 3,
            monster_health: (2, 4),
            room_health_bonus: (1, 2),
            treasure_count: (15, 25),
            treasure_random_chance: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 70.0,
            near: 0.001,
            far: 500.0,
        }
    }
}

/// Software renderer parameters. Distances are in grid cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub base_level: f32,
    pub wall_height: f32,
    /// The floor sits this far below `base_level`.
    pub floor_offset: f32,
    pub floor_radius: i32,
    pub floor_sample_step: usize,
    /// Floor quads are dropped unless every corner is nearer than this.
    pub floor_max_depth: f32,
    /// Floor quads whose average depth reaches this are dropped.
    pub floor_fade_depth: f32,
    pub wall_radius: i32,
    pub wall_cull_margin: f32,
    pub wall_clip_near: f32,
    pub occlusion_step: f32,
    pub occlusion_min_distance: f32,
    pub monster_cutoff: f32,
    pub treasure_cutoff: f32,
    pub monster_max_depth: f32,
    pub treasure_max_depth: f32,
    pub monster_glyph_depth: f32,
    pub treasure_glyph_depth: f32,
    pub minimap_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            base_level: 0.0,
            wall_height: 8.0,
            floor_offset: 1.0,
            floor_radius: 35,
            floor_sample_step: 1,
            floor_max_depth: 120.0,
            floor_fade_depth: 80.0,
            wall_radius: 25,
            wall_cull_margin: 5.0,
            wall_clip_near: 0.05,
            occlusion_step: 0.5,
            occlusion_min_distance: 3.0,
            monster_cutoff: 50.0,
            treasure_cutoff: 40.0,
            monster_max_depth: 100.0,
            treasure_max_depth: 80.0,
            monster_glyph_depth: 20.0,
            treasure_glyph_depth: 15.0,
            minimap_size: 120,
        }
    }
}

impl RenderConfig {
    /// World height of the walkable floor plane.
    pub fn floor_level(&self) -> f32 {
        self.base_level - self.floor_offset
    }
}

/// Player movement, physics and stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Walking speed in cells per second.
    pub speed: f32,
    pub sprint_multiplier: f32,
    /// Degrees of rotation per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    pub pitch_limit_degrees: f32,
    pub gravity: f32,
    pub jump_strength: f32,
    pub eye_height: f32,
    pub collision_buffer: f32,
    pub max_hp: i32,
    pub interact_radius: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 12.0,
            sprint_multiplier: 1.8,
            mouse_sensitivity: 0.15,
            pitch_limit_degrees: 80.0,
            gravity: -15.0,
            jump_strength: 5.0,
            eye_height: 1.7,
            collision_buffer: 0.2,
            max_hp: 5,
            interact_radius: 2.5,
        }
    }
}

impl GameConfig {
    /// Parse a config from RON text.
    pub fn from_ron(source: &str, path: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = ron::from_str(source).map_err(|e| ConfigError::Parse {
            path: path.to_string(),
            details: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_ron(&contents, &display)
    }

    /// Load a config file, falling back to defaults on any problem.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e @ ConfigError::Read { .. }) => {
                log::warn!("{e}. Using defaults.");
                Self::default()
            }
            Err(e) => {
                log::error!("{e}. Using defaults.");
                Self::default()
            }
        }
    }

    /// Reject values the generator or renderer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let camera = &self.camera;
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid {
                field: "camera.fov_degrees",
                reason: format!("{} is outside (0, 180)", camera.fov_degrees),
            });
        }
        if !(camera.near > 0.0 && camera.near < camera.far) {
            return Err(ConfigError::Invalid {
                field: "camera.near",
                reason: format!("need 0 < near ({}) < far ({})", camera.near, camera.far),
            });
        }
        if self.maze.coarse_step < 2 {
            return Err(ConfigError::Invalid {
                field: "maze.coarse_step",
                reason: "must be at least 2".to_string(),
            });
        }
        if self.render.floor_sample_step == 0 {
            return Err(ConfigError::Invalid {
                field: "render.floor_sample_step",
                reason: "must be at least 1".to_string(),
            });
        }

        let spans: [(&'static str, Span); 8] = [
            ("maze.room_attempts", self.maze.room_attempts),
            ("maze.room_size", self.maze.room_size),
            ("maze.room_connections", self.maze.room_connections),
            ("maze.loop_connections", self.maze.loop_connections),
            ("content.monster_count", self.content.monster_count),
            ("content.monster_health", self.content.monster_health),
            ("content.room_health_bonus", self.content.room_health_bonus),
            ("content.treasure_count", self.content.treasure_count),
        ];
        for (field, (min, max)) in spans {
            if min > max {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("min {min} is greater than max {max}"),
                });
            }
        }

        let probabilities = [
            ("maze.loop_probability", self.maze.loop_probability),
            ("content.treasure_random_chance", self.content.treasure_random_chance),
        ];
        for (field, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{p} is not a probability"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_valid() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = GameConfig::from_ron(
            "(maze: (width: 41, height: 31), camera: (fov_degrees: 90.0))",
            "inline",
        )
        .unwrap();
        assert_eq!(config.maze.width, 41);
        assert_eq!(config.maze.height, 31);
        assert_eq!(config.maze.coarse_step, MazeConfig::default().coarse_step);
        assert_eq!(config.camera.fov_degrees, 90.0);
        assert_eq!(config.player, PlayerConfig::default());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let err = GameConfig::from_ron("(maze: (width: \"wide\"))", "inline").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut config = GameConfig::default();
        config.content.monster_count = (10, 2);
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Invalid { field: "content.monster_count", .. }),
            "{err}"
        );
    }

    #[test]
    fn near_plane_must_be_in_front_of_far_plane() {
        let mut config = GameConfig::default();
        config.camera.near = 600.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = GameConfig::load_or_default(Path::new("does/not/exist.ron"));
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn bundled_config_file_parses() {
        let source = include_str!("../assets/config/maze_explorer.ron");
        let config = GameConfig::from_ron(source, DEFAULT_CONFIG_PATH).unwrap();
        let defaults = GameConfig::default();
        assert_eq!(config.window, defaults.window);
        assert_eq!(config.content, defaults.content);
        assert_eq!(config.maze.width, defaults.maze.width);
        assert_eq!(config.maze.room_size, defaults.maze.room_size);
        assert_eq!(config.render.wall_radius, defaults.render.wall_radius);
    }
}
