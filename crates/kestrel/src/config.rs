//! # Game Configuration and Errors
//!
//! ```toml
//! map_width = 800.0
//! map_height = 640.0
//! view_width = 400.0
//! view_height = 300.0
//! target_fps = 60
//! max_frame_delta_ms = 100
//! debug = false
//!
//! [registry]
//! expected_entities = 2048
//! ```

use std::fs;
use std::path::Path;

use kestrel_ecs::{EcsError, RegistryConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the gameplay layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    /// A registry precondition failed.
    #[error(transparent)]
    Ecs(#[from] EcsError),

    /// Invalid configuration.
    #[error("invalid game configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for gameplay operations.
pub type GameResult<T> = Result<T, GameError>;

/// Game settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// World width in pixels.
    pub map_width: f32,
    /// World height in pixels.
    pub map_height: f32,
    /// Camera width in pixels.
    pub view_width: f32,
    /// Camera height in pixels.
    pub view_height: f32,
    /// Frame rate the budget is computed from.
    pub target_fps: u32,
    /// Longest simulated step; longer frames are clamped.
    pub max_frame_delta_ms: u64,
    /// Start in debug mode.
    pub debug: bool,
    /// Registry sizing.
    pub registry: RegistryConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_width: 25.0 * 32.0,
            map_height: 20.0 * 32.0,
            view_width: 400.0,
            view_height: 300.0,
            target_fps: 60,
            max_frame_delta_ms: 100,
            debug: false,
            registry: RegistryConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parses and validates a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] on malformed TOML or values that
    /// fail [`validate`](Self::validate).
    pub fn from_toml_str(text: &str) -> GameResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| GameError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] if the file cannot be read or is
    /// invalid.
    pub fn load(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| GameError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> GameResult<()> {
        if !(self.map_width > 0.0 && self.map_height > 0.0) {
            return Err(GameError::InvalidConfig("map size must be positive".into()));
        }
        if !(self.view_width > 0.0 && self.view_height > 0.0) {
            return Err(GameError::InvalidConfig("view size must be positive".into()));
        }
        if self.target_fps == 0 {
            return Err(GameError::InvalidConfig("target_fps must be at least 1".into()));
        }
        if self.max_frame_delta_ms == 0 {
            return Err(GameError::InvalidConfig(
                "max_frame_delta_ms must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Frame length at the target rate, in milliseconds.
    #[must_use]
    pub fn frame_ms(&self) -> u64 {
        (1000 / u64::from(self.target_fps.max(1))).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = GameConfig::from_toml_str(
            "target_fps = 30\n[registry]\nexpected_entities = 16\n",
        )
        .unwrap();
        assert_eq!(config.target_fps, 30);
        assert_eq!(config.registry.expected_entities, 16);
        assert_eq!(config.map_width, GameConfig::default().map_width);
        assert_eq!(config.frame_ms(), 33);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            GameConfig::from_toml_str("target_fps = 0"),
            Err(GameError::InvalidConfig(_))
        ));
        assert!(GameConfig::from_toml_str("map_width = -1.0").is_err());
        assert!(GameConfig::from_toml_str("speed = 3").is_err());
    }

    #[test]
    fn test_ecs_error_converts() {
        let err: GameError = EcsError::SystemNotRegistered("Render").into();
        assert_eq!(err.to_string(), "system not registered: Render");
    }
}
