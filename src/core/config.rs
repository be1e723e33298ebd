//! Engine Configuration
//!
//! Supplied once at startup and shared read-only afterwards. Every loader
//! validates before handing the config out, so a degenerate value can never
//! reach the loop.

use std::path::Path;
use std::time::Duration;
use serde::{Serialize, Deserialize};

use super::error::ConfigError;

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// World width in tiles.
    pub world_width: i32,
    /// World height in tiles.
    pub world_height: i32,
    /// Viewport width in tiles.
    pub viewport_width: i32,
    /// Viewport height in tiles.
    pub viewport_height: i32,
    /// Spatial hash cell edge length (tiles).
    pub cell_size: i32,
    /// Fixed simulation rate (Hz).
    pub tick_rate: u32,
    /// Tiles the tracked target may approach a viewport edge before the camera moves.
    pub camera_deadzone_margin: i32,
    /// Upper bound on logic steps run per loop iteration.
    pub max_catchup_steps: u32,
    /// Minimum seconds between repeated moves while a direction key is held.
    pub move_interval_secs: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            world_width: 80,
            world_height: 45,
            viewport_width: 80,
            viewport_height: 45,
            cell_size: 16,
            tick_rate: crate::TICK_RATE,
            camera_deadzone_margin: 3,
            max_catchup_steps: 5,
            move_interval_secs: 0.12, // ~8.3 moves per second
        }
    }
}

impl EngineConfig {
    /// Config whose viewport covers the whole world.
    pub fn new(world_width: i32, world_height: i32, cell_size: i32) -> Self {
        Self {
            world_width,
            world_height,
            viewport_width: world_width,
            viewport_height: world_height,
            cell_size,
            ..Self::default()
        }
    }

    /// Set the viewport size.
    pub fn with_viewport(mut self, width: i32, height: i32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Reject degenerate values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dims = [
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
            ("cell_size", self.cell_size),
        ];
        for (field, value) in dims {
            if value <= 0 {
                return Err(ConfigError::NonPositive { field, value: value as i64 });
            }
        }

        if self.tick_rate == 0 {
            return Err(ConfigError::NonPositive { field: "tick_rate", value: 0 });
        }
        if self.max_catchup_steps == 0 {
            return Err(ConfigError::NonPositive { field: "max_catchup_steps", value: 0 });
        }
        if self.camera_deadzone_margin < 0 {
            return Err(ConfigError::NegativeMargin(self.camera_deadzone_margin));
        }
        if !self.move_interval_secs.is_finite() || self.move_interval_secs < 0.0 {
            return Err(ConfigError::InvalidMoveInterval(self.move_interval_secs));
        }

        Ok(())
    }

    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Duration of one logic step.
    pub fn fixed_step(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.tick_rate.max(1) as u64)
    }

    /// Duration of one logic step in seconds.
    pub fn fixed_dt(&self) -> f64 {
        1.0 / self.tick_rate.max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_cell_size() {
        let config = EngineConfig::new(10, 10, 0);
        match config.validate() {
            Err(ConfigError::NonPositive { field, value }) => {
                assert_eq!(field, "cell_size");
                assert_eq!(value, 0);
            }
            other => panic!("expected NonPositive, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_negative_viewport() {
        let config = EngineConfig::new(10, 10, 4).with_viewport(-1, 5);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "viewport_width", .. })
        ));
    }

    #[test]
    fn test_rejects_zero_catchup_and_bad_interval() {
        let mut config = EngineConfig::default();
        config.max_catchup_steps = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.move_interval_secs = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMoveInterval(_))));

        let mut config = EngineConfig::default();
        config.camera_deadzone_margin = -2;
        assert!(matches!(config.validate(), Err(ConfigError::NegativeMargin(-2))));
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "world_width": 10, "world_height": 12 }"#)
            .unwrap();
        assert_eq!(config.world_width, 10);
        assert_eq!(config.world_height, 12);
        assert_eq!(config.cell_size, 16);
        assert_eq!(config.tick_rate, 60);
    }

    #[test]
    fn test_json_degenerate_rejected_at_load() {
        let result = EngineConfig::from_json_str(r#"{ "cell_size": -4 }"#);
        assert!(matches!(result, Err(ConfigError::NonPositive { field: "cell_size", .. })));

        let result = EngineConfig::from_json_str("not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_fixed_step() {
        let mut config = EngineConfig::default();
        config.tick_rate = 50;
        assert_eq!(config.fixed_step(), Duration::from_millis(20));
        assert!((config.fixed_dt() - 0.02).abs() < 1e-12);
    }
}
