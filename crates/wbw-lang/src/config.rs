use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// How touch input is mapped onto virtual keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TouchMode {
    /// Enabled once the host reports its first touch.
    #[default]
    Auto,
    On,
    Off,
}

impl TouchMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "on" | "1" | "true" => Some(Self::On),
            "off" | "0" | "false" => Some(Self::Off),
            _ => None,
        }
    }
}

/// Engine tunables. Every field has a default so a partial JSON file works.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Logical frames per second; `frame()` throttles to this rate.
    pub fps: f64,
    /// Initial viewport size in pixels.
    pub width: f64,
    pub height: f64,
    /// Added to the player's vertical velocity every frame.
    pub gravity: f64,
    /// Horizontal damping factor applied every frame (1.0 = no friction).
    pub friction: f64,
    pub jump_power: f64,
    pub max_fall_speed: f64,
    pub player_size: [f64; 2],
    /// Bullets further than this outside the world are despawned.
    pub bullet_margin: f64,
    pub message_seconds: f64,
    pub camera_lerp: f64,
    pub max_loop_iterations: usize,
    pub touch: TouchMode,
    /// Seed for the script RNG; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fps: 60.0,
            width: 800.0,
            height: 450.0,
            gravity: 0.5,
            friction: 0.8,
            jump_power: 10.0,
            max_fall_speed: 15.0,
            player_size: [32.0, 32.0],
            bullet_margin: 50.0,
            message_seconds: 2.0,
            camera_lerp: 0.15,
            max_loop_iterations: 10_000,
            touch: TouchMode::Auto,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Seconds per logical frame.
    pub fn frame_seconds(&self) -> f64 {
        if self.fps > 0.0 { 1.0 / self.fps } else { 1.0 / 60.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = EngineConfig::from_json_str(r#"{ "fps": 30, "touch": "off" }"#).unwrap();
        assert_eq!(cfg.fps, 30.0);
        assert_eq!(cfg.touch, TouchMode::Off);
        assert_eq!(cfg.gravity, 0.5);
        assert_eq!(cfg.player_size, [32.0, 32.0]);
        assert!(cfg.seed.is_none());
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = EngineConfig::from_json_str("{ fps: }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = EngineConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn touch_mode_parse() {
        assert_eq!(TouchMode::parse("AUTO"), Some(TouchMode::Auto));
        assert_eq!(TouchMode::parse("on"), Some(TouchMode::On));
        assert_eq!(TouchMode::parse("0"), Some(TouchMode::Off));
        assert_eq!(TouchMode::parse("maybe"), None);
    }
}
