//! Viewer configuration.
//!
//! Files may be YAML (`.yaml`, `.yml`) or JSON (`.json`). Missing fields fall
//! back to [`ViewerConfig::default`].

use crate::types::Perspective;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or encoding a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config extension: {0:?}")]
    UnsupportedFormat(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Camera translation speed in units per second.
    pub move_speed: f32,
    /// Radians of yaw/pitch per pixel of drag.
    pub rotate_sensitivity: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub initial_position: Vec3,
    pub surface_width: u32,
    pub surface_height: u32,
    /// Opaque selector naming the output the surface binds to.
    pub surface_target: String,
    pub vertex_shader: String,
    pub fragment_shader: String,
    pub mesh: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            rotate_sensitivity: 0.005,
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            initial_position: Vec3::new(0.0, 0.0, 5.0),
            surface_width: 1920,
            surface_height: 1080,
            surface_target: "#canvas".into(),
            vertex_shader: "pbr.vert".into(),
            fragment_shader: "pbr.frag".into(),
            mesh: "cube".into(),
        }
    }
}

impl ViewerConfig {
    /// Load a configuration file, picking the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let config = match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml(&text)?,
            "json" => serde_json::from_str::<Self>(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values the viewer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(ConfigError::Invalid(format!(
                "clip planes must satisfy 0 < near < far (near={}, far={})",
                self.near, self.far
            )));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "fov_degrees out of range: {}",
                self.fov_degrees
            )));
        }
        if self.move_speed < 0.0 {
            return Err(ConfigError::Invalid("move_speed must not be negative".into()));
        }
        Ok(())
    }

    /// Projection for a surface of the given pixel size.
    pub fn perspective(&self, width: u32, height: u32) -> Perspective {
        Perspective::new(
            self.fov_degrees,
            Perspective::aspect_for(width, height),
            self.near,
            self.far,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.move_speed, 5.0);
        assert_eq!(config.surface_target, "#canvas");
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = ViewerConfig::from_yaml("move_speed: 2.5\nmesh: plane\n").unwrap();
        assert_eq!(config.move_speed, 2.5);
        assert_eq!(config.mesh, "plane");
        assert_eq!(config.fov_degrees, 45.0);
    }

    #[test]
    fn yaml_roundtrip_preserves_position() {
        let mut config = ViewerConfig::default();
        config.initial_position = Vec3::new(1.0, 2.0, 3.0);
        let text = config.to_yaml().unwrap();
        let back = ViewerConfig::from_yaml(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn validate_rejects_inverted_clip_planes() {
        let config = ViewerConfig {
            near: 10.0,
            far: 1.0,
            ..ViewerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_reads_json_by_extension() {
        let dir = std::env::temp_dir().join(format!("vantage-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("viewer.json");
        std::fs::write(&path, r#"{"rotate_sensitivity": 0.01}"#).unwrap();

        let config = ViewerConfig::load(&path).unwrap();
        assert_eq!(config.rotate_sensitivity, 0.01);

        let bad = dir.join("viewer.toml");
        std::fs::write(&bad, "").unwrap();
        assert!(matches!(
            ViewerConfig::load(&bad),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn perspective_uses_surface_aspect() {
        let p = ViewerConfig::default().perspective(800, 400);
        assert_eq!(p.aspect, 2.0);
        assert_eq!(p.near, 0.1);
    }
}
