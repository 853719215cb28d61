mod plugin;

use std::path::{Path, PathBuf};

use bevy::{asset::Asset, prelude::*, reflect::TypePath};
use bevy_valley_world::ValleyConfig;
pub use plugin::ConfigPlugin;
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "assets/config/valley.config.toml";

#[derive(Asset, TypePath, Deserialize, Debug, Clone)]
pub struct DemoConfig {
  pub window: WindowSettings,
  pub camera: CameraSettings,
  #[serde(default)]
  pub world: ValleyConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct WindowSettings {
  pub width: u32,
  pub height: u32,
  pub title: String,
}

/// Fly camera tuning. Hot-reloaded.
#[derive(Resource, Deserialize, Debug, Clone, PartialEq)]
pub struct CameraSettings {
  pub speed: f32,
  pub sprint_multiplier: f32,
  /// Degrees per pixel of mouse motion.
  pub look_sensitivity: f32,
  pub start_height: f32,
  /// Forward drift speed for the strip variant.
  pub drift_speed: f32,
  /// Height of the secondary overview camera.
  pub overview_height: f32,
}

#[derive(Debug)]
pub enum ConfigLoadError {
  Read { path: PathBuf, source: std::io::Error },
  Parse { path: PathBuf, source: toml::de::Error },
}

impl std::fmt::Display for ConfigLoadError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Read { path, source } => write!(f, "failed to read {}: {}", path.display(), source),
      Self::Parse { path, source } => write!(f, "failed to parse {}: {}", path.display(), source),
    }
  }
}

impl std::error::Error for ConfigLoadError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Read { source, .. } => Some(source),
      Self::Parse { source, .. } => Some(source),
    }
  }
}

pub fn load(path: &Path) -> Result<DemoConfig, ConfigLoadError> {
  let text = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  toml::from_str(&text).map_err(|source| ConfigLoadError::Parse {
    path: path.to_path_buf(),
    source,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn shipped_config_parses_and_validates() {
    let config: DemoConfig = toml::from_str(include_str!("../../assets/config/valley.config.toml"))
      .expect("shipped config parses");
    assert_eq!(config.camera.speed, 12.0);
    assert_eq!(config.camera.look_sensitivity, 0.25);
    assert_eq!(config.world, ValleyConfig::default());
    assert!(config.world.validate().is_ok());
  }

  #[test]
  fn missing_file_is_a_read_error() {
    let err = load(Path::new("does/not/exist.toml")).unwrap_err();
    assert!(matches!(err, ConfigLoadError::Read { .. }));
  }
}
