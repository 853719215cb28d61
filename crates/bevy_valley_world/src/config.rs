//! World configuration.
//!
//! A [`ValleyConfig`] is immutable for the lifetime of a streamer. It is
//! usually loaded from TOML and must pass [`ValleyConfig::validate`] before
//! any chunk is generated.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Distance pushed past a band edge when displacing content.
pub const DISPLACE_EPSILON: f32 = 0.01;
/// Inset from chunk edges for displaced content.
pub const EDGE_INSET: f32 = 0.5;
/// Largest accepted window radius, in chunks.
pub const MAX_WINDOW_RADIUS: u32 = 1024;

#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValleyConfig {
  /// Chunk size along the streamed axes.
  pub chunk_extent: f32,
  /// Width of a strip chunk on X. Defaults to `river_width + 80`.
  pub across_extent: Option<f32>,
  /// Added to both ground plane dimensions to hide seams between chunks.
  pub ground_overlap: f32,
  pub river_width: f32,
  /// World X of the river centerline.
  pub river_center: f32,
  pub window: WindowConfig,
  pub base_seed: u64,
  pub forest: ForestConfig,
  /// Shrubs per chunk; the layout picks a default when unset.
  pub underbrush_per_chunk: Option<u32>,
  pub bridges: BridgeConfig,
  pub structures: StructureConfig,
  pub water: WaterParams,
  pub lighting: LightingPreset,
  pub effects: EffectsConfig,
  pub moon: MoonConfig,
  /// Camera movement, in chunk extents, treated as a discontinuous jump.
  pub resync_jump_chunks: f32,
}

impl Default for ValleyConfig {
  fn default() -> Self {
    Self {
      chunk_extent: 120.0,
      across_extent: None,
      ground_overlap: 2.0,
      river_width: 16.0,
      river_center: 0.0,
      window: WindowConfig::default(),
      base_seed: 987_654_321,
      forest: ForestConfig::default(),
      underbrush_per_chunk: None,
      bridges: BridgeConfig::default(),
      structures: StructureConfig::default(),
      water: WaterParams::default(),
      lighting: LightingPreset::Night,
      effects: EffectsConfig::default(),
      moon: MoonConfig::default(),
      resync_jump_chunks: 2.0,
    }
  }
}

/// Active window radii, in chunks.
///
/// The strip layout uses `ahead` (towards +Z) and `behind`; the grid layout
/// uses the square `radius`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
  pub ahead: u32,
  pub behind: u32,
  pub radius: u32,
}

impl Default for WindowConfig {
  fn default() -> Self {
    Self {
      ahead: 3,
      behind: 1,
      radius: 2,
    }
  }
}

impl WindowConfig {
  /// Rejects empty windows and radii beyond [`MAX_WINDOW_RADIUS`].
  ///
  /// Both layouts read the same section, so a zero reach is an error for
  /// either of them.
  pub fn validate(&self) -> Result<(), ConfigError> {
    for (field, value) in [
      ("window.ahead", self.ahead),
      ("window.behind", self.behind),
      ("window.radius", self.radius),
    ] {
      if value > MAX_WINDOW_RADIUS {
        return Err(ConfigError::WindowTooLarge {
          field,
          value,
          max: MAX_WINDOW_RADIUS,
        });
      }
    }
    if self.radius == 0 {
      return Err(ConfigError::EmptyWindow {
        field: "window.radius",
      });
    }
    if self.ahead + self.behind == 0 {
      return Err(ConfigError::EmptyWindow {
        field: "window.ahead + window.behind",
      });
    }
    Ok(())
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
  pub trees_per_chunk: u32,
  pub min_tree_height: f32,
  pub max_tree_height: f32,
  /// Trunk radius scale range `(min, max)`.
  pub radius_scale: (f32, f32),
  /// Clearance kept between the river bank and any tree.
  pub river_buffer: f32,
  pub second_lobe: bool,
}

impl Default for ForestConfig {
  fn default() -> Self {
    Self {
      trees_per_chunk: 300,
      min_tree_height: 2.6,
      max_tree_height: 5.2,
      radius_scale: (0.8, 1.35),
      river_buffer: 1.2,
      second_lobe: true,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
  pub enabled: bool,
  /// A bridge is placed every `frequency` chunks along the river.
  pub frequency: u32,
}

impl Default for BridgeConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      frequency: 4,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
  pub per_chunk: u32,
  pub min_distance_from_river: f32,
}

impl Default for StructureConfig {
  fn default() -> Self {
    Self {
      per_chunk: 2,
      min_distance_from_river: 3.0,
    }
  }
}

/// Water surface look. Passed to the water material untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterParams {
  pub amplitude: f32,
  pub frequency: f32,
  pub speed: f32,
  pub roughness: f32,
  pub fresnel_power: f32,
  pub shallow_color: [f32; 3],
  pub deep_color: [f32; 3],
}

impl Default for WaterParams {
  fn default() -> Self {
    Self {
      amplitude: 0.06,
      frequency: 1.6,
      speed: 0.35,
      roughness: 0.08,
      fresnel_power: 5.0,
      shallow_color: [0.06, 0.08, 0.12],
      deep_color: [0.02, 0.05, 0.09],
    }
  }
}

/// Lighting and fog preset. Has no effect on geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightingPreset {
  #[default]
  Night,
  Day,
}

impl LightingPreset {
  pub fn toggled(self) -> Self {
    match self {
      Self::Night => Self::Day,
      Self::Day => Self::Night,
    }
  }
}

/// Camera post effects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
  /// Bloom at night.
  pub glow: bool,
  pub glow_intensity: f32,
  /// Screen space reflections. Switches cameras to the deferred path.
  pub ssr: bool,
}

impl Default for EffectsConfig {
  fn default() -> Self {
    Self {
      glow: true,
      glow_intensity: 0.55,
      ssr: false,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonConfig {
  pub distance: f32,
  pub angular_size_deg: f32,
}

impl Default for MoonConfig {
  fn default() -> Self {
    Self {
      distance: 500.0,
      angular_size_deg: 1.1,
    }
  }
}

/// Rejected configuration.
#[derive(Debug)]
pub enum ConfigError {
  Parse(toml::de::Error),
  NotPositive { field: &'static str, value: f32 },
  NotFinite { field: &'static str, value: f32 },
  Negative { field: &'static str, value: f32 },
  InvertedRange { field: &'static str, min: f32, max: f32 },
  ZeroBridgeFrequency,
  /// A window reach of zero.
  EmptyWindow { field: &'static str },
  WindowTooLarge { field: &'static str, value: u32, max: u32 },
  NoRoomBesideRiver { field: &'static str, extent: f32, required: f32 },
}

impl std::fmt::Display for ConfigError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Parse(e) => write!(f, "config parse error: {}", e),
      Self::NotPositive { field, value } => {
        write!(f, "{} must be positive and finite, got {}", field, value)
      }
      Self::NotFinite { field, value } => write!(f, "{} must be finite, got {}", field, value),
      Self::Negative { field, value } => write!(f, "{} must not be negative, got {}", field, value),
      Self::InvertedRange { field, min, max } => {
        write!(f, "{} range is inverted: {} > {}", field, min, max)
      }
      Self::ZeroBridgeFrequency => write!(f, "bridges.frequency must be non-zero when enabled"),
      Self::EmptyWindow { field } => write!(f, "{} must be at least 1", field),
      Self::WindowTooLarge { field, value, max } => {
        write!(f, "{} of {} exceeds the maximum of {}", field, value, max)
      }
      Self::NoRoomBesideRiver {
        field,
        extent,
        required,
      } => write!(
        f,
        "{} of {} leaves no room beside the river band, need more than {}",
        field, extent, required
      ),
    }
  }
}

impl std::error::Error for ConfigError {}

impl From<toml::de::Error> for ConfigError {
  fn from(e: toml::de::Error) -> Self {
    Self::Parse(e)
  }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
  if value.is_finite() && value > 0.0 {
    Ok(())
  } else {
    Err(ConfigError::NotPositive { field, value })
  }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
  if value.is_finite() && value >= 0.0 {
    Ok(())
  } else {
    Err(ConfigError::Negative { field, value })
  }
}

fn ordered(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
  if min <= max {
    Ok(())
  } else {
    Err(ConfigError::InvertedRange { field, min, max })
  }
}

impl ValleyConfig {
  /// Parses a TOML document. Missing keys take their defaults.
  pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
    Ok(toml::from_str(source)?)
  }

  /// Strip chunk width on X.
  pub fn strip_across_extent(&self) -> f32 {
    self
      .across_extent
      .unwrap_or(self.river_width + 80.0)
  }

  /// Half width of the band trees and shrubs keep clear of.
  pub fn vegetation_half_band(&self) -> f32 {
    self.river_width * 0.5 + self.forest.river_buffer
  }

  /// Half width of the band structures keep clear of.
  pub fn structure_half_band(&self) -> f32 {
    self.river_width * 0.5 + self.structures.min_distance_from_river
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    positive("chunk_extent", self.chunk_extent)?;
    if let Some(across) = self.across_extent {
      positive("across_extent", across)?;
    }
    non_negative("ground_overlap", self.ground_overlap)?;
    positive("river_width", self.river_width)?;
    if !self.river_center.is_finite() {
      return Err(ConfigError::NotFinite {
        field: "river_center",
        value: self.river_center,
      });
    }

    let forest = &self.forest;
    positive("forest.min_tree_height", forest.min_tree_height)?;
    positive("forest.max_tree_height", forest.max_tree_height)?;
    ordered(
      "forest tree height",
      forest.min_tree_height,
      forest.max_tree_height,
    )?;
    positive("forest.radius_scale.0", forest.radius_scale.0)?;
    positive("forest.radius_scale.1", forest.radius_scale.1)?;
    ordered(
      "forest.radius_scale",
      forest.radius_scale.0,
      forest.radius_scale.1,
    )?;
    non_negative("forest.river_buffer", forest.river_buffer)?;
    non_negative(
      "structures.min_distance_from_river",
      self.structures.min_distance_from_river,
    )?;

    self.window.validate()?;

    if self.bridges.enabled && self.bridges.frequency == 0 {
      return Err(ConfigError::ZeroBridgeFrequency);
    }

    // Displacement needs at least one band edge inside every chunk.
    let half_band = self
      .vegetation_half_band()
      .max(self.structure_half_band())
      + DISPLACE_EPSILON;
    let required = 2.0 * (half_band + EDGE_INSET);
    for (field, extent) in [
      ("chunk_extent", self.chunk_extent),
      ("across_extent", self.strip_across_extent()),
    ] {
      if extent <= required {
        return Err(ConfigError::NoRoomBesideRiver {
          field,
          extent,
          required,
        });
      }
    }

    non_negative("effects.glow_intensity", self.effects.glow_intensity)?;
    positive("moon.distance", self.moon.distance)?;
    positive("moon.angular_size_deg", self.moon.angular_size_deg)?;
    positive("resync_jump_chunks", self.resync_jump_chunks)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_are_valid() {
    ValleyConfig::default().validate().unwrap();
  }

  #[test]
  fn strip_width_follows_river() {
    let config = ValleyConfig {
      river_width: 20.0,
      ..default()
    };
    assert_eq!(config.strip_across_extent(), 100.0);
  }

  #[test]
  fn rejects_non_positive_extent() {
    for extent in [0.0, -5.0, f32::NAN] {
      let config = ValleyConfig {
        chunk_extent: extent,
        ..default()
      };
      assert!(matches!(
        config.validate(),
        Err(ConfigError::NotPositive {
          field: "chunk_extent",
          ..
        })
      ));
    }
  }

  #[test]
  fn rejects_zero_bridge_frequency_only_when_enabled() {
    let mut config = ValleyConfig::default();
    config.bridges.frequency = 0;
    assert!(matches!(
      config.validate(),
      Err(ConfigError::ZeroBridgeFrequency)
    ));

    config.bridges.enabled = false;
    config.validate().unwrap();
  }

  #[test]
  fn rejects_empty_windows() {
    let mut config = ValleyConfig::default();
    config.window.radius = 0;
    assert!(matches!(
      config.validate(),
      Err(ConfigError::EmptyWindow {
        field: "window.radius"
      })
    ));

    let mut config = ValleyConfig::default();
    config.window.ahead = 0;
    config.window.behind = 0;
    assert!(matches!(
      config.validate(),
      Err(ConfigError::EmptyWindow { .. })
    ));

    // Looking only ahead still keeps the camera chunk.
    config.window.ahead = 2;
    config.validate().unwrap();
  }

  #[test]
  fn rejects_oversized_windows() {
    let mut config = ValleyConfig::default();
    config.window.radius = 30_000;
    assert!(matches!(
      config.validate(),
      Err(ConfigError::WindowTooLarge {
        field: "window.radius",
        value: 30_000,
        ..
      })
    ));

    let mut config = ValleyConfig::default();
    config.window.behind = u32::MAX;
    assert!(matches!(
      config.validate(),
      Err(ConfigError::WindowTooLarge {
        field: "window.behind",
        ..
      })
    ));

    config.window.behind = MAX_WINDOW_RADIUS;
    config.validate().unwrap();
  }

  #[test]
  fn rejects_inverted_tree_heights() {
    let mut config = ValleyConfig::default();
    config.forest.min_tree_height = 6.0;
    assert!(matches!(
      config.validate(),
      Err(ConfigError::InvertedRange { .. })
    ));
  }

  #[test]
  fn rejects_river_wider_than_chunk() {
    let config = ValleyConfig {
      chunk_extent: 20.0,
      ..default()
    };
    assert!(matches!(
      config.validate(),
      Err(ConfigError::NoRoomBesideRiver {
        field: "chunk_extent",
        ..
      })
    ));
  }

  #[test]
  fn parses_partial_toml() {
    let config = ValleyConfig::from_toml_str(
      r#"
        base_seed = 42
        lighting = "day"

        [window]
        radius = 1

        [forest]
        trees_per_chunk = 10
        radius_scale = [0.5, 0.9]
      "#,
    )
    .unwrap();
    assert_eq!(config.base_seed, 42);
    assert_eq!(config.lighting, LightingPreset::Day);
    assert_eq!(config.window.radius, 1);
    assert_eq!(config.window.ahead, 3);
    assert_eq!(config.forest.trees_per_chunk, 10);
    assert_eq!(config.forest.radius_scale, (0.5, 0.9));
    assert_eq!(config.forest.max_tree_height, 5.2);
    assert_eq!(config.effects, EffectsConfig::default());
  }

  #[test]
  fn parse_errors_are_reported() {
    let err = ValleyConfig::from_toml_str("chunk_extent = \"wide\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().starts_with("config parse error"));
  }
}
