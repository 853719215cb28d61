//! Night and day lighting, fog and the moon.
//!
//! Presets only touch lights, fog and the moon billboard; chunk geometry is
//! identical under both.

use bevy::core_pipeline::prepass::{DeferredPrepass, DepthPrepass};
use bevy::pbr::ScreenSpaceReflections;
use bevy::post_process::bloom::Bloom;
use bevy::prelude::*;

use crate::camera::{StreamingCamera, StreamingCameraData, active_streaming_camera};
use crate::config::{EffectsConfig, LightingPreset, MoonConfig, ValleyConfig};

/// Lux per unit of preset light energy.
const LUX_PER_ENERGY: f32 = 4_000.0;
/// Ambient brightness per unit of preset ambient energy.
const AMBIENT_PER_ENERGY: f32 = 250.0;
/// Bloom intensity per unit of glow intensity.
const BLOOM_PER_GLOW: f32 = 0.3;

/// Currently applied lighting preset. Change it to switch.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightingState {
  pub preset: LightingPreset,
}

/// The valley's directional light.
#[derive(Component)]
pub struct ValleySun;

/// Billboard standing in for the moon at night.
#[derive(Component)]
pub struct MoonDisc;

/// Resolved light and fog values of a preset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightingLook {
  pub light_color: Color,
  pub illuminance: f32,
  pub light_rotation: Quat,
  pub ambient_color: Color,
  pub ambient_brightness: f32,
  /// Exponential fog color and density.
  pub fog: Option<(Color, f32)>,
  pub moon: bool,
}

impl LightingLook {
  pub fn of(preset: LightingPreset) -> Self {
    match preset {
      LightingPreset::Night => Self {
        light_color: Color::srgb(0.75, 0.82, 1.0),
        illuminance: 0.85 * LUX_PER_ENERGY,
        light_rotation: euler_deg(-15.0, 25.0),
        ambient_color: Color::srgb(0.08, 0.10, 0.14),
        ambient_brightness: 0.4 * AMBIENT_PER_ENERGY,
        fog: Some((Color::srgb(0.42, 0.48, 0.62), 0.028)),
        moon: true,
      },
      LightingPreset::Day => Self {
        light_color: Color::srgb(1.0, 0.95, 0.85),
        illuminance: 3.0 * LUX_PER_ENERGY,
        light_rotation: euler_deg(-25.0, 40.0),
        ambient_color: Color::srgb(0.8, 0.8, 0.8),
        ambient_brightness: AMBIENT_PER_ENERGY,
        fog: None,
        moon: false,
      },
    }
  }
}

/// Post effects a preset turns on for streaming cameras.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PostEffects {
  /// Bloom intensity, night only.
  pub bloom: Option<f32>,
  pub ssr: bool,
}

impl PostEffects {
  pub fn resolve(preset: LightingPreset, effects: &EffectsConfig) -> Self {
    let glow = preset == LightingPreset::Night && effects.glow;
    Self {
      bloom: glow.then_some(effects.glow_intensity * BLOOM_PER_GLOW),
      ssr: effects.ssr,
    }
  }
}

/// Pitch about X, then yaw about Y, both in degrees.
fn euler_deg(pitch: f32, yaw: f32) -> Quat {
  Quat::from_euler(EulerRot::YXZ, yaw.to_radians(), pitch.to_radians(), 0.0)
}

/// Places the moon opposite the light's travel direction, facing the camera.
///
/// The disc's apparent size stays constant because it moves with the camera.
pub fn moon_transform(camera: Vec3, light_rotation: Quat, moon: &MoonConfig) -> Transform {
  let towards_moon = -(light_rotation * Vec3::NEG_Z);
  let position = camera + towards_moon * moon.distance;
  let diameter = 2.0 * moon.distance * (moon.angular_size_deg.to_radians() * 0.5).tan();
  // Rectangle meshes face +Z; point -Z away from the camera.
  Transform::from_translation(position)
    .looking_at(position + towards_moon, Vec3::Y)
    .with_scale(Vec3::splat(diameter))
}

pub(crate) struct AtmospherePlugin;

impl Plugin for AtmospherePlugin {
  fn build(&self, app: &mut App) {
    app
      .add_systems(Startup, spawn_sky)
      .add_systems(Update, (apply_lighting, follow_moon).chain());
  }
}

fn spawn_sky(
  mut commands: Commands,
  config: Res<ValleyConfig>,
  mut meshes: ResMut<Assets<Mesh>>,
  mut materials: ResMut<Assets<StandardMaterial>>,
) {
  commands.insert_resource(LightingState {
    preset: config.lighting,
  });
  commands.spawn((
    ValleySun,
    DirectionalLight {
      shadows_enabled: true,
      ..default()
    },
    Transform::default(),
  ));
  commands.spawn((
    MoonDisc,
    Mesh3d(meshes.add(Circle::new(0.5))),
    MeshMaterial3d(materials.add(StandardMaterial {
      base_color: Color::srgb(0.92, 0.94, 1.0),
      emissive: LinearRgba::rgb(1.6, 1.7, 1.9),
      unlit: true,
      fog_enabled: false,
      ..default()
    })),
    Transform::default(),
    Visibility::Hidden,
  ));
}

/// Applies the preset on change, and to cameras that appear later.
#[allow(clippy::type_complexity)]
fn apply_lighting(
  mut commands: Commands,
  config: Res<ValleyConfig>,
  state: Option<Res<LightingState>>,
  mut sun: Query<(&mut DirectionalLight, &mut Transform), With<ValleySun>>,
  all_cameras: Query<Entity, With<StreamingCamera>>,
  new_cameras: Query<Entity, Added<StreamingCamera>>,
  mut moon: Query<&mut Visibility, With<MoonDisc>>,
) {
  let Some(state) = state else {
    return;
  };
  let cameras: Vec<Entity> = if state.is_changed() {
    info!("Lighting preset {:?}", state.preset);
    all_cameras.iter().collect()
  } else {
    new_cameras.iter().collect()
  };
  if cameras.is_empty() && !state.is_changed() {
    return;
  }

  let look = LightingLook::of(state.preset);
  let effects = PostEffects::resolve(state.preset, &config.effects);
  for (mut light, mut transform) in &mut sun {
    light.color = look.light_color;
    light.illuminance = look.illuminance;
    transform.rotation = look.light_rotation;
  }
  for mut visibility in &mut moon {
    *visibility = if look.moon {
      Visibility::Inherited
    } else {
      Visibility::Hidden
    };
  }

  for entity in cameras {
    let mut camera = commands.entity(entity);
    camera.insert(AmbientLight {
      color: look.ambient_color,
      brightness: look.ambient_brightness,
      ..default()
    });
    match look.fog {
      Some((color, density)) => {
        camera.insert(DistanceFog {
          color,
          falloff: FogFalloff::Exponential { density },
          ..default()
        });
      }
      None => {
        camera.remove::<DistanceFog>();
      }
    }
    match effects.bloom {
      Some(intensity) => {
        camera.insert(Bloom {
          intensity,
          ..Bloom::NATURAL
        });
      }
      None => {
        camera.remove::<Bloom>();
      }
    }
    if effects.ssr {
      // Reflections need the deferred path, which rules out MSAA.
      camera.insert((
        ScreenSpaceReflections::default(),
        DepthPrepass,
        DeferredPrepass,
        Msaa::Off,
      ));
    }
  }
}

fn follow_moon(
  config: Res<ValleyConfig>,
  cameras: Query<StreamingCameraData, (With<StreamingCamera>, Without<MoonDisc>)>,
  sun: Query<&Transform, (With<ValleySun>, Without<MoonDisc>)>,
  mut moon: Query<&mut Transform, (With<MoonDisc>, Without<StreamingCamera>)>,
) {
  let Ok(sun) = sun.single() else {
    return;
  };
  let Some((_, camera)) = active_streaming_camera(&cameras) else {
    return;
  };
  for mut transform in &mut moon {
    *transform = moon_transform(camera, sun.rotation, &config.moon);
  }
}
