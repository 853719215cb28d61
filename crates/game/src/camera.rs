//! Fly cameras for the demo.
//!
//! Two cameras stream the valley: the primary ground-level camera and an
//! overview camera high above it. Only one is active at a time; Tab hands
//! streaming over to the other.

use bevy::ecs::message::MessageWriter;
use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;
use bevy_enhanced_input::prelude::*;
use bevy_valley_world::{
  ForwardDrift, LightingPreset, LightingState, RequestResync, StreamingCamera,
};

use crate::config::CameraSettings;
use crate::input::{
  self, Ascend, Descend, HandOff, Latch, Move, Resync, Sprint, ToggleDrift, ToggleLighting,
  ValleyInput,
};

const MAX_PITCH: f32 = 1.5;

/// A camera controlled by WASD and the mouse.
#[derive(Component)]
pub struct FlyCamera;

/// The overview camera, inactive on startup.
#[derive(Component)]
pub struct OverviewCamera;

/// Whether cameras drift forward on startup.
#[derive(Resource, Clone, Copy)]
pub struct DriftOnStart(pub bool);

pub struct CameraPlugin {
  pub drift: bool,
}

impl Plugin for CameraPlugin {
  fn build(&self, app: &mut App) {
    app
      .insert_resource(DriftOnStart(self.drift))
      .add_systems(Startup, spawn_cameras)
      .add_systems(
        Update,
        (
          fly_camera,
          mouse_look,
          hand_off,
          toggle_drift,
          request_resync,
          toggle_lighting,
        ),
      );
  }
}

pub fn night_clear() -> Color {
  Color::srgb(0.02, 0.03, 0.05)
}

pub fn clear_color(preset: LightingPreset) -> Color {
  match preset {
    LightingPreset::Night => night_clear(),
    LightingPreset::Day => Color::srgb(0.53, 0.72, 0.9),
  }
}

fn spawn_cameras(mut commands: Commands, settings: Res<CameraSettings>, drift: Res<DriftOnStart>) {
  let drift = ForwardDrift {
    enabled: drift.0,
    ..ForwardDrift::along(settings.drift_speed)
  };

  commands.spawn((
    Name::new("Primary Camera"),
    FlyCamera,
    StreamingCamera,
    drift,
    Camera3d::default(),
    Camera {
      order: 0,
      ..default()
    },
    Transform::from_xyz(0.0, settings.start_height, 0.0).looking_at(
      Vec3::new(0.0, settings.start_height * 0.5, 40.0),
      Vec3::Y,
    ),
  ));

  commands.spawn((
    Name::new("Overview Camera"),
    FlyCamera,
    OverviewCamera,
    StreamingCamera,
    drift,
    Camera3d::default(),
    Camera {
      order: 1,
      is_active: false,
      ..default()
    },
    Transform::from_xyz(0.0, settings.overview_height, -30.0)
      .looking_at(Vec3::new(0.0, 0.0, 30.0), Vec3::Y),
  ));
}

/// Move plus Ascend/Descend flies the active camera. Sprint multiplies the speed.
fn fly_camera(
  time: Res<Time>,
  settings: Res<CameraSettings>,
  contexts: Query<&Actions<ValleyInput>>,
  moves: Query<(&Action<Move>, &ActionState)>,
  ascend: Query<&ActionState, With<Action<Ascend>>>,
  descend: Query<&ActionState, With<Action<Descend>>>,
  sprint: Query<&ActionState, With<Action<Sprint>>>,
  mut cameras: Query<(&Camera, &mut Transform), With<FlyCamera>>,
) {
  let mut planar = Vec2::ZERO;
  for actions in &contexts {
    for action_entity in actions.iter() {
      if let Ok((action, state)) = moves.get(action_entity)
        && matches!(state, ActionState::Fired | ActionState::Ongoing)
      {
        planar = **action;
      }
    }
  }
  let vertical = match (
    input::held(&contexts, &ascend),
    input::held(&contexts, &descend),
  ) {
    (true, false) => 1.0,
    (false, true) => -1.0,
    _ => 0.0,
  };
  let direction = input::fly_direction(planar, vertical);
  if direction == Vec3::ZERO {
    return;
  }

  let mut speed = settings.speed;
  if input::held(&contexts, &sprint) {
    speed *= settings.sprint_multiplier;
  }
  let step = direction.normalize() * speed * time.delta_secs();

  for (camera, mut transform) in &mut cameras {
    if camera.is_active {
      let local = transform.rotation * Vec3::new(step.x, 0.0, step.z);
      transform.translation += local + Vec3::Y * step.y;
    }
  }
}

/// Rotates the active camera while the right mouse button is held.
fn mouse_look(
  buttons: Res<ButtonInput<MouseButton>>,
  motion: Res<AccumulatedMouseMotion>,
  settings: Res<CameraSettings>,
  mut cameras: Query<(&Camera, &mut Transform), With<FlyCamera>>,
) {
  if !buttons.pressed(MouseButton::Right) || motion.delta == Vec2::ZERO {
    return;
  }
  let delta = motion.delta * settings.look_sensitivity.to_radians();

  for (camera, mut transform) in &mut cameras {
    if !camera.is_active {
      continue;
    }
    let (yaw, pitch, _) = transform.rotation.to_euler(EulerRot::YXZ);
    let yaw = yaw - delta.x;
    let pitch = (pitch - delta.y).clamp(-MAX_PITCH, MAX_PITCH);
    transform.rotation = Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0);
  }
}

/// Swaps which camera is active. Streaming follows on the next frame.
fn hand_off(
  contexts: Query<&Actions<ValleyInput>>,
  states: Query<&ActionState, With<Action<HandOff>>>,
  mut latch: Local<Latch>,
  mut cameras: Query<(&Name, &mut Camera), With<FlyCamera>>,
) {
  if !latch.press(input::held(&contexts, &states)) {
    return;
  }
  for (name, mut camera) in &mut cameras {
    camera.is_active = !camera.is_active;
    if camera.is_active {
      info!("Streaming from {}", name);
    }
  }
}

fn toggle_drift(
  contexts: Query<&Actions<ValleyInput>>,
  states: Query<&ActionState, With<Action<ToggleDrift>>>,
  mut latch: Local<Latch>,
  mut drifting: Query<&mut ForwardDrift, With<FlyCamera>>,
) {
  if !latch.press(input::held(&contexts, &states)) {
    return;
  }
  for mut drift in &mut drifting {
    drift.enabled = !drift.enabled;
  }
}

fn request_resync(
  contexts: Query<&Actions<ValleyInput>>,
  states: Query<&ActionState, With<Action<Resync>>>,
  mut latch: Local<Latch>,
  mut resync: MessageWriter<RequestResync>,
) {
  if latch.press(input::held(&contexts, &states)) {
    resync.write(RequestResync);
  }
}

fn toggle_lighting(
  contexts: Query<&Actions<ValleyInput>>,
  states: Query<&ActionState, With<Action<ToggleLighting>>>,
  mut latch: Local<Latch>,
  lighting: Option<ResMut<LightingState>>,
  mut clear: ResMut<ClearColor>,
) {
  if !latch.press(input::held(&contexts, &states)) {
    return;
  }
  let Some(mut lighting) = lighting else {
    return;
  };
  lighting.preset = lighting.preset.toggled();
  clear.0 = clear_color(lighting.preset);
  info!("Lighting: {:?}", lighting.preset);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn presets_have_distinct_clear_colors() {
    assert_ne!(clear_color(LightingPreset::Night), clear_color(LightingPreset::Day));
    assert_eq!(clear_color(LightingPreset::Night), night_clear());
  }
}
