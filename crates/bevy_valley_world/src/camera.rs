//! Cameras that drive streaming.

use bevy::prelude::*;

/// Marks a camera whose position selects the active window.
///
/// Several may exist; the lowest entity with an active [`Camera`] wins, and
/// an entity without a `Camera` component always counts as active.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct StreamingCamera;

/// Constant velocity applied to a camera every frame.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct ForwardDrift {
  pub velocity: Vec3,
  pub enabled: bool,
}

impl ForwardDrift {
  /// Cruise speed used for strip valleys.
  pub const STRIP_SPEED: f32 = 6.0;

  /// Drift towards +Z at `speed`.
  pub fn along(speed: f32) -> Self {
    Self {
      velocity: Vec3::Z * speed,
      enabled: true,
    }
  }
}

impl Default for ForwardDrift {
  fn default() -> Self {
    Self::along(Self::STRIP_SPEED)
  }
}

pub(crate) fn apply_forward_drift(
  time: Res<Time>,
  mut drifting: Query<(&mut Transform, &ForwardDrift)>,
) {
  let dt = time.delta_secs();
  for (mut transform, drift) in &mut drifting {
    if drift.enabled {
      transform.translation += drift.velocity * dt;
    }
  }
}

/// Query data for cameras that may drive streaming.
pub type StreamingCameraData = (
  Entity,
  &'static GlobalTransform,
  Option<&'static Transform>,
  Has<ChildOf>,
  Option<&'static Camera>,
);

/// World position streaming reads for a camera.
///
/// Root-level cameras use `Transform`, which already holds this frame's
/// movement. Parented cameras use the last propagated `GlobalTransform`.
pub fn streaming_position(
  global: &GlobalTransform,
  local: Option<&Transform>,
  parented: bool,
) -> Vec3 {
  match local {
    Some(local) if !parented => local.translation,
    _ => global.translation(),
  }
}

/// Picks the camera that drives streaming, with its world position.
pub fn select_active<'a>(
  cameras: impl IntoIterator<Item = (Entity, Vec3, Option<&'a Camera>)>,
) -> Option<(Entity, Vec3)> {
  cameras
    .into_iter()
    .filter(|(_, _, camera)| camera.is_none_or(|c| c.is_active))
    .min_by_key(|(entity, _, _)| *entity)
    .map(|(entity, position, _)| (entity, position))
}

/// The streaming camera and its position, shared by every system that
/// follows it.
pub(crate) fn active_streaming_camera<F: bevy::ecs::query::QueryFilter>(
  cameras: &Query<StreamingCameraData, F>,
) -> Option<(Entity, Vec3)> {
  select_active(cameras.iter().map(|(entity, global, local, parented, camera)| {
    (entity, streaming_position(global, local, parented), camera)
  }))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn inactive_cameras_are_skipped() {
    let mut world = World::new();
    let a = world.spawn_empty().id();
    let b = world.spawn_empty().id();
    let off = Camera {
      is_active: false,
      ..default()
    };
    let on = Camera::default();

    let picked = select_active([
      (a, Vec3::X, Some(&off)),
      (b, Vec3::new(2.0, 0.0, 0.0), Some(&on)),
    ]);
    assert_eq!(picked, Some((b, Vec3::new(2.0, 0.0, 0.0))));
  }

  #[test]
  fn bare_transform_counts_as_active() {
    let mut world = World::new();
    let a = world.spawn_empty().id();
    assert_eq!(select_active([(a, Vec3::Y * 5.0, None)]), Some((a, Vec3::Y * 5.0)));
    assert_eq!(select_active(std::iter::empty()), None);
  }

  #[test]
  fn lowest_entity_wins_ties() {
    let mut world = World::new();
    let a = world.spawn_empty().id();
    let b = world.spawn_empty().id();
    assert_eq!(
      select_active([(b, Vec3::ZERO, None), (a, Vec3::ZERO, None)]).map(|p| p.0),
      Some(a)
    );
  }

  #[test]
  fn root_cameras_stream_from_local_transform() {
    let global = GlobalTransform::from_xyz(0.0, 0.0, 100.0);
    let local = Transform::from_xyz(0.0, 0.0, 160.0);
    assert_eq!(
      streaming_position(&global, Some(&local), false),
      Vec3::new(0.0, 0.0, 160.0)
    );
    assert_eq!(
      streaming_position(&global, Some(&local), true),
      Vec3::new(0.0, 0.0, 100.0)
    );
    assert_eq!(
      streaming_position(&global, None, false),
      Vec3::new(0.0, 0.0, 100.0)
    );
  }
}
