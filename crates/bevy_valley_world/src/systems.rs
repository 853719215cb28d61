//! ECS side of streaming: resources, messages and the per-frame system.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use crate::camera::{StreamingCamera, StreamingCameraData, active_streaming_camera};
use crate::coords::ChunkCoord;
use crate::render::{BevySceneHost, ChunkHandle};
use crate::streamer::WorldStreamer;

/// Forces every chunk in the window to be regenerated on the next tick.
#[derive(Message, Clone, Copy, Debug, Default)]
pub struct RequestResync;

/// Why a tick regenerates its whole window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResyncReason {
  Initial,
  Requested,
  /// Another camera took over streaming.
  HandOff,
  /// The camera moved further than the jump threshold in one frame.
  Jump,
}

/// The streamer plus what the system remembers between frames.
#[derive(Resource)]
pub struct StreamingState<C: ChunkCoord> {
  pub streamer: WorldStreamer<C, ChunkHandle>,
  last_camera: Option<(Entity, Vec3)>,
}

impl<C: ChunkCoord> StreamingState<C> {
  pub fn new(streamer: WorldStreamer<C, ChunkHandle>) -> Self {
    Self {
      streamer,
      last_camera: None,
    }
  }

  /// Horizontal distance treated as a discontinuous jump.
  pub fn jump_threshold(&self) -> f32 {
    let extent = self.streamer.extent();
    self.streamer.config().resync_jump_chunks * extent.across.max(extent.along)
  }

  /// Decides whether this frame must regenerate the window.
  pub fn resync_reason(
    &self,
    camera: Entity,
    position: Vec3,
    requested: bool,
  ) -> Option<ResyncReason> {
    let Some((last_entity, last_position)) = self.last_camera else {
      return Some(ResyncReason::Initial);
    };
    if requested {
      Some(ResyncReason::Requested)
    } else if last_entity != camera {
      Some(ResyncReason::HandOff)
    } else if position.xz().distance(last_position.xz()) > self.jump_threshold() {
      Some(ResyncReason::Jump)
    } else {
      None
    }
  }
}

/// Running totals for overlays and tests.
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct StreamingStats {
  /// Coordinate under the camera as `(across, along)`.
  pub center: IVec2,
  pub resident: usize,
  pub spawned_total: u64,
  pub despawned_total: u64,
  pub failed_total: u64,
  pub resyncs: u64,
  pub last_resync: Option<ResyncReason>,
}

/// System: keeps resident chunks matched to the active camera's window.
#[cfg_attr(feature = "tracy", tracing::instrument(skip_all))]
pub(crate) fn stream_chunks<C: ChunkCoord>(
  mut state: ResMut<StreamingState<C>>,
  mut stats: ResMut<StreamingStats>,
  mut requests: MessageReader<RequestResync>,
  cameras: Query<StreamingCameraData, With<StreamingCamera>>,
  mut host: BevySceneHost,
) {
  let Some((camera, position)) = active_streaming_camera(&cameras) else {
    return;
  };
  let requested = requests.read().count() > 0;

  let reason = state.resync_reason(camera, position, requested);
  if let Some(reason) = reason {
    info!(
      "Resyncing {} valley window ({:?}) at {:?}",
      C::LAYOUT,
      reason,
      position
    );
    stats.resyncs += 1;
    stats.last_resync = Some(reason);
  }

  let report = state.streamer.tick(&mut host, position, reason.is_some());
  state.last_camera = Some((camera, position));

  stats.center = report.center.key();
  stats.resident = state.streamer.registry().len();
  stats.spawned_total += report.spawned.len() as u64;
  stats.despawned_total += report.despawned.len() as u64;
  stats.failed_total += report.failed.len() as u64;
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::ValleyConfig;
  use crate::coords::StripCoord;

  fn state() -> StreamingState<StripCoord> {
    StreamingState::new(WorldStreamer::new(ValleyConfig::default()).unwrap())
  }

  #[test]
  fn resync_triggers() {
    let mut world = World::new();
    let a = world.spawn_empty().id();
    let b = world.spawn_empty().id();
    let mut state = state();

    assert_eq!(
      state.resync_reason(a, Vec3::ZERO, false),
      Some(ResyncReason::Initial)
    );
    state.last_camera = Some((a, Vec3::ZERO));

    assert_eq!(state.resync_reason(a, Vec3::Z * 30.0, false), None);
    assert_eq!(
      state.resync_reason(a, Vec3::ZERO, true),
      Some(ResyncReason::Requested)
    );
    assert_eq!(
      state.resync_reason(b, Vec3::ZERO, false),
      Some(ResyncReason::HandOff)
    );
    assert_eq!(
      state.resync_reason(a, Vec3::Z * 241.0, false),
      Some(ResyncReason::Jump)
    );
  }

  #[test]
  fn height_changes_are_not_jumps() {
    let mut world = World::new();
    let a = world.spawn_empty().id();
    let mut state = state();
    state.last_camera = Some((a, Vec3::ZERO));
    assert_eq!(state.resync_reason(a, Vec3::Y * 1_000.0, false), None);
  }
}
