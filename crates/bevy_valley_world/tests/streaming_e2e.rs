//! E2E tests for chunk streaming under `MinimalPlugins`.
//!
//! The camera is moved by writing both `Transform` and `GlobalTransform`,
//! so no transform propagation is needed.
//!
//! Run with:
//!   cargo test -p bevy_valley_world --test streaming_e2e

use std::time::Duration;

use bevy::app::{TaskPoolOptions, TaskPoolPlugin};
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_valley_world::{
  ChunkPart, ForwardDrift, GridCoord, RequestResync, ResyncReason, StreamingCamera,
  StreamingState, StreamingStats, StripCoord, ValleyChunk, ValleyConfig, ValleyWorldPlugin,
};

fn light_config() -> ValleyConfig {
  let mut config = ValleyConfig::default();
  config.forest.trees_per_chunk = 40;
  config.underbrush_per_chunk = Some(20);
  config.window.ahead = 2;
  config.window.behind = 2;
  config.window.radius = 1;
  config
}

struct TestHarness {
  app: App,
  camera: Entity,
}

impl TestHarness {
  fn new(plugin: impl Plugin) -> Self {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins.set(TaskPoolPlugin {
      task_pool_options: TaskPoolOptions::with_num_threads(4),
    }));
    app.add_plugins(plugin);

    let camera = app
      .world_mut()
      .spawn((
        Transform::default(),
        GlobalTransform::default(),
        StreamingCamera,
      ))
      .id();

    Self { app, camera }
  }

  fn strip() -> Self {
    Self::new(ValleyWorldPlugin::strip(light_config()))
  }

  fn move_camera(&mut self, position: Vec3) {
    let mut entity = self.app.world_mut().entity_mut(self.camera);
    entity.insert((
      Transform::from_translation(position),
      GlobalTransform::from_translation(position),
    ));
  }

  fn resident(&mut self) -> Vec<IVec2> {
    let world = self.app.world_mut();
    let mut keys: Vec<IVec2> = world
      .query::<&ValleyChunk>()
      .iter(world)
      .map(|c| c.key)
      .collect();
    keys.sort_by_key(|k| (k.x, k.y));
    keys
  }

  fn stats(&self) -> StreamingStats {
    self.app.world().resource::<StreamingStats>().clone()
  }
}

fn strip_keys(range: std::ops::RangeInclusive<i32>) -> Vec<IVec2> {
  range.map(|i| IVec2::new(0, i)).collect()
}

#[test]
fn first_frame_spawns_symmetric_window() {
  let mut harness = TestHarness::strip();
  harness.app.update();

  assert_eq!(harness.resident(), strip_keys(-2..=2));
  let stats = harness.stats();
  assert_eq!(stats.resident, 5);
  assert_eq!(stats.spawned_total, 5);
  assert_eq!(stats.last_resync, Some(ResyncReason::Initial));

  let world = harness.app.world_mut();
  let parts = world.query::<&ChunkPart>().iter(world).count();
  assert!(parts > 5 * 40);
}

#[test]
fn stepping_one_chunk_swaps_one_chunk() {
  let mut harness = TestHarness::strip();
  harness.app.update();
  harness.move_camera(Vec3::new(0.0, 6.0, 120.0));
  harness.app.update();

  assert_eq!(harness.resident(), strip_keys(-1..=3));
  let stats = harness.stats();
  assert_eq!(stats.spawned_total, 6);
  assert_eq!(stats.despawned_total, 1);
  assert_eq!(stats.resyncs, 1);
  assert_eq!(stats.center, IVec2::new(0, 1));
}

#[test]
fn small_moves_inside_a_chunk_do_nothing() {
  let mut harness = TestHarness::strip();
  harness.app.update();
  harness.move_camera(Vec3::new(3.0, 6.0, 59.0));
  harness.app.update();

  assert_eq!(harness.resident(), strip_keys(-2..=2));
  assert_eq!(harness.stats().spawned_total, 5);
}

#[test]
fn teleport_replaces_window_and_resyncs() {
  let mut harness = TestHarness::strip();
  harness.app.update();
  harness.move_camera(Vec3::new(0.0, 6.0, 600.0));
  harness.app.update();

  assert_eq!(harness.resident(), strip_keys(3..=7));
  let stats = harness.stats();
  assert_eq!(stats.last_resync, Some(ResyncReason::Jump));
  assert_eq!(stats.despawned_total, 5);
}

#[test]
fn resync_message_regenerates_window() {
  let mut harness = TestHarness::strip();
  harness.app.update();
  harness.app.world_mut().write_message(RequestResync);
  harness.app.update();

  assert_eq!(harness.resident(), strip_keys(-2..=2));
  let stats = harness.stats();
  assert_eq!(stats.resyncs, 2);
  assert_eq!(stats.last_resync, Some(ResyncReason::Requested));
  assert_eq!(stats.spawned_total, 10);
  assert_eq!(stats.despawned_total, 0);
}

#[test]
fn camera_handoff_resyncs() {
  let mut harness = TestHarness::strip();
  harness.app.update();

  harness.app.world_mut().despawn(harness.camera);
  let position = Vec3::new(0.0, 6.0, 130.0);
  harness.camera = harness
    .app
    .world_mut()
    .spawn((
      Transform::from_translation(position),
      GlobalTransform::from_translation(position),
      StreamingCamera,
    ))
    .id();
  harness.app.update();

  assert_eq!(harness.resident(), strip_keys(-1..=3));
  let stats = harness.stats();
  assert_eq!(stats.last_resync, Some(ResyncReason::HandOff));
  assert_eq!(stats.spawned_total, 10);
}

#[test]
fn no_camera_no_chunks() {
  let mut app = App::new();
  app.add_plugins(MinimalPlugins.set(TaskPoolPlugin {
    task_pool_options: TaskPoolOptions::with_num_threads(4),
  }));
  app.add_plugins(ValleyWorldPlugin::strip(light_config()));
  app.update();

  let world = app.world_mut();
  assert_eq!(world.query::<&ValleyChunk>().iter(world).count(), 0);
}

#[test]
fn grid_layout_streams_a_square() {
  let mut harness = TestHarness::new(ValleyWorldPlugin::grid(light_config()));
  harness.move_camera(Vec3::new(130.0, 6.0, -10.0));
  harness.app.update();

  let expected: Vec<IVec2> = (0..=2)
    .flat_map(|x| (-1..=1).map(move |z| IVec2::new(x, z)))
    .collect();
  assert_eq!(harness.resident(), expected);

  let state = harness.app.world().resource::<StreamingState<GridCoord>>();
  assert_eq!(state.streamer.center(), Some(GridCoord::new(1, 0)));
}

#[test]
fn invalid_config_disables_streaming() {
  let mut config = light_config();
  config.bridges.frequency = 0;
  let mut harness = TestHarness::new(ValleyWorldPlugin::strip(config));
  harness.app.update();

  assert!(harness.resident().is_empty());
  assert!(
    harness
      .app
      .world()
      .get_resource::<StreamingState<StripCoord>>()
      .is_none()
  );
}

#[test]
fn forward_drift_carries_the_window() {
  let mut harness = TestHarness::strip();
  harness.app.add_plugins(bevy::transform::TransformPlugin);
  harness
    .app
    .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(
      200,
    )));
  let camera = harness.camera;
  harness
    .app
    .world_mut()
    .entity_mut(camera)
    .insert(ForwardDrift::along(300.0));

  for _ in 0..20 {
    harness.app.update();
  }

  let z = harness
    .app
    .world()
    .get::<Transform>(camera)
    .map(|t| t.translation.z)
    .unwrap_or_default();
  assert!(z > 600.0, "camera only reached {z}");

  let stats = harness.stats();
  assert!(stats.center.y >= 4);
  let center = stats.center.y;
  assert_eq!(harness.resident(), strip_keys(center - 2..=center + 2));
}

#[test]
fn drift_streams_in_the_same_frame() {
  // No transform propagation: the window must follow `Transform` alone.
  let mut harness = TestHarness::strip();
  harness
    .app
    .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(
      200,
    )));
  let camera = harness.camera;
  harness
    .app
    .world_mut()
    .entity_mut(camera)
    .insert(ForwardDrift::along(600.0));

  for _ in 0..6 {
    harness.app.update();
    let z = harness
      .app
      .world()
      .get::<Transform>(camera)
      .map(|t| t.translation.z)
      .unwrap_or_default();
    let expected = ((z + 60.0) / 120.0).floor() as i32;
    assert_eq!(harness.stats().center.y, expected, "camera at z = {z}");
    assert_eq!(harness.resident(), strip_keys(expected - 2..=expected + 2));
  }
}
