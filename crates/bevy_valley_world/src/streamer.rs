//! Engine-agnostic streaming control loop.
//!
//! [`WorldStreamer::tick`] runs once per frame: it bins the camera, diffs
//! the active window against the registry, generates and builds entering
//! chunks, then releases leaving ones. Spawns always happen before
//! despawns so a coordinate never goes missing for a frame.

use bevy::log::{debug, warn};
use bevy::math::Vec3;

use crate::config::{ConfigError, ValleyConfig};
use crate::coords::{ChunkCoord, ChunkExtent};
use crate::generation::{ChunkContent, generate};
use crate::registry::{Chunk, ChunkRegistry};
use crate::window::window_delta;

/// Receives generated chunks and owns whatever they turn into.
pub trait SceneHost<C: ChunkCoord> {
  /// Opaque reference to one resource created for a chunk.
  type Handle;

  /// Materializes `content` around `origin`. Every resource created must be
  /// reachable from the returned handles.
  fn build(&mut self, coord: C, origin: Vec3, seed: u64, content: &ChunkContent)
  -> Vec<Self::Handle>;

  /// Destroys the resources behind `handles`.
  ///
  /// Implementations release as much as they can before reporting an error.
  fn release(&mut self, handles: Vec<Self::Handle>) -> Result<(), ReleaseError>;
}

/// Some chunk resources could not be released.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReleaseError {
  /// Handles that no longer referred to anything.
  Missing { count: usize },
  Host(String),
}

impl std::fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Missing { count } => write!(f, "{} chunk resources were already gone", count),
      Self::Host(msg) => write!(f, "host release failed: {}", msg),
    }
  }
}

impl std::error::Error for ReleaseError {}

/// What one tick did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport<C> {
  pub center: C,
  pub spawned: Vec<C>,
  pub despawned: Vec<C>,
  /// Coordinates whose generation failed; they stay absent and are retried.
  pub failed: Vec<C>,
  pub release_errors: usize,
}

impl<C> TickReport<C> {
  fn new(center: C) -> Self {
    Self {
      center,
      spawned: Vec::new(),
      despawned: Vec::new(),
      failed: Vec::new(),
      release_errors: 0,
    }
  }

  pub fn is_idle(&self) -> bool {
    self.spawned.is_empty() && self.despawned.is_empty() && self.failed.is_empty()
  }
}

/// Keeps the resident chunk set equal to the camera's active window.
pub struct WorldStreamer<C: ChunkCoord, H> {
  config: ValleyConfig,
  extent: ChunkExtent,
  registry: ChunkRegistry<C, H>,
  center: Option<C>,
}

impl<C: ChunkCoord, H> WorldStreamer<C, H> {
  /// Validates `config`; an invalid config never yields a streamer.
  pub fn new(config: ValleyConfig) -> Result<Self, ConfigError> {
    config.validate()?;
    Ok(Self {
      extent: C::extent(&config),
      config,
      registry: ChunkRegistry::new(),
      center: None,
    })
  }

  pub fn config(&self) -> &ValleyConfig {
    &self.config
  }

  pub fn extent(&self) -> ChunkExtent {
    self.extent
  }

  pub fn registry(&self) -> &ChunkRegistry<C, H> {
    &self.registry
  }

  /// Coordinate of the camera at the last tick.
  pub fn center(&self) -> Option<C> {
    self.center
  }

  /// Window that should be resident for a camera at `camera`.
  pub fn window_at(&self, camera: Vec3) -> (C, Vec<C>) {
    let center = C::from_world(camera, self.extent);
    (center, center.window(&self.config.window))
  }

  /// Runs one streaming step.
  ///
  /// With `resync`, every window coordinate is regenerated; a resident chunk
  /// is replaced by its fresh copy before its old resources are released.
  pub fn tick<S>(&mut self, host: &mut S, camera: Vec3, resync: bool) -> TickReport<C>
  where
    S: SceneHost<C, Handle = H>,
  {
    let (center, window) = self.window_at(camera);
    let delta = window_delta(self.registry.keys(), &window, resync);
    let mut report = TickReport::new(center);
    self.center = Some(center);

    for coord in delta.spawn {
      let seed = coord.seed_for(self.config.base_seed);
      let content = match generate(coord, seed, &self.config) {
        Ok(content) => content,
        Err(e) => {
          warn!("Skipping {} chunk {:?}: {}", C::LAYOUT, coord, e);
          report.failed.push(coord);
          continue;
        }
      };

      let origin = coord.world_center(self.extent);
      let handles = host.build(coord, origin, seed, &content);
      debug!(
        "Spawned {} chunk {:?} ({} parts)",
        C::LAYOUT,
        coord,
        content.part_count()
      );
      if let Some(old) = self.registry.insert(Chunk {
        coord,
        seed,
        handles,
      }) {
        report.release_errors += release(host, old);
      }
      report.spawned.push(coord);
    }

    for coord in delta.despawn {
      if let Some(chunk) = self.registry.remove(&coord) {
        report.release_errors += release(host, chunk);
        debug!("Despawned {} chunk {:?}", C::LAYOUT, coord);
        report.despawned.push(coord);
      }
    }

    report
  }

  /// Releases every resident chunk. Returns how many were removed.
  pub fn clear<S>(&mut self, host: &mut S) -> usize
  where
    S: SceneHost<C, Handle = H>,
  {
    let chunks: Vec<_> = self.registry.drain().collect();
    let count = chunks.len();
    for chunk in chunks {
      release(host, chunk);
    }
    self.center = None;
    count
  }
}

/// Releases a chunk's handles, logging failures. Returns the error count.
fn release<C, S>(host: &mut S, chunk: Chunk<C, S::Handle>) -> usize
where
  C: ChunkCoord,
  S: SceneHost<C>,
{
  match host.release(chunk.handles) {
    Ok(()) => 0,
    Err(e) => {
      warn!("Releasing chunk {:?}: {}", chunk.coord, e);
      1
    }
  }
}
