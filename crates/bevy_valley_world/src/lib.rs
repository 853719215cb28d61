//! Valley World - deterministic streaming river valley for Bevy.
//!
//! Chunks of forest, river, bridges and houses are generated around a
//! camera and released once it moves on. Content is a pure function of the
//! chunk coordinate and a base seed, so revisiting a chunk rebuilds it
//! exactly.

use std::marker::PhantomData;

use bevy::prelude::*;

pub mod atmosphere;
pub mod camera;
pub mod config;
pub mod coords;
pub mod generation;
pub mod registry;
pub mod render;
pub mod seeding;
pub mod streamer;
pub mod systems;
#[cfg(feature = "visual_debug")]
pub mod visual_debug;
pub mod window;

pub use atmosphere::{LightingLook, LightingState, MoonDisc, ValleySun, moon_transform};
pub use camera::{
  ForwardDrift, StreamingCamera, StreamingCameraData, select_active, streaming_position,
};
pub use config::{
  BridgeConfig, ConfigError, EffectsConfig, ForestConfig, LightingPreset, MAX_WINDOW_RADIUS,
  MoonConfig, StructureConfig, ValleyConfig, WaterParams, WindowConfig,
};
pub use coords::{ChunkCoord, ChunkExtent, GridCoord, StripCoord};
pub use generation::{ChunkContent, GenerationError, generate};
pub use registry::{Chunk, ChunkRegistry};
pub use render::{
  BevySceneHost, ChunkHandle, ChunkPart, SharedChunkAssets, ValleyChunk, WaterMaterial,
};
pub use streamer::{ReleaseError, SceneHost, TickReport, WorldStreamer};
pub use systems::{RequestResync, ResyncReason, StreamingState, StreamingStats};
pub use window::{WindowDelta, window_delta};

/// Streams a river valley around [`StreamingCamera`] entities.
///
/// `C` picks the layout: [`StripCoord`] for a single strip following the
/// river, [`GridCoord`] for an unbounded grid.
///
/// # Example
/// ```ignore
/// app.add_plugins(ValleyWorldPlugin::strip(ValleyConfig::default()));
/// ```
pub struct ValleyWorldPlugin<C> {
  pub config: ValleyConfig,
  /// Spawn the sun, moon and fog presets.
  pub lighting: bool,
  /// Draw chunk gizmos (requires the `visual_debug` feature).
  pub visual_debug: bool,
  _layout: PhantomData<fn() -> C>,
}

impl ValleyWorldPlugin<StripCoord> {
  pub fn strip(config: ValleyConfig) -> Self {
    Self::new(config)
  }
}

impl ValleyWorldPlugin<GridCoord> {
  pub fn grid(config: ValleyConfig) -> Self {
    Self::new(config)
  }
}

impl<C> ValleyWorldPlugin<C> {
  fn new(config: ValleyConfig) -> Self {
    Self {
      config,
      lighting: true,
      visual_debug: false,
      _layout: PhantomData,
    }
  }

  pub fn with_lighting(mut self, enabled: bool) -> Self {
    self.lighting = enabled;
    self
  }

  pub fn with_visual_debug(mut self, enabled: bool) -> Self {
    self.visual_debug = enabled;
    self
  }
}

impl<C: ChunkCoord> Plugin for ValleyWorldPlugin<C> {
  fn build(&self, app: &mut App) {
    let streamer = match WorldStreamer::<C, ChunkHandle>::new(self.config.clone()) {
      Ok(streamer) => streamer,
      Err(e) => {
        error!("Invalid valley config, streaming disabled: {}", e);
        return;
      }
    };
    let extent = streamer.extent();
    info!(
      "Valley world: {} layout, chunks {}x{}, seed {}",
      C::LAYOUT,
      extent.across,
      extent.along,
      self.config.base_seed
    );

    app
      .insert_resource(self.config.clone())
      .insert_resource(StreamingState::new(streamer))
      .init_resource::<StreamingStats>()
      .add_message::<RequestResync>()
      .add_systems(
        Update,
        (camera::apply_forward_drift, systems::stream_chunks::<C>).chain(),
      );

    // Shared meshes, the water shader and the sky need a renderer
    if app.is_plugin_added::<bevy::render::RenderPlugin>() {
      bevy::asset::embedded_asset!(app, "render/shaders/water.wgsl");
      app
        .add_plugins(MaterialPlugin::<WaterMaterial>::default())
        .add_systems(PreStartup, render::setup_shared_assets);
      if self.lighting {
        app.add_plugins(atmosphere::AtmospherePlugin);
      }

      #[cfg(feature = "visual_debug")]
      if self.visual_debug {
        app.add_plugins(visual_debug::VisualDebugPlugin::<C>::default());
      }
    }
  }
}
