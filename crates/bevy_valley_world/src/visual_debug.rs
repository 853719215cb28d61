//! Gizmo overlays for resident chunks and the river band.
//!
//! Enable with the `visual_debug` feature flag.

use std::marker::PhantomData;

use bevy::prelude::*;

use crate::coords::ChunkCoord;
use crate::systems::StreamingState;

/// Coral #FF6F61
const CORAL: Color = Color::srgb(1.0, 0.435, 0.380);
/// Blue #4A90E2
const BLUE: Color = Color::srgb(0.290, 0.565, 0.886);
/// Gold #FFD700
const GOLD: Color = Color::srgb(1.0, 0.843, 0.0);

/// Lifts lines above the ground plane.
const LIFT: f32 = 0.05;

/// Toggles for each overlay.
#[derive(Resource, Clone, Debug)]
pub struct VisualDebugSettings {
  pub show_chunk_bounds: bool,
  pub show_river_band: bool,
}

impl Default for VisualDebugSettings {
  fn default() -> Self {
    Self {
      show_chunk_bounds: true,
      show_river_band: true,
    }
  }
}

pub(crate) struct VisualDebugPlugin<C>(PhantomData<C>);

impl<C> Default for VisualDebugPlugin<C> {
  fn default() -> Self {
    Self(PhantomData)
  }
}

impl<C: ChunkCoord> Plugin for VisualDebugPlugin<C> {
  fn build(&self, app: &mut App) {
    app
      .init_resource::<VisualDebugSettings>()
      .add_systems(PostUpdate, draw_valley_gizmos::<C>);
  }
}

fn outline(gizmos: &mut Gizmos, rect: Rect, color: Color) {
  let corner = |x: f32, z: f32| Vec3::new(x, LIFT, z);
  let (min, max) = (rect.min, rect.max);
  gizmos.line(corner(min.x, min.y), corner(max.x, min.y), color);
  gizmos.line(corner(max.x, min.y), corner(max.x, max.y), color);
  gizmos.line(corner(max.x, max.y), corner(min.x, max.y), color);
  gizmos.line(corner(min.x, max.y), corner(min.x, min.y), color);
}

fn draw_valley_gizmos<C: ChunkCoord>(
  settings: Res<VisualDebugSettings>,
  state: Res<StreamingState<C>>,
  mut gizmos: Gizmos,
) {
  let streamer = &state.streamer;
  let extent = streamer.extent();
  let config = streamer.config();
  let coords = streamer.registry().keys();

  if settings.show_chunk_bounds {
    for &coord in &coords {
      let color = if Some(coord) == streamer.center() {
        GOLD
      } else {
        BLUE
      };
      outline(&mut gizmos, coord.bounds(extent), color);
    }
  }

  if settings.show_river_band {
    let Some(along) = coords
      .iter()
      .map(|c| c.bounds(extent))
      .reduce(|a, b| a.union(b))
    else {
      return;
    };
    for half in [config.river_width * 0.5, config.vegetation_half_band()] {
      let band = Rect::new(
        config.river_center - half,
        along.min.y,
        config.river_center + half,
        along.max.y,
      );
      outline(&mut gizmos, band, CORAL);
    }
  }
}
