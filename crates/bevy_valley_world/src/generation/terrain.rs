//! Ground plane, water surface and river banks.
//!
//! Nothing here is random: the river is a fixed world-space band, so its
//! presence in a chunk depends only on the chunk's position.

use bevy::prelude::*;

use super::{ChunkFrame, GroundPlane, RiverSegment};
use crate::config::ValleyConfig;

const BANK_GAP: f32 = 0.4;
const BANK_WIDTH: f32 = 6.0;
const BANK_Y: f32 = -0.55;
/// Left and right bank heights.
const BANK_HEIGHTS: [f32; 2] = [1.0, 1.25];

pub(super) fn ground(frame: &ChunkFrame, config: &ValleyConfig) -> GroundPlane {
  GroundPlane {
    size: frame.half * 2.0 + Vec2::splat(config.ground_overlap),
  }
}

pub(super) fn river(frame: &ChunkFrame, config: &ValleyConfig) -> Option<RiverSegment> {
  let half_width = config.river_width * 0.5;
  if !frame.river_overlaps(half_width) {
    return None;
  }

  let length = frame.half.y * 2.0;
  let bank_offset = half_width + BANK_GAP + BANK_WIDTH * 0.5;
  let bank = |side: f32, height: f32| {
    Transform::from_xyz(frame.river_x + side * bank_offset, BANK_Y, 0.0)
      .with_scale(Vec3::new(BANK_WIDTH, height, length))
  };

  Some(RiverSegment {
    center_x: frame.river_x,
    water_size: Vec2::new(config.river_width, length),
    banks: [bank(-1.0, BANK_HEIGHTS[0]), bank(1.0, BANK_HEIGHTS[1])],
  })
}
