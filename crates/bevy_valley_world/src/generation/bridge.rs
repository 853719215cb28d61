//! Curved footbridges across the river.
//!
//! Deck planks, rail posts and rail bars all sit on one cosine arc spanning
//! the river. The arc parameter is linear in the part index; nothing here is
//! random.

use std::f32::consts::PI;

use bevy::prelude::*;

use super::{Bridge, ChunkFrame};
use crate::config::ValleyConfig;

pub const PLANKS: usize = 24;
pub const POSTS: usize = 8;
pub const RAIL_SEGMENTS: usize = 12;

/// Height of the arc's anchor above ground.
const BASE_Y: f32 = 1.0;
const DECK_LIFT: f32 = 0.35;
const ARC_RISE: f32 = 0.65;
/// Fraction of the river width the span covers.
const SPAN_FRACTION: f32 = 0.95;
const PLANK_TILT_DEG: f32 = -12.0;
const POST_HEIGHT: f32 = 0.6;
const POST_RADIUS: f32 = 0.045;
const RAIL_LIFT: f32 = 0.45;
const RAIL_THICKNESS: f32 = 0.05;

/// Deck elevation profile of one bridge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BridgeArc {
  pub center: Vec3,
  pub river_width: f32,
}

impl BridgeArc {
  /// Deck point at parameter `t` in `[0, 1]`, bank to bank.
  pub fn point(&self, t: f32) -> Vec3 {
    let u = t - 0.5;
    Vec3::new(
      self.center.x + u * self.river_width * SPAN_FRACTION,
      self.center.y + DECK_LIFT + (u * PI).cos() * ARC_RISE,
      self.center.z,
    )
  }

  /// Z offset of the rails on `side` (-1 or 1).
  fn rail_z(&self, side: f32) -> f32 {
    side * self.river_width * 0.06
  }
}

/// Parameter of element `i` out of `n` spread end to end.
fn param(i: usize, n: usize) -> f32 {
  if n <= 1 {
    0.5
  } else {
    i as f32 / (n - 1) as f32
  }
}

/// Whether the chunk is on a bridge crossing.
pub(super) fn has_bridge(frame: &ChunkFrame, along: i32, config: &ValleyConfig) -> bool {
  let bridges = &config.bridges;
  if !bridges.enabled || bridges.frequency == 0 {
    return false;
  }
  let offset = frame.world_center.x - config.river_center;
  offset.abs() <= config.river_width * 0.25 && along.rem_euclid(bridges.frequency as i32) == 0
}

pub(super) fn bridge(frame: &ChunkFrame, along: i32, config: &ValleyConfig) -> Option<Bridge> {
  if !has_bridge(frame, along, config) {
    return None;
  }
  let arc = BridgeArc {
    center: Vec3::new(frame.river_x, BASE_Y, 0.0),
    river_width: config.river_width,
  };
  Some(build(&arc))
}

fn build(arc: &BridgeArc) -> Bridge {
  let w = arc.river_width;

  let planks = (0..PLANKS)
    .map(|i| {
      let t = param(i, PLANKS);
      Transform::from_translation(arc.point(t))
        .with_rotation(Quat::from_rotation_z(((t - 0.5) * PLANK_TILT_DEG).to_radians()))
        .with_scale(Vec3::new(w * 0.09, 0.07, 1.9))
    })
    .collect();

  let mut posts = Vec::with_capacity(POSTS * 2);
  for i in 0..POSTS {
    let base = arc.point(param(i, POSTS));
    for side in [-1.0, 1.0] {
      posts.push(
        Transform::from_xyz(base.x, base.y + POST_HEIGHT * 0.5, base.z + arc.rail_z(side))
          .with_scale(Vec3::new(POST_RADIUS * 2.0, POST_HEIGHT, POST_RADIUS * 2.0)),
      );
    }
  }

  let mut rails = Vec::with_capacity(RAIL_SEGMENTS * 2);
  for side in [-1.0, 1.0] {
    let rail_point = |t: f32| arc.point(t) + Vec3::new(0.0, RAIL_LIFT, arc.rail_z(side));
    for i in 0..RAIL_SEGMENTS {
      let p0 = rail_point(i as f32 / RAIL_SEGMENTS as f32);
      let p1 = rail_point((i + 1) as f32 / RAIL_SEGMENTS as f32);
      let segment = p1 - p0;
      let rotation = segment
        .try_normalize()
        .map_or(Quat::IDENTITY, |dir| Quat::from_rotation_arc(Vec3::X, dir));
      rails.push(Transform {
        translation: (p0 + p1) * 0.5,
        rotation,
        scale: Vec3::new(segment.length(), RAIL_THICKNESS, RAIL_THICKNESS),
      });
    }
  }

  Bridge {
    planks,
    posts,
    rails,
  }
}
