//! Tree and underbrush placement.

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::{ChunkFrame, Forest, GenerationError, SHRUB_VARIANTS, symmetric};
use crate::config::ValleyConfig;
use crate::seeding::{Step, step_rng};

const MAX_TILT_DEG: f32 = 3.0;
const MAX_YAW_DEG: f32 = 12.0;
const LOBE_YAW_JITTER_DEG: f32 = 10.0;
const SHRUB_RADIUS: f32 = 0.25;
const SHRUB_Y: f32 = 0.1;

fn degrees(rng: &mut ChaCha8Rng, max: f32) -> f32 {
  rng.random_range(-max..=max).to_radians()
}

/// Places trees, displacing any drawn inside the river buffer.
///
/// Every drawn tree is kept. Canopies alternate between the two batches by
/// index parity so batch sizes never depend on random draws.
pub(super) fn trees(
  frame: &ChunkFrame,
  parity_offset: i64,
  seed: u64,
  config: &ValleyConfig,
) -> Result<Forest, GenerationError> {
  let forest_config = &config.forest;
  let mut rng = step_rng(seed, Step::Forest);
  let half_band = config.vegetation_half_band();
  let count = forest_config.trees_per_chunk as usize;

  let mut forest = Forest {
    trunks: Vec::with_capacity(count),
    canopy_a: Vec::with_capacity(count),
    canopy_b: Vec::with_capacity(count),
  };

  for i in 0..count {
    let x = rng.random_range(symmetric(frame.half.x, 0.0));
    let z = rng.random_range(symmetric(frame.half.y, 0.0));
    let x = frame
      .displace(x, half_band)
      .ok_or(GenerationError::NoRoomBesideRiver {
        half_band,
        half_across: frame.half.x,
      })?;

    let height = rng.random_range(forest_config.min_tree_height..=forest_config.max_tree_height);
    let (min_r, max_r) = forest_config.radius_scale;
    let radius = rng.random_range(min_r..=max_r);
    let tilt_x = degrees(&mut rng, MAX_TILT_DEG);
    let tilt_z = degrees(&mut rng, MAX_TILT_DEG);
    let yaw = degrees(&mut rng, MAX_YAW_DEG);

    forest.trunks.push(Transform {
      translation: Vec3::new(x, height * 0.5, z),
      rotation: Quat::from_rotation_y(yaw)
        * Quat::from_rotation_z(tilt_z)
        * Quat::from_rotation_x(tilt_x),
      scale: Vec3::new(radius, height, radius),
    });

    let base = height * 0.45 * rng.random_range(0.9f32..=1.15);
    let ellipsoid = Vec3::new(
      base * rng.random_range(0.85f32..=1.15),
      base * rng.random_range(1.0f32..=1.35),
      base * rng.random_range(0.85f32..=1.15),
    );
    let canopy_pos = Vec3::new(x, height + ellipsoid.y * 0.55, z);
    let canopy = Transform {
      translation: canopy_pos,
      rotation: Quat::from_rotation_y(yaw)
        * Quat::from_rotation_z(tilt_z * 0.5)
        * Quat::from_rotation_x(tilt_x * 0.5),
      scale: ellipsoid,
    };

    let to_a = ((i as i64).wrapping_add(parity_offset) & 1) == 0;
    let (primary, secondary) = if to_a {
      (&mut forest.canopy_a, &mut forest.canopy_b)
    } else {
      (&mut forest.canopy_b, &mut forest.canopy_a)
    };
    primary.push(canopy);

    if forest_config.second_lobe {
      let scale = ellipsoid * rng.random_range(0.65f32..=0.85);
      let lobe_yaw = yaw + degrees(&mut rng, LOBE_YAW_JITTER_DEG);
      let offset = Vec3::new(
        rng.random_range(-ellipsoid.x * 0.25..=ellipsoid.x * 0.25),
        rng.random_range(ellipsoid.y * 0.1..=ellipsoid.y * 0.35),
        rng.random_range(-ellipsoid.z * 0.25..=ellipsoid.z * 0.25),
      );
      secondary.push(Transform {
        translation: canopy_pos + offset,
        rotation: Quat::from_rotation_y(lobe_yaw),
        scale,
      });
    }
  }

  Ok(forest)
}

/// Scatters shrubs, dropping any that land inside the river buffer.
pub(super) fn underbrush(
  frame: &ChunkFrame,
  seed: u64,
  count: u32,
  config: &ValleyConfig,
) -> [Vec<Transform>; SHRUB_VARIANTS] {
  let mut rng = step_rng(seed, Step::Underbrush);
  let half_band = config.vegetation_half_band();
  let mut variants: [Vec<Transform>; SHRUB_VARIANTS] = Default::default();

  for _ in 0..count {
    let x = rng.random_range(symmetric(frame.half.x, 0.0));
    let z = rng.random_range(symmetric(frame.half.y, 0.0));
    let scale = rng.random_range(0.6f32..=1.6) * SHRUB_RADIUS;
    let variant = rng.random_range(0..SHRUB_VARIANTS);
    if frame.in_band(x, half_band) {
      continue;
    }
    variants[variant].push(Transform::from_xyz(x, SHRUB_Y, z).with_scale(Vec3::splat(scale)));
  }

  variants
}

#[cfg(test)]
mod tests {
  use super::*;

  fn frame() -> ChunkFrame {
    ChunkFrame {
      half: Vec2::splat(60.0),
      world_center: Vec3::ZERO,
      river_x: 0.0,
    }
  }

  #[test]
  fn lobes_go_to_the_other_batch() {
    let mut config = ValleyConfig::default();
    config.forest.trees_per_chunk = 10;
    let forest = trees(&frame(), 0, 3, &config).unwrap();
    assert_eq!(forest.trunks.len(), 10);
    assert_eq!(forest.canopy_a.len(), 10);
    assert_eq!(forest.canopy_b.len(), 10);
  }

  #[test]
  fn canopy_sits_above_trunk() {
    let mut config = ValleyConfig::default();
    config.forest.trees_per_chunk = 25;
    config.forest.second_lobe = false;
    let forest = trees(&frame(), 0, 11, &config).unwrap();
    // Parity offset 0: even trees feed batch A in draw order.
    for (trunk, canopy) in forest.trunks.iter().step_by(2).zip(&forest.canopy_a) {
      let height = trunk.scale.y;
      assert!((config.forest.min_tree_height..=config.forest.max_tree_height).contains(&height));
      assert!(canopy.translation.y > height);
      assert_eq!(canopy.translation.x, trunk.translation.x);
    }
  }

  #[test]
  fn no_room_is_reported() {
    let mut config = ValleyConfig::default();
    config.river_width = 200.0;
    assert!(matches!(
      trees(&frame(), 0, 1, &config),
      Err(GenerationError::NoRoomBesideRiver { .. })
    ));
  }

  #[test]
  fn zero_shrubs_is_empty() {
    let config = ValleyConfig::default();
    let variants = underbrush(&frame(), 1, 0, &config);
    assert!(variants.iter().all(Vec::is_empty));
  }
}
