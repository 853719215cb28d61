//! Houses.
//!
//! Placement draws come from the chunk's structure stream. Each house then
//! builds its details from its own seed, derived from the chunk seed, the
//! chunk coordinate and the slot index.

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::{ChunkFrame, GenerationError, Part, Structure, symmetric};
use crate::config::ValleyConfig;
use crate::seeding::{Step, rng_from, step_rng, structure_seed};

/// Unit mesh a part is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
  Cuboid,
  Cylinder,
  Sphere,
  /// Triangular prism: width 1, rise 1, depth 1, base at y = 0.
  RoofPrism,
}

/// Material slot of a house part.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartMaterial {
  Wall,
  Trim,
  Roof,
  Door,
  Stone,
  Glass,
}

/// Gray levels of one house, each in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HousePalette {
  pub wall: f32,
  pub trim: f32,
  pub roof: f32,
  pub door: f32,
  pub stone: f32,
}

impl HousePalette {
  fn from_gray(g: f32) -> Self {
    let shade = |d: f32| (g - d).clamp(0.0, 1.0);
    Self {
      wall: g,
      trim: shade(0.12),
      roof: shade(0.35),
      door: shade(0.28),
      stone: shade(0.45),
    }
  }

  /// Gray level for `material`; glass is not gray-tinted.
  pub fn gray(&self, material: PartMaterial) -> Option<f32> {
    match material {
      PartMaterial::Wall => Some(self.wall),
      PartMaterial::Trim => Some(self.trim),
      PartMaterial::Roof => Some(self.roof),
      PartMaterial::Door => Some(self.door),
      PartMaterial::Stone => Some(self.stone),
      PartMaterial::Glass => None,
    }
  }
}

/// Edge margin for house centers.
const PLACEMENT_INSET: f32 = 2.0;
const GRAY_VARIANCE: f32 = 0.08;
const CHIMNEY_CHANCE: f32 = 0.7;
const FOUNDATION: f32 = 0.3;
const SETTLE_TILT_DEG: f32 = 1.5;

/// Per-house values drawn from the chunk's structure stream.
#[derive(Clone, Copy, Debug)]
struct HouseParams {
  width: f32,
  depth: f32,
  height: f32,
  pitch_deg: f32,
  overhang: f32,
  windows: u32,
  gray: f32,
}

pub(super) fn houses(
  frame: &ChunkFrame,
  key: IVec2,
  seed: u64,
  config: &ValleyConfig,
) -> Result<Vec<Structure>, GenerationError> {
  let mut rng = step_rng(seed, Step::Structures);
  let half_band = config.structure_half_band();

  (0..config.structures.per_chunk)
    .map(|slot| {
      let x = rng.random_range(symmetric(frame.half.x, PLACEMENT_INSET));
      let z = rng.random_range(symmetric(frame.half.y, PLACEMENT_INSET));
      let x = frame
        .displace(x, half_band)
        .ok_or(GenerationError::NoRoomBesideRiver {
          half_band,
          half_across: frame.half.x,
        })?;

      let scale = rng.random_range(0.85f32..=1.35);
      let params = HouseParams {
        width: 3.0 * scale,
        depth: 3.2 * scale,
        height: 2.8 * scale,
        pitch_deg: rng.random_range(25.0..=42.0),
        overhang: rng.random_range(0.2..=0.45),
        windows: rng.random_range(1..=5),
        gray: (0.45 + rng.random_range(-0.15f32..=0.12)).clamp(0.0, 1.0),
      };

      let house_seed = structure_seed(seed, key.x as i64, key.y as i64, slot);
      Ok(build_house(
        &params,
        house_seed,
        Vec3::new(x, 0.0, z),
      ))
    })
    .collect()
}

fn part(shape: Shape, material: PartMaterial, translation: Vec3, size: Vec3) -> Part {
  Part {
    shape,
    material,
    transform: Transform::from_translation(translation).with_scale(size),
  }
}

/// Cylinder part; unit cylinders have radius 0.5.
fn cylinder(material: PartMaterial, translation: Vec3, radius: f32, height: f32) -> Part {
  part(
    Shape::Cylinder,
    material,
    translation,
    Vec3::new(radius * 2.0, height, radius * 2.0),
  )
}

fn build_house(params: &HouseParams, seed: u64, position: Vec3) -> Structure {
  use PartMaterial::*;

  let mut rng = rng_from(seed);
  let gray = (params.gray + rng.random_range(-GRAY_VARIANCE..=GRAY_VARIANCE)).clamp(0.0, 1.0);
  let palette = HousePalette::from_gray(gray);

  let (w, d, h) = (params.width, params.depth, params.height);
  let mut parts = Vec::with_capacity(20 + params.windows as usize * 4);

  parts.push(part(
    Shape::Cuboid,
    Stone,
    Vec3::new(0.0, FOUNDATION * 0.5, 0.0),
    Vec3::new(w + 0.2, FOUNDATION, d + 0.2),
  ));
  parts.push(part(
    Shape::Cuboid,
    Wall,
    Vec3::new(0.0, FOUNDATION + h * 0.5, 0.0),
    Vec3::new(w, h, d),
  ));
  for side in [-1.0, 1.0] {
    parts.push(part(
      Shape::Cuboid,
      Trim,
      Vec3::new(side * (w * 0.5 + 0.04), FOUNDATION + h * 0.5, 0.0),
      Vec3::new(0.08, h + 0.2, 0.12),
    ));
  }
  parts.push(part(
    Shape::Cuboid,
    Trim,
    Vec3::new(0.0, FOUNDATION + h - 0.08, 0.0),
    Vec3::new(w + 0.02, 0.2, d + 0.02),
  ));

  // Roof: a triangular prism resting on the eaves.
  let half_span = w * 0.5 + params.overhang;
  let half_depth = d * 0.5 + params.overhang;
  let rise = params.pitch_deg.to_radians().tan() * half_span;
  let eave_y = FOUNDATION + h;
  let ridge_y = eave_y + rise;
  parts.push(part(
    Shape::RoofPrism,
    Roof,
    Vec3::new(0.0, eave_y, 0.0),
    Vec3::new(half_span * 2.0, rise, half_depth * 2.0),
  ));
  let mut ridge = cylinder(
    Trim,
    Vec3::new(0.0, ridge_y + 0.02, 0.0),
    0.06,
    half_depth * 2.0 + 0.12,
  );
  ridge.transform.rotation = Quat::from_rotation_x(std::f32::consts::FRAC_PI_2);
  parts.push(ridge);

  if rng.random::<f32>() < CHIMNEY_CHANCE {
    parts.push(part(
      Shape::Cuboid,
      Stone,
      Vec3::new(w * 0.18, ridge_y - rise * 0.25, d * 0.15),
      Vec3::new(0.36, 0.9, 0.36),
    ));
  }

  // Door, knob, step and porch face -Z.
  let front = -d * 0.5;
  let door_w = w * 0.32;
  let door_h = h * 0.52;
  parts.push(part(
    Shape::Cuboid,
    Door,
    Vec3::new(0.0, FOUNDATION + door_h * 0.5, front - 0.06),
    Vec3::new(door_w, door_h, 0.12),
  ));
  parts.push(part(
    Shape::Sphere,
    Trim,
    Vec3::new(door_w * 0.3, FOUNDATION + door_h * 0.5, front - 0.02),
    Vec3::splat(0.05),
  ));
  parts.push(part(
    Shape::Cuboid,
    Trim,
    Vec3::new(0.0, 0.06, front - 0.25),
    Vec3::new(door_w + 0.2, 0.12, 0.5),
  ));
  parts.push(part(
    Shape::Cuboid,
    Trim,
    Vec3::new(0.0, 0.06, front - 0.4),
    Vec3::new(w * 0.6, 0.12, 0.8),
  ));
  for side in [-1.0, 1.0] {
    parts.push(cylinder(
      Trim,
      Vec3::new(side * w * 0.25, FOUNDATION, front - 0.8),
      0.05,
      0.6,
    ));
  }

  for _ in 0..params.windows {
    push_window(&mut parts, &mut rng, w, d, h);
  }

  let settle = Quat::from_euler(
    EulerRot::YXZ,
    rng.random_range(0.0f32..=360.0).to_radians(),
    rng
      .random_range(-SETTLE_TILT_DEG..=SETTLE_TILT_DEG)
      .to_radians(),
    rng
      .random_range(-SETTLE_TILT_DEG..=SETTLE_TILT_DEG)
      .to_radians(),
  );

  Structure {
    seed,
    transform: Transform::from_translation(position).with_rotation(settle),
    palette,
    parts,
  }
}

/// Framed window with a cross mullion on a random wall.
fn push_window(parts: &mut Vec<Part>, rng: &mut ChaCha8Rng, w: f32, d: f32, h: f32) {
  let wall = rng.random_range(0..=3u8);
  let wx = rng.random_range(symmetric(w * 0.32, 0.0));
  let wz = rng.random_range(symmetric(d * 0.32, 0.0));
  let low = 0.5 + h * 0.1;
  let wy = FOUNDATION + rng.random_range(low..=(h * 0.65).max(low));

  let (pos, yaw_deg) = match wall {
    0 => (Vec3::new(wx, wy, -(d * 0.5 + 0.01)), 180.0f32),
    1 => (Vec3::new(wx, wy, d * 0.5 + 0.01), 0.0),
    2 => (Vec3::new(-(w * 0.5 + 0.01), wy, wz), -90.0),
    _ => (Vec3::new(w * 0.5 + 0.01, wy, wz), 90.0),
  };
  let rotation = Quat::from_rotation_y(yaw_deg.to_radians());
  let outward = rotation * Vec3::Z;

  let mut oriented = |material, offset: f32, size: Vec3| {
    parts.push(Part {
      shape: Shape::Cuboid,
      material,
      transform: Transform {
        translation: pos + outward * offset,
        rotation,
        scale: size,
      },
    });
  };
  oriented(PartMaterial::Trim, 0.0, Vec3::new(0.62, 0.62, 0.08));
  oriented(PartMaterial::Glass, 0.05, Vec3::new(0.48, 0.48, 0.01));
  oriented(PartMaterial::Trim, 0.06, Vec3::new(0.02, 0.48, 0.02));
  oriented(PartMaterial::Trim, 0.06, Vec3::new(0.48, 0.02, 0.02));
}
