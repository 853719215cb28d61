//! Procedural content for one chunk.
//!
//! [`generate`] is a pure function of `(coordinate, seed, config)`. It
//! produces engine-free descriptors in chunk-local space; turning them into
//! entities is the scene host's job. Steps that draw random numbers each own
//! a generator derived from the chunk seed, so adding draws to one step
//! never shifts another.

mod bridge;
mod forest;
mod structures;
mod terrain;

use bevy::prelude::*;

pub use bridge::{BridgeArc, POSTS, PLANKS, RAIL_SEGMENTS};
pub use structures::{HousePalette, PartMaterial, Shape};

use crate::config::{DISPLACE_EPSILON, EDGE_INSET, ValleyConfig};
use crate::coords::ChunkCoord;

/// Number of underbrush color variants.
pub const SHRUB_VARIANTS: usize = 3;
/// Height of the water plane above the ground plane.
pub const WATER_LEVEL: f32 = 0.02;

/// Everything a chunk renders, relative to its world center.
///
/// Instance transforms assume unit meshes: boxes and planes of size 1,
/// cylinders and frustums of height 1, spheres of radius 1.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkContent {
  pub ground: GroundPlane,
  pub river: Option<RiverSegment>,
  pub forest: Forest,
  pub underbrush: [Vec<Transform>; SHRUB_VARIANTS],
  pub bridge: Option<Bridge>,
  pub structures: Vec<Structure>,
}

impl ChunkContent {
  /// Total number of placed parts, used for logging.
  pub fn part_count(&self) -> usize {
    1 + self.river.as_ref().map_or(0, |_| 3)
      + self.forest.trunks.len()
      + self.forest.canopy_a.len()
      + self.forest.canopy_b.len()
      + self.underbrush.iter().map(Vec::len).sum::<usize>()
      + self.bridge.as_ref().map_or(0, Bridge::part_count)
      + self.structures.iter().map(|s| s.parts.len()).sum::<usize>()
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GroundPlane {
  pub size: Vec2,
}

/// Water surface and the two banks flanking it.
#[derive(Clone, Debug, PartialEq)]
pub struct RiverSegment {
  /// Local X of the river centerline.
  pub center_x: f32,
  pub water_size: Vec2,
  pub banks: [Transform; 2],
}

/// Tree instances split into draw batches.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Forest {
  pub trunks: Vec<Transform>,
  pub canopy_a: Vec<Transform>,
  pub canopy_b: Vec<Transform>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bridge {
  pub planks: Vec<Transform>,
  pub posts: Vec<Transform>,
  pub rails: Vec<Transform>,
}

impl Bridge {
  pub fn part_count(&self) -> usize {
    self.planks.len() + self.posts.len() + self.rails.len()
  }
}

/// A house: parts are relative to `transform`.
#[derive(Clone, Debug, PartialEq)]
pub struct Structure {
  pub seed: u64,
  pub transform: Transform,
  pub palette: HousePalette,
  pub parts: Vec<Part>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Part {
  pub shape: Shape,
  pub material: PartMaterial,
  pub transform: Transform,
}

/// A chunk could not be generated.
#[derive(Clone, Debug, PartialEq)]
pub enum GenerationError {
  DegenerateExtent { across: f32, along: f32 },
  NoRoomBesideRiver { half_band: f32, half_across: f32 },
}

impl std::fmt::Display for GenerationError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::DegenerateExtent { across, along } => {
        write!(f, "degenerate chunk extent {}x{}", across, along)
      }
      Self::NoRoomBesideRiver {
        half_band,
        half_across,
      } => write!(
        f,
        "river band half width {} leaves no room in chunk half width {}",
        half_band, half_across
      ),
    }
  }
}

impl std::error::Error for GenerationError {}

/// Chunk-local placement frame shared by every step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkFrame {
  /// Half size, `x` across and `y` along.
  pub half: Vec2,
  pub world_center: Vec3,
  /// Local X of the river centerline.
  pub river_x: f32,
}

impl ChunkFrame {
  pub fn new<C: ChunkCoord>(coord: C, config: &ValleyConfig) -> Result<Self, GenerationError> {
    let extent = C::extent(config);
    let usable = |v: f32| v.is_finite() && v > 0.0;
    if !usable(extent.across) || !usable(extent.along) {
      return Err(GenerationError::DegenerateExtent {
        across: extent.across,
        along: extent.along,
      });
    }
    let world_center = coord.world_center(extent);
    Ok(Self {
      half: extent.half(),
      world_center,
      river_x: config.river_center - world_center.x,
    })
  }

  /// Whether a band of `half_width` around the river touches the chunk.
  pub fn river_overlaps(&self, half_width: f32) -> bool {
    self.river_x + half_width >= -self.half.x && self.river_x - half_width <= self.half.x
  }

  pub fn in_band(&self, x: f32, half_band: f32) -> bool {
    (x - self.river_x).abs() < half_band
  }

  /// Moves a local X out of the river band.
  ///
  /// Positions already outside are returned unchanged. Others go to the band
  /// edge on the side they were drawn on, or to the far edge when the near
  /// one lies outside the chunk. `None` when neither edge fits.
  pub fn displace(&self, x: f32, half_band: f32) -> Option<f32> {
    let offset = x - self.river_x;
    if offset.abs() >= half_band {
      return Some(x);
    }
    let side = if offset < 0.0 { -1.0 } else { 1.0 };
    let limit = self.half.x - EDGE_INSET;
    [side, -side]
      .into_iter()
      .map(|s| self.river_x + s * (half_band + DISPLACE_EPSILON))
      .find(|edge| edge.abs() <= limit)
  }
}

/// Inclusive draw range `[-(half - inset), half - inset]`, never inverted.
pub(crate) fn symmetric(half: f32, inset: f32) -> std::ops::RangeInclusive<f32> {
  let h = (half - inset).max(0.0);
  -h..=h
}

/// Generates the full content of the chunk at `coord`.
pub fn generate<C: ChunkCoord>(
  coord: C,
  seed: u64,
  config: &ValleyConfig,
) -> Result<ChunkContent, GenerationError> {
  let frame = ChunkFrame::new(coord, config)?;
  let shrubs = config.underbrush_per_chunk.unwrap_or(C::DEFAULT_UNDERBRUSH);

  Ok(ChunkContent {
    ground: terrain::ground(&frame, config),
    river: terrain::river(&frame, config),
    forest: forest::trees(&frame, coord.parity_offset(), seed, config)?,
    underbrush: forest::underbrush(&frame, seed, shrubs, config),
    bridge: bridge::bridge(&frame, coord.along(), config),
    structures: structures::houses(&frame, coord.key(), seed, config)?,
  })
}
