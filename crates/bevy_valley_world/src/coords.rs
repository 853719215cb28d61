//! Chunk coordinate types.
//!
//! Both layouts use centered bins: coordinate `c` covers
//! `[c * extent - extent / 2, c * extent + extent / 2)` on every streamed
//! axis, and a chunk's geometry is built around `c * extent`. Camera
//! conversion and chunk placement go through the same helpers so the two
//! can never disagree.
//!
//! World axes: the river runs along world Z. "Along" values are measured on
//! Z, "across" values on X.

use std::fmt::Debug;
use std::hash::Hash;

use bevy::math::{IVec2, Rect, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::{ValleyConfig, WindowConfig};
use crate::seeding;

/// Converts a world-space axis value to its centered bin index.
#[inline]
pub fn centered_bin(value: f32, extent: f32) -> i32 {
  ((value + extent * 0.5) / extent).floor() as i32
}

/// Window reach as a coordinate offset; saturates instead of wrapping.
#[inline]
fn reach(chunks: u32) -> i32 {
  i32::try_from(chunks).unwrap_or(i32::MAX)
}

/// Size of one chunk in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkExtent {
  /// Size on world X.
  pub across: f32,
  /// Size on world Z.
  pub along: f32,
}

impl ChunkExtent {
  pub fn half(&self) -> Vec2 {
    Vec2::new(self.across * 0.5, self.along * 0.5)
  }
}

/// Integer chunk identity for one streaming layout.
///
/// Implementations must keep `from_world` and `world_center` consistent:
/// `C::from_world(c.world_center(e), e) == c` for every coordinate.
pub trait ChunkCoord: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
  /// Layout name used in logs.
  const LAYOUT: &'static str;
  /// Underbrush count when the config does not override it.
  const DEFAULT_UNDERBRUSH: u32;

  /// Chunk size for this layout under `config`.
  fn extent(config: &ValleyConfig) -> ChunkExtent;

  /// Coordinate of the bin containing `pos`.
  fn from_world(pos: Vec3, extent: ChunkExtent) -> Self;

  /// World-space origin of the chunk; generated content is local to it.
  fn world_center(self, extent: ChunkExtent) -> Vec3;

  /// Coordinates that should be resident around `self`, sorted.
  fn window(self, window: &WindowConfig) -> Vec<Self>;

  /// Index along the river axis.
  fn along(self) -> i32;

  /// Coordinate term of the canopy batch parity rule.
  fn parity_offset(self) -> i64;

  /// Per-chunk seed under `base`.
  fn seed_for(self, base: u64) -> u64;

  /// Flattened form, `x` across and `y` along.
  fn key(self) -> IVec2;

  /// World XZ rectangle covered by the chunk (`x` is world X, `y` world Z).
  fn bounds(self, extent: ChunkExtent) -> Rect {
    let center = self.world_center(extent);
    Rect::from_center_size(
      Vec2::new(center.x, center.z),
      Vec2::new(extent.across, extent.along),
    )
  }
}

/// 1-D valley strip: chunks stacked along world Z, one chunk wide on X.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StripCoord(pub i32);

impl ChunkCoord for StripCoord {
  const LAYOUT: &'static str = "strip";
  const DEFAULT_UNDERBRUSH: u32 = 160;

  fn extent(config: &ValleyConfig) -> ChunkExtent {
    ChunkExtent {
      across: config.strip_across_extent(),
      along: config.chunk_extent,
    }
  }

  fn from_world(pos: Vec3, extent: ChunkExtent) -> Self {
    Self(centered_bin(pos.z, extent.along))
  }

  fn world_center(self, extent: ChunkExtent) -> Vec3 {
    Vec3::new(0.0, 0.0, self.0 as f32 * extent.along)
  }

  fn window(self, window: &WindowConfig) -> Vec<Self> {
    let behind = self.0.saturating_sub(reach(window.behind));
    let ahead = self.0.saturating_add(reach(window.ahead));
    (behind..=ahead).map(Self).collect()
  }

  fn along(self) -> i32 {
    self.0
  }

  fn parity_offset(self) -> i64 {
    self.0 as i64
  }

  fn seed_for(self, base: u64) -> u64 {
    seeding::strip_seed(self.0, base)
  }

  fn key(self) -> IVec2 {
    IVec2::new(0, self.0)
  }
}

/// 2-D grid on the XZ plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridCoord {
  pub x: i32,
  pub z: i32,
}

impl GridCoord {
  pub const fn new(x: i32, z: i32) -> Self {
    Self { x, z }
  }
}

impl ChunkCoord for GridCoord {
  const LAYOUT: &'static str = "grid";
  const DEFAULT_UNDERBRUSH: u32 = 120;

  fn extent(config: &ValleyConfig) -> ChunkExtent {
    ChunkExtent {
      across: config.chunk_extent,
      along: config.chunk_extent,
    }
  }

  fn from_world(pos: Vec3, extent: ChunkExtent) -> Self {
    Self {
      x: centered_bin(pos.x, extent.across),
      z: centered_bin(pos.z, extent.along),
    }
  }

  fn world_center(self, extent: ChunkExtent) -> Vec3 {
    Vec3::new(
      self.x as f32 * extent.across,
      0.0,
      self.z as f32 * extent.along,
    )
  }

  fn window(self, window: &WindowConfig) -> Vec<Self> {
    let r = reach(window.radius);
    let side = 2 * window.radius as usize + 1;
    let mut coords = Vec::with_capacity(side.saturating_mul(side));
    for x in self.x.saturating_sub(r)..=self.x.saturating_add(r) {
      for z in self.z.saturating_sub(r)..=self.z.saturating_add(r) {
        coords.push(Self { x, z });
      }
    }
    coords
  }

  fn along(self) -> i32 {
    self.z
  }

  fn parity_offset(self) -> i64 {
    self.x as i64 * 31 + self.z as i64 * 17
  }

  fn seed_for(self, base: u64) -> u64 {
    seeding::grid_seed(self.x, self.z, base)
  }

  fn key(self) -> IVec2 {
    IVec2::new(self.x, self.z)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const EXTENT: ChunkExtent = ChunkExtent {
    across: 120.0,
    along: 120.0,
  };

  #[test]
  fn centered_bins_split_at_half_extent() {
    assert_eq!(centered_bin(0.0, 120.0), 0);
    assert_eq!(centered_bin(59.9, 120.0), 0);
    assert_eq!(centered_bin(60.0, 120.0), 1);
    assert_eq!(centered_bin(-60.0, 120.0), 0);
    assert_eq!(centered_bin(-60.1, 120.0), -1);
    assert_eq!(centered_bin(600.0, 120.0), 5);
  }

  #[test]
  fn world_center_round_trips() {
    for i in -6..=6 {
      let strip = StripCoord(i);
      assert_eq!(
        StripCoord::from_world(strip.world_center(EXTENT), EXTENT),
        strip
      );
      for j in -3..=3 {
        let grid = GridCoord::new(i, j);
        assert_eq!(GridCoord::from_world(grid.world_center(EXTENT), EXTENT), grid);
      }
    }
  }

  #[test]
  fn strip_ignores_across_axis() {
    let c = StripCoord::from_world(Vec3::new(5_000.0, 30.0, 130.0), EXTENT);
    assert_eq!(c, StripCoord(1));
  }

  #[test]
  fn strip_window_is_asymmetric() {
    let window = WindowConfig {
      ahead: 3,
      behind: 1,
      radius: 0,
    };
    let coords: Vec<i32> = StripCoord(10).window(&window).iter().map(|c| c.0).collect();
    assert_eq!(coords, vec![9, 10, 11, 12, 13]);
  }

  #[test]
  fn huge_reach_keeps_the_camera_chunk() {
    let window = WindowConfig {
      ahead: 1,
      behind: u32::MAX,
      radius: 1,
    };
    let origin = i32::MIN + 2;
    let coords: Vec<i32> = StripCoord(origin)
      .window(&window)
      .iter()
      .map(|c| c.0)
      .collect();
    assert_eq!(coords, vec![i32::MIN, i32::MIN + 1, origin, origin + 1]);
  }

  #[test]
  fn grid_window_clips_at_coordinate_limits() {
    let window = WindowConfig {
      ahead: 0,
      behind: 0,
      radius: 1,
    };
    let coords = GridCoord::new(i32::MAX, i32::MAX).window(&window);
    assert_eq!(coords.len(), 4);
    assert!(coords.contains(&GridCoord::new(i32::MAX, i32::MAX)));
  }

  #[test]
  fn grid_window_is_sorted_square() {
    let window = WindowConfig {
      ahead: 0,
      behind: 0,
      radius: 1,
    };
    let coords = GridCoord::new(0, 0).window(&window);
    assert_eq!(coords.len(), 9);
    let mut sorted = coords.clone();
    sorted.sort();
    assert_eq!(coords, sorted);
    assert!(coords.contains(&GridCoord::new(-1, 1)));
  }

  #[test]
  fn bounds_cover_centered_bin() {
    let rect = GridCoord::new(1, -1).bounds(EXTENT);
    assert_eq!(rect.min, Vec2::new(60.0, -180.0));
    assert_eq!(rect.max, Vec2::new(180.0, -60.0));
  }
}
