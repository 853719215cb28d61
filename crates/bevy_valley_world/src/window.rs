//! Active window diffing.
//!
//! Pure set arithmetic: no engine state, no registry mutation.

use std::collections::HashSet;

use crate::coords::ChunkCoord;

/// Work required to make the resident set match a window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowDelta<C> {
  /// Coordinates to generate, sorted.
  pub spawn: Vec<C>,
  /// Resident coordinates outside the window, sorted.
  pub despawn: Vec<C>,
}

impl<C> WindowDelta<C> {
  pub fn is_empty(&self) -> bool {
    self.spawn.is_empty() && self.despawn.is_empty()
  }
}

impl<C> Default for WindowDelta<C> {
  fn default() -> Self {
    Self {
      spawn: Vec::new(),
      despawn: Vec::new(),
    }
  }
}

/// Computes which coordinates enter and leave.
///
/// With `resync` every window coordinate is respawned, resident or not.
/// Despawns never depend on `resync`.
pub fn window_delta<C: ChunkCoord>(
  resident: impl IntoIterator<Item = C>,
  window: &[C],
  resync: bool,
) -> WindowDelta<C> {
  let resident: HashSet<C> = resident.into_iter().collect();
  let wanted: HashSet<C> = window.iter().copied().collect();

  let mut spawn: Vec<C> = if resync {
    wanted.iter().copied().collect()
  } else {
    wanted.difference(&resident).copied().collect()
  };
  let mut despawn: Vec<C> = resident.difference(&wanted).copied().collect();

  spawn.sort_unstable();
  despawn.sort_unstable();
  WindowDelta { spawn, despawn }
}
