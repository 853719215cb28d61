//! Authoritative record of resident chunks.

use std::collections::HashMap;

use crate::coords::ChunkCoord;

/// A resident chunk and the scene handles it owns.
///
/// Handles are released exactly once, by whoever removes the chunk from the
/// registry.
#[derive(Debug)]
pub struct Chunk<C, H> {
  pub coord: C,
  pub seed: u64,
  pub handles: Vec<H>,
}

/// Map from coordinate to resident chunk.
#[derive(Debug)]
pub struct ChunkRegistry<C, H> {
  chunks: HashMap<C, Chunk<C, H>>,
}

impl<C, H> Default for ChunkRegistry<C, H> {
  fn default() -> Self {
    Self {
      chunks: HashMap::new(),
    }
  }
}

impl<C: ChunkCoord, H> ChunkRegistry<C, H> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers a chunk, returning the one it replaces.
  pub fn insert(&mut self, chunk: Chunk<C, H>) -> Option<Chunk<C, H>> {
    self.chunks.insert(chunk.coord, chunk)
  }

  pub fn remove(&mut self, coord: &C) -> Option<Chunk<C, H>> {
    self.chunks.remove(coord)
  }

  pub fn get(&self, coord: &C) -> Option<&Chunk<C, H>> {
    self.chunks.get(coord)
  }

  pub fn contains(&self, coord: &C) -> bool {
    self.chunks.contains_key(coord)
  }

  pub fn len(&self) -> usize {
    self.chunks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.chunks.is_empty()
  }

  /// Resident coordinates, sorted.
  pub fn keys(&self) -> Vec<C> {
    let mut keys: Vec<C> = self.chunks.keys().copied().collect();
    keys.sort_unstable();
    keys
  }

  pub fn iter(&self) -> impl Iterator<Item = &Chunk<C, H>> {
    self.chunks.values()
  }

  /// Removes every chunk.
  pub fn drain(&mut self) -> impl Iterator<Item = Chunk<C, H>> + '_ {
    self.chunks.drain().map(|(_, chunk)| chunk)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::coords::StripCoord;

  fn chunk(i: i32, handles: Vec<u32>) -> Chunk<StripCoord, u32> {
    Chunk {
      coord: StripCoord(i),
      seed: i as u64,
      handles,
    }
  }

  #[test]
  fn insert_returns_replaced_chunk() {
    let mut registry = ChunkRegistry::new();
    assert!(registry.insert(chunk(1, vec![1])).is_none());
    let old = registry.insert(chunk(1, vec![2])).unwrap();
    assert_eq!(old.handles, vec![1]);
    assert_eq!(registry.get(&StripCoord(1)).unwrap().handles, vec![2]);
    assert_eq!(registry.len(), 1);
  }

  #[test]
  fn keys_are_sorted() {
    let mut registry = ChunkRegistry::new();
    for i in [3, -1, 0, 2] {
      registry.insert(chunk(i, Vec::new()));
    }
    assert_eq!(
      registry.keys(),
      vec![StripCoord(-1), StripCoord(0), StripCoord(2), StripCoord(3)]
    );
  }

  #[test]
  fn drain_empties() {
    let mut registry = ChunkRegistry::new();
    registry.insert(chunk(0, vec![7]));
    registry.insert(chunk(1, vec![8]));
    let mut handles: Vec<u32> = registry.drain().flat_map(|c| c.handles).collect();
    handles.sort();
    assert_eq!(handles, vec![7, 8]);
    assert!(registry.is_empty());
    assert!(!registry.contains(&StripCoord(0)));
  }
}
