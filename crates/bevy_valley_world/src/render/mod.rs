//! Bevy rendering of chunk content.

mod host;
mod meshes;
mod water;

pub use host::{BevySceneHost, ChunkHandle, ChunkPart, ValleyChunk};
pub use meshes::{SharedChunkAssets, SharedMaterials, UnitMeshes, roof_prism};
pub(crate) use meshes::setup_shared_assets;
pub use water::{WaterMaterial, WaterUniforms};
