//! Scene host that turns chunk content into Bevy entities.
//!
//! Each chunk becomes one root entity with a child per placed part. Houses
//! get an intermediate entity carrying their settle transform. Without a
//! render plugin the same hierarchy is spawned with transforms only.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::{SharedChunkAssets, WaterMaterial};
use crate::coords::ChunkCoord;
use crate::generation::{ChunkContent, HousePalette, PartMaterial, WATER_LEVEL};
use crate::streamer::{ReleaseError, SceneHost};

/// Root entity of a resident chunk.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValleyChunk {
  /// Coordinate as `(across, along)`.
  pub key: IVec2,
  pub seed: u64,
}

/// Any entity spawned below a [`ValleyChunk`].
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct ChunkPart;

/// A resource owned by one chunk.
#[derive(Clone, Debug)]
pub enum ChunkHandle {
  Entity(Entity),
  Water(Handle<WaterMaterial>),
  Material(Handle<StandardMaterial>),
}

#[derive(SystemParam)]
pub struct BevySceneHost<'w, 's> {
  commands: Commands<'w, 's>,
  shared: Option<Res<'w, SharedChunkAssets>>,
  water_materials: Option<ResMut<'w, Assets<WaterMaterial>>>,
  materials: Option<ResMut<'w, Assets<StandardMaterial>>>,
}

/// Gray materials of one house.
struct HouseMaterials {
  wall: Handle<StandardMaterial>,
  trim: Handle<StandardMaterial>,
  roof: Handle<StandardMaterial>,
  door: Handle<StandardMaterial>,
  stone: Handle<StandardMaterial>,
}

impl HouseMaterials {
  fn new(assets: &mut Assets<StandardMaterial>, palette: &HousePalette) -> Self {
    let mut gray = |level: f32, roughness: f32| {
      assets.add(StandardMaterial {
        base_color: Color::srgb(level, level, level),
        perceptual_roughness: roughness,
        ..default()
      })
    };
    Self {
      wall: gray(palette.wall, 0.88),
      trim: gray(palette.trim, 0.85),
      roof: gray(palette.roof, 1.0),
      door: gray(palette.door, 0.9),
      stone: gray(palette.stone, 1.0),
    }
  }

  fn pick(&self, material: PartMaterial, shared: &SharedChunkAssets) -> Handle<StandardMaterial> {
    match material {
      PartMaterial::Wall => self.wall.clone(),
      PartMaterial::Trim => self.trim.clone(),
      PartMaterial::Roof => self.roof.clone(),
      PartMaterial::Door => self.door.clone(),
      PartMaterial::Stone => self.stone.clone(),
      PartMaterial::Glass => shared.materials.glass.clone(),
    }
  }

  fn handles(&self) -> impl Iterator<Item = ChunkHandle> + '_ {
    [&self.wall, &self.trim, &self.roof, &self.door, &self.stone]
      .into_iter()
      .map(|h| ChunkHandle::Material(h.clone()))
  }
}

/// Spawns a part, adding mesh and material when rendering.
fn spawn_part(
  parent: &mut ChildSpawnerCommands,
  shared: Option<&SharedChunkAssets>,
  transform: Transform,
  pick: impl FnOnce(&SharedChunkAssets) -> (Handle<Mesh>, Handle<StandardMaterial>),
) {
  let mut part = parent.spawn((ChunkPart, transform));
  if let Some(shared) = shared {
    let (mesh, material) = pick(shared);
    part.insert((Mesh3d(mesh), MeshMaterial3d(material)));
  }
}

impl<C: ChunkCoord> SceneHost<C> for BevySceneHost<'_, '_> {
  type Handle = ChunkHandle;

  fn build(
    &mut self,
    coord: C,
    origin: Vec3,
    seed: u64,
    content: &ChunkContent,
  ) -> Vec<ChunkHandle> {
    let shared = self.shared.as_deref();
    let mut owned = Vec::new();

    let water = match (shared, &content.river, self.water_materials.as_mut()) {
      (Some(shared), Some(_), Some(assets)) => {
        let handle = assets.add(shared.water.clone());
        owned.push(ChunkHandle::Water(handle.clone()));
        Some(handle)
      }
      _ => None,
    };

    let mut houses = Vec::with_capacity(content.structures.len());
    for structure in &content.structures {
      let materials = match (shared, self.materials.as_mut()) {
        (Some(_), Some(assets)) => {
          let materials = HouseMaterials::new(assets, &structure.palette);
          owned.extend(materials.handles());
          Some(materials)
        }
        _ => None,
      };
      houses.push(materials);
    }

    let root = self
      .commands
      .spawn((
        ValleyChunk {
          key: coord.key(),
          seed,
        },
        Transform::from_translation(origin),
        Visibility::default(),
      ))
      .with_children(|chunk| {
        let size = content.ground.size;
        spawn_part(
          chunk,
          shared,
          Transform::from_scale(Vec3::new(size.x, 1.0, size.y)),
          |s| (s.meshes.plane.clone(), s.materials.ground.clone()),
        );

        if let Some(river) = &content.river {
          let mut surface = chunk.spawn((
            ChunkPart,
            Transform::from_xyz(river.center_x, WATER_LEVEL, 0.0).with_scale(Vec3::new(
              river.water_size.x,
              1.0,
              river.water_size.y,
            )),
          ));
          if let (Some(shared), Some(water)) = (shared, &water) {
            surface.insert((
              Mesh3d(shared.meshes.plane.clone()),
              MeshMaterial3d(water.clone()),
            ));
          }
          for bank in river.banks {
            spawn_part(chunk, shared, bank, |s| {
              (s.meshes.cuboid.clone(), s.materials.bank.clone())
            });
          }
        }

        let forest = &content.forest;
        for &t in &forest.trunks {
          spawn_part(chunk, shared, t, |s| {
            (s.meshes.trunk.clone(), s.materials.trunk.clone())
          });
        }
        for &t in &forest.canopy_a {
          spawn_part(chunk, shared, t, |s| {
            (s.meshes.sphere.clone(), s.materials.canopy_a.clone())
          });
        }
        for &t in &forest.canopy_b {
          spawn_part(chunk, shared, t, |s| {
            (s.meshes.sphere.clone(), s.materials.canopy_b.clone())
          });
        }

        for (variant, shrubs) in content.underbrush.iter().enumerate() {
          for &t in shrubs {
            spawn_part(chunk, shared, t, |s| {
              (s.meshes.sphere.clone(), s.materials.shrubs[variant].clone())
            });
          }
        }

        if let Some(bridge) = &content.bridge {
          for &t in &bridge.planks {
            spawn_part(chunk, shared, t, |s| {
              (s.meshes.cuboid.clone(), s.materials.plank.clone())
            });
          }
          for &t in &bridge.posts {
            spawn_part(chunk, shared, t, |s| {
              (s.meshes.cylinder.clone(), s.materials.rail.clone())
            });
          }
          for &t in &bridge.rails {
            spawn_part(chunk, shared, t, |s| {
              (s.meshes.cuboid.clone(), s.materials.rail.clone())
            });
          }
        }

        for (structure, materials) in content.structures.iter().zip(&houses) {
          chunk
            .spawn((ChunkPart, structure.transform, Visibility::default()))
            .with_children(|house| {
              for part in &structure.parts {
                spawn_part(house, shared, part.transform, |s| {
                  let material = match materials {
                    Some(m) => m.pick(part.material, s),
                    None => s.materials.glass.clone(),
                  };
                  (s.meshes.for_shape(part.shape), material)
                });
              }
            });
        }
      })
      .id();

    owned.insert(0, ChunkHandle::Entity(root));
    owned
  }

  fn release(&mut self, handles: Vec<ChunkHandle>) -> Result<(), ReleaseError> {
    let mut missing = 0;
    for handle in handles {
      match handle {
        ChunkHandle::Entity(entity) => match self.commands.get_entity(entity) {
          Ok(mut root) => root.despawn(),
          Err(_) => missing += 1,
        },
        ChunkHandle::Water(handle) => {
          if let Some(assets) = self.water_materials.as_mut() {
            if assets.remove(&handle).is_none() {
              missing += 1;
            }
          }
        }
        ChunkHandle::Material(handle) => {
          if let Some(assets) = self.materials.as_mut() {
            if assets.remove(&handle).is_none() {
              missing += 1;
            }
          }
        }
      }
    }

    if missing == 0 {
      Ok(())
    } else {
      Err(ReleaseError::Missing { count: missing })
    }
  }
}
