//! Unit meshes and shared materials reused by every chunk.
//!
//! Chunk content only carries transforms, so identical parts across chunks
//! share one mesh and one material handle and batch together.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;

use super::WaterMaterial;
use crate::config::ValleyConfig;
use crate::generation::{SHRUB_VARIANTS, Shape};

/// Meshes every chunk draws with.
#[derive(Clone)]
pub struct UnitMeshes {
  pub cuboid: Handle<Mesh>,
  pub cylinder: Handle<Mesh>,
  pub sphere: Handle<Mesh>,
  pub trunk: Handle<Mesh>,
  pub roof: Handle<Mesh>,
  pub plane: Handle<Mesh>,
}

impl UnitMeshes {
  pub fn for_shape(&self, shape: Shape) -> Handle<Mesh> {
    match shape {
      Shape::Cuboid => self.cuboid.clone(),
      Shape::Cylinder => self.cylinder.clone(),
      Shape::Sphere => self.sphere.clone(),
      Shape::RoofPrism => self.roof.clone(),
    }
  }
}

/// Materials that never vary between chunks.
#[derive(Clone)]
pub struct SharedMaterials {
  pub ground: Handle<StandardMaterial>,
  pub bank: Handle<StandardMaterial>,
  pub trunk: Handle<StandardMaterial>,
  pub canopy_a: Handle<StandardMaterial>,
  pub canopy_b: Handle<StandardMaterial>,
  pub shrubs: [Handle<StandardMaterial>; SHRUB_VARIANTS],
  pub plank: Handle<StandardMaterial>,
  pub rail: Handle<StandardMaterial>,
  pub glass: Handle<StandardMaterial>,
}

/// Shared render assets. Present only when rendering.
#[derive(Resource, Clone)]
pub struct SharedChunkAssets {
  pub meshes: UnitMeshes,
  pub materials: SharedMaterials,
  /// Template cloned into each river chunk's own material.
  pub water: WaterMaterial,
}

fn matte(color: Color, roughness: f32) -> StandardMaterial {
  StandardMaterial {
    base_color: color,
    perceptual_roughness: roughness,
    metallic: 0.0,
    ..default()
  }
}

/// Triangular prism spanning x in `[-0.5, 0.5]`, y in `[0, 1]`, z in
/// `[-0.5, 0.5]`, ridge along Z.
pub fn roof_prism() -> Mesh {
  let positions: Vec<[f32; 3]> = vec![
    [-0.5, 0.0, -0.5],
    [0.5, 0.0, -0.5],
    [0.0, 1.0, -0.5],
    [-0.5, 0.0, 0.5],
    [0.5, 0.0, 0.5],
    [0.0, 1.0, 0.5],
  ];
  let indices = vec![
    // gables
    3, 4, 5, 1, 0, 2, //
    // slopes
    0, 3, 5, 0, 5, 2, 4, 1, 2, 4, 2, 5, //
    // underside
    0, 1, 4, 0, 4, 3,
  ];

  Mesh::new(
    PrimitiveTopology::TriangleList,
    RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
  )
  .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
  .with_inserted_indices(Indices::U32(indices))
  .with_duplicated_vertices()
  .with_computed_flat_normals()
}

pub(crate) fn setup_shared_assets(
  mut commands: Commands,
  config: Res<ValleyConfig>,
  mut meshes: ResMut<Assets<Mesh>>,
  mut materials: ResMut<Assets<StandardMaterial>>,
) {
  let unit = UnitMeshes {
    cuboid: meshes.add(Cuboid::new(1.0, 1.0, 1.0)),
    cylinder: meshes.add(Cylinder::new(0.5, 1.0)),
    sphere: meshes.add(Sphere::new(1.0).mesh().uv(16, 10)),
    trunk: meshes.add(ConicalFrustum {
      radius_top: 0.10,
      radius_bottom: 0.18,
      height: 1.0,
    }),
    roof: meshes.add(roof_prism()),
    plane: meshes.add(Plane3d::default().mesh().size(1.0, 1.0)),
  };

  let shared = SharedMaterials {
    ground: materials.add(matte(Color::srgb(0.10, 0.10, 0.11), 1.0)),
    bank: materials.add(matte(Color::srgb(0.14, 0.12, 0.12), 1.0)),
    trunk: materials.add(matte(Color::srgb(0.16, 0.14, 0.12), 0.9)),
    canopy_a: materials.add(matte(Color::srgb(0.28, 0.32, 0.20), 0.8)),
    canopy_b: materials.add(matte(Color::srgb(0.22, 0.28, 0.18), 0.8)),
    shrubs: [
      materials.add(matte(Color::srgb(0.25, 0.30, 0.35), 0.9)),
      materials.add(matte(Color::srgb(0.22, 0.26, 0.30), 0.9)),
      materials.add(matte(Color::srgb(0.18, 0.22, 0.20), 0.9)),
    ],
    plank: materials.add(matte(Color::srgb(0.28, 0.24, 0.20), 0.95)),
    rail: materials.add(matte(Color::srgb(0.22, 0.20, 0.18), 0.95)),
    glass: materials.add(matte(Color::srgb(0.12, 0.14, 0.18), 0.35)),
  };

  commands.insert_resource(SharedChunkAssets {
    meshes: unit,
    materials: shared,
    water: WaterMaterial::new(&config.water),
  });
}

#[cfg(test)]
mod tests {
  use bevy::mesh::VertexAttributeValues;

  use super::*;

  #[test]
  fn roof_prism_is_flat_shaded_and_unit_sized() {
    let mesh = roof_prism();
    let Some(VertexAttributeValues::Float32x3(positions)) =
      mesh.attribute(Mesh::ATTRIBUTE_POSITION)
    else {
      panic!("missing positions");
    };
    // 8 triangles, unshared vertices.
    assert_eq!(positions.len(), 24);
    assert!(positions.iter().all(|p| p[1] >= 0.0 && p[1] <= 1.0));
    assert!(positions.iter().all(|p| p[0].abs() <= 0.5 && p[2].abs() <= 0.5));
    assert!(mesh.attribute(Mesh::ATTRIBUTE_NORMAL).is_some());
  }

  #[test]
  fn roof_slopes_face_outwards() {
    let mesh = roof_prism();
    let Some(VertexAttributeValues::Float32x3(positions)) =
      mesh.attribute(Mesh::ATTRIBUTE_POSITION)
    else {
      panic!("missing positions");
    };
    let Some(VertexAttributeValues::Float32x3(normals)) = mesh.attribute(Mesh::ATTRIBUTE_NORMAL)
    else {
      panic!("missing normals");
    };
    for (p, n) in positions.iter().zip(normals) {
      let centroid_dir = Vec3::from(*p) - Vec3::new(0.0, 0.33, 0.0);
      assert!(Vec3::from(*n).dot(centroid_dir) > 0.0, "{p:?} {n:?}");
    }
  }
}
