//! Animated river surface material.

use bevy::prelude::*;
use bevy::render::render_resource::{AsBindGroup, ShaderType};
use bevy::shader::ShaderRef;

use crate::config::WaterParams;

/// Uniform block read by `water.wgsl`.
///
/// Wave parameters are packed into one vector: amplitude, frequency, speed,
/// roughness.
#[derive(Clone, Copy, Debug, Default, PartialEq, ShaderType)]
pub struct WaterUniforms {
  pub shallow_color: Vec4,
  pub deep_color: Vec4,
  pub wave: Vec4,
  pub fresnel_power: f32,
}

impl From<&WaterParams> for WaterUniforms {
  fn from(params: &WaterParams) -> Self {
    let [sr, sg, sb] = params.shallow_color;
    let [dr, dg, db] = params.deep_color;
    Self {
      shallow_color: Vec4::new(sr, sg, sb, 0.82),
      deep_color: Vec4::new(dr, dg, db, 0.95),
      wave: Vec4::new(
        params.amplitude,
        params.frequency,
        params.speed,
        params.roughness,
      ),
      fresnel_power: params.fresnel_power,
    }
  }
}

/// Fresnel-blended water with procedural wave normals. Time comes from the
/// view globals.
#[derive(Asset, TypePath, AsBindGroup, Clone, Debug)]
pub struct WaterMaterial {
  #[uniform(0)]
  pub uniforms: WaterUniforms,
}

impl WaterMaterial {
  pub fn new(params: &WaterParams) -> Self {
    Self {
      uniforms: params.into(),
    }
  }
}

impl Material for WaterMaterial {
  fn fragment_shader() -> ShaderRef {
    "embedded://bevy_valley_world/render/shaders/water.wgsl".into()
  }

  fn alpha_mode(&self) -> AlphaMode {
    AlphaMode::Blend
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn uniforms_pack_wave_params() {
    let params = WaterParams::default();
    let uniforms = WaterUniforms::from(&params);
    assert_eq!(uniforms.wave.x, params.amplitude);
    assert_eq!(uniforms.wave.w, params.roughness);
    assert_eq!(uniforms.shallow_color.truncate(), Vec3::from(params.shallow_color));
    assert_eq!(uniforms.fresnel_power, params.fresnel_power);
  }
}
