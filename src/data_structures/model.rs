//! Meshes, primitives and the material data attached to them.

use std::ops::Range;

use bitflags::bitflags;

use crate::data_structures::aabb::Aabb;

/// A single vertex as stored in the geometry store and uploaded to the GPU.
///
/// Attributes missing from the source document stay zeroed.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub tex_coords: [f32; 2],
}

bitflags! {
    /// Material channels a pipeline variant was compiled for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShaderFeatures: u32 {
        const BASE_COLOR_MAP = 1 << 0;
        const METALLIC_ROUGHNESS_MAP = 1 << 1;
        const NORMAL_MAP = 1 << 2;
        const OCCLUSION_MAP = 1 << 3;
        const EMISSIVE_MAP = 1 << 4;
        const TANGENTS = 1 << 5;
        const SKINNING = 1 << 6;
    }
}

/// Per-primitive uniform block.
///
/// Padded to 16 byte rows so it can be bound as a uniform buffer as-is.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    pub emissive: [f32; 3],
    pub roughness: f32,
    pub metalness: f32,
    pub normal_scale: f32,
    pub occlusion_strength: f32,
    pub _padding: f32,
}

impl Default for MaterialUniform {
    fn default() -> Self {
        // glTF defaults for an unspecified material
        Self {
            base_color: [1.0; 4],
            emissive: [0.0; 3],
            roughness: 1.0,
            metalness: 1.0,
            normal_scale: 1.0,
            occlusion_strength: 1.0,
            _padding: 0.0,
        }
    }
}

/// Index into the texture table kept by the resource layer, plus its sampler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureRef {
    pub texture: usize,
    pub sampler: Option<usize>,
    pub tex_coord: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaterialTextures {
    pub base_color: Option<TextureRef>,
    pub metallic_roughness: Option<TextureRef>,
    pub normal: Option<TextureRef>,
    pub occlusion: Option<TextureRef>,
    pub emissive: Option<TextureRef>,
}

impl MaterialTextures {
    /// The map channels that are bound.
    pub fn features(&self) -> ShaderFeatures {
        let mut features = ShaderFeatures::empty();
        features.set(ShaderFeatures::BASE_COLOR_MAP, self.base_color.is_some());
        features.set(
            ShaderFeatures::METALLIC_ROUGHNESS_MAP,
            self.metallic_roughness.is_some(),
        );
        features.set(ShaderFeatures::NORMAL_MAP, self.normal.is_some());
        features.set(ShaderFeatures::OCCLUSION_MAP, self.occlusion.is_some());
        features.set(ShaderFeatures::EMISSIVE_MAP, self.emissive.is_some());
        features
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
    pub name: String,
    pub uniform: MaterialUniform,
    pub textures: MaterialTextures,
}

/// A drawable unit: a range of the geometry store plus everything needed to bind it.
#[derive(Clone, Debug, PartialEq)]
pub struct Primitive {
    pub vertex_range: Range<u32>,
    pub index_range: Range<u32>,
    pub material: Option<usize>,
    pub features: ShaderFeatures,
    pub uniform: MaterialUniform,
    pub textures: MaterialTextures,
    pub bounds: Option<Aabb>,
}

impl Primitive {
    pub fn draw_count(&self) -> u32 {
        self.index_range.end - self.index_range.start
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub primitives: Vec<Primitive>,
    /// Union of the primitive bounds in mesh-local space.
    pub bounds: Option<Aabb>,
}

impl Mesh {
    pub fn new(name: String, primitives: Vec<Primitive>) -> Self {
        let bounds = primitives
            .iter()
            .fold(None, |acc, p| Aabb::merge(acc, p.bounds));
        Self {
            name,
            primitives,
            bounds,
        }
    }
}
