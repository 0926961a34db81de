//! Format-neutral view of a parsed scene document.
//!
//! The glTF and OBJ importers both lower their input into a [`SceneDocument`]:
//! plain index-linked tables with vertex data already decoded. Nothing here is
//! validated yet; [`crate::scene::Scene::from_document`] rejects dangling
//! indices and non-triangle geometry.

use cgmath::Vector3;

use crate::data_structures::{
    camera::Projection,
    model::{MaterialUniform, Vertex},
    transform::NodeTransform,
};

#[derive(Clone, Debug, Default)]
pub struct SceneDocument {
    pub nodes: Vec<DocNode>,
    /// Nodes the scene starts from. An empty list means the document has no root.
    pub roots: Vec<usize>,
    pub meshes: Vec<DocMesh>,
    pub materials: Vec<DocMaterial>,
    pub textures: Vec<DocTexture>,
    pub sampler_count: usize,
    pub cameras: Vec<DocCamera>,
    pub lights: Vec<DocLight>,
}

#[derive(Clone, Debug, Default)]
pub struct DocNode {
    pub name: Option<String>,
    pub transform: NodeTransform,
    pub children: Vec<usize>,
    pub mesh: Option<usize>,
    pub camera: Option<usize>,
    pub light: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct DocMesh {
    pub name: Option<String>,
    pub primitives: Vec<DocPrimitive>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    /// Polygon faces of the given vertex count.
    Polygons(u32),
    /// Points, lines, strips and fans.
    Other(String),
}

#[derive(Clone, Debug)]
pub struct DocPrimitive {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub topology: Topology,
    pub material: Option<usize>,
    pub has_tangents: bool,
    pub has_joints: bool,
}

impl DocPrimitive {
    pub fn triangles(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            topology: Topology::Triangles,
            material: None,
            has_tangents: false,
            has_joints: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DocTextureInfo {
    pub texture: usize,
    pub tex_coord: u32,
}

#[derive(Clone, Debug, Default)]
pub struct DocMaterial {
    pub name: Option<String>,
    pub uniform: MaterialUniform,
    pub base_color_texture: Option<DocTextureInfo>,
    pub metallic_roughness_texture: Option<DocTextureInfo>,
    pub normal_texture: Option<DocTextureInfo>,
    pub occlusion_texture: Option<DocTextureInfo>,
    pub emissive_texture: Option<DocTextureInfo>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DocTexture {
    pub sampler: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct DocCamera {
    pub name: Option<String>,
    pub projection: Projection,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    Point,
    Directional,
    Spot,
}

#[derive(Clone, Debug)]
pub struct DocLight {
    pub name: Option<String>,
    pub kind: LightKind,
    pub color: Vector3<f32>,
    pub intensity: f32,
}
