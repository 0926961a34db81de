//! A fully resolved, read-only scene.
//!
//! [`Scene::from_document`] is the single place where a [`SceneDocument`] is
//! checked and turned into renderable data: the geometry store, the meshes
//! with their primitives and material blocks, the scene graph, the cameras and
//! the point lights. It either succeeds completely or returns an error.

use cgmath::{Matrix4, Point3, SquareMatrix};
use log::{debug, warn};

use crate::{
    data_structures::{
        aabb::Aabb,
        camera::Camera,
        geometry::GeometryStore,
        light::PointLight,
        model::{Material, MaterialTextures, Mesh, Primitive, ShaderFeatures, TextureRef},
        scene_graph::SceneGraph,
    },
    error::SceneError,
    resources::document::{
        DocMaterial, DocPrimitive, DocTextureInfo, LightKind, SceneDocument, Topology,
    },
};

#[derive(Clone, Debug)]
pub struct Scene {
    pub geometry: GeometryStore,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub graph: SceneGraph,
    /// Never empty: a default camera is synthesised for documents without one.
    pub cameras: Vec<Camera>,
    pub lights: Vec<PointLight>,
}

impl Scene {
    pub fn from_document(document: &SceneDocument) -> Result<Self, SceneError> {
        Self::from_document_with_upper(document, Matrix4::identity())
    }

    pub fn from_document_with_upper(
        document: &SceneDocument,
        upper: Matrix4<f32>,
    ) -> Result<Self, SceneError> {
        let materials = document
            .materials
            .iter()
            .enumerate()
            .map(|(i, m)| resolve_material(document, i, m))
            .collect::<Result<Vec<_>, _>>()?;

        let mut geometry = GeometryStore::default();
        let mut meshes = Vec::with_capacity(document.meshes.len());
        for (mesh_index, doc_mesh) in document.meshes.iter().enumerate() {
            let mut primitives = Vec::with_capacity(doc_mesh.primitives.len());
            for (prim_index, doc_prim) in doc_mesh.primitives.iter().enumerate() {
                let primitive = append_primitive(&mut geometry, &materials, doc_prim)
                    .map_err(|err| match err {
                        SceneError::LoadFailed { reason } => SceneError::load(format!(
                            "mesh {mesh_index} primitive {prim_index}: {reason}"
                        )),
                        SceneError::InvalidDocument { reason } => SceneError::invalid(format!(
                            "mesh {mesh_index} primitive {prim_index}: {reason}"
                        )),
                        other => other,
                    })?;
                primitives.push(primitive);
            }
            let name = doc_mesh
                .name
                .clone()
                .unwrap_or_else(|| format!("mesh_{mesh_index}"));
            meshes.push(Mesh::new(name, primitives));
        }

        let graph = SceneGraph::build_with_upper(document, &meshes, upper)?;
        geometry.flatten(&graph, &meshes);
        geometry.validate()?;

        let cameras = resolve_cameras(document, &graph);
        let lights = resolve_lights(document, &graph);

        debug!(
            "scene loaded: {} vertices, {} draw groups, {} meshes, {} cameras, {} lights",
            geometry.vertices.len(),
            geometry.draw_groups.len(),
            meshes.len(),
            cameras.len(),
            lights.len()
        );

        Ok(Self {
            geometry,
            meshes,
            materials,
            graph,
            cameras,
            lights,
        })
    }

    /// World-space bounds of everything drawable.
    pub fn bounds(&self) -> Option<Aabb> {
        self.graph.bounds()
    }
}

fn resolve_texture(
    document: &SceneDocument,
    info: Option<DocTextureInfo>,
) -> Result<Option<TextureRef>, SceneError> {
    let Some(info) = info else {
        return Ok(None);
    };
    let texture = SceneError::check_index("texture", info.texture, document.textures.len())?;
    let sampler = document.textures[texture]
        .sampler
        .map(|s| SceneError::check_index("sampler", s, document.sampler_count))
        .transpose()?;
    Ok(Some(TextureRef {
        texture,
        sampler,
        tex_coord: info.tex_coord,
    }))
}

fn resolve_material(
    document: &SceneDocument,
    index: usize,
    material: &DocMaterial,
) -> Result<Material, SceneError> {
    let textures = MaterialTextures {
        base_color: resolve_texture(document, material.base_color_texture)?,
        metallic_roughness: resolve_texture(document, material.metallic_roughness_texture)?,
        normal: resolve_texture(document, material.normal_texture)?,
        occlusion: resolve_texture(document, material.occlusion_texture)?,
        emissive: resolve_texture(document, material.emissive_texture)?,
    };
    Ok(Material {
        name: material
            .name
            .clone()
            .unwrap_or_else(|| format!("material_{index}")),
        uniform: material.uniform,
        textures,
    })
}

fn append_primitive(
    geometry: &mut GeometryStore,
    materials: &[Material],
    primitive: &DocPrimitive,
) -> Result<Primitive, SceneError> {
    match &primitive.topology {
        Topology::Triangles => {}
        Topology::Polygons(arity) => {
            return Err(SceneError::load(format!(
                "faces must be triangles, found a face with {arity} vertices"
            )));
        }
        Topology::Other(mode) => {
            return Err(SceneError::load(format!(
                "faces must be triangles, found {mode} topology"
            )));
        }
    }
    if primitive.indices.len() % 3 != 0 {
        return Err(SceneError::load(format!(
            "index count {} is not a multiple of 3",
            primitive.indices.len()
        )));
    }
    if let Some(&bad) = primitive
        .indices
        .iter()
        .find(|&&i| i as usize >= primitive.vertices.len())
    {
        return Err(SceneError::invalid(format!(
            "vertex index {bad} out of range (len {})",
            primitive.vertices.len()
        )));
    }
    let material = primitive
        .material
        .map(|m| SceneError::check_index("material", m, materials.len()))
        .transpose()?;

    let vertex_begin = geometry.vertices.len() as u32;
    let index_begin = geometry.indices.len() as u32;
    geometry.vertices.extend_from_slice(&primitive.vertices);
    geometry
        .indices
        .extend(primitive.indices.iter().map(|i| i + vertex_begin));

    let (uniform, textures) = match material {
        Some(m) => (materials[m].uniform, materials[m].textures),
        None => Default::default(),
    };
    let mut features = textures.features();
    features.set(ShaderFeatures::TANGENTS, primitive.has_tangents);
    features.set(ShaderFeatures::SKINNING, primitive.has_joints);

    let bounds = Aabb::from_points(primitive.vertices.iter().map(|v| Point3::from(v.position)));

    Ok(Primitive {
        vertex_range: vertex_begin..geometry.vertices.len() as u32,
        index_range: index_begin..geometry.indices.len() as u32,
        material,
        features,
        uniform,
        textures,
        bounds,
    })
}

/// Cameras attached to nodes, in graph order.
///
/// A node binds a camera either through its camera reference or, for importers
/// that keep cameras in a separate named list, by sharing the camera's name.
fn resolve_cameras(document: &SceneDocument, graph: &SceneGraph) -> Vec<Camera> {
    let mut cameras = Vec::new();
    for node in graph.nodes() {
        let bound = node.camera.or_else(|| {
            let name = node.name.as_deref()?;
            document
                .cameras
                .iter()
                .position(|c| c.name.as_deref() == Some(name))
        });
        let Some(index) = bound else {
            continue;
        };
        let doc_camera = &document.cameras[index];
        match Camera::from_world(doc_camera.name.clone(), doc_camera.projection, &node.world) {
            Some(camera) => cameras.push(camera),
            None => warn!(
                "camera {:?} sits on a node with a singular transform, skipped",
                doc_camera.name
            ),
        }
    }
    if cameras.is_empty() {
        warn!("document declares no usable camera, using the default camera");
        cameras.push(Camera::default_camera());
    }
    cameras
}

/// Point lights placed at the world translation of the node that carries them.
fn resolve_lights(document: &SceneDocument, graph: &SceneGraph) -> Vec<PointLight> {
    let mut placed = vec![false; document.lights.len()];
    let mut lights = Vec::new();
    let push = |index: usize, location: Point3<f32>, lights: &mut Vec<PointLight>| {
        let light = &document.lights[index];
        if light.kind != LightKind::Point {
            warn!(
                "light {:?} is {:?}, only point lights are supported",
                light.name, light.kind
            );
            return;
        }
        lights.push(PointLight {
            name: light.name.clone(),
            color: light.color,
            intensity: light.intensity,
            location,
        });
    };
    for node in graph.nodes() {
        if let Some(index) = node.light {
            placed[index] = true;
            push(index, node.world_translation(), &mut lights);
        }
    }
    for (index, _) in placed.iter().enumerate().filter(|(_, p)| !**p) {
        warn!("light {index} is not attached to a node, placing it at the origin");
        push(index, Point3::new(0.0, 0.0, 0.0), &mut lights);
    }
    lights
}
