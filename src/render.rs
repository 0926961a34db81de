//! Draw traversal and pipeline batching.
//!
//! [`draw_records`] walks the scene graph once per pass and emits one
//! [`DrawRecord`] per primitive. The same walk serves the main camera pass and
//! every shadow pass; only the [`FrameUniforms`] differ. The graph is never
//! touched, so a backend may run passes back to back without rebuilding it.
//!
//! Records carry everything the backend needs to record a draw call: push
//! constants, the material block, texture slots, the pipeline variant and the
//! geometry ranges inside the [`GeometryStore`](crate::data_structures::geometry::GeometryStore).

use std::{collections::HashMap, ops::Range};

use cgmath::{Matrix4, Point3, Vector3};

use crate::{
    context::RenderConfig,
    data_structures::{
        camera::Camera,
        light::PointLight,
        model::{MaterialTextures, MaterialUniform, ShaderFeatures},
        scene_graph::NodeId,
    },
    projection::LightFit,
    scene::Scene,
};

/// Per-draw push constants.
///
/// Vectors are padded to `vec4` so the block matches std430 layout.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PushData {
    pub world: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub eye: [f32; 4],
    pub light_position: [f32; 4],
    pub light_energy: [f32; 4],
}

/// Camera and light state shared by every draw of one pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameUniforms {
    pub projection: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub eye: Point3<f32>,
    pub light_position: Point3<f32>,
    pub light_energy: Vector3<f32>,
}

impl FrameUniforms {
    /// Main pass: looking through `camera`.
    pub fn from_camera(camera: &Camera, aspect: Option<f32>, light: &PointLight) -> Self {
        Self {
            projection: camera.projection_matrix(aspect),
            view: camera.view,
            eye: camera.eye,
            light_position: light.location,
            light_energy: light.energy(),
        }
    }

    /// Shadow pass: looking through the fitted light camera.
    pub fn from_light_fit(fit: &LightFit, light: &PointLight) -> Self {
        Self {
            projection: fit.light_projection,
            view: fit.light_view,
            eye: light.location,
            light_position: light.location,
            light_energy: light.energy(),
        }
    }

    pub fn push_data(&self, world: &Matrix4<f32>) -> PushData {
        PushData {
            world: (*world).into(),
            projection: self.projection.into(),
            view: self.view.into(),
            eye: self.eye.to_homogeneous().into(),
            light_position: self.light_position.to_homogeneous().into(),
            light_energy: self.light_energy.extend(0.0).into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawRecord {
    pub node: NodeId,
    pub mesh: usize,
    /// Index of the primitive inside its mesh.
    pub primitive: usize,
    pub push: PushData,
    pub uniform: MaterialUniform,
    pub textures: MaterialTextures,
    /// Pipeline variant: the primitive's features restricted to the enabled ones.
    pub pipeline: ShaderFeatures,
    pub vertex_range: Range<u32>,
    pub index_range: Range<u32>,
    /// Which of the per-swapchain-image resource copies this frame binds.
    pub uniform_set: usize,
}

/// Pre-order walk over the scene graph.
///
/// World matrices are accumulated from the nodes' local transforms along the
/// walk, starting from the graph's upper transform. A node's records precede
/// those of its children.
pub fn draw_records(
    scene: &Scene,
    uniforms: &FrameUniforms,
    config: &RenderConfig,
    frame: usize,
) -> Vec<DrawRecord> {
    let uniform_set = frame % config.swapchain_images.max(1);
    let mut records = Vec::with_capacity(scene.geometry.draw_groups.len());
    let mut stack: Vec<(NodeId, Matrix4<f32>)> = scene
        .graph
        .roots()
        .iter()
        .rev()
        .map(|&root| (root, *scene.graph.upper()))
        .collect();

    while let Some((id, parent_world)) = stack.pop() {
        let Some(node) = scene.graph.node(id) else {
            continue;
        };
        let world = parent_world * node.local;
        if let Some((mesh_index, mesh)) = node.mesh.and_then(|m| Some((m, scene.meshes.get(m)?))) {
            let push = uniforms.push_data(&world);
            records.extend(mesh.primitives.iter().enumerate().map(|(i, primitive)| DrawRecord {
                node: id,
                mesh: mesh_index,
                primitive: i,
                push,
                uniform: primitive.uniform,
                textures: primitive.textures,
                pipeline: primitive.features & config.features,
                vertex_range: primitive.vertex_range.clone(),
                index_range: primitive.index_range.clone(),
                uniform_set,
            }));
        }
        // reversed so the first child is popped first
        stack.extend(node.children.iter().rev().map(|&child| (child, world)));
    }
    records
}

/// Records sharing one pipeline variant, in submission order.
#[derive(Debug)]
pub struct Batch<'t, 'r, P> {
    pub features: ShaderFeatures,
    /// `None` when no pipeline was registered for the variant.
    pub pipeline: Option<&'t P>,
    pub records: Vec<&'r DrawRecord>,
}

/// Compiled pipeline variants keyed by the features they were built for.
#[derive(Debug)]
pub struct PipelineTable<P> {
    variants: HashMap<ShaderFeatures, P>,
}

impl<P> Default for PipelineTable<P> {
    fn default() -> Self {
        Self {
            variants: HashMap::new(),
        }
    }
}

impl<P> PipelineTable<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a variant, returning the one it replaces.
    pub fn insert(&mut self, features: ShaderFeatures, pipeline: P) -> Option<P> {
        self.variants.insert(features, pipeline)
    }

    pub fn get(&self, features: ShaderFeatures) -> Option<&P> {
        self.variants.get(&features)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Groups records by pipeline variant so every pipeline is bound once.
    ///
    /// Batches appear in the order their variant is first seen; records keep
    /// their traversal order inside a batch.
    pub fn batch<'t, 'r>(&'t self, records: &'r [DrawRecord]) -> Vec<Batch<'t, 'r, P>> {
        let mut batches: Vec<Batch<'t, 'r, P>> = Vec::new();
        let mut slots: HashMap<ShaderFeatures, usize> = HashMap::new();
        for record in records {
            let slot = *slots.entry(record.pipeline).or_insert_with(|| {
                batches.push(Batch {
                    features: record.pipeline,
                    pipeline: self.get(record.pipeline),
                    records: Vec::new(),
                });
                batches.len() - 1
            });
            batches[slot].records.push(record);
        }
        batches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data_structures::{
            model::Vertex,
            transform::{NodeTransform, Transform},
        },
        resources::document::{
            DocMaterial, DocMesh, DocNode, DocPrimitive, DocTexture, DocTextureInfo, SceneDocument,
        },
    };
    use approx::assert_relative_eq;
    use cgmath::{Deg, SquareMatrix};

    fn triangle() -> Vec<Vertex> {
        [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
            .into_iter()
            .map(|position| Vertex {
                position,
                ..Default::default()
            })
            .collect()
    }

    fn node(translation: [f32; 3], mesh: Option<usize>, children: Vec<usize>) -> DocNode {
        DocNode {
            transform: NodeTransform::Decomposed(Transform::from(Vector3::from(translation))),
            mesh,
            children,
            ..Default::default()
        }
    }

    /// root (mesh 0) -> [a (mesh 1) -> [b (mesh 0)], c (no mesh)]
    fn scene() -> Scene {
        let textured = DocPrimitive {
            material: Some(0),
            ..DocPrimitive::triangles(triangle(), vec![0, 1, 2])
        };
        let document = SceneDocument {
            nodes: vec![
                node([1.0, 0.0, 0.0], Some(0), vec![1, 3]),
                node([0.0, 2.0, 0.0], Some(1), vec![2]),
                node([0.0, 0.0, 3.0], Some(0), vec![]),
                node([5.0, 5.0, 5.0], None, vec![]),
            ],
            roots: vec![0],
            meshes: vec![
                DocMesh {
                    name: Some("plain".into()),
                    primitives: vec![DocPrimitive::triangles(triangle(), vec![0, 1, 2])],
                },
                DocMesh {
                    name: Some("textured".into()),
                    primitives: vec![
                        textured,
                        DocPrimitive::triangles(triangle(), vec![2, 1, 0]),
                    ],
                },
            ],
            materials: vec![DocMaterial {
                base_color_texture: Some(DocTextureInfo {
                    texture: 0,
                    tex_coord: 0,
                }),
                normal_texture: Some(DocTextureInfo {
                    texture: 0,
                    tex_coord: 0,
                }),
                ..Default::default()
            }],
            textures: vec![DocTexture { sampler: None }],
            ..Default::default()
        };
        Scene::from_document(&document).unwrap()
    }

    fn uniforms() -> FrameUniforms {
        FrameUniforms::from_camera(&Camera::default_camera(), None, &PointLight::default())
    }

    #[test]
    fn records_follow_pre_order_with_accumulated_worlds() {
        let scene = scene();
        let records = draw_records(&scene, &uniforms(), &RenderConfig::default(), 0);
        let order: Vec<_> = records.iter().map(|r| (r.mesh, r.primitive)).collect();
        assert_eq!(order, vec![(0, 0), (1, 0), (1, 1), (0, 0)]);

        let translation = |r: &DrawRecord| {
            let [x, y, z, _] = r.push.world[3];
            Vector3::new(x, y, z)
        };
        assert_relative_eq!(translation(&records[0]), Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(translation(&records[1]), Vector3::new(1.0, 2.0, 0.0));
        assert_relative_eq!(translation(&records[3]), Vector3::new(1.0, 2.0, 3.0));
        for record in &records {
            let world = Matrix4::from(record.push.world);
            assert_relative_eq!(world, scene.graph.node(record.node).unwrap().world);
        }
    }

    #[test]
    fn push_data_carries_camera_and_light() {
        let scene = scene();
        let light = PointLight::new(Vector3::new(1.0, 0.5, 0.25), 4.0, Point3::new(0.0, 8.0, 0.0));
        let camera = Camera::default_camera();
        let frame = FrameUniforms::from_camera(&camera, Some(1.0), &light);
        let records = draw_records(&scene, &frame, &RenderConfig::default(), 0);
        let push = records[0].push;
        assert_eq!(push.eye, [0.0, 0.0, 10.0, 1.0]);
        assert_eq!(push.light_position, [0.0, 8.0, 0.0, 1.0]);
        assert_eq!(push.light_energy, [4.0, 2.0, 1.0, 0.0]);
        let projection: [[f32; 4]; 4] = camera.projection_matrix(Some(1.0)).into();
        let view: [[f32; 4]; 4] = camera.view.into();
        assert_eq!(push.projection, projection);
        assert_eq!(push.view, view);
    }

    #[test]
    fn shadow_pass_uses_light_matrices_without_touching_the_graph() {
        let scene = scene();
        let before = scene.graph.clone();
        let light = PointLight::new(Vector3::new(1.0, 1.0, 1.0), 1.0, Point3::new(4.0, 10.0, 2.0));
        let bounds = scene.bounds().unwrap();
        let fit = crate::projection::get_aabb_light_matrix(bounds.min, bounds.max, light.location);
        let shadow = draw_records(
            &scene,
            &FrameUniforms::from_light_fit(&fit, &light),
            &RenderConfig::default(),
            0,
        );
        let main = draw_records(&scene, &uniforms(), &RenderConfig::default(), 0);
        assert_eq!(shadow.len(), main.len());
        let light_view: [[f32; 4]; 4] = fit.light_view.into();
        let light_projection: [[f32; 4]; 4] = fit.light_projection.into();
        assert_eq!(shadow[0].push.view, light_view);
        assert_eq!(shadow[0].push.projection, light_projection);
        assert_eq!(shadow[0].push.world, main[0].push.world);
        assert_eq!(scene.graph.nodes(), before.nodes());
    }

    #[test]
    fn pipeline_key_is_masked_by_enabled_features() {
        let scene = scene();
        let all = draw_records(&scene, &uniforms(), &RenderConfig::default(), 0);
        assert_eq!(
            all[1].pipeline,
            ShaderFeatures::BASE_COLOR_MAP | ShaderFeatures::NORMAL_MAP
        );
        let config = RenderConfig {
            features: ShaderFeatures::BASE_COLOR_MAP,
            ..Default::default()
        };
        let masked = draw_records(&scene, &uniforms(), &config, 0);
        assert_eq!(masked[1].pipeline, ShaderFeatures::BASE_COLOR_MAP);
        assert_eq!(masked[0].pipeline, ShaderFeatures::empty());
    }

    #[test]
    fn uniform_set_cycles_through_swapchain_images() {
        let scene = scene();
        let config = RenderConfig {
            swapchain_images: 3,
            ..Default::default()
        };
        let sets: Vec<_> = (0..7)
            .map(|frame| draw_records(&scene, &uniforms(), &config, frame)[0].uniform_set)
            .collect();
        assert_eq!(sets, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn batches_group_records_by_variant() {
        let scene = scene();
        let records = draw_records(&scene, &uniforms(), &RenderConfig::default(), 0);
        let mut table = PipelineTable::new();
        table.insert(ShaderFeatures::empty(), "plain");
        let batches = table.batch(&records);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].features, ShaderFeatures::empty());
        assert_eq!(batches[0].pipeline, Some(&"plain"));
        assert_eq!(batches[0].records.len(), 3);
        assert_eq!(batches[1].pipeline, None);
        assert_eq!(batches[1].records.len(), 1);
    }

    #[test]
    fn light_fit_uniforms_use_fit_matrices() {
        let fit = LightFit {
            light_view: Matrix4::from_translation(Vector3::new(0.0, 0.0, -3.0)),
            light_projection: cgmath::perspective(Deg(90.0), 1.0, 0.1, 10.0),
            near: 0.1,
            far: 10.0,
            extra: 0.0,
        };
        let frame = FrameUniforms::from_light_fit(&fit, &PointLight::default());
        assert_eq!(frame.view, fit.light_view);
        assert_eq!(frame.projection, fit.light_projection);
        assert_ne!(frame.view, Matrix4::identity());
    }
}
