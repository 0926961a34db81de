//! glTF 2.0 import into a [`SceneDocument`].
//!
//! Buffers come from the GLB binary chunk, from base64 `data:` URIs or through
//! the [`ResourceResolver`]. Images are not decoded here; materials only keep
//! texture and sampler indices for the resource layer.

use cgmath::{Rad, Vector3};
use gltf::{Buffer, mesh::Reader};
use log::debug;

use crate::{
    data_structures::{
        camera::Projection,
        model::{MaterialUniform, Vertex},
        transform::NodeTransform,
    },
    error::SceneError,
    resources::{
        document::{
            DocCamera, DocLight, DocMaterial, DocMesh, DocNode, DocPrimitive, DocTexture,
            DocTextureInfo, LightKind, SceneDocument, Topology,
        },
        resolver::{ResourceResolver, decode_data_uri},
    },
};

/// Parses a `.gltf` or `.glb` file and decodes all of its geometry.
pub fn load_gltf_document(
    bytes: &[u8],
    resolver: &dyn ResourceResolver,
) -> Result<SceneDocument, SceneError> {
    let gltf = gltf::Gltf::from_slice(bytes)?;
    let buffers = load_buffers(&gltf, resolver)?;

    let meshes = gltf
        .meshes()
        .map(|mesh| read_mesh(&mesh, &buffers))
        .collect::<Result<Vec<_>, _>>()?;
    let materials = gltf.materials().map(|m| read_material(&m)).collect();
    let textures = gltf
        .textures()
        .map(|t| DocTexture {
            sampler: t.sampler().index(),
        })
        .collect();
    let cameras = gltf.cameras().map(|c| read_camera(&c)).collect();
    let lights = gltf
        .lights()
        .map(|lights| lights.map(|l| read_light(&l)).collect())
        .unwrap_or_default();
    let nodes = gltf.nodes().map(|n| read_node(&n)).collect();

    let document = SceneDocument {
        nodes,
        roots: roots(&gltf),
        meshes,
        materials,
        textures,
        sampler_count: gltf.samplers().count(),
        cameras,
        lights,
    };
    debug!(
        "glTF document: {} nodes, {} meshes, {} materials, {} cameras, {} lights",
        document.nodes.len(),
        document.meshes.len(),
        document.materials.len(),
        document.cameras.len(),
        document.lights.len()
    );
    Ok(document)
}

fn load_buffers(
    gltf: &gltf::Gltf,
    resolver: &dyn ResourceResolver,
) -> Result<Vec<Vec<u8>>, SceneError> {
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => gltf
                .blob
                .as_deref()
                .map(<[u8]>::to_vec)
                .ok_or_else(|| SceneError::load("GLB binary chunk is missing"))?,
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                decode_data_uri(uri).map_err(|err| SceneError::load(format!("{err:#}")))?
            }
            gltf::buffer::Source::Uri(uri) => resolver.resolve(uri)?,
        };
        if data.len() < buffer.length() {
            return Err(SceneError::load(format!(
                "buffer {} holds {} bytes, {} declared",
                buffer.index(),
                data.len(),
                buffer.length()
            )));
        }
        buffer_data.push(data);
    }
    Ok(buffer_data)
}

/// Default scene, else the first scene, else every node without a parent.
fn roots(gltf: &gltf::Gltf) -> Vec<usize> {
    if let Some(scene) = gltf.default_scene().or_else(|| gltf.scenes().next()) {
        return scene.nodes().map(|n| n.index()).collect();
    }
    let mut has_parent = vec![false; gltf.nodes().count()];
    for node in gltf.nodes() {
        for child in node.children() {
            has_parent[child.index()] = true;
        }
    }
    (0..has_parent.len()).filter(|&i| !has_parent[i]).collect()
}

fn read_node(node: &gltf::Node) -> DocNode {
    DocNode {
        name: node.name().map(str::to_string),
        transform: NodeTransform::from(node.transform()),
        children: node.children().map(|c| c.index()).collect(),
        mesh: node.mesh().map(|m| m.index()),
        camera: node.camera().map(|c| c.index()),
        light: node.light().map(|l| l.index()),
    }
}

fn read_mesh(mesh: &gltf::Mesh, buffers: &[Vec<u8>]) -> Result<DocMesh, SceneError> {
    let primitives = mesh
        .primitives()
        .map(|primitive| {
            read_primitive(&primitive, buffers).map_err(|err| match err {
                SceneError::LoadFailed { reason } => SceneError::load(format!(
                    "mesh {} primitive {}: {reason}",
                    mesh.index(),
                    primitive.index()
                )),
                other => other,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DocMesh {
        name: mesh.name().map(str::to_string),
        primitives,
    })
}

fn read_primitive(
    primitive: &gltf::Primitive,
    buffers: &[Vec<u8>],
) -> Result<DocPrimitive, SceneError> {
    let get_buffer_data = |buffer: Buffer<'_>| buffers.get(buffer.index()).map(Vec::as_slice);
    let reader = primitive.reader(get_buffer_data);

    let positions = extract_positions(&reader)?;
    let normals = reader.read_normals().map(|iter| iter.collect::<Vec<_>>());
    let tangents = reader.read_tangents().map(|iter| iter.collect::<Vec<_>>());
    let tex_coords = reader
        .read_tex_coords(0)
        .map(|iter| iter.into_f32().collect::<Vec<_>>());

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, &position)| Vertex {
            position,
            normal: normals
                .as_ref()
                .and_then(|n| n.get(i).copied())
                .unwrap_or_default(),
            tangent: tangents
                .as_ref()
                .and_then(|t| t.get(i))
                .map(|&[x, y, z, _]| [x, y, z])
                .unwrap_or_default(),
            tex_coords: tex_coords
                .as_ref()
                .and_then(|t| t.get(i).copied())
                .unwrap_or_default(),
        })
        .collect::<Vec<_>>();

    let indices = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };

    Ok(DocPrimitive {
        vertices,
        indices,
        topology: topology(primitive.mode()),
        material: primitive.material().index(),
        has_tangents: tangents.is_some(),
        has_joints: reader.read_joints(0).is_some(),
    })
}

fn extract_positions<'a, 's, F>(reader: &Reader<'a, 's, F>) -> Result<Vec<[f32; 3]>, SceneError>
where
    F: Clone + Fn(Buffer<'a>) -> Option<&'s [u8]>,
{
    reader
        .read_positions()
        .map(|iter| iter.collect())
        .ok_or_else(|| SceneError::load("vertex positions attribute not found"))
}

fn topology(mode: gltf::mesh::Mode) -> Topology {
    match mode {
        gltf::mesh::Mode::Triangles => Topology::Triangles,
        other => Topology::Other(format!("{other:?}")),
    }
}

fn texture_info(info: Option<gltf::texture::Info>) -> Option<DocTextureInfo> {
    info.map(|info| DocTextureInfo {
        texture: info.texture().index(),
        tex_coord: info.tex_coord(),
    })
}

fn read_material(material: &gltf::Material) -> DocMaterial {
    let pbr = material.pbr_metallic_roughness();
    let normal = material.normal_texture();
    let occlusion = material.occlusion_texture();
    DocMaterial {
        name: material.name().map(str::to_string),
        uniform: MaterialUniform {
            base_color: pbr.base_color_factor(),
            emissive: material.emissive_factor(),
            roughness: pbr.roughness_factor(),
            metalness: pbr.metallic_factor(),
            normal_scale: normal.as_ref().map_or(1.0, |n| n.scale()),
            occlusion_strength: occlusion.as_ref().map_or(1.0, |o| o.strength()),
            ..Default::default()
        },
        base_color_texture: texture_info(pbr.base_color_texture()),
        metallic_roughness_texture: texture_info(pbr.metallic_roughness_texture()),
        normal_texture: normal.map(|n| DocTextureInfo {
            texture: n.texture().index(),
            tex_coord: n.tex_coord(),
        }),
        occlusion_texture: occlusion.map(|o| DocTextureInfo {
            texture: o.texture().index(),
            tex_coord: o.tex_coord(),
        }),
        emissive_texture: texture_info(material.emissive_texture()),
    }
}

fn read_camera(camera: &gltf::Camera) -> DocCamera {
    let projection = match camera.projection() {
        gltf::camera::Projection::Perspective(p) => Projection::Perspective {
            // glTF stores radians
            yfov: Rad(p.yfov()),
            aspect: p.aspect_ratio(),
            znear: p.znear(),
            zfar: p.zfar(),
        },
        gltf::camera::Projection::Orthographic(o) => Projection::Orthographic {
            xmag: o.xmag(),
            ymag: o.ymag(),
            znear: o.znear(),
            zfar: o.zfar(),
        },
    };
    DocCamera {
        name: camera.name().map(str::to_string),
        projection,
    }
}

fn read_light(light: &gltf::khr_lights_punctual::Light) -> DocLight {
    let kind = match light.kind() {
        gltf::khr_lights_punctual::Kind::Point => LightKind::Point,
        gltf::khr_lights_punctual::Kind::Directional => LightKind::Directional,
        gltf::khr_lights_punctual::Kind::Spot { .. } => LightKind::Spot,
    };
    DocLight {
        name: light.name().map(str::to_string),
        kind,
        color: Vector3::from(light.color()),
        intensity: light.intensity(),
    }
}
