//! Wavefront OBJ import.
//!
//! An OBJ file becomes a single root node with an identity transform owning one
//! mesh; every OBJ object or group turns into one primitive of that mesh. Faces
//! are read as written and anything that is not a triangle fails the load.

use std::{
    collections::HashMap,
    io::{BufRead, BufReader, Cursor},
    path::Path,
};

use log::{debug, warn};

use crate::{
    data_structures::{model::MaterialUniform, transform::NodeTransform},
    error::SceneError,
    resources::{
        document::{DocMaterial, DocMesh, DocNode, DocTexture, DocTextureInfo, SceneDocument},
        mesh::obj_primitive,
        resolver::ResourceResolver,
    },
};

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: false,
        single_index: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// Reads OBJ text from `reader`; `mtllib` references go through `resolver`.
///
/// A material library that cannot be fetched or parsed is skipped with a
/// warning, the geometry still loads.
pub fn load_obj_document<R: BufRead>(
    reader: &mut R,
    name: &str,
    resolver: &dyn ResourceResolver,
) -> Result<SceneDocument, SceneError> {
    let (models, obj_materials) = tobj::load_obj_buf(reader, &load_options(), |path: &Path| {
        let uri = path.to_string_lossy();
        match resolver.resolve(&uri) {
            Ok(bytes) => tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(bytes))),
            Err(err) => {
                warn!("material library {uri} for {name} not available: {err:#}");
                Err(tobj::LoadError::OpenFileFailed)
            }
        }
    })?;
    let obj_materials = obj_materials.unwrap_or_else(|err| {
        warn!("{name}: materials ignored: {err}");
        Vec::new()
    });

    let mut textures: Vec<DocTexture> = Vec::new();
    let mut texture_slots: HashMap<String, usize> = HashMap::new();
    let mut texture = |file: &Option<String>| {
        file.as_ref().map(|file| {
            let index = *texture_slots.entry(file.clone()).or_insert_with(|| {
                textures.push(DocTexture { sampler: None });
                textures.len() - 1
            });
            DocTextureInfo {
                texture: index,
                tex_coord: 0,
            }
        })
    };
    let materials = obj_materials
        .iter()
        .map(|m| {
            let [r, g, b] = m.diffuse.unwrap_or([1.0; 3]);
            DocMaterial {
                name: Some(m.name.clone()),
                uniform: MaterialUniform {
                    base_color: [r, g, b, m.dissolve.unwrap_or(1.0)],
                    // OBJ materials are dielectric
                    metalness: 0.0,
                    ..Default::default()
                },
                base_color_texture: texture(&m.diffuse_texture),
                normal_texture: texture(&m.normal_texture),
                ..Default::default()
            }
        })
        .collect::<Vec<_>>();

    let primitives = models
        .iter()
        .map(|model| {
            let material = model
                .mesh
                .material_id
                .filter(|&id| id < materials.len());
            obj_primitive(model, material)
        })
        .collect::<Vec<_>>();
    debug!(
        "OBJ {name}: {} objects, {} materials, {} textures",
        primitives.len(),
        materials.len(),
        textures.len()
    );

    Ok(SceneDocument {
        nodes: vec![DocNode {
            name: Some(name.to_string()),
            transform: NodeTransform::default(),
            mesh: Some(0),
            ..Default::default()
        }],
        roots: vec![0],
        meshes: vec![DocMesh {
            name: Some(name.to_string()),
            primitives,
        }],
        materials,
        textures,
        sampler_count: 0,
        cameras: Vec::new(),
        lights: Vec::new(),
    })
}
