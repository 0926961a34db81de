//! In-memory scene fixtures.
#![allow(dead_code)]

use std::io::{BufReader, Cursor};

use base64::Engine;
use umbra::{
    Scene, SceneError,
    resources::{load_gltf_document, load_obj_document},
};

/// Unit triangle in the XY plane, indexed, as one little-endian buffer:
/// 3 `f32x3` positions followed by 3 `u32` indices.
pub fn triangle_buffer() -> Vec<u8> {
    let positions: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
    let indices: [u32; 3] = [0, 1, 2];
    let mut bytes = Vec::with_capacity(48);
    for p in positions.iter().flatten() {
        bytes.extend_from_slice(&p.to_le_bytes());
    }
    for i in indices {
        bytes.extend_from_slice(&i.to_le_bytes());
    }
    bytes
}

pub fn data_uri(bytes: &[u8]) -> String {
    format!(
        "data:application/octet-stream;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// glTF JSON with a single triangle mesh (mesh 0) drawn with `mode`.
///
/// `nodes` is the JSON node array; `extra` holds additional top-level members
/// such as `"scenes"`, `"cameras"` or `"extensions"`.
pub fn gltf_json_with(uri: &str, mode: u32, nodes: &str, extra: &[&str]) -> String {
    let extra: String = extra.iter().map(|member| format!(",\n  {member}")).collect();
    format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "buffers": [{{ "byteLength": 48, "uri": "{uri}" }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 12, "target": 34963 }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
       "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5125, "count": 3, "type": "SCALAR" }}
  ],
  "meshes": [{{ "name": "triangle", "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "indices": 1, "mode": {mode} }}] }}],
  "nodes": {nodes}{extra}
}}"#
    )
}

pub fn gltf_json(nodes: &str, extra: &[&str]) -> String {
    gltf_json_with(&data_uri(&triangle_buffer()), 4, nodes, extra)
}

pub fn no_external_resources(uri: &str) -> anyhow::Result<Vec<u8>> {
    anyhow::bail!("unexpected external resource {uri}")
}

pub fn load_gltf(json: &str) -> Result<Scene, SceneError> {
    let document = load_gltf_document(json.as_bytes(), &no_external_resources)?;
    Scene::from_document(&document)
}

pub fn load_obj(text: &str) -> Result<Scene, SceneError> {
    load_obj_with(text, &no_external_resources)
}

pub fn load_obj_with(
    text: &str,
    resolver: &dyn umbra::resources::ResourceResolver,
) -> Result<Scene, SceneError> {
    let mut reader = BufReader::new(Cursor::new(text.as_bytes().to_vec()));
    let document = load_obj_document(&mut reader, "fixture.obj", resolver)?;
    Scene::from_document(&document)
}

pub const TRIANGLE_GEOMETRY: &str = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/1 3/3/1
";

/// One textured triangle object; `statements` go between `o` and the geometry.
pub fn triangle_obj(statements: &str) -> String {
    format!("o tri\n{statements}{TRIANGLE_GEOMETRY}")
}

pub const QUAD_OBJ: &str = "\
o quad
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
f 1 2 3 4
";
