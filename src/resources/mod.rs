//! Scene import from files.
//!
//! Importers lower their format into a [`document::SceneDocument`]; the
//! document is then validated and resolved by [`Scene::from_document`].
//!
//! - `document` is the format-neutral document model
//! - `gltf_loader` imports glTF 2.0 (`.gltf` and `.glb`)
//! - `obj_loader` and `mesh` import Wavefront OBJ
//! - `resolver` fetches external buffers and material libraries

use std::{
    io::{BufReader, Cursor},
    path::Path,
};

use crate::{error::SceneError, scene::Scene};

pub mod document;
pub mod gltf_loader;
pub mod mesh;
pub mod obj_loader;
pub mod resolver;

pub use gltf_loader::load_gltf_document;
pub use obj_loader::load_obj_document;
pub use resolver::{FsResolver, ResourceResolver};

/// Loads a scene, picking the importer from the file extension.
pub fn load_scene(path: impl AsRef<Path>) -> Result<Scene, SceneError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("gltf" | "glb") => load_scene_gltf(path),
        Some("obj") => load_scene_obj(path),
        _ => Err(SceneError::load(format!(
            "{}: unsupported scene format",
            path.display()
        ))),
    }
}

pub fn load_scene_gltf(path: impl AsRef<Path>) -> Result<Scene, SceneError> {
    let path = path.as_ref();
    let bytes = read_document(path)?;
    let document = load_gltf_document(&bytes, &FsResolver::for_file(path))?;
    Scene::from_document(&document)
}

pub fn load_scene_obj(path: impl AsRef<Path>) -> Result<Scene, SceneError> {
    let path = path.as_ref();
    let bytes = read_document(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let document = load_obj_document(
        &mut BufReader::new(Cursor::new(bytes)),
        &name,
        &FsResolver::for_file(path),
    )?;
    Scene::from_document(&document)
}

/// The document itself being unreadable is a load failure, not a resource error.
fn read_document(path: &Path) -> Result<Vec<u8>, SceneError> {
    resolver::load_binary(path).map_err(|err| SceneError::load(format!("{err:#}")))
}
