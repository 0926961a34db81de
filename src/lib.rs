//! umbra
//!
//! Scene graph and shadow light-fit core for a forward renderer. Scenes are
//! imported from glTF (or OBJ), resolved into a read-only graph with flattened
//! geometry, and walked once per pass to produce draw records for whatever GPU
//! backend embeds the crate. The projection module fits shadow cameras to
//! boxes, camera frusta and cascades.
//!
//! High-level modules
//! - `context`: a loaded scene together with the active camera, light and render settings
//! - `data_structures`: geometry, meshes, materials, cameras, lights and the scene graph
//! - `error`: the loading error taxonomy
//! - `projection`: frustum extraction, cascade splits and light-fit matrices
//! - `render`: the draw traversal and pipeline-variant batching
//! - `resources`: glTF/OBJ importers and resource resolution
//! - `scene`: validation of an imported document into a [`scene::Scene`]
//!

pub mod context;
pub mod data_structures;
pub mod error;
pub mod projection;
pub mod render;
pub mod resources;
pub mod scene;

pub use error::SceneError;
pub use scene::Scene;
