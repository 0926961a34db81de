//! Scene data structures.
//!
//! - `aabb` is the axis-aligned box used for bounds and light fitting
//! - `camera` holds document cameras and the default camera
//! - `geometry` is the flat vertex/index store with its draw groups
//! - `light` holds point lights
//! - `model` contains vertices, meshes, primitives and material blocks
//! - `scene_graph` enables hierarchical scene organization
//! - `transform` holds node-local transforms

pub mod aabb;
pub mod camera;
pub mod geometry;
pub mod light;
pub mod model;
pub mod scene_graph;
pub mod transform;
