//! Shadow-camera fitting.
//!
//! Everything in here is a pure function of its inputs. Matrices follow the
//! OpenGL conventions of `cgmath`: right-handed views looking down -Z and clip
//! space z in `[-1, 1]`. Degenerate inputs never fail; they are expanded,
//! re-oriented or routed to a simpler fit instead.
//!
//! - `frustum` recovers world-space frustum corners from camera matrices
//! - `split` holds the cascade split schemes
//! - `fit` fits orthographic light frusta to boxes and camera frusta
//! - `warp` adds the light-space perspective warp on top of the frustum fit
//! - `cascade` slices a camera into cascades and fits each one

pub mod cascade;
pub mod fit;
pub mod frustum;
pub mod split;
pub mod warp;

pub use cascade::{Cascade, CascadeSettings, cascades};
pub use fit::{LightFit, get_aabb_light_matrix, get_light_matrix, get_projection_light_matrix};
pub use frustum::{centroid, get_projection_box, rescale_vec};
pub use split::{logarithmetic_split, practical_split, split_distances};
pub use warp::{get_l, get_perspective_light_matrix, get_w};
