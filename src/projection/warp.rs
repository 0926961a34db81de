//! Light-space perspective shadow maps.
//!
//! The orthographic light frustum is warped by a perspective transform whose
//! axis follows the camera's view direction, projected onto the light's image
//! plane. Texels then bunch up close to the viewer. The warp degenerates when
//! the light shines along the view direction, in which case the plain frustum
//! fit is used instead.

use cgmath::{InnerSpace, Matrix4, Point3, SquareMatrix, Transform, Vector3, Vector4};
use log::debug;

use crate::data_structures::aabb::Aabb;
use crate::projection::fit::{LightFit, MIN_EXTENT, get_light_matrix};
use crate::projection::frustum::{centroid, get_projection_box, rescale_vec};

/// Below this sine of the light/view angle the warp collapses.
pub const MIN_SIN_GAMMA: f32 = 0.05;

/// Smallest virtual near plane [`get_w`] accepts.
pub const MIN_WARP_NEAR: f32 = 1.0e-3;

/// Light view whose +Y axis is the camera's view direction seen from the light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSpace {
    pub view: Matrix4<f32>,
    /// Sine of the angle between light and view direction.
    pub sin_gamma: f32,
}

/// Builds the light space for a light at `light_pos` looking along
/// `light_dir`, for a camera looking along `view_dir`.
///
/// `None` when either direction is zero or the two are (nearly) parallel.
pub fn get_l(
    light_pos: Point3<f32>,
    light_dir: Vector3<f32>,
    view_dir: Vector3<f32>,
) -> Option<LightSpace> {
    if light_dir.magnitude2() <= f32::EPSILON || view_dir.magnitude2() <= f32::EPSILON {
        return None;
    }
    let light_dir = light_dir.normalize();
    let view_dir = view_dir.normalize();
    let up = view_dir - light_dir * view_dir.dot(light_dir);
    let sin_gamma = up.magnitude();
    if !sin_gamma.is_finite() || sin_gamma < MIN_SIN_GAMMA {
        return None;
    }
    Some(LightSpace {
        view: Matrix4::look_to_rh(light_pos, light_dir, up / sin_gamma),
        sin_gamma,
    })
}

/// Perspective along +Y mapping `y = near` to -1 and `y = far` to +1, with
/// `x` and `z` scaled by `near / y`.
///
/// `None` for a near plane below [`MIN_WARP_NEAR`] or an empty range.
#[rustfmt::skip]
pub fn get_w(near: f32, far: f32) -> Option<Matrix4<f32>> {
    if !near.is_finite() || !far.is_finite() || near < MIN_WARP_NEAR || far - near < MIN_EXTENT {
        return None;
    }
    let a = (far + near) / (far - near);
    let b = -2.0 * far * near / (far - near);
    Some(Matrix4::new(
        near, 0.0, 0.0,  0.0,
        0.0,  a,   0.0,  1.0,
        0.0,  0.0, near, 0.0,
        0.0,  b,   0.0,  0.0,
    ))
}

/// Warped light fit over the camera frustum.
///
/// `near`/`far` of the result are the depth range of the frustum in light view
/// space; `extra` is the virtual near plane of the warp.
pub fn get_perspective_light_matrix(
    camera_projection: &Matrix4<f32>,
    camera_view: &Matrix4<f32>,
    light_pos: Point3<f32>,
    camera_pos: Point3<f32>,
) -> LightFit {
    match warp(camera_projection, camera_view, light_pos, camera_pos) {
        Some(fit) => fit,
        None => {
            debug!("light warp degenerate, using the frustum fit");
            get_light_matrix(camera_projection, camera_view, light_pos, camera_pos, 0.0)
        }
    }
}

fn warp(
    camera_projection: &Matrix4<f32>,
    camera_view: &Matrix4<f32>,
    light_pos: Point3<f32>,
    camera_pos: Point3<f32>,
) -> Option<LightFit> {
    let corners = get_projection_box(camera_projection, camera_view, 0.0)?;
    let view_dir = camera_view
        .invert()?
        .transform_vector(-Vector3::unit_z())
        .normalize();
    let target = centroid(&corners)?;
    let light = get_l(light_pos, target - light_pos, view_dir)?;

    // camera depth of the near and far quads
    let depth = |quad: &[Point3<f32>]| -> Option<f32> {
        Some((centroid(quad)? - camera_pos).dot(view_dir))
    };
    let z_near = depth(&corners[0..4])?;
    let z_far = depth(&corners[4..8])?;
    if z_near <= 0.0 || z_far <= z_near {
        return None;
    }
    let n = (z_near + (z_far * z_near).sqrt()) / light.sin_gamma;

    let body = Aabb::from_points(corners.map(|c| light.view.transform_point(c)))?;
    let eye = light.view.transform_point(camera_pos);
    let f = n + (body.max.y - body.min.y).max(MIN_EXTENT);
    let w = get_w(n, f)?;
    let centre = Vector3::new(eye.x, body.min.y - n, 0.5 * (body.min.z + body.max.z));
    let warp = w * Matrix4::from_translation(-centre);

    let warped = Aabb::from_points(corners.map(|c| {
        let p = light.view.transform_point(c);
        rescale_vec(warp * Vector4::new(p.x, p.y, p.z, 1.0))
    }))?;
    if !warped.is_finite() {
        return None;
    }
    let warped = warped.expanded_to(MIN_EXTENT);
    let ortho = cgmath::ortho(
        warped.min.x,
        warped.max.x,
        warped.min.y,
        warped.max.y,
        -warped.max.z,
        -warped.min.z,
    );
    Some(LightFit {
        light_view: light.view,
        light_projection: ortho * warp,
        near: -body.max.z,
        far: -body.min.z,
        extra: n,
    })
}
