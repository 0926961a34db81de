//! Orthographic light fits.
//!
//! The light looks from its position towards the centre of the volume it has to
//! cover; the orthographic box is the tight bound of that volume in light view
//! space, so the depth range is exactly as large as the geometry requires.

use cgmath::{InnerSpace, Matrix4, Point3, SquareMatrix, Vector3};

use crate::data_structures::aabb::Aabb;
use crate::projection::frustum::get_projection_box;

/// Axes thinner than this are grown to it before fitting.
pub const MIN_EXTENT: f32 = 1.0e-3;

/// |cos| between the look direction and +Y above which +Z is used as up instead.
pub const UP_PARALLEL_COS: f32 = 0.99;

/// Matrices and depth range of a fitted shadow camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightFit {
    pub light_view: Matrix4<f32>,
    pub light_projection: Matrix4<f32>,
    pub near: f32,
    pub far: f32,
    /// Method specific: light-to-target distance for the orthographic fits,
    /// the virtual near plane for the warped fit.
    pub extra: f32,
}

impl LightFit {
    pub fn identity() -> Self {
        Self {
            light_view: Matrix4::identity(),
            light_projection: Matrix4::identity(),
            near: -1.0,
            far: 1.0,
            extra: 0.0,
        }
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.light_projection * self.light_view
    }
}

/// Up vector for a look-at along `direction` that is never (nearly) parallel to it.
pub fn choose_up(direction: Vector3<f32>) -> Vector3<f32> {
    if direction.normalize().dot(Vector3::unit_y()).abs() > UP_PARALLEL_COS {
        Vector3::unit_z()
    } else {
        Vector3::unit_y()
    }
}

/// Orthographic fit of the world-space box `[min, max]` as seen from `light_pos`.
pub fn get_aabb_light_matrix(
    min: Point3<f32>,
    max: Point3<f32>,
    light_pos: Point3<f32>,
) -> LightFit {
    let aabb = Aabb::new(min, max).including(min).including(max);
    fit_aabb(&aabb, light_pos, 0.0)
}

/// Fit covering the whole frustum of a camera.
///
/// `depth_offset` moves the near plane that far towards the light. When the
/// camera matrices cannot be inverted (or the far plane is infinite) only the
/// eye at `camera_pos` is covered.
pub fn get_light_matrix(
    camera_projection: &Matrix4<f32>,
    camera_view: &Matrix4<f32>,
    light_pos: Point3<f32>,
    camera_pos: Point3<f32>,
    depth_offset: f32,
) -> LightFit {
    let bounds = get_projection_box(camera_projection, camera_view, 0.0)
        .and_then(Aabb::from_points)
        .unwrap_or_else(|| Aabb::new(camera_pos, camera_pos));
    fit_aabb(&bounds, light_pos, depth_offset)
}

/// Fit covering the union of the camera frustum (padded by `extra`) and the scene box.
///
/// Dropping the scene box would lose shadow casters outside the view; dropping
/// the frustum would lose receivers the scene box does not reach.
pub fn get_projection_light_matrix(
    camera_projection: &Matrix4<f32>,
    camera_view: &Matrix4<f32>,
    scene_min: Point3<f32>,
    scene_max: Point3<f32>,
    light_pos: Point3<f32>,
    extra: f32,
) -> LightFit {
    let scene = Aabb::new(scene_min, scene_max)
        .including(scene_min)
        .including(scene_max);
    let frustum =
        get_projection_box(camera_projection, camera_view, extra).and_then(Aabb::from_points);
    let bounds = Aabb::merge(Some(scene), frustum).unwrap_or(scene);
    fit_aabb(&bounds, light_pos, 0.0)
}

pub(crate) fn fit_aabb(aabb: &Aabb, light_pos: Point3<f32>, depth_offset: f32) -> LightFit {
    let finite = |p: Point3<f32>| p.x.is_finite() && p.y.is_finite() && p.z.is_finite();
    if !aabb.is_finite() || !finite(light_pos) || !depth_offset.is_finite() {
        return LightFit::identity();
    }
    let aabb = aabb.expanded_to(MIN_EXTENT);
    let target = aabb.center();
    let to_target = target - light_pos;
    let distance = to_target.magnitude();
    let direction = if distance > MIN_EXTENT {
        to_target / distance
    } else {
        // light inside the volume's centre, shine straight down
        -Vector3::unit_y()
    };
    let light_view = Matrix4::look_to_rh(light_pos, direction, choose_up(direction));

    let bounds = aabb.transformed(&light_view).expanded_to(MIN_EXTENT);
    // view space looks down -Z
    let near = -bounds.max.z - depth_offset.max(0.0);
    let far = -bounds.min.z;
    let light_projection = cgmath::ortho(
        bounds.min.x,
        bounds.max.x,
        bounds.min.y,
        bounds.max.y,
        near,
        far,
    );
    LightFit {
        light_view,
        light_projection,
        near,
        far,
        extra: distance,
    }
}
