//! Cascaded shadow maps: the camera frustum is cut into depth slices along the
//! practical split scheme and every slice gets its own light fit.

use cgmath::{Matrix4, Point3};

use crate::data_structures::camera::Projection;
use crate::projection::fit::{LightFit, MIN_EXTENT, get_light_matrix};
use crate::projection::split::split_distances;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CascadeSettings {
    pub count: usize,
    /// Weight of the logarithmic scheme, see [`practical_split`](super::practical_split).
    pub split_blend: f32,
    pub depth_offset: f32,
    /// Shadows end here even if the camera sees further.
    pub max_distance: f32,
}

impl Default for CascadeSettings {
    fn default() -> Self {
        Self {
            count: 4,
            split_blend: 0.75,
            depth_offset: 0.05,
            max_distance: 150.0,
        }
    }
}

/// Camera depth slice `[near, far]` and the light fit covering it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cascade {
    pub near: f32,
    pub far: f32,
    pub fit: LightFit,
}

/// One cascade per split of the camera's depth range.
///
/// The range runs from the projection's near plane to its far plane, capped at
/// `max_distance` (which also stands in for an infinite far plane).
pub fn cascades(
    projection: &Projection,
    aspect: Option<f32>,
    camera_view: &Matrix4<f32>,
    camera_pos: Point3<f32>,
    light_pos: Point3<f32>,
    settings: &CascadeSettings,
) -> Vec<Cascade> {
    let near = projection.znear();
    let far = projection
        .zfar()
        .unwrap_or(settings.max_distance)
        .min(settings.max_distance)
        .max(near + MIN_EXTENT);

    split_distances(settings.count, near, far, settings.split_blend)
        .windows(2)
        .map(|split| {
            let (near, far) = (split[0], split[1]);
            let slice = projection.with_depth_range(near, far).to_matrix(aspect);
            let fit = get_light_matrix(
                &slice,
                camera_view,
                light_pos,
                camera_pos,
                settings.depth_offset,
            );
            Cascade { near, far, fit }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::frustum::get_projection_box;
    use approx::assert_relative_eq;
    use cgmath::{Deg, Vector3, Vector4};

    fn perspective(zfar: Option<f32>) -> Projection {
        Projection::Perspective {
            yfov: Deg(45.0).into(),
            aspect: Some(1.5),
            znear: 0.5,
            zfar,
        }
    }

    fn view(eye: Point3<f32>) -> Matrix4<f32> {
        Matrix4::look_at_rh(eye, Point3::new(0.0, 0.0, 0.0), Vector3::unit_y())
    }

    #[test]
    fn cascades_tile_the_depth_range() {
        let eye = Point3::new(0.0, 5.0, 20.0);
        let settings = CascadeSettings::default();
        let cascades = cascades(
            &perspective(Some(80.0)),
            None,
            &view(eye),
            eye,
            Point3::new(10.0, 50.0, 10.0),
            &settings,
        );
        assert_eq!(cascades.len(), settings.count);
        assert_relative_eq!(cascades[0].near, 0.5);
        assert_relative_eq!(cascades[settings.count - 1].far, 80.0);
        for pair in cascades.windows(2) {
            assert_eq!(pair[0].far, pair[1].near);
            assert!(pair[0].near < pair[0].far);
        }
    }

    #[test]
    fn infinite_far_plane_is_capped() {
        let eye = Point3::new(0.0, 2.0, 10.0);
        let settings = CascadeSettings {
            max_distance: 40.0,
            ..Default::default()
        };
        let cascades = cascades(
            &perspective(None),
            Some(1.0),
            &view(eye),
            eye,
            Point3::new(-5.0, 30.0, 0.0),
            &settings,
        );
        assert_relative_eq!(cascades.last().unwrap().far, 40.0);
    }

    #[test]
    fn every_cascade_contains_its_slice() {
        let eye = Point3::new(3.0, 4.0, 12.0);
        let projection = perspective(Some(60.0));
        let light = Point3::new(20.0, 40.0, -10.0);
        for cascade in cascades(
            &projection,
            None,
            &view(eye),
            eye,
            light,
            &CascadeSettings::default(),
        ) {
            let slice = projection
                .with_depth_range(cascade.near, cascade.far)
                .to_matrix(None);
            let vp = cascade.fit.view_projection();
            for corner in get_projection_box(&slice, &view(eye), 0.0).unwrap() {
                let clip = vp * Vector4::new(corner.x, corner.y, corner.z, 1.0);
                assert!((clip.x / clip.w).abs() <= 1.0 + 1e-4);
                assert!((clip.y / clip.w).abs() <= 1.0 + 1e-4);
            }
        }
    }

    #[test]
    fn zero_cascades_is_empty() {
        let eye = Point3::new(0.0, 0.0, 5.0);
        let settings = CascadeSettings {
            count: 0,
            ..Default::default()
        };
        let cascades = cascades(
            &perspective(Some(10.0)),
            None,
            &view(eye),
            eye,
            Point3::new(0.0, 10.0, 0.0),
            &settings,
        );
        assert!(cascades.is_empty());
    }
}
