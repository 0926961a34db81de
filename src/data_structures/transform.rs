//! Local node transforms.
//!
//! A document node either carries an explicit 4×4 matrix or translation,
//! rotation and scale components. The explicit matrix wins when both exist.

use cgmath::{Matrix4, One, Quaternion, Vector3};

/// Translation, rotation (as quaternion) and scale of a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    /// Identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            translation: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// T * R * S, the composition order of the interchange format.
    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vector3<f32>> for Transform {
    fn from(translation: Vector3<f32>) -> Self {
        Transform {
            translation,
            ..Default::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeTransform {
    Matrix(Matrix4<f32>),
    Decomposed(Transform),
}

impl NodeTransform {
    pub fn to_matrix(&self) -> Matrix4<f32> {
        match self {
            NodeTransform::Matrix(m) => *m,
            NodeTransform::Decomposed(t) => t.to_matrix(),
        }
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        NodeTransform::Decomposed(Transform::new())
    }
}

impl From<gltf::scene::Transform> for NodeTransform {
    fn from(transform: gltf::scene::Transform) -> Self {
        match transform {
            // column-major, same as cgmath
            gltf::scene::Transform::Matrix { matrix } => NodeTransform::Matrix(matrix.into()),
            gltf::scene::Transform::Decomposed {
                translation,
                rotation: [x, y, z, w],
                scale,
            } => NodeTransform::Decomposed(Transform {
                translation: translation.into(),
                rotation: Quaternion::new(w, x, y, z),
                scale: scale.into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::{Deg, Point3, Rotation3, Transform as _};

    #[test]
    fn trs_applies_scale_then_rotation_then_translation() {
        let t = Transform {
            translation: Vector3::new(1.0, 0.0, 0.0),
            rotation: Quaternion::from_angle_z(Deg(90.0)),
            scale: Vector3::new(2.0, 2.0, 2.0),
        };
        let p = t.to_matrix().transform_point(Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(1.0, 2.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn explicit_matrix_is_kept_verbatim() {
        let m = Matrix4::from_translation(Vector3::new(3.0, 4.0, 5.0));
        assert_eq!(NodeTransform::Matrix(m).to_matrix(), m);
    }
}
