//! Cameras resolved from the scene document.
//!
//! A camera keeps the projection parameters from the document rather than a
//! baked matrix so the aspect ratio can be overridden per frame (window
//! resizes) and so cascades can slice the frustum into sub-ranges.

use cgmath::{Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3};

/// Vertical field of view of the synthesised default camera.
pub const DEFAULT_FOV: Deg<f32> = Deg(30.0);
pub const DEFAULT_ASPECT: f32 = 16.0 / 9.0;
pub const DEFAULT_ZNEAR: f32 = 1.0;
pub const DEFAULT_ZFAR: f32 = 150.0;
pub const DEFAULT_EYE: [f32; 3] = [0.0, 0.0, 10.0];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    Perspective {
        yfov: Rad<f32>,
        aspect: Option<f32>,
        znear: f32,
        /// `None` means an infinite far plane.
        zfar: Option<f32>,
    },
    Orthographic {
        xmag: f32,
        ymag: f32,
        znear: f32,
        zfar: f32,
    },
}

impl Projection {
    pub fn znear(&self) -> f32 {
        match *self {
            Projection::Perspective { znear, .. } | Projection::Orthographic { znear, .. } => znear,
        }
    }

    pub fn zfar(&self) -> Option<f32> {
        match *self {
            Projection::Perspective { zfar, .. } => zfar,
            Projection::Orthographic { zfar, .. } => Some(zfar),
        }
    }

    /// Projection matrix (OpenGL clip conventions, z in `[-1, 1]`).
    ///
    /// `aspect_override` replaces the document aspect ratio; without either the
    /// default 16:9 is used.
    pub fn to_matrix(&self, aspect_override: Option<f32>) -> Matrix4<f32> {
        match *self {
            Projection::Perspective {
                yfov,
                aspect,
                znear,
                zfar,
            } => {
                let aspect = aspect_override.or(aspect).unwrap_or(DEFAULT_ASPECT);
                match zfar {
                    Some(zfar) => cgmath::perspective(yfov, aspect, znear, zfar),
                    None => infinite_perspective(yfov, aspect, znear),
                }
            }
            Projection::Orthographic {
                xmag,
                ymag,
                znear,
                zfar,
            } => {
                let xmag = match aspect_override {
                    Some(aspect) => ymag * aspect,
                    None => xmag,
                };
                cgmath::ortho(-xmag, xmag, -ymag, ymag, znear, zfar)
            }
        }
    }

    /// Same projection restricted to `[znear, zfar]`, used to slice cascades.
    pub fn with_depth_range(&self, znear: f32, zfar: f32) -> Projection {
        match *self {
            Projection::Perspective { yfov, aspect, .. } => Projection::Perspective {
                yfov,
                aspect,
                znear,
                zfar: Some(zfar),
            },
            Projection::Orthographic { xmag, ymag, .. } => Projection::Orthographic {
                xmag,
                ymag,
                znear,
                zfar,
            },
        }
    }
}

#[rustfmt::skip]
fn infinite_perspective(yfov: Rad<f32>, aspect: f32, znear: f32) -> Matrix4<f32> {
    let f = 1.0 / (yfov.0 * 0.5).tan();
    Matrix4::new(
        f / aspect, 0.0, 0.0, 0.0,
        0.0, f, 0.0, 0.0,
        0.0, 0.0, -1.0, -1.0,
        0.0, 0.0, -2.0 * znear, 0.0,
    )
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub name: Option<String>,
    pub projection: Projection,
    /// World to camera space.
    pub view: Matrix4<f32>,
    pub eye: Point3<f32>,
}

impl Camera {
    /// Places a camera at a node: the view is the inverse of the node's world transform.
    ///
    /// Returns `None` when the world transform is singular.
    pub fn from_world(
        name: Option<String>,
        projection: Projection,
        world: &Matrix4<f32>,
    ) -> Option<Self> {
        let view = world.invert()?;
        let eye = Point3::from_vec(world.w.truncate());
        Some(Self {
            name,
            projection,
            view,
            eye,
        })
    }

    /// The camera used when the document declares none.
    pub fn default_camera() -> Self {
        let projection = Projection::Perspective {
            yfov: DEFAULT_FOV.into(),
            aspect: Some(DEFAULT_ASPECT),
            znear: DEFAULT_ZNEAR,
            zfar: Some(DEFAULT_ZFAR),
        };
        let eye = Point3::from(DEFAULT_EYE);
        let view = Matrix4::look_to_rh(eye, -Vector3::unit_z(), Vector3::unit_y());
        Self {
            name: None,
            projection,
            view,
            eye,
        }
    }

    pub fn projection_matrix(&self, aspect_override: Option<f32>) -> Matrix4<f32> {
        self.projection.to_matrix(aspect_override)
    }

    /// Direction the camera looks at, in world space.
    pub fn forward(&self) -> Vector3<f32> {
        // third row of the view rotation is the camera's +Z in world space
        -Vector3::new(self.view.x.z, self.view.y.z, self.view.z.z).normalize()
    }
}
