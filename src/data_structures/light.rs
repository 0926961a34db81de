use cgmath::{Point3, Vector3};

/// A point light from the `KHR_lights_punctual` extension.
#[derive(Clone, Debug, PartialEq)]
pub struct PointLight {
    pub name: Option<String>,
    pub color: Vector3<f32>,
    pub intensity: f32,
    /// World position. Lights not attached to any node sit at the origin.
    pub location: Point3<f32>,
}

impl PointLight {
    pub fn new(color: Vector3<f32>, intensity: f32, location: Point3<f32>) -> Self {
        Self {
            name: None,
            color,
            intensity,
            location,
        }
    }

    /// Colour scaled by intensity, as uploaded to the shaders.
    pub fn energy(&self) -> Vector3<f32> {
        self.color * self.intensity
    }
}

impl Default for PointLight {
    fn default() -> Self {
        Self::new(Vector3::new(1.0, 1.0, 1.0), 1.0, Point3::new(0.0, 0.0, 0.0))
    }
}
