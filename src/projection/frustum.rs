use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, SquareMatrix, Vector3, Vector4};

/// Corners of the clip-space cube, near face (z = -1) first.
pub const NDC_CORNERS: [[f32; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
];

/// Perspective divide: `xyz / w`.
pub fn rescale_vec(v: Vector4<f32>) -> Point3<f32> {
    Point3::new(v.x / v.w, v.y / v.w, v.z / v.w)
}

/// World-space corners of the volume `projection * view` maps onto the NDC cube.
///
/// Corners come in [`NDC_CORNERS`] order, so `[0..4]` is the near quad and
/// `[4..8]` the far quad. A non-zero `extra` pushes every corner that many
/// world units away from the box centroid. Returns `None` if the combined
/// matrix is singular or a corner ends up at infinity (infinite far plane).
pub fn get_projection_box(
    projection: &Matrix4<f32>,
    view: &Matrix4<f32>,
    extra: f32,
) -> Option<[Point3<f32>; 8]> {
    let inverse = (projection * view).invert()?;
    let corners = NDC_CORNERS.map(|[x, y, z]| rescale_vec(inverse * Vector4::new(x, y, z, 1.0)));
    if !corners
        .iter()
        .all(|c| c.x.is_finite() && c.y.is_finite() && c.z.is_finite())
    {
        return None;
    }
    if extra == 0.0 {
        return Some(corners);
    }
    let center = centroid(&corners)?;
    Some(corners.map(|c| {
        let offset = c - center;
        let len = offset.magnitude();
        if len > f32::EPSILON {
            c + offset * (extra / len)
        } else {
            c
        }
    }))
}

/// Arithmetic mean of a point set, `None` when empty.
pub fn centroid(points: &[Point3<f32>]) -> Option<Point3<f32>> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3::new(0.0, 0.0, 0.0), |acc, p| acc + p.to_vec());
    Some(Point3::from_vec(sum / points.len() as f32))
}
