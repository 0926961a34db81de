use cgmath::{EuclideanSpace, Matrix4, Point3, Transform, Vector3};

/// Axis-aligned bounding box given by its component-wise extrema.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f32>>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |aabb, p| aabb.including(p)))
    }

    pub fn including(&self, p: Point3<f32>) -> Self {
        Self {
            min: Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z)),
            max: Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z)),
        }
    }

    pub fn union(&self, other: &Aabb) -> Self {
        self.including(other.min).including(other.max)
    }

    /// Folds two optional boxes, keeping whichever exists.
    pub fn merge(a: Option<Aabb>, b: Option<Aabb>) -> Option<Aabb> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.union(&b)),
            (a, None) => a,
            (None, b) => b,
        }
    }

    pub fn center(&self) -> Point3<f32> {
        self.min.midpoint(self.max)
    }

    pub fn extent(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn corners(&self) -> [Point3<f32>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }

    /// Bounds of this box after an affine transform (all 8 corners are transformed).
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Self {
        let corners = self.corners().map(|c| matrix.transform_point(c));
        let first = corners[0];
        corners[1..]
            .iter()
            .fold(Self::new(first, first), |aabb, p| aabb.including(*p))
    }

    /// Grows every axis thinner than `min_extent` symmetrically to at least
    /// `min_extent`.
    ///
    /// Far from the origin `mid ± min_extent / 2` can round back onto `mid`, so
    /// the growth scales with the magnitude of the coordinates and carries a few
    /// ulps of slack for the rounding of both ends.
    pub fn expanded_to(&self, min_extent: f32) -> Self {
        let mut min = self.min;
        let mut max = self.max;
        for axis in 0..3 {
            if max[axis] - min[axis] < min_extent {
                let scale = min[axis].abs().max(max[axis].abs());
                let extent =
                    min_extent.max(8.0 * scale * f32::EPSILON) + 4.0 * scale * f32::EPSILON;
                let mid = 0.5 * (min[axis] + max[axis]);
                min[axis] = mid - 0.5 * extent;
                max[axis] = mid + 0.5 * extent;
            }
        }
        Self { min, max }
    }

    pub fn is_finite(&self) -> bool {
        self.min.x.is_finite()
            && self.min.y.is_finite()
            && self.min.z.is_finite()
            && self.max.x.is_finite()
            && self.max.y.is_finite()
            && self.max.z.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_of_disjoint_boxes() {
        let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(2.0, -1.0, 0.5), Point3::new(3.0, 0.5, 4.0));
        let u = a.union(&b);
        assert_eq!(u.min, Point3::new(0.0, -1.0, 0.0));
        assert_eq!(u.max, Point3::new(3.0, 1.0, 4.0));
    }

    #[test]
    fn transformed_box_follows_translation() {
        let a = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let t = Matrix4::from_translation(Vector3::new(5.0, 0.0, 0.0));
        let moved = a.transformed(&t);
        assert_eq!(moved.min, Point3::new(4.0, -1.0, -1.0));
        assert_eq!(moved.max, Point3::new(6.0, 1.0, 1.0));
    }

    #[test]
    fn flat_axis_is_expanded() {
        let flat = Aabb::new(Point3::new(0.0, 2.0, 0.0), Point3::new(4.0, 2.0, 4.0));
        let grown = flat.expanded_to(0.01);
        assert!(grown.max.y - grown.min.y >= 0.01 - f32::EPSILON);
        assert_eq!(grown.min.x, 0.0);
        assert_eq!(grown.max.z, 4.0);
    }

    #[test]
    fn flat_axis_far_from_origin_keeps_its_extent() {
        for offset in [1.0e3, 5.0e4, 1.0e5, -2.0e6] {
            let p = Point3::new(offset, -offset, offset);
            let grown = Aabb::new(p, p).expanded_to(1.0e-3);
            for axis in 0..3 {
                assert!(
                    grown.max[axis] - grown.min[axis] >= 1.0e-3,
                    "axis {axis} at {offset}: {grown:?}"
                );
            }
        }
    }

    #[test]
    fn empty_iterator_has_no_bounds() {
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }
}
