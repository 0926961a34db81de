//! Cascade split schemes.
//!
//! Splits are evaluated in f64; `(far / near)^(i / count)` loses several
//! digits in f32 once the far/near ratio gets large.

/// Stands in for a near distance the logarithmic scheme cannot use (zero,
/// negative or not finite).
pub const MIN_SPLIT_NEAR: f32 = 1.0e-4;

/// `near * (far / near)^(i / count)`.
pub fn logarithmetic_split(i: usize, count: usize, near: f32, far: f32) -> f32 {
    if count == 0 || i == 0 {
        return near;
    }
    if i >= count {
        return far;
    }
    let near = if near > 0.0 && near.is_finite() {
        f64::from(near)
    } else {
        f64::from(MIN_SPLIT_NEAR)
    };
    let far = f64::from(far);
    let t = i as f64 / count as f64;
    (near * (far / near).powf(t)) as f32
}

/// `near + (far - near) * i / count`.
pub fn linear_split(i: usize, count: usize, near: f32, far: f32) -> f32 {
    if count == 0 || i == 0 {
        return near;
    }
    if i >= count {
        return far;
    }
    let t = i as f64 / count as f64;
    (f64::from(near) + (f64::from(far) - f64::from(near)) * t) as f32
}

/// Blend of the logarithmic and linear schemes; `blend = 1` is purely
/// logarithmic, `blend = 0` purely linear. `blend` is clamped to `[0, 1]`.
pub fn practical_split(i: usize, count: usize, near: f32, far: f32, blend: f32) -> f32 {
    let blend = f64::from(blend.clamp(0.0, 1.0));
    let log = f64::from(logarithmetic_split(i, count, near, far));
    let lin = f64::from(linear_split(i, count, near, far));
    (blend * log + (1.0 - blend) * lin) as f32
}

/// The `count + 1` boundaries `near = d0 < d1 < ... < d_count = far`.
pub fn split_distances(count: usize, near: f32, far: f32, blend: f32) -> Vec<f32> {
    (0..=count)
        .map(|i| practical_split(i, count, near, far, blend))
        .collect()
}
