use glam::Vec3;

/// Slab test against an axis-aligned box.
///
/// Returns the entry distance clipped to `t_min` when the ray overlaps the
/// box somewhere inside `[t_min, t_max]`.
pub fn intersect_aabb(
    ray_origin: Vec3,
    inv_dir: Vec3,
    box_min: Vec3,
    box_max: Vec3,
    t_min: f32,
    t_max: f32,
) -> Option<f32> {
    let t0 = (box_min - ray_origin) * inv_dir;
    let t1 = (box_max - ray_origin) * inv_dir;

    let near = t0.min(t1).max_element().max(t_min);
    let far = t0.max(t1).min_element().min(t_max);

    (near <= far).then_some(near)
}

/// Reciprocal direction with zero components pushed to a huge finite value
pub fn inverse_direction(ray_dir: Vec3) -> Vec3 {
    const EPSILON: f32 = 1e-8;

    let inv = |c: f32| {
        if c.abs() < EPSILON {
            1.0 / EPSILON.copysign(c)
        } else {
            1.0 / c
        }
    };
    Vec3::new(inv(ray_dir.x), inv(ray_dir.y), inv(ray_dir.z))
}
