//! Geometric primitives and ray intersection.

use lumen_math::{Ray, Vec2, Vec3};

/// Result of intersecting a ray with a shape.
///
/// Only produced for actual hits; a miss is `None` at the call site, so
/// every field here is meaningful.
#[derive(Debug, Clone, Copy)]
pub struct Intersection {
    /// Distance along the ray to the hit point.
    pub distance: f32,
    /// World-space hit position.
    pub position: Vec3,
    /// Outward surface normal. Unit length for every shape except
    /// `Sphere`, which reports the raw `position - center` offset and
    /// leaves normalization to the caller.
    pub normal: Vec3,
    /// Texture coordinates (face-projected for AABBs, zero elsewhere).
    pub uv: Vec2,
}

/// A renderable primitive.
///
/// A closed set of shapes dispatched by pattern matching; each variant
/// stores its own geometric parameters.
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    /// Axis-aligned box described by its center and half extents.
    Aabb { center: Vec3, half_size: Vec3 },
    /// Sphere described by its center and radius.
    Sphere { center: Vec3, radius: f32 },
    /// Infinite plane through a point with a unit normal.
    Plane { point: Vec3, normal: Vec3 },
    /// Flat disk with a center, unit normal and radius.
    Disk { center: Vec3, normal: Vec3, radius: f32 },
    /// Triangle with three corners; the winding defines the front face.
    Triangle { a: Vec3, b: Vec3, c: Vec3 },
}

impl Shape {
    /// Create an axis-aligned box from its center and half extents.
    pub fn aabb(center: Vec3, half_size: Vec3) -> Self {
        Self::Aabb { center, half_size }
    }

    /// Create a sphere.
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self::Sphere { center, radius }
    }

    /// Create an infinite plane. The normal is normalized here so the
    /// grazing-incidence threshold in `intersect` behaves consistently.
    pub fn plane(point: Vec3, normal: Vec3) -> Self {
        Self::Plane {
            point,
            normal: normal.normalize(),
        }
    }

    /// Create a disk. Note that a disk faces the opposite way from a
    /// plane built with the same normal.
    pub fn disk(center: Vec3, normal: Vec3, radius: f32) -> Self {
        Self::Disk {
            center,
            normal: normal.normalize(),
            radius,
        }
    }

    /// Create a triangle from three corners.
    pub fn triangle(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self::Triangle { a, b, c }
    }

    /// Intersect a ray with this shape, returning the nearest forward hit.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        match *self {
            Self::Aabb { center, half_size } => intersect_aabb(ray, center, half_size),
            Self::Sphere { center, radius } => intersect_sphere(ray, center, radius),
            Self::Plane { point, normal } => intersect_plane(ray, point, normal),
            Self::Disk {
                center,
                normal,
                radius,
            } => intersect_disk(ray, center, normal, radius),
            Self::Triangle { a, b, c } => intersect_triangle(ray, a, b, c),
        }
    }
}

/// Slab method. Division by a zero direction component yields IEEE
/// infinities, which propagate through the min/max folds correctly.
fn intersect_aabb(ray: &Ray, center: Vec3, half_size: Vec3) -> Option<Intersection> {
    let rel_origin = ray.origin - center;
    let inv_dir = ray.direction.recip();

    let t1 = (-half_size - rel_origin) * inv_dir;
    let t2 = (half_size - rel_origin) * inv_dir;

    let tmin = t1.min(t2).max_element();
    let tmax = t1.max(t2).min_element();

    if tmax < tmin || tmax < 0.0 {
        return None;
    }

    // Ray origin inside the box reports the far intersection.
    let distance = if tmin < 0.0 { tmax } else { tmin };
    let position = ray.at(distance);

    // Normal axis is the one with the largest normalized offset from
    // the center, signed by which side of the box we are on.
    let offset = position - center;
    let scaled = (offset / half_size).abs();
    let max_axis = scaled.max_element();
    let normal = Vec3::new(
        if scaled.x < max_axis { 0.0 } else { offset.x },
        if scaled.y < max_axis { 0.0 } else { offset.y },
        if scaled.z < max_axis { 0.0 } else { offset.z },
    )
    .normalize_or_zero();

    // Project onto the two axes orthogonal to the dominant normal axis.
    let uv = if normal.x.abs() > 0.0 {
        Vec2::new(position.y, position.z)
    } else {
        Vec2::new(position.x, position.y + position.z)
    };

    Some(Intersection {
        distance,
        position,
        normal,
        uv,
    })
}

/// Projection-of-center method. Expects a normalized ray direction.
fn intersect_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<Intersection> {
    let l = center - ray.origin;
    let tca = l.dot(ray.direction);
    let d2 = l.dot(l) - tca * tca;
    let r2 = radius * radius;

    // Guard the square root: the ray passes outside the sphere.
    if d2 > r2 {
        return None;
    }

    let thc = (r2 - d2).sqrt();
    let t0 = tca - thc;
    let t1 = tca + thc;

    if (t0 > 0.0 && t1 > t0) || t0 == t1 {
        let position = ray.at(t0);
        Some(Intersection {
            distance: t0,
            position,
            // Deliberately unnormalized, see Intersection::normal.
            normal: position - center,
            uv: Vec2::ZERO,
        })
    } else {
        None
    }
}

fn intersect_plane(ray: &Ray, point: Vec3, normal: Vec3) -> Option<Intersection> {
    let denom = normal.dot(ray.direction);

    // Near-grazing rays are treated as misses to avoid numeric blow-up.
    if denom.abs() <= 0.01 {
        return None;
    }

    let t = (point - ray.origin).dot(normal) / denom;
    if t < 0.0 {
        return None;
    }

    Some(Intersection {
        distance: t,
        position: ray.at(t),
        // Flip so the normal faces the incoming ray.
        normal: if denom > 0.0 { -normal } else { normal },
        uv: Vec2::ZERO,
    })
}

fn intersect_disk(ray: &Ray, center: Vec3, normal: Vec3, radius: f32) -> Option<Intersection> {
    let hit = intersect_plane(ray, center, normal)?;

    if (hit.position - center).length() > radius {
        return None;
    }

    // Disks face the opposite way from the equivalent plane.
    Some(Intersection {
        normal: -hit.normal,
        ..hit
    })
}

fn intersect_triangle(ray: &Ray, a: Vec3, b: Vec3, c: Vec3) -> Option<Intersection> {
    let edge_ab = b - a;
    let edge_ac = c - a;
    let n = edge_ab.cross(edge_ac);

    let n_dot_dir = n.dot(ray.direction);
    if n_dot_dir.abs() < 0.01 {
        return None;
    }

    let t = (a - ray.origin).dot(n) / n_dot_dir;
    if t < 0.0 {
        return None;
    }

    let p = ray.at(t);

    // Signed edge-side tests: the point must lie inside all three edges.
    if n.dot(edge_ab.cross(p - a)) < 0.0 {
        return None;
    }
    if n.dot((c - b).cross(p - b)) < 0.0 {
        return None;
    }
    if n.dot((a - c).cross(p - c)) < 0.0 {
        return None;
    }

    Some(Intersection {
        distance: t,
        position: p,
        // Front-facing relative to winding, not flipped toward the ray.
        normal: n.normalize(),
        uv: Vec2::ZERO,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_hit_distance_and_normal() {
        let sphere = Shape::sphere(Vec3::new(0.0, 0.0, -5.0), 1.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let hit = sphere.intersect(&ray).expect("ray through center must hit");
        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert!((hit.position - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-5);
        // Sphere normals are the raw offset from center.
        assert!((hit.normal - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Shape::sphere(Vec3::new(0.0, 0.0, -5.0), 1.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(sphere.intersect(&ray).is_none());
    }

    #[test]
    fn test_sphere_behind_origin_is_miss() {
        let sphere = Shape::sphere(Vec3::new(0.0, 0.0, 5.0), 1.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere.intersect(&ray).is_none());
    }

    #[test]
    fn test_aabb_hit_from_outside() {
        let aabb = Shape::aabb(Vec3::new(0.0, 0.0, -5.0), Vec3::ONE);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let hit = aabb.intersect(&ray).expect("axis ray must hit the box");
        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
        assert!((hit.normal.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_aabb_hit_from_inside_reports_far_face() {
        let aabb = Shape::aabb(Vec3::ZERO, Vec3::ONE);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let hit = aabb.intersect(&ray).expect("origin inside still hits");
        assert!((hit.distance - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_aabb_miss_outside_slabs() {
        let aabb = Shape::aabb(Vec3::new(0.0, 0.0, -5.0), Vec3::ONE);
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(aabb.intersect(&ray).is_none());
    }

    #[test]
    fn test_aabb_axis_parallel_ray_tolerates_zero_components() {
        // Direction has zero x and y components; the slab divisions
        // produce infinities and the test must still be correct.
        let aabb = Shape::aabb(Vec3::new(0.0, 0.0, -5.0), Vec3::ONE);
        let inside = Ray::new(Vec3::new(0.5, 0.5, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(aabb.intersect(&inside).is_some());

        let outside = Ray::new(Vec3::new(1.5, 0.5, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(aabb.intersect(&outside).is_none());
    }

    #[test]
    fn test_aabb_uv_projects_off_dominant_axis() {
        let aabb = Shape::aabb(Vec3::ZERO, Vec3::ONE);
        let ray = Ray::new(Vec3::new(5.0, 0.25, 0.5), Vec3::new(-1.0, 0.0, 0.0));

        let hit = aabb.intersect(&ray).expect("must hit +x face");
        assert!((hit.normal - Vec3::X).length() < 1e-5);
        assert!((hit.uv - Vec2::new(0.25, 0.5)).length() < 1e-5);
    }

    #[test]
    fn test_plane_hit_normal_faces_ray() {
        let plane = Shape::plane(Vec3::new(0.0, -1.0, 0.0), Vec3::Y);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0));

        let hit = plane.intersect(&ray).expect("downward ray hits floor");
        assert!((hit.distance - 1.0).abs() < 1e-5);
        assert!((hit.normal - Vec3::Y).length() < 1e-5);

        // From below, the reported normal flips toward the ray.
        let from_below = Ray::new(Vec3::new(0.0, -2.0, 0.0), Vec3::Y);
        let hit = plane.intersect(&from_below).expect("upward ray hits floor");
        assert!((hit.normal - Vec3::NEG_Y).length() < 1e-5);
    }

    #[test]
    fn test_plane_grazing_ray_is_miss() {
        let plane = Shape::plane(Vec3::new(0.0, -1.0, 0.0), Vec3::Y);
        let parallel = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(plane.intersect(&parallel).is_none());

        // Nearly parallel still rejected by the 0.01 threshold.
        let grazing = Ray::new(Vec3::ZERO, Vec3::new(1.0, -0.005, 0.0).normalize());
        assert!(plane.intersect(&grazing).is_none());
    }

    #[test]
    fn test_disk_hit_inside_radius_with_negated_normal() {
        let disk = Shape::disk(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 1.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let hit = disk.intersect(&ray).expect("center ray hits disk");
        assert!((hit.distance - 5.0).abs() < 1e-5);
        // Plane would report +z here; the disk negates it.
        assert!((hit.normal - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_disk_miss_outside_radius() {
        let disk = Shape::disk(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 1.0);
        let ray = Ray::new(Vec3::new(1.5, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(disk.intersect(&ray).is_none());
    }

    #[test]
    fn test_triangle_hit_inside_edges() {
        let tri = Shape::triangle(
            Vec3::new(-1.0, -1.0, -5.0),
            Vec3::new(1.0, -1.0, -5.0),
            Vec3::new(0.0, 1.0, -5.0),
        );
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let hit = tri.intersect(&ray).expect("ray through centroid hits");
        assert!((hit.distance - 5.0).abs() < 1e-5);
        assert!((hit.normal.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_miss_outside_edges() {
        let tri = Shape::triangle(
            Vec3::new(-1.0, -1.0, -5.0),
            Vec3::new(1.0, -1.0, -5.0),
            Vec3::new(0.0, 1.0, -5.0),
        );
        let ray = Ray::new(Vec3::new(2.0, 2.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(tri.intersect(&ray).is_none());
    }

    #[test]
    fn test_triangle_winding_normal_not_flipped() {
        let tri = Shape::triangle(
            Vec3::new(-1.0, -1.0, -5.0),
            Vec3::new(1.0, -1.0, -5.0),
            Vec3::new(0.0, 1.0, -5.0),
        );

        // Approaching from either side reports the same winding normal.
        let front = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let back = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::new(0.0, 0.0, 1.0));
        let n_front = tri.intersect(&front).unwrap().normal;
        let n_back = tri.intersect(&back).unwrap().normal;
        assert!((n_front - n_back).length() < 1e-5);
    }
}
