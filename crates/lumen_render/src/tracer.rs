//! Path tracing strategies.
//!
//! Every strategy shares one contract: given a ray and a recursion
//! budget, return a radiance estimate by querying the scene and its
//! lights, falling back to the background color on a miss. Strategies
//! are swappable between render runs, never mid-run.

use lumen_math::{Ray, Vec3};
use lumen_scene::{Scene, SurfaceHit};

/// Radiance reported for rays that leave the scene.
pub const BACKGROUND: Vec3 = Vec3::new(0.3, 0.3, 0.4);

/// A radiance sampling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathTracer {
    /// Cheap material-free grey shading for fast previews.
    #[default]
    Simple,
    /// Phong direct lighting with shadow rays. Ignores `depth`.
    Core,
    /// Core plus recursive perfect-specular reflection.
    Completion,
    /// Extension point for textured diffuse and stochastic indirect
    /// sampling; currently a background-only stub with the same
    /// swappable contract as the other strategies.
    Challenge,
}

impl PathTracer {
    /// Estimate the radiance arriving along `ray`.
    ///
    /// `depth` is the number of bounces remaining; strategies that
    /// recurse stop once it reaches one.
    pub fn sample_ray(&self, scene: &Scene, ray: &Ray, depth: u32) -> Vec3 {
        match self {
            Self::Simple => sample_simple(scene, ray),
            Self::Core => match scene.intersect(ray) {
                Some(hit) => direct_lighting(scene, ray, &hit),
                None => BACKGROUND,
            },
            Self::Completion => sample_completion(scene, ray, depth),
            Self::Challenge => BACKGROUND,
        }
    }
}

fn sample_simple(scene: &Scene, ray: &Ray) -> Vec3 {
    match scene.intersect(ray) {
        Some(hit) => {
            // Facing ratio between half grey and full grey.
            let facing = (-ray.direction).dot(hit.normal.normalize_or_zero()).abs();
            let grey = Vec3::splat(0.5);
            (grey * 0.5).lerp(grey, facing)
        }
        None => BACKGROUND,
    }
}

/// Per-light Phong accumulation shared by Core and Completion.
///
/// Each light always contributes its ambient term; the Lambertian and
/// specular terms are gated on a shadow-ray visibility test.
fn direct_lighting(scene: &Scene, ray: &Ray, hit: &SurfaceHit) -> Vec3 {
    let normal = hit.normal.normalize_or_zero();
    let mut color = Vec3::ZERO;

    for light in &scene.lights {
        color += hit.material.diffuse * light.ambience();

        if light.occluded(scene, hit.position) {
            continue;
        }

        let incident = light.incident_direction(hit.position);
        let irradiance = light.irradiance(hit.position);

        let lambert = (-incident).dot(normal).max(0.0);
        color += irradiance * hit.material.diffuse * lambert;

        let mirrored = reflect(incident, normal);
        let phong = mirrored
            .dot(-ray.direction)
            .max(0.0)
            .powf(hit.material.shininess);
        color += irradiance * hit.material.specular * phong;
    }

    color
}

fn sample_completion(scene: &Scene, ray: &Ray, depth: u32) -> Vec3 {
    let Some(hit) = scene.intersect(ray) else {
        return BACKGROUND;
    };

    let mut color = direct_lighting(scene, ray, &hit);

    if depth > 1 {
        let normal = hit.normal.normalize_or_zero();
        // The hit position already carries the surface bias, so the
        // bounced ray cannot re-hit the surface it leaves.
        let bounce = Ray::new(hit.position, reflect(ray.direction.normalize(), normal));
        let bounced = sample_completion(scene, &bounce, depth - 1);

        // Low shininess throttles the mirror contribution.
        color += bounced * hit.material.specular * (1.0 - 1.0 / hit.material.shininess);
    }

    color
}

/// Mirror `v` about the unit normal `n`.
#[inline]
fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}
