//! Light sources and shadow-ray occlusion queries.

use std::f32::consts::PI;

use lumen_math::{Ray, Vec3};

use crate::Scene;

/// A light source.
///
/// Occlusion tests cast shadow rays against the same scene the camera
/// rays intersect; the scene's surface bias (see `Scene::intersect`) is
/// what keeps those rays from re-hitting their own origin surface.
#[derive(Debug, Clone, Copy)]
pub enum Light {
    /// Infinitely distant light with a fixed direction and constant
    /// irradiance.
    Directional {
        direction: Vec3,
        irradiance: Vec3,
        ambience: Vec3,
    },
    /// Local light radiating `flux` uniformly over a sphere; irradiance
    /// falls off with the inverse square of distance.
    Point {
        position: Vec3,
        flux: Vec3,
        ambience: Vec3,
    },
}

impl Light {
    /// Create a directional light; the direction is normalized here.
    pub fn directional(direction: Vec3, irradiance: Vec3, ambience: Vec3) -> Self {
        Self::Directional {
            direction: direction.normalize(),
            irradiance,
            ambience,
        }
    }

    /// Create a point light from its position and radiant power.
    pub fn point(position: Vec3, flux: Vec3, ambience: Vec3) -> Self {
        Self::Point {
            position,
            flux,
            ambience,
        }
    }

    /// Is `point` shadowed from this light by scene geometry?
    pub fn occluded(&self, scene: &Scene, point: Vec3) -> bool {
        match *self {
            // Directional lights are infinitely far away, so any hit on
            // the way back toward the light occludes.
            Self::Directional { direction, .. } => {
                let shadow_ray = Ray::new(point, -direction);
                scene.intersect(&shadow_ray).is_some()
            }
            // Point lights only count hits strictly between the point
            // and the light; geometry beyond the light does not occlude.
            Self::Point { position, .. } => {
                let to_light = position - point;
                let light_distance = to_light.length();
                if light_distance <= 0.0 {
                    return false;
                }
                let shadow_ray = Ray::new(point, to_light / light_distance);
                match scene.intersect(&shadow_ray) {
                    Some(hit) => hit.distance < light_distance,
                    None => false,
                }
            }
        }
    }

    /// Unit direction of the incoming light (light to point).
    pub fn incident_direction(&self, point: Vec3) -> Vec3 {
        match *self {
            Self::Directional { direction, .. } => direction,
            Self::Point { position, .. } => (point - position).normalize(),
        }
    }

    /// Irradiance cast onto `point`, assuming no obstruction and a
    /// surface oriented toward the light.
    pub fn irradiance(&self, point: Vec3) -> Vec3 {
        match *self {
            Self::Directional { irradiance, .. } => irradiance,
            Self::Point { position, flux, .. } => {
                let distance = (point - position).length();
                if distance > 0.0 {
                    // Flux spread over the sphere the light illuminates.
                    flux / (4.0 * PI * distance * distance)
                } else {
                    flux
                }
            }
        }
    }

    /// Constant ambient contribution, applied regardless of occlusion.
    /// Cheaply approximates light bouncing around the scene.
    pub fn ambience(&self) -> Vec3 {
        match *self {
            Self::Directional { ambience, .. } => ambience,
            Self::Point { ambience, .. } => ambience,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Material, SceneObject, Shape};
    use std::sync::Arc;

    fn scene_with(objects: Vec<SceneObject>) -> Scene {
        Scene::new(objects, Vec::new())
    }

    fn grey() -> Arc<Material> {
        Arc::new(Material::new(Vec3::splat(0.5), Vec3::splat(0.5), 10.0))
    }

    #[test]
    fn test_point_light_inverse_square_falloff() {
        let light = Light::point(Vec3::ZERO, Vec3::splat(100.0), Vec3::ZERO);

        let near = light.irradiance(Vec3::new(2.0, 0.0, 0.0));
        let far = light.irradiance(Vec3::new(4.0, 0.0, 0.0));

        // Doubling the distance quarters the irradiance.
        assert!((far * 4.0 - near).length() < 1e-5);
    }

    #[test]
    fn test_point_light_zero_distance_guard() {
        let flux = Vec3::splat(100.0);
        let light = Light::point(Vec3::ZERO, flux, Vec3::ZERO);
        assert_eq!(light.irradiance(Vec3::ZERO), flux);
    }

    #[test]
    fn test_point_light_occluded_by_blocker_between() {
        let light = Light::point(Vec3::new(0.0, 10.0, 0.0), Vec3::ONE, Vec3::ZERO);
        let blocker = SceneObject::new(Shape::sphere(Vec3::new(0.0, 5.0, 0.0), 1.0), grey());

        let blocked = scene_with(vec![blocker]);
        assert!(light.occluded(&blocked, Vec3::ZERO));

        let open = scene_with(Vec::new());
        assert!(!light.occluded(&open, Vec3::ZERO));
    }

    #[test]
    fn test_point_light_not_occluded_by_object_beyond() {
        let light = Light::point(Vec3::new(0.0, 10.0, 0.0), Vec3::ONE, Vec3::ZERO);
        let beyond = SceneObject::new(Shape::sphere(Vec3::new(0.0, 20.0, 0.0), 1.0), grey());

        let scene = scene_with(vec![beyond]);
        assert!(!light.occluded(&scene, Vec3::ZERO));
    }

    #[test]
    fn test_directional_light_any_hit_occludes() {
        let light = Light::directional(Vec3::new(0.0, -1.0, 0.0), Vec3::ONE, Vec3::ZERO);

        // Shadow ray travels up (+y); a sphere far above still occludes.
        let far_above = SceneObject::new(Shape::sphere(Vec3::new(0.0, 100.0, 0.0), 1.0), grey());
        let scene = scene_with(vec![far_above]);
        assert!(light.occluded(&scene, Vec3::ZERO));
        assert!(!light.occluded(&scene_with(Vec::new()), Vec3::ZERO));
    }

    #[test]
    fn test_incident_direction_is_unit_light_to_point() {
        let light = Light::point(Vec3::new(0.0, 10.0, 0.0), Vec3::ONE, Vec3::ZERO);
        let dir = light.incident_direction(Vec3::ZERO);
        assert!((dir - Vec3::NEG_Y).length() < 1e-6);

        let sun = Light::directional(Vec3::new(-2.0, -2.0, -2.0), Vec3::ONE, Vec3::ZERO);
        let dir = sun.incident_direction(Vec3::splat(123.0));
        assert!((dir.length() - 1.0).abs() < 1e-6);
    }
}
