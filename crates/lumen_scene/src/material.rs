//! Phong reflectance parameters.

use lumen_math::Vec3;

/// Surface reflectance: Lambertian diffuse, Phong specular, shininess.
///
/// Materials are immutable after construction and shared between scene
/// objects through `Arc`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Material {
    /// Construct from an explicit diffuse/specular/shininess triple.
    pub fn new(diffuse: Vec3, specular: Vec3, shininess: f32) -> Self {
        Self {
            diffuse,
            specular,
            shininess,
        }
    }

    /// Construct from a diffuse chroma and ratios, conforming to:
    /// - the sum of diffuse and specular energy does not exceed one
    ///   (the split is controlled by `specular_ratio`),
    /// - metals have a specular equal to the square root of their
    ///   diffuse chroma,
    /// - non-metals have a white specular.
    pub fn from_chroma(
        diffuse_chroma: Vec3,
        shininess: f32,
        specular_ratio: f32,
        metalicity_ratio: f32,
    ) -> Self {
        let specular_chroma = Vec3::new(
            diffuse_chroma.x.sqrt(),
            diffuse_chroma.y.sqrt(),
            diffuse_chroma.z.sqrt(),
        );
        Self {
            diffuse: (1.0 - specular_ratio) * diffuse_chroma,
            specular: specular_ratio
                * (metalicity_ratio * specular_chroma + Vec3::splat(1.0 - metalicity_ratio)),
            shininess,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_constructor() {
        let m = Material::new(Vec3::X, Vec3::splat(0.5), 10.0);
        assert_eq!(m.diffuse, Vec3::X);
        assert_eq!(m.specular, Vec3::splat(0.5));
        assert_eq!(m.shininess, 10.0);
    }

    #[test]
    fn test_derived_energy_bounded() {
        // For any ratio in [0,1] and chroma in [0,1], per-channel
        // diffuse + specular stays at or below one.
        for spec in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let m = Material::from_chroma(Vec3::new(1.0, 0.5, 0.0), 10.0, spec, 0.0);
            let total = m.diffuse + m.specular;
            assert!(total.max_element() <= 1.0 + 1e-6, "spec={spec}: {total}");
        }
    }

    #[test]
    fn test_derived_metal_specular_is_sqrt_of_chroma() {
        let chroma = Vec3::new(1.0, 0.25, 0.04);
        let m = Material::from_chroma(chroma, 50.0, 1.0, 1.0);
        assert!((m.specular - Vec3::new(1.0, 0.5, 0.2)).length() < 1e-6);
        // Fully specular metal has no diffuse left.
        assert!(m.diffuse.length() < 1e-6);
    }

    #[test]
    fn test_derived_nonmetal_specular_is_white() {
        let m = Material::from_chroma(Vec3::new(1.0, 0.0, 0.0), 10.0, 0.5, 0.0);
        assert!((m.specular - Vec3::splat(0.5)).length() < 1e-6);
        assert!((m.diffuse - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
    }
}
