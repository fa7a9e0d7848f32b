//! Scene container and nearest-hit queries.

use std::sync::Arc;

use lumen_math::{Ray, Vec2, Vec3};

use crate::{Light, Material, Shape};

/// Offset applied along the normal of every reported hit so that rays
/// spawned from the hit point (shadow and reflection rays) do not
/// immediately re-intersect the surface they started on.
pub const SURFACE_BIAS: f32 = 1e-4;

/// A shape paired with the material it is rendered with.
///
/// Both halves are owned by value or by shared-immutable handle, so an
/// object can never be in a half-built state.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub shape: Shape,
    pub material: Arc<Material>,
}

impl SceneObject {
    /// Pair a shape with a material.
    pub fn new(shape: Shape, material: Arc<Material>) -> Self {
        Self { shape, material }
    }
}

/// A scene-level intersection: the geometric hit annotated with the
/// material of the object that produced it.
#[derive(Debug, Clone)]
pub struct SurfaceHit {
    pub distance: f32,
    /// Hit position, already pushed `SURFACE_BIAS` along the normal.
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub material: Arc<Material>,
}

/// An unordered collection of scene objects and lights.
///
/// Scenes are built programmatically, swapped wholesale between render
/// runs and never mutated while a render pass is executing.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub lights: Vec<Light>,
}

impl Scene {
    /// Create a scene from its objects and lights.
    pub fn new(objects: Vec<SceneObject>, lights: Vec<Light>) -> Self {
        Self { objects, lights }
    }

    /// Find the nearest valid intersection along a ray.
    ///
    /// Linear scan over every object; the strict `<` comparison means
    /// the first of two equidistant hits wins. The winning position is
    /// nudged outward along its normal by `SURFACE_BIAS`.
    pub fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        let mut closest_distance = f32::INFINITY;
        let mut closest: Option<SurfaceHit> = None;

        for object in &self.objects {
            if let Some(hit) = object.shape.intersect(ray) {
                if hit.distance < closest_distance {
                    closest_distance = hit.distance;
                    closest = Some(SurfaceHit {
                        distance: hit.distance,
                        position: hit.position,
                        normal: hit.normal,
                        uv: hit.uv,
                        material: Arc::clone(&object.material),
                    });
                }
            }
        }

        closest.map(|mut hit| {
            hit.position += hit.normal * SURFACE_BIAS;
            hit
        })
    }

    /// A box sitting under a sphere, lit by one directional light.
    pub fn simple() -> Self {
        let shiny_red = Arc::new(Material::from_chroma(Vec3::X, 10.0, 0.5, 0.0));
        let green = Arc::new(Material::from_chroma(Vec3::new(0.0, 0.8, 0.0), 1.05, 0.1, 0.0));

        Self::new(
            vec![
                SceneObject::new(Shape::sphere(Vec3::new(0.0, -2.0, -10.0), 1.0), shiny_red),
                SceneObject::new(
                    Shape::aabb(Vec3::new(0.0, -3.5, -10.0), Vec3::new(3.0, 0.5, 3.0)),
                    green,
                ),
            ],
            vec![Light::directional(
                Vec3::splat(-1.0),
                Vec3::splat(0.5),
                Vec3::splat(0.05),
            )],
        )
    }

    /// The simple scene plus two point lights, one blocked by a wall.
    pub fn lights() -> Self {
        let mut scene = Self::simple();
        let green = Arc::new(Material::from_chroma(Vec3::new(0.0, 0.8, 0.0), 1.05, 0.1, 0.0));

        scene.objects.push(SceneObject::new(
            Shape::aabb(Vec3::new(3.5, 0.0, -10.0), Vec3::new(0.5, 3.0, 3.0)),
            green,
        ));
        scene.lights.push(Light::point(
            Vec3::new(-5.0, 0.0, -10.0),
            Vec3::splat(50.0),
            Vec3::splat(0.05),
        ));
        scene.lights.push(Light::point(
            Vec3::new(5.0, 0.0, -10.0),
            Vec3::splat(50.0),
            Vec3::splat(0.05),
        ));
        scene
    }

    /// A grid of spheres sweeping shininess against specular ratio.
    pub fn materials() -> Self {
        let green = Arc::new(Material::from_chroma(Vec3::new(0.0, 0.8, 0.0), 1.05, 0.1, 0.0));
        let mut objects = Vec::new();

        for shin in 0..=10 {
            for spec in 0..=10 {
                let shininess = (shin as f32).exp(); // 1 upward
                let specular_ratio = spec as f32 / 10.0; // [0, 1]
                let material = Arc::new(Material::from_chroma(
                    Vec3::X,
                    shininess,
                    specular_ratio,
                    0.0,
                ));
                objects.push(SceneObject::new(
                    Shape::sphere(
                        Vec3::new(5.0 - shin as f32, -2.0, -5.0 - spec as f32),
                        0.4,
                    ),
                    material,
                ));
            }
        }

        objects.push(SceneObject::new(
            Shape::aabb(Vec3::new(0.0, -3.0, -10.0), Vec3::new(6.0, 0.5, 6.0)),
            green,
        ));

        Self::new(
            objects,
            vec![Light::directional(
                Vec3::splat(-1.0),
                Vec3::splat(0.5),
                Vec3::splat(0.05),
            )],
        )
    }

    /// One of every primitive.
    pub fn shapes() -> Self {
        let white = Arc::new(Material::from_chroma(Vec3::ONE, 1.05, 0.1, 0.0));

        Self::new(
            vec![
                SceneObject::new(
                    Shape::aabb(Vec3::new(-3.0, 0.0, -5.0), Vec3::splat(0.5)),
                    Arc::clone(&white),
                ),
                SceneObject::new(
                    Shape::sphere(Vec3::new(-1.0, 0.0, -5.0), 0.5),
                    Arc::clone(&white),
                ),
                SceneObject::new(
                    Shape::plane(Vec3::new(0.0, -3.0, 0.0), Vec3::new(0.0, 0.8, 0.0)),
                    Arc::clone(&white),
                ),
                SceneObject::new(
                    Shape::disk(Vec3::new(1.0, 0.0, -5.0), Vec3::new(-3.0, 0.0, 0.8), 1.2),
                    Arc::clone(&white),
                ),
                SceneObject::new(
                    Shape::triangle(
                        Vec3::new(2.0, -1.0, -5.0),
                        Vec3::new(3.0, -1.0, -5.0),
                        Vec3::new(2.0, 1.0, -5.0),
                    ),
                    white,
                ),
            ],
            vec![Light::directional(
                Vec3::splat(-1.0),
                Vec3::splat(0.5),
                Vec3::splat(0.05),
            )],
        )
    }

    /// Cornell-box style room: white shell, red and green side walls,
    /// gold/silver/blue spheres, three point lights along the ceiling.
    pub fn cornell_box() -> Self {
        let white = Arc::new(Material::from_chroma(Vec3::ONE, 1.05, 0.1, 0.0));
        let green = Arc::new(Material::from_chroma(Vec3::new(0.0, 1.0, 0.0), 1.05, 0.1, 0.0));
        let red = Arc::new(Material::from_chroma(Vec3::X, 1.05, 0.1, 0.0));

        let gold = Arc::new(Material::from_chroma(Vec3::new(1.0, 1.0, 0.0), 50.0, 0.8, 1.0));
        let silver = Arc::new(Material::from_chroma(Vec3::ONE, 1000.0, 0.8, 1.0));
        let blue = Arc::new(Material::from_chroma(Vec3::new(0.5, 0.5, 1.0), 1.1, 0.1, 0.0));

        let mut objects = Vec::new();

        // ceiling and floor
        objects.push(SceneObject::new(
            Shape::aabb(Vec3::new(0.0, 3.2, 0.0), Vec3::new(3.0, 0.2, 13.0)),
            Arc::clone(&white),
        ));
        objects.push(SceneObject::new(
            Shape::aabb(Vec3::new(0.0, -3.2, 0.0), Vec3::new(3.0, 0.2, 13.0)),
            Arc::clone(&white),
        ));

        // front and back
        objects.push(SceneObject::new(
            Shape::aabb(Vec3::new(0.0, 0.0, 13.2), Vec3::new(3.0, 3.0, 0.2)),
            Arc::clone(&white),
        ));
        objects.push(SceneObject::new(
            Shape::aabb(Vec3::new(0.0, 0.0, -13.2), Vec3::new(3.0, 3.0, 0.2)),
            white,
        ));

        // left and right
        objects.push(SceneObject::new(
            Shape::aabb(Vec3::new(-3.2, 0.0, 0.0), Vec3::new(0.2, 3.0, 13.0)),
            red,
        ));
        objects.push(SceneObject::new(
            Shape::aabb(Vec3::new(3.2, 0.0, 0.0), Vec3::new(0.2, 3.0, 13.0)),
            green,
        ));

        // spheres
        objects.push(SceneObject::new(
            Shape::sphere(Vec3::new(1.0, -2.0, -7.0), 1.0),
            gold,
        ));
        objects.push(SceneObject::new(
            Shape::sphere(Vec3::new(-1.25, -2.25, -7.0), 0.75),
            silver,
        ));
        objects.push(SceneObject::new(
            Shape::sphere(Vec3::new(0.0, -1.5, -10.0), 1.5),
            blue,
        ));

        let ambience = Vec3::splat(0.05);
        let lights = vec![
            Light::point(Vec3::new(0.0, 2.5, -10.0), Vec3::splat(50.0), ambience),
            Light::point(Vec3::new(0.0, 2.5, 0.0), Vec3::splat(50.0), ambience),
            Light::point(Vec3::new(0.0, 2.5, 10.0), Vec3::splat(50.0), ambience),
        ];

        Self::new(objects, lights)
    }
}
