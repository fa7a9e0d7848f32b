//! Scene model for the Lumen path tracer.
//!
//! Defines the geometric primitives, materials, lights and the scene
//! container that answers nearest-hit queries, plus the fly camera that
//! turns pixel coordinates into world-space rays.

mod camera;
mod light;
mod material;
mod scene;
mod shape;

pub use camera::Camera;
pub use light::Light;
pub use material::Material;
pub use scene::{Scene, SceneObject, SurfaceHit, SURFACE_BIAS};
pub use shape::{Intersection, Shape};

/// Re-export the math types used throughout the scene model.
pub use lumen_math::{Ray, Vec2, Vec3};
